//! Shared view of the module's type declarations.
//!
//! Collected once per phase that needs it: which nominal ids are heap
//! types, struct layouts for field selection, and where the memory
//! helpers for a given type live.

use indexmap::IndexMap;

use mml_ast::{Member, Module, NativeRep, ResolvableId, Type, TypeDef, TypeStruct};

pub struct TypeInfo {
    pub typedefs: IndexMap<ResolvableId, TypeDef>,
    pub structs: IndexMap<ResolvableId, TypeStruct>,
    /// `__free_<T>` bindings by type name.
    pub free_fns: IndexMap<String, ResolvableId>,
    /// `__clone_<T>` bindings by type name.
    pub clone_fns: IndexMap<String, ResolvableId>,
    /// `__mk_<T>` bindings by type name.
    pub ctor_fns: IndexMap<String, ResolvableId>,
}

impl TypeInfo {
    pub fn collect(module: &Module) -> Self {
        let mut typedefs = IndexMap::new();
        let mut structs = IndexMap::new();
        let mut free_fns = IndexMap::new();
        let mut clone_fns = IndexMap::new();
        let mut ctor_fns = IndexMap::new();
        for member in &module.members {
            match member {
                Member::TypeDef(def) => {
                    if let Some(id) = &def.id {
                        typedefs.insert(id.clone(), def.clone());
                    }
                }
                Member::TypeStruct(st) => {
                    if let Some(id) = &st.id {
                        structs.insert(id.clone(), st.clone());
                    }
                }
                Member::Bnd(bnd) => {
                    let Some(id) = &bnd.id else { continue };
                    if let Some(t) = bnd.name.strip_prefix("__free_") {
                        free_fns.insert(t.to_owned(), id.clone());
                    } else if let Some(t) = bnd.name.strip_prefix("__clone_") {
                        clone_fns.insert(t.to_owned(), id.clone());
                    } else if let Some(t) = bnd.name.strip_prefix("__mk_") {
                        ctor_fns.insert(t.to_owned(), id.clone());
                    }
                }
                _ => {}
            }
        }
        Self {
            typedefs,
            structs,
            free_fns,
            clone_fns,
            ctor_fns,
        }
    }

    /// The declared name behind a nominal type, if any.
    pub fn type_name(&self, ty: &Type) -> Option<String> {
        let id = ty.nominal_id()?;
        if let Some(def) = self.typedefs.get(id) {
            return Some(def.name.clone());
        }
        self.structs.get(id).map(|st| st.name.clone())
    }

    /// Whether values of this type live on the heap: a heap-flagged
    /// native type, or a struct whose transitive fields contain one.
    pub fn is_heap(&self, ty: &Type) -> bool {
        let Some(id) = ty.nominal_id() else {
            return false;
        };
        self.is_heap_id(id, &mut Vec::new())
    }

    fn is_heap_id(&self, id: &ResolvableId, visiting: &mut Vec<ResolvableId>) -> bool {
        if visiting.contains(id) {
            return false;
        }
        if let Some(def) = self.typedefs.get(id) {
            return def.heap;
        }
        let Some(st) = self.structs.get(id) else {
            return false;
        };
        visiting.push(id.clone());
        let heap = st.fields.iter().any(|f| {
            f.type_spec
                .as_ref()
                .or(Some(&f.type_asc))
                .and_then(|t| t.nominal_id())
                .is_some_and(|fid| self.is_heap_id(fid, visiting))
        });
        visiting.pop();
        heap
    }

    /// Struct fields with heap types, in declaration order.
    pub fn heap_fields<'a>(&'a self, st: &'a TypeStruct) -> Vec<&'a mml_ast::Field> {
        st.fields
            .iter()
            .filter(|f| {
                f.type_spec
                    .as_ref()
                    .or(Some(&f.type_asc))
                    .is_some_and(|t| self.is_heap(t))
            })
            .collect()
    }

    /// Field types of a native struct definition, for selection on types
    /// like `String`.
    pub fn native_fields(&self, ty: &Type) -> Option<&IndexMap<String, Type>> {
        let id = ty.nominal_id()?;
        match &self.typedefs.get(id)?.rep {
            NativeRep::Struct { fields } => Some(fields),
            _ => None,
        }
    }

    pub fn free_fn_for(&self, ty: &Type) -> Option<(String, ResolvableId)> {
        let name = self.type_name(ty)?;
        let id = self.free_fns.get(&name)?;
        Some((format!("__free_{name}"), id.clone()))
    }

    pub fn clone_fn_for(&self, ty: &Type) -> Option<(String, ResolvableId)> {
        let name = self.type_name(ty)?;
        let id = self.clone_fns.get(&name)?;
        Some((format!("__clone_{name}"), id.clone()))
    }
}
