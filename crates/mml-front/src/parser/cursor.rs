//! Character-level cursor with position tracking.
//!
//! The parser works straight off characters; there is no token stream.
//! The cursor tracks 1-based line/column for spans, supports checkpointed
//! backtracking, and owns the trivia rules: whitespace, `#` line comments,
//! and nestable `#- ... -#` block comments. Block comments double as doc
//! comments when they immediately precede a declaration.

use mml_ast::{SrcPoint, SrcSpan};

#[derive(Debug, Clone, Copy)]
pub(crate) struct Checkpoint {
    pos: usize,
    line: u32,
    col: u32,
}

pub(crate) struct Cursor {
    chars: Vec<char>,
    pos: usize,
    line: u32,
    col: u32,
}

/// Characters that may form a symbolic operator name.
///
/// `#` is formally part of the set but always lexes as a comment, so runs
/// stop before it.
pub(crate) const OPERATOR_CHARS: &str = "=!$%^&*+<>?/\\|~-";

pub(crate) const RESERVED: &[&str] = &[
    "let", "fn", "op", "type", "module", "if", "then", "else", "end", "true", "false", "struct",
    "match",
];

pub(crate) fn is_binding_start(c: char) -> bool {
    c.is_ascii_lowercase() || c == '_'
}

pub(crate) fn is_type_start(c: char) -> bool {
    c.is_ascii_uppercase()
}

pub(crate) fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

pub(crate) fn is_operator_char(c: char) -> bool {
    OPERATOR_CHARS.contains(c)
}

impl Cursor {
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    pub fn at_eof(&self) -> bool {
        self.pos >= self.chars.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    pub fn peek_at(&self, n: usize) -> Option<char> {
        self.chars.get(self.pos + n).copied()
    }

    pub fn bump(&mut self) -> Option<char> {
        let c = self.chars.get(self.pos).copied()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    pub fn point(&self) -> SrcPoint {
        SrcPoint::new(self.line, self.col)
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            pos: self.pos,
            line: self.line,
            col: self.col,
        }
    }

    pub fn restore(&mut self, cp: Checkpoint) {
        self.pos = cp.pos;
        self.line = cp.line;
        self.col = cp.col;
    }

    pub fn point_of(cp: Checkpoint) -> SrcPoint {
        SrcPoint::new(cp.line, cp.col)
    }

    /// Source text consumed since `cp`.
    pub fn slice_from(&self, cp: Checkpoint) -> String {
        self.chars[cp.pos..self.pos].iter().collect()
    }

    pub fn span_from(&self, cp: Checkpoint) -> SrcSpan {
        SrcSpan::new(Self::point_of(cp), self.point())
    }

    /// True when the upcoming characters spell `word` as a whole
    /// identifier (not a prefix of a longer one).
    pub fn at_word(&self, word: &str) -> bool {
        for (i, wc) in word.chars().enumerate() {
            if self.peek_at(i) != Some(wc) {
                return false;
            }
        }
        !self.peek_at(word.chars().count()).is_some_and(is_ident_continue)
    }

    pub fn eat_word(&mut self, word: &str) -> bool {
        if self.at_word(word) {
            for _ in word.chars() {
                self.bump();
            }
            true
        } else {
            false
        }
    }

    pub fn eat_char(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Skips whitespace and comments. Returns the content of the last
    /// block comment in the run, for doc attachment. An unclosed block
    /// comment is fatal: the error carries its opening span.
    pub fn skip_trivia(&mut self) -> Result<Option<String>, SrcSpan> {
        let mut doc = None;
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('#') if self.peek_at(1) == Some('-') => {
                    doc = Some(self.block_comment()?);
                }
                Some('#') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                _ => break,
            }
        }
        Ok(doc)
    }

    /// Consumes a `#- ... -#` block comment, nesting to any depth, and
    /// returns its trimmed content.
    fn block_comment(&mut self) -> Result<String, SrcSpan> {
        let open = self.checkpoint();
        self.bump(); // '#'
        self.bump(); // '-'
        let mut depth = 1u32;
        let mut content = String::new();
        loop {
            if self.at_eof() {
                return Err(SrcSpan::new(Self::point_of(open), self.point()));
            }
            if self.peek() == Some('#') && self.peek_at(1) == Some('-') {
                depth += 1;
                content.push('#');
                content.push('-');
                self.bump();
                self.bump();
                continue;
            }
            if self.peek() == Some('-') && self.peek_at(1) == Some('#') {
                depth -= 1;
                self.bump();
                self.bump();
                if depth == 0 {
                    break;
                }
                content.push('-');
                content.push('#');
                continue;
            }
            if let Some(c) = self.bump() {
                content.push(c);
            }
        }
        Ok(content.trim().to_owned())
    }
}
