mod expressions;
mod members;
mod type_exprs;
