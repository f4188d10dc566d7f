use std::fmt;

use crate::schema::SqlType;

pub type TypeVarId = u32;

/// What a type variable is known to be at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarType {
    Concrete(SqlType),
    /// Result of arithmetic: some numeric type, read as the dialect float.
    Number,
    /// `?`: nothing known yet.
    Unknown,
}

impl VarType {
    pub fn is_unknown(self) -> bool {
        matches!(self, VarType::Unknown)
    }
}

impl fmt::Display for VarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarType::Concrete(ty) => write!(f, "{}", ty),
            VarType::Number => write!(f, "number"),
            VarType::Unknown => write!(f, "?"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeVar {
    pub id: TypeVarId,
    /// Provenance label, usually the SQL text of the expression.
    pub name: String,
    pub var_type: VarType,
    pub list: bool,
    pub select_item: bool,
}

impl TypeVar {
    /// Same variable, flagged as the projected column of a derived table.
    pub fn as_select_item(&self) -> TypeVar {
        TypeVar { select_item: true, ..self.clone() }
    }
}

/// Either a single variable or an ordered group of types (a projected column
/// tuple, an IN list, function arguments).
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Var(TypeVar),
    Operator(Vec<Type>),
}

impl Type {
    pub fn operator(vars: impl IntoIterator<Item = TypeVar>) -> Type {
        Type::Operator(vars.into_iter().map(Type::Var).collect())
    }
}

impl From<TypeVar> for Type {
    fn from(value: TypeVar) -> Self {
        Type::Var(value)
    }
}

impl From<&TypeVar> for Type {
    fn from(value: &TypeVar) -> Self {
        Type::Var(value.clone())
    }
}

/// Hands out fresh ids for one analysis run, starting at 1.
#[derive(Debug, Default)]
pub struct TypeVarGenerator {
    last_id: TypeVarId,
}

impl TypeVarGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fresh(&mut self, name: impl Into<String>, var_type: VarType) -> TypeVar {
        self.last_id += 1;
        TypeVar { id: self.last_id, name: name.into(), var_type, list: false, select_item: false }
    }

    pub fn fresh_list(&mut self, name: impl Into<String>) -> TypeVar {
        TypeVar { list: true, ..self.fresh(name, VarType::Unknown) }
    }

    pub fn issued(&self) -> TypeVarId {
        self.last_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_monotonic_and_scoped_per_generator() {
        let mut first = TypeVarGenerator::new();
        let a = first.fresh("a", VarType::Unknown);
        let b = first.fresh("b", VarType::Concrete(SqlType::Int));
        assert_eq!((a.id, b.id), (1, 2));

        let mut second = TypeVarGenerator::new();
        assert_eq!(second.fresh("c", VarType::Number).id, 1);
        assert_eq!(first.issued(), 2);
    }

    #[test]
    fn list_vars_start_unresolved() {
        let mut generator = TypeVarGenerator::new();
        let ids = generator.fresh_list(":ids");
        assert!(ids.list);
        assert!(ids.var_type.is_unknown());
        assert_eq!(ids.as_select_item().id, ids.id);
    }
}
