use crate::analyzer::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    /// Both sides must denote the same type; a clash aborts the statement.
    Strict,
    /// Like `Strict`, but a clash leaves both sides untouched.
    BestEffort,
    /// Resolve to the wider of the two types; never fails.
    MostGeneral,
}

/// Relaxation applied to both sides of a `MostGeneral` equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    /// Arithmetic operand: non-numeric types count as the dialect float.
    Sum,
    /// `SUM()` argument: integers widen to the dialect's sum type, floats to double.
    SumFunction,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub expression: String,
    pub left: Type,
    pub right: Type,
    pub kind: ConstraintKind,
    pub coercion: Option<Coercion>,
    pub list: bool,
}

impl Constraint {
    fn new(kind: ConstraintKind, expression: impl Into<String>, left: impl Into<Type>, right: impl Into<Type>) -> Self {
        Self {
            expression: expression.into(),
            left: left.into(),
            right: right.into(),
            kind,
            coercion: None,
            list: false,
        }
    }

    pub fn strict(expression: impl Into<String>, left: impl Into<Type>, right: impl Into<Type>) -> Self {
        Self::new(ConstraintKind::Strict, expression, left, right)
    }

    pub fn best_effort(expression: impl Into<String>, left: impl Into<Type>, right: impl Into<Type>) -> Self {
        Self::new(ConstraintKind::BestEffort, expression, left, right)
    }

    pub fn most_general(expression: impl Into<String>, left: impl Into<Type>, right: impl Into<Type>) -> Self {
        Self::new(ConstraintKind::MostGeneral, expression, left, right)
    }

    pub fn with_coercion(mut self, coercion: Coercion) -> Self {
        self.coercion = Some(coercion);
        self
    }

    pub fn as_list(mut self) -> Self {
        self.list = true;
        self
    }
}
