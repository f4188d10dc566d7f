use std::fmt;

use crate::ast::{Collection, Expr};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JoinType::Inner => "INNER JOIN",
            JoinType::Left => "LEFT JOIN",
            JoinType::Right => "RIGHT JOIN",
            JoinType::Full => "FULL JOIN",
            JoinType::Cross => "CROSS JOIN",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum JoinConstraint {
    On(Expr),
    Using(Vec<String>),
    None,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub join_type: JoinType,
    pub collection: Collection,
    pub constraint: JoinConstraint,
}

impl Join {
    pub fn on(join_type: JoinType, collection: Collection, predicate: Expr) -> Self {
        Self { join_type, collection, constraint: JoinConstraint::On(predicate) }
    }
}

impl fmt::Display for Join {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.join_type, self.collection)?;
        match &self.constraint {
            JoinConstraint::On(predicate) => write!(f, " ON {}", predicate),
            JoinConstraint::Using(columns) => write!(f, " USING ({})", columns.join(", ")),
            JoinConstraint::None => Ok(()),
        }
    }
}
