use std::fmt;

use crate::ast::{Expr, Select};

#[derive(Debug, Clone, PartialEq)]
pub enum InsertSource {
    Values(Vec<Vec<Expr>>),
    Select(Box<Select>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub column: String,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Select(Select),
    Insert { table: String, columns: Vec<String>, source: InsertSource },
    Update { table: String, assignments: Vec<Assignment>, criteria: Option<Expr> },
    Delete { table: String, criteria: Option<Expr> },
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Select(select) => write!(f, "{}", select),
            Statement::Insert { table, columns, source } => {
                write!(f, "INSERT INTO {}", table)?;
                if !columns.is_empty() {
                    write!(f, " ({})", columns.join(", "))?;
                }
                match source {
                    InsertSource::Values(rows) => {
                        let rows = rows.iter()
                            .map(|row| format!("({})", row.iter().map(|e| e.to_string()).collect::<Vec<_>>().join(", ")))
                            .collect::<Vec<_>>()
                            .join(", ");
                        write!(f, " VALUES {}", rows)
                    }
                    InsertSource::Select(select) => write!(f, " {}", select),
                }
            }
            Statement::Update { table, assignments, criteria } => {
                let sets = assignments.iter()
                    .map(|a| format!("{} = {}", a.column, a.value))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "UPDATE {} SET {}", table, sets)?;
                if let Some(criteria) = criteria {
                    write!(f, " WHERE {}", criteria)?;
                }
                Ok(())
            }
            Statement::Delete { table, criteria } => {
                write!(f, "DELETE FROM {}", table)?;
                if let Some(criteria) = criteria {
                    write!(f, " WHERE {}", criteria)?;
                }
                Ok(())
            }
        }
    }
}
