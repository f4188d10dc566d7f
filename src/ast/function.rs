use std::fmt;

use crate::ast::Expr;

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub args: Vec<Expr>,
    pub distinct: bool,
}

impl Function {
    pub fn new(name: &str, args: Vec<Expr>) -> Self {
        Self { name: name.to_string(), args, distinct: false }
    }

    pub fn lower_name(&self) -> String {
        self.name.to_ascii_lowercase()
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args = self.args.iter().map(|a| a.to_string()).collect::<Vec<_>>().join(", ");
        if self.distinct {
            write!(f, "{}(DISTINCT {})", self.name, args)
        } else {
            write!(f, "{}({})", self.name, args)
        }
    }
}
