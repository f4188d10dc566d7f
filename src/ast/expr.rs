use std::fmt;

use crate::ast::{ArithmeticOp, Column, ComparatorOp, Function, Literal, Select};

/// A `?` placeholder or a `:name` named parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Parameter {
    pub name: Option<String>,
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, ":{}", name),
            None => write!(f, "?"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhenClause {
    pub condition: Expr,
    pub result: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal),
    Column(Column),
    Parameter(Parameter),
    Arithmetic { left: Box<Expr>, op: ArithmeticOp, right: Box<Expr> },
    Compare { left: Box<Expr>, op: ComparatorOp, right: Box<Expr> },
    Between { expr: Box<Expr>, low: Box<Expr>, high: Box<Expr>, negated: bool },
    InList { expr: Box<Expr>, list: Vec<Expr>, negated: bool },
    InSubquery { expr: Box<Expr>, subquery: Box<Select>, negated: bool },
    Like { expr: Box<Expr>, pattern: Box<Expr>, negated: bool },
    IsNull { expr: Box<Expr>, negated: bool },
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
    Function(Function),
    Case { operand: Option<Box<Expr>>, branches: Vec<WhenClause>, else_result: Option<Box<Expr>> },
    Subquery(Box<Select>),
    Exists(Box<Select>),
    Nested(Box<Expr>),
    /// `*`, only meaningful as the argument of `COUNT(*)`.
    Wildcard,
}

impl Expr {
    pub fn col(name: &str) -> Expr {
        Expr::Column(Column::parse_name(name))
    }

    pub fn param() -> Expr {
        Expr::Parameter(Parameter { name: None })
    }

    pub fn named(name: &str) -> Expr {
        Expr::Parameter(Parameter { name: Some(name.trim_start_matches(':').to_string()) })
    }

    pub fn int(value: i64) -> Expr {
        Expr::Literal(Literal::Int(value))
    }

    pub fn string(value: &str) -> Expr {
        Expr::Literal(Literal::String(value.to_string()))
    }

    pub fn null() -> Expr {
        Expr::Literal(Literal::Null)
    }

    pub fn func(name: &str, args: Vec<Expr>) -> Expr {
        Expr::Function(Function::new(name, args))
    }

    pub fn arith(left: Expr, op: ArithmeticOp, right: Expr) -> Expr {
        Expr::Arithmetic { left: Box::new(left), op, right: Box::new(right) }
    }

    pub fn compare(left: Expr, op: ComparatorOp, right: Expr) -> Expr {
        Expr::Compare { left: Box::new(left), op, right: Box::new(right) }
    }

    pub fn eq(left: Expr, right: Expr) -> Expr {
        Self::compare(left, ComparatorOp::Eq, right)
    }

    pub fn and(left: Expr, right: Expr) -> Expr {
        Expr::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: Expr, right: Expr) -> Expr {
        Expr::Or(Box::new(left), Box::new(right))
    }

    pub fn is_not_null(expr: Expr) -> Expr {
        Expr::IsNull { expr: Box::new(expr), negated: true }
    }

    pub fn in_list(expr: Expr, list: Vec<Expr>) -> Expr {
        Expr::InList { expr: Box::new(expr), list, negated: false }
    }

    /// Strips redundant parentheses.
    pub fn unnested(&self) -> &Expr {
        match self {
            Expr::Nested(inner) => inner.unnested(),
            other => other,
        }
    }

    pub fn is_parameter(&self) -> bool {
        matches!(self.unnested(), Expr::Parameter(_))
    }

    pub fn as_column(&self) -> Option<&Column> {
        match self.unnested() {
            Expr::Column(column) => Some(column),
            _ => None,
        }
    }
}

/// Prints `expr`, parenthesized when it binds looser than `min`.
#[derive(Clone, Copy)]
struct Operand<'a>(&'a Expr, u8);

impl fmt::Display for Operand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Operand(expr, min) = *self;
        if expr.precedence() < min { write!(f, "({})", expr) } else { write!(f, "{}", expr) }
    }
}

impl Expr {
    fn precedence(&self) -> u8 {
        match self {
            Expr::Or(..) => 1,
            Expr::And(..) => 2,
            Expr::Not(_) => 3,
            Expr::Compare { .. }
            | Expr::Between { .. }
            | Expr::InList { .. }
            | Expr::InSubquery { .. }
            | Expr::Like { .. }
            | Expr::IsNull { .. } => 4,
            Expr::Arithmetic { op: ArithmeticOp::Add | ArithmeticOp::Sub, .. } => 5,
            Expr::Arithmetic { .. } => 6,
            _ => 7,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let not = |negated: &bool| if *negated { "NOT " } else { "" };
        let own = self.precedence();
        match self {
            Expr::Literal(l) => write!(f, "{}", l),
            Expr::Column(c) => write!(f, "{}", c),
            Expr::Parameter(p) => write!(f, "{}", p),
            // right operand of - and / is not associative
            Expr::Arithmetic { left, op, right } => write!(f, "{} {} {}", Operand(left, own), op, Operand(right, own + 1)),
            Expr::Compare { left, op, right } => write!(f, "{} {} {}", Operand(left, 5), op, Operand(right, 5)),
            Expr::Between { expr, low, high, negated } => {
                write!(f, "{} {}BETWEEN {} AND {}", Operand(expr, 5), not(negated), Operand(low, 5), Operand(high, 5))
            }
            Expr::InList { expr, list, negated } => {
                let items = list.iter().map(|e| e.to_string()).collect::<Vec<_>>().join(", ");
                write!(f, "{} {}IN ({})", Operand(expr, 5), not(negated), items)
            }
            Expr::InSubquery { expr, subquery, negated } => {
                write!(f, "{} {}IN ({})", Operand(expr, 5), not(negated), subquery)
            }
            Expr::Like { expr, pattern, negated } => {
                write!(f, "{} {}LIKE {}", Operand(expr, 5), not(negated), Operand(pattern, 5))
            }
            Expr::IsNull { expr, negated } => write!(f, "{} IS {}NULL", Operand(expr, 5), not(negated)),
            Expr::And(l, r) => write!(f, "{} AND {}", Operand(l, own), Operand(r, own)),
            Expr::Or(l, r) => write!(f, "{} OR {}", Operand(l, own), Operand(r, own)),
            Expr::Not(e) => write!(f, "NOT {}", Operand(e, own)),
            Expr::Function(fun) => write!(f, "{}", fun),
            Expr::Case { operand, branches, else_result } => {
                write!(f, "CASE")?;
                if let Some(operand) = operand {
                    write!(f, " {}", operand)?;
                }
                for branch in branches {
                    write!(f, " WHEN {} THEN {}", branch.condition, branch.result)?;
                }
                if let Some(else_result) = else_result {
                    write!(f, " ELSE {}", else_result)?;
                }
                write!(f, " END")
            }
            Expr::Subquery(select) => write!(f, "({})", select),
            Expr::Exists(select) => write!(f, "EXISTS ({})", select),
            Expr::Nested(e) => write!(f, "({})", e),
            Expr::Wildcard => write!(f, "*"),
        }
    }
}
