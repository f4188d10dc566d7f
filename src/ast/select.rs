use std::fmt;

use crate::ast::{Collection, Expr, Join};

#[derive(Debug, Clone, PartialEq)]
pub enum SelectItem {
    Wildcard,
    QualifiedWildcard(String),
    Expr { expr: Expr, alias: Option<String> },
}

impl SelectItem {
    pub fn expr(expr: Expr) -> Self {
        SelectItem::Expr { expr, alias: None }
    }

    pub fn aliased(expr: Expr, alias: &str) -> Self {
        SelectItem::Expr { expr, alias: Some(alias.to_string()) }
    }
}

impl fmt::Display for SelectItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectItem::Wildcard => write!(f, "*"),
            SelectItem::QualifiedWildcard(collection) => write!(f, "{}.*", collection),
            SelectItem::Expr { expr, alias: Some(alias) } => write!(f, "{} AS {}", expr, alias),
            SelectItem::Expr { expr, alias: None } => write!(f, "{}", expr),
        }
    }
}

/// One `SELECT ... FROM ... WHERE ... GROUP BY ... HAVING` block; UNION branches
/// are sibling specs inside a [`Select`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QuerySpec {
    pub distinct: bool,
    pub projection: Vec<SelectItem>,
    pub from: Vec<Collection>,
    pub joins: Vec<Join>,
    pub criteria: Option<Expr>,
    pub group_by: Vec<Expr>,
    pub having: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommonTableExpr {
    pub name: String,
    pub query: Select,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub expr: Expr,
    pub desc: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Limit {
    pub count: Expr,
    pub offset: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Select {
    pub with: Vec<CommonTableExpr>,
    pub body: Vec<QuerySpec>,
    pub order_by: Vec<OrderBy>,
    pub limit: Option<Limit>,
}

impl Select {
    pub fn single(spec: QuerySpec) -> Self {
        Self { body: vec![spec], ..Default::default() }
    }

    pub fn is_union(&self) -> bool {
        self.body.len() > 1
    }
}

fn join_display<T: fmt::Display>(items: &[T], sep: &str) -> String {
    items.iter().map(|i| i.to_string()).collect::<Vec<_>>().join(sep)
}

impl fmt::Display for QuerySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SELECT ")?;
        if self.distinct {
            write!(f, "DISTINCT ")?;
        }
        write!(f, "{}", join_display(&self.projection, ", "))?;
        if !self.from.is_empty() {
            write!(f, " FROM {}", join_display(&self.from, ", "))?;
        }
        for join in &self.joins {
            write!(f, " {}", join)?;
        }
        if let Some(criteria) = &self.criteria {
            write!(f, " WHERE {}", criteria)?;
        }
        if !self.group_by.is_empty() {
            write!(f, " GROUP BY {}", join_display(&self.group_by, ", "))?;
        }
        if let Some(having) = &self.having {
            write!(f, " HAVING {}", having)?;
        }
        Ok(())
    }
}

impl fmt::Display for Select {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.with.is_empty() {
            let ctes = self.with.iter()
                .map(|cte| format!("{} AS ({})", cte.name, cte.query))
                .collect::<Vec<_>>()
                .join(", ");
            write!(f, "WITH {} ", ctes)?;
        }
        write!(f, "{}", join_display(&self.body, " UNION "))?;
        if !self.order_by.is_empty() {
            let terms = self.order_by.iter()
                .map(|o| if o.desc { format!("{} DESC", o.expr) } else { o.expr.to_string() })
                .collect::<Vec<_>>()
                .join(", ");
            write!(f, " ORDER BY {}", terms)?;
        }
        if let Some(limit) = &self.limit {
            write!(f, " LIMIT {}", limit.count)?;
            if let Some(offset) = &limit.offset {
                write!(f, " OFFSET {}", offset)?;
            }
        }
        Ok(())
    }
}
