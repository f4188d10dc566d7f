use crate::{
    analyzer::{AnalyzerError, ColumnDef, Scope},
    ast::{Column, Expr},
};

pub struct ColumnResolver;

impl ColumnResolver {
    /// Finds the definition `col` refers to, innermost query level first.
    pub fn resolve_column(col: &Column, scope: &Scope) -> Result<ColumnDef, AnalyzerError> {
        let prefix = col.collection();
        let name = col.name();

        for level in scope.levels() {
            let matches: Vec<&ColumnDef> = level.columns.iter().filter(|def| def.matches(prefix, name)).collect();
            match matches.as_slice() {
                [] => continue,
                [first, rest @ ..] if rest.iter().all(|def| def.same_column(first)) => return Ok((*first).clone()),
                _ => {
                    return Err(AnalyzerError::AmbiguousColumn {
                        name: col.to_string(),
                        matches: matches.iter().map(|def| (def.visible_table().to_string(), def.column_name.clone())).collect(),
                    });
                }
            }
        }

        if !prefix.is_empty() && !scope.levels().any(|level| level.columns.iter().any(|def| def.matches_prefix(prefix))) {
            return Err(AnalyzerError::UnknownCollection(prefix.to_string()));
        }
        Err(AnalyzerError::UnknownColumn {
            name: col.to_string(),
            candidates: scope.columns
                .iter()
                .filter(|def| prefix.is_empty() || def.matches_prefix(prefix))
                .map(|def| format!("{}.{}", def.visible_table(), def.column_name))
                .collect(),
        })
    }

    pub fn lookup(col: &Column, scope: &Scope) -> Option<ColumnDef> {
        Self::resolve_column(col, scope).ok()
    }

    /// Column references of `expr`, not descending into subqueries.
    pub fn referenced_columns(expr: &Expr) -> Vec<&Column> {
        let mut out = Vec::new();
        Self::collect_columns(expr, &mut out);
        out
    }

    fn collect_columns<'e>(expr: &'e Expr, out: &mut Vec<&'e Column>) {
        match expr {
            Expr::Column(column) => out.push(column),
            Expr::Literal(_) | Expr::Parameter(_) | Expr::Wildcard | Expr::Subquery(_) | Expr::Exists(_) => {}
            Expr::Arithmetic { left, right, .. } | Expr::Compare { left, right, .. } => {
                Self::collect_columns(left, out);
                Self::collect_columns(right, out);
            }
            Expr::And(left, right) | Expr::Or(left, right) => {
                Self::collect_columns(left, out);
                Self::collect_columns(right, out);
            }
            Expr::Between { expr, low, high, .. } => {
                Self::collect_columns(expr, out);
                Self::collect_columns(low, out);
                Self::collect_columns(high, out);
            }
            Expr::InList { expr, list, .. } => {
                Self::collect_columns(expr, out);
                list.iter().for_each(|item| Self::collect_columns(item, out));
            }
            Expr::InSubquery { expr, .. } | Expr::IsNull { expr, .. } | Expr::Not(expr) | Expr::Nested(expr) => {
                Self::collect_columns(expr, out)
            }
            Expr::Like { expr, pattern, .. } => {
                Self::collect_columns(expr, out);
                Self::collect_columns(pattern, out);
            }
            Expr::Function(fun) => fun.args.iter().for_each(|arg| Self::collect_columns(arg, out)),
            Expr::Case { operand, branches, else_result } => {
                if let Some(operand) = operand {
                    Self::collect_columns(operand, out);
                }
                for branch in branches {
                    Self::collect_columns(&branch.condition, out);
                    Self::collect_columns(&branch.result, out);
                }
                if let Some(else_result) = else_result {
                    Self::collect_columns(else_result, out);
                }
            }
        }
    }
}
