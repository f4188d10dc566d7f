use crate::{
    analyzer::{ColumnDef, ColumnResolver, Scope},
    ast::{ComparatorOp, Expr, Limit, Literal},
    schema::ColumnKey,
};

/// The parts of one SELECT that decide whether it can return more than one row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryShape {
    pub union: bool,
    pub group_by: bool,
    pub has_from: bool,
    pub all_aggregates: bool,
    /// One physical table, no joins, and the WHERE conjunction pins its primary key.
    pub single_table_key_filter: bool,
    pub limit_one: bool,
}

pub struct CardinalityAnalyzer;

impl CardinalityAnalyzer {
    /// Checked in order: UNION, GROUP BY, missing FROM, all-aggregate
    /// projection, primary key filter, `LIMIT 1`.
    pub fn is_multiple_rows(shape: &QueryShape) -> bool {
        if shape.union || shape.group_by {
            return true;
        }
        if !shape.has_from || shape.all_aggregates {
            return false;
        }
        !(shape.single_table_key_filter || shape.limit_one)
    }

    /// Whether a top-level conjunct of `criteria` is an equality on a primary key
    /// column visible in `scope`.
    pub fn has_primary_key_filter(criteria: &Expr, scope: &Scope) -> bool {
        match criteria.unnested() {
            Expr::And(left, right) => {
                Self::has_primary_key_filter(left, scope) || Self::has_primary_key_filter(right, scope)
            }
            Expr::Compare { left, op: ComparatorOp::Eq, right } => {
                Self::is_primary_key(left, scope) || Self::is_primary_key(right, scope)
            }
            _ => false,
        }
    }

    fn is_primary_key(expr: &Expr, scope: &Scope) -> bool {
        expr.as_column().is_some_and(|column| {
            scope.columns
                .iter()
                .any(|def| def.matches(column.collection(), column.name()) && def.column_key == ColumnKey::Primary)
        })
    }

    pub fn is_limit_one(limit: Option<&Limit>) -> bool {
        matches!(limit.map(|limit| limit.count.unnested()), Some(Expr::Literal(Literal::Int(1))))
    }

    /// Whether `criteria` only lets rows through where `def` is not null.
    /// A conjunction proves it when either side does, a disjunction only when
    /// both do.
    pub fn proves_not_null(criteria: &Expr, def: &ColumnDef, scope: &Scope) -> bool {
        match criteria {
            Expr::Nested(inner) => Self::proves_not_null(inner, def, scope),
            Expr::And(left, right) => {
                Self::proves_not_null(left, def, scope) || Self::proves_not_null(right, def, scope)
            }
            Expr::Or(left, right) => {
                Self::proves_not_null(left, def, scope) && Self::proves_not_null(right, def, scope)
            }
            Expr::Compare { left, right, .. } => Self::refers_to(left, def, scope) || Self::refers_to(right, def, scope),
            Expr::IsNull { expr, negated: true } => Self::refers_to(expr, def, scope),
            _ => false,
        }
    }

    fn refers_to(expr: &Expr, def: &ColumnDef, scope: &Scope) -> bool {
        expr.as_column()
            .and_then(|column| ColumnResolver::lookup(column, scope))
            .is_some_and(|found| found.same_column(def))
    }
}
