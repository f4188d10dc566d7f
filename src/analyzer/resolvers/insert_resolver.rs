use crate::{
    analyzer::{AnalysisContext, AnalyzerError, ColumnDef, Constraint, ExprResolver, Scope, SelectResolver, Type, TypeVar},
    ast::InsertSource,
};

pub struct InsertResolver;

impl InsertResolver {
    /// Binds every VALUES tuple (or the SELECT's columns) positionally to the
    /// target columns. A bare placeholder takes the nullability of its column.
    pub fn analyze_insert(
        table: &str,
        columns: &[String],
        source: &InsertSource,
        ctx: &mut AnalysisContext,
    ) -> Result<(), AnalyzerError> {
        let targets = Self::target_columns(table, columns, ctx)?;

        match source {
            InsertSource::Values(rows) => {
                let scope = Scope::empty();
                for row in rows {
                    if row.len() != targets.len() {
                        return Err(AnalyzerError::ColumnCountMismatch { expected: targets.len(), got: row.len() });
                    }
                    let values = row
                        .iter()
                        .map(|expr| ExprResolver::infer_expr(expr, &scope, ctx))
                        .collect::<Result<Vec<_>, _>>()?;
                    let label = format!("({})", row.iter().map(|expr| expr.to_string()).collect::<Vec<_>>().join(", "));
                    Self::bind(&label, &targets, values.iter().map(|value| (value.var.clone(), value.parameter)), ctx);
                }
            }
            InsertSource::Select(select) => {
                let analyzed = SelectResolver::analyze_select(select, None, ctx)?;
                if analyzed.columns.len() != targets.len() {
                    return Err(AnalyzerError::ColumnCountMismatch { expected: targets.len(), got: analyzed.columns.len() });
                }
                let values = analyzed.columns.iter().map(|column| (column.var.clone(), column.parameter));
                Self::bind(&select.to_string(), &targets, values, ctx);
            }
        }
        Ok(())
    }

    fn bind(
        label: &str,
        targets: &[ColumnDef],
        values: impl Iterator<Item = (TypeVar, Option<usize>)>,
        ctx: &mut AnalysisContext,
    ) {
        let mut target_vars = Vec::with_capacity(targets.len());
        let mut value_vars = Vec::with_capacity(targets.len());
        for (target, (var, parameter)) in targets.iter().zip(values) {
            target_vars.push(ctx.reference_column(target));
            value_vars.push(var);
            if let Some(index) = parameter {
                ctx.set_parameter_nullability(index, target.not_null);
            }
        }
        ctx.push(Constraint::strict(label, Type::operator(target_vars), Type::operator(value_vars)));
    }

    /// Named target columns, or every column of the table when none are listed.
    fn target_columns(table: &str, columns: &[String], ctx: &mut AnalysisContext) -> Result<Vec<ColumnDef>, AnalyzerError> {
        let all = ctx.table_columns(table, None)?;
        if columns.is_empty() {
            return Ok(all);
        }
        columns
            .iter()
            .map(|name| {
                all.iter()
                    .find(|def| def.column_name.eq_ignore_ascii_case(name))
                    .cloned()
                    .ok_or_else(|| AnalyzerError::UnknownColumn {
                        name: name.clone(),
                        candidates: all.iter().map(|def| format!("{}.{}", def.table, def.column_name)).collect(),
                    })
            })
            .collect()
    }
}
