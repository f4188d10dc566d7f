use crate::{
    analyzer::{AnalysisContext, AnalyzerError, ColumnResolver, Constraint, ExprResolver, Scope},
    ast::{Assignment, Column, Expr},
};

pub struct UpdateResolver;

impl UpdateResolver {
    /// Binds each SET value to its column, then collects the WHERE clause.
    /// Returns how many of the run's parameters belong to the SET list.
    pub fn analyze_update(
        table: &str,
        assignments: &[Assignment],
        criteria: Option<&Expr>,
        ctx: &mut AnalysisContext,
    ) -> Result<usize, AnalyzerError> {
        let scope = Scope::new(ctx.table_columns(table, None)?, None);

        for assignment in assignments {
            let target = ColumnResolver::resolve_column(&Column::parse_name(&assignment.column), &scope)?;
            let value = ExprResolver::infer_expr(&assignment.value, &scope, ctx)?;
            let column = ctx.reference_column(&target);
            ctx.push(Constraint::strict(format!("{} = {}", assignment.column, assignment.value), &column, &value.var));
            if let Some(index) = value.parameter {
                ctx.set_parameter_nullability(index, target.not_null);
            }
        }
        let data_parameters = ctx.parameters.len();

        if let Some(criteria) = criteria {
            ExprResolver::infer_expr(criteria, &scope, ctx)?;
        }
        Ok(data_parameters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        analyzer::{fixtures::mysql_schema, Unifier},
        config::Config,
        schema::SqlType,
    };

    #[test]
    fn set_and_where_parameters_are_split() {
        let schema = mysql_schema();
        let config = Config::mysql();
        let mut ctx = AnalysisContext::new(&schema, &config);
        let assignments = vec![
            Assignment { column: "value".into(), value: Expr::param() },
            Assignment { column: "name".into(), value: Expr::named("name") },
        ];
        let criteria = Expr::eq(Expr::col("id"), Expr::param());

        let split = UpdateResolver::analyze_update("mytable3", &[assignments[1].clone()], Some(&criteria), &mut ctx).unwrap();
        assert_eq!(split, 1);
        let substitution = Unifier::solve(&ctx.constraints, &config).unwrap();
        let resolved: Vec<(SqlType, bool)> = ctx.parameters
            .iter()
            .map(|p| (substitution.resolve(&p.var, &config), p.not_null))
            .collect();
        assert_eq!(resolved, vec![(SqlType::Varchar, true), (SqlType::Int, true)]);

        let mut ctx = AnalysisContext::new(&schema, &config);
        let split = UpdateResolver::analyze_update("mytable1", &assignments[..1], None, &mut ctx).unwrap();
        assert_eq!(split, 1);
        assert!(!ctx.parameters[0].not_null);
    }

    #[test]
    fn unknown_set_column_is_an_error() {
        let schema = mysql_schema();
        let config = Config::mysql();
        let mut ctx = AnalysisContext::new(&schema, &config);
        let assignments = vec![Assignment { column: "nope".into(), value: Expr::int(1) }];
        let err = UpdateResolver::analyze_update("mytable1", &assignments, None, &mut ctx).unwrap_err();
        assert!(matches!(err, AnalyzerError::UnknownColumn { .. }));
    }
}
