use crate::{
    analyzer::{AnalysisContext, AnalyzerError, ExprResolver, Scope},
    ast::Expr,
};

pub struct DeleteResolver;

impl DeleteResolver {
    /// Only the WHERE clause carries placeholders.
    pub fn analyze_delete(table: &str, criteria: Option<&Expr>, ctx: &mut AnalysisContext) -> Result<(), AnalyzerError> {
        let scope = Scope::new(ctx.table_columns(table, None)?, None);
        if let Some(criteria) = criteria {
            ExprResolver::infer_expr(criteria, &scope, ctx)?;
        }
        Ok(())
    }
}
