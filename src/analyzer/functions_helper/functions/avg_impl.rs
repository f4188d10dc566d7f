use crate::{
    analyzer::{AnalysisContext, AnalyzerError, Constraint, FunctionImpl, InferredExpr, VarType},
    ast::Function,
};

pub struct AvgImpl;
impl FunctionImpl for AvgImpl {
    fn name(&self) -> &'static str { "avg" }
    fn arity(&self) -> (usize, Option<usize>) { (1, Some(1)) }
    fn is_aggregate(&self) -> bool { true }

    fn infer_type(&self, fun: &Function, args: &[InferredExpr], ctx: &mut AnalysisContext) -> Result<InferredExpr, AnalyzerError> {
        let label = fun.to_string();
        let numeric = ctx.fresh(label.clone(), VarType::Number);
        ctx.push(Constraint::best_effort(label.clone(), &args[0].var, &numeric));
        let var = ctx.fresh_concrete(label, ctx.config.avg_type);
        Ok(InferredExpr::new(var, false))
    }
}
