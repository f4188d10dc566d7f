use crate::{analyzer::{AnalysisContext, AnalyzerError, FunctionImpl, InferredExpr}, ast::Function};

pub struct CountImpl;
impl FunctionImpl for CountImpl {
    fn name(&self) -> &'static str { "count" }
    fn arity(&self) -> (usize, Option<usize>) { (0, Some(1)) }
    fn is_aggregate(&self) -> bool { true }

    fn infer_type(&self, fun: &Function, _args: &[InferredExpr], ctx: &mut AnalysisContext) -> Result<InferredExpr, AnalyzerError> {
        let var = ctx.fresh_concrete(fun.to_string(), ctx.config.count_type);
        Ok(InferredExpr::new(var, true))
    }
}
