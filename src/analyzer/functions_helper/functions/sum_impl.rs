use crate::{
    analyzer::{AnalysisContext, AnalyzerError, Coercion, Constraint, FunctionImpl, InferredExpr, VarType},
    ast::Function,
};

/// `SUM(x)`: widened from its argument; NULL over an empty group.
pub struct SumImpl;
impl FunctionImpl for SumImpl {
    fn name(&self) -> &'static str { "sum" }
    fn arity(&self) -> (usize, Option<usize>) { (1, Some(1)) }
    fn is_aggregate(&self) -> bool { true }

    fn infer_type(&self, fun: &Function, args: &[InferredExpr], ctx: &mut AnalysisContext) -> Result<InferredExpr, AnalyzerError> {
        let label = fun.to_string();
        let var = ctx.fresh(label.clone(), VarType::Unknown);
        ctx.push(Constraint::most_general(label, &var, &args[0].var).with_coercion(Coercion::SumFunction));
        Ok(InferredExpr::new(var, false))
    }
}
