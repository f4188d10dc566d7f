use crate::{
    analyzer::{AnalysisContext, AnalyzerError, Constraint, FunctionImpl, InferredExpr, VarType},
    ast::Function,
};

fn infer_extreme(fun: &Function, args: &[InferredExpr], ctx: &mut AnalysisContext) -> InferredExpr {
    let label = fun.to_string();
    let var = ctx.fresh(label.clone(), VarType::Unknown);
    ctx.push(Constraint::best_effort(label, &var, &args[0].var));
    InferredExpr::new(var, args[0].not_null)
}

pub struct MinImpl;
impl FunctionImpl for MinImpl {
    fn name(&self) -> &'static str { "min" }
    fn arity(&self) -> (usize, Option<usize>) { (1, Some(1)) }
    fn is_aggregate(&self) -> bool { true }

    fn infer_type(&self, fun: &Function, args: &[InferredExpr], ctx: &mut AnalysisContext) -> Result<InferredExpr, AnalyzerError> {
        Ok(infer_extreme(fun, args, ctx))
    }
}

pub struct MaxImpl;
impl FunctionImpl for MaxImpl {
    fn name(&self) -> &'static str { "max" }
    fn arity(&self) -> (usize, Option<usize>) { (1, Some(1)) }
    fn is_aggregate(&self) -> bool { true }

    fn infer_type(&self, fun: &Function, args: &[InferredExpr], ctx: &mut AnalysisContext) -> Result<InferredExpr, AnalyzerError> {
        Ok(infer_extreme(fun, args, ctx))
    }
}
