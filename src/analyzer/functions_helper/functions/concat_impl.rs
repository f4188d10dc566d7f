use crate::{
    analyzer::{AnalysisContext, AnalyzerError, Constraint, FunctionImpl, InferredExpr},
    ast::Function,
};

/// Every argument is unified against the text result; placeholders become text.
fn infer_concat(fun: &Function, args: &[InferredExpr], ctx: &mut AnalysisContext) -> InferredExpr {
    let label = fun.to_string();
    let var = ctx.fresh_concrete(label.clone(), ctx.config.text_type);
    for arg in args {
        ctx.push(Constraint::best_effort(label.clone(), &var, &arg.var));
    }
    InferredExpr::new(var, args.iter().all(|arg| arg.not_null))
}

pub struct ConcatImpl;
impl FunctionImpl for ConcatImpl {
    fn name(&self) -> &'static str { "concat" }
    fn arity(&self) -> (usize, Option<usize>) { (1, None) }

    fn infer_type(&self, fun: &Function, args: &[InferredExpr], ctx: &mut AnalysisContext) -> Result<InferredExpr, AnalyzerError> {
        Ok(infer_concat(fun, args, ctx))
    }
}

pub struct ConcatWsImpl;
impl FunctionImpl for ConcatWsImpl {
    fn name(&self) -> &'static str { "concat_ws" }
    fn arity(&self) -> (usize, Option<usize>) { (2, None) }

    fn infer_type(&self, fun: &Function, args: &[InferredExpr], ctx: &mut AnalysisContext) -> Result<InferredExpr, AnalyzerError> {
        Ok(infer_concat(fun, args, ctx))
    }
}
