use crate::{
    analyzer::{AnalysisContext, AnalyzerError, Constraint, FunctionImpl, InferredExpr, TypeVar, VarType},
    ast::Function,
};

fn unify_arguments(fun: &Function, args: &[InferredExpr], ctx: &mut AnalysisContext) -> TypeVar {
    let label = fun.to_string();
    let var = ctx.fresh(label.clone(), VarType::Unknown);
    for arg in args {
        ctx.push(Constraint::most_general(label.clone(), &var, &arg.var));
    }
    var
}

/// `COALESCE(a, b, ...)`: not-null only when every argument is not-null.
pub struct CoalesceImpl;
impl FunctionImpl for CoalesceImpl {
    fn name(&self) -> &'static str { "coalesce" }
    fn arity(&self) -> (usize, Option<usize>) { (1, None) }

    fn infer_type(&self, fun: &Function, args: &[InferredExpr], ctx: &mut AnalysisContext) -> Result<InferredExpr, AnalyzerError> {
        let var = unify_arguments(fun, args, ctx);
        Ok(InferredExpr::new(var, args.iter().all(|arg| arg.not_null)))
    }
}

/// `IFNULL(a, b)`: as coalesce, except a bare placeholder argument always
/// counts as nullable.
pub struct IfNullImpl;
impl FunctionImpl for IfNullImpl {
    fn name(&self) -> &'static str { "ifnull" }
    fn arity(&self) -> (usize, Option<usize>) { (2, Some(2)) }

    fn infer_type(&self, fun: &Function, args: &[InferredExpr], ctx: &mut AnalysisContext) -> Result<InferredExpr, AnalyzerError> {
        let var = unify_arguments(fun, args, ctx);
        let not_null = args.iter().all(|arg| arg.not_null && !arg.is_parameter());
        Ok(InferredExpr::new(var, not_null))
    }
}
