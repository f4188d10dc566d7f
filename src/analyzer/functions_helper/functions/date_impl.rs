use crate::{
    analyzer::{AnalysisContext, AnalyzerError, Constraint, FunctionImpl, InferredExpr},
    ast::Function,
};

/// `date`, `time`, `datetime` and `strftime`: text result, the date argument
/// pinned to the dialect's date type. The result is NULL for unparsable input.
pub struct DateFunctionImpl {
    name: &'static str,
    date_arg: usize,
}

impl DateFunctionImpl {
    pub fn new(name: &'static str, date_arg: usize) -> Self {
        Self { name, date_arg }
    }
}

impl FunctionImpl for DateFunctionImpl {
    fn name(&self) -> &'static str { self.name }
    fn arity(&self) -> (usize, Option<usize>) { (self.date_arg + 1, None) }

    fn infer_type(&self, fun: &Function, args: &[InferredExpr], ctx: &mut AnalysisContext) -> Result<InferredExpr, AnalyzerError> {
        let label = fun.to_string();
        let date_arg = &args[self.date_arg];
        let date = ctx.fresh_concrete(date_arg.var.name.clone(), ctx.config.date_type);
        ctx.push(Constraint::best_effort(date_arg.var.name.clone(), &date, &date_arg.var));
        ctx.force_not_null(date_arg);

        let var = ctx.fresh_concrete(label, ctx.config.text_type);
        Ok(InferredExpr::new(var, false))
    }
}
