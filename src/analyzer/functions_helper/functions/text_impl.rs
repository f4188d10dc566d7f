use crate::{
    analyzer::{AnalysisContext, AnalyzerError, Constraint, FunctionImpl, InferredExpr},
    ast::Function,
};

/// `upper`, `lower`, `trim`: text in, text out.
pub struct TextFunctionImpl {
    name: &'static str,
}

impl TextFunctionImpl {
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }
}

impl FunctionImpl for TextFunctionImpl {
    fn name(&self) -> &'static str { self.name }
    fn arity(&self) -> (usize, Option<usize>) { (1, Some(1)) }

    fn infer_type(&self, fun: &Function, args: &[InferredExpr], ctx: &mut AnalysisContext) -> Result<InferredExpr, AnalyzerError> {
        let label = fun.to_string();
        let var = ctx.fresh_concrete(label.clone(), ctx.config.text_type);
        ctx.push(Constraint::best_effort(label, &var, &args[0].var));
        Ok(InferredExpr::new(var, args[0].not_null))
    }
}

pub struct LengthImpl;
impl FunctionImpl for LengthImpl {
    fn name(&self) -> &'static str { "length" }
    fn arity(&self) -> (usize, Option<usize>) { (1, Some(1)) }

    fn infer_type(&self, fun: &Function, args: &[InferredExpr], ctx: &mut AnalysisContext) -> Result<InferredExpr, AnalyzerError> {
        let label = fun.to_string();
        let text = ctx.fresh_concrete(label.clone(), ctx.config.text_type);
        ctx.push(Constraint::best_effort(label.clone(), &text, &args[0].var));
        let var = ctx.fresh_concrete(label, ctx.config.integer_literal_type);
        Ok(InferredExpr::new(var, args[0].not_null))
    }
}
