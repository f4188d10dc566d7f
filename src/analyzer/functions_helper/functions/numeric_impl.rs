use crate::{
    analyzer::{AnalysisContext, AnalyzerError, Constraint, FunctionImpl, InferredExpr, VarType},
    ast::Function,
};

/// `ROUND(x [, d])` keeps the type of `x`.
pub struct RoundImpl;
impl FunctionImpl for RoundImpl {
    fn name(&self) -> &'static str { "round" }
    fn arity(&self) -> (usize, Option<usize>) { (1, Some(2)) }

    fn infer_type(&self, fun: &Function, args: &[InferredExpr], ctx: &mut AnalysisContext) -> Result<InferredExpr, AnalyzerError> {
        let label = fun.to_string();
        let var = ctx.fresh(label.clone(), VarType::Unknown);
        ctx.push(Constraint::strict(label.clone(), &var, &args[0].var));
        if let Some(digits) = args.get(1) {
            let integer = ctx.fresh_concrete(label, ctx.config.integer_literal_type);
            ctx.push(Constraint::best_effort(digits.var.name.clone(), &digits.var, &integer));
        }
        Ok(InferredExpr::new(var, args.iter().all(|arg| arg.not_null)))
    }
}

/// `FLOOR(x)`: integer result over a floating argument.
pub struct FloorImpl;
impl FunctionImpl for FloorImpl {
    fn name(&self) -> &'static str { "floor" }
    fn arity(&self) -> (usize, Option<usize>) { (1, Some(1)) }

    fn infer_type(&self, fun: &Function, args: &[InferredExpr], ctx: &mut AnalysisContext) -> Result<InferredExpr, AnalyzerError> {
        let label = fun.to_string();
        for arg in args {
            let float = ctx.fresh_concrete(label.clone(), ctx.config.float_type);
            ctx.push(Constraint::best_effort(label.clone(), &arg.var, &float));
        }
        let var = ctx.fresh_concrete(label, ctx.config.floor_type);
        Ok(InferredExpr::new(var, args.iter().all(|arg| arg.not_null)))
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        analyzer::{fixtures::mysql_schema, AnalysisContext, Unifier, FUNCTIONS},
        ast::{Expr, Function, Parameter},
        config::Config,
        schema::SqlType,
    };

    #[test]
    fn floor_pins_placeholder_to_double_and_returns_integer() {
        let schema = mysql_schema();
        let config = Config::mysql();
        let mut ctx = AnalysisContext::new(&schema, &config);
        let param = ctx.add_parameter(&Parameter { name: None }, false);

        let inferred = FUNCTIONS
            .infer_type(&Function::new("floor", vec![Expr::param()]), &[param.clone()], &mut ctx)
            .unwrap();
        let substitution = Unifier::solve(&ctx.constraints, &config).unwrap();
        assert_eq!(substitution.resolve(&param.var, &config), SqlType::Double);
        assert_eq!(substitution.resolve(&inferred.var, &config), SqlType::BigInt);
    }
}
