use std::{collections::HashMap, sync::Arc};

use once_cell::sync::Lazy;

use crate::{
    analyzer::{
        AnalysisContext, AnalyzerError, AvgImpl, CoalesceImpl, ConcatImpl, ConcatWsImpl, CountImpl, DateFunctionImpl,
        FloorImpl, FunctionImpl, IfNullImpl, InferredExpr, LengthImpl, MaxImpl, MinImpl, RoundImpl, SumImpl, TextFunctionImpl,
    },
    ast::Function,
};

/// Process-wide registry of the built-in functions. Read-only after init.
pub static FUNCTIONS: Lazy<FunctionRegistry> = Lazy::new(FunctionRegistry::default_function_registry);

/// Case-insensitive registry of function typing rules.
#[derive(Default)]
pub struct FunctionRegistry {
    by_name: HashMap<String, Arc<dyn FunctionImpl>>,
}

impl FunctionRegistry {
    pub fn new() -> Self { Self { by_name: HashMap::new() } }

    pub fn register<I: FunctionImpl + 'static>(&mut self, impl_: I) {
        self.by_name.insert(impl_.name().to_string(), Arc::new(impl_));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn FunctionImpl>> {
        self.by_name.get(&name.to_ascii_lowercase()).cloned()
    }

    pub fn is_aggregate(&self, name: &str) -> bool {
        self.get(name).is_some_and(|imp| imp.is_aggregate())
    }

    pub fn list(&self) -> Vec<String> {
        let mut v: Vec<_> = self.by_name.keys().cloned().collect();
        v.sort();
        v
    }

    /// Checks the argument count, then routes to the function's rule.
    pub fn infer_type(&self, fun: &Function, args: &[InferredExpr], ctx: &mut AnalysisContext) -> Result<InferredExpr, AnalyzerError> {
        let imp = self.get(&fun.name).ok_or_else(|| AnalyzerError::FunctionNotFound(fun.name.clone()))?;
        let (min, max) = imp.arity();
        if args.len() < min || max.is_some_and(|max| args.len() > max) {
            let expected = match max {
                Some(max) if max == min => min.to_string(),
                Some(max) => format!("{}..{}", min, max),
                None => format!("{}+", min),
            };
            return Err(AnalyzerError::FunctionArgMismatch { name: fun.lower_name(), expected, got: args.len() });
        }
        let inferred = imp.infer_type(fun, args, ctx)?;
        Ok(if imp.is_aggregate() { inferred.aggregated() } else { inferred })
    }

    pub fn default_function_registry() -> Self {
        let mut registry = Self::new();
        registry.register(CountImpl);
        registry.register(SumImpl);
        registry.register(AvgImpl);
        registry.register(MinImpl);
        registry.register(MaxImpl);
        registry.register(ConcatImpl);
        registry.register(ConcatWsImpl);
        registry.register(CoalesceImpl);
        registry.register(IfNullImpl);
        registry.register(RoundImpl);
        registry.register(FloorImpl);
        registry.register(DateFunctionImpl::new("date", 0));
        registry.register(DateFunctionImpl::new("time", 0));
        registry.register(DateFunctionImpl::new("datetime", 0));
        registry.register(DateFunctionImpl::new("strftime", 1));
        registry.register(TextFunctionImpl::new("upper"));
        registry.register(TextFunctionImpl::new("lower"));
        registry.register(TextFunctionImpl::new("trim"));
        registry.register(LengthImpl);
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        analyzer::{fixtures::mysql_schema, Unifier, VarType},
        ast::Expr,
        config::Config,
        schema::SqlType,
    };

    fn arg(ctx: &mut AnalysisContext, ty: SqlType, not_null: bool) -> InferredExpr {
        let var = ctx.fresh("arg", VarType::Concrete(ty));
        InferredExpr::new(var, not_null)
    }

    #[test]
    fn registry_contains_all_and_lookup_is_case_insensitive() {
        let names = FUNCTIONS.list();
        for expected in ["avg", "coalesce", "concat", "count", "floor", "ifnull", "max", "min", "round", "strftime", "sum"] {
            assert!(names.iter().any(|n| n == expected), "missing {expected}");
        }
        assert!(FUNCTIONS.get("COUNT").is_some());
        assert!(FUNCTIONS.is_aggregate("Sum"));
        assert!(!FUNCTIONS.is_aggregate("coalesce"));
    }

    #[test]
    fn unknown_function_and_bad_arity_are_errors() {
        let schema = mysql_schema();
        let config = Config::mysql();
        let mut ctx = AnalysisContext::new(&schema, &config);

        let err = FUNCTIONS.infer_type(&Function::new("soundex", vec![]), &[], &mut ctx).unwrap_err();
        assert_eq!(err, AnalyzerError::FunctionNotFound("soundex".into()));

        let err = FUNCTIONS.infer_type(&Function::new("sum", vec![]), &[], &mut ctx).unwrap_err();
        assert!(matches!(err, AnalyzerError::FunctionArgMismatch { got: 0, .. }));
    }

    #[test]
    fn aggregate_rules_match_nullability_table() {
        let schema = mysql_schema();
        let config = Config::mysql();
        let mut ctx = AnalysisContext::new(&schema, &config);
        let int_not_null = arg(&mut ctx, SqlType::Int, true);
        let int_nullable = arg(&mut ctx, SqlType::Int, false);

        let count = FUNCTIONS.infer_type(&Function::new("count", vec![Expr::Wildcard]), &[], &mut ctx).unwrap();
        let sum = FUNCTIONS.infer_type(&Function::new("sum", vec![Expr::col("id")]), &[int_not_null.clone()], &mut ctx).unwrap();
        let avg = FUNCTIONS.infer_type(&Function::new("avg", vec![Expr::col("id")]), &[int_not_null.clone()], &mut ctx).unwrap();
        let min = FUNCTIONS.infer_type(&Function::new("min", vec![Expr::col("value")]), &[int_nullable.clone()], &mut ctx).unwrap();
        let max = FUNCTIONS.infer_type(&Function::new("max", vec![Expr::col("id")]), &[int_not_null], &mut ctx).unwrap();

        assert!(count.not_null && count.aggregate);
        assert!(!sum.not_null && sum.aggregate);
        assert!(!avg.not_null);
        assert!(!min.not_null);
        assert!(max.not_null);

        let substitution = Unifier::solve(&ctx.constraints, &config).unwrap();
        assert_eq!(substitution.resolve(&count.var, &config), SqlType::BigInt);
        assert_eq!(substitution.resolve(&sum.var, &config), SqlType::Decimal);
        assert_eq!(substitution.resolve(&avg.var, &config), SqlType::Decimal);
        assert_eq!(substitution.resolve(&min.var, &config), SqlType::Int);
    }

    #[test]
    fn coalesce_is_not_null_only_when_every_argument_is() {
        let schema = mysql_schema();
        let config = Config::mysql();
        let mut ctx = AnalysisContext::new(&schema, &config);
        let fun = Function::new("coalesce", vec![Expr::col("a"), Expr::col("b")]);

        let a = arg(&mut ctx, SqlType::Int, true);
        let b = arg(&mut ctx, SqlType::Int, true);
        assert!(FUNCTIONS.infer_type(&fun, &[a.clone(), b], &mut ctx).unwrap().not_null);

        let null_literal = InferredExpr::new(ctx.fresh("NULL", VarType::Unknown), false);
        assert!(!FUNCTIONS.infer_type(&fun, &[a, null_literal], &mut ctx).unwrap().not_null);
    }

    #[test]
    fn ifnull_treats_bare_placeholder_as_nullable() {
        let schema = mysql_schema();
        let config = Config::mysql();
        let mut ctx = AnalysisContext::new(&schema, &config);
        let fun = Function::new("ifnull", vec![Expr::col("id"), Expr::param()]);

        let column = arg(&mut ctx, SqlType::Int, true);
        let mut param = ctx.add_parameter(&crate::ast::Parameter { name: None }, false);
        param.not_null = true;
        let inferred = FUNCTIONS.infer_type(&fun, &[column, param.clone()], &mut ctx).unwrap();
        assert!(!inferred.not_null);

        let substitution = Unifier::solve(&ctx.constraints, &config).unwrap();
        assert_eq!(substitution.resolve(&param.var, &config), SqlType::Int);
    }
}
