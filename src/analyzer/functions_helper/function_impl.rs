use crate::{
    analyzer::{AnalysisContext, AnalyzerError, InferredExpr},
    ast::Function,
};

/// Typing rule for one SQL function.
/// One instance is registered per function name; it is stateless and shared.
pub trait FunctionImpl: Send + Sync {
    /// Canonical lowercase function name ("count", "coalesce", ...).
    fn name(&self) -> &'static str;

    /// Minimum and (optional) maximum argument count.
    fn arity(&self) -> (usize, Option<usize>);

    fn is_aggregate(&self) -> bool { false }

    /// Emits the function's constraints and returns its type and nullability.
    /// `args` are already analyzed, in call order; `COUNT(*)` arrives with none.
    fn infer_type(&self, fun: &Function, args: &[InferredExpr], ctx: &mut AnalysisContext) -> Result<InferredExpr, AnalyzerError>;
}
