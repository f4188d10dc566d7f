use crate::{
    analyzer::{
        AnalysisContext, AnalyzerError, ColumnResolver, Coercion, Constraint, InferredExpr, Scope, SelectResolver, Type,
        VarType, FUNCTIONS,
    },
    ast::{Expr, Literal, Select, WhenClause},
};

/// Constraint collection for scalar expressions and predicates.
pub struct ExprResolver;

impl ExprResolver {
    pub fn infer_expr(expr: &Expr, scope: &Scope, ctx: &mut AnalysisContext) -> Result<InferredExpr, AnalyzerError> {
        match expr {
            Expr::Literal(literal) => Ok(Self::infer_literal(literal, ctx)),
            Expr::Column(column) => {
                let def = ColumnResolver::resolve_column(column, scope)?;
                let var = ctx.reference_column(&def);
                Ok(InferredExpr::column(var, def))
            }
            Expr::Parameter(parameter) => Ok(ctx.add_parameter(parameter, false)),
            Expr::Nested(inner) => Self::infer_expr(inner, scope, ctx),
            Expr::Arithmetic { left, right, .. } => {
                let label = expr.to_string();
                let left = Self::infer_expr(left, scope, ctx)?;
                let right = Self::infer_expr(right, scope, ctx)?;
                let var = ctx.fresh(label.clone(), VarType::Number);
                ctx.push(Constraint::most_general(label.clone(), &left.var, &right.var).with_coercion(Coercion::Sum));
                ctx.push(Constraint::most_general(label.clone(), &var, &left.var).with_coercion(Coercion::Sum));
                ctx.push(Constraint::most_general(label, &var, &right.var).with_coercion(Coercion::Sum));
                Ok(InferredExpr::new(var, left.not_null && right.not_null))
            }
            Expr::Compare { left, right, .. } => {
                let left = Self::infer_expr(left, scope, ctx)?;
                let right = Self::infer_expr(right, scope, ctx)?;
                ctx.push(Constraint::strict(expr.to_string(), &left.var, &right.var));
                ctx.force_not_null(&left);
                ctx.force_not_null(&right);
                Ok(Self::predicate(expr, ctx))
            }
            Expr::Between { expr: value, low, high, .. } => {
                let value = Self::infer_expr(value, scope, ctx)?;
                let low = Self::infer_expr(low, scope, ctx)?;
                let high = Self::infer_expr(high, scope, ctx)?;
                ctx.push(Constraint::strict(expr.to_string(), &value.var, &low.var));
                ctx.push(Constraint::strict(expr.to_string(), &value.var, &high.var));
                for operand in [&value, &low, &high] {
                    ctx.force_not_null(operand);
                }
                Ok(Self::predicate(expr, ctx))
            }
            Expr::InList { expr: value, list, .. } => {
                let value = Self::infer_expr(value, scope, ctx)?;
                ctx.force_not_null(&value);
                let items = match list.as_slice() {
                    [Expr::Parameter(parameter)] => vec![ctx.add_parameter(parameter, true)],
                    _ => list.iter().map(|item| Self::infer_expr(item, scope, ctx)).collect::<Result<Vec<_>, _>>()?,
                };
                let is_list = items.iter().any(|item| item.var.list);
                let mut constraint = Constraint::strict(
                    expr.to_string(),
                    &value.var,
                    Type::operator(items.iter().map(|item| item.var.clone())),
                );
                if is_list {
                    constraint = constraint.as_list();
                }
                ctx.push(constraint);
                for item in &items {
                    ctx.force_not_null(item);
                }
                Ok(Self::predicate(expr, ctx))
            }
            Expr::InSubquery { expr: value, subquery, .. } => {
                let value = Self::infer_expr(value, scope, ctx)?;
                ctx.force_not_null(&value);
                let column = Self::infer_subquery(subquery, scope, ctx)?;
                ctx.push(Constraint::strict(expr.to_string(), &value.var, Type::operator([column.var])));
                Ok(Self::predicate(expr, ctx))
            }
            Expr::Like { expr: value, pattern, .. } => {
                let value = Self::infer_expr(value, scope, ctx)?;
                let pattern = Self::infer_expr(pattern, scope, ctx)?;
                let text = ctx.fresh_concrete(pattern.var.name.clone(), ctx.config.text_type);
                ctx.push(Constraint::best_effort(expr.to_string(), &text, &pattern.var));
                ctx.push(Constraint::best_effort(expr.to_string(), &value.var, &pattern.var));
                ctx.force_not_null(&value);
                ctx.force_not_null(&pattern);
                Ok(Self::predicate(expr, ctx))
            }
            Expr::IsNull { expr: value, .. } => {
                Self::infer_expr(value, scope, ctx)?;
                Ok(Self::predicate(expr, ctx))
            }
            Expr::And(left, right) | Expr::Or(left, right) => {
                Self::infer_expr(left, scope, ctx)?;
                Self::infer_expr(right, scope, ctx)?;
                Ok(Self::predicate(expr, ctx))
            }
            Expr::Not(inner) => {
                Self::infer_expr(inner, scope, ctx)?;
                Ok(Self::predicate(expr, ctx))
            }
            Expr::Function(fun) => {
                let args = fun.args
                    .iter()
                    .filter(|arg| !matches!(arg, Expr::Wildcard))
                    .map(|arg| Self::infer_expr(arg, scope, ctx))
                    .collect::<Result<Vec<_>, _>>()?;
                FUNCTIONS.infer_type(fun, &args, ctx)
            }
            Expr::Case { operand, branches, else_result } => {
                Self::infer_case(expr, operand.as_deref(), branches, else_result.as_deref(), scope, ctx)
            }
            Expr::Subquery(select) => Self::infer_subquery(select, scope, ctx),
            Expr::Exists(select) => {
                SelectResolver::analyze_select(select, Some(scope), ctx)?;
                Ok(Self::predicate(expr, ctx))
            }
            Expr::Wildcard => Err(AnalyzerError::Unsupported(expr.to_string())),
        }
    }

    fn infer_literal(literal: &Literal, ctx: &mut AnalysisContext) -> InferredExpr {
        let label = literal.to_string();
        match literal {
            Literal::String(_) => InferredExpr::new(ctx.fresh_concrete(label, ctx.config.text_type), true),
            Literal::Int(_) => InferredExpr::new(ctx.fresh_concrete(label, ctx.config.integer_literal_type), true),
            Literal::Float(_) => InferredExpr::new(ctx.fresh_concrete(label, ctx.config.float_literal_type), true),
            Literal::Bool(_) => InferredExpr::new(ctx.fresh(label, VarType::Unknown), true),
            Literal::Null => InferredExpr::new(ctx.fresh(label, VarType::Unknown), false),
        }
    }

    /// Boolean-like, never null.
    fn predicate(expr: &Expr, ctx: &mut AnalysisContext) -> InferredExpr {
        InferredExpr::new(ctx.fresh_concrete(expr.to_string(), ctx.config.predicate_type), true)
    }

    /// First projected column of a scalar subquery, analyzed with the enclosing
    /// columns visible.
    fn infer_subquery(select: &Select, scope: &Scope, ctx: &mut AnalysisContext) -> Result<InferredExpr, AnalyzerError> {
        let analyzed = SelectResolver::analyze_select(select, Some(scope), ctx)?;
        let column = analyzed.columns
            .into_iter()
            .next()
            .ok_or_else(|| AnalyzerError::Unsupported(select.to_string()))?;
        Ok(InferredExpr::new(column.var, column.not_null))
    }

    fn infer_case(
        expr: &Expr,
        operand: Option<&Expr>,
        branches: &[WhenClause],
        else_result: Option<&Expr>,
        scope: &Scope,
        ctx: &mut AnalysisContext,
    ) -> Result<InferredExpr, AnalyzerError> {
        let label = expr.to_string();
        let operand = operand.map(|operand| Self::infer_expr(operand, scope, ctx)).transpose()?;
        let result = ctx.fresh(label.clone(), VarType::Unknown);
        let mut not_null = else_result.is_some();

        for branch in branches {
            let condition = Self::infer_expr(&branch.condition, scope, ctx)?;
            match &operand {
                Some(operand) => {
                    ctx.push(Constraint::strict(branch.condition.to_string(), &operand.var, &condition.var));
                    ctx.force_not_null(&condition);
                }
                None => {
                    let predicate = ctx.fresh_concrete(branch.condition.to_string(), ctx.config.predicate_type);
                    ctx.push(Constraint::best_effort(branch.condition.to_string(), &condition.var, &predicate));
                }
            }
            let then = Self::infer_expr(&branch.result, scope, ctx)?;
            ctx.push(Constraint::most_general(branch.result.to_string(), &result, &then.var));
            not_null &= then.not_null;
        }

        if let Some(else_result) = else_result {
            let inferred = Self::infer_expr(else_result, scope, ctx)?;
            ctx.push(Constraint::most_general(else_result.to_string(), &result, &inferred.var));
            not_null &= inferred.not_null;
        }

        Ok(InferredExpr::new(result, not_null))
    }
}
