use std::collections::HashMap;

use crate::{
    analyzer::{AnalyzerError, Coercion, Constraint, ConstraintKind, Type, TypeVar, TypeVarId, VarType},
    config::Config,
    schema::{SqlType, TypeFamily},
};

/// Solved type of every variable touched by a constraint. Built once by
/// [`Unifier::solve`] and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Substitution {
    types: HashMap<TypeVarId, VarType>,
}

impl Substitution {
    /// Solved type, or the variable's own type when no constraint touched it.
    pub fn var_type(&self, var: &TypeVar) -> VarType {
        self.types.get(&var.id).copied().unwrap_or(var.var_type)
    }

    /// Concrete type as seen by consumers: `number` reads as the dialect float
    /// and anything still unresolved falls back to text.
    pub fn resolve(&self, var: &TypeVar, config: &Config) -> SqlType {
        match self.var_type(var) {
            VarType::Concrete(ty) => ty,
            VarType::Number => config.float_type,
            VarType::Unknown => {
                tracing::trace!(var = var.id, name = %var.name, fallback = %config.text_type, "unresolved type variable");
                config.text_type
            }
        }
    }
}

/// Union-find over type variable ids; each class carries one [`VarType`].
pub struct Unifier<'a> {
    config: &'a Config,
    parent: HashMap<TypeVarId, TypeVarId>,
    class_type: HashMap<TypeVarId, VarType>,
}

impl<'a> Unifier<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config, parent: HashMap::new(), class_type: HashMap::new() }
    }

    /// Processes the constraints in collection order.
    pub fn solve(constraints: &[Constraint], config: &Config) -> Result<Substitution, AnalyzerError> {
        let mut unifier = Unifier::new(config);
        for constraint in constraints {
            unifier.unify(&constraint.left, &constraint.right, constraint)?;
        }
        Ok(unifier.freeze())
    }

    fn unify(&mut self, left: &Type, right: &Type, constraint: &Constraint) -> Result<(), AnalyzerError> {
        match (left, right) {
            (Type::Var(a), Type::Var(b)) => self.unify_vars(a, b, constraint),
            (Type::Operator(lefts), Type::Operator(rights)) => {
                for (l, r) in lefts.iter().zip(rights) {
                    self.unify(l, r, constraint)?;
                }
                Ok(())
            }
            (Type::Var(_), Type::Operator(rights)) => {
                for r in rights {
                    self.unify(left, r, constraint)?;
                }
                Ok(())
            }
            (Type::Operator(lefts), Type::Var(_)) => {
                for l in lefts {
                    self.unify(l, right, constraint)?;
                }
                Ok(())
            }
        }
    }

    fn unify_vars(&mut self, a: &TypeVar, b: &TypeVar, constraint: &Constraint) -> Result<(), AnalyzerError> {
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a == root_b {
            return Ok(());
        }
        let left = self.class_type[&root_a];
        let right = self.class_type[&root_b];

        let merged = match constraint.kind {
            ConstraintKind::MostGeneral => Some(self.most_general(left, right, constraint.coercion)),
            ConstraintKind::Strict | ConstraintKind::BestEffort => Self::equate(left, right),
        };

        match merged {
            Some(ty) => {
                tracing::trace!(left = %left, right = %right, result = %ty, expression = %constraint.expression, "unified");
                self.parent.insert(root_b, root_a);
                self.class_type.insert(root_a, ty);
                Ok(())
            }
            None if constraint.kind == ConstraintKind::Strict => Err(AnalyzerError::UnificationClash {
                left: left.to_string(),
                right: right.to_string(),
                expression: constraint.expression.clone(),
            }),
            None => {
                tracing::trace!(left = %left, right = %right, expression = %constraint.expression, "skipped incompatible best-effort constraint");
                Ok(())
            }
        }
    }

    /// Equality: the unresolved side adopts the other; between compatible
    /// concrete types the left side is kept, except that temporal wins over text.
    fn equate(left: VarType, right: VarType) -> Option<VarType> {
        match (left, right) {
            (VarType::Unknown, other) | (other, VarType::Unknown) => Some(other),
            (VarType::Number, VarType::Number) => Some(VarType::Number),
            (VarType::Number, VarType::Concrete(ty)) | (VarType::Concrete(ty), VarType::Number) => {
                ty.is_numeric().then_some(VarType::Concrete(ty))
            }
            (VarType::Concrete(a), VarType::Concrete(b)) if SqlType::compatible(a, b) => {
                if b.family() == TypeFamily::Temporal && a.family() == TypeFamily::Text {
                    Some(VarType::Concrete(b))
                } else {
                    Some(VarType::Concrete(a))
                }
            }
            (VarType::Concrete(_), VarType::Concrete(_)) => None,
        }
    }

    fn most_general(&self, left: VarType, right: VarType, coercion: Option<Coercion>) -> VarType {
        let left = self.coerce(left, coercion);
        let right = self.coerce(right, coercion);
        let float_rank = self.config.float_type.rank();

        match (left, right) {
            (VarType::Unknown, other) | (other, VarType::Unknown) => other,
            (VarType::Number, VarType::Number) => VarType::Number,
            (VarType::Number, VarType::Concrete(ty)) => {
                if ty.rank() > float_rank { VarType::Concrete(ty) } else { VarType::Number }
            }
            (VarType::Concrete(ty), VarType::Number) => match ty.rank() {
                None => VarType::Concrete(ty),
                rank if rank > float_rank => VarType::Concrete(ty),
                _ => VarType::Number,
            },
            (VarType::Concrete(a), VarType::Concrete(b)) => VarType::Concrete(SqlType::most_general(a, b)),
        }
    }

    fn coerce(&self, ty: VarType, coercion: Option<Coercion>) -> VarType {
        let VarType::Concrete(concrete) = ty else {
            return ty;
        };
        match coercion {
            None => ty,
            Some(Coercion::Sum) if !concrete.is_numeric() => VarType::Concrete(self.config.float_type),
            Some(Coercion::Sum) => ty,
            Some(Coercion::SumFunction) => VarType::Concrete(self.sum_function_type(concrete)),
        }
    }

    fn sum_function_type(&self, ty: SqlType) -> SqlType {
        use SqlType::*;
        match ty {
            TinyInt | SmallInt | MediumInt | Int | BigInt | Year | Integer => self.config.sum_integer_type,
            Decimal | Numeric => ty,
            _ => self.config.float_type,
        }
    }

    fn find(&mut self, var: &TypeVar) -> TypeVarId {
        self.parent.entry(var.id).or_insert(var.id);
        self.class_type.entry(var.id).or_insert(var.var_type);

        let mut root = var.id;
        while let Some(&next) = self.parent.get(&root) {
            if next == root {
                break;
            }
            root = next;
        }
        // path compression
        let mut current = var.id;
        while current != root {
            let next = self.parent[&current];
            self.parent.insert(current, root);
            current = next;
        }
        root
    }

    fn freeze(mut self) -> Substitution {
        let ids: Vec<TypeVarId> = self.parent.keys().copied().collect();
        let mut types = HashMap::with_capacity(ids.len());
        for id in ids {
            let mut root = id;
            while self.parent[&root] != root {
                root = self.parent[&root];
            }
            self.parent.insert(id, root);
            types.insert(id, self.class_type[&root]);
        }
        Substitution { types }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::TypeVarGenerator;

    fn solve(constraints: &[Constraint]) -> Substitution {
        Unifier::solve(constraints, &Config::mysql()).expect("constraints are satisfiable")
    }

    fn arithmetic(generator: &mut TypeVarGenerator, left: &TypeVar, right: &TypeVar) -> (TypeVar, Vec<Constraint>) {
        let result = generator.fresh("l + r", VarType::Number);
        let constraints = vec![
            Constraint::most_general("l + r", left, right).with_coercion(Coercion::Sum),
            Constraint::most_general("l + r", &result, left).with_coercion(Coercion::Sum),
            Constraint::most_general("l + r", &result, right).with_coercion(Coercion::Sum),
        ];
        (result, constraints)
    }

    #[test]
    fn parameter_plus_double_is_double() {
        let mut generator = TypeVarGenerator::new();
        let param = generator.fresh("?", VarType::Unknown);
        let double = generator.fresh("double_column", VarType::Concrete(SqlType::Double));
        let (result, constraints) = arithmetic(&mut generator, &param, &double);

        let substitution = solve(&constraints);
        let config = Config::mysql();
        assert_eq!(substitution.resolve(&param, &config), SqlType::Double);
        assert_eq!(substitution.resolve(&result, &config), SqlType::Double);
    }

    #[test]
    fn integer_arithmetic_reads_as_dialect_float() {
        let mut generator = TypeVarGenerator::new();
        let int = generator.fresh("id", VarType::Concrete(SqlType::Int));
        let param = generator.fresh("?", VarType::Unknown);
        let (result, constraints) = arithmetic(&mut generator, &int, &param);

        let substitution = solve(&constraints);
        assert_eq!(substitution.var_type(&result), VarType::Number);
        assert_eq!(substitution.resolve(&result, &Config::sqlite()), SqlType::Real);
    }

    #[test]
    fn decimal_operand_outranks_number() {
        let mut generator = TypeVarGenerator::new();
        let decimal = generator.fresh("decimal_column", VarType::Concrete(SqlType::Decimal));
        let int = generator.fresh("int_column", VarType::Concrete(SqlType::Int));
        let (result, constraints) = arithmetic(&mut generator, &decimal, &int);
        assert_eq!(solve(&constraints).resolve(&result, &Config::mysql()), SqlType::Decimal);
    }

    #[test]
    fn most_general_is_commutative_and_idempotent() {
        let ranked = [
            SqlType::TinyInt, SqlType::SmallInt, SqlType::MediumInt, SqlType::Int, SqlType::BigInt,
            SqlType::Float, SqlType::Double, SqlType::Decimal, SqlType::Varchar,
        ];
        let config = Config::mysql();
        for a in ranked {
            for b in ranked {
                let mut generator = TypeVarGenerator::new();
                let va = generator.fresh("a", VarType::Concrete(a));
                let vb = generator.fresh("b", VarType::Concrete(b));
                let ab = solve(&[Constraint::most_general("a, b", &va, &vb)]).resolve(&va, &config);
                let ba = solve(&[Constraint::most_general("b, a", &vb, &va)]).resolve(&vb, &config);
                assert_eq!(ab, ba, "{a} / {b}");
                if a == b {
                    assert_eq!(ab, a);
                }
            }
        }
    }

    #[test]
    fn strict_clash_reports_both_types_and_expression() {
        let mut generator = TypeVarGenerator::new();
        let int = generator.fresh("id", VarType::Concrete(SqlType::Int));
        let text = generator.fresh("name", VarType::Concrete(SqlType::Varchar));
        let err = Unifier::solve(&[Constraint::strict("id = name", &int, &text)], &Config::mysql()).unwrap_err();
        match err {
            AnalyzerError::UnificationClash { left, right, expression } => {
                assert_eq!((left.as_str(), right.as_str(), expression.as_str()), ("int", "varchar", "id = name"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn best_effort_skips_clash() {
        let mut generator = TypeVarGenerator::new();
        let int = generator.fresh("id", VarType::Concrete(SqlType::Int));
        let text = generator.fresh("concat(...)", VarType::Concrete(SqlType::Varchar));
        let substitution = solve(&[Constraint::best_effort("concat(id)", &text, &int)]);
        assert_eq!(substitution.var_type(&int), VarType::Concrete(SqlType::Int));
        assert_eq!(substitution.var_type(&text), VarType::Concrete(SqlType::Varchar));
    }

    #[test]
    fn strict_keeps_left_between_compatible_types() {
        let mut generator = TypeVarGenerator::new();
        let column = generator.fresh("id", VarType::Concrete(SqlType::Int));
        let literal = generator.fresh("10", VarType::Concrete(SqlType::BigInt));
        let date = generator.fresh("created", VarType::Concrete(SqlType::Date));
        let text = generator.fresh("'2024-01-01'", VarType::Concrete(SqlType::Varchar));
        let substitution = solve(&[
            Constraint::strict("id = 10", &column, &literal),
            Constraint::strict("'2024-01-01' = created", &text, &date),
        ]);
        assert_eq!(substitution.var_type(&literal), VarType::Concrete(SqlType::Int));
        assert_eq!(substitution.var_type(&text), VarType::Concrete(SqlType::Date));
    }

    #[test]
    fn unresolved_falls_back_to_text() {
        let mut generator = TypeVarGenerator::new();
        let a = generator.fresh("?", VarType::Unknown);
        let b = generator.fresh("?", VarType::Unknown);
        let substitution = solve(&[Constraint::strict("? = ?", &a, &b)]);
        assert_eq!(substitution.resolve(&a, &Config::mysql()), SqlType::Varchar);
        assert_eq!(substitution.resolve(&b, &Config::sqlite()), SqlType::SqliteText);
    }

    #[test]
    fn var_against_operator_unifies_every_element() {
        let mut generator = TypeVarGenerator::new();
        let id = generator.fresh("id", VarType::Concrete(SqlType::Int));
        let p1 = generator.fresh("?", VarType::Unknown);
        let p2 = generator.fresh("?", VarType::Unknown);
        let substitution = solve(&[Constraint::strict("id in (?, ?)", Type::from(&id), Type::operator([p1.clone(), p2.clone()]))]);
        assert_eq!(substitution.var_type(&p1), VarType::Concrete(SqlType::Int));
        assert_eq!(substitution.var_type(&p2), VarType::Concrete(SqlType::Int));
    }

    #[test]
    fn operators_unify_element_wise() {
        let mut generator = TypeVarGenerator::new();
        let columns = [
            generator.fresh("double_column", VarType::Concrete(SqlType::Double)),
            generator.fresh("varchar_column", VarType::Concrete(SqlType::Varchar)),
        ];
        let values = [generator.fresh("?", VarType::Unknown), generator.fresh("?", VarType::Unknown)];
        let substitution = solve(&[Constraint::strict(
            "insert",
            Type::operator(columns.clone()),
            Type::operator(values.clone()),
        )]);
        assert_eq!(substitution.var_type(&values[0]), VarType::Concrete(SqlType::Double));
        assert_eq!(substitution.var_type(&values[1]), VarType::Concrete(SqlType::Varchar));
    }

    #[test]
    fn sum_function_widens_integers() {
        let mut generator = TypeVarGenerator::new();
        let result = generator.fresh("sum(value)", VarType::Unknown);
        let int = generator.fresh("value", VarType::Concrete(SqlType::Int));
        let constraints = [Constraint::most_general("sum(value)", &result, &int).with_coercion(Coercion::SumFunction)];
        assert_eq!(solve(&constraints).resolve(&result, &Config::mysql()), SqlType::Decimal);

        let sqlite = Unifier::solve(&constraints, &Config::sqlite()).expect("solvable");
        assert_eq!(sqlite.resolve(&result, &Config::sqlite()), SqlType::Integer);
    }
}
