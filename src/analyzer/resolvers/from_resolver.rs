use crate::{
    analyzer::{AnalysisContext, AnalyzerError, ColumnDef, ColumnResolver, ExprResolver, Scope, SelectResolver},
    ast::{Collection, ComparatorOp, Expr, Join, JoinConstraint, JoinType, QuerySpec},
    nested::{Cardinality, Relation},
    schema::ColumnKey,
};

/// Columns made visible by a FROM clause and the relation graph of its tables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FromResult {
    pub columns: Vec<ColumnDef>,
    pub relations: Vec<Relation>,
}

pub struct FromResolver;

impl FromResolver {
    pub fn resolve_from(spec: &QuerySpec, outer: Option<&Scope>, ctx: &mut AnalysisContext) -> Result<FromResult, AnalyzerError> {
        let mut result = FromResult::default();

        for collection in &spec.from {
            let columns = Self::collection_columns(collection, ctx)?;
            if let Some(mut relation) = Self::relation(collection, &columns) {
                // comma-separated tables hang off the first one
                if let Some(root) = result.relations.first() {
                    relation.parent_relation = root.key().to_string();
                    relation.cardinality = Cardinality::Many;
                }
                result.relations.push(relation);
            }
            result.columns.extend(columns);
        }

        let mut previous = spec.from.last().map(Self::visible_name).unwrap_or_default();
        for join in &spec.joins {
            Self::resolve_join(join, &previous, outer, ctx, &mut result)?;
            previous = Self::visible_name(&join.collection);
        }

        tracing::trace!(columns = result.columns.len(), relations = result.relations.len(), "resolved FROM clause");
        Ok(result)
    }

    fn resolve_join(
        join: &Join,
        previous: &str,
        outer: Option<&Scope>,
        ctx: &mut AnalysisContext,
        result: &mut FromResult,
    ) -> Result<(), AnalyzerError> {
        let joined = Self::visible_name(&join.collection);
        let mut columns = Self::collection_columns(&join.collection, ctx)?;
        let mut relation = Self::relation(&join.collection, &columns);

        let (parent, cardinality) = match &join.constraint {
            JoinConstraint::On(predicate) => {
                let scope_columns = result.columns.iter().chain(&columns).cloned().collect();
                let scope = Scope::new(scope_columns, outer);
                ExprResolver::infer_expr(predicate, &scope, ctx)?;
                Self::link_on(predicate, &joined, &scope)
            }
            JoinConstraint::Using(names) => {
                let using = |def: &ColumnDef| names.iter().any(|name| name.eq_ignore_ascii_case(&def.column_name));
                let unique = columns.iter().any(|def| using(def) && def.column_key.is_unique());
                let parent = result.columns.iter().find(|def| using(def)).map(|def| def.visible_table().to_string());
                columns.retain(|def| !using(def));
                (parent, if unique { Cardinality::One } else { Cardinality::Many })
            }
            JoinConstraint::None => (None, Cardinality::Many),
        };

        match join.join_type {
            JoinType::Left => Self::make_nullable(&mut columns),
            JoinType::Right => Self::make_nullable(&mut result.columns),
            JoinType::Full => {
                Self::make_nullable(&mut columns);
                Self::make_nullable(&mut result.columns);
            }
            JoinType::Inner | JoinType::Cross => {}
        }

        if let Some(relation) = relation.as_mut() {
            relation.parent_relation = parent.unwrap_or_else(|| previous.to_string());
            relation.cardinality = cardinality;
        }
        result.relations.extend(relation);
        result.columns.extend(columns);
        Ok(())
    }

    /// Parent and cardinality of the joined table from its ON predicate. The
    /// join is `one` when an equality pins a unique column of the joined table.
    fn link_on(predicate: &Expr, joined: &str, scope: &Scope) -> (Option<String>, Cardinality) {
        let is_joined = |def: &ColumnDef| def.visible_table().eq_ignore_ascii_case(joined);
        let resolve = |expr: &Expr| expr.as_column().and_then(|column| ColumnResolver::lookup(column, scope));

        let mut parent = None;
        let mut unique = false;
        for (left, right) in Self::equalities(predicate) {
            let (Some(left), Some(right)) = (resolve(left), resolve(right)) else {
                continue;
            };
            let (joined_side, other) = match (is_joined(&left), is_joined(&right)) {
                (true, false) => (left, right),
                (false, true) => (right, left),
                _ => continue,
            };
            unique |= joined_side.column_key.is_unique();
            parent.get_or_insert_with(|| other.visible_table().to_string());
        }

        let parent = parent.or_else(|| {
            ColumnResolver::referenced_columns(predicate)
                .into_iter()
                .filter_map(|column| ColumnResolver::lookup(column, scope))
                .find(|def| !is_joined(def))
                .map(|def| def.visible_table().to_string())
        });
        (parent, if unique { Cardinality::One } else { Cardinality::Many })
    }

    fn equalities(expr: &Expr) -> Vec<(&Expr, &Expr)> {
        match expr.unnested() {
            Expr::And(left, right) => {
                let mut out = Self::equalities(left);
                out.extend(Self::equalities(right));
                out
            }
            Expr::Compare { left, op: ComparatorOp::Eq, right } => vec![(left.as_ref(), right.as_ref())],
            _ => Vec::new(),
        }
    }

    fn make_nullable(columns: &mut [ColumnDef]) {
        columns.iter_mut().for_each(|def| def.not_null = false);
    }

    fn collection_columns(collection: &Collection, ctx: &mut AnalysisContext) -> Result<Vec<ColumnDef>, AnalyzerError> {
        match collection {
            Collection::Table { name, alias } => ctx.table_columns(name, alias.as_deref()),
            Collection::Subquery { query, alias } => {
                let analyzed = SelectResolver::analyze_select(query, None, ctx)?;
                Ok(analyzed.columns.iter().map(|column| column.as_column_def(alias)).collect())
            }
        }
    }

    /// Only physical (or CTE) tables become relations; the primary key is the
    /// join column.
    fn relation(collection: &Collection, columns: &[ColumnDef]) -> Option<Relation> {
        let Collection::Table { name, alias } = collection else {
            return None;
        };
        let join_column = columns
            .iter()
            .find(|def| def.column_key == ColumnKey::Primary)
            .map(|def| def.column_name.as_str())
            .unwrap_or_default();
        Some(Relation::root(Self::table_name(name), alias.as_deref().unwrap_or_default(), join_column))
    }

    fn visible_name(collection: &Collection) -> String {
        match collection {
            Collection::Table { name, alias: None } => Self::table_name(name).to_string(),
            other => other.visible_name().to_string(),
        }
    }

    fn table_name(name: &str) -> &str {
        name.rsplit('.').next().unwrap_or(name)
    }
}
