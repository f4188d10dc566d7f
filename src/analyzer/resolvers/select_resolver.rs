use indexmap::IndexSet;

use crate::{
    analyzer::{
        AnalysisContext, AnalyzedColumn, AnalyzedSelect, AnalyzerError, CardinalityAnalyzer, ColumnDef, Constraint,
        ExprResolver, FromResolver, InferredExpr, QueryShape, Scope,
    },
    ast::{Collection, CommonTableExpr, Expr, Limit, OrderBy, QuerySpec, Select, SelectItem},
    nested::Relation,
};

/// One UNION branch after analysis.
struct AnalyzedSpec {
    columns: Vec<AnalyzedColumn>,
    relations: Vec<Relation>,
    from_columns: Vec<ColumnDef>,
    shape: QueryShape,
}

pub struct SelectResolver;

impl SelectResolver {
    /// Analyzes a SELECT in the scope of the enclosing query, if any.
    pub fn analyze_select(select: &Select, outer: Option<&Scope>, ctx: &mut AnalysisContext) -> Result<AnalyzedSelect, AnalyzerError> {
        if select.with.is_empty() {
            return Self::analyze_with_ctes(select, outer, ctx);
        }
        // CTE names are visible only inside the statement that declares them
        let enclosing = ctx.with_schema.clone();
        let analyzed = Self::analyze_with_ctes(select, outer, ctx);
        ctx.with_schema = enclosing;
        analyzed
    }

    fn analyze_with_ctes(select: &Select, outer: Option<&Scope>, ctx: &mut AnalysisContext) -> Result<AnalyzedSelect, AnalyzerError> {
        for cte in &select.with {
            Self::register_cte(cte, outer, ctx)?;
        }

        let mut branches = Vec::with_capacity(select.body.len());
        for spec in &select.body {
            branches.push(Self::analyze_spec(spec, outer, ctx)?);
        }
        let mut branches = branches.into_iter();
        let Some(first) = branches.next() else {
            return Err(AnalyzerError::Unsupported(select.to_string()));
        };

        let mut columns = first.columns;
        for branch in branches {
            if branch.columns.len() != columns.len() {
                return Err(AnalyzerError::ColumnCountMismatch { expected: columns.len(), got: branch.columns.len() });
            }
            for (column, other) in columns.iter_mut().zip(branch.columns) {
                column.union_vars.push(other.var);
                column.not_null &= other.not_null;
            }
        }

        let from_scope = Scope::new(first.from_columns, outer);
        let orderable_columns = Self::analyze_order_by(&select.order_by, &columns, &from_scope, ctx)?;
        if let Some(limit) = &select.limit {
            Self::analyze_limit(limit, &from_scope, ctx)?;
        }

        let shape = QueryShape {
            union: select.is_union(),
            limit_one: CardinalityAnalyzer::is_limit_one(select.limit.as_ref()),
            ..first.shape
        };

        Ok(AnalyzedSelect {
            columns,
            relations: first.relations,
            multiple_rows: CardinalityAnalyzer::is_multiple_rows(&shape),
            orderable_columns,
        })
    }

    fn register_cte(cte: &CommonTableExpr, outer: Option<&Scope>, ctx: &mut AnalysisContext) -> Result<(), AnalyzerError> {
        let analyzed = Self::analyze_select(&cte.query, outer, ctx)?;
        let columns = analyzed.columns.iter().map(|column| column.as_column_def(&cte.name)).collect();
        ctx.with_schema.insert(cte.name.to_ascii_lowercase(), columns);
        Ok(())
    }

    fn analyze_spec(spec: &QuerySpec, outer: Option<&Scope>, ctx: &mut AnalysisContext) -> Result<AnalyzedSpec, AnalyzerError> {
        // placeholders are reported in text order: the projection comes before FROM
        let from_start = ctx.parameters.len();
        let from = FromResolver::resolve_from(spec, outer, ctx)?;
        let from_parameters = ctx.parameters.split_off(from_start);

        let scope = Scope::new(from.columns, outer);
        let mut columns = Vec::with_capacity(spec.projection.len());
        for item in &spec.projection {
            Self::analyze_item(item, &scope, ctx, &mut columns)?;
        }
        ctx.parameters.extend(from_parameters);

        if let Some(criteria) = &spec.criteria {
            ExprResolver::infer_expr(criteria, &scope, ctx)?;
        }

        let alias_level = Scope::new(columns.iter().map(|column| column.as_column_def("")).collect(), outer);
        let grouped_scope = Scope::new(scope.columns.clone(), Some(&alias_level));
        for expr in &spec.group_by {
            ExprResolver::infer_expr(expr, &grouped_scope, ctx)?;
        }
        if let Some(having) = &spec.having {
            ExprResolver::infer_expr(having, &grouped_scope, ctx)?;
        }

        if let Some(criteria) = &spec.criteria {
            for column in columns.iter_mut().filter(|column| !column.not_null) {
                if column.source.as_ref().is_some_and(|def| CardinalityAnalyzer::proves_not_null(criteria, def, &scope)) {
                    column.not_null = true;
                }
            }
        }

        let mut relations = from.relations;
        Self::rename_join_columns(&mut relations, &columns);

        let single_table = spec.joins.is_empty() && matches!(spec.from.as_slice(), [Collection::Table { .. }]);
        let shape = QueryShape {
            union: false,
            group_by: !spec.group_by.is_empty(),
            has_from: !spec.from.is_empty(),
            all_aggregates: !columns.is_empty() && columns.iter().all(|column| column.aggregate),
            single_table_key_filter: single_table
                && spec.criteria.as_ref().is_some_and(|criteria| CardinalityAnalyzer::has_primary_key_filter(criteria, &scope)),
            limit_one: false,
        };

        Ok(AnalyzedSpec { columns, relations, from_columns: scope.columns, shape })
    }

    fn analyze_item(
        item: &SelectItem,
        scope: &Scope,
        ctx: &mut AnalysisContext,
        out: &mut Vec<AnalyzedColumn>,
    ) -> Result<(), AnalyzerError> {
        match item {
            SelectItem::Wildcard => {
                for def in &scope.columns {
                    out.push(Self::wildcard_column(def, ctx));
                }
            }
            SelectItem::QualifiedWildcard(prefix) => {
                let matching: Vec<&ColumnDef> = scope.columns.iter().filter(|def| def.matches_prefix(prefix)).collect();
                if matching.is_empty() {
                    return Err(AnalyzerError::UnknownCollection(prefix.clone()));
                }
                for def in matching {
                    out.push(Self::wildcard_column(def, ctx));
                }
            }
            SelectItem::Expr { expr, alias } => {
                let inferred = ExprResolver::infer_expr(expr, scope, ctx)?;
                let name = match (alias, expr.as_column()) {
                    (Some(alias), _) => alias.clone(),
                    (None, Some(column)) => column.name().to_string(),
                    (None, None) => expr.to_string(),
                };
                out.push(AnalyzedColumn::new(name, inferred));
            }
        }
        Ok(())
    }

    fn wildcard_column(def: &ColumnDef, ctx: &mut AnalysisContext) -> AnalyzedColumn {
        let var = ctx.reference_column(def);
        AnalyzedColumn::new(def.column_name.clone(), InferredExpr::column(var, def.clone()))
    }

    /// A selected join column keeps its relation linked under the projected alias.
    fn rename_join_columns(relations: &mut [Relation], columns: &[AnalyzedColumn]) {
        for relation in relations.iter_mut() {
            let renamed = columns.iter().find_map(|column| {
                let def = column.source.as_ref()?;
                let selected = relation.matches(def.visible_table())
                    && def.column_name.eq_ignore_ascii_case(&relation.join_column)
                    && column.name != def.column_name;
                selected.then(|| column.name.clone())
            });
            if let Some(name) = renamed {
                relation.join_column = name;
            }
        }
    }

    /// ORDER BY sees the projected aliases first, then the FROM columns. A
    /// placeholder term is not a parameter: it lists the columns the caller
    /// may order by instead.
    fn analyze_order_by(
        order_by: &[OrderBy],
        columns: &[AnalyzedColumn],
        from_scope: &Scope,
        ctx: &mut AnalysisContext,
    ) -> Result<Option<Vec<String>>, AnalyzerError> {
        let alias_scope = Scope::new(columns.iter().map(|column| column.as_column_def("")).collect(), Some(from_scope));
        let mut has_placeholder = false;
        for term in order_by {
            if term.expr.is_parameter() {
                has_placeholder = true;
                continue;
            }
            ExprResolver::infer_expr(&term.expr, &alias_scope, ctx)?;
        }
        if !has_placeholder {
            return Ok(None);
        }

        let mut names: IndexSet<String> = columns.iter().map(|column| column.name.clone()).collect();
        names.extend(from_scope.columns.iter().map(|def| format!("{}.{}", def.visible_table(), def.column_name)));
        Ok(Some(names.into_iter().collect()))
    }

    fn analyze_limit(limit: &Limit, scope: &Scope, ctx: &mut AnalysisContext) -> Result<(), AnalyzerError> {
        for expr in std::iter::once(&limit.count).chain(&limit.offset) {
            let inferred = ExprResolver::infer_expr(expr, scope, ctx)?;
            let integer = ctx.fresh_concrete(expr.to_string(), ctx.config.limit_type);
            ctx.push(Constraint::strict(expr.to_string(), &integer, &inferred.var));
            ctx.force_not_null(&inferred);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        analyzer::{fixtures::mysql_schema, Unifier},
        ast::{Join, JoinType},
        config::Config,
        nested::Cardinality,
        schema::SqlType,
    };

    fn analyze(select: &Select) -> (AnalyzedSelect, Vec<(Option<String>, SqlType, bool)>) {
        let schema = mysql_schema();
        let config = Config::mysql();
        let mut ctx = AnalysisContext::new(&schema, &config);
        let analyzed = SelectResolver::analyze_select(select, None, &mut ctx).expect("select analyzes");
        let substitution = Unifier::solve(&ctx.constraints, &config).expect("constraints solve");
        let params = ctx.parameters
            .iter()
            .map(|p| (p.name.clone(), substitution.resolve(&p.var, &config), p.not_null))
            .collect();
        (analyzed, params)
    }

    fn from_mytable1(projection: Vec<SelectItem>, criteria: Option<Expr>) -> Select {
        Select::single(QuerySpec {
            projection,
            from: vec![Collection::table("mytable1", None)],
            criteria,
            ..Default::default()
        })
    }

    #[test]
    fn key_equality_is_single_row_other_column_is_many() {
        let (by_id, params) = analyze(&from_mytable1(vec![SelectItem::Wildcard], Some(Expr::eq(Expr::col("id"), Expr::param()))));
        assert!(!by_id.multiple_rows);
        assert_eq!(params, vec![(None, SqlType::Int, true)]);

        let (by_value, _) = analyze(&from_mytable1(vec![SelectItem::Wildcard], Some(Expr::eq(Expr::col("value"), Expr::param()))));
        assert!(by_value.multiple_rows);
    }

    #[test]
    fn limit_one_literal_is_single_row_without_parameters() {
        let mut select = from_mytable1(vec![SelectItem::expr(Expr::col("id"))], Some(Expr::eq(Expr::col("id"), Expr::int(1))));
        select.limit = Some(Limit { count: Expr::int(1), offset: None });
        let (analyzed, params) = analyze(&select);
        assert!(!analyzed.multiple_rows);
        assert!(params.is_empty());
    }

    #[test]
    fn where_clause_upgrades_nullability() {
        let (analyzed, _) = analyze(&from_mytable1(
            vec![SelectItem::expr(Expr::col("value"))],
            Some(Expr::and(Expr::eq(Expr::col("id"), Expr::int(1)), Expr::is_not_null(Expr::col("value")))),
        ));
        assert!(analyzed.columns[0].not_null);

        let (analyzed, _) = analyze(&from_mytable1(
            vec![SelectItem::expr(Expr::col("value"))],
            Some(Expr::or(Expr::eq(Expr::col("id"), Expr::int(1)), Expr::is_not_null(Expr::col("value")))),
        ));
        assert!(!analyzed.columns[0].not_null);
    }

    #[test]
    fn placeholders_follow_text_order() {
        let select = Select::single(QuerySpec {
            projection: vec![SelectItem::aliased(Expr::named("first"), "p")],
            from: vec![Collection::table("mytable1", Some("t1"))],
            joins: vec![Join::on(
                JoinType::Inner,
                Collection::table("mytable2", Some("t2")),
                Expr::and(Expr::eq(Expr::col("t2.id"), Expr::col("t1.id")), Expr::eq(Expr::col("t2.name"), Expr::named("second"))),
            )],
            criteria: Some(Expr::eq(Expr::col("t1.value"), Expr::named("third"))),
            ..Default::default()
        });
        let (_, params) = analyze(&select);
        let names: Vec<Option<&str>> = params.iter().map(|(name, ..)| name.as_deref()).collect();
        assert_eq!(names, vec![Some("first"), Some("second"), Some("third")]);
        assert_eq!(params[1].1, SqlType::Varchar);
        assert_eq!(params[2].1, SqlType::Int);
    }

    #[test]
    fn union_requires_matching_column_counts() {
        let select = Select {
            body: vec![
                QuerySpec { projection: vec![SelectItem::expr(Expr::col("id"))], from: vec![Collection::table("mytable1", None)], ..Default::default() },
                QuerySpec { projection: vec![SelectItem::Wildcard], from: vec![Collection::table("mytable2", None)], ..Default::default() },
            ],
            ..Default::default()
        };
        let schema = mysql_schema();
        let config = Config::mysql();
        let mut ctx = AnalysisContext::new(&schema, &config);
        let err = SelectResolver::analyze_select(&select, None, &mut ctx).unwrap_err();
        assert_eq!(err, AnalyzerError::ColumnCountMismatch { expected: 1, got: 3 });
    }

    #[test]
    fn union_is_many_and_nullable_if_any_branch_is() {
        let select = Select {
            body: vec![
                QuerySpec { projection: vec![SelectItem::expr(Expr::col("id"))], from: vec![Collection::table("mytable1", None)], ..Default::default() },
                QuerySpec { projection: vec![SelectItem::expr(Expr::col("value"))], from: vec![Collection::table("mytable1", None)], ..Default::default() },
            ],
            limit: Some(Limit { count: Expr::int(1), offset: None }),
            ..Default::default()
        };
        let (analyzed, _) = analyze(&select);
        assert!(analyzed.multiple_rows);
        assert!(!analyzed.columns[0].not_null);
        assert_eq!(analyzed.columns[0].union_vars.len(), 1);
    }

    #[test]
    fn order_by_placeholder_lists_orderable_columns() {
        let mut select = from_mytable1(vec![SelectItem::aliased(Expr::col("value"), "v")], None);
        select.order_by = vec![OrderBy { expr: Expr::param(), desc: false }];
        select.limit = Some(Limit { count: Expr::param(), offset: Some(Expr::param()) });
        let (analyzed, params) = analyze(&select);

        assert_eq!(analyzed.orderable_columns, Some(vec!["v".to_string(), "mytable1.id".to_string(), "mytable1.value".to_string()]));
        assert_eq!(params, vec![(None, SqlType::BigInt, true), (None, SqlType::BigInt, true)]);
    }

    #[test]
    fn order_by_sees_aliases() {
        let mut select = from_mytable1(vec![SelectItem::aliased(Expr::col("value"), "v")], None);
        select.order_by = vec![OrderBy { expr: Expr::col("v"), desc: true }, OrderBy { expr: Expr::col("id"), desc: false }];
        let (analyzed, _) = analyze(&select);
        assert!(analyzed.orderable_columns.is_none());
    }

    #[test]
    fn aliased_primary_key_renames_join_column() {
        let select = Select::single(QuerySpec {
            projection: vec![SelectItem::aliased(Expr::col("t1.id"), "user_id"), SelectItem::expr(Expr::col("t2.name"))],
            from: vec![Collection::table("mytable1", Some("t1"))],
            joins: vec![Join::on(JoinType::Left, Collection::table("mytable2", Some("t2")), Expr::eq(Expr::col("t2.id"), Expr::col("t1.value")))],
            ..Default::default()
        });
        let (analyzed, _) = analyze(&select);
        assert_eq!(analyzed.relations[0].join_column, "user_id");
        assert_eq!(analyzed.relations[1].join_column, "id");
        assert_eq!(analyzed.relations[1].cardinality, Cardinality::One);
        assert!(!analyzed.columns[1].not_null);
    }

    #[test]
    fn cte_columns_are_visible_as_a_table() {
        let select = Select {
            with: vec![CommonTableExpr {
                name: "totals".into(),
                query: from_mytable1(vec![SelectItem::aliased(Expr::func("count", vec![Expr::Wildcard]), "total")], None),
            }],
            body: vec![QuerySpec {
                projection: vec![SelectItem::expr(Expr::col("total"))],
                from: vec![Collection::table("totals", None)],
                ..Default::default()
            }],
            ..Default::default()
        };
        let schema = mysql_schema();
        let config = Config::mysql();
        let mut ctx = AnalysisContext::new(&schema, &config);
        let analyzed = SelectResolver::analyze_select(&select, None, &mut ctx).unwrap();
        let substitution = Unifier::solve(&ctx.constraints, &config).unwrap();
        assert_eq!(substitution.resolve(&analyzed.columns[0].var, &config), SqlType::BigInt);
        assert!(analyzed.columns[0].not_null);
    }

    #[test]
    fn cte_is_not_visible_after_its_statement() {
        let totals = Select {
            with: vec![CommonTableExpr { name: "totals".into(), query: from_mytable1(vec![SelectItem::expr(Expr::col("id"))], None) }],
            body: vec![QuerySpec {
                projection: vec![SelectItem::Wildcard],
                from: vec![Collection::table("totals", None)],
                ..Default::default()
            }],
            ..Default::default()
        };
        let schema = mysql_schema();
        let config = Config::mysql();

        let mut ctx = AnalysisContext::new(&schema, &config);
        SelectResolver::analyze_select(&totals, None, &mut ctx).unwrap();
        assert!(ctx.with_schema.is_empty());

        // the second branch runs after the subquery that declared the CTE
        let leaking = Select {
            body: vec![
                QuerySpec {
                    projection: vec![SelectItem::expr(Expr::Subquery(Box::new(totals)))],
                    from: vec![Collection::table("mytable2", None)],
                    ..Default::default()
                },
                QuerySpec {
                    projection: vec![SelectItem::expr(Expr::col("id"))],
                    from: vec![Collection::table("totals", None)],
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        let mut ctx = AnalysisContext::new(&schema, &config);
        let err = SelectResolver::analyze_select(&leaking, None, &mut ctx).unwrap_err();
        assert_eq!(err, AnalyzerError::UnknownCollection("totals".into()));
    }

    #[test]
    fn aggregates_without_group_by_are_single_row() {
        let (analyzed, _) = analyze(&from_mytable1(
            vec![SelectItem::expr(Expr::func("count", vec![Expr::Wildcard])), SelectItem::expr(Expr::func("max", vec![Expr::col("value")]))],
            None,
        ));
        assert!(!analyzed.multiple_rows);

        let mut grouped = from_mytable1(vec![SelectItem::expr(Expr::func("count", vec![Expr::Wildcard]))], None);
        grouped.body[0].group_by = vec![Expr::col("value")];
        assert!(analyze(&grouped).0.multiple_rows);
    }

    #[test]
    fn correlated_subquery_sees_outer_columns() {
        let inner = Select::single(QuerySpec {
            projection: vec![SelectItem::expr(Expr::col("name"))],
            from: vec![Collection::table("mytable2", Some("t2"))],
            criteria: Some(Expr::eq(Expr::col("t2.id"), Expr::col("t1.value"))),
            ..Default::default()
        });
        let select = Select::single(QuerySpec {
            projection: vec![SelectItem::aliased(Expr::Subquery(Box::new(inner)), "name")],
            from: vec![Collection::table("mytable1", Some("t1"))],
            ..Default::default()
        });
        let (analyzed, _) = analyze(&select);
        assert_eq!(analyzed.columns[0].name, "name");
        assert!(!analyzed.columns[0].not_null);
    }
}
