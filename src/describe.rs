use crate::{
    analyzer::{
        AnalysisContext, AnalyzedColumn, AnalyzedSelect, AnalyzerError, ColumnInfo, DeleteResolver, InsertResolver,
        ParameterInfo, ParameterNode, QueryDescription, QueryType, SelectResolver, Substitution, TypeInferenceResult,
        Unifier, UpdateResolver,
    },
    ast::{Select, Statement},
    config::Config,
    dynamic::{named_parameters, Annotations, DynamicAnalyzer, DynamicSqlInfoResult, FragmentSplitter},
    nested::NestedDescriptor,
    schema::{SchemaProvider, SqlType},
};

/// Entry point: describes statements against one schema. Each call runs an
/// independent analysis, so a shared `Analyzer` can serve several threads.
pub struct Analyzer<'a> {
    schemas: &'a dyn SchemaProvider,
    config: Config,
}

impl<'a> Analyzer<'a> {
    pub fn new(schemas: &'a dyn SchemaProvider) -> Self {
        Self::with_config(schemas, Config::default())
    }

    pub fn with_config(schemas: &'a dyn SchemaProvider, config: Config) -> Self {
        Self { schemas, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn describe(&self, statement: &Statement) -> Result<QueryDescription, AnalyzerError> {
        let sql = statement.to_string();
        tracing::debug!(sql = %sql, "describing statement");

        let mut ctx = AnalysisContext::new(self.schemas, &self.config);
        let mut data_parameters = 0;
        let (query_type, analyzed) = match statement {
            Statement::Select(select) => (QueryType::Select, SelectResolver::analyze_select(select, None, &mut ctx)?),
            Statement::Insert { table, columns, source } => {
                InsertResolver::analyze_insert(table, columns, source, &mut ctx)?;
                (QueryType::Insert, AnalyzedSelect::default())
            }
            Statement::Update { table, assignments, criteria } => {
                data_parameters = UpdateResolver::analyze_update(table, assignments, criteria.as_ref(), &mut ctx)?;
                (QueryType::Update, AnalyzedSelect::default())
            }
            Statement::Delete { table, criteria } => {
                DeleteResolver::analyze_delete(table, criteria.as_ref(), &mut ctx)?;
                (QueryType::Delete, AnalyzedSelect::default())
            }
        };

        let substitution = Unifier::solve(&ctx.constraints, &self.config)?;
        let columns = analyzed.columns
            .iter()
            .map(|column| ColumnInfo {
                name: column.name.clone(),
                column_type: self.column_type(column, &substitution),
                not_null: column.not_null,
                table: column.table.clone(),
            })
            .collect();

        let mut parameters = self.parameters(&ctx.parameters, &substitution);
        let data = if query_type == QueryType::Update {
            let where_parameters = parameters.split_off(data_parameters.min(parameters.len()));
            std::mem::replace(&mut parameters, where_parameters)
        } else {
            Vec::new()
        };

        tracing::debug!(
            constraints = ctx.constraints.len(),
            parameters = ctx.parameters.len(),
            type_vars = ctx.generator.issued(),
            "described statement"
        );

        Ok(QueryDescription {
            sql,
            query_type,
            multiple_rows_result: query_type == QueryType::Select && analyzed.multiple_rows,
            columns,
            parameters,
            data,
            relations: analyzed.relations,
            nested_info: None,
            dynamic_sql_query: None,
            order_by_columns: analyzed.orderable_columns,
        })
    }

    /// Type names only.
    pub fn infer(&self, statement: &Statement) -> Result<TypeInferenceResult, AnalyzerError> {
        self.describe(statement).map(|description| TypeInferenceResult::from(&description))
    }

    /// One result per statement; a failure does not affect the others.
    pub fn describe_batch(&self, statements: &[Statement]) -> Vec<Result<QueryDescription, AnalyzerError>> {
        statements.iter().map(|statement| self.describe(statement)).collect()
    }

    /// Like [`Analyzer::describe`], honoring the `-- @nested` and
    /// `-- @dynamicQuery` comments of the statement's source text.
    pub fn describe_annotated(&self, sql: &str, statement: &Statement) -> Result<QueryDescription, AnalyzerError> {
        let mut description = self.describe(statement)?;
        description.sql = sql.to_string();

        let Statement::Select(select) = statement else {
            return Ok(description);
        };
        let annotations = Annotations::parse(sql);
        if annotations.nested {
            description.nested_info = Some(NestedDescriptor::build(&description.columns, &description.relations));
        }
        if annotations.dynamic_query {
            description.dynamic_sql_query = Some(self.dynamic_query(select)?);
        }
        Ok(description)
    }

    fn dynamic_query(&self, select: &Select) -> Result<DynamicSqlInfoResult, AnalyzerError> {
        let named = named_parameters(&select.to_string());
        let info = FragmentSplitter::new(self.schemas, &named).split(select)?;
        let order_by: Vec<String> = select.order_by
            .iter()
            .filter_map(|term| term.expr.as_column().map(|column| column.to_string()))
            .collect();
        Ok(DynamicAnalyzer::analyze(&info, &named, &order_by))
    }

    /// UNION columns take the most general type over all branches.
    fn column_type(&self, column: &AnalyzedColumn, substitution: &Substitution) -> SqlType {
        column.union_vars.iter().fold(substitution.resolve(&column.var, &self.config), |ty, var| {
            SqlType::most_general(ty, substitution.resolve(var, &self.config))
        })
    }

    fn parameters(&self, nodes: &[ParameterNode], substitution: &Substitution) -> Vec<ParameterInfo> {
        nodes
            .iter()
            .enumerate()
            .map(|(index, node)| ParameterInfo {
                name: node.name.clone().unwrap_or_else(|| format!("param{}", index + 1)),
                column_type: substitution.resolve(&node.var, &self.config),
                not_null: node.not_null,
                list: node.var.list,
            })
            .collect()
    }
}
