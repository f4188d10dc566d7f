use indexmap::IndexMap;

use crate::{
    analyzer::{AnalyzerError, ColumnDef, Constraint, InferredExpr, TypeVar, TypeVarGenerator, VarType},
    ast::Parameter,
    config::Config,
    schema::{SchemaProvider, SqlType},
};

/// A placeholder met during the walk, in encounter order.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterNode {
    pub var: TypeVar,
    pub name: Option<String>,
    pub not_null: bool,
}

/// Mutable state of one analysis run: the id generator, the constraint list,
/// the parameters in encounter order and the CTE-defined virtual tables.
pub struct AnalysisContext<'a> {
    pub schemas: &'a dyn SchemaProvider,
    pub config: &'a Config,
    pub generator: TypeVarGenerator,
    pub constraints: Vec<Constraint>,
    pub parameters: Vec<ParameterNode>,
    /// CTE name (lowercase) -> projected columns
    pub with_schema: IndexMap<String, Vec<ColumnDef>>,
}

impl<'a> AnalysisContext<'a> {
    pub fn new(schemas: &'a dyn SchemaProvider, config: &'a Config) -> Self {
        Self {
            schemas,
            config,
            generator: TypeVarGenerator::new(),
            constraints: Vec::new(),
            parameters: Vec::new(),
            with_schema: IndexMap::new(),
        }
    }

    pub fn fresh(&mut self, name: impl Into<String>, var_type: VarType) -> TypeVar {
        self.generator.fresh(name, var_type)
    }

    pub fn fresh_concrete(&mut self, name: impl Into<String>, ty: SqlType) -> TypeVar {
        self.generator.fresh(name, VarType::Concrete(ty))
    }

    pub fn push(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    pub fn add_parameter(&mut self, parameter: &Parameter, list: bool) -> InferredExpr {
        let label = parameter.to_string();
        let var = if list { self.generator.fresh_list(label) } else { self.fresh(label, VarType::Unknown) };
        self.parameters.push(ParameterNode { var: var.clone(), name: parameter.name.clone(), not_null: false });
        InferredExpr::parameter(var, self.parameters.len() - 1)
    }

    /// A placeholder bound inside a predicate cannot itself be null.
    pub fn force_not_null(&mut self, expr: &InferredExpr) {
        if let Some(index) = expr.parameter {
            self.set_parameter_nullability(index, true);
        }
    }

    pub fn set_parameter_nullability(&mut self, index: usize, not_null: bool) {
        if let Some(node) = self.parameters.get_mut(index) {
            node.not_null = not_null;
        }
    }

    /// A fresh variable for one reference to `def`. Columns of derived tables
    /// stay linked to the inner expression they were projected from.
    pub fn reference_column(&mut self, def: &ColumnDef) -> TypeVar {
        let label = format!("{}.{}", def.visible_table(), def.column_name);
        if def.column_type.select_item {
            let var = self.fresh(label.clone(), VarType::Unknown);
            self.push(Constraint::best_effort(label, &var, &def.column_type));
            var
        } else {
            self.fresh(label, def.column_type.var_type)
        }
    }

    /// Columns of a CTE or physical table, visible under `alias` when given.
    /// Schema-qualified names (`mydb.mytable1`) resolve to their last segment.
    pub fn table_columns(&mut self, name: &str, alias: Option<&str>) -> Result<Vec<ColumnDef>, AnalyzerError> {
        let table = name.rsplit('.').next().unwrap_or(name);
        let alias = alias.unwrap_or_default().to_string();

        if let Some(columns) = self.with_schema.get(&table.to_ascii_lowercase()) {
            return Ok(columns
                .iter()
                .map(|def| ColumnDef { table_alias: alias.clone(), ..def.clone() })
                .collect());
        }

        let schema = self.schemas
            .table_columns(table)
            .ok_or_else(|| AnalyzerError::UnknownCollection(table.to_string()))?;

        Ok(schema
            .into_iter()
            .map(|column| ColumnDef {
                column_type: self.generator.fresh(column.column.clone(), VarType::Concrete(column.column_type)),
                table: column.table,
                table_alias: alias.clone(),
                column_name: column.column,
                column_key: column.column_key,
                not_null: column.not_null,
            })
            .collect())
    }
}
