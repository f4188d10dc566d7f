use crate::{
    analyzer::{AnalyzerError, ColumnResolver},
    ast::{Collection, Expr, Join, JoinConstraint, QuerySpec, Select, SelectItem},
    dynamic::{parameter_indexes, DynamicSqlInfo, FragmentInfo, TableField},
    schema::SchemaProvider,
};

/// Cuts a SELECT into the fragments a dynamic query may leave out: projection
/// items, FROM/JOIN sources, top-level WHERE conjuncts and CTEs.
pub struct FragmentSplitter<'a> {
    schemas: &'a dyn SchemaProvider,
    named_parameters: &'a [String],
}

impl<'a> FragmentSplitter<'a> {
    pub fn new(schemas: &'a dyn SchemaProvider, named_parameters: &'a [String]) -> Self {
        Self { schemas, named_parameters }
    }

    pub fn split(&self, select: &Select) -> Result<DynamicSqlInfo, AnalyzerError> {
        let Some(spec) = select.body.first() else {
            return Err(AnalyzerError::Unsupported(select.to_string()));
        };

        let from = self.from_fragments(select, spec)?;
        let known: Vec<TableField> = from.iter().flat_map(|fragment| fragment.fields.iter().cloned()).collect();

        let select_fragments = spec.projection
            .iter()
            .map(|item| self.select_fragment(item, &from, &known))
            .collect();

        let where_ = spec.criteria
            .iter()
            .flat_map(Self::conjuncts)
            .map(|conjunct| {
                let text = format!("AND {}", conjunct);
                let params = parameter_indexes(&text, self.named_parameters);
                FragmentInfo {
                    fields: Self::table_fields(conjunct, &known),
                    depend_on_params: params.clone(),
                    parameters: params,
                    fragment: text,
                    ..Default::default()
                }
            })
            .collect();

        let with = select.with
            .iter()
            .map(|cte| {
                let text = format!("{} AS ({})", cte.name, cte.query);
                // the relation is the name the CTE is joined under
                let relation = spec.from
                    .iter()
                    .chain(spec.joins.iter().map(|join| &join.collection))
                    .find(|collection| matches!(collection, Collection::Table { name, .. } if name.eq_ignore_ascii_case(&cte.name)))
                    .map(|collection| collection.visible_name().to_string())
                    .unwrap_or_else(|| cte.name.clone());
                FragmentInfo {
                    parameters: parameter_indexes(&text, self.named_parameters),
                    fragment: text,
                    relation: Some(relation),
                    ..Default::default()
                }
            })
            .collect();

        Ok(DynamicSqlInfo { with, select: select_fragments, from, where_ })
    }

    fn from_fragments(&self, select: &Select, spec: &QuerySpec) -> Result<Vec<FragmentInfo>, AnalyzerError> {
        let mut fragments: Vec<FragmentInfo> = Vec::with_capacity(spec.from.len() + spec.joins.len());

        for (index, collection) in spec.from.iter().enumerate() {
            let text = if index == 0 { format!("FROM {}", collection) } else { format!(", {}", collection) };
            let relation = collection.visible_name().to_string();
            fragments.push(FragmentInfo {
                parameters: parameter_indexes(&text, self.named_parameters),
                fields: self.collection_fields(collection, select)?,
                parent_relation: fragments.first().and_then(|root| root.relation.clone()),
                relation: Some(relation),
                fragment: text,
                ..Default::default()
            });
        }

        for join in &spec.joins {
            let text = join.to_string();
            let fields = self.collection_fields(&join.collection, select)?;
            let relation = join.collection.visible_name().to_string();
            let known: Vec<TableField> = fragments.iter().flat_map(|fragment| fragment.fields.iter().cloned()).collect();
            let parent = Self::join_parent(join, &relation, &known)
                .or_else(|| fragments.last().and_then(|previous| previous.relation.clone()));
            fragments.push(FragmentInfo {
                parameters: parameter_indexes(&text, self.named_parameters),
                fields,
                relation: Some(relation),
                parent_relation: parent,
                fragment: text,
                ..Default::default()
            });
        }
        Ok(fragments)
    }

    fn join_parent(join: &Join, relation: &str, known: &[TableField]) -> Option<String> {
        let JoinConstraint::On(predicate) = &join.constraint else {
            return None;
        };
        Self::table_fields(predicate, known)
            .into_iter()
            .find(|field| !field.table.eq_ignore_ascii_case(relation))
            .map(|field| field.table)
    }

    fn select_fragment(&self, item: &SelectItem, from: &[FragmentInfo], known: &[TableField]) -> FragmentInfo {
        let text = item.to_string();
        let parameters = parameter_indexes(&text, self.named_parameters);
        match item {
            SelectItem::Wildcard => FragmentInfo {
                depend_on: from.iter().filter_map(|fragment| fragment.relation.clone()).collect(),
                fields: known.to_vec(),
                fragment: text,
                parameters,
                ..Default::default()
            },
            SelectItem::QualifiedWildcard(prefix) => FragmentInfo {
                depend_on: vec![prefix.clone()],
                fields: known.iter().filter(|field| field.table.eq_ignore_ascii_case(prefix)).cloned().collect(),
                fragment: text,
                parameters,
                ..Default::default()
            },
            SelectItem::Expr { expr, alias } => {
                let fields = Self::table_fields(expr, known);
                let mut depend_on: Vec<String> = Vec::new();
                for field in &fields {
                    if !depend_on.contains(&field.table) {
                        depend_on.push(field.table.clone());
                    }
                }
                FragmentInfo {
                    fragment_without_alias: alias.as_ref().map(|_| expr.to_string()),
                    fields,
                    depend_on,
                    fragment: text,
                    parameters,
                    ..Default::default()
                }
            }
        }
    }

    /// Columns a fragment introduces: every declared column of a table (or the
    /// projected names of a CTE or derived table).
    fn collection_fields(&self, collection: &Collection, select: &Select) -> Result<Vec<TableField>, AnalyzerError> {
        let visible = collection.visible_name();
        let names = match collection {
            Collection::Table { name, .. } => {
                let table = name.rsplit('.').next().unwrap_or(name);
                match select.with.iter().find(|cte| cte.name.eq_ignore_ascii_case(table)) {
                    Some(cte) => Self::projected_names(&cte.query),
                    None => self.schemas
                        .table_columns(table)
                        .ok_or_else(|| AnalyzerError::UnknownCollection(table.to_string()))?
                        .into_iter()
                        .map(|column| column.column)
                        .collect(),
                }
            }
            Collection::Subquery { query, .. } => Self::projected_names(query),
        };
        Ok(names.iter().map(|name| TableField::new(visible, name)).collect())
    }

    fn projected_names(select: &Select) -> Vec<String> {
        select.body
            .first()
            .map(|spec| {
                spec.projection
                    .iter()
                    .filter_map(|item| match item {
                        SelectItem::Expr { alias: Some(alias), .. } => Some(alias.clone()),
                        SelectItem::Expr { expr, alias: None } => Some(expr.as_column().map_or_else(|| expr.to_string(), |c| c.name().to_string())),
                        SelectItem::Wildcard | SelectItem::QualifiedWildcard(_) => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Top-level AND operands; each becomes one optional WHERE fragment.
    fn conjuncts(expr: &Expr) -> Vec<&Expr> {
        match expr {
            Expr::And(left, right) => {
                let mut out = Self::conjuncts(left);
                out.extend(Self::conjuncts(right));
                out
            }
            other => vec![other],
        }
    }

    /// Column references of `expr` qualified with their table; unqualified
    /// names take the first known table that declares them.
    fn table_fields(expr: &Expr, known: &[TableField]) -> Vec<TableField> {
        let mut fields: Vec<TableField> = Vec::new();
        for column in ColumnResolver::referenced_columns(expr) {
            let field = match column.collection() {
                "" => known.iter().find(|field| field.field.eq_ignore_ascii_case(column.name())).cloned(),
                prefix => Some(TableField::new(prefix, column.name())),
            };
            if let Some(field) = field.filter(|field| !fields.iter().any(|seen| seen.same_as(field))) {
                fields.push(field);
            }
        }
        fields
    }
}
