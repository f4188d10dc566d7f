use indexmap::IndexSet;

use crate::dynamic::{DynamicSqlInfo, DynamicSqlInfoResult, FragmentInfo, FragmentInfoResult, TableField};

/// Decides, per fragment of a dynamic statement, which selected fields and
/// bound parameters make it necessary.
pub struct DynamicAnalyzer;

impl DynamicAnalyzer {
    pub fn analyze(info: &DynamicSqlInfo, named_parameters: &[String], order_by_columns: &[String]) -> DynamicSqlInfoResult {
        let names = |indexes: &[usize]| -> Vec<String> {
            indexes.iter().filter_map(|&index| named_parameters.get(index).cloned()).collect()
        };

        let select = info.select
            .iter()
            .enumerate()
            .map(|(index, fragment)| FragmentInfoResult {
                fragment: fragment.fragment.clone(),
                fragment_without_alias: fragment.fragment_without_alias.clone(),
                depend_on_fields: vec![index],
                parameters: names(&fragment.parameters),
                ..Default::default()
            })
            .collect();

        let from: Vec<FragmentInfoResult> = info.from
            .iter()
            .enumerate()
            .map(|(index, fragment)| Self::analyze_from(index, fragment, info, named_parameters, order_by_columns))
            .collect();

        let with = info.with
            .iter()
            .map(|fragment| {
                let mut fields = IndexSet::new();
                let mut params = IndexSet::new();
                let mut order_by = IndexSet::new();
                for (source, result) in info.from.iter().zip(&from) {
                    if source.relation.is_some() && source.relation == fragment.relation {
                        fields.extend(result.depend_on_fields.iter().copied());
                        params.extend(result.depend_on_params.iter().cloned());
                        order_by.extend(result.depend_on_order_by.iter().cloned());
                    }
                }
                FragmentInfoResult {
                    fragment: fragment.fragment.clone(),
                    fragment_without_alias: None,
                    depend_on_fields: fields.into_iter().collect(),
                    depend_on_params: params.into_iter().collect(),
                    parameters: names(&fragment.parameters),
                    depend_on_order_by: order_by.into_iter().collect(),
                }
            })
            .collect();

        let where_ = info.where_
            .iter()
            .map(|fragment| {
                let params: IndexSet<String> = names(&fragment.depend_on_params).into_iter().collect();
                FragmentInfoResult {
                    fragment: fragment.fragment.clone(),
                    depend_on_params: params.into_iter().collect(),
                    parameters: names(&fragment.parameters),
                    ..Default::default()
                }
            })
            .collect();

        tracing::debug!(from = info.from.len(), filters = info.where_.len(), "analyzed dynamic fragments");
        DynamicSqlInfoResult { with, select, from, where_ }
    }

    fn analyze_from(
        index: usize,
        fragment: &FragmentInfo,
        info: &DynamicSqlInfo,
        named_parameters: &[String],
        order_by_columns: &[String],
    ) -> FragmentInfoResult {
        let parameters = fragment.parameters
            .iter()
            .filter_map(|&param| named_parameters.get(param).cloned())
            .collect();
        if index == 0 && fragment.parent_relation.is_none() {
            return FragmentInfoResult::required(fragment, parameters);
        }

        let (fields, relations) = Self::absorb_descendants(fragment, &info.from);
        let filters: Vec<&FragmentInfo> = info.where_
            .iter()
            .filter(|filter| filter.fields.iter().any(|field| fields.iter().any(|own| own.same_as(field))))
            .collect();
        if filters.iter().any(|filter| filter.depend_on_params.is_empty()) {
            return FragmentInfoResult::required(fragment, parameters);
        }

        let depend_on_fields = info.select
            .iter()
            .enumerate()
            .filter(|(_, select)| select.depend_on.iter().any(|relation| relations.contains(relation)))
            .map(|(index, _)| index)
            .collect();

        let depend_on_params: IndexSet<String> = filters
            .iter()
            .flat_map(|filter| filter.depend_on_params.iter())
            .filter_map(|&param| named_parameters.get(param).cloned())
            .collect();

        let depend_on_order_by = order_by_columns
            .iter()
            .filter(|column| {
                let (prefix, name) = column.rsplit_once('.').unwrap_or(("", column.as_str()));
                fields.iter().any(|field| {
                    field.field.eq_ignore_ascii_case(name) && (prefix.is_empty() || field.table.eq_ignore_ascii_case(prefix))
                })
            })
            .cloned()
            .collect();

        FragmentInfoResult {
            fragment: fragment.fragment.clone(),
            fragment_without_alias: None,
            depend_on_fields,
            depend_on_params: depend_on_params.into_iter().collect(),
            parameters,
            depend_on_order_by,
        }
    }

    /// Fields and relation names of `fragment` and every fragment joined
    /// (directly or transitively) through it.
    fn absorb_descendants(fragment: &FragmentInfo, from: &[FragmentInfo]) -> (Vec<TableField>, IndexSet<String>) {
        let mut fields = fragment.fields.clone();
        let mut relations: IndexSet<String> = fragment.relation.iter().cloned().collect();

        let mut cursor = 0;
        while let Some(parent) = relations.get_index(cursor).cloned() {
            cursor += 1;
            for child in from.iter().filter(|child| child.parent_relation.as_deref() == Some(parent.as_str())) {
                if let Some(relation) = &child.relation {
                    if relations.insert(relation.clone()) {
                        fields.extend(child.fields.iter().cloned());
                    }
                }
            }
        }
        (fields, relations)
    }
}
