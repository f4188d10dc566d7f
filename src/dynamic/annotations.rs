use indexmap::IndexSet;
use once_cell::sync::Lazy;
use regex::Regex;

static DYNAMIC_QUERY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*--\s*@dynamicQuery\b").expect("valid regex"));
static NESTED: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*--\s*@nested\b").expect("valid regex"));
static NAMED_PARAMETER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(^|[^:\w]):([A-Za-z_]\w*)").expect("valid regex"));
static STRING_LITERAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"'(?:[^']|'')*'").expect("valid regex"));

/// Comment flags on a statement's own lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Annotations {
    pub dynamic_query: bool,
    pub nested: bool,
}

impl Annotations {
    pub fn parse(sql: &str) -> Self {
        Self { dynamic_query: DYNAMIC_QUERY.is_match(sql), nested: NESTED.is_match(sql) }
    }
}

/// Distinct `:name` parameters in order of first appearance. Quoted strings
/// and `::` casts are not parameters.
pub fn named_parameters(sql: &str) -> Vec<String> {
    let stripped = STRING_LITERAL.replace_all(sql, "''");
    let names: IndexSet<String> = NAMED_PARAMETER
        .captures_iter(&stripped)
        .map(|captures| captures[2].to_string())
        .collect();
    names.into_iter().collect()
}

/// Positions in `named` of the parameters written in `text`.
pub fn parameter_indexes(text: &str, named: &[String]) -> Vec<usize> {
    named_parameters(text)
        .iter()
        .filter_map(|name| named.iter().position(|candidate| candidate == name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_are_read_from_comment_lines() {
        let sql = "-- @dynamicQuery\n  --   @nested\nSELECT id FROM mytable1";
        assert_eq!(Annotations::parse(sql), Annotations { dynamic_query: true, nested: true });
        assert_eq!(Annotations::parse("SELECT '-- @nested'"), Annotations::default());
    }

    #[test]
    fn named_parameters_are_distinct_and_ordered() {
        let sql = "SELECT :b, x::int FROM t WHERE a = :a AND c = ':skip' AND d = :b AND e IN (:ids)";
        assert_eq!(named_parameters(sql), vec!["b", "a", "ids"]);
    }

    #[test]
    fn indexes_refer_to_the_statement_list() {
        let named = vec!["name".to_string(), "ids".to_string()];
        assert_eq!(parameter_indexes("AND m2.id IN (:ids)", &named), vec![1]);
        assert!(parameter_indexes("AND m2.id = 1", &named).is_empty());
    }
}
