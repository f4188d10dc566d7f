use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Column {
    Name { name: String },
    WithCollection { collection: String, name: String },
}

impl Column {
    pub fn name(&self) -> &str {
        match self {
            Column::Name { name } | Column::WithCollection { name, .. } => name,
        }
    }

    /// Table or alias prefix, empty when the reference is unqualified.
    pub fn collection(&self) -> &str {
        match self {
            Column::Name { .. } => "",
            Column::WithCollection { collection, .. } => collection,
        }
    }

    /// Splits `t.col` (or `schema.t.col`) into a column reference.
    pub fn parse_name(text: &str) -> Self {
        match text.rsplit_once('.') {
            Some((prefix, name)) => {
                let collection = prefix.rsplit('.').next().unwrap_or(prefix);
                Column::WithCollection { collection: collection.to_string(), name: name.to_string() }
            }
            None => Column::Name { name: text.to_string() },
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Column::Name { name } => write!(f, "{}", name),
            Column::WithCollection { collection, name } => write!(f, "{}.{}", collection, name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_name_splits_prefix() {
        assert_eq!(Column::parse_name("id"), Column::Name { name: "id".into() });
        assert_eq!(
            Column::parse_name("m2.name"),
            Column::WithCollection { collection: "m2".into(), name: "name".into() }
        );
        assert_eq!(Column::parse_name("mydb.t1.id").collection(), "t1");
    }
}
