use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::{
    analyzer::ColumnInfo,
    nested::{Cardinality, Relation},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum NestedField {
    /// A projected column, by position in the flat row.
    Field { name: String, column_index: usize },
    /// A child relation, by position in [`NestedDescriptor::relations`].
    Relation { name: String, cardinality: Cardinality, relation_index: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationInfo {
    pub name: String,
    /// Column whose value identifies one object of this relation. `None` for
    /// a root with no projected column: every row then feeds one object.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_key_index: Option<usize>,
    pub fields: Vec<NestedField>,
}

/// Object tree over a flat result row. The first node is the root; the other
/// nodes are the relations with at least one projected column, hung off their
/// nearest kept ancestor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NestedDescriptor {
    pub relations: Vec<RelationInfo>,
}

impl NestedDescriptor {
    pub fn build(columns: &[ColumnInfo], relations: &[Relation]) -> Self {
        let projected = |relation: &Relation| -> Vec<usize> {
            columns
                .iter()
                .enumerate()
                .filter(|(_, column)| column.table.eq_ignore_ascii_case(relation.key()))
                .map(|(index, _)| index)
                .collect()
        };

        let Some(root) = relations.iter().position(Relation::is_root) else {
            return Self::default();
        };
        let mut included: Vec<(&Relation, Vec<usize>)> = vec![(&relations[root], projected(&relations[root]))];
        included.extend(
            relations
                .iter()
                .enumerate()
                .filter(|(index, _)| *index != root)
                .map(|(_, relation)| (relation, projected(relation)))
                .filter(|(_, indexes)| !indexes.is_empty()),
        );

        let parents: Vec<Option<usize>> = included
            .iter()
            .map(|(relation, _)| Self::kept_ancestor(relation, relations, &included))
            .collect();

        let nodes = included
            .iter()
            .enumerate()
            .map(|(node, (relation, indexes))| {
                let mut fields: Vec<NestedField> = indexes
                    .iter()
                    .map(|&index| NestedField::Field { name: columns[index].name.clone(), column_index: index })
                    .collect();
                fields.extend(included.iter().enumerate().filter_map(|(child_index, (child, _))| {
                    (parents[child_index] == Some(node)).then(|| NestedField::Relation {
                        name: child.key().to_string(),
                        cardinality: child.cardinality,
                        relation_index: child_index,
                    })
                }));

                let group_key_index = indexes
                    .iter()
                    .copied()
                    .find(|&index| columns[index].name.eq_ignore_ascii_case(&relation.join_column))
                    .or_else(|| indexes.first().copied());

                RelationInfo { name: relation.key().to_string(), group_key_index, fields }
            })
            .collect();

        Self { relations: nodes }
    }

    /// Position in `included` of the closest ancestor of `relation` that has
    /// a node; relations without projected columns are skipped over.
    fn kept_ancestor(relation: &Relation, relations: &[Relation], included: &[(&Relation, Vec<usize>)]) -> Option<usize> {
        let mut current = relation;
        // bounded: a malformed parent chain may be cyclic
        for _ in 0..relations.len() {
            if current.is_root() {
                return None;
            }
            let parent = relations.iter().find(|candidate| candidate.key().eq_ignore_ascii_case(&current.parent_relation))?;
            if let Some(node) = included.iter().position(|(kept, _)| std::ptr::eq(*kept, parent)) {
                return Some(node);
            }
            current = parent;
        }
        None
    }

    /// Collapses flat rows into objects of the root relation.
    pub fn collect(&self, rows: &[Vec<Value>]) -> Vec<Value> {
        if self.relations.is_empty() {
            return Vec::new();
        }
        let rows: Vec<&Vec<Value>> = rows.iter().collect();
        self.collect_relation(0, &rows)
    }

    fn collect_relation(&self, index: usize, rows: &[&Vec<Value>]) -> Vec<Value> {
        let Some(relation) = self.relations.get(index) else {
            return Vec::new();
        };

        // first appearance order; rows without a key belong to no object
        let mut groups: IndexMap<String, Vec<&Vec<Value>>> = IndexMap::new();
        for row in rows {
            match relation.group_key_index.map(|key_index| row.get(key_index)) {
                None => groups.entry(String::new()).or_default().push(*row),
                Some(None | Some(Value::Null)) => continue,
                Some(Some(key)) => groups.entry(key.to_string()).or_default().push(*row),
            }
        }

        groups
            .values()
            .map(|group| {
                let mut object = Map::new();
                for field in &relation.fields {
                    match field {
                        NestedField::Field { name, column_index } => {
                            let value = group[0].get(*column_index).cloned().unwrap_or(Value::Null);
                            object.insert(name.clone(), value);
                        }
                        NestedField::Relation { name, cardinality, relation_index } => {
                            let children = self.collect_relation(*relation_index, group);
                            let value = match cardinality {
                                Cardinality::Many => Value::Array(children),
                                Cardinality::One => children.into_iter().next().unwrap_or(Value::Null),
                            };
                            object.insert(name.clone(), value);
                        }
                    }
                }
                Value::Object(object)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SqlType;
    use serde_json::json;

    fn column(name: &str, table: &str) -> ColumnInfo {
        ColumnInfo { name: name.into(), column_type: SqlType::Int, not_null: false, table: table.into() }
    }

    fn relation(name: &str, alias: &str, parent: &str, cardinality: Cardinality) -> Relation {
        Relation {
            name: name.into(),
            alias: alias.into(),
            parent_relation: parent.into(),
            cardinality,
            join_column: "id".into(),
        }
    }

    fn users_with_posts() -> NestedDescriptor {
        let columns = vec![column("user_id", "u"), column("name", "u"), column("id", "p"), column("title", "p")];
        let mut users = relation("users", "u", "", Cardinality::One);
        users.join_column = "user_id".into();
        let relations = vec![
            users,
            relation("posts", "p", "u", Cardinality::Many),
            relation("comments", "c", "p", Cardinality::Many),
        ];
        NestedDescriptor::build(&columns, &relations)
    }

    #[test]
    fn builds_one_node_per_projected_relation() {
        let descriptor = users_with_posts();
        assert_eq!(descriptor.relations.len(), 2);

        let users = &descriptor.relations[0];
        assert_eq!(users.name, "u");
        assert_eq!(users.group_key_index, Some(0));
        assert_eq!(users.fields, vec![
            NestedField::Field { name: "user_id".into(), column_index: 0 },
            NestedField::Field { name: "name".into(), column_index: 1 },
            NestedField::Relation { name: "p".into(), cardinality: Cardinality::Many, relation_index: 1 },
        ]);
        assert_eq!(descriptor.relations[1].group_key_index, Some(2));

        let serialized = serde_json::to_value(&descriptor.relations[0].fields[2]).unwrap();
        assert_eq!(serialized, json!({ "type": "relation", "name": "p", "cardinality": "many", "relationIndex": 1 }));
    }

    #[test]
    fn group_key_falls_back_to_first_projected_column() {
        let columns = vec![column("title", "p")];
        let relations = vec![relation("posts", "p", "", Cardinality::One)];
        assert_eq!(NestedDescriptor::build(&columns, &relations).relations[0].group_key_index, Some(0));
    }

    #[test]
    fn collect_groups_rows_in_first_appearance_order() {
        let descriptor = users_with_posts();
        let rows = vec![
            vec![json!(2), json!("bob"), json!(20), json!("b1")],
            vec![json!(1), json!("ann"), json!(10), json!("a1")],
            vec![json!(2), json!("bob"), json!(21), json!("b2")],
            vec![json!(1), json!("ann"), json!(null), json!(null)],
            vec![json!(null), json!("ghost"), json!(30), json!("g1")],
            vec![json!(3), json!("cid"), json!(null), json!(null)],
        ];

        assert_eq!(descriptor.collect(&rows), vec![
            json!({ "user_id": 2, "name": "bob", "p": [{ "id": 20, "title": "b1" }, { "id": 21, "title": "b2" }] }),
            json!({ "user_id": 1, "name": "ann", "p": [{ "id": 10, "title": "a1" }] }),
            json!({ "user_id": 3, "name": "cid", "p": [] }),
        ]);
    }

    #[test]
    fn one_relation_yields_object_or_null() {
        let columns = vec![column("id", "p"), column("id", "u"), column("name", "u")];
        let relations = vec![relation("posts", "p", "", Cardinality::One), relation("users", "u", "p", Cardinality::One)];
        let descriptor = NestedDescriptor::build(&columns, &relations);

        let rows = vec![
            vec![json!(10), json!(1), json!("ann")],
            vec![json!(11), json!(null), json!(null)],
        ];
        assert_eq!(descriptor.collect(&rows), vec![
            json!({ "id": 10, "u": { "id": 1, "name": "ann" } }),
            json!({ "id": 11, "u": null }),
        ]);
    }
    #[test]
    fn root_without_projected_columns_keeps_every_child() {
        let columns = vec![column("id", "p"), column("id", "c")];
        let relations = vec![
            relation("users", "u", "", Cardinality::One),
            relation("posts", "p", "u", Cardinality::Many),
            relation("comments", "c", "u", Cardinality::Many),
        ];
        let descriptor = NestedDescriptor::build(&columns, &relations);

        assert_eq!(descriptor.relations.len(), 3);
        assert_eq!(descriptor.relations[0].group_key_index, None);
        assert_eq!(descriptor.collect(&[vec![json!(10), json!(100)], vec![json!(11), json!(100)]]), vec![
            json!({ "p": [{ "id": 10 }, { "id": 11 }], "c": [{ "id": 100 }] }),
        ]);
        assert!(descriptor.collect(&[]).is_empty());
    }

    #[test]
    fn children_of_an_unprojected_relation_hang_off_its_ancestor() {
        let columns = vec![column("id", "u"), column("id", "c")];
        let relations = vec![
            relation("users", "u", "", Cardinality::One),
            relation("posts", "p", "u", Cardinality::Many),
            relation("comments", "c", "p", Cardinality::Many),
        ];
        let descriptor = NestedDescriptor::build(&columns, &relations);

        assert_eq!(descriptor.relations.len(), 2);
        assert_eq!(descriptor.relations[0].fields[1], NestedField::Relation {
            name: "c".into(),
            cardinality: Cardinality::Many,
            relation_index: 1,
        });
        assert_eq!(descriptor.collect(&[vec![json!(1), json!(100)]]), vec![json!({ "id": 1, "c": [{ "id": 100 }] })]);
    }

    #[test]
    fn row_order_within_a_group_does_not_change_the_objects() {
        let descriptor = users_with_posts();
        let ann = vec![json!(1), json!("ann"), json!(10), json!("a1")];
        let ann_without_post = vec![json!(1), json!("ann"), json!(null), json!(null)];
        let bob = vec![json!(2), json!("bob"), json!(20), json!("b1")];
        let bob_second = vec![json!(2), json!("bob"), json!(21), json!("b2")];

        let forward = descriptor.collect(&[bob.clone(), bob_second.clone(), ann.clone(), ann_without_post.clone()]);
        let shuffled = descriptor.collect(&[bob, ann_without_post, bob_second, ann]);
        assert_eq!(forward, shuffled);
        assert_eq!(forward[1], json!({ "user_id": 1, "name": "ann", "p": [{ "id": 10, "title": "a1" }] }));
    }
}
