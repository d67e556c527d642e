//! Declared joins and the dependency graph between their aliases.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use nonempty::NonEmpty;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::error::SchemaError;
use super::field::ColumnRef;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum JoinKind {
    #[default]
    Inner,
    Left,
}

/// A possibly schema-qualified table name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct TableRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub name: String,
}

impl TableRef {
    pub fn new(name: &str) -> Self {
        TableRef {
            schema: None,
            name: name.to_string(),
        }
    }

    pub fn qualified(schema: &str, name: &str) -> Self {
        TableRef {
            schema: Some(schema.to_string()),
            name: name.to_string(),
        }
    }
}

impl From<&str> for TableRef {
    fn from(value: &str) -> Self {
        TableRef::new(value)
    }
}

/// `left = right` inside an ON clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ColumnEquality {
    pub left: ColumnRef,
    pub right: ColumnRef,
}

/// A declared SQL join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinDescriptor {
    pub kind: JoinKind,
    pub table: TableRef,
    pub alias: String,
    /// The alias this join hangs off. Must be declared first.
    pub depends_on: String,
    /// Conjunction of column equalities.
    pub on: NonEmpty<ColumnEquality>,
}

impl JoinDescriptor {
    /// Join `table AS alias ON left = right`, depending on `left`'s alias.
    pub fn new(
        kind: JoinKind,
        table: impl Into<TableRef>,
        alias: &str,
        left: ColumnRef,
        right: ColumnRef,
    ) -> Self {
        JoinDescriptor {
            kind,
            table: table.into(),
            alias: alias.to_string(),
            depends_on: left.alias.clone(),
            on: NonEmpty::new(ColumnEquality { left, right }),
        }
    }

    pub fn inner(table: impl Into<TableRef>, alias: &str, left: ColumnRef, right: ColumnRef) -> Self {
        Self::new(JoinKind::Inner, table, alias, left, right)
    }

    pub fn left(table: impl Into<TableRef>, alias: &str, left: ColumnRef, right: ColumnRef) -> Self {
        Self::new(JoinKind::Left, table, alias, left, right)
    }

    /// Add another equality to the ON clause.
    #[must_use]
    pub fn and_on(mut self, left: ColumnRef, right: ColumnRef) -> Self {
        self.on.push(ColumnEquality { left, right });
        self
    }
}

/// The joins of an entity in declaration order, rooted at the primary alias.
///
/// Every join depends on an alias declared before it, so the graph is acyclic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinGraph {
    primary_alias: String,
    joins: IndexMap<String, JoinDescriptor>,
}

/// The joins picked for a set of aliases did not cover the set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected {expected} joins for aliases {aliases:?} but found {found}")]
pub struct JoinClosureMismatch {
    pub aliases: BTreeSet<String>,
    pub expected: usize,
    pub found: usize,
}

impl JoinGraph {
    pub fn new(primary_alias: &str) -> Self {
        JoinGraph {
            primary_alias: primary_alias.to_string(),
            joins: IndexMap::new(),
        }
    }

    pub fn primary_alias(&self) -> &str {
        &self.primary_alias
    }

    pub fn contains_alias(&self, alias: &str) -> bool {
        alias == self.primary_alias || self.joins.contains_key(alias)
    }

    pub fn get(&self, alias: &str) -> Option<&JoinDescriptor> {
        self.joins.get(alias)
    }

    /// All joins in declaration order.
    pub fn joins(&self) -> impl Iterator<Item = &JoinDescriptor> {
        self.joins.values()
    }

    /// Register a join. Its dependency must already be registered.
    pub fn add(&mut self, join: JoinDescriptor) -> Result<(), SchemaError> {
        if !self.contains_alias(&join.depends_on) {
            return Err(SchemaError::JoinBeforeDependency {
                alias: join.alias,
                dependency: join.depends_on,
            });
        }
        if self.contains_alias(&join.alias) {
            return Err(SchemaError::DuplicateJoinAlias { alias: join.alias });
        }
        for column in join.on.iter().flat_map(|eq| [&eq.left, &eq.right]) {
            if column.alias != join.alias && column.alias != join.depends_on {
                return Err(SchemaError::InvalidJoinCondition {
                    alias: join.alias.clone(),
                    dependency: join.depends_on.clone(),
                    column: column.internal_name(),
                });
            }
        }
        self.joins.insert(join.alias.clone(), join);
        Ok(())
    }

    /// The join aliases needed to reach every given alias from the primary alias.
    ///
    /// Unknown aliases end up in the closure too, so that `joins_for` notices them.
    pub fn closure<'a>(&self, aliases: impl IntoIterator<Item = &'a str>) -> BTreeSet<String> {
        let mut included = BTreeSet::new();
        for alias in aliases {
            let mut current: &str = alias;
            while current != self.primary_alias && included.insert(current.to_string()) {
                match self.joins.get(current) {
                    Some(join) => current = &join.depends_on,
                    None => break,
                }
            }
        }
        included
    }

    /// The joins needed for the given aliases, in declaration order.
    pub fn joins_for<'a>(
        &self,
        aliases: impl IntoIterator<Item = &'a str>,
    ) -> Result<Vec<&JoinDescriptor>, JoinClosureMismatch> {
        let closure = self.closure(aliases);
        let joins: Vec<&JoinDescriptor> = self
            .joins
            .values()
            .filter(|join| closure.contains(&join.alias))
            .collect();
        if joins.len() == closure.len() {
            Ok(joins)
        } else {
            Err(JoinClosureMismatch {
                expected: closure.len(),
                found: joins.len(),
                aliases: closure,
            })
        }
    }

    /// Declared aliases that none of the given aliases need.
    pub fn unreferenced<'a>(&self, aliases: impl IntoIterator<Item = &'a str>) -> Vec<&str> {
        let closure = self.closure(aliases);
        self.joins
            .keys()
            .filter(|alias| !closure.contains(*alias))
            .map(String::as_str)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    /// a <- b <- c, a <- d <- e, d <- f
    fn graph() -> JoinGraph {
        let mut graph = JoinGraph::new("a");
        for (alias, dependency) in [("b", "a"), ("c", "b"), ("d", "a"), ("e", "d"), ("f", "d")] {
            graph
                .add(JoinDescriptor::inner(
                    alias,
                    alias,
                    ColumnRef::new(dependency, "id"),
                    ColumnRef::new(alias, "parent_id"),
                ))
                .unwrap();
        }
        graph
    }

    fn aliases(joins: &[&JoinDescriptor]) -> Vec<String> {
        joins.iter().map(|join| join.alias.clone()).collect()
    }

    #[test]
    fn closure_walks_up_to_the_primary_alias() {
        let graph = graph();
        assert_eq!(
            graph.closure(["c"]),
            BTreeSet::from(["b".to_string(), "c".to_string()])
        );
        assert_eq!(
            graph.closure(["e", "f"]),
            BTreeSet::from(["d".to_string(), "e".to_string(), "f".to_string()])
        );
        assert!(graph.closure(["a"]).is_empty());
    }

    #[test]
    fn joins_come_back_in_declaration_order() {
        let graph = graph();
        assert_eq!(aliases(&graph.joins_for(["f", "c"]).unwrap()), vec!["b", "c", "d", "f"]);
        assert_eq!(aliases(&graph.joins_for(["a"]).unwrap()), Vec::<String>::new());
    }

    #[test]
    fn unknown_aliases_are_a_closure_mismatch() {
        let error = graph().joins_for(["zz"]).unwrap_err();
        assert_eq!(error.expected, 1);
        assert_eq!(error.found, 0);
    }

    #[test]
    fn unreferenced_aliases_are_listed() {
        assert_eq!(graph().unreferenced(["c", "e"]), vec!["f"]);
    }

    #[test]
    fn dependency_must_be_declared_first() {
        let mut graph = JoinGraph::new("a");
        let error = graph
            .add(JoinDescriptor::inner(
                "c",
                "c",
                ColumnRef::new("b", "id"),
                ColumnRef::new("c", "b_id"),
            ))
            .unwrap_err();
        assert_eq!(
            error,
            SchemaError::JoinBeforeDependency {
                alias: "c".to_string(),
                dependency: "b".to_string()
            }
        );
    }

    #[test]
    fn aliases_are_unique() {
        let mut graph = graph();
        let error = graph
            .add(JoinDescriptor::left(
                "b",
                "b",
                ColumnRef::new("a", "id"),
                ColumnRef::new("b", "other_id"),
            ))
            .unwrap_err();
        assert_eq!(
            error,
            SchemaError::DuplicateJoinAlias {
                alias: "b".to_string()
            }
        );
    }

    #[test]
    fn join_conditions_only_use_their_own_aliases() {
        let mut graph = graph();
        let error = graph
            .add(
                JoinDescriptor::inner(
                    "g",
                    "g",
                    ColumnRef::new("c", "id"),
                    ColumnRef::new("g", "c_id"),
                )
                .and_on(ColumnRef::new("e", "x"), ColumnRef::new("g", "x")),
            )
            .unwrap_err();
        assert_eq!(
            error,
            SchemaError::InvalidJoinCondition {
                alias: "g".to_string(),
                dependency: "c".to_string(),
                column: "e.x".to_string(),
            }
        );
    }
}
