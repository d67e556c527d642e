//! Declarative, serializable entity descriptions, as found in configuration files.

use std::collections::BTreeMap;

use nonempty::NonEmpty;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::error::SchemaError;
use super::field::{ConditionGenerator, FieldType, QueryFieldKind, QueryFieldRestriction};
use super::joins::{ColumnEquality, JoinDescriptor, JoinKind, TableRef};
use super::schema::{EntitySchema, FieldDefinition, TableSelector};

/// An entity, the table it is read from, its joins and its fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EntityDescription {
    pub name: String,
    pub table: TableRef,
    /// Defaults to the table name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub joins: Vec<JoinDescription>,
    pub fields: Vec<FieldDescription>,
    /// Extra JSON names, mapped to the JSON name of the field they stand for.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub json_aliases: BTreeMap<String, String>,
    /// Select distinct rows. Only selected fields can then be sorted on.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub distinct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct JoinDescription {
    #[serde(default)]
    pub kind: JoinKind,
    pub table: TableRef,
    pub alias: String,
    /// Defaults to the alias on the left of the first condition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<String>,
    pub on: Vec<ColumnEquality>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescription {
    pub json_name: String,
    pub column: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// The alias the column belongs to. Defaults to the primary alias, or to the alias
    /// of `table` when that is given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    #[serde(default)]
    pub kind: QueryFieldKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub select_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_pattern: Option<String>,
    #[serde(default)]
    pub condition_generator: ConditionGenerator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restriction: Option<QueryFieldRestriction>,
}

impl EntityDescription {
    pub fn build(self) -> Result<EntitySchema, SchemaError> {
        let mut builder = EntitySchema::builder(&self.name, self.table).distinct(self.distinct);
        if let Some(alias) = &self.alias {
            builder = builder.primary_alias(alias);
        }
        for join in self.joins {
            builder = builder.join(join.into_descriptor()?);
        }
        for field in self.fields {
            builder = builder.field(field.into_definition());
        }
        for (alias, json_name) in &self.json_aliases {
            builder = builder.json_alias(alias, json_name);
        }
        builder.build()
    }
}

impl JoinDescription {
    fn into_descriptor(self) -> Result<JoinDescriptor, SchemaError> {
        let Some(on) = NonEmpty::from_vec(self.on) else {
            return Err(SchemaError::EmptyJoinCondition { alias: self.alias });
        };
        Ok(JoinDescriptor {
            kind: self.kind,
            table: self.table,
            depends_on: self
                .depends_on
                .unwrap_or_else(|| on.head.left.alias.clone()),
            alias: self.alias,
            on,
        })
    }
}

impl FieldDescription {
    fn into_definition(self) -> FieldDefinition {
        let table = match (self.alias, self.table) {
            (Some(alias), _) => TableSelector::Alias(alias),
            (None, Some(table)) => TableSelector::Table(table),
            (None, None) => TableSelector::Primary,
        };
        FieldDefinition {
            json_name: self.json_name,
            table,
            column: self.column,
            field_type: self.field_type,
            kind: self.kind,
            select_name: self.select_name,
            date_pattern: self.date_pattern,
            condition_generator: self.condition_generator,
            restriction: self.restriction,
        }
    }
}
