//! The resolved description of an entity, and the builder that checks it.

use std::collections::HashMap;

use super::error::{ClashKind, SchemaError};
use super::field::{
    ColumnRef, ConditionGenerator, FieldType, QueryField, QueryFieldKind, QueryFieldRestriction,
};
use super::joins::{JoinDescriptor, JoinGraph, TableRef};

/// Immutable description of one entity: its table, joins and fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySchema {
    name: String,
    table: TableRef,
    joins: JoinGraph,
    fields: Vec<QueryField>,
    by_json_name: HashMap<String, usize>,
    by_select_name: HashMap<String, usize>,
    distinct: bool,
}

impl EntitySchema {
    pub fn builder(name: &str, table: impl Into<TableRef>) -> EntitySchemaBuilder {
        EntitySchemaBuilder {
            name: name.to_string(),
            table: table.into(),
            primary_alias: None,
            joins: vec![],
            fields: vec![],
            json_aliases: vec![],
            distinct: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table(&self) -> &TableRef {
        &self.table
    }

    pub fn primary_alias(&self) -> &str {
        self.joins.primary_alias()
    }

    pub fn joins(&self) -> &JoinGraph {
        &self.joins
    }

    /// Rows are selected with `SELECT DISTINCT`.
    pub fn is_distinct(&self) -> bool {
        self.distinct
    }

    /// Look a field up by its JSON name or one of its JSON name aliases.
    pub fn field(&self, json_name: &str) -> Option<&QueryField> {
        self.by_json_name.get(json_name).map(|index| &self.fields[*index])
    }

    /// Every JSON name the entity answers to, aliases included.
    pub fn json_names(&self) -> impl Iterator<Item = &str> {
        self.by_json_name.keys().map(String::as_str)
    }

    pub fn field_by_select_name(&self, select_name: &str) -> Option<&QueryField> {
        self.by_select_name
            .get(select_name)
            .map(|index| &self.fields[*index])
    }

    /// All fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &QueryField> {
        self.fields.iter()
    }

    pub fn selectable_fields(&self) -> impl Iterator<Item = &QueryField> {
        self.fields.iter().filter(|field| field.is_selectable())
    }

    /// Fields whose restriction supplies default values.
    pub fn fields_with_defaults(&self) -> impl Iterator<Item = &QueryField> {
        self.fields.iter().filter(|field| {
            field
                .restriction
                .as_ref()
                .is_some_and(|restriction| !restriction.defaults.is_empty())
        })
    }
}

/// Which table a field's column lives in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableSelector {
    Primary,
    Alias(String),
    /// Resolved to the only alias that selects from or joins this table.
    Table(String),
}

/// A field as declared, before its alias is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDefinition {
    pub json_name: String,
    pub table: TableSelector,
    pub column: String,
    pub field_type: FieldType,
    pub kind: QueryFieldKind,
    pub select_name: Option<String>,
    pub date_pattern: Option<String>,
    pub condition_generator: ConditionGenerator,
    pub restriction: Option<QueryFieldRestriction>,
}

impl FieldDefinition {
    /// A selectable field on the primary table.
    pub fn new(json_name: &str, column: &str, field_type: FieldType) -> Self {
        FieldDefinition {
            json_name: json_name.to_string(),
            table: TableSelector::Primary,
            column: column.to_string(),
            field_type,
            kind: QueryFieldKind::Selectable,
            select_name: None,
            date_pattern: None,
            condition_generator: ConditionGenerator::Default,
            restriction: None,
        }
    }

    #[must_use]
    pub fn on_alias(mut self, alias: &str) -> Self {
        self.table = TableSelector::Alias(alias.to_string());
        self
    }

    #[must_use]
    pub fn on_table(mut self, table: &str) -> Self {
        self.table = TableSelector::Table(table.to_string());
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: QueryFieldKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn select_name(mut self, select_name: &str) -> Self {
        self.select_name = Some(select_name.to_string());
        self
    }

    #[must_use]
    pub fn date_pattern(mut self, pattern: &str) -> Self {
        self.date_pattern = Some(pattern.to_string());
        self
    }

    #[must_use]
    pub fn condition_generator(mut self, generator: ConditionGenerator) -> Self {
        self.condition_generator = generator;
        self
    }

    #[must_use]
    pub fn restriction(mut self, restriction: QueryFieldRestriction) -> Self {
        self.restriction = Some(restriction);
        self
    }
}

/// Collects the declaration of an entity. `build` consumes it, so a builder
/// produces at most one schema.
#[derive(Debug, Clone)]
pub struct EntitySchemaBuilder {
    name: String,
    table: TableRef,
    primary_alias: Option<String>,
    joins: Vec<JoinDescriptor>,
    fields: Vec<FieldDefinition>,
    json_aliases: Vec<(String, String)>,
    distinct: bool,
}

impl EntitySchemaBuilder {
    /// Defaults to the table name.
    #[must_use]
    pub fn primary_alias(mut self, alias: &str) -> Self {
        self.primary_alias = Some(alias.to_string());
        self
    }

    #[must_use]
    pub fn join(mut self, join: JoinDescriptor) -> Self {
        self.joins.push(join);
        self
    }

    #[must_use]
    pub fn field(mut self, field: FieldDefinition) -> Self {
        self.fields.push(field);
        self
    }

    /// Accept `alias` as another JSON name for `json_name`.
    #[must_use]
    pub fn json_alias(mut self, alias: &str, json_name: &str) -> Self {
        self.json_aliases
            .push((alias.to_string(), json_name.to_string()));
        self
    }

    #[must_use]
    pub fn distinct(mut self, distinct: bool) -> Self {
        self.distinct = distinct;
        self
    }

    pub fn build(self) -> Result<EntitySchema, SchemaError> {
        let primary_alias = self
            .primary_alias
            .unwrap_or_else(|| self.table.name.clone());
        check_table(&self.table)?;
        check_identifier(&primary_alias, "table alias")?;

        // table name -> aliases using it
        let mut tables: HashMap<String, Vec<String>> = HashMap::new();
        tables
            .entry(self.table.name.clone())
            .or_default()
            .push(primary_alias.clone());

        let mut joins = JoinGraph::new(&primary_alias);
        for join in self.joins {
            check_table(&join.table)?;
            check_identifier(&join.alias, "table alias")?;
            for column in join.on.iter().flat_map(|eq| [&eq.left, &eq.right]) {
                check_identifier(&column.column, "column name")?;
            }
            tables
                .entry(join.table.name.clone())
                .or_default()
                .push(join.alias.clone());
            joins.add(join)?;
        }

        let mut fields: Vec<QueryField> = Vec::with_capacity(self.fields.len());
        let mut by_json_name = HashMap::new();
        let mut by_select_name = HashMap::new();
        let mut by_internal_name: HashMap<String, usize> = HashMap::new();

        for definition in self.fields {
            if definition.json_name.is_empty() {
                return Err(SchemaError::InvalidIdentifier {
                    identifier: definition.json_name,
                    context: "JSON name",
                });
            }
            check_identifier(&definition.column, "column name")?;
            let alias = match definition.table {
                TableSelector::Primary => primary_alias.clone(),
                TableSelector::Alias(alias) => {
                    if !joins.contains_alias(&alias) {
                        return Err(SchemaError::UnknownAlias {
                            json_name: definition.json_name,
                            alias,
                        });
                    }
                    alias
                }
                TableSelector::Table(table) => match tables.get(&table).map(Vec::as_slice) {
                    None | Some([]) => {
                        return Err(SchemaError::UnknownTable {
                            json_name: definition.json_name,
                            table,
                        })
                    }
                    Some([alias]) => alias.clone(),
                    Some(aliases) => {
                        return Err(SchemaError::AmbiguousAlias {
                            json_name: definition.json_name,
                            aliases: aliases.join(", "),
                            table,
                        })
                    }
                },
            };

            let field = QueryField {
                select_name: definition
                    .select_name
                    .unwrap_or_else(|| definition.json_name.clone()),
                json_name: definition.json_name,
                column: ColumnRef {
                    alias,
                    column: definition.column,
                },
                field_type: definition.field_type,
                kind: definition.kind,
                date_pattern: definition.date_pattern,
                condition_generator: definition.condition_generator,
                restriction: definition.restriction,
            };

            let index = fields.len();
            register(
                &mut by_json_name,
                &fields,
                ClashKind::JsonName,
                field.json_name.clone(),
                index,
                &field.json_name,
            )?;
            if field.is_selectable() {
                register(
                    &mut by_select_name,
                    &fields,
                    ClashKind::SelectName,
                    field.select_name.clone(),
                    index,
                    &field.json_name,
                )?;
            }
            register(
                &mut by_internal_name,
                &fields,
                ClashKind::Column,
                field.internal_name(),
                index,
                &field.json_name,
            )?;
            fields.push(field);
        }

        for (alias, json_name) in self.json_aliases {
            let Some(index) = by_json_name.get(&json_name).copied() else {
                return Err(SchemaError::UnknownField { alias, json_name });
            };
            register(
                &mut by_json_name,
                &fields,
                ClashKind::JsonName,
                alias.clone(),
                index,
                &alias,
            )?;
        }

        if let Some(alias) = joins
            .unreferenced(fields.iter().map(|field| field.column.alias.as_str()))
            .first()
        {
            return Err(SchemaError::UnusedJoin {
                alias: (*alias).to_string(),
            });
        }

        Ok(EntitySchema {
            name: self.name,
            table: self.table,
            joins,
            fields,
            by_json_name,
            by_select_name,
            distinct: self.distinct,
        })
    }
}

fn register(
    index: &mut HashMap<String, usize>,
    fields: &[QueryField],
    kind: ClashKind,
    name: String,
    position: usize,
    claimant: &str,
) -> Result<(), SchemaError> {
    if let Some(existing) = index.get(&name) {
        return Err(SchemaError::FieldClash {
            kind,
            name,
            existing: fields[*existing].json_name.clone(),
            new: claimant.to_string(),
        });
    }
    index.insert(name, position);
    Ok(())
}

fn check_table(table: &TableRef) -> Result<(), SchemaError> {
    if let Some(schema) = &table.schema {
        check_identifier(schema, "schema name")?;
    }
    check_identifier(&table.name, "table name")
}

/// `[A-Za-z_][A-Za-z0-9_]*`
fn check_identifier(identifier: &str, context: &'static str) -> Result<(), SchemaError> {
    let mut chars = identifier.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(SchemaError::InvalidIdentifier {
            identifier: identifier.to_string(),
            context,
        })
    }
}
