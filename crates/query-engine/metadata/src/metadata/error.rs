//! Errors raised while building an entity schema.

use thiserror::Error;

/// Which unique name two fields are fighting over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClashKind {
    JsonName,
    SelectName,
    Column,
}

impl ClashKind {
    fn hint(self) -> &'static str {
        match self {
            ClashKind::JsonName => "rename one of them or drop the duplicate",
            ClashKind::SelectName => "give one of them a distinct select name",
            ClashKind::Column => "map the column once and register a JSON name alias instead",
        }
    }
}

impl std::fmt::Display for ClashKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ClashKind::JsonName => write!(f, "JSON name"),
            ClashKind::SelectName => write!(f, "select name"),
            ClashKind::Column => write!(f, "column"),
        }
    }
}

/// A mistake in the declared schema. These are fatal at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("'{identifier}' is not a valid {context}")]
    InvalidIdentifier {
        identifier: String,
        context: &'static str,
    },
    #[error(
        "join '{alias}' must not be added before '{dependency}', which it depends on (dependency not yet declared)"
    )]
    JoinBeforeDependency { alias: String, dependency: String },
    #[error("join alias '{alias}' is used twice")]
    DuplicateJoinAlias { alias: String },
    #[error("join '{alias}' has no join condition")]
    EmptyJoinCondition { alias: String },
    #[error("join '{alias}' compares column '{column}', which belongs to neither '{alias}' nor '{dependency}'")]
    InvalidJoinCondition {
        alias: String,
        dependency: String,
        column: String,
    },
    #[error("field '{json_name}' refers to unknown alias '{alias}'")]
    UnknownAlias { json_name: String, alias: String },
    #[error("field '{json_name}' refers to table '{table}', which the entity neither selects from nor joins")]
    UnknownTable { json_name: String, table: String },
    #[error("field '{json_name}' refers to table '{table}', which is available as {aliases}; name the alias explicitly")]
    AmbiguousAlias {
        json_name: String,
        table: String,
        aliases: String,
    },
    #[error("{kind} '{name}' is used by both '{existing}' and '{new}'; {}", .kind.hint())]
    FieldClash {
        kind: ClashKind,
        name: String,
        existing: String,
        new: String,
    },
    #[error("alias '{alias}' points at unknown field '{json_name}'")]
    UnknownField { alias: String, json_name: String },
    #[error("unused join: alias '{alias}' is not referenced by any field")]
    UnusedJoin { alias: String },
}
