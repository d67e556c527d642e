//! Fields exposed by an entity and the columns they map to.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The declared type of a field. Decides how client values are parsed and bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum FieldType {
    String,
    /// A closed set of string values.
    Enum(Vec<String>),
    Uuid,
    Date,
    /// A date and time without an offset.
    DateTime,
    OffsetDateTime,
    /// 32 bit integer.
    Integer,
    /// 64 bit integer.
    Long,
    Decimal,
    Boolean,
}

impl FieldType {
    /// Strings and enums compare as text without a cast.
    pub fn is_textual(&self) -> bool {
        matches!(self, FieldType::String | FieldType::Enum(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Enum(_) => "enum",
            FieldType::Uuid => "uuid",
            FieldType::Date => "date",
            FieldType::DateTime => "date-time",
            FieldType::OffsetDateTime => "offset date-time",
            FieldType::Integer => "integer",
            FieldType::Long => "long",
            FieldType::Decimal => "decimal",
            FieldType::Boolean => "boolean",
        }
    }
}

/// A column of a table alias.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct ColumnRef {
    pub alias: String,
    pub column: String,
}

impl ColumnRef {
    pub fn new(alias: &str, column: &str) -> Self {
        ColumnRef {
            alias: alias.to_string(),
            column: column.to_string(),
        }
    }

    /// `alias.column`, unique across a schema.
    pub fn internal_name(&self) -> String {
        format!("{}.{}", self.alias, self.column)
    }
}

impl std::fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}.{}", self.alias, self.column)
    }
}

/// What a field can be used for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum QueryFieldKind {
    /// Selected into the output. Can be filtered and sorted on.
    #[default]
    Selectable,
    /// Can be filtered and sorted on, but is never selected.
    Computed,
    /// Hidden from clients.
    JsonIgnored,
    /// Not backed by the database row.
    Transient,
}

impl QueryFieldKind {
    pub fn is_selectable(self) -> bool {
        self == QueryFieldKind::Selectable
    }

    /// Why the field cannot be filtered or sorted on, if it cannot.
    pub fn filter_rejection(self) -> Option<&'static str> {
        match self {
            QueryFieldKind::Selectable | QueryFieldKind::Computed => None,
            QueryFieldKind::JsonIgnored => Some("the field is not exposed"),
            QueryFieldKind::Transient => Some("the field is not stored in the database"),
        }
    }
}

/// How the values of a filter parameter become conditions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum ConditionGenerator {
    /// One value per parameter, split further only for enums.
    #[default]
    Default,
    /// Every value is split on `,`, repeated parameters are merged.
    /// Only equality operators, and no NULL.
    CommaSeparatedList,
}

/// Server side limits on a field's filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct QueryFieldRestriction {
    /// Applied when the request does not filter on the field.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub defaults: Vec<String>,
    #[serde(default)]
    pub validator: RestrictionValidator,
}

impl QueryFieldRestriction {
    /// The field is always filtered on `values` and clients may not touch it.
    pub fn ensure_set_to(values: &[&str]) -> Self {
        QueryFieldRestriction {
            defaults: values.iter().map(ToString::to_string).collect(),
            validator: RestrictionValidator::Internal,
        }
    }

    /// Filter on `values` unless the client asks for something else.
    pub fn with_default(values: &[&str]) -> Self {
        QueryFieldRestriction {
            defaults: values.iter().map(ToString::to_string).collect(),
            validator: RestrictionValidator::None,
        }
    }

    /// Clients may only ask for values out of `values`.
    pub fn enum_subset(values: &[&str]) -> Self {
        QueryFieldRestriction {
            defaults: vec![],
            validator: RestrictionValidator::EnumSubset(
                values.iter().map(ToString::to_string).collect(),
            ),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum RestrictionValidator {
    #[default]
    None,
    EnumSubset(Vec<String>),
    /// The parameter is reserved for the server.
    Internal,
}

/// A resolved field of an entity schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryField {
    pub json_name: String,
    pub column: ColumnRef,
    /// The name the column is selected as.
    pub select_name: String,
    pub field_type: FieldType,
    pub kind: QueryFieldKind,
    /// A chrono format string used for date and time values.
    pub date_pattern: Option<String>,
    pub condition_generator: ConditionGenerator,
    pub restriction: Option<QueryFieldRestriction>,
}

impl QueryField {
    pub fn is_selectable(&self) -> bool {
        self.kind.is_selectable()
    }

    pub fn internal_name(&self) -> String {
        self.column.internal_name()
    }
}
