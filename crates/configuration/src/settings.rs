//! Settings that shape how request parameters are read and how pages are described.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// How the sort parameter is spelled.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SortSettings {
    #[serde(default = "default_sort_parameter_name")]
    pub parameter_name: String,
    /// Separates the sort fields: `sort=a,b`.
    #[serde(default = "default_field_separator")]
    pub field_separator: String,
    /// Separates a field from its direction: `sort=a:DESC`.
    #[serde(default = "default_direction_separator")]
    pub direction_separator: String,
    #[serde(default = "default_ascending_name")]
    pub ascending_name: String,
    #[serde(default = "default_descending_name")]
    pub descending_name: String,
}

impl Default for SortSettings {
    fn default() -> Self {
        SortSettings {
            parameter_name: default_sort_parameter_name(),
            field_separator: default_field_separator(),
            direction_separator: default_direction_separator(),
            ascending_name: default_ascending_name(),
            descending_name: default_descending_name(),
        }
    }
}

fn default_sort_parameter_name() -> String {
    "sort".to_string()
}

fn default_field_separator() -> String {
    ",".to_string()
}

fn default_direction_separator() -> String {
    ":".to_string()
}

fn default_ascending_name() -> String {
    "ASC".to_string()
}

fn default_descending_name() -> String {
    "DESC".to_string()
}

/// Page sizes and the names of the paging parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginationSettings {
    /// Page size when the request has none. 0 means `maxPageSize`.
    #[serde(default)]
    pub default_page_size: u32,
    /// Largest page size a request may ask for. 0 means no limit.
    #[serde(default)]
    pub max_page_size: u32,
    #[serde(default = "default_page_size_name")]
    pub page_size_name: String,
    #[serde(default = "default_cursor_name")]
    pub cursor_name: String,
    /// The offset key inside cursors. Must not be a field name.
    #[serde(default = "default_index_cursor_name")]
    pub index_cursor_name: String,
    /// Parameters handled elsewhere, which the query engine ignores.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reserved_parameters: Vec<String>,
}

impl Default for PaginationSettings {
    fn default() -> Self {
        PaginationSettings {
            default_page_size: 0,
            max_page_size: 0,
            page_size_name: default_page_size_name(),
            cursor_name: default_cursor_name(),
            index_cursor_name: default_index_cursor_name(),
            reserved_parameters: vec![],
        }
    }
}

impl PaginationSettings {
    /// The page size used when the request does not give one. `None` is unbounded.
    pub fn effective_default_page_size(&self) -> Option<u32> {
        match (self.default_page_size, self.max_page_size) {
            (0, 0) => None,
            (0, max) => Some(max),
            (default, _) => Some(default),
        }
    }
}

fn default_page_size_name() -> String {
    "limit".to_string()
}

fn default_cursor_name() -> String {
    "cursor".to_string()
}

fn default_index_cursor_name() -> String {
    "|Offset|".to_string()
}

/// Where the comparison operator of a filter is written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum AttributeHandling {
    /// `name[gte]=5`
    ParameterNameArrayNotation,
    /// `name:gte=5`
    #[default]
    ParameterNameSuffix,
    /// `name=gte:5`
    ParameterValuePrefix,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchSettings {
    #[serde(default)]
    pub attribute_handling: AttributeHandling,
    /// Used by the suffix and prefix attribute handling.
    #[serde(default = "default_attribute_separator")]
    pub attribute_separator: String,
    /// Splits the values of enum and numeric filters into lists.
    #[serde(default = "default_enum_split")]
    pub enum_split: String,
}

impl Default for SearchSettings {
    fn default() -> Self {
        SearchSettings {
            attribute_handling: AttributeHandling::default(),
            attribute_separator: default_attribute_separator(),
            enum_split: default_enum_split(),
        }
    }
}

impl SearchSettings {
    /// Text that cannot appear in a field name, since it would be read as the start
    /// of an attribute in the parameter name.
    pub fn name_attribute_marker(&self) -> Option<&str> {
        match self.attribute_handling {
            AttributeHandling::ParameterNameArrayNotation => Some("["),
            AttributeHandling::ParameterNameSuffix => Some(&self.attribute_separator),
            AttributeHandling::ParameterValuePrefix => None,
        }
    }
}

fn default_attribute_separator() -> String {
    ":".to_string()
}

fn default_enum_split() -> String {
    ",".to_string()
}

/// Response headers carrying page links.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HeaderNames {
    #[serde(default = "default_current_page")]
    pub current_page: String,
    #[serde(default = "default_next_page")]
    pub next_page: String,
    #[serde(default = "default_previous_page")]
    pub previous_page: String,
    #[serde(default = "default_first_page")]
    pub first_page: String,
    #[serde(default = "default_last_page")]
    pub last_page: String,
}

impl Default for HeaderNames {
    fn default() -> Self {
        HeaderNames {
            current_page: default_current_page(),
            next_page: default_next_page(),
            previous_page: default_previous_page(),
            first_page: default_first_page(),
            last_page: default_last_page(),
        }
    }
}

impl HeaderNames {
    pub fn all(&self) -> [&str; 5] {
        [
            &self.current_page,
            &self.next_page,
            &self.previous_page,
            &self.first_page,
            &self.last_page,
        ]
    }
}

fn default_current_page() -> String {
    "Current-Page".to_string()
}

fn default_next_page() -> String {
    "Next-Page".to_string()
}

fn default_previous_page() -> String {
    "Previous-Page".to_string()
}

fn default_first_page() -> String {
    "First-Page".to_string()
}

fn default_last_page() -> String {
    "Last-Page".to_string()
}

/// Everything request translation needs to know about the deployment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestSettings {
    pub sort: SortSettings,
    pub pagination: PaginationSettings,
    pub search: SearchSettings,
    pub headers: HeaderNames,
    /// Cursors are encrypted with this passphrase when set.
    pub cursor_key: Option<String>,
}

impl RequestSettings {
    /// The parameter names with a meaning of their own.
    pub fn special_parameter_names(&self) -> [&str; 4] {
        [
            &self.sort.parameter_name,
            &self.pagination.page_size_name,
            &self.pagination.cursor_name,
            &self.pagination.index_cursor_name,
        ]
    }

    pub fn is_reserved(&self, parameter: &str) -> bool {
        self.pagination
            .reserved_parameters
            .iter()
            .any(|reserved| reserved == parameter)
    }
}
