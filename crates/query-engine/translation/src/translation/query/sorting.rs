//! Translate the sort parameter into an ORDER BY clause.

use query_engine_metadata::metadata::{ColumnRef, EntitySchema};
use query_engine_sql::sql;
use restql_configuration::SortSettings;

use crate::translation::error::Error;

/// A field to order by, as given by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortField {
    /// The JSON name of the field.
    pub field: String,
    pub column: ColumnRef,
    pub direction: sql::ast::OrderByDirection,
}

/// Parse `field[:direction],...` into sort fields, in the order given.
pub fn parse_sort(
    schema: &EntitySchema,
    settings: &SortSettings,
    parameter: &str,
    value: &str,
) -> Result<Vec<SortField>, Error> {
    let invalid = |reason: String| Error::InvalidSort {
        parameter: parameter.to_string(),
        value: value.to_string(),
        reason,
    };

    value
        .split(settings.field_separator.as_str())
        .map(|item| {
            let (name, direction) = match item.split_once(settings.direction_separator.as_str()) {
                Some((name, direction)) => (name, parse_direction(settings, direction)),
                None => (item, Some(sql::ast::OrderByDirection::Asc)),
            };
            if name.is_empty() {
                return Err(invalid("a sort field is missing".to_string()));
            }
            let direction = direction.ok_or_else(|| {
                invalid(format!(
                    "the direction must be {} or {}",
                    settings.ascending_name, settings.descending_name
                ))
            })?;
            let field = schema
                .field(name)
                .ok_or_else(|| invalid(format!("unknown field '{name}'")))?;
            if let Some(reason) = field.kind.filter_rejection() {
                return Err(Error::IgnoredFieldFilter {
                    parameter: parameter.to_string(),
                    reason,
                });
            }
            // ORDER BY of a SELECT DISTINCT may only use selected columns.
            if schema.is_distinct() && !field.is_selectable() {
                return Err(invalid(format!("'{name}' is not selected and cannot be sorted on")));
            }
            Ok(SortField {
                field: field.json_name.clone(),
                column: field.column.clone(),
                direction,
            })
        })
        .collect()
}

fn parse_direction(settings: &SortSettings, direction: &str) -> Option<sql::ast::OrderByDirection> {
    if direction.eq_ignore_ascii_case(&settings.ascending_name) {
        Some(sql::ast::OrderByDirection::Asc)
    } else if direction.eq_ignore_ascii_case(&settings.descending_name) {
        Some(sql::ast::OrderByDirection::Desc)
    } else {
        None
    }
}

/// Convert the sort fields to an ORDER BY clause. No tie-breaking column is added.
pub fn translate_order_by(sort: &[SortField]) -> sql::ast::OrderBy {
    sql::ast::OrderBy {
        elements: sort
            .iter()
            .map(|sort_field| sql::ast::OrderByElement {
                target: sql::helpers::make_column_reference(
                    sql::helpers::make_table_alias(&sort_field.column.alias),
                    &sort_field.column.column,
                ),
                direction: sort_field.direction,
            })
            .collect(),
    }
}
