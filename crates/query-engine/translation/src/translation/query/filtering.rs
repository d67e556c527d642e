//! Translate filter parameters into the conditions of the WHERE clause.

use nonempty::NonEmpty;

use query_engine_metadata::metadata::{
    ConditionGenerator, FieldType, QueryField, RestrictionValidator,
};
use query_engine_sql::sql;
use query_engine_sql::sql::execution_plan::Bindings;

use super::values;
use crate::translation::comparison::ComparisonType;
use crate::translation::error::Error;

/// The literal value that stands for SQL `NULL`.
pub const NULL_VALUE: &str = "NULL";

/// One condition of the WHERE clause.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCondition {
    /// The JSON name of the filtered field.
    pub field: String,
    pub comparison: ComparisonType,
    pub target: FilterTarget,
    pub expression: sql::ast::Expression,
}

/// What a condition compares against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterTarget {
    Null,
    /// The names the values were bound under.
    Bound(NonEmpty<String>),
}

impl FilterCondition {
    /// Whether the rendered SQL depends on the dialect, as case-insensitive matching does.
    pub fn is_dialect_dependent(&self) -> bool {
        self.expression.is_dialect_dependent()
    }
}

/// Where the values of a filter come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueOrigin {
    /// Sent by the client, directly or inside a cursor. Restrictions apply.
    Request,
    /// The field's configured defaults.
    Default,
}

/// Build the condition for `values` of one parameter, binding every value.
pub fn translate_filter(
    field: &QueryField,
    parameter: &str,
    comparison: ComparisonType,
    values: &[String],
    origin: ValueOrigin,
    list_separator: &str,
    bindings: &mut Bindings,
) -> Result<FilterCondition, Error> {
    if let Some(reason) = field.kind.filter_rejection() {
        return Err(Error::IgnoredFieldFilter {
            parameter: parameter.to_string(),
            reason,
        });
    }
    let validator = match (&field.restriction, origin) {
        (Some(restriction), ValueOrigin::Request) => &restriction.validator,
        _ => &RestrictionValidator::None,
    };
    if *validator == RestrictionValidator::Internal {
        return Err(Error::RestrictedValue {
            parameter: parameter.to_string(),
            value: values.join(","),
        });
    }

    let tokens: Vec<&str> = match field.condition_generator {
        ConditionGenerator::CommaSeparatedList => {
            if !comparison.is_equality() {
                return Err(Error::UnsupportedOperatorForType {
                    parameter: parameter.to_string(),
                    operator: comparison,
                    reason: "list parameters only support EQ and NEQ",
                });
            }
            let tokens: Vec<&str> = values.iter().flat_map(|value| value.split(',')).collect();
            if tokens.contains(&NULL_VALUE) {
                return Err(Error::InvalidNullUsage {
                    parameter: parameter.to_string(),
                    operator: comparison,
                });
            }
            tokens
        }
        ConditionGenerator::Default => {
            if origin == ValueOrigin::Request && values.len() != 1 {
                return Err(Error::DuplicateParameterUnsupported {
                    parameter: parameter.to_string(),
                });
            }
            if let [value] = values {
                if value == NULL_VALUE {
                    return null_condition(field, parameter, comparison);
                }
            }
            if splits_into_list(&field.field_type) {
                values
                    .iter()
                    .flat_map(|value| value.split(list_separator))
                    .collect()
            } else {
                values.iter().map(String::as_str).collect()
            }
        }
    };

    if tokens.iter().any(|token| token.is_empty()) {
        return Err(Error::EmptyValue {
            parameter: parameter.to_string(),
        });
    }
    if let RestrictionValidator::EnumSubset(allowed) = validator {
        if let Some(token) = tokens.iter().find(|token| !allowed.iter().any(|a| a == *token)) {
            return Err(Error::RestrictedValue {
                parameter: parameter.to_string(),
                value: (*token).to_string(),
            });
        }
    }
    values::check_operator(field, parameter, comparison)?;

    let mut names = Vec::with_capacity(tokens.len());
    for token in tokens {
        let value = values::translate_value(field, parameter, comparison, token)?;
        names.push(bindings.bind(&field.json_name, value));
    }
    let Some(names) = NonEmpty::from_vec(names) else {
        return Err(Error::EmptyValue {
            parameter: parameter.to_string(),
        });
    };

    let expression = comparison.multi_value(
        comparison.field_expression(field),
        names
            .clone()
            .map(|name| sql::ast::Expression::Value(sql::ast::Value::Variable(name))),
    );
    Ok(FilterCondition {
        field: field.json_name.clone(),
        comparison,
        target: FilterTarget::Bound(names),
        expression,
    })
}

/// Enums and numbers cannot contain the separator, so their values may be lists.
fn splits_into_list(field_type: &FieldType) -> bool {
    matches!(
        field_type,
        FieldType::Enum(_) | FieldType::Integer | FieldType::Long | FieldType::Decimal
    )
}

fn null_condition(
    field: &QueryField,
    parameter: &str,
    comparison: ComparisonType,
) -> Result<FilterCondition, Error> {
    let expression = comparison
        .null_check(comparison.field_expression(field))
        .ok_or_else(|| Error::InvalidNullUsage {
            parameter: parameter.to_string(),
            operator: comparison,
        })?;
    Ok(FilterCondition {
        field: field.json_name.clone(),
        comparison,
        target: FilterTarget::Null,
        expression,
    })
}
