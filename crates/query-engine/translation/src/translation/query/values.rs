//! Handle the translation of client supplied values.

use std::str::FromStr;

use query_engine_metadata::metadata::{FieldType, QueryField};
use query_engine_sql::sql::execution_plan::BindValue;

use crate::translation::comparison::ComparisonType;
use crate::translation::error::Error;

const DATE_PATTERN: &str = "%Y-%m-%d";
const DATE_TIME_PATTERN: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Convert a parameter value into a value of the field's type.
///
/// Operators comparing text take the value as is, whatever the field's type.
pub fn translate_value(
    field: &QueryField,
    parameter: &str,
    comparison: ComparisonType,
    value: &str,
) -> Result<BindValue, Error> {
    if comparison.converts_to_string() {
        return Ok(BindValue::Text(value.to_string()));
    }

    let pattern = field.date_pattern.as_deref();
    let mismatch = || Error::TypeCoercionFailure {
        parameter: parameter.to_string(),
        value: value.to_string(),
        expected: expected(field),
    };

    match &field.field_type {
        FieldType::String => Ok(BindValue::Text(value.to_string())),
        FieldType::Enum(domain) => {
            if domain.iter().any(|allowed| allowed == value) {
                Ok(BindValue::Text(value.to_string()))
            } else {
                Err(mismatch())
            }
        }
        FieldType::Uuid => uuid::Uuid::parse_str(value)
            .map(BindValue::Uuid)
            .map_err(|_| mismatch()),
        FieldType::Date => chrono::NaiveDate::parse_from_str(value, pattern.unwrap_or(DATE_PATTERN))
            .map(BindValue::Date)
            .map_err(|_| mismatch()),
        FieldType::DateTime => {
            chrono::NaiveDateTime::parse_from_str(value, pattern.unwrap_or(DATE_TIME_PATTERN))
                .map(BindValue::Timestamp)
                .map_err(|_| mismatch())
        }
        FieldType::OffsetDateTime => {
            let parsed = match pattern {
                Some(pattern) => chrono::DateTime::parse_from_str(value, pattern),
                None => chrono::DateTime::parse_from_rfc3339(value),
            };
            parsed.map(BindValue::TimestampTz).map_err(|_| mismatch())
        }
        FieldType::Integer => value
            .parse::<i32>()
            .map(BindValue::Integer)
            .map_err(|_| mismatch()),
        FieldType::Long => value
            .parse::<i64>()
            .map(BindValue::BigInt)
            .map_err(|_| mismatch()),
        FieldType::Decimal => rust_decimal::Decimal::from_str(value)
            .map(BindValue::Decimal)
            .map_err(|_| mismatch()),
        FieldType::Boolean => {
            if value.eq_ignore_ascii_case("true") {
                Ok(BindValue::Boolean(true))
            } else if value.eq_ignore_ascii_case("false") {
                Ok(BindValue::Boolean(false))
            } else {
                Err(mismatch())
            }
        }
    }
}

/// Reject operators the field's type cannot support.
pub fn check_operator(
    field: &QueryField,
    parameter: &str,
    comparison: ComparisonType,
) -> Result<(), Error> {
    let reason = match &field.field_type {
        FieldType::Enum(_) if !comparison.is_equality() => {
            Some("enum values can only be compared with EQ or NEQ")
        }
        FieldType::Uuid if comparison != ComparisonType::Eq => {
            Some("UUIDs can only be compared with EQ")
        }
        field_type if comparison == ComparisonType::Substr && !field_type.is_textual() => {
            Some("pattern matching needs a text field, use ISUBSTR instead")
        }
        _ => None,
    };
    match reason {
        Some(reason) => Err(Error::UnsupportedOperatorForType {
            parameter: parameter.to_string(),
            operator: comparison,
            reason,
        }),
        None => Ok(()),
    }
}

fn expected(field: &QueryField) -> String {
    match (&field.field_type, &field.date_pattern) {
        (FieldType::Enum(domain), _) => format!("enum (one of {})", domain.join(", ")),
        (FieldType::Date | FieldType::DateTime | FieldType::OffsetDateTime, Some(pattern)) => {
            format!("{} (formatted as {pattern})", field.field_type.name())
        }
        (field_type, _) => field_type.name().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use query_engine_metadata::metadata::ColumnRef;
    use similar_asserts::assert_eq;

    fn field(field_type: FieldType, date_pattern: Option<&str>) -> QueryField {
        QueryField {
            json_name: "value".to_string(),
            column: ColumnRef::new("t", "value"),
            select_name: "value".to_string(),
            field_type,
            kind: Default::default(),
            date_pattern: date_pattern.map(ToString::to_string),
            condition_generator: Default::default(),
            restriction: None,
        }
    }

    fn eq(field: &QueryField, value: &str) -> Result<BindValue, Error> {
        translate_value(field, "value", ComparisonType::Eq, value)
    }

    #[test]
    fn numbers() {
        assert_eq!(eq(&field(FieldType::Integer, None), "42"), Ok(BindValue::Integer(42)));
        assert_eq!(
            eq(&field(FieldType::Long, None), "8589934592"),
            Ok(BindValue::BigInt(8_589_934_592))
        );
        assert_eq!(
            eq(&field(FieldType::Decimal, None), "12.50"),
            Ok(BindValue::Decimal(rust_decimal::Decimal::new(1250, 2)))
        );
        assert_eq!(
            eq(&field(FieldType::Integer, None), "8589934592"),
            Err(Error::TypeCoercionFailure {
                parameter: "value".to_string(),
                value: "8589934592".to_string(),
                expected: "integer".to_string()
            })
        );
    }

    #[test]
    fn dates_use_the_field_pattern() {
        let default = field(FieldType::Date, None);
        assert_eq!(
            eq(&default, "2024-02-29"),
            Ok(BindValue::Date(chrono::NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()))
        );

        let german = field(FieldType::Date, Some("%d.%m.%Y"));
        assert_eq!(
            eq(&german, "29.02.2024"),
            Ok(BindValue::Date(chrono::NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()))
        );
        let error = eq(&german, "2024-02-29").unwrap_err();
        assert_eq!(
            error.to_string(),
            "'2024-02-29' is not a valid date (formatted as %d.%m.%Y) value for 'value'"
        );
    }

    #[test]
    fn offset_date_times_default_to_rfc3339() {
        let value = eq(
            &field(FieldType::OffsetDateTime, None),
            "2024-01-02T03:04:05+01:00",
        )
        .unwrap();
        assert_eq!(value.to_string(), "2024-01-02T03:04:05+01:00");
    }

    #[test]
    fn enums_only_take_their_domain() {
        let status = field(
            FieldType::Enum(vec!["OPEN".to_string(), "CLOSED".to_string()]),
            None,
        );
        assert_eq!(eq(&status, "OPEN"), Ok(BindValue::Text("OPEN".to_string())));
        assert!(eq(&status, "open").is_err());
    }

    #[test]
    fn booleans_ignore_case() {
        let flag = field(FieldType::Boolean, None);
        assert_eq!(eq(&flag, "TRUE"), Ok(BindValue::Boolean(true)));
        assert_eq!(eq(&flag, "false"), Ok(BindValue::Boolean(false)));
        assert!(eq(&flag, "yes").is_err());
    }

    #[test]
    fn operators_per_type() {
        let uuid = field(FieldType::Uuid, None);
        assert!(check_operator(&uuid, "value", ComparisonType::Eq).is_ok());
        assert!(check_operator(&uuid, "value", ComparisonType::Neq).is_err());

        let status = field(FieldType::Enum(vec!["OPEN".to_string()]), None);
        assert!(check_operator(&status, "value", ComparisonType::Gt).is_err());
        assert!(check_operator(&status, "value", ComparisonType::Ieq).is_err());
        assert!(check_operator(&status, "value", ComparisonType::Neq).is_ok());

        let amount = field(FieldType::Decimal, None);
        assert!(check_operator(&amount, "value", ComparisonType::Gte).is_ok());
        assert!(check_operator(&amount, "value", ComparisonType::Substr).is_err());
        assert!(check_operator(&amount, "value", ComparisonType::Isubstr).is_ok());
    }
}
