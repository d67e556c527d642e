//! The comparison operators a filter can use, and the SQL conditions they produce.

use std::fmt;

use enum_iterator::Sequence;
use nonempty::NonEmpty;

use query_engine_metadata::metadata::QueryField;
use query_engine_sql::sql;

/// A filter operator, named by the attribute of a request parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Sequence)]
pub enum ComparisonType {
    Gt,
    Gte,
    Eq,
    Lte,
    Lt,
    Neq,
    /// Pattern match with the client's value used as the pattern.
    Substr,
    /// Case-insensitive equality.
    Ieq,
    /// Case-insensitive containment.
    Isubstr,
}

impl ComparisonType {
    /// The attribute that selects this operator.
    pub fn name(self) -> &'static str {
        match self {
            ComparisonType::Gt => "GT",
            ComparisonType::Gte => "GTE",
            ComparisonType::Eq => "EQ",
            ComparisonType::Lte => "LTE",
            ComparisonType::Lt => "LT",
            ComparisonType::Neq => "NEQ",
            ComparisonType::Substr => "SUBSTR",
            ComparisonType::Ieq => "IEQ",
            ComparisonType::Isubstr => "ISUBSTR",
        }
    }

    /// Look an operator up by attribute, ignoring case.
    pub fn from_attribute(attribute: &str) -> Option<ComparisonType> {
        enum_iterator::all::<ComparisonType>()
            .find(|comparison| comparison.name().eq_ignore_ascii_case(attribute))
    }

    /// Whether the operator only makes sense for ordered types.
    pub fn requires_ordering(self) -> bool {
        matches!(
            self,
            ComparisonType::Gt | ComparisonType::Gte | ComparisonType::Lte | ComparisonType::Lt
        )
    }

    /// Whether both sides are compared as text.
    pub fn converts_to_string(self) -> bool {
        matches!(self, ComparisonType::Ieq | ComparisonType::Isubstr)
    }

    pub fn is_equality(self) -> bool {
        matches!(self, ComparisonType::Eq | ComparisonType::Neq)
    }

    /// The left hand side of a condition on `field`.
    ///
    /// Operators comparing text cast non-textual columns to `VARCHAR`.
    pub fn field_expression(self, field: &QueryField) -> sql::ast::Expression {
        let column = sql::helpers::make_column_reference(
            sql::helpers::make_table_alias(&field.column.alias),
            &field.column.column,
        );
        if self.converts_to_string() && !field.field_type.is_textual() {
            sql::ast::Expression::Cast {
                expression: Box::new(column),
                r#type: sql::ast::ScalarType("VARCHAR".to_string()),
            }
        } else {
            column
        }
    }

    /// `field <op> value`.
    pub fn single_value(
        self,
        field: sql::ast::Expression,
        value: sql::ast::Expression,
    ) -> sql::ast::Expression {
        let operator = match self {
            ComparisonType::Gt => sql::ast::BinaryOperator::GreaterThan,
            ComparisonType::Gte => sql::ast::BinaryOperator::GreaterThanOrEqualTo,
            ComparisonType::Eq => sql::ast::BinaryOperator::Equals,
            ComparisonType::Lte => sql::ast::BinaryOperator::LessThanOrEqualTo,
            ComparisonType::Lt => sql::ast::BinaryOperator::LessThan,
            ComparisonType::Neq => sql::ast::BinaryOperator::NotEquals,
            ComparisonType::Substr => sql::ast::BinaryOperator::Like,
            ComparisonType::Ieq => {
                return binary(
                    upper(field),
                    sql::ast::BinaryOperator::Equals,
                    upper(value),
                )
            }
            ComparisonType::Isubstr => {
                return binary(
                    field,
                    sql::ast::BinaryOperator::CaseInsensitiveLike,
                    sql::ast::Expression::FunctionCall {
                        function: sql::ast::Function::Concat,
                        args: vec![wildcard(), value, wildcard()],
                    },
                )
            }
        };
        binary(field, operator, value)
    }

    /// A condition matching any of `values`.
    ///
    /// EQ and NEQ become `IN` and `NOT IN`. The other operators are applied to every
    /// value and the results joined with `AND`.
    pub fn multi_value(
        self,
        field: sql::ast::Expression,
        values: NonEmpty<sql::ast::Expression>,
    ) -> sql::ast::Expression {
        if values.tail.is_empty() {
            return self.single_value(field, values.head);
        }
        match self {
            ComparisonType::Eq => sql::ast::Expression::BinaryArrayOperation {
                left: Box::new(field),
                operator: sql::ast::BinaryArrayOperator::In,
                right: values.into(),
            },
            ComparisonType::Neq => sql::ast::Expression::BinaryArrayOperation {
                left: Box::new(field),
                operator: sql::ast::BinaryArrayOperator::NotIn,
                right: values.into(),
            },
            _ => sql::helpers::conjunction(
                values
                    .into_iter()
                    .map(|value| self.single_value(field.clone(), value)),
            ),
        }
    }

    /// `IS NULL` for EQ, `IS NOT NULL` for NEQ. No other operator accepts NULL.
    pub fn null_check(self, field: sql::ast::Expression) -> Option<sql::ast::Expression> {
        let operator = match self {
            ComparisonType::Eq => sql::ast::UnaryOperator::IsNull,
            ComparisonType::Neq => sql::ast::UnaryOperator::IsNotNull,
            _ => return None,
        };
        Some(sql::ast::Expression::UnaryOperation {
            expression: Box::new(field),
            operator,
        })
    }
}

impl fmt::Display for ComparisonType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

fn binary(
    left: sql::ast::Expression,
    operator: sql::ast::BinaryOperator,
    right: sql::ast::Expression,
) -> sql::ast::Expression {
    sql::ast::Expression::BinaryOperation {
        left: Box::new(left),
        operator,
        right: Box::new(right),
    }
}

fn upper(expression: sql::ast::Expression) -> sql::ast::Expression {
    sql::ast::Expression::FunctionCall {
        function: sql::ast::Function::Upper,
        args: vec![expression],
    }
}

fn wildcard() -> sql::ast::Expression {
    sql::ast::Expression::Value(sql::ast::Value::String("%".to_string()))
}
