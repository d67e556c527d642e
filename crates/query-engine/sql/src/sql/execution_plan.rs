//! Describe the queries needed to serve one page, and the values bound into them.

use std::fmt;

use indexmap::IndexMap;
use thiserror::Error;

use super::ast::Select;
use super::helpers;
use super::string::{Dialect, Param, SQL};

/// A typed value bound to a placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    Text(String),
    Boolean(bool),
    Integer(i32),
    BigInt(i64),
    Decimal(rust_decimal::Decimal),
    Uuid(uuid::Uuid),
    Date(chrono::NaiveDate),
    Timestamp(chrono::NaiveDateTime),
    TimestampTz(chrono::DateTime<chrono::FixedOffset>),
}

impl fmt::Display for BindValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindValue::Text(value) => write!(f, "'{value}'"),
            BindValue::Boolean(value) => write!(f, "{value}"),
            BindValue::Integer(value) => write!(f, "{value}"),
            BindValue::BigInt(value) => write!(f, "{value}"),
            BindValue::Decimal(value) => write!(f, "{value}"),
            BindValue::Uuid(value) => write!(f, "{value}"),
            BindValue::Date(value) => write!(f, "{value}"),
            BindValue::Timestamp(value) => write!(f, "{value}"),
            BindValue::TimestampTz(value) => write!(f, "{}", value.to_rfc3339()),
        }
    }
}

/// Values bound by name for a single request.
///
/// Names are derived from a hint (usually the field's JSON name) and made unique by
/// appending `_1`, `_2`, ... when the hint is already taken.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    values: IndexMap<String, BindValue>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a value and return the name it was bound under.
    pub fn bind(&mut self, hint: &str, value: BindValue) -> String {
        let base = placeholder_name(hint);
        let mut name = base.clone();
        let mut counter = 0;
        while self.values.contains_key(&name) {
            counter += 1;
            name = format!("{base}_{counter}");
        }
        self.values.insert(name.clone(), value);
        name
    }

    pub fn get(&self, name: &str) -> Option<&BindValue> {
        self.values.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &BindValue)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Placeholder names are restricted to ASCII alphanumerics and `_`, starting with a letter.
fn placeholder_name(hint: &str) -> String {
    let mut name: String = hint
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
        name.insert(0, 'p');
    }
    name
}

/// A placeholder had no value in the bindings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parameter '{0}' has no bound value")]
pub struct UnboundParameter(pub String);

/// The row window of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// `None` means every row from the offset on.
    pub limit: Option<u64>,
    pub offset: u64,
}

/// Definition of an execution plan to be run against the database.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionPlan {
    /// `SELECT COUNT(*)` over the same FROM/JOIN/WHERE as `rows`.
    pub count: Select,
    pub rows: Select,
    pub bindings: Bindings,
    pub window: PageWindow,
}

/// Rendered SQL with its parameters in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedStatement {
    pub sql: String,
    pub params: Vec<(String, BindValue)>,
}

impl ExecutionPlan {
    pub fn count_statement(&self, dialect: Dialect) -> Result<PreparedStatement, UnboundParameter> {
        prepare(&self.count, dialect, &self.bindings)
    }

    pub fn rows_statement(&self, dialect: Dialect) -> Result<PreparedStatement, UnboundParameter> {
        prepare(&self.rows, dialect, &self.bindings)
    }

    /// The row query with every row wrapped as a json object. Postgres only.
    pub fn json_rows_statement(&self) -> Result<PreparedStatement, UnboundParameter> {
        prepare(
            &helpers::select_rows_as_json(self.rows.clone()),
            Dialect::Postgres,
            &self.bindings,
        )
    }
}

/// Render a select and resolve its parameters against the bindings.
pub fn prepare(
    select: &Select,
    dialect: Dialect,
    bindings: &Bindings,
) -> Result<PreparedStatement, UnboundParameter> {
    let mut sql = SQL::new(dialect);
    select.to_sql(&mut sql);

    let params = sql
        .params
        .into_iter()
        .zip(1..)
        .map(|(param, index)| {
            let name = param.name(index);
            match param {
                Param::String(value) => Ok((name, BindValue::Text(value))),
                Param::Variable(variable) => bindings
                    .get(&variable)
                    .cloned()
                    .map(|value| (name, value))
                    .ok_or(UnboundParameter(variable)),
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(PreparedStatement {
        sql: sql.sql,
        params,
    })
}
