//! Type definitions of a low-level SQL string representation.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The SQL flavour a statement is rendered for.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, JsonSchema,
)]
#[serde(rename_all = "camelCase")]
pub enum Dialect {
    /// `$n` placeholders, double-quoted identifiers, native `ILIKE`.
    #[default]
    Postgres,
    /// `?` placeholders, backtick-quoted identifiers.
    MySql,
    /// `?` placeholders, double-quoted identifiers.
    Sqlite,
    /// `:name` placeholders, double-quoted identifiers.
    Generic,
}

impl Dialect {
    fn identifier_quote(self) -> char {
        match self {
            Dialect::MySql => '`',
            Dialect::Postgres | Dialect::Sqlite | Dialect::Generic => '"',
        }
    }

    /// Whether `ILIKE` can be emitted as is.
    pub fn supports_ilike(self) -> bool {
        matches!(self, Dialect::Postgres)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct SQL {
    pub sql: String,
    pub params: Vec<Param>,
    /// for internal use and tests only
    pub param_index: u64,
    pub dialect: Dialect,
}

impl Default for SQL {
    fn default() -> Self {
        Self::new(Dialect::default())
    }
}

/// A parameter for a parameterized query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
    /// A literal string
    String(String),
    /// A binding name to look up in the execution plan.
    Variable(String),
}

impl Param {
    /// The name the parameter is known by in `Generic` dialect placeholders.
    pub fn name(&self, index: u64) -> String {
        match self {
            Param::String(_) => format!("_lit{index}"),
            Param::Variable(name) => name.clone(),
        }
    }
}

impl SQL {
    pub fn new(dialect: Dialect) -> SQL {
        SQL {
            sql: String::new(),
            params: vec![],
            param_index: 0,
            dialect,
        }
    }

    pub fn append_syntax(&mut self, sql: &str) {
        self.sql.push_str(sql);
    }

    /// Append a quoted identifier. Embedded quote characters are doubled.
    pub fn append_identifier(&mut self, identifier: &str) {
        let quote = self.dialect.identifier_quote();
        self.sql.push(quote);
        for c in identifier.chars() {
            if c == quote {
                self.sql.push(quote);
            }
            self.sql.push(c);
        }
        self.sql.push(quote);
    }

    pub fn append_param(&mut self, param: Param) {
        self.param_index += 1;
        match self.dialect {
            Dialect::Postgres => self.sql.push_str(&format!("${}", self.param_index)),
            Dialect::MySql | Dialect::Sqlite => self.sql.push('?'),
            Dialect::Generic => {
                self.sql.push(':');
                self.sql.push_str(&param.name(self.param_index));
            }
        }
        self.params.push(param);
    }
}
