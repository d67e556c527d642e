//! Helpers for building sql::ast types in certain shapes and patterns.

use super::ast::*;

// Empty clauses //

/// An empty `WHERE` clause.
pub fn empty_where() -> Expression {
    Expression::Value(Value::Bool(true))
}

/// An empty `ORDER BY` clause.
pub fn empty_order_by() -> OrderBy {
    OrderBy { elements: vec![] }
}

/// Empty `LIMIT` and `OFFSET` clauses.
pub fn empty_limit() -> Limit {
    Limit {
        limit: None,
        offset: None,
    }
}

/// A `true` expression.
pub fn true_expr() -> Expression {
    Expression::Value(Value::Bool(true))
}

/// AND together a list of expressions. An empty list is `true`.
pub fn conjunction(expressions: impl IntoIterator<Item = Expression>) -> Expression {
    expressions
        .into_iter()
        .reduce(|left, right| Expression::And {
            left: Box::new(left),
            right: Box::new(right),
        })
        .unwrap_or_else(true_expr)
}

// Aliasing //

/// A reference to `alias.column`.
pub fn make_column_reference(alias: TableAlias, column: &str) -> Expression {
    Expression::ColumnReference(ColumnReference::TableColumn {
        table: TableReference::AliasedTable(alias),
        name: ColumnName(column.to_string()),
    })
}

/// Create column aliases using this function so we build everything in one place.
pub fn make_column_alias(name: String) -> ColumnAlias {
    ColumnAlias { name }
}

/// Create table aliases using this function so we build everything in one place.
pub fn make_table_alias(name: &str) -> TableAlias {
    TableAlias {
        name: name.to_string(),
    }
}

/// A reference to a database table, optionally qualified by a schema.
pub fn make_table_reference(schema: Option<&str>, table: &str) -> TableReference {
    TableReference::DBTable {
        schema: schema.map(|schema| SchemaName(schema.to_string())),
        table: TableName(table.to_string()),
    }
}

// SELECTs //

/// Build a simple select with a select list and the rest are empty.
pub fn simple_select(select_list: Vec<(ColumnAlias, Expression)>) -> Select {
    Select {
        distinct: false,
        select_list: SelectList::SelectList(select_list),
        from: None,
        joins: vec![],
        where_: Where(empty_where()),
        order_by: empty_order_by(),
        limit: empty_limit(),
    }
}

/// `SELECT COUNT(*) AS "count"` over the given FROM, JOINs and WHERE.
pub fn count_select(from: From, joins: Vec<Join>, where_: Where) -> Select {
    let mut select = simple_select(vec![(
        make_column_alias("count".to_string()),
        Expression::Count(CountType::Star),
    )]);
    select.from = Some(from);
    select.joins = joins;
    select.where_ = where_;
    select
}

/// Wrap a row select so every row comes back as a single json object:
///
/// ```sql
/// SELECT row_to_json("rows") AS "row" FROM (<select>) AS "rows"
/// ```
pub fn select_rows_as_json(row_select: Select) -> Select {
    let rows_alias = make_table_alias("rows");
    let mut select = simple_select(vec![(
        make_column_alias("row".to_string()),
        Expression::RowToJson(TableReference::AliasedTable(rows_alias.clone())),
    )]);
    select.from = Some(From::Select {
        select: Box::new(row_select),
        alias: rows_alias,
    });
    select
}
