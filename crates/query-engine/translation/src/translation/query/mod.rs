//! Assemble the COUNT and row queries of a parsed request.

pub mod filtering;
pub mod sorting;
pub mod values;

use std::collections::BTreeSet;

use query_engine_metadata::metadata::{ColumnRef, EntitySchema, JoinDescriptor, JoinKind};
use query_engine_sql::sql;
use query_engine_sql::sql::execution_plan::{ExecutionPlan, PageWindow};

use crate::translation::error::Error;
use crate::translation::request::ParsedRequest;

/// Translate a parsed request into an execution plan.
pub fn translate(schema: &EntitySchema, request: &ParsedRequest) -> Result<ExecutionPlan, Error> {
    let _span = tracing::info_span!("Assemble query", entity = schema.name()).entered();

    let aliases = referenced_aliases(schema, request);
    let joins: Vec<sql::ast::Join> = schema
        .joins()
        .joins_for(aliases.iter().copied())?
        .into_iter()
        .map(translate_join)
        .collect();

    let from = sql::ast::From::Table {
        reference: sql::helpers::make_table_reference(
            schema.table().schema.as_deref(),
            &schema.table().name,
        ),
        alias: sql::helpers::make_table_alias(schema.primary_alias()),
    };
    let where_ = sql::ast::Where(sql::helpers::conjunction(
        request.filters.iter().map(|filter| filter.expression.clone()),
    ));

    let select_list = schema
        .selectable_fields()
        .map(|field| {
            (
                sql::helpers::make_column_alias(field.select_name.clone()),
                column_expression(&field.column),
            )
        })
        .collect();

    let mut rows = sql::helpers::simple_select(select_list);
    rows.distinct = schema.is_distinct();
    rows.from = Some(from.clone());
    rows.joins.clone_from(&joins);
    rows.where_ = where_.clone();

    let count = if schema.is_distinct() {
        // COUNT(*) over the joined rows would count duplicates.
        let rows_alias = sql::helpers::make_table_alias("rows");
        sql::helpers::count_select(
            sql::ast::From::Select {
                select: Box::new(rows.clone()),
                alias: rows_alias,
            },
            vec![],
            sql::ast::Where(sql::helpers::true_expr()),
        )
    } else {
        sql::helpers::count_select(from, joins, where_)
    };

    rows.order_by = sorting::translate_order_by(&request.sort);
    rows.limit = sql::ast::Limit {
        limit: request.limit,
        offset: (request.offset > 0).then_some(request.offset),
    };

    tracing::debug!(
        joins = rows.joins.len(),
        bindings = request.bindings.len(),
        "assembled query"
    );

    Ok(ExecutionPlan {
        count,
        rows,
        bindings: request.bindings.clone(),
        window: PageWindow {
            limit: request.limit,
            offset: request.offset,
        },
    })
}

/// The aliases of the selected fields and of the fields the request filters or sorts on.
fn referenced_aliases<'s>(schema: &'s EntitySchema, request: &ParsedRequest) -> BTreeSet<&'s str> {
    schema
        .selectable_fields()
        .chain(
            request
                .referenced_fields
                .iter()
                .filter_map(|name| schema.field(name)),
        )
        .map(|field| field.column.alias.as_str())
        .collect()
}

fn translate_join(join: &JoinDescriptor) -> sql::ast::Join {
    let reference = sql::helpers::make_table_reference(join.table.schema.as_deref(), &join.table.name);
    let alias = sql::helpers::make_table_alias(&join.alias);
    let on = sql::helpers::conjunction(join.on.iter().map(|equality| {
        sql::ast::Expression::BinaryOperation {
            left: Box::new(column_expression(&equality.left)),
            operator: sql::ast::BinaryOperator::Equals,
            right: Box::new(column_expression(&equality.right)),
        }
    }));

    match join.kind {
        JoinKind::Inner => sql::ast::Join::InnerJoin(sql::ast::InnerJoin {
            reference,
            alias,
            on,
        }),
        JoinKind::Left => sql::ast::Join::LeftOuterJoin(sql::ast::LeftOuterJoin {
            reference,
            alias,
            on,
        }),
    }
}

fn column_expression(column: &ColumnRef) -> sql::ast::Expression {
    sql::helpers::make_column_reference(
        sql::helpers::make_table_alias(&column.alias),
        &column.column,
    )
}
