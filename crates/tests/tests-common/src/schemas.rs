//! Entity schemas used across tests.

use query_engine_metadata::metadata::{
    ColumnRef, ConditionGenerator, EntitySchema, EntitySchemaBuilder, FieldDefinition, FieldType,
    JoinDescriptor, QueryFieldKind, QueryFieldRestriction,
};

/// `Order { id, orderline, customerId }`, where `customerId` is the id of the
/// customer joined through `order.customer_id`.
pub fn order_schema() -> EntitySchema {
    order_schema_builder()
        .build()
        .expect("the order schema is valid")
}

/// [`order_schema`] before it is built.
pub fn order_schema_builder() -> EntitySchemaBuilder {
    EntitySchema::builder("Order", "order")
        .join(JoinDescriptor::inner(
            "customer",
            "customer",
            ColumnRef::new("order", "customer_id"),
            ColumnRef::new("customer", "id"),
        ))
        .field(FieldDefinition::new("id", "id", FieldType::Long))
        .field(FieldDefinition::new("orderline", "orderline", FieldType::String))
        .field(FieldDefinition::new("customerId", "id", FieldType::Long).on_alias("customer"))
}

/// Orders with typed fields, a computed field on a left join and server side
/// restrictions.
///
/// ```text
/// order -> customer -> region (left)
/// ```
pub fn shop_schema() -> EntitySchema {
    shop_schema_builder()
        .build()
        .expect("the shop schema is valid")
}

/// [`shop_schema`] before it is built.
pub fn shop_schema_builder() -> EntitySchemaBuilder {
    EntitySchema::builder("Order", "order")
        .primary_alias("o")
        .join(JoinDescriptor::inner(
            "customer",
            "c",
            ColumnRef::new("o", "customer_id"),
            ColumnRef::new("c", "id"),
        ))
        .join(JoinDescriptor::left(
            "region",
            "r",
            ColumnRef::new("c", "region_id"),
            ColumnRef::new("r", "id"),
        ))
        .field(FieldDefinition::new("id", "id", FieldType::Long))
        .field(
            FieldDefinition::new(
                "status",
                "status",
                FieldType::Enum(vec![
                    "OPEN".to_string(),
                    "SHIPPED".to_string(),
                    "CANCELLED".to_string(),
                ]),
            )
            .restriction(QueryFieldRestriction::enum_subset(&["OPEN", "SHIPPED"])),
        )
        .field(FieldDefinition::new("amount", "amount", FieldType::Decimal))
        .field(FieldDefinition::new("created", "created_on", FieldType::Date).date_pattern("%d.%m.%Y"))
        .field(FieldDefinition::new("reference", "reference", FieldType::Uuid))
        .field(
            FieldDefinition::new("lines", "line_id", FieldType::Integer)
                .condition_generator(ConditionGenerator::CommaSeparatedList),
        )
        .field(FieldDefinition::new("customerName", "name", FieldType::String).on_alias("c"))
        .field(
            FieldDefinition::new("region", "code", FieldType::String)
                .on_alias("r")
                .kind(QueryFieldKind::Computed),
        )
        .field(
            FieldDefinition::new("tenant", "tenant", FieldType::String)
                .kind(QueryFieldKind::Computed)
                .restriction(QueryFieldRestriction::ensure_set_to(&["acme"])),
        )
        .field(
            FieldDefinition::new("notes", "notes", FieldType::String)
                .kind(QueryFieldKind::JsonIgnored),
        )
}

/// Joins shaped like a tree, with one computed field per join.
///
/// ```text
/// a <- b <- c
/// a <- d <- e
///      d <- f
/// ```
pub fn deep_schema() -> EntitySchema {
    let mut builder = EntitySchema::builder("Deep", "a")
        .field(FieldDefinition::new("id", "id", FieldType::Long));
    for (alias, dependency) in DEEP_JOINS {
        builder = builder
            .join(JoinDescriptor::inner(
                alias,
                alias,
                ColumnRef::new(dependency, "id"),
                ColumnRef::new(alias, "parent_id"),
            ))
            .field(
                FieldDefinition::new(alias, "value", FieldType::String)
                    .on_alias(alias)
                    .kind(QueryFieldKind::Computed),
            );
    }
    builder.build().expect("the deep schema is valid")
}

/// `(alias, dependency)` of the joins of [`deep_schema`], in declaration order.
pub const DEEP_JOINS: [(&str, &str); 5] = [("b", "a"), ("c", "b"), ("d", "a"), ("e", "d"), ("f", "d")];
