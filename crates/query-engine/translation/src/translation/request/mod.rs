//! Read the parameters of a request into filters, a sort order and a page window.

pub mod parse_state;

use std::collections::HashSet;

use indexmap::{IndexMap, IndexSet};

use query_engine_metadata::metadata::EntitySchema;
use query_engine_sql::sql::execution_plan::Bindings;
use restql_configuration::RequestSettings;

use super::comparison::ComparisonType;
use super::cursor::CursorCodec;
use super::error::Error;
use super::parameters::{split_key, split_value, QueryParameters};
use super::query::filtering::{translate_filter, FilterCondition, ValueOrigin};
use super::query::sorting::{parse_sort, SortField};
use parse_state::ParseState;

/// Everything a request asks for, ready to be turned into SQL.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRequest {
    pub filters: Vec<FilterCondition>,
    pub sort: Vec<SortField>,
    /// The page size. `None` is unbounded.
    pub limit: Option<u64>,
    pub offset: u64,
    pub bindings: Bindings,
    /// JSON names of the fields filtered or sorted on, defaults included.
    pub referenced_fields: IndexSet<String>,
    /// The parameters of the query as the client sent them, without cursors and offsets.
    pub parameters: QueryParameters,
    /// Whether the parameters were read out of a cursor.
    pub from_cursor: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParameterKind {
    Sort,
    PageSize,
    Cursor,
    Offset,
    Filter,
}

/// The occurrences of one parameter name with one operator.
#[derive(Debug)]
struct ParameterGroup<'p> {
    kind: ParameterKind,
    key: &'p str,
    name: &'p str,
    attribute: Option<&'p str>,
    /// Values without an operator prefix.
    values: Vec<&'p str>,
    /// Key and value pairs exactly as given.
    raw: Vec<(&'p str, &'p str)>,
}

/// Reads the parameters of a single request. Consumed by `parse`.
#[derive(Debug)]
pub struct ParameterParser<'a> {
    schema: &'a EntitySchema,
    settings: &'a RequestSettings,
    codec: &'a CursorCodec,
    state: ParseState,
    filters: Vec<FilterCondition>,
    sort: Vec<SortField>,
    limit: Option<Option<u64>>,
    offset: u64,
    bindings: Bindings,
    referenced_fields: IndexSet<String>,
    filtered_fields: HashSet<String>,
    parameters: QueryParameters,
    from_cursor: bool,
}

impl<'a> ParameterParser<'a> {
    pub fn new(
        schema: &'a EntitySchema,
        settings: &'a RequestSettings,
        codec: &'a CursorCodec,
    ) -> Self {
        ParameterParser {
            schema,
            settings,
            codec,
            state: ParseState::Initial,
            filters: vec![],
            sort: vec![],
            limit: None,
            offset: 0,
            bindings: Bindings::new(),
            referenced_fields: IndexSet::new(),
            filtered_fields: HashSet::new(),
            parameters: QueryParameters::new(),
            from_cursor: false,
        }
    }

    /// Read the request parameters, then the defaults of the fields left unfiltered.
    pub fn parse(mut self, parameters: &QueryParameters) -> Result<ParsedRequest, Error> {
        let groups = self.group(parameters);
        self.plan(&groups, false)?;
        for group in &groups {
            self.apply(group, false)?;
        }
        self.state = self.state.finish_round()?;

        self.state = self.state.start_defaults()?;
        self.apply_defaults()?;
        self.state = self.state.finish_round()?;
        self.state = self.state.end()?;

        let limit = match self.limit {
            Some(limit) => limit,
            None => self
                .settings
                .pagination
                .effective_default_page_size()
                .map(u64::from),
        };

        tracing::debug!(
            entity = self.schema.name(),
            filters = self.filters.len(),
            sort = self.sort.len(),
            limit,
            offset = self.offset,
            from_cursor = self.from_cursor,
            "parsed request parameters"
        );

        Ok(ParsedRequest {
            filters: self.filters,
            sort: self.sort,
            limit,
            offset: self.offset,
            bindings: self.bindings,
            referenced_fields: self.referenced_fields,
            parameters: self.parameters,
            from_cursor: self.from_cursor,
        })
    }

    fn kind(&self, name: &str) -> ParameterKind {
        let pagination = &self.settings.pagination;
        if name == self.settings.sort.parameter_name {
            ParameterKind::Sort
        } else if name == pagination.page_size_name {
            ParameterKind::PageSize
        } else if name == pagination.cursor_name {
            ParameterKind::Cursor
        } else if name == pagination.index_cursor_name {
            ParameterKind::Offset
        } else {
            ParameterKind::Filter
        }
    }

    /// Group the occurrences by name and operator, in order of first appearance.
    /// Reserved parameters are dropped.
    fn group<'p>(&self, parameters: &'p QueryParameters) -> Vec<ParameterGroup<'p>> {
        let search = &self.settings.search;
        let mut groups: IndexMap<(&'p str, Option<&'p str>), ParameterGroup<'p>> = IndexMap::new();

        for (key, values) in parameters.iter() {
            let key = key.as_str();
            let (name, key_attribute) = split_key(search, key);
            if self.settings.is_reserved(key) || self.settings.is_reserved(name) {
                continue;
            }
            let kind = self.kind(name);
            for raw_value in values {
                let (attribute, value) = match (kind, key_attribute) {
                    (ParameterKind::Filter, None) => split_value(search, raw_value),
                    _ => (key_attribute, raw_value.as_str()),
                };
                let group = groups
                    .entry((name, attribute))
                    .or_insert_with(|| ParameterGroup {
                        kind,
                        key,
                        name,
                        attribute,
                        values: vec![],
                        raw: vec![],
                    });
                group.values.push(value);
                group.raw.push((key, raw_value.as_str()));
            }
        }

        groups.into_values().collect()
    }

    /// Move the state on for every group before any value is read.
    fn plan(&mut self, groups: &[ParameterGroup], from_cursor: bool) -> Result<(), Error> {
        let settings = self.settings;
        let cursor = settings.pagination.cursor_name.as_str();
        let mut previous = None;
        for group in groups {
            match group.kind {
                ParameterKind::Cursor if from_cursor => {
                    return Err(Error::InvalidCursor {
                        parameter: cursor.to_string(),
                        reason: "a cursor cannot contain another cursor".to_string(),
                    })
                }
                ParameterKind::Cursor => {
                    self.state = self.state.parsing_cursor(group.key, previous)?;
                }
                ParameterKind::Offset if from_cursor => {}
                ParameterKind::Offset => {
                    return Err(Error::UnknownParameter {
                        parameter: group.key.to_string(),
                    })
                }
                ParameterKind::Sort | ParameterKind::PageSize | ParameterKind::Filter => {
                    self.state = self.state.parsed_argument(group.key, cursor, from_cursor)?;
                    previous.get_or_insert(group.key);
                }
            }
        }
        Ok(())
    }

    fn apply(&mut self, group: &ParameterGroup, from_cursor: bool) -> Result<(), Error> {
        if group.kind != ParameterKind::Filter && group.attribute.is_some() {
            return Err(Error::AttributeNotAllowed {
                parameter: group.key.to_string(),
            });
        }

        match group.kind {
            ParameterKind::Sort => {
                let value = single_value(group)?;
                self.sort = parse_sort(self.schema, &self.settings.sort, group.key, value)?;
                for sort_field in &self.sort {
                    self.referenced_fields.insert(sort_field.field.clone());
                }
                self.record(group);
            }
            ParameterKind::PageSize => {
                let value = single_value(group)?;
                self.limit = Some(self.page_size(group.key, value)?);
                self.record(group);
            }
            ParameterKind::Cursor => {
                let token = single_value(group)?;
                self.read_cursor(token)?;
            }
            ParameterKind::Offset => {
                let value = single_value(group)?;
                self.offset = value.parse().map_err(|_| Error::InvalidCursor {
                    parameter: self.settings.pagination.cursor_name.clone(),
                    reason: "the cursor holds an invalid offset".to_string(),
                })?;
            }
            ParameterKind::Filter => {
                self.apply_filter(group)?;
                self.record(group);
            }
        }

        if from_cursor {
            self.from_cursor = true;
        }
        Ok(())
    }

    fn apply_filter(&mut self, group: &ParameterGroup) -> Result<(), Error> {
        let field = self
            .schema
            .field(group.name)
            .ok_or_else(|| Error::UnknownParameter {
                parameter: group.key.to_string(),
            })?;
        let comparison = match group.attribute {
            None => ComparisonType::Eq,
            Some(attribute) => {
                ComparisonType::from_attribute(attribute).ok_or_else(|| Error::UnknownOperator {
                    parameter: group.name.to_string(),
                    attribute: attribute.to_string(),
                })?
            }
        };
        let values: Vec<String> = group.values.iter().map(ToString::to_string).collect();

        let condition = translate_filter(
            field,
            group.key,
            comparison,
            &values,
            ValueOrigin::Request,
            &self.settings.search.enum_split,
            &mut self.bindings,
        )?;

        self.referenced_fields.insert(field.json_name.clone());
        self.filtered_fields.insert(field.json_name.clone());
        self.filters.push(condition);
        Ok(())
    }

    fn read_cursor(&mut self, token: &str) -> Result<(), Error> {
        let contents = self.codec.decode(token)?;
        let groups = self.group(&contents);
        self.plan(&groups, true)?;
        for group in &groups {
            self.apply(group, true)?;
        }
        self.from_cursor = true;
        Ok(())
    }

    fn apply_defaults(&mut self) -> Result<(), Error> {
        let schema = self.schema;
        let settings = self.settings;
        let cursor = settings.pagination.cursor_name.as_str();
        for field in schema.fields_with_defaults() {
            if self.filtered_fields.contains(&field.json_name) {
                continue;
            }
            self.state = self
                .state
                .parsed_argument(&field.json_name, cursor, false)?;

            let defaults = field
                .restriction
                .as_ref()
                .map(|restriction| restriction.defaults.as_slice())
                .unwrap_or_default();
            let condition = translate_filter(
                field,
                &field.json_name,
                ComparisonType::Eq,
                defaults,
                ValueOrigin::Default,
                &settings.search.enum_split,
                &mut self.bindings,
            )?;

            self.referenced_fields.insert(field.json_name.clone());
            self.filters.push(condition);
        }
        Ok(())
    }

    fn page_size(&self, parameter: &str, value: &str) -> Result<Option<u64>, Error> {
        let max = u64::from(self.settings.pagination.max_page_size);
        let invalid = |reason: String| Error::InvalidPageSize {
            parameter: parameter.to_string(),
            value: value.to_string(),
            reason,
        };

        if value.eq_ignore_ascii_case("ALL") {
            return if max == 0 {
                Ok(None)
            } else {
                Err(invalid(format!("the page size must not exceed {max}")))
            };
        }
        let limit: u64 = value
            .parse()
            .map_err(|_| invalid("the page size must be a whole number or ALL".to_string()))?;
        if limit == 0 {
            return Err(invalid("the page size must be at least 1".to_string()));
        }
        if max > 0 && limit > max {
            return Err(invalid(format!("the page size must not exceed {max}")));
        }
        Ok(Some(limit))
    }

    /// Keep the parameter for the cursors of other pages.
    fn record(&mut self, group: &ParameterGroup) {
        for (key, value) in &group.raw {
            self.parameters.push(*key, *value);
        }
    }
}

fn single_value<'p>(group: &ParameterGroup<'p>) -> Result<&'p str, Error> {
    match group.values.as_slice() {
        [value] => Ok(*value),
        _ => Err(Error::DuplicateParameterUnsupported {
            parameter: group.key.to_string(),
        }),
    }
}
