//! Request parameters, and how a parameter splits into a name, an operator and a value.

use indexmap::IndexMap;
use url::form_urlencoded;

use restql_configuration::{AttributeHandling, SearchSettings};

use super::comparison::ComparisonType;

/// Request parameters in the order they were first given. A repeated key keeps
/// all of its values, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParameters(IndexMap<String, Vec<String>>);

impl QueryParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a form encoded query string, such as the query of a request URL.
    pub fn from_query_string(query: &str) -> Self {
        form_urlencoded::parse(query.as_bytes())
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect()
    }

    /// Form encode every parameter, in order.
    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in self.pairs() {
            serializer.append_pair(key, value);
        }
        serializer.finish()
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.entry(key.into()).or_default().push(value.into());
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.0.get(key).map(Vec::as_slice)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.0.iter()
    }

    /// Every key and value pair, grouped by key.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().flat_map(|(key, values)| {
            values
                .iter()
                .map(move |value| (key.as_str(), value.as_str()))
        })
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParameters {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut parameters = QueryParameters::new();
        for (key, value) in iter {
            parameters.push(key, value);
        }
        parameters
    }
}

/// Take the operator out of the key (`name[gte]`, `name:gte`).
///
/// Keys are split the same way for every parameter, so that special parameters can
/// reject an operator.
pub fn split_key<'a>(settings: &SearchSettings, key: &'a str) -> (&'a str, Option<&'a str>) {
    match settings.attribute_handling {
        AttributeHandling::ParameterNameArrayNotation => key
            .strip_suffix(']')
            .and_then(|rest| rest.split_once('['))
            .map_or((key, None), |(name, attribute)| (name, Some(attribute))),
        AttributeHandling::ParameterNameSuffix => key
            .split_once(settings.attribute_separator.as_str())
            .map_or((key, None), |(name, attribute)| (name, Some(attribute))),
        AttributeHandling::ParameterValuePrefix => (key, None),
    }
}

/// Take the operator out of a filter value (`gte:5`).
///
/// Only a prefix naming a known operator counts, so values that merely contain the
/// separator are left alone.
pub fn split_value<'a>(settings: &SearchSettings, value: &'a str) -> (Option<&'a str>, &'a str) {
    if settings.attribute_handling != AttributeHandling::ParameterValuePrefix {
        return (None, value);
    }
    match value.split_once(settings.attribute_separator.as_str()) {
        Some((attribute, rest)) if ComparisonType::from_attribute(attribute).is_some() => {
            (Some(attribute), rest)
        }
        _ => (None, value),
    }
}
