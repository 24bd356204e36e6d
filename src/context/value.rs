//! Typed header/query values and the decoding boundary.
//!
//! Raw escaped text never leaves this module: path segments go through
//! [`decode_component`], query strings through [`parse_query`].

use std::collections::HashMap;

use axum::http::header::GetAll;
use axum::http::HeaderValue;

use crate::error::PipeError;

/// Decoded query string, keyed by parameter name.
pub type Query = HashMap<String, FieldValue>;

/// Path placeholders, keyed by placeholder name.
pub type Params = HashMap<String, String>;

/// A header or query value: a single string or an ordered sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    One(String),
    Many(Vec<String>),
}

impl FieldValue {
    /// First value, in arrival order.
    pub fn first(&self) -> &str {
        match self {
            FieldValue::One(v) => v,
            FieldValue::Many(vs) => vs.first().map(String::as_str).unwrap_or(""),
        }
    }

    /// All values, in arrival order.
    pub fn as_slice(&self) -> &[String] {
        match self {
            FieldValue::One(v) => std::slice::from_ref(v),
            FieldValue::Many(vs) => vs,
        }
    }

    pub fn into_vec(self) -> Vec<String> {
        match self {
            FieldValue::One(v) => vec![v],
            FieldValue::Many(vs) => vs,
        }
    }

    /// Append another value, turning a single value into a sequence.
    pub fn push(&mut self, value: String) {
        match self {
            FieldValue::One(first) => {
                let first = std::mem::take(first);
                *self = FieldValue::Many(vec![first, value]);
            }
            FieldValue::Many(vs) => vs.push(value),
        }
    }

    pub(crate) fn from_header_values(values: GetAll<'_, HeaderValue>) -> Option<Self> {
        let mut collected: Vec<String> = values
            .iter()
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .collect();
        match collected.len() {
            0 => None,
            1 => collected.pop().map(FieldValue::One),
            _ => Some(FieldValue::Many(collected)),
        }
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::One(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::One(value.to_string())
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(values: Vec<String>) -> Self {
        FieldValue::Many(values)
    }
}

impl From<Vec<&str>> for FieldValue {
    fn from(values: Vec<&str>) -> Self {
        FieldValue::Many(values.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for FieldValue {
    fn from(values: [&str; N]) -> Self {
        FieldValue::Many(values.iter().map(|v| v.to_string()).collect())
    }
}

impl PartialEq<&str> for FieldValue {
    fn eq(&self, other: &&str) -> bool {
        matches!(self, FieldValue::One(v) if v == other)
    }
}

/// Percent-decode one URL component.
pub fn decode_component(raw: &str) -> Result<String, PipeError> {
    urlencoding::decode(raw)
        .map(|decoded| decoded.into_owned())
        .map_err(|_| PipeError::Decode(raw.to_string()))
}

/// Parse an `application/x-www-form-urlencoded` query string.
///
/// Repeated keys produce [`FieldValue::Many`] in arrival order.
pub fn parse_query(raw: Option<&str>) -> Query {
    let mut query = Query::new();
    let Some(raw) = raw else {
        return query;
    };
    for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
        let value = value.into_owned();
        match query.get_mut(key.as_ref()) {
            Some(existing) => existing.push(value),
            None => {
                query.insert(key.into_owned(), FieldValue::One(value));
            }
        }
    }
    query
}
