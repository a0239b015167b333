//! Query-string helpers for the remote service's list endpoints.
//!
//! Each helper returns a modifier closure that adds its reserved key to a
//! [`Query`]. The client applies modifiers in order before encoding:
//!
//! ```rust
//! use apiutil_common::query::{self, OrderDir, Query};
//!
//! let mut q = Query::new();
//! query::limit(25, 50)(&mut q);
//! query::order_by(&["title"], Some(OrderDir::Desc))(&mut q);
//!
//! assert_eq!(q.get("limit"), Some("50,25"));
//! assert_eq!(q.get("order_dir"), Some("DESC"));
//! ```

use std::fmt;
use url::form_urlencoded;

pub const QUERY_KEY_LIMIT: &str = "limit";
pub const QUERY_KEY_WITH: &str = "with";
pub const QUERY_KEY_SCOPE: &str = "scope";
pub const QUERY_KEY_AUX: &str = "auxiliary";
pub const QUERY_KEY_ORDER: &str = "order_by";
pub const QUERY_KEY_ORDER_DIR: &str = "order_dir";
pub const QUERY_KEY_GROUP_BY: &str = "group_by";
/// Appended to an attribute name to carry its operator/combinator list
pub const QUERY_ARGS_SUFFIX: &str = "_args";

/// Ordered, multi-valued query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pairs: Vec<(String, String)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value; existing values for the key are kept.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// First value for `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Form-urlencode, sorted by key. Values of one key keep insertion order.
    pub fn encode(&self) -> String {
        let mut sorted: Vec<&(String, String)> = self.pairs.iter().collect();
        sorted.sort_by(|a, b| a.0.cmp(&b.0));

        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in sorted {
            serializer.append_pair(key, value);
        }
        serializer.finish()
    }
}

/// Comparison operator for attribute filters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Equal,
    NotEqual,
    GreaterEqual,
    Greater,
    LessEqual,
    Less,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Equal => "EQUAL",
            Operator::NotEqual => "NOT_EQUAL",
            Operator::GreaterEqual => "GREATER_EQUAL",
            Operator::Greater => "GREATER",
            Operator::LessEqual => "LESS_EQUAL",
            Operator::Less => "LESS",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Joins an attribute filter with the next one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Combinator {
    And,
    Or,
}

impl Combinator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Combinator::And => "AND",
            Combinator::Or => "OR",
        }
    }
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderDir {
    Asc,
    Desc,
}

impl OrderDir {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderDir::Asc => "ASC",
            OrderDir::Desc => "DESC",
        }
    }
}

impl fmt::Display for OrderDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named scope with an optional filter argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    pub scope: String,
    pub filter: Option<String>,
}

impl Scope {
    pub fn new(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            filter: None,
        }
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    fn encode(&self) -> String {
        match &self.filter {
            Some(filter) if !filter.is_empty() => format!("{};{}", self.scope, filter),
            _ => self.scope.clone(),
        }
    }
}

/// Attribute filter: `name=value`, plus `name_args` when args are present
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrQuery {
    pub name: String,
    pub value: String,
    pub args: AttrArgs,
}

impl AttrQuery {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            args: AttrArgs::default(),
        }
    }

    pub fn with_args(mut self, args: AttrArgs) -> Self {
        self.args = args;
        self
    }
}

/// Operators for an attribute filter. `combinators[i]` pairs with `operators[i]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttrArgs {
    pub operators: Vec<Operator>,
    pub combinators: Vec<Combinator>,
}

impl AttrArgs {
    pub fn is_empty(&self) -> bool {
        self.operators.is_empty() && self.combinators.is_empty()
    }

    fn encode(&self) -> String {
        self.operators
            .iter()
            .enumerate()
            .map(|(i, op)| match self.combinators.get(i) {
                Some(comb) => format!("{};{}", op, comb),
                None => op.to_string(),
            })
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// `limit=<offset>,<limit>`
pub fn limit(limit: u32, offset: u32) -> impl Fn(&mut Query) {
    let value = format!("{},{}", offset, limit);
    move |q: &mut Query| q.add(QUERY_KEY_LIMIT, value.as_str())
}

/// Related resources to embed in the response
pub fn with(relations: &[&str]) -> impl Fn(&mut Query) {
    let value = relations.join(",");
    move |q: &mut Query| q.add(QUERY_KEY_WITH, value.as_str())
}

pub fn scope(scopes: &[Scope]) -> impl Fn(&mut Query) {
    let value = scopes
        .iter()
        .map(Scope::encode)
        .collect::<Vec<_>>()
        .join(",");
    move |q: &mut Query| q.add(QUERY_KEY_SCOPE, value.as_str())
}

/// Auxiliary attributes to include in the response
pub fn auxiliary(attributes: &[&str]) -> impl Fn(&mut Query) {
    let value = attributes.join(",");
    move |q: &mut Query| q.add(QUERY_KEY_AUX, value.as_str())
}

/// `order_by`, and `order_dir` when a direction is given
pub fn order_by(attributes: &[&str], dir: Option<OrderDir>) -> impl Fn(&mut Query) {
    let value = attributes.join(",");
    move |q: &mut Query| {
        q.add(QUERY_KEY_ORDER, value.as_str());
        if let Some(dir) = dir {
            q.add(QUERY_KEY_ORDER_DIR, dir.as_str());
        }
    }
}

pub fn group_by(attributes: &[&str]) -> impl Fn(&mut Query) {
    let value = attributes.join(",");
    move |q: &mut Query| q.add(QUERY_KEY_GROUP_BY, value.as_str())
}

pub fn attributes(attrs: &[AttrQuery]) -> impl Fn(&mut Query) {
    let attrs = attrs.to_vec();
    move |q: &mut Query| {
        for attr in &attrs {
            q.add(attr.name.as_str(), attr.value.as_str());
            if !attr.args.is_empty() {
                q.add(format!("{}{}", attr.name, QUERY_ARGS_SUFFIX), attr.args.encode());
            }
        }
    }
}
