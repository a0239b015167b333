//! Endpoint resolution
//!
//! An endpoint is a logical key plus ordered qualifiers, resolved against a
//! table of templates containing `%v` placeholders:
//!
//! ```rust
//! use apiutil_client::endpoint::{EndpointTemplates, Endpointer};
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
//! enum Books {
//!     List,
//!     Chapter,
//! }
//!
//! let templates = EndpointTemplates::new()
//!     .with(Books::List, "books")
//!     .with(Books::Chapter, "books/%v/chapters/%v");
//!
//! let chapter = templates.resource(Books::Chapter).qualifier(12).qualifier("intro");
//! assert_eq!(chapter.get_endpoint().unwrap(), "books/12/chapters/intro");
//! assert_eq!(templates.resource(Books::List).get_endpoint().unwrap(), "books");
//! ```
//!
//! Qualifiers are inserted as-is. Callers are responsible for URL-safe values.
//! The resolved path is not normalized either: `books/../admin` reaches the
//! transport unchanged.

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Positional placeholder in endpoint templates
pub const PLACEHOLDER: &str = "%v";

/// Anything that can produce the path fragment of a resource URL
pub trait Endpointer {
    fn get_endpoint(&self) -> Result<String>;
}

/// A literal path is its own endpoint
impl Endpointer for str {
    fn get_endpoint(&self) -> Result<String> {
        Ok(self.to_string())
    }
}

impl Endpointer for String {
    fn get_endpoint(&self) -> Result<String> {
        Ok(self.clone())
    }
}

/// Mapping from endpoint key to template
#[derive(Debug, Clone)]
pub struct EndpointTemplates<K> {
    templates: HashMap<K, String>,
}

impl<K: Eq + Hash> EndpointTemplates<K> {
    pub fn new() -> Self {
        Self {
            templates: HashMap::new(),
        }
    }

    pub fn with(mut self, key: K, template: impl Into<String>) -> Self {
        self.insert(key, template);
        self
    }

    pub fn insert(&mut self, key: K, template: impl Into<String>) {
        self.templates.insert(key, template.into());
    }

    pub fn get(&self, key: &K) -> Option<&str> {
        self.templates.get(key).map(String::as_str)
    }

    /// Start describing a resource with no qualifiers yet
    pub fn resource(&self, key: K) -> Resource<'_, K> {
        Resource {
            templates: self,
            key,
            qualifiers: Vec::new(),
        }
    }
}

impl<K: Eq + Hash> Default for EndpointTemplates<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash, S: Into<String>> FromIterator<(K, S)> for EndpointTemplates<K> {
    fn from_iter<I: IntoIterator<Item = (K, S)>>(iter: I) -> Self {
        Self {
            templates: iter.into_iter().map(|(k, s)| (k, s.into())).collect(),
        }
    }
}

/// Endpoint key plus positional qualifiers
#[derive(Debug, Clone)]
pub struct Resource<'a, K> {
    templates: &'a EndpointTemplates<K>,
    key: K,
    qualifiers: Vec<String>,
}

impl<'a, K> Resource<'a, K> {
    pub fn qualifier(mut self, value: impl Display) -> Self {
        self.qualifiers.push(value.to_string());
        self
    }

    pub fn qualifiers<I, D>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Display,
    {
        self.qualifiers
            .extend(values.into_iter().map(|v| v.to_string()));
        self
    }

    pub fn key(&self) -> &K {
        &self.key
    }
}

impl<K: Eq + Hash + Debug> Endpointer for Resource<'_, K> {
    fn get_endpoint(&self) -> Result<String> {
        let template = self
            .templates
            .get(&self.key)
            .ok_or_else(|| Error::UnknownEndpoint(format!("{:?}", self.key)))?;
        resolve(template, &self.qualifiers)
    }
}

/// Substitute `qualifiers` into the placeholders of `template`, in order.
///
/// Fails when the counts differ. Inserted values are never rescanned for
/// placeholders.
pub fn resolve(template: &str, qualifiers: &[String]) -> Result<String> {
    let pieces: Vec<&str> = template.split(PLACEHOLDER).collect();
    let expected = pieces.len() - 1;

    if qualifiers.len() != expected {
        return Err(Error::QualifierMismatch {
            got: qualifiers.len(),
            expected,
        });
    }

    let mut path = String::from(pieces[0]);
    for (qualifier, piece) in qualifiers.iter().zip(&pieces[1..]) {
        path.push_str(qualifier);
        path.push_str(piece);
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Endpoint {
        Books,
        Book,
        Edition,
        Unmapped,
    }

    fn templates() -> EndpointTemplates<Endpoint> {
        [
            (Endpoint::Books, "resource"),
            (Endpoint::Book, "resource/%v"),
            (Endpoint::Edition, "resource/%v/editions/%v"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_single_qualifier() {
        let templates = templates();
        let endpoint = templates.resource(Endpoint::Book).qualifier(5);
        assert_eq!(endpoint.get_endpoint().unwrap(), "resource/5");
    }

    #[test]
    fn test_missing_qualifier() {
        let templates = templates();
        let err = templates.resource(Endpoint::Book).get_endpoint().unwrap_err();
        assert!(matches!(
            err,
            Error::QualifierMismatch {
                got: 0,
                expected: 1
            }
        ));
    }

    #[test]
    fn test_too_many_qualifiers() {
        let templates = templates();
        let err = templates
            .resource(Endpoint::Books)
            .qualifier("x")
            .get_endpoint()
            .unwrap_err();
        assert!(matches!(
            err,
            Error::QualifierMismatch {
                got: 1,
                expected: 0
            }
        ));
    }

    #[test]
    fn test_mixed_qualifier_types() {
        let templates = templates();
        let endpoint = templates
            .resource(Endpoint::Edition)
            .qualifiers([7])
            .qualifier("first");
        assert_eq!(endpoint.get_endpoint().unwrap(), "resource/7/editions/first");
    }

    #[test]
    fn test_qualifier_containing_placeholder_is_not_rescanned() {
        let path = resolve("a/%v/b/%v", &["%v".to_string(), "2".to_string()]).unwrap();
        assert_eq!(path, "a/%v/b/2");
    }

    #[test]
    fn test_unknown_key() {
        let templates = templates();
        let err = templates.resource(Endpoint::Unmapped).get_endpoint().unwrap_err();
        assert!(matches!(err, Error::UnknownEndpoint(ref key) if key == "Unmapped"));
    }

    #[test]
    fn test_literal_paths() {
        assert_eq!("books/1".get_endpoint().unwrap(), "books/1");
        assert_eq!(String::from("books").get_endpoint().unwrap(), "books");
    }
}
