//! Decoded query-string parameters.

use url::form_urlencoded;

/// Ordered, multi-valued query parameters from a request.
///
/// Pair order is preserved exactly as it appeared in the query string, which
/// matters for repeated `sort` parameters.
///
/// ```rust
/// use crudgate_query::QueryParams;
///
/// let params = QueryParams::parse("sort=-birthdate&sort=username&name=J%C3%BCrgen");
/// assert_eq!(params.all("sort"), vec!["-birthdate", "username"]);
/// assert_eq!(params.first("name"), Some("Jürgen"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Create an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a raw `application/x-www-form-urlencoded` query string.
    ///
    /// A leading `?` is ignored.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.strip_prefix('?').unwrap_or(raw);
        Self {
            pairs: form_urlencoded::parse(raw.as_bytes())
                .into_owned()
                .collect(),
        }
    }

    /// Build from already decoded pairs.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            pairs: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Whether no parameters were supplied.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// First value for a name.
    pub fn first(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Every value for a name, in order.
    pub fn all(&self, name: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Distinct names paired with their first value, in first-appearance order.
    pub fn first_values(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().enumerate().filter_map(|(i, (k, v))| {
            let seen = self.pairs[..i].iter().any(|(prev, _)| prev == k);
            (!seen).then_some((k.as_str(), v.as_str()))
        })
    }

    /// Every pair, in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}
