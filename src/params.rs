//! Query-string building.

/// Ordered query parameters.
///
/// Parameters are emitted in insertion order, so the same inputs always
/// produce the same string. Values are passed through as given: the server
/// expects filters such as `q=name:my-project` with the colon intact.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.push(key, value);
        self
    }

    /// Append a parameter if a value is present.
    #[must_use]
    pub fn with_opt<V: ToString>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
        if let Some(value) = value {
            self.push(key, value);
        }
        self
    }

    /// Append a parameter in place.
    pub fn push(&mut self, key: impl Into<String>, value: impl ToString) {
        self.pairs.push((key.into(), value.to_string()));
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Render as `?k1=v1&k2=v2`, or an empty string when there are no parameters.
    pub fn to_query_string(&self) -> String {
        if self.pairs.is_empty() {
            return String::new();
        }
        let joined = self
            .pairs
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        format!("?{joined}")
    }

    /// Borrow the pairs, e.g. for `reqwest::RequestBuilder::query`.
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = QueryParams::new();
        for (k, v) in iter {
            params.push(k, v);
        }
        params
    }
}

impl std::fmt::Display for QueryParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_query_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_string_preserves_order() {
        let params: QueryParams = [("limit", "100"), ("q", "name:x")].into_iter().collect();
        assert_eq!(params.to_query_string(), "?limit=100&q=name:x");

        let reversed: QueryParams = [("q", "name:x"), ("limit", "100")].into_iter().collect();
        assert_eq!(reversed.to_query_string(), "?q=name:x&limit=100");
    }

    #[test]
    fn test_empty_params_render_nothing() {
        assert_eq!(QueryParams::new().to_query_string(), "");
    }

    #[test]
    fn test_with_opt_skips_none() {
        let params = QueryParams::new()
            .with("offset", 0)
            .with_opt("q", None::<String>)
            .with_opt("limit", Some(25));
        assert_eq!(params.to_string(), "?offset=0&limit=25");
    }
}
