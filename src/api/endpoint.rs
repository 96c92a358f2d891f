//! Absolute request URLs against the configured API base.

use std::fmt::Display;

use url::Url;

/// Builds endpoint URLs from a base URL, a path and query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlBuilder {
    base: String,
}

impl UrlBuilder {
    /// Only one trailing slash is trimmed from `base`.
    pub fn new(base: &str) -> Self {
        let base = base.strip_suffix('/').unwrap_or(base);
        Self {
            base: base.to_string(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// URL for `path`, which may or may not start with `/`.
    pub fn path(&self, path: &str) -> Result<Url, url::ParseError> {
        self.url(path, std::iter::empty::<(&str, &str)>())
    }

    /// URL for `path` with scalar query parameters.
    ///
    /// A key given twice keeps its first position and its last value.
    pub fn url<K, V, I>(&self, path: &str, query: I) -> Result<Url, url::ParseError>
    where
        K: AsRef<str>,
        V: Display,
        I: IntoIterator<Item = (K, V)>,
    {
        let path = path.strip_prefix('/').unwrap_or(path);
        let mut url = Url::parse(&format!("{}/{}", self.base, path))?;

        let mut pairs: Vec<(String, String)> = Vec::new();
        for (k, v) in query {
            let (k, v) = (k.as_ref().to_string(), v.to_string());
            match pairs.iter_mut().find(|(existing, _)| *existing == k) {
                Some(pair) => pair.1 = v,
                None => pairs.push((k, v)),
            }
        }

        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        Ok(url)
    }
}
