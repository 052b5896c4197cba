//! Request descriptors and URL composition.

use super::error::{JikanError, Result};
use reqwest::{Method, Url};
use std::fmt;

/// One API call: method, path relative to the versioned base URL, and
/// ordered query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: Method,
    segments: Vec<String>,
    query: Vec<(String, String)>,
}

impl Request {
    /// A request for a static path such as `"/genres/anime"`.
    pub fn new(method: Method, path: &str) -> Self {
        let segments = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        Self {
            method,
            segments,
            query: Vec::new(),
        }
    }

    pub fn get(path: &str) -> Self {
        Self::new(Method::GET, path)
    }

    /// Append one dynamic path segment. The value is percent-encoded as a
    /// single segment, so a `/` inside it cannot change the route.
    pub fn segment(mut self, value: impl fmt::Display) -> Self {
        self.segments.push(value.to_string());
        self
    }

    pub fn query(mut self, key: &str, value: impl fmt::Display) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn query_opt<V: fmt::Display>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Path relative to the base URL, unencoded, e.g. `/anime/1/episodes`.
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }

    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    /// Resolve against `base`, keeping the base's own path prefix (`/v4`).
    pub fn url(&self, base: &Url) -> Result<Url> {
        let mut url = base.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                JikanError::Config(format!("base URL cannot carry a path: {}", base))
            })?;
            path.pop_if_empty();
            path.extend(&self.segments);
        }

        url.set_query(None);
        if !self.query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(self.query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }

        Ok(url)
    }
}
