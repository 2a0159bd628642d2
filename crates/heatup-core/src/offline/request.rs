use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        };
        f.write_str(s)
    }
}

/// An outgoing resource request, identified by method and path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRequest {
    pub method: Method,
    pub path: String,
}

impl AssetRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: normalize_path(path.into()),
        }
    }

    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: normalize_path(path.into()),
        }
    }

    /// Only GET requests are answered from the cache.
    pub fn is_cacheable(&self) -> bool {
        self.method == Method::Get
    }

    /// Storage key for this request.
    pub fn cache_key(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for AssetRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

pub(crate) fn normalize_path(path: String) -> String {
    if path.starts_with('/') {
        path
    } else {
        format!("/{}", path)
    }
}

/// A response as returned by the network or stored in the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl AssetResponse {
    pub fn ok(content_type: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            content_type: Some(content_type.into()),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_are_rooted() {
        assert_eq!(AssetRequest::get("app.js").path, "/app.js");
        assert_eq!(AssetRequest::get("/").path, "/");
    }

    #[test]
    fn test_only_get_is_cacheable() {
        assert!(AssetRequest::get("/").is_cacheable());
        assert!(!AssetRequest::new(Method::Post, "/").is_cacheable());
        assert!(!AssetRequest::new(Method::Head, "/").is_cacheable());
    }

    #[test]
    fn test_is_success() {
        assert!(AssetResponse::ok("text/html", "hi").is_success());
        let missing = AssetResponse {
            status: 404,
            content_type: None,
            body: Vec::new(),
        };
        assert!(!missing.is_success());
    }
}
