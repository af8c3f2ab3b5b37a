//! Request classification.
//!
//! The router decides, per request, which path it takes through the engine.
//! Rules are evaluated in a fixed order:
//!
//! 1. Non-HTTP schemes bypass the engine entirely.
//! 2. Mutating methods go to write capture (online requests pass through).
//! 3. Navigations and HTML documents are network-first with a document fallback.
//! 4. The API namespace is network-first, caching only allow-listed paths.
//! 5. Everything else (scripts, styles, fonts, images) is cache-first.

use sync_types::Request;

use crate::config::CacheConfig;

/// The class a request falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestClass {
    /// Not an http(s) request; the engine does not touch it.
    Bypass,
    /// A method with side effects.
    Mutating,
    /// A top-level navigation or HTML document.
    Navigation,
    /// A read under the API namespace.
    Api,
    /// Any other read.
    StaticAsset,
}

/// What to do with a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Send to the network untouched.
    PassThrough,
    /// Capture when offline, pass through when online.
    WriteCapture,
    /// Network first, falling back to cached data.
    NetworkFirst {
        /// Which synthetic response to produce when nothing is cached.
        fallback: Fallback,
        /// Whether a successful response is written to the API bucket.
        cache_writes: bool,
    },
    /// Cache first, network on miss.
    CacheFirst,
}

/// Shape of the synthetic offline response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    /// HTML offline page.
    Document,
    /// JSON offline envelope.
    Api,
}

/// Pure request router built from the cache configuration.
#[derive(Debug, Clone)]
pub struct Router {
    api_prefix: String,
    allow_list: Vec<String>,
}

impl Router {
    /// Create a router from cache configuration.
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            api_prefix: config.api_prefix.clone(),
            allow_list: config.api_allow_list.clone(),
        }
    }

    /// Classify a request.
    pub fn classify(&self, request: &Request) -> RequestClass {
        if !matches!(request.url().scheme(), "http" | "https") {
            return RequestClass::Bypass;
        }
        if request.is_mutating() {
            return RequestClass::Mutating;
        }

        let path = request.path();
        if request.is_navigation() || path == "/" || path.ends_with(".html") {
            RequestClass::Navigation
        } else if path.starts_with(&self.api_prefix) {
            RequestClass::Api
        } else {
            RequestClass::StaticAsset
        }
    }

    /// Pick the strategy for a request.
    pub fn route(&self, request: &Request) -> Strategy {
        match self.classify(request) {
            RequestClass::Bypass => Strategy::PassThrough,
            RequestClass::Mutating => Strategy::WriteCapture,
            RequestClass::Navigation => Strategy::NetworkFirst {
                fallback: Fallback::Document,
                cache_writes: false,
            },
            RequestClass::Api => Strategy::NetworkFirst {
                fallback: Fallback::Api,
                cache_writes: self.is_allow_listed(request.path()),
            },
            RequestClass::StaticAsset => Strategy::CacheFirst,
        }
    }

    /// Whether responses for `path` may be written to the API bucket.
    ///
    /// Entries are path prefixes.
    pub fn is_allow_listed(&self, path: &str) -> bool {
        self.allow_list
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sync_types::{Method, RequestMode};

    fn router() -> Router {
        let mut config = CacheConfig::default();
        config.api_allow_list = vec!["/api/health".into(), "/api/dashboard".into()];
        Router::new(&config)
    }

    fn get(path: &str) -> Request {
        Request::get(&format!("https://app.test{path}")).unwrap()
    }

    #[test]
    fn mutating_methods_are_captured_before_anything_else() {
        let r = router();
        for method in [Method::POST, Method::PUT, Method::PATCH, Method::DELETE] {
            let req = Request::parse(method.clone(), "https://app.test/index.html").unwrap();
            assert_eq!(r.classify(&req), RequestClass::Mutating, "{method}");
            assert_eq!(r.route(&req), Strategy::WriteCapture);
        }
    }

    #[test]
    fn navigation_mode_is_navigation() {
        let req = Request::navigate("https://app.test/reports/monthly").unwrap();
        assert_eq!(router().classify(&req), RequestClass::Navigation);
    }

    #[test]
    fn root_and_html_paths_are_navigation() {
        let r = router();
        assert_eq!(r.classify(&get("/")), RequestClass::Navigation);
        assert_eq!(r.classify(&get("/index.html")), RequestClass::Navigation);
        assert_eq!(r.classify(&get("/help/faq.html")), RequestClass::Navigation);
    }

    #[test]
    fn navigation_uses_document_fallback_without_writes() {
        assert_eq!(
            router().route(&get("/")),
            Strategy::NetworkFirst {
                fallback: Fallback::Document,
                cache_writes: false
            }
        );
    }

    #[test]
    fn api_paths_are_network_first() {
        let r = router();
        assert_eq!(r.classify(&get("/api/orders")), RequestClass::Api);
        assert_eq!(
            r.route(&get("/api/orders")),
            Strategy::NetworkFirst {
                fallback: Fallback::Api,
                cache_writes: false
            }
        );
    }

    #[test]
    fn allow_listed_api_paths_enable_writes() {
        let r = router();
        assert_eq!(
            r.route(&get("/api/health")),
            Strategy::NetworkFirst {
                fallback: Fallback::Api,
                cache_writes: true
            }
        );
        assert!(r.is_allow_listed("/api/dashboard/summary"));
        assert!(!r.is_allow_listed("/api/users"));
    }

    #[test]
    fn assets_are_cache_first() {
        let r = router();
        for path in ["/main.js", "/style.css", "/fonts/inter.woff2", "/img/logo.png"] {
            assert_eq!(r.classify(&get(path)), RequestClass::StaticAsset, "{path}");
            assert_eq!(r.route(&get(path)), Strategy::CacheFirst);
        }
    }

    #[test]
    fn non_http_schemes_bypass() {
        let req = Request::get("chrome-extension://abcdef/script.js").unwrap();
        assert_eq!(router().classify(&req), RequestClass::Bypass);
        assert_eq!(router().route(&req), Strategy::PassThrough);
    }

    #[test]
    fn head_request_to_asset_is_read() {
        let req = Request::parse(Method::HEAD, "https://app.test/main.js")
            .unwrap()
            .with_mode(RequestMode::NoCors);
        assert_eq!(router().classify(&req), RequestClass::StaticAsset);
    }
}
