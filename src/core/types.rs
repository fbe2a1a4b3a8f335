use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use crate::core::constants::{defaults, http};

/// Escapes decoded again after encoding a path value, so these stay literal
/// in generated paths.
const PATH_SAFE_ESCAPES: [(&str, &str); 10] = [
    ("%2F", "/"),
    ("%40", "@"),
    ("%3A", ":"),
    ("%3B", ";"),
    ("%2C", ","),
    ("%3D", "="),
    ("%2B", "+"),
    ("%21", "!"),
    ("%2A", "*"),
    ("%7C", "|"),
];

static PLACEHOLDER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("Failed to compile placeholder pattern")
});

/// A named, parameterizable URL pattern registered by the host platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    /// Unique route name, e.g. `entity.node.canonical`
    pub name: String,
    /// Path pattern with `{placeholder}` segments
    pub path: String,
    /// Entity type the path belongs to, if any
    #[serde(default)]
    pub entity_type: Option<String>,
    /// Allowed HTTP methods (empty means any)
    #[serde(default)]
    pub methods: Vec<String>,
    /// Default values for placeholders
    #[serde(default)]
    pub defaults: BTreeMap<String, String>,
}

impl Route {
    pub fn new<N: Into<String>, P: Into<String>>(name: N, path: P) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            entity_type: None,
            methods: Vec::new(),
            defaults: BTreeMap::new(),
        }
    }

    pub fn with_entity_type<S: Into<String>>(mut self, entity_type: S) -> Self {
        self.entity_type = Some(entity_type.into());
        self
    }

    pub fn with_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.methods = methods.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_default<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.defaults.insert(key.into(), value.into());
        self
    }

    /// Placeholder names in path order, each listed once.
    pub fn placeholders(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for capture in PLACEHOLDER_PATTERN.captures_iter(&self.path) {
            if let Some(name) = capture.get(1).map(|m| m.as_str())
                && !names.contains(&name)
            {
                names.push(name);
            }
        }
        names
    }

    pub fn has_placeholders(&self) -> bool {
        PLACEHOLDER_PATTERN.is_match(&self.path)
    }

    /// Routes without an explicit method list accept GET.
    pub fn allows_get(&self) -> bool {
        self.methods.is_empty()
            || self
                .methods
                .iter()
                .any(|method| method.eq_ignore_ascii_case("GET"))
    }

    /// Substitute percent-encoded placeholder values from `params`. Returns
    /// `None` if any placeholder has no value.
    pub fn render_path(&self, params: &BTreeMap<&str, &str>) -> Option<String> {
        let mut missing = false;
        let rendered = PLACEHOLDER_PATTERN.replace_all(&self.path, |caps: &regex::Captures| {
            match params.get(&caps[1]) {
                Some(value) => encode_path_value(value),
                None => {
                    missing = true;
                    String::new()
                }
            }
        });

        if missing {
            None
        } else {
            Some(rendered.into_owned())
        }
    }
}

fn encode_path_value(value: &str) -> String {
    let mut encoded = urlencoding::encode(value).into_owned();
    for (escaped, literal) in PATH_SAFE_ESCAPES {
        encoded = encoded.replace(escaped, literal);
    }
    encoded
}

/// Ordered set of routes claimed by a single handler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteCollection {
    routes: Vec<Route>,
}

impl RouteCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, route: Route) {
        self.routes.push(route);
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Route> {
        self.routes.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.routes.iter().map(|route| route.name.as_str()).collect()
    }
}

impl IntoIterator for RouteCollection {
    type Item = Route;
    type IntoIter = std::vec::IntoIter<Route>;

    fn into_iter(self) -> Self::IntoIter {
        self.routes.into_iter()
    }
}

impl FromIterator<Route> for RouteCollection {
    fn from_iter<I: IntoIterator<Item = Route>>(iter: I) -> Self {
        Self {
            routes: iter.into_iter().collect(),
        }
    }
}

/// A route with all placeholders substituted, optionally absolute.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConcreteUrl(String);

impl ConcreteUrl {
    pub fn new<S: Into<String>>(url: S) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ConcreteUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ConcreteUrl {
    fn from(url: String) -> Self {
        Self(url)
    }
}

impl From<&str> for ConcreteUrl {
    fn from(url: &str) -> Self {
        Self(url.to_string())
    }
}

/// Per-run probe settings, cloned into every probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Cookie sent with every request, in `Set-Cookie` syntax
    pub cookie: Option<String>,
    /// Only report URLs answering with this status code
    pub response_code_filter: Option<u16>,
    /// Only report URLs whose cache header has this value
    pub response_cache_filter: Option<String>,
    /// Include timing and cache value in report lines
    pub profile: bool,
    /// Verify TLS peer certificates
    pub verify_ssl: bool,
    /// Follow HTTP redirects
    pub follow_redirects: bool,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            cookie: None,
            response_code_filter: None,
            response_cache_filter: None,
            profile: false,
            verify_ssl: defaults::VERIFY_SSL,
            follow_redirects: defaults::FOLLOW_REDIRECTS,
        }
    }
}

/// Response metadata for one probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub status_code: u16,
    pub elapsed: Duration,
    pub effective_url: String,
    pub cache: String,
}

impl ProbeResult {
    pub fn new(
        status_code: u16,
        elapsed: Duration,
        effective_url: String,
        cache: Option<String>,
    ) -> Self {
        Self {
            status_code,
            elapsed,
            effective_url,
            cache: cache.unwrap_or_else(|| http::CACHE_MISS.to_string()),
        }
    }

    /// Whether `config`'s filters let this result through.
    pub fn passes_filters(&self, config: &ProbeConfig) -> bool {
        if let Some(code) = config.response_code_filter
            && code != self.status_code
        {
            return false;
        }

        if let Some(ref cache) = config.response_cache_filter
            && *cache != self.cache
        {
            return false;
        }

        true
    }

    /// Report line: `code, url` or, when profiling, `code, time, cache, url`.
    pub fn report_line(&self, profile: bool) -> String {
        if profile {
            format!(
                "{}, {:.3}, {}, {}",
                self.status_code,
                self.elapsed.as_secs_f64(),
                self.cache,
                self.effective_url
            )
        } else {
            format!("{}, {}", self.status_code, self.effective_url)
        }
    }
}

/// Progress through a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchProgress {
    pub processed: usize,
    pub total: usize,
}

impl BatchProgress {
    pub fn new(processed: usize, total: usize) -> Self {
        Self { processed, total }
    }

    /// Percent complete, rounded half away from zero.
    pub fn percent(&self) -> u32 {
        if self.total == 0 {
            return 100;
        }
        (100.0 * self.processed as f64 / self.total as f64).round() as u32
    }
}

impl fmt::Display for BatchProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}% (Processing {} of {})",
            self.percent(),
            self.processed,
            self.total
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_placeholders_in_order() {
        let route = Route::new("entity.node.revision", "/node/{node}/revisions/{node_revision}/view");
        assert_eq!(route.placeholders(), vec!["node", "node_revision"]);
        assert!(route.has_placeholders());
    }

    #[test]
    fn test_route_placeholders_deduplicated() {
        let route = Route::new("weird", "/{a}/{b}/{a}");
        assert_eq!(route.placeholders(), vec!["a", "b"]);
    }

    #[test]
    fn test_static_route_has_no_placeholders() {
        let route = Route::new("user.login", "/user/login");
        assert!(route.placeholders().is_empty());
        assert!(!route.has_placeholders());
    }

    #[test]
    fn test_route_allows_get() {
        assert!(Route::new("a", "/a").allows_get());
        assert!(Route::new("a", "/a").with_methods(["get", "POST"]).allows_get());
        assert!(!Route::new("a", "/a").with_methods(["POST"]).allows_get());
    }

    #[test]
    fn test_render_path() {
        let route = Route::new("entity.node.canonical", "/node/{node}/{display}");
        let params = BTreeMap::from([("node", "7"), ("display", "full")]);
        assert_eq!(route.render_path(&params), Some("/node/7/full".to_string()));
    }

    #[test]
    fn test_render_path_encodes_values() {
        let route = Route::new("search.view", "/search/{keys}");

        let params = BTreeMap::from([("keys", "what?#top")]);
        assert_eq!(
            route.render_path(&params),
            Some("/search/what%3F%23top".to_string())
        );

        let params = BTreeMap::from([("keys", "a b/c:d")]);
        assert_eq!(route.render_path(&params), Some("/search/a%20b/c:d".to_string()));
    }

    #[test]
    fn test_render_path_missing_value() {
        let route = Route::new("entity.node.canonical", "/node/{node}");
        assert_eq!(route.render_path(&BTreeMap::new()), None);
    }

    #[test]
    fn test_route_deserializes_with_defaults() {
        let route: Route = toml::from_str("name = \"front\"\npath = \"/\"").unwrap();
        assert_eq!(route, Route::new("front", "/"));
    }

    #[test]
    fn test_concrete_url_emptiness() {
        assert!(ConcreteUrl::new("").is_empty());
        assert!(ConcreteUrl::new("  ").is_empty());
        assert!(!ConcreteUrl::new("/node/1").is_empty());
        assert_eq!(ConcreteUrl::from("/node/1").to_string(), "/node/1");
    }

    #[test]
    fn test_probe_config_default() {
        let config = ProbeConfig::default();
        assert!(config.verify_ssl);
        assert!(!config.follow_redirects);
        assert!(!config.profile);
        assert_eq!(config.cookie, None);
    }

    #[test]
    fn test_probe_result_defaults_cache_to_miss() {
        let result = ProbeResult::new(200, Duration::ZERO, "http://x/".to_string(), None);
        assert_eq!(result.cache, "MISS");
    }

    #[test]
    fn test_probe_result_code_filter() {
        let ok = ProbeResult::new(200, Duration::ZERO, "http://x/".to_string(), None);
        let missing = ProbeResult::new(404, Duration::ZERO, "http://x/".to_string(), None);
        let config = ProbeConfig {
            response_code_filter: Some(404),
            ..Default::default()
        };

        assert!(!ok.passes_filters(&config));
        assert!(missing.passes_filters(&config));
    }

    #[test]
    fn test_probe_result_cache_filter() {
        let hit = ProbeResult::new(200, Duration::ZERO, "http://x/".to_string(), Some("HIT".into()));
        let miss = ProbeResult::new(200, Duration::ZERO, "http://x/".to_string(), None);
        let config = ProbeConfig {
            response_cache_filter: Some("HIT".to_string()),
            ..Default::default()
        };

        assert!(hit.passes_filters(&config));
        assert!(!miss.passes_filters(&config));
    }

    #[test]
    fn test_probe_result_report_line() {
        let result = ProbeResult::new(
            200,
            Duration::from_millis(1500),
            "http://example.com/node/1".to_string(),
            Some("HIT".to_string()),
        );

        assert_eq!(result.report_line(false), "200, http://example.com/node/1");
        assert_eq!(
            result.report_line(true),
            "200, 1.500, HIT, http://example.com/node/1"
        );
    }

    #[test]
    fn test_batch_progress_percent() {
        assert_eq!(BatchProgress::new(10, 25).percent(), 40);
        assert_eq!(BatchProgress::new(20, 25).percent(), 80);
        assert_eq!(BatchProgress::new(25, 25).percent(), 100);
        assert_eq!(BatchProgress::new(1, 3).percent(), 33);
        assert_eq!(BatchProgress::new(1, 8).percent(), 13);
        assert_eq!(BatchProgress::new(0, 0).percent(), 100);
    }

    #[test]
    fn test_batch_progress_display() {
        assert_eq!(
            BatchProgress::new(10, 25).to_string(),
            "40% (Processing 10 of 25)"
        );
    }
}
