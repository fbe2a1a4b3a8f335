//! Application-wide constants to avoid magic values throughout the codebase.

/// HTTP related constants
pub mod http {
    /// Response header the host platform uses to report cache hits
    pub const DEFAULT_CACHE_HEADER: &str = "X-Drupal-Cache";
    /// Cache value reported when the cache header is absent
    pub const CACHE_MISS: &str = "MISS";
    /// Maximum redirect hops followed while probing
    pub const MAX_PROBE_REDIRECTS: usize = 10;
    /// Maximum redirect hops followed during login
    pub const MAX_LOGIN_REDIRECTS: usize = 5;
}

/// Timeout and duration constants
pub mod timeouts {
    /// Default request timeout in seconds
    pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
    /// Maximum reasonable timeout in seconds (24 hours)
    pub const MAX_TIMEOUT_SECONDS: u64 = 86400;
    /// Default delay between request starts in milliseconds (no delay)
    pub const DEFAULT_RATE_LIMIT_MS: u64 = 0;
}

/// Default configuration values
pub mod defaults {
    /// URLs probed per batch progress unit
    pub const CHUNK_SIZE: usize = 10;
    /// Probes in flight inside one chunk
    pub const CONCURRENCY: usize = 1;
    /// Upper bound on candidate values taken per placeholder
    pub const MAX_PARAMETER_VALUES: usize = 100;
    /// Separator joining placeholder values during expansion
    pub const PARAMETER_SEPARATOR: &str = "~~~";
    /// Verify TLS certificates unless told otherwise
    pub const VERIFY_SSL: bool = true;
    /// Redirects are reported, not followed, unless told otherwise
    pub const FOLLOW_REDIRECTS: bool = false;
    /// Config file looked up in the working directory and its parents
    pub const CONFIG_FILE_NAME: &str = ".routeprobe.toml";
    /// Route table used when neither config nor CLI names one
    pub const ROUTES_FILE_NAME: &str = "routes.toml";
}

/// Host platform route names and paths
pub mod routes {
    /// Login route name
    pub const LOGIN_ROUTE: &str = "user.login";
    /// Login path used when the route table has no login route
    pub const LOGIN_PATH: &str = "/user/login";
    /// Prefix of entity routes
    pub const ENTITY_ROUTE_PREFIX: &str = "entity.";
}

/// Messages written to the report sink
pub mod messages {
    /// Emitted once every chunk has been processed
    pub const ALL_ROUTES_TESTED: &str = "All routes were tested.";
    /// Emitted when a run is cancelled before finishing
    pub const RUN_CANCELLED: &str = "Route testing was cancelled.";
    /// Prefix of probe failure lines
    pub const PROBE_FAILURE_PREFIX: &str = "ERR";
}
