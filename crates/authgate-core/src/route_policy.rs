// Route policy: which routes are exempt from authentication
// Decision: Markers are declared up front in a builder, then frozen behind an Arc
// Decision: Handler-level markers (method + pattern) override controller-level scopes (path prefix)
// Decision: Anything not marked is protected

use std::collections::HashMap;

use http::Method;
use thiserror::Error;

/// Whether a route requires authentication
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAccess {
    Public,
    Protected,
}

#[derive(Debug, Error)]
pub enum RoutePolicyError {
    #[error("failed to register route pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: matchit::InsertError,
    },

    #[error("invalid scope prefix '{0}': must start with '/'")]
    InvalidScope(String),
}

/// Frozen route markers, queried once per request
#[derive(Debug, Default)]
pub struct RoutePolicy {
    handlers: HashMap<Method, matchit::Router<RouteAccess>>,
    // (normalized prefix, access), longest prefix first
    scopes: Vec<(String, RouteAccess)>,
}

impl RoutePolicy {
    pub fn builder() -> RoutePolicyBuilder {
        RoutePolicyBuilder::default()
    }

    /// Resolve the marker for a request. Handler-level first, then the most specific scope.
    pub fn resolve(&self, method: &Method, path: &str) -> RouteAccess {
        let path = normalize(path);

        if let Some(access) = self
            .handlers
            .get(method)
            .and_then(|router| router.at(path).ok())
            .map(|matched| *matched.value)
        {
            return access;
        }

        self.scopes
            .iter()
            .find(|(prefix, _)| scope_contains(prefix, path))
            .map(|(_, access)| *access)
            .unwrap_or(RouteAccess::Protected)
    }

    pub fn is_public(&self, method: &Method, path: &str) -> bool {
        self.resolve(method, path) == RouteAccess::Public
    }
}

#[derive(Default)]
pub struct RoutePolicyBuilder {
    handlers: Vec<(Method, String, RouteAccess)>,
    scopes: Vec<(String, RouteAccess)>,
}

impl RoutePolicyBuilder {
    /// Exempt one handler (method + axum-style path) from authentication
    pub fn public_route(mut self, method: Method, path: impl Into<String>) -> Self {
        self.handlers.push((method, path.into(), RouteAccess::Public));
        self
    }

    /// Require authentication on one handler, even inside a public scope
    pub fn protected_route(mut self, method: Method, path: impl Into<String>) -> Self {
        self.handlers.push((method, path.into(), RouteAccess::Protected));
        self
    }

    /// Exempt every route under `prefix`
    pub fn public_scope(mut self, prefix: impl Into<String>) -> Self {
        self.scopes.push((prefix.into(), RouteAccess::Public));
        self
    }

    /// Require authentication on every route under `prefix`
    pub fn protected_scope(mut self, prefix: impl Into<String>) -> Self {
        self.scopes.push((prefix.into(), RouteAccess::Protected));
        self
    }

    pub fn build(self) -> Result<RoutePolicy, RoutePolicyError> {
        let mut handlers: HashMap<Method, matchit::Router<RouteAccess>> = HashMap::new();
        for (method, path, access) in self.handlers {
            let pattern = convert_axum_path_to_matchit(normalize(&path));
            handlers
                .entry(method)
                .or_insert_with(matchit::Router::new)
                .insert(pattern.clone(), access)
                .map_err(|source| RoutePolicyError::InvalidPattern { pattern, source })?;
        }

        let mut scopes: Vec<(String, RouteAccess)> = Vec::with_capacity(self.scopes.len());
        for (prefix, access) in self.scopes {
            if !prefix.starts_with('/') {
                return Err(RoutePolicyError::InvalidScope(prefix));
            }
            let prefix = normalize(&prefix).to_string();
            // Later declarations of the same prefix win
            scopes.retain(|(existing, _)| *existing != prefix);
            scopes.push((prefix, access));
        }
        scopes.sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()));

        Ok(RoutePolicy { handlers, scopes })
    }
}

/// Convert axum path syntax to matchit 0.8 syntax.
///
/// `:id` becomes `{id}` and `*rest` becomes `{*rest}`. Paths already in
/// matchit syntax pass through unchanged.
pub fn convert_axum_path_to_matchit(path: &str) -> String {
    let mut result = String::with_capacity(path.len() + 2);
    let mut chars = path.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == ':' || (ch == '*' && result.ends_with('/')) {
            result.push('{');
            if ch == '*' {
                result.push('*');
            }
            while matches!(chars.peek(), Some(c) if c.is_alphanumeric() || *c == '_') {
                if let Some(c) = chars.next() {
                    result.push(c);
                }
            }
            result.push('}');
        } else {
            result.push(ch);
        }
    }

    result
}

fn normalize(path: &str) -> &str {
    match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    }
}

/// Segment-aware prefix match: `/v1/auth` contains `/v1/auth/x` but not `/v1/authz`
fn scope_contains(prefix: &str, path: &str) -> bool {
    if prefix == "/" {
        return true;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
