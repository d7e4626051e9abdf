use super::derive::{derive_pattern, verb_prefix, DEFAULT_SEPARATOR, DEFAULT_VERBS};
use super::pattern::{split_path, Captures, RoutePattern, Token};
use crate::config::RouterConfig;
use crate::dispatcher::Exchange;
use crate::error::RegistrationError;
use crate::server::Response;
use crate::signature::{classify, ClassifyOptions, HandlerPlan};
use crate::typed::{erase, BoxedHandler, Handler};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Raw handler for requests no route matches.
pub type DefaultHandler<S> = Arc<dyn Fn(&S, &mut Exchange) -> Response + Send + Sync>;

/// A pattern bound to a classified handler. Immutable once built.
pub struct Route<S> {
    pattern: RoutePattern,
    name: String,
    plan: Arc<HandlerPlan>,
    handler: BoxedHandler<S>,
}

impl<S> Route<S> {
    #[must_use]
    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    /// Name of the handler method the route was registered for.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn plan(&self) -> &HandlerPlan {
        &self.plan
    }

    pub(crate) fn handler(&self) -> &BoxedHandler<S> {
        &self.handler
    }
}

impl<S> Clone for Route<S> {
    fn clone(&self) -> Self {
        Self {
            pattern: self.pattern.clone(),
            name: self.name.clone(),
            plan: Arc::clone(&self.plan),
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<S> fmt::Debug for Route<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("pattern", &self.pattern.to_string())
            .field("name", &self.name)
            .field("plan", &self.plan)
            .finish_non_exhaustive()
    }
}

/// Result of a successful lookup.
#[derive(Debug)]
pub struct RouteMatch<'a, S> {
    pub route: &'a Route<S>,
    pub captures: Captures,
}

/// Ordered list of routes plus an optional fallback.
///
/// Lookup is a linear scan in registration order and the first full match
/// wins. Routes are never ranked by specificity.
pub struct RouteTable<S> {
    routes: Vec<Route<S>>,
    default: Option<DefaultHandler<S>>,
}

impl<S> RouteTable<S> {
    #[must_use]
    pub fn routes(&self) -> &[Route<S>] {
        &self.routes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    #[must_use]
    pub fn default_handler(&self) -> Option<&DefaultHandler<S>> {
        self.default.as_ref()
    }

    /// Find the first route matching `method` and `path`.
    #[must_use]
    pub fn find(&self, method: &str, path: &str) -> Option<RouteMatch<'_, S>> {
        // RT1: route match attempt
        debug!(method = %method, path = %path, "Route match attempt");
        let segments = split_path(path);
        for route in &self.routes {
            if let Some(captures) = route.pattern.matches(method, &segments) {
                // RT2: route matched
                debug!(
                    method = %method,
                    path = %path,
                    handler_name = %route.name,
                    route_pattern = %route.pattern,
                    captures = ?captures,
                    "Route matched"
                );
                return Some(RouteMatch { route, captures });
            }
        }
        // RT3: no route
        debug!(method = %method, path = %path, "No route matched");
        None
    }

    /// One line per route, `"<pattern> -> <name>"`, in lookup order.
    #[must_use]
    pub fn describe(&self) -> Vec<String> {
        self.routes
            .iter()
            .map(|r| format!("{} -> {}", r.pattern, r.name))
            .collect()
    }
}

impl<S> Clone for RouteTable<S> {
    fn clone(&self) -> Self {
        Self {
            routes: self.routes.clone(),
            default: self.default.clone(),
        }
    }
}

impl<S> fmt::Debug for RouteTable<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteTable")
            .field("routes", &self.routes)
            .field("has_default", &self.default.is_some())
            .finish()
    }
}

/// Builds a [`RouteTable`] for service type `S`.
///
/// ```rust,ignore
/// let table = RouterBuilder::new()
///     .prefix("/v1")
///     .method("PostFoo_Bar", Service::post_foo_bar)?
///     .route("GET /status", "GetStatus", Service::get_status)?
///     .build();
/// ```
pub struct RouterBuilder<S> {
    separator: String,
    prefix: Vec<Token>,
    verbs: Vec<String>,
    options: ClassifyOptions,
    routes: Vec<Route<S>>,
    default: Option<DefaultHandler<S>>,
}

impl<S> fmt::Debug for RouterBuilder<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouterBuilder")
            .field("separator", &self.separator)
            .field("prefix", &self.prefix)
            .field("verbs", &self.verbs)
            .field("routes", &self.routes)
            .finish_non_exhaustive()
    }
}

impl<S: 'static> Default for RouterBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: 'static> RouterBuilder<S> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR.to_string(),
            prefix: Vec::new(),
            verbs: DEFAULT_VERBS.iter().map(|v| (*v).to_string()).collect(),
            options: ClassifyOptions::default(),
            routes: Vec::new(),
            default: None,
        }
    }

    /// Builder preset from a loaded [`RouterConfig`].
    #[must_use]
    pub fn from_config(config: &RouterConfig) -> Self {
        let mut builder = Self::new()
            .separator(&config.separator)
            .permissive(config.permissive);
        if let Some(prefix) = &config.pattern_prefix {
            builder = builder.prefix(prefix);
        }
        if let Some(verbs) = &config.verbs {
            builder = builder.verbs(verbs.iter().map(String::as_str));
        }
        builder
    }

    /// Separator marking a wildcard in method names. Empty disables wildcards.
    #[must_use]
    pub fn separator(mut self, sep: &str) -> Self {
        self.separator = sep.to_string();
        self
    }

    /// Path prefix such as `/v1`, inserted right after the verb of every
    /// route registered afterwards.
    #[must_use]
    pub fn prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix
            .strip_prefix('/')
            .unwrap_or(prefix)
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| if s == "*" { Token::Wildcard } else { Token::literal(s) })
            .collect();
        self
    }

    /// Verb prefixes accepted by [`RouterBuilder::method`].
    #[must_use]
    pub fn verbs<'a>(mut self, verbs: impl IntoIterator<Item = &'a str>) -> Self {
        self.verbs = verbs.into_iter().map(str::to_string).collect();
        self
    }

    /// Accept structured arguments received by value.
    #[must_use]
    pub fn permissive(mut self, permissive: bool) -> Self {
        self.options.permissive = permissive;
        self
    }

    /// Register `handler` under the route derived from `name`.
    ///
    /// `PostFoo_Bar` becomes `POST /foo/*/bar`: the verb prefix gives the
    /// verb and the rest of the name gives the path.
    pub fn method<M, H>(mut self, name: &str, handler: H) -> Result<Self, RegistrationError>
    where
        H: Handler<S, M>,
    {
        let verb = verb_prefix(name)
            .filter(|v| self.verbs.iter().any(|known| known == v))
            .ok_or_else(|| {
                warn!(method = %name, verbs = ?self.verbs, "Method has no known verb prefix");
                RegistrationError::UnknownVerbPrefix(name.to_string())
            })?;
        let mut tokens = self.prefix.clone();
        tokens.extend(derive_pattern(&name[verb.len()..], &self.separator));
        let pattern = RoutePattern::new(verb.to_ascii_uppercase(), tokens);
        self.install(pattern, name, handler)?;
        Ok(self)
    }

    /// Register `handler` under an explicit route spec such as
    /// `"POST /servers/*/action"`.
    pub fn route<M, H>(mut self, spec: &str, name: &str, handler: H) -> Result<Self, RegistrationError>
    where
        H: Handler<S, M>,
    {
        let parsed = RoutePattern::parse(spec)?;
        let mut tokens = self.prefix.clone();
        tokens.extend_from_slice(parsed.tokens());
        let pattern = RoutePattern::new(parsed.verb(), tokens);
        self.install(pattern, name, handler)?;
        Ok(self)
    }

    /// Fallback for requests no route matches.
    #[must_use]
    pub fn default_handler<F>(mut self, f: F) -> Self
    where
        F: Fn(&S, &mut Exchange) -> Response + Send + Sync + 'static,
    {
        self.default = Some(Arc::new(f));
        self
    }

    fn install<M, H>(&mut self, pattern: RoutePattern, name: &str, handler: H) -> Result<(), RegistrationError>
    where
        H: Handler<S, M>,
    {
        let plan = classify(name, &H::signature(), &self.options)?;
        // RT0: route installed
        info!(route_pattern = %pattern, handler_name = %name, "Install route");
        self.routes.push(Route {
            pattern,
            name: name.to_string(),
            plan: Arc::new(plan),
            handler: erase(handler),
        });
        Ok(())
    }

    #[must_use]
    pub fn build(self) -> RouteTable<S> {
        let routes_summary: Vec<String> = self
            .routes
            .iter()
            .take(10)
            .map(|r| r.pattern.to_string())
            .collect();
        info!(
            routes_count = self.routes.len(),
            has_default = self.default.is_some(),
            routes_summary = ?routes_summary,
            "Routing table loaded"
        );
        RouteTable {
            routes: self.routes,
            default: self.default,
        }
    }
}
