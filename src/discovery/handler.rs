//! Route handlers: strategies that recognize a class of routes and expand
//! them into concrete URLs.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::core::constants::{defaults, routes as route_names};
use crate::core::error::{Result, RouteProbeError};
use crate::core::types::{ConcreteUrl, Route, RouteCollection};
use crate::discovery::expander::expand;
use crate::discovery::render::UrlRenderer;
use crate::discovery::source::ParameterCatalog;

/// Lazily produced URLs for one handler group.
pub type UrlIter<'a> = Box<dyn Iterator<Item = ConcreteUrl> + 'a>;

pub trait RouteHandler: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Whether this handler owns `route`. Must be free of side effects.
    fn applies(&self, route: &Route) -> bool;

    /// Expand the claimed routes. Routes that cannot be resolved yield nothing.
    fn urls<'a>(&'a self, routes: RouteCollection) -> UrlIter<'a>;
}

/// Shared, read-only inputs of the shipped handlers.
#[derive(Debug, Clone)]
pub struct HandlerContext {
    catalog: ParameterCatalog,
    renderer: UrlRenderer,
    max_values: usize,
}

impl HandlerContext {
    pub fn new(catalog: ParameterCatalog, renderer: UrlRenderer, max_values: usize) -> Result<Self> {
        if max_values == 0 {
            return Err(RouteProbeError::Config(
                "Maximum parameter values cannot be 0. Expected a positive integer.".to_string(),
            ));
        }

        Ok(Self {
            catalog,
            renderer,
            max_values,
        })
    }

    pub fn catalog(&self) -> &ParameterCatalog {
        &self.catalog
    }

    pub fn renderer(&self) -> &UrlRenderer {
        &self.renderer
    }

    fn bounded(&self, values: &[String]) -> Vec<String> {
        values.iter().take(self.max_values).cloned().collect()
    }

    /// Candidate values for a placeholder that is not an entity ID.
    fn parameter_values(&self, route: &Route, placeholder: &str) -> Vec<String> {
        let values = self.catalog.parameter_values(placeholder);
        if !values.is_empty() {
            return self.bounded(values);
        }

        route
            .defaults
            .get(placeholder)
            .map(|value| vec![value.clone()])
            .unwrap_or_default()
    }

    /// Expand `route` over `value_lists` and render each combination.
    fn render_combinations(
        &self,
        route: &Route,
        value_lists: Vec<(&str, Vec<String>)>,
    ) -> Vec<ConcreteUrl> {
        if let Some((placeholder, _)) = value_lists.iter().find(|(_, values)| values.is_empty()) {
            log::debug!(
                "Skipping {}: no values available for {{{placeholder}}}.",
                route.name
            );
            return Vec::new();
        }

        if value_lists.is_empty() {
            return self.renderer.render(route, &BTreeMap::new()).into_iter().collect();
        }

        let separator = defaults::PARAMETER_SEPARATOR;
        expand(separator, &value_lists)
            .iter()
            .filter_map(|combination| {
                let values: Vec<&str> = combination.split(separator).collect();
                if values.len() != value_lists.len() {
                    log::debug!(
                        "Skipping {}: value combination '{combination}' is ambiguous.",
                        route.name
                    );
                    return None;
                }

                let params: BTreeMap<&str, &str> = value_lists
                    .iter()
                    .map(|(placeholder, _)| *placeholder)
                    .zip(values)
                    .collect();
                self.renderer.render(route, &params)
            })
            .collect()
    }
}

/// Entity routes (`entity.*` with an entity type), expanded over entity IDs.
pub struct EntityRouteHandler {
    context: Arc<HandlerContext>,
}

impl EntityRouteHandler {
    pub fn new(context: Arc<HandlerContext>) -> Self {
        Self { context }
    }

    fn route_urls(&self, route: &Route) -> Vec<ConcreteUrl> {
        let entity_type = route.entity_type.as_deref().unwrap_or_default();
        let value_lists = route
            .placeholders()
            .into_iter()
            .map(|placeholder| {
                let values = if placeholder == entity_type {
                    self.context.bounded(self.context.catalog.entity_ids(entity_type))
                } else {
                    self.context.parameter_values(route, placeholder)
                };
                (placeholder, values)
            })
            .collect();

        self.context.render_combinations(route, value_lists)
    }
}

impl RouteHandler for EntityRouteHandler {
    fn name(&self) -> &str {
        "entity"
    }

    fn applies(&self, route: &Route) -> bool {
        route.allows_get()
            && route.name.starts_with(route_names::ENTITY_ROUTE_PREFIX)
            && route
                .entity_type
                .as_deref()
                .is_some_and(|entity_type| route.placeholders().contains(&entity_type))
    }

    fn urls<'a>(&'a self, routes: RouteCollection) -> UrlIter<'a> {
        Box::new(
            routes
                .into_iter()
                .flat_map(move |route| self.route_urls(&route)),
        )
    }
}

/// Any GET route with placeholders, expanded over catalog values or defaults.
pub struct ParameterizedRouteHandler {
    context: Arc<HandlerContext>,
}

impl ParameterizedRouteHandler {
    pub fn new(context: Arc<HandlerContext>) -> Self {
        Self { context }
    }

    fn route_urls(&self, route: &Route) -> Vec<ConcreteUrl> {
        let value_lists = route
            .placeholders()
            .into_iter()
            .map(|placeholder| (placeholder, self.context.parameter_values(route, placeholder)))
            .collect();

        self.context.render_combinations(route, value_lists)
    }
}

impl RouteHandler for ParameterizedRouteHandler {
    fn name(&self) -> &str {
        "parameterized"
    }

    fn applies(&self, route: &Route) -> bool {
        route.allows_get() && route.has_placeholders()
    }

    fn urls<'a>(&'a self, routes: RouteCollection) -> UrlIter<'a> {
        Box::new(
            routes
                .into_iter()
                .flat_map(move |route| self.route_urls(&route)),
        )
    }
}

/// GET routes without placeholders; each yields exactly one URL.
pub struct StaticRouteHandler {
    context: Arc<HandlerContext>,
}

impl StaticRouteHandler {
    pub fn new(context: Arc<HandlerContext>) -> Self {
        Self { context }
    }
}

impl RouteHandler for StaticRouteHandler {
    fn name(&self) -> &str {
        "static"
    }

    fn applies(&self, route: &Route) -> bool {
        route.allows_get() && !route.has_placeholders()
    }

    fn urls<'a>(&'a self, routes: RouteCollection) -> UrlIter<'a> {
        Box::new(
            routes
                .into_iter()
                .filter_map(move |route| self.context.renderer.render(&route, &BTreeMap::new())),
        )
    }
}
