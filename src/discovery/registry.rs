use std::sync::Arc;

use crate::core::types::{Route, RouteCollection};
use crate::discovery::handler::{
    EntityRouteHandler, HandlerContext, ParameterizedRouteHandler, RouteHandler,
    StaticRouteHandler,
};

/// Ordered route handlers. The first handler whose `applies` returns true
/// claims a route; routes no handler claims are skipped.
#[derive(Default)]
pub struct RouteHandlerRegistry {
    handlers: Vec<Box<dyn RouteHandler>>,
}

/// Routes grouped by claiming handler, plus the ones nobody claimed.
#[derive(Debug, Default)]
pub struct Partition {
    /// `(handler index, routes)` in handler registration order
    pub groups: Vec<(usize, RouteCollection)>,
    /// Names of routes no handler claimed, in discovery order
    pub skipped: Vec<String>,
}

impl RouteHandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entity, parameterized and static handlers, most specific first.
    pub fn with_default_handlers(context: Arc<HandlerContext>) -> Self {
        Self::new()
            .with_handler(EntityRouteHandler::new(context.clone()))
            .with_handler(ParameterizedRouteHandler::new(context.clone()))
            .with_handler(StaticRouteHandler::new(context))
    }

    pub fn with_handler<H: RouteHandler + 'static>(mut self, handler: H) -> Self {
        self.register(handler);
        self
    }

    pub fn register<H: RouteHandler + 'static>(&mut self, handler: H) {
        self.handlers.push(Box::new(handler));
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn handler(&self, index: usize) -> Option<&dyn RouteHandler> {
        self.handlers.get(index).map(|handler| handler.as_ref())
    }

    pub fn names(&self) -> Vec<&str> {
        self.handlers.iter().map(|handler| handler.name()).collect()
    }

    /// Index of the first handler that applies to `route`.
    pub fn resolve(&self, route: &Route) -> Option<usize> {
        self.handlers
            .iter()
            .position(|handler| handler.applies(route))
    }

    /// Group `routes` by claiming handler, keeping discovery order within
    /// each group.
    pub fn partition<I: IntoIterator<Item = Route>>(&self, routes: I) -> Partition {
        let mut collections: Vec<Option<RouteCollection>> = vec![None; self.handlers.len()];
        let mut skipped = Vec::new();

        for route in routes {
            match self.resolve(&route) {
                Some(index) => collections[index]
                    .get_or_insert_with(RouteCollection::new)
                    .add(route),
                None => {
                    log::debug!("No handler applies to {}, skipping.", route.name);
                    skipped.push(route.name);
                }
            }
        }

        let groups = collections
            .into_iter()
            .enumerate()
            .filter_map(|(index, collection)| collection.map(|c| (index, c)))
            .collect();

        Partition { groups, skipped }
    }
}
