use std::collections::VecDeque;

use crate::core::error::Result;
use crate::core::types::{ConcreteUrl, RouteCollection};
use crate::discovery::handler::UrlIter;
use crate::discovery::registry::RouteHandlerRegistry;
use crate::discovery::source::RouteSource;

/// Pulls routes from a source and streams concrete URLs through the
/// registered handlers.
pub struct RouteListBuilder<'a> {
    source: &'a dyn RouteSource,
    registry: &'a RouteHandlerRegistry,
}

impl<'a> RouteListBuilder<'a> {
    pub fn new(source: &'a dyn RouteSource, registry: &'a RouteHandlerRegistry) -> Self {
        Self { source, registry }
    }

    /// URLs for one named route, or for every route when `route_name` is `None`.
    ///
    /// A name that does not exist returns `RouteNotFound`.
    pub fn build_route_list(&self, route_name: Option<&str>) -> Result<RouteList<'a>> {
        let routes = match route_name {
            Some(name) => vec![self.source.route_by_name(name)?],
            None => self.source.all_routes(),
        };

        let route_count = routes.len();
        let partition = self.registry.partition(routes);
        log::debug!(
            "Partitioned {route_count} route(s) into {} handler group(s), {} skipped",
            partition.groups.len(),
            partition.skipped.len()
        );

        Ok(RouteList {
            registry: self.registry,
            groups: partition.groups.into(),
            current: None,
            skipped: partition.skipped,
        })
    }
}

/// Single-pass, lazy stream of concrete URLs.
///
/// A handler's URL iterator is only created once the previous group is
/// exhausted, and each URL is produced only when pulled.
pub struct RouteList<'a> {
    registry: &'a RouteHandlerRegistry,
    groups: VecDeque<(usize, RouteCollection)>,
    current: Option<UrlIter<'a>>,
    skipped: Vec<String>,
}

impl RouteList<'_> {
    /// Names of routes no handler claimed.
    pub fn skipped_routes(&self) -> &[String] {
        &self.skipped
    }
}

impl Iterator for RouteList<'_> {
    type Item = ConcreteUrl;

    fn next(&mut self) -> Option<ConcreteUrl> {
        loop {
            if let Some(urls) = self.current.as_mut() {
                for url in urls.by_ref() {
                    if !url.is_empty() {
                        return Some(url);
                    }
                }
                self.current = None;
            }

            let (index, collection) = self.groups.pop_front()?;
            if let Some(handler) = self.registry.handler(index) {
                log::debug!(
                    "Expanding {} route(s) with the {} handler",
                    collection.len(),
                    handler.name()
                );
                self.current = Some(handler.urls(collection));
            }
        }
    }
}
