//! Route discovery and expansion
//!
//! This module turns the host platform's registered routes into concrete
//! URLs: route sources, parameter expansion, handlers and their registry,
//! and the lazy route list builder.

pub mod builder;
pub mod expander;
pub mod handler;
pub mod registry;
pub mod render;
pub mod source;

// Re-export commonly used items
pub use builder::{RouteList, RouteListBuilder};
pub use expander::{combination_count, expand};
pub use handler::{
    EntityRouteHandler, HandlerContext, ParameterizedRouteHandler, RouteHandler,
    StaticRouteHandler, UrlIter,
};
pub use registry::{Partition, RouteHandlerRegistry};
pub use render::UrlRenderer;
pub use source::{ParameterCatalog, RouteSource, RouteTable};
