use reqwest::Url;

use std::collections::BTreeMap;

use crate::core::error::{Result, RouteProbeError};
use crate::core::types::{ConcreteUrl, Route};

/// Turns a route plus placeholder values into a concrete URL.
///
/// Without a base URL the rendered path is returned as-is; with one, the
/// result is an absolute URL normalized by `reqwest::Url`.
#[derive(Debug, Clone, Default)]
pub struct UrlRenderer {
    base_url: Option<Url>,
}

impl UrlRenderer {
    pub fn new(base_url: Option<&str>) -> Result<Self> {
        let base_url = match base_url {
            Some(raw) => {
                let url = Url::parse(raw).map_err(|e| {
                    RouteProbeError::Config(format!("Invalid base URL '{raw}': {e}"))
                })?;
                if url.cannot_be_a_base() {
                    return Err(RouteProbeError::Config(format!(
                        "Base URL '{raw}' cannot be used as a base."
                    )));
                }
                Some(url)
            }
            None => None,
        };

        Ok(Self { base_url })
    }

    pub fn relative() -> Self {
        Self::default()
    }

    pub fn is_absolute(&self) -> bool {
        self.base_url.is_some()
    }

    /// Render `route` with `params`; `None` when a placeholder lacks a value
    /// or the result is not a valid URL.
    pub fn render(&self, route: &Route, params: &BTreeMap<&str, &str>) -> Option<ConcreteUrl> {
        let path = route.render_path(params)?;

        let Some(ref base) = self.base_url else {
            return Some(ConcreteUrl::new(path));
        };

        let joined = format!(
            "{}/{}",
            base.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );

        match Url::parse(&joined) {
            Ok(url) => Some(ConcreteUrl::new(url.to_string())),
            Err(e) => {
                log::debug!("Skipping {}: Error generating url ({e}).", route.name);
                None
            }
        }
    }
}
