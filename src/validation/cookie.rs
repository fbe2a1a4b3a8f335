use reqwest::Url;
use reqwest::cookie::Jar;

use std::fmt;
use std::sync::Arc;

use crate::core::error::{Result, RouteProbeError};

/// A cookie supplied on the command line, in `Set-Cookie` syntax
/// (`name=value; Domain=example.com; Path=/`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCookie {
    name: String,
    value: String,
    attributes: Vec<(String, Option<String>)>,
}

impl SessionCookie {
    pub fn parse(raw: &str) -> Result<Self> {
        let mut parts = raw.split(';').map(str::trim);

        let pair = parts.next().unwrap_or_default();
        if pair.is_empty() {
            return Err(RouteProbeError::InvalidCookie(
                "cookie string has no name=value pair".to_string(),
            ));
        }
        let (name, value) = pair.split_once('=').ok_or_else(|| {
            RouteProbeError::InvalidCookie(format!("'{pair}' is not a name=value pair"))
        })?;

        let name = name.trim();
        if name.is_empty() {
            return Err(RouteProbeError::InvalidCookie(
                "cookie name cannot be empty".to_string(),
            ));
        }
        if name
            .chars()
            .any(|c| c.is_control() || c.is_whitespace() || "()<>@,;:\\\"/[]?={}".contains(c))
        {
            return Err(RouteProbeError::InvalidCookie(format!(
                "cookie name '{name}' contains invalid characters"
            )));
        }

        let attributes = parts
            .filter(|part| !part.is_empty())
            .map(|attribute| match attribute.split_once('=') {
                Some((key, value)) => (key.trim().to_string(), Some(value.trim().to_string())),
                None => (attribute.to_string(), None),
            })
            .collect();

        Ok(Self {
            name: name.to_string(),
            value: value.trim().to_string(),
            attributes,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Value of a cookie attribute, matched case-insensitively.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(key))
            .and_then(|(_, value)| value.as_deref())
    }

    /// A fresh cookie store holding only this cookie, scoped to `url`.
    pub fn jar_for(&self, url: &Url) -> Arc<Jar> {
        let jar = Jar::default();
        jar.add_cookie_str(&self.to_string(), url);
        Arc::new(jar)
    }
}

impl fmt::Display for SessionCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)?;
        for (key, value) in &self.attributes {
            match value {
                Some(value) => write!(f, "; {key}={value}")?,
                None => write!(f, "; {key}")?,
            }
        }
        Ok(())
    }
}
