//! Route sources: the host platform's route registry, and a file-backed table.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::core::error::{Result, RouteProbeError};
use crate::core::types::Route;

/// Read access to the registered routes.
pub trait RouteSource {
    /// All routes in registration order.
    fn all_routes(&self) -> Vec<Route>;

    /// A single route, or `RouteNotFound`.
    fn route_by_name(&self, name: &str) -> Result<Route>;
}

/// Candidate values for placeholders, keyed by entity type or placeholder name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterCatalog {
    /// Entity IDs per entity type
    #[serde(default)]
    pub entities: BTreeMap<String, Vec<String>>,
    /// Values per placeholder name
    #[serde(default)]
    pub parameters: BTreeMap<String, Vec<String>>,
}

impl ParameterCatalog {
    pub fn entity_ids(&self, entity_type: &str) -> &[String] {
        self.entities
            .get(entity_type)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn parameter_values(&self, name: &str) -> &[String] {
        self.parameters
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn with_entity_ids<I, S>(mut self, entity_type: &str, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entities
            .insert(entity_type.to_string(), ids.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_parameter_values<I, S>(mut self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parameters
            .insert(name.to_string(), values.into_iter().map(Into::into).collect());
        self
    }
}

#[derive(Debug, Deserialize)]
struct RouteTableFile {
    #[serde(default)]
    routes: Vec<Route>,
    #[serde(flatten)]
    catalog: ParameterCatalog,
}

/// Route table exported from the host platform, loaded from TOML or JSON.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
    index: FxHashMap<String, usize>,
    catalog: ParameterCatalog,
}

impl RouteTable {
    /// Build a table, rejecting empty and duplicate route names.
    pub fn new(routes: Vec<Route>, catalog: ParameterCatalog) -> Result<Self> {
        let mut index = FxHashMap::with_capacity_and_hasher(routes.len(), Default::default());

        for (position, route) in routes.iter().enumerate() {
            if route.name.trim().is_empty() {
                return Err(RouteProbeError::Config(format!(
                    "Route #{} has an empty name.",
                    position + 1
                )));
            }
            if route.path.trim().is_empty() {
                return Err(RouteProbeError::Config(format!(
                    "Route '{}' has an empty path.",
                    route.name
                )));
            }
            if index.insert(route.name.clone(), position).is_some() {
                return Err(RouteProbeError::Config(format!(
                    "Route '{}' is defined more than once.",
                    route.name
                )));
            }
        }

        Ok(Self {
            routes,
            index,
            catalog,
        })
    }

    /// Load a route table; `.json` files are parsed as JSON, anything else as TOML.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(RouteProbeError::FileNotFound(path.display().to_string()));
        }

        let content = fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let file: RouteTableFile = if is_json {
            serde_json::from_str(&content)?
        } else {
            toml::from_str(&content)?
        };

        log::debug!(
            "Loaded {} route(s) from '{}'",
            file.routes.len(),
            path.display()
        );

        Self::new(file.routes, file.catalog)
    }

    pub fn catalog(&self) -> &ParameterCatalog {
        &self.catalog
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl RouteSource for RouteTable {
    fn all_routes(&self) -> Vec<Route> {
        self.routes.clone()
    }

    fn route_by_name(&self, name: &str) -> Result<Route> {
        self.index
            .get(name)
            .map(|&position| self.routes[position].clone())
            .ok_or_else(|| RouteProbeError::RouteNotFound(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const TABLE_TOML: &str = r#"
[[routes]]
name = "system.front"
path = "/"

[[routes]]
name = "entity.node.canonical"
path = "/node/{node}"
entity_type = "node"

[[routes]]
name = "user.logout"
path = "/user/logout"
methods = ["POST"]

[entities]
node = ["1", "2"]

[parameters]
tid = ["5"]
"#;

    #[test]
    fn test_load_toml_route_table() -> Result<()> {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile()?;
        file.write_all(TABLE_TOML.as_bytes())?;

        let table = RouteTable::load_from_file(file.path())?;
        let names: Vec<String> = table.all_routes().into_iter().map(|r| r.name).collect();

        assert_eq!(
            names,
            vec!["system.front", "entity.node.canonical", "user.logout"]
        );
        assert_eq!(table.catalog().entity_ids("node"), ["1", "2"]);
        assert_eq!(table.catalog().parameter_values("tid"), ["5"]);
        assert_eq!(
            table.route_by_name("entity.node.canonical")?.entity_type,
            Some("node".to_string())
        );
        Ok(())
    }

    #[test]
    fn test_load_json_route_table() -> Result<()> {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile()?;
        file.write_all(
            br#"{"routes": [{"name": "node.add", "path": "/node/add/{node_type}"}],
                "parameters": {"node_type": ["article", "page"]}}"#,
        )?;

        let table = RouteTable::load_from_file(file.path())?;
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.catalog().parameter_values("node_type"),
            ["article", "page"]
        );
        Ok(())
    }

    #[test]
    fn test_route_by_name_missing() {
        let table = RouteTable::new(vec![Route::new("a", "/a")], ParameterCatalog::default())
            .unwrap();

        match table.route_by_name("missing.route") {
            Err(RouteProbeError::RouteNotFound(name)) => assert_eq!(name, "missing.route"),
            other => panic!("Expected RouteNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_route_names_rejected() {
        let result = RouteTable::new(
            vec![Route::new("a", "/a"), Route::new("a", "/b")],
            ParameterCatalog::default(),
        );
        assert!(matches!(result, Err(RouteProbeError::Config(_))));
    }

    #[test]
    fn test_empty_route_path_rejected() {
        let result = RouteTable::new(vec![Route::new("a", " ")], ParameterCatalog::default());
        assert!(matches!(result, Err(RouteProbeError::Config(_))));
    }

    #[test]
    fn test_missing_route_file() {
        let result = RouteTable::load_from_file("definitely-not-here-routes.toml");
        assert!(matches!(result, Err(RouteProbeError::FileNotFound(_))));
    }

    #[test]
    fn test_missing_catalog_lookups_are_empty() {
        let catalog = ParameterCatalog::default();
        assert!(catalog.entity_ids("node").is_empty());
        assert!(catalog.parameter_values("nid").is_empty());
    }
}
