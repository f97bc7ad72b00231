//! Result of deploying an application.
//!
//! Populated by a caller-supplied extractor from the deploy command's output.
//! The orchestrator passes it through without looking at the fields.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppMetadata {
    /// Application name.
    pub name: String,
    /// Base URL the application is served from.
    pub base: String,
    /// Routes reported by the application.
    pub app_routes: Vec<AppRoute>,
    /// Deployed version, empty when the deploy flavor does not version apps.
    pub version: String,
}

/// One named route of a deployed application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppRoute {
    pub name: String,
    pub route_url: String,
}

impl AppMetadata {
    /// Metadata for `name` served at `base`, without routes.
    pub fn new(name: impl Into<String>, base: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base: base.into(),
            ..Default::default()
        }
    }

    pub fn with_route(mut self, name: impl Into<String>, route_url: impl Into<String>) -> Self {
        self.app_routes.push(AppRoute {
            name: name.into(),
            route_url: route_url.into(),
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::AppMetadata;

    #[test]
    fn routes_are_kept_in_insertion_order() {
        let meta = AppMetadata::new("hello", "http://127.0.0.1:3000")
            .with_route("hello", "http://127.0.0.1:3000/hello")
            .with_route("static", "http://127.0.0.1:3000/static/...");

        assert_eq!(meta.app_routes.len(), 2);
        assert_eq!(meta.app_routes[0].name, "hello");
        assert_eq!(meta.app_routes[1].name, "static");
        assert!(meta.version.is_empty());
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let meta = AppMetadata::new("hello", "http://x").with_route("r", "http://x/r");
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["appRoutes"][0]["routeUrl"], "http://x/r");
    }
}
