use crate::error::{ComponentTagError, Result};
use regex::Regex;
use semver::Version;

/// Tag naming scheme for a single component: `<name>-v<version>`
#[derive(Debug, Clone)]
pub struct ComponentTagPattern {
    component: String,
    matcher: Regex,
}

impl ComponentTagPattern {
    /// Build the pattern for `component`.
    ///
    /// The component name is escaped and the match is anchored at both ends,
    /// so `api` never claims `api2-v1.0.0` or `old-api-v1.0.0`.
    pub fn new(component: impl Into<String>) -> Result<Self> {
        let component = component.into();
        let matcher = Regex::new(&format!("^{}-v(.+)$", regex::escape(&component)))
            .map_err(|e| ComponentTagError::tag(format!("Invalid tag pattern: {}", e)))?;

        Ok(ComponentTagPattern { component, matcher })
    }

    /// Format a version as this component's tag.
    /// Example: component="component1", version="2.0.0" -> "component1-v2.0.0"
    pub fn format(&self, version: &Version) -> String {
        format!("{}-v{}", self.component, version)
    }

    /// Version part of `tag` if it belongs to this component
    pub fn version_of<'a>(&self, tag: &'a str) -> Option<&'a str> {
        self.matcher
            .captures(tag)
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str())
    }
}
