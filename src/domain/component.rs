/// Separator enforced at the end of component paths
pub const PATH_SEPARATOR: char = '/';

/// A monorepo subdirectory released on its own tag line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub name: String,
    pub path: String,
}

impl Component {
    pub fn new(name: impl Into<String>, path: impl AsRef<str>) -> Self {
        Component {
            name: name.into(),
            path: normalize_component_path(path.as_ref()),
        }
    }
}

/// Append a trailing `/` when missing. Idempotent.
pub fn normalize_component_path(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.ends_with(PATH_SEPARATOR) {
        trimmed.to_string()
    } else {
        format!("{}{}", trimmed, PATH_SEPARATOR)
    }
}
