//! Domain logic - pure versioning rules independent of git operations

pub mod bump;
pub mod component;
pub mod tag;
pub mod version;

pub use bump::{marker_level, BumpLevel};
pub use component::{normalize_component_path, Component};
pub use tag::ComponentTagPattern;
pub use version::{increment, normalize_starting_version, VersionBump};
