//! Version derivation from commit history

pub mod version_deriver;

pub use version_deriver::{bump_label, ClassifiedCommit, Derivation, VersionDeriver};
