use std::fmt;

/// Conditions at the edges of a component's history.
/// These are non-fatal issues that should be reported to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryWarning {
    /// The newest commit touching the component is already tagged
    NoUnreleasedCommits { component: String, latest_tag: String },
    /// Nothing in the history touches the component path
    NoCommitsForPath { path: String },
    /// A commit is tagged, but for another component
    ForeignTag { tag: String, commit: String },
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::NoUnreleasedCommits {
                component,
                latest_tag,
            } => write!(
                f,
                "No commits for '{}' since tag '{}', a new minor release will still be tagged",
                component, latest_tag
            ),
            BoundaryWarning::NoCommitsForPath { path } => {
                write!(f, "No commits touch '{}', using the starting version", path)
            }
            BoundaryWarning::ForeignTag { tag, commit } => {
                write!(
                    f,
                    "Commit {} is tagged '{}' for another component",
                    short_hash(commit),
                    tag
                )
            }
        }
    }
}

/// First seven characters of a commit id
pub fn short_hash(commit: &str) -> &str {
    commit.get(..7).unwrap_or(commit)
}
