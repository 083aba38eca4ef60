//! Git operations abstraction layer
//!
//! The deriver only needs five questions answered by a repository, so they
//! are gathered in the [Repository] trait. Two implementations exist:
//!
//! - [repository::Git2Repository]: a real repository opened with `git2`
//! - [mock::MockRepository]: an in-memory history for tests
//!
//! ```rust
//! # use component_tag::git::Repository;
//! # fn example<R: Repository>(repo: &R) -> component_tag::Result<()> {
//! for commit in repo.list_commits_affecting("services/api/")? {
//!     let tags = repo.resolve_exact_tags(&commit)?;
//!     if tags.is_empty() {
//!         println!("{}: {}", commit, repo.commit_message(&commit)?);
//!     } else {
//!         println!("{} is tagged {}", commit, tags.join(", "));
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use crate::error::Result;

/// Repository operations consumed by version derivation and tagging.
///
/// Commit identifiers are opaque strings (full hex object ids for git).
pub trait Repository {
    /// Commits reachable from `HEAD` that changed something under `path`.
    ///
    /// Returned newest first. `path` ends with `/`; a bare `/` or `./`
    /// selects every commit.
    fn list_commits_affecting(&self, path: &str) -> Result<Vec<String>>;

    /// Every tag naming exactly this commit, best candidate first.
    ///
    /// Several components may tag the same commit, so all of them are
    /// returned and the caller picks.
    ///
    /// # Returns
    /// * `Ok(tags)` - Tags pointing at the commit, empty when it is untagged
    /// * `Err` - The repository could not be read
    fn resolve_exact_tags(&self, commit: &str) -> Result<Vec<String>>;

    /// Full message of a commit
    fn commit_message(&self, commit: &str) -> Result<String>;

    /// Create an annotated tag `name` at `HEAD`
    fn create_annotated_tag(&self, name: &str, message: &str) -> Result<()>;

    /// Push the tag `name` to `remote`
    fn push_tag(&self, remote: &str, name: &str) -> Result<()>;
}
