use crate::error::{ComponentTagError, Result};
use crate::git::Repository;
use std::cell::RefCell;
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct MockCommit {
    id: String,
    message: String,
    paths: Vec<String>,
}

/// Mock repository for testing without actual git operations
///
/// Commits are added oldest first, the same order they would be made in.
#[derive(Default)]
pub struct MockRepository {
    commits: Vec<MockCommit>,
    tags: HashMap<String, Vec<String>>,
    broken_lookups: Vec<String>,
    fail_push: bool,
    created: RefCell<Vec<(String, String)>>,
    pushed: RefCell<Vec<(String, String)>>,
    message_reads: RefCell<Vec<String>>,
}

impl MockRepository {
    /// Create a new empty mock repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a commit touching `paths` on top of the history
    pub fn add_commit(&mut self, id: impl Into<String>, message: impl Into<String>, paths: &[&str]) {
        self.commits.push(MockCommit {
            id: id.into(),
            message: message.into(),
            paths: paths.iter().map(|p| p.to_string()).collect(),
        });
    }

    /// Tag a commit; tags added later rank first, like a newer tagger date
    pub fn add_tag(&mut self, commit: impl Into<String>, name: impl Into<String>) {
        self.tags.entry(commit.into()).or_default().insert(0, name.into());
    }

    /// Make tag lookups for `commit` fail with a repository error
    pub fn break_lookup(&mut self, commit: impl Into<String>) {
        self.broken_lookups.push(commit.into());
    }

    /// Make every push fail
    pub fn fail_push(&mut self) {
        self.fail_push = true;
    }

    /// Tags created so far as `(name, message)`
    pub fn created_tags(&self) -> Vec<(String, String)> {
        self.created.borrow().clone()
    }

    /// Tags pushed so far as `(remote, name)`
    pub fn pushed_tags(&self) -> Vec<(String, String)> {
        self.pushed.borrow().clone()
    }

    /// Commits whose message was read, in read order
    pub fn message_reads(&self) -> Vec<String> {
        self.message_reads.borrow().clone()
    }
}

impl Repository for MockRepository {
    fn list_commits_affecting(&self, path: &str) -> Result<Vec<String>> {
        let all = path.trim_start_matches("./").trim_matches('/').is_empty();

        Ok(self
            .commits
            .iter()
            .rev()
            .filter(|commit| all || commit.paths.iter().any(|p| p.starts_with(path)))
            .map(|commit| commit.id.clone())
            .collect())
    }

    fn resolve_exact_tags(&self, commit: &str) -> Result<Vec<String>> {
        if self.broken_lookups.iter().any(|c| c == commit) {
            return Err(ComponentTagError::Git(git2::Error::from_str(
                "simulated object database failure",
            )));
        }

        Ok(self.tags.get(commit).cloned().unwrap_or_default())
    }

    fn commit_message(&self, commit: &str) -> Result<String> {
        self.message_reads.borrow_mut().push(commit.to_string());

        self.commits
            .iter()
            .find(|c| c.id == commit)
            .map(|c| c.message.clone())
            .ok_or_else(|| ComponentTagError::Git(git2::Error::from_str("commit not found")))
    }

    fn create_annotated_tag(&self, name: &str, message: &str) -> Result<()> {
        if self.created.borrow().iter().any(|(n, _)| n == name) {
            return Err(ComponentTagError::tag(format!("tag '{}' already exists", name)));
        }

        self.created
            .borrow_mut()
            .push((name.to_string(), message.to_string()));
        Ok(())
    }

    fn push_tag(&self, remote: &str, name: &str) -> Result<()> {
        if self.fail_push {
            return Err(ComponentTagError::remote(format!(
                "simulated push failure for '{}'",
                name
            )));
        }

        self.pushed
            .borrow_mut()
            .push((remote.to_string(), name.to_string()));
        Ok(())
    }
}
