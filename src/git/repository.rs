use crate::error::{ComponentTagError, Result};
use git2::{
    Commit, Cred, CredentialType, DiffOptions, ErrorCode, Oid, PushOptions, RemoteCallbacks,
    Repository as Git2Repo, Signature, Tree,
};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::Path;

/// Identity used for tags when the repository has no `user.name`/`user.email`
pub const FALLBACK_TAGGER_NAME: &str = "component-tag";
pub const FALLBACK_TAGGER_EMAIL: &str = "component-tag@users.noreply.github.com";

const MAX_CREDENTIAL_ATTEMPTS: u32 = 3;

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
    include_lightweight_tags: bool,
    /// Tag names per commit, best first; built on first lookup
    tags_by_commit: RefCell<Option<HashMap<Oid, Vec<String>>>>,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;

        Ok(Self::from_git2(repo))
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository {
            repo,
            include_lightweight_tags: false,
            tags_by_commit: RefCell::new(None),
        }
    }

    /// Let exact-tag resolution also consider lightweight tags
    pub fn with_lightweight_tags(mut self, include: bool) -> Self {
        self.include_lightweight_tags = include;
        self.tags_by_commit = RefCell::new(None);
        self
    }

    /// Map every tagged commit to its tag names in one pass over `refs/tags`.
    ///
    /// Annotated tags come before lightweight ones, then newest tagger date,
    /// then name.
    fn build_tag_map(&self) -> Result<HashMap<Oid, Vec<String>>> {
        // (annotated, timestamp, name)
        let mut candidates: HashMap<Oid, Vec<(bool, i64, String)>> = HashMap::new();

        let tag_names = self.repo.tag_names(None)?;
        for name in tag_names.iter().flatten() {
            let reference = match self.repo.find_reference(&format!("refs/tags/{}", name)) {
                Ok(reference) => reference,
                Err(e) if e.code() == ErrorCode::NotFound => continue,
                Err(e) => return Err(e.into()),
            };

            // Tags on trees or blobs never name a commit
            let tagged_commit = match reference.peel_to_commit() {
                Ok(tagged_commit) => tagged_commit,
                Err(_) => continue,
            };

            let entry = match reference.peel_to_tag() {
                Ok(tag) => {
                    let when = tag
                        .tagger()
                        .map(|tagger| tagger.when().seconds())
                        .unwrap_or_else(|| tagged_commit.time().seconds());
                    (true, when, name.to_string())
                }
                Err(_) if self.include_lightweight_tags => {
                    (false, tagged_commit.time().seconds(), name.to_string())
                }
                Err(_) => continue,
            };

            candidates.entry(tagged_commit.id()).or_default().push(entry);
        }

        log::debug!("{} tagged commit(s) in repository", candidates.len());

        Ok(candidates
            .into_iter()
            .map(|(oid, mut tags)| {
                tags.sort_by(|a, b| {
                    b.0.cmp(&a.0)
                        .then_with(|| b.1.cmp(&a.1))
                        .then_with(|| a.2.cmp(&b.2))
                });
                (oid, tags.into_iter().map(|(_, _, name)| name).collect())
            })
            .collect())
    }

    fn find_commit(&self, commit: &str) -> Result<Commit<'_>> {
        let oid = Oid::from_str(commit)?;
        Ok(self.repo.find_commit(oid)?)
    }

    /// A merge only counts when it differs from every parent, as `git log -- <path>` does
    fn touches_path(&self, commit: &Commit<'_>, pathspec: &str) -> Result<bool> {
        let tree = commit.tree()?;

        if commit.parent_count() == 0 {
            return self.tree_differs(None, &tree, pathspec);
        }

        for parent in commit.parents() {
            if !self.tree_differs(Some(&parent.tree()?), &tree, pathspec)? {
                return Ok(false);
            }
        }

        Ok(true)
    }

    fn tree_differs(&self, old: Option<&Tree<'_>>, new: &Tree<'_>, pathspec: &str) -> Result<bool> {
        let mut options = DiffOptions::new();
        options.pathspec(pathspec);

        let diff = self
            .repo
            .diff_tree_to_tree(old, Some(new), Some(&mut options))?;

        Ok(diff.deltas().len() > 0)
    }

    fn signature(&self) -> Result<Signature<'static>> {
        match self.repo.signature() {
            Ok(signature) => Ok(signature),
            Err(e) if e.code() == ErrorCode::NotFound => {
                log::warn!(
                    "No git identity configured, tagging as {} <{}>",
                    FALLBACK_TAGGER_NAME,
                    FALLBACK_TAGGER_EMAIL
                );
                Ok(Signature::now(FALLBACK_TAGGER_NAME, FALLBACK_TAGGER_EMAIL)?)
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Convert a component path into a libgit2 pathspec.
///
/// `None` means the whole tree.
pub fn pathspec_for(path: &str) -> Option<String> {
    let trimmed = path.trim();
    let trimmed = trimmed.strip_prefix("./").unwrap_or(trimmed);
    let trimmed = trimmed.trim_matches('/');

    if trimmed.is_empty() || trimmed == "." {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn credentials_callbacks<'a>(attempts: &'a Cell<u32>) -> RemoteCallbacks<'a> {
    let mut callbacks = RemoteCallbacks::new();

    callbacks.credentials(move |_url, username_from_url, allowed_types| {
        attempts.set(attempts.get() + 1);
        if attempts.get() > MAX_CREDENTIAL_ATTEMPTS {
            return Err(git2::Error::from_str("authentication failed"));
        }

        if allowed_types.contains(CredentialType::USER_PASS_PLAINTEXT) {
            if let Ok(token) = std::env::var("GITHUB_TOKEN") {
                if !token.is_empty() {
                    return Cred::userpass_plaintext("x-access-token", &token);
                }
            }
        }

        if allowed_types.contains(CredentialType::SSH_KEY) {
            let username = username_from_url.unwrap_or("git");

            if let Ok(cred) = Cred::ssh_key_from_agent(username) {
                return Ok(cred);
            }

            if let Some(home) = dirs::home_dir() {
                for key in ["id_ed25519", "id_rsa", "id_ecdsa"] {
                    let path = home.join(".ssh").join(key);
                    if path.exists() {
                        if let Ok(cred) = Cred::ssh_key(username, None, &path, None) {
                            return Ok(cred);
                        }
                    }
                }
            }
        }

        Cred::default()
    });

    callbacks.push_update_reference(|refname, status| match status {
        Some(status) => Err(git2::Error::from_str(&format!(
            "remote rejected {}: {}",
            refname, status
        ))),
        None => Ok(()),
    });

    callbacks
}

impl super::Repository for Git2Repository {
    fn list_commits_affecting(&self, path: &str) -> Result<Vec<String>> {
        let pathspec = pathspec_for(path);

        let mut revwalk = self.repo.revwalk()?;
        revwalk.push_head()?;
        revwalk.set_sorting(git2::Sort::TOPOLOGICAL | git2::Sort::TIME)?;

        let mut commits = Vec::new();

        for oid_result in revwalk {
            let oid = oid_result?;

            let relevant = match pathspec.as_deref() {
                Some(pathspec) => self.touches_path(&self.repo.find_commit(oid)?, pathspec)?,
                None => true,
            };

            if relevant {
                commits.push(oid.to_string());
            }
        }

        Ok(commits)
    }

    fn resolve_exact_tags(&self, commit: &str) -> Result<Vec<String>> {
        let target = Oid::from_str(commit)?;

        if self.tags_by_commit.borrow().is_none() {
            let map = self.build_tag_map()?;
            self.tags_by_commit.replace(Some(map));
        }

        Ok(self
            .tags_by_commit
            .borrow()
            .as_ref()
            .and_then(|map| map.get(&target))
            .cloned()
            .unwrap_or_default())
    }

    fn commit_message(&self, commit: &str) -> Result<String> {
        let commit = self.find_commit(commit)?;

        Ok(String::from_utf8_lossy(commit.message_bytes()).into_owned())
    }

    fn create_annotated_tag(&self, name: &str, message: &str) -> Result<()> {
        let head = self
            .repo
            .head()
            .and_then(|head| head.peel_to_commit())
            .map_err(|e| ComponentTagError::tag(format!("Cannot resolve HEAD: {}", e)))?;

        let signature = self.signature()?;

        self.repo
            .tag(name, head.as_object(), &signature, message, false)
            .map_err(|e| ComponentTagError::tag(format!("Cannot create tag '{}': {}", name, e)))?;
        self.tags_by_commit.replace(None);

        Ok(())
    }

    fn push_tag(&self, remote: &str, name: &str) -> Result<()> {
        let mut remote_handle = self.repo.find_remote(remote).map_err(|e| {
            ComponentTagError::remote(format!("Cannot find remote '{}': {}", remote, e))
        })?;

        let attempts = Cell::new(0);
        let mut push_options = PushOptions::new();
        push_options.remote_callbacks(credentials_callbacks(&attempts));

        let refspec = format!("refs/tags/{}:refs/tags/{}", name, name);

        remote_handle
            .push(&[refspec.as_str()], Some(&mut push_options))
            .map_err(|e| {
                if e.class() == git2::ErrorClass::Net {
                    ComponentTagError::remote(format!(
                        "Network error pushing '{}' to '{}': {}",
                        name, remote, e
                    ))
                } else {
                    ComponentTagError::remote(format!(
                        "Failed to push '{}' to '{}': {}",
                        name, remote, e
                    ))
                }
            })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::Repository;
    use std::fs;
    use tempfile::TempDir;

    struct Fixture {
        dir: TempDir,
        repo: Git2Repo,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = TempDir::new().expect("Could not create temp dir");
            let repo = Git2Repo::init(dir.path()).expect("Could not init git repo");
            {
                let mut config = repo.config().expect("Could not get config");
                config.set_str("user.name", "Test User").unwrap();
                config.set_str("user.email", "test@example.com").unwrap();
            }
            Fixture { dir, repo }
        }

        fn commit(&self, file: &str, contents: &str, message: &str) -> Oid {
            let full_path = self.dir.path().join(file);
            fs::create_dir_all(full_path.parent().unwrap()).unwrap();
            fs::write(&full_path, contents).unwrap();

            let mut index = self.repo.index().unwrap();
            index.add_path(Path::new(file)).unwrap();
            index.write().unwrap();
            let tree_id = index.write_tree().unwrap();
            let tree = self.repo.find_tree(tree_id).unwrap();
            let signature = self.repo.signature().unwrap();

            let parents: Vec<Commit<'_>> = match self.repo.head() {
                Ok(head) => vec![head.peel_to_commit().unwrap()],
                Err(_) => Vec::new(),
            };
            let parent_refs: Vec<&Commit<'_>> = parents.iter().collect();

            self.repo
                .commit(
                    Some("HEAD"),
                    &signature,
                    &signature,
                    message,
                    &tree,
                    &parent_refs,
                )
                .unwrap()
        }

        fn annotated_tag(&self, name: &str, oid: Oid) {
            let object = self.repo.find_object(oid, None).unwrap();
            let signature = self.repo.signature().unwrap();
            self.repo
                .tag(name, &object, &signature, name, false)
                .unwrap();
        }

        fn wrapper(&self) -> Git2Repository {
            Git2Repository::open(self.dir.path()).unwrap()
        }
    }

    #[test]
    fn test_pathspec_for() {
        assert_eq!(pathspec_for("services/api/"), Some("services/api".to_string()));
        assert_eq!(pathspec_for("./services/api/"), Some("services/api".to_string()));
        assert_eq!(pathspec_for("/"), None);
        assert_eq!(pathspec_for("./"), None);
        assert_eq!(pathspec_for(""), None);
    }

    #[test]
    fn test_list_commits_affecting_filters_by_path() {
        let fixture = Fixture::new();
        let first = fixture.commit("api/main.rs", "1", "api: first");
        fixture.commit("web/index.html", "1", "web: first");
        let third = fixture.commit("api/lib.rs", "1", "api: second");

        let commits = fixture.wrapper().list_commits_affecting("api/").unwrap();
        assert_eq!(commits, vec![third.to_string(), first.to_string()]);
    }

    #[test]
    fn test_list_commits_affecting_sibling_prefix_not_included() {
        let fixture = Fixture::new();
        fixture.commit("api2/main.rs", "1", "api2 only");
        let api = fixture.commit("api/main.rs", "1", "api only");

        let commits = fixture.wrapper().list_commits_affecting("api/").unwrap();
        assert_eq!(commits, vec![api.to_string()]);
    }

    #[test]
    fn test_list_commits_affecting_root_path_lists_all() {
        let fixture = Fixture::new();
        fixture.commit("a.txt", "1", "one");
        fixture.commit("b/c.txt", "1", "two");

        let commits = fixture.wrapper().list_commits_affecting("./").unwrap();
        assert_eq!(commits.len(), 2);
    }

    #[test]
    fn test_resolve_exact_tags_annotated() {
        let fixture = Fixture::new();
        let tagged = fixture.commit("api/main.rs", "1", "first");
        let untagged = fixture.commit("api/main.rs", "2", "second");
        fixture.annotated_tag("api-v1.0.0", tagged);

        let repo = fixture.wrapper();
        assert_eq!(
            repo.resolve_exact_tags(&tagged.to_string()).unwrap(),
            vec!["api-v1.0.0".to_string()]
        );
        assert!(repo.resolve_exact_tags(&untagged.to_string()).unwrap().is_empty());
    }

    #[test]
    fn test_resolve_exact_tags_returns_every_tag_on_commit() {
        let fixture = Fixture::new();
        let shared = fixture.commit("api/main.rs", "1", "shared");
        fixture.annotated_tag("api-v1.0.0", shared);
        fixture.annotated_tag("web-v2.0.0", shared);

        let tags = fixture
            .wrapper()
            .resolve_exact_tags(&shared.to_string())
            .unwrap();
        assert_eq!(tags.len(), 2);
        assert!(tags.contains(&"api-v1.0.0".to_string()));
        assert!(tags.contains(&"web-v2.0.0".to_string()));
    }

    #[test]
    fn test_resolve_exact_tags_ignores_lightweight_by_default() {
        let fixture = Fixture::new();
        let oid = fixture.commit("api/main.rs", "1", "first");
        let object = fixture.repo.find_object(oid, None).unwrap();
        fixture
            .repo
            .tag_lightweight("api-v0.1.0", &object, false)
            .unwrap();

        assert!(fixture
            .wrapper()
            .resolve_exact_tags(&oid.to_string())
            .unwrap()
            .is_empty());
        assert_eq!(
            fixture
                .wrapper()
                .with_lightweight_tags(true)
                .resolve_exact_tags(&oid.to_string())
                .unwrap(),
            vec!["api-v0.1.0".to_string()]
        );
    }

    #[test]
    fn test_commit_message() {
        let fixture = Fixture::new();
        let oid = fixture.commit("a.txt", "1", "add a #minor");

        assert_eq!(
            fixture.wrapper().commit_message(&oid.to_string()).unwrap(),
            "add a #minor"
        );
    }

    #[test]
    fn test_create_annotated_tag_at_head() {
        let fixture = Fixture::new();
        let head = fixture.commit("a.txt", "1", "first");

        let repo = fixture.wrapper();
        assert!(repo.resolve_exact_tags(&head.to_string()).unwrap().is_empty());
        repo.create_annotated_tag("a-v0.1.0", "Release a-v0.1.0")
            .unwrap();

        let reference = fixture.repo.find_reference("refs/tags/a-v0.1.0").unwrap();
        let tag = reference.peel_to_tag().unwrap();
        assert_eq!(tag.target_id(), head);
        assert_eq!(tag.message(), Some("Release a-v0.1.0"));
        assert_eq!(
            repo.resolve_exact_tags(&head.to_string()).unwrap(),
            vec!["a-v0.1.0".to_string()]
        );
    }

    #[test]
    fn test_create_annotated_tag_twice_fails() {
        let fixture = Fixture::new();
        fixture.commit("a.txt", "1", "first");

        let repo = fixture.wrapper();
        repo.create_annotated_tag("a-v0.1.0", "first").unwrap();
        let err = repo.create_annotated_tag("a-v0.1.0", "again").unwrap_err();
        assert!(matches!(err, ComponentTagError::Tag(_)));
    }

    #[test]
    fn test_push_tag_to_bare_remote() {
        let fixture = Fixture::new();
        fixture.commit("a.txt", "1", "first");

        let remote_dir = TempDir::new().unwrap();
        let remote = Git2Repo::init_bare(remote_dir.path()).unwrap();
        fixture
            .repo
            .remote("origin", remote_dir.path().to_str().unwrap())
            .unwrap();

        let repo = fixture.wrapper();
        repo.create_annotated_tag("a-v0.1.0", "Release").unwrap();
        repo.push_tag("origin", "a-v0.1.0").unwrap();

        assert!(remote.find_reference("refs/tags/a-v0.1.0").is_ok());
    }

    #[test]
    fn test_push_tag_missing_remote() {
        let fixture = Fixture::new();
        fixture.commit("a.txt", "1", "first");

        let err = fixture
            .wrapper()
            .push_tag("origin", "a-v0.1.0")
            .unwrap_err();
        assert!(matches!(err, ComponentTagError::Remote(_)));
    }
}
