use crate::boundary::BoundaryWarning;
use crate::config::DeriveInputs;
use crate::domain::{increment, marker_level, BumpLevel, ComponentTagPattern, VersionBump};
use crate::error::Result;
use crate::git::Repository;
use semver::Version;

/// An unreleased commit and the level it asked for
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedCommit {
    pub id: String,
    /// First line of the message
    pub summary: String,
    pub level: BumpLevel,
    /// Whether the level came from a marker rather than the default
    pub marked: bool,
}

/// Outcome of a version derivation
#[derive(Debug, Clone, PartialEq)]
pub struct Derivation {
    pub previous_version: String,
    /// Tag the previous version was read from, `None` when the floor was used
    pub previous_tag: Option<String>,
    /// Newest first
    pub unreleased: Vec<ClassifiedCommit>,
    pub bump: VersionBump,
    pub next_version: Version,
    pub tag: String,
    pub warnings: Vec<BoundaryWarning>,
}

impl Derivation {
    /// Bare next version, e.g. `2.0.0`
    pub fn version(&self) -> String {
        self.next_version.to_string()
    }
}

/// Pick the increment for a scan.
///
/// Without a single marker anywhere the release is a minor one, whatever the
/// levels say. Otherwise the highest level wins.
pub fn bump_label(highest: BumpLevel, had_markers: bool) -> VersionBump {
    if !had_markers {
        return VersionBump::Minor;
    }

    highest.as_bump().unwrap_or(VersionBump::Minor)
}

/// Derives the next tag for one component from its history
pub struct VersionDeriver {
    inputs: DeriveInputs,
    pattern: ComponentTagPattern,
}

impl VersionDeriver {
    pub fn new(inputs: DeriveInputs) -> Result<Self> {
        let pattern = ComponentTagPattern::new(inputs.component.name.clone())?;

        Ok(VersionDeriver { inputs, pattern })
    }

    /// Scan the component's history, newest first, and compute the next tag.
    ///
    /// The scan stops at the first commit tagged for this component; that
    /// tag's version replaces the starting version. Nothing is written to the
    /// repository.
    pub fn derive<R: Repository>(&self, repo: &R) -> Result<Derivation> {
        let component = &self.inputs.component;
        let commits = repo.list_commits_affecting(&component.path)?;

        log::debug!("{} commit(s) touch '{}'", commits.len(), component.path);

        let mut previous_version = self.inputs.starting_version.clone();
        let mut previous_tag = None;
        let mut highest = BumpLevel::None;
        let mut had_markers = false;
        let mut unreleased = Vec::new();
        let mut warnings = Vec::new();

        for commit in &commits {
            let tags = repo.resolve_exact_tags(commit)?;

            let own = tags
                .iter()
                .find_map(|tag| self.pattern.version_of(tag).map(|version| (tag, version)));
            if let Some((tag, version)) = own {
                log::info!("Previous release of '{}' is {}", component.name, tag);
                previous_version = version.to_string();
                previous_tag = Some(tag.clone());
                break;
            }

            // Released by another component: neither a boundary nor unreleased work here
            if !tags.is_empty() {
                for tag in tags {
                    log::debug!("Ignoring tag '{}' on {}", tag, commit);
                    warnings.push(BoundaryWarning::ForeignTag {
                        tag,
                        commit: commit.clone(),
                    });
                }
                continue;
            }

            let message = repo.commit_message(commit)?;
            let marker = marker_level(&message, &self.inputs.markers);
            let level = marker.unwrap_or(BumpLevel::Minor);

            had_markers |= marker.is_some();
            highest = highest.max(level);

            log::debug!(
                "{} -> {:?}{}",
                commit,
                level,
                if marker.is_some() { "" } else { " (default)" }
            );

            unreleased.push(ClassifiedCommit {
                id: commit.clone(),
                summary: message.lines().next().unwrap_or_default().to_string(),
                level,
                marked: marker.is_some(),
            });
        }

        if commits.is_empty() {
            warnings.push(BoundaryWarning::NoCommitsForPath {
                path: component.path.clone(),
            });
        } else if unreleased.is_empty() {
            if let Some(tag) = &previous_tag {
                warnings.push(BoundaryWarning::NoUnreleasedCommits {
                    component: component.name.clone(),
                    latest_tag: tag.clone(),
                });
            }
        }

        let bump = bump_label(highest, had_markers);
        let next_version = increment(&previous_version, bump)?;
        let tag = self.pattern.format(&next_version);

        log::info!(
            "{} -> {} ({} bump over {} unreleased commit(s))",
            previous_version,
            next_version,
            bump,
            unreleased.len()
        );

        Ok(Derivation {
            previous_version,
            previous_tag,
            unreleased,
            bump,
            next_version,
            tag,
            warnings,
        })
    }
}
