//! Release workflow orchestration
//!
//! Keeps the derive → tag → push sequence out of `main.rs` so it can run
//! against any [Repository], including the mock used in tests.

use std::path::PathBuf;

use crate::analyzer::{Derivation, VersionDeriver};
use crate::boundary::BoundaryWarning;
use crate::config::{BehaviorConfig, Config, DeriveInputs, InputOverrides};
use crate::error::Result;
use crate::git::{Git2Repository, Repository};
use crate::output::ActionOutputs;
use crate::ui;

/// How far the workflow goes after deriving the tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseMode {
    /// Create the tag and push it
    Publish,
    /// Create the tag locally only
    LocalOnly,
    /// Derive and report, write nothing
    DryRun,
}

/// Arguments for the release workflow
///
/// Mirrors the CLI Args without depending on clap.
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseWorkflowArgs {
    /// Directory inside the repository
    pub repo_path: PathBuf,

    /// Inputs from flags and environment, before file fallbacks
    pub inputs: InputOverrides,

    /// Remote overriding the configured one
    pub remote: Option<String>,

    pub mode: ReleaseMode,
}

/// Result of a successful release workflow
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowResult {
    pub tag: String,
    pub version: String,
    /// Whether the tag now exists locally
    pub created: bool,
    /// Whether the tag was pushed to remote
    pub pushed: bool,
}

impl WorkflowResult {
    pub fn outputs(&self) -> ActionOutputs {
        ActionOutputs {
            tag: self.tag.clone(),
            version: self.version.clone(),
        }
    }
}

/// Main release workflow
///
/// 1. Resolve and validate inputs (no git access on failure)
/// 2. Open the repository
/// 3. Derive the next tag
/// 4. Create and push it according to `mode`
pub fn run_release_workflow(args: ReleaseWorkflowArgs, config: Config) -> Result<WorkflowResult> {
    let inputs = DeriveInputs::resolve(args.inputs, &config)?;

    let repo = Git2Repository::open(&args.repo_path)?
        .with_lightweight_tags(config.behavior.include_lightweight_tags);

    let mut behavior = config.behavior;
    if let Some(remote) = args.remote {
        behavior.remote = remote;
    }

    release(&repo, inputs, &behavior, args.mode)
}

/// Derive the next tag for `inputs` and apply it to `repo`.
///
/// A failed push leaves the local tag in place; nothing is rolled back or retried.
pub fn release<R: Repository>(
    repo: &R,
    inputs: DeriveInputs,
    behavior: &BehaviorConfig,
    mode: ReleaseMode,
) -> Result<WorkflowResult> {
    let component = inputs.component.clone();
    let deriver = VersionDeriver::new(inputs)?;

    ui::display_status(&format!(
        "Scanning history of '{}' under {}",
        component.name, component.path
    ));

    let derivation = deriver.derive(repo)?;
    for warning in &derivation.warnings {
        match warning {
            BoundaryWarning::ForeignTag { .. } => log::debug!("{}", warning),
            _ => ui::display_boundary_warning(warning),
        }
    }
    ui::display_derivation(&component.name, &derivation);

    if mode == ReleaseMode::DryRun {
        ui::display_status(&format!(
            "Dry run: would create {} and push it to {}",
            derivation.tag, behavior.remote
        ));
        return Ok(result(&derivation, false, false));
    }

    let message = behavior.render_tag_message(&derivation.tag, &derivation.version());
    repo.create_annotated_tag(&derivation.tag, &message)?;
    ui::display_success(&format!("Created tag: {}", derivation.tag));

    if mode == ReleaseMode::LocalOnly {
        ui::display_status(&format!(
            "Not pushing. Run: git push {} {}",
            behavior.remote, derivation.tag
        ));
        return Ok(result(&derivation, true, false));
    }

    repo.push_tag(&behavior.remote, &derivation.tag)?;
    ui::display_success(&format!(
        "Pushed tag: {} to {}",
        derivation.tag, behavior.remote
    ));

    Ok(result(&derivation, true, true))
}

fn result(derivation: &Derivation, created: bool, pushed: bool) -> WorkflowResult {
    WorkflowResult {
        tag: derivation.tag.clone(),
        version: derivation.version(),
        created,
        pushed,
    }
}
