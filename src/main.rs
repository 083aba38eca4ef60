use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use component_tag::cli::orchestration::{run_release_workflow, ReleaseMode, ReleaseWorkflowArgs};
use component_tag::config::{self, InputOverrides};
use component_tag::{output, ui};

#[derive(clap::Parser)]
#[command(
    name = "component-tag",
    version,
    about = "Create and push the next semantic version tag for a monorepo component"
)]
struct Args {
    #[arg(long, help = "Version used when the component has no tag yet [default: 0.0.0]")]
    starting_version: Option<String>,

    #[arg(long, help = "Component name, used as the tag prefix")]
    component_name: Option<String>,

    #[arg(long, help = "Directory whose history drives the version")]
    component_path: Option<String>,

    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(long, help = "Remote to push the tag to [default: origin]")]
    remote: Option<String>,

    #[arg(long, default_value = ".", help = "Path inside the repository")]
    repo: PathBuf,

    #[arg(long, help = "Preview the tag without creating or pushing it")]
    dry_run: bool,

    #[arg(long, conflicts_with = "dry_run", help = "Create the tag but do not push it")]
    no_push: bool,

    #[arg(long, help = "Enable debug logging")]
    debug: bool,
}

fn initialize_logger(debug: bool) -> Result<()> {
    let filter = if debug {
        simplelog::LevelFilter::Debug
    } else {
        simplelog::LevelFilter::Info
    };

    let config = simplelog::ConfigBuilder::new()
        .add_filter_allow_str("component_tag")
        .build();

    simplelog::TermLogger::init(
        filter,
        config,
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )?;

    Ok(())
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        ui::display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    initialize_logger(args.debug)?;

    let config = config::load_config(args.config.as_deref())?;

    let mode = if args.dry_run {
        ReleaseMode::DryRun
    } else if args.no_push {
        ReleaseMode::LocalOnly
    } else {
        ReleaseMode::Publish
    };

    let inputs = InputOverrides {
        starting_version: args.starting_version,
        component_name: args.component_name,
        component_path: args.component_path,
    }
    .or(InputOverrides::from_env());

    let result = run_release_workflow(
        ReleaseWorkflowArgs {
            repo_path: args.repo,
            inputs,
            remote: args.remote,
            mode,
        },
        config,
    )?;

    output::emit(&result.outputs())?;

    Ok(())
}
