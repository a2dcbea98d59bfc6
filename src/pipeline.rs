use crate::action::Action;
use crate::archive;
use crate::config::Config;
use crate::context::Context;
use crate::orchestrator;
use crate::package;
use crate::result::Result;
use crate::workspace::Workspace;
use std::path::PathBuf;

/// Build into the temporary prefix, run the requested actions in order and
/// remove the prefix again, whether or not anything failed.
pub fn run(ctx: &Context, config: &Config, actions: &[Action], no_build: bool) -> Result<Vec<PathBuf>> {
    let mut workspace = Workspace::acquire(&config.output_folder, !no_build)?;

    let outcome = build_and_package(ctx, config, actions, no_build, &workspace);

    if let Err(e) = workspace.cleanup() {
        log::warn!("Failed to remove {}: {}", workspace.prefix().display(), e);
    }

    outcome
}

fn build_and_package(
    ctx: &Context,
    config: &Config,
    actions: &[Action],
    no_build: bool,
    workspace: &Workspace,
) -> Result<Vec<PathBuf>> {
    // A failed run must not leave archives from an earlier release in place.
    for &action in actions {
        if let Some(dest) = package::destination(action, config, workspace.output_dir()) {
            archive::discard(&dest)?;
        }
    }

    if no_build {
        log::info!("Skipping build, packaging {}", workspace.prefix().display());
    } else {
        let spinner = cliclack::spinner();
        spinner.start("Installing to temporary prefix...");
        match orchestrator::build(ctx, config, workspace.prefix()) {
            Ok(steps) => {
                spinner.stop("Build completed");
                for step in steps.iter().filter(|s| !s.output.trim().is_empty()) {
                    cliclack::log::remark(format!("{}\n{}", step.command, step.output.trim_end()))?;
                }
            }
            Err(e) => {
                spinner.error("Build failed");
                return Err(e);
            }
        }
    }

    let mut artifacts = Vec::with_capacity(actions.len());
    for &action in actions {
        let spinner = cliclack::spinner();
        spinner.start(format!("Running {}...", action));
        match package::run(action, config, workspace) {
            Ok(path) => {
                spinner.stop(format!("Created {}", path.display()));
                artifacts.push(path);
            }
            Err(e) => {
                spinner.error(format!("{} failed", action));
                return Err(e);
            }
        }
    }

    Ok(artifacts)
}
