mod action;
mod archive;
mod args;
mod cmd;
mod config;
mod context;
mod error;
mod installer;
mod manifest;
mod orchestrator;
mod package;
mod pipeline;
mod platform;
mod result;
mod tpl;
mod walk;
mod workspace;

use args::Args;
use config::Config;
use context::Context;

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(args) {
        if let Some(output) = orchestrator::failure_output(&e) {
            eprintln!("{}", output.trim_end());
        }
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

fn run(args: Args) -> result::Result<()> {
    let Args {
        verbose,
        no_build,
        path,
        config: config_path,
        actions,
    } = args;

    // Resolve the project root up front; the build runs in a subdirectory
    // and needs an absolute install prefix.
    let base_dir = std::path::absolute(path.unwrap_or_else(|| ".".into()))?;
    let config_path = config::find_config(&base_dir, config_path.as_deref());
    let ctx = Context::new(base_dir, config_path, verbose);

    cliclack::intro("relpack")?;

    let spinner = cliclack::spinner();
    spinner.start("Loading configuration...");
    let config = match Config::load(&ctx) {
        Ok(config) => {
            spinner.stop(format!("Loaded configuration for {}", config.product));
            config
        }
        Err(e) => {
            spinner.error("Failed to load configuration");
            cliclack::outro_cancel("Release failed")?;
            return Err(e);
        }
    };
    log::debug!(
        "Loaded {} with {} manifest entries",
        ctx.config_path.display(),
        config.manifest.len()
    );

    if actions.is_empty() {
        cliclack::log::info(format!("No actions requested; building {} only", config.product))?;
    }

    match pipeline::run(&ctx, &config, &actions, no_build) {
        Ok(artifacts) => {
            for artifact in &artifacts {
                cliclack::log::success(artifact.display())?;
            }
            cliclack::outro(format!(
                "Generated {} archive(s) in {}",
                artifacts.len(),
                config.output_folder.display()
            ))?;
            Ok(())
        }
        Err(e) => {
            cliclack::outro_cancel("Release failed")?;
            Err(e)
        }
    }
}
