use crate::cmd;
use crate::config::Config;
use crate::context::Context;
use crate::error::{Error, IoResultExt};
use crate::platform::Platform;
use crate::result::Result;
use crate::tpl::Tpl;
use std::path::Path;

/// Output of one completed build step
#[derive(Debug)]
pub struct StepOutput {
    pub command: String,
    pub output: String,
}

/// Run the configured build steps in order, installing into `prefix`.
/// The first failing step aborts the build.
pub fn build(ctx: &Context, config: &Config, prefix: &Path) -> Result<Vec<StepOutput>> {
    let prefix = std::path::absolute(prefix).at_path(prefix)?;
    cmd::check_dir(&config.build_dir)?;

    let mut tpl = Tpl::new();
    tpl.register("PREFIX", prefix.to_string_lossy());
    tpl.register("MAKE", config.make.as_str());
    tpl.register("PRODUCT", config.product.as_str());
    tpl.register("PLATFORM", Platform::current().as_str());

    let mut steps = Vec::with_capacity(config.build_commands.len());
    for command in &config.build_commands {
        let argv = tpl.parse_command(command);
        let Some((program, args)) = argv.split_first() else {
            continue;
        };

        log::info!("Build step: {}", argv.join(" "));
        let output = cmd::execute(ctx, &config.build_dir, program, args)?;
        steps.push(StepOutput {
            command: argv.join(" "),
            output,
        });
    }

    if !prefix.is_dir() {
        log::warn!(
            "Build finished but {} was not created",
            prefix.display()
        );
    }

    Ok(steps)
}

/// Render a build failure's captured output for the user
pub fn failure_output(err: &Error) -> Option<&str> {
    match err {
        Error::BuildFailure { output, .. } if !output.trim().is_empty() => Some(output.as_str()),
        _ => None,
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn setup(build: &[&str]) -> (TempDir, Context, Config) {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("src")).unwrap();
        fs::write(tmp.path().join("src/app"), "binary").unwrap();

        let steps = build
            .iter()
            .map(|s| format!("{:?}", s))
            .collect::<Vec<_>>()
            .join(", ");
        let content = format!("product = \"demo\"\nbuild = [{}]\n", steps);
        let config = Config::from_toml(&content, tmp.path()).unwrap();
        let ctx = Context::new(tmp.path().to_path_buf(), PathBuf::from("release.toml"), false);
        (tmp, ctx, config)
    }

    #[test]
    fn test_steps_install_into_prefix() {
        let (tmp, ctx, config) = setup(&["mkdir -p $PREFIX/bin", "cp app $PREFIX/bin/$PRODUCT"]);
        let prefix = tmp.path().join("release/.tmpdst");

        let steps = build(&ctx, &config, &prefix).unwrap();
        assert_eq!(steps.len(), 2);
        assert_eq!(fs::read(prefix.join("bin/demo")).unwrap(), b"binary");
    }

    #[test]
    fn test_failing_step_stops_the_build() {
        let (tmp, ctx, config) = setup(&["false", "mkdir -p $PREFIX"]);
        let prefix = tmp.path().join("release/.tmpdst");

        let err = build(&ctx, &config, &prefix).unwrap_err();
        assert!(matches!(err, Error::BuildFailure { ref command, .. } if command == "false"));
        assert!(!prefix.exists());
    }

    #[test]
    fn test_missing_build_dir() {
        let (tmp, ctx, mut config) = setup(&["true"]);
        config.build_dir = tmp.path().join("nope");
        let err = build(&ctx, &config, &tmp.path().join("p")).unwrap_err();
        assert!(matches!(err, Error::IoAt { .. }));
    }

    #[test]
    fn test_failure_output() {
        let err = Error::BuildFailure {
            command: "make".into(),
            code: 2,
            output: "error: no rule\n".into(),
        };
        assert_eq!(failure_output(&err), Some("error: no rule\n"));
        assert_eq!(failure_output(&Error::custom("x")), None);
    }
}
