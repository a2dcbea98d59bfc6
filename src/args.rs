use crate::action::Action;
use clap::builder::PossibleValuesParser;
use clap::error::ErrorKind;
use clap::{Arg, ArgAction, Command};
use std::ffi::OsString;
use std::path::PathBuf;

/// Command-line arguments for the release tool
#[derive(Debug)]
pub struct Args {
    /// Enable verbose output
    pub verbose: bool,

    /// Skip build commands (package an existing install prefix)
    pub no_build: bool,

    /// Project root containing release.toml
    pub path: Option<PathBuf>,

    /// Path to alternative release configuration
    pub config: Option<PathBuf>,

    /// Requested actions, deduplicated and in pipeline order
    pub actions: Vec<Action>,
}

impl Args {
    /// Parse command-line arguments, exiting with a usage error on failure
    pub fn parse() -> Self {
        Self::try_parse_from(std::env::args_os()).unwrap_or_else(|e| e.exit())
    }

    pub fn try_parse_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = Self::command().try_get_matches_from(args)?;

        let actions = matches
            .get_many::<String>("actions")
            .unwrap_or_default()
            .map(|token| token.parse::<Action>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| clap::Error::raw(ErrorKind::InvalidValue, format!("{e}\n")))?;

        Ok(Self {
            verbose: matches.get_flag("verbose"),
            no_build: matches.get_flag("no-build"),
            path: matches.get_one::<String>("path").map(PathBuf::from),
            config: matches.get_one::<String>("config").map(PathBuf::from),
            actions: Action::normalize(actions),
        })
    }

    fn command() -> Command {
        Command::new("relpack")
            .version(env!("CARGO_PKG_VERSION"))
            .about("Build into a temporary prefix and package binary and source releases")
            .arg(
                Arg::new("actions")
                    .value_name("ACTION")
                    .num_args(0..)
                    .action(ArgAction::Append)
                    .value_parser(PossibleValuesParser::new(
                        Action::ALL.map(|action| action.possible_value()),
                    ))
                    .help("Packaging actions to perform after the build"),
            )
            .arg(
                Arg::new("path")
                    .short('p')
                    .long("path")
                    .value_name("PATH")
                    .help("Project root containing release.toml"),
            )
            .arg(
                Arg::new("config")
                    .short('c')
                    .long("config")
                    .value_name("FILE")
                    .env("RELPACK_CONFIG")
                    .help("Path to alternative release configuration file"),
            )
            .arg(
                Arg::new("verbose")
                    .short('v')
                    .long("verbose")
                    .action(ArgAction::SetTrue)
                    .help("Enable verbose output"),
            )
            .arg(
                Arg::new("no-build")
                    .long("no-build")
                    .action(ArgAction::SetTrue)
                    .help("Skip build commands (package the existing install prefix)"),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_action_set_is_legal() {
        let args = Args::try_parse_from(["relpack"]).unwrap();
        assert!(args.actions.is_empty());
        assert!(!args.no_build);
    }

    #[test]
    fn test_actions_and_aliases() {
        let args = Args::try_parse_from(["relpack", "source-tar", "zip", "binary-zip"]).unwrap();
        assert_eq!(args.actions, vec![Action::BinaryZip, Action::SourceTar]);
    }

    #[test]
    fn test_unknown_action_is_usage_error() {
        let err = Args::try_parse_from(["relpack", "binary-zip", "deb"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
        assert!(err.to_string().contains("deb"));
    }

    #[test]
    fn test_options() {
        let args = Args::try_parse_from([
            "relpack",
            "-v",
            "--no-build",
            "-p",
            "proj",
            "--config",
            "other.toml",
        ])
        .unwrap();
        assert!(args.verbose);
        assert!(args.no_build);
        assert_eq!(args.path, Some(PathBuf::from("proj")));
        assert_eq!(args.config, Some(PathBuf::from("other.toml")));
    }
}
