use crate::error::Error;
use clap::builder::PossibleValue;
use std::str::FromStr;

/// A packaging outcome requested on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Action {
    BinaryZip,
    BinaryTar,
    SourceZip,
    SourceTar,
    InstallerNix,
    InstallerWin,
}

impl Action {
    /// Every action, in the order the pipeline runs them
    pub const ALL: [Action; 6] = [
        Action::BinaryZip,
        Action::BinaryTar,
        Action::SourceZip,
        Action::SourceTar,
        Action::InstallerNix,
        Action::InstallerWin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::BinaryZip => "binary-zip",
            Action::BinaryTar => "binary-tar",
            Action::SourceZip => "source-zip",
            Action::SourceTar => "source-tar",
            Action::InstallerNix => "installer-nix",
            Action::InstallerWin => "installer-win",
        }
    }

    /// Token accepted by the older release script
    fn legacy_alias(&self) -> &'static str {
        match self {
            Action::BinaryZip => "zip",
            Action::BinaryTar => "tar",
            Action::SourceZip => "src-zip",
            Action::SourceTar => "src-tar",
            Action::InstallerNix => "nixstaller",
            Action::InstallerWin => "winstaller",
        }
    }

    fn help(&self) -> &'static str {
        match self {
            Action::BinaryZip => "Zip the installed tree",
            Action::BinaryTar => "Tar+gzip the installed tree",
            Action::SourceZip => "Zip the source manifest",
            Action::SourceTar => "Tar+gzip the source manifest",
            Action::InstallerNix => "Unix installer (not supported)",
            Action::InstallerWin => "Windows installer (not supported)",
        }
    }

    pub fn possible_value(&self) -> PossibleValue {
        PossibleValue::new(self.as_str())
            .alias(self.legacy_alias())
            .help(self.help())
    }

    /// Collapse repeated actions and put them in pipeline order
    pub fn normalize(mut actions: Vec<Action>) -> Vec<Action> {
        actions.sort();
        actions.dedup();
        actions
    }
}

impl FromStr for Action {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|a| a.as_str() == s || a.legacy_alias() == s)
            .ok_or_else(|| Error::InvalidAction(s.to_string()))
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
