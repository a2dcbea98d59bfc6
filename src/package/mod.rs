pub mod binary;
pub mod source;

use crate::action::Action;
use crate::archive::ArchiveKind;
use crate::config::Config;
use crate::installer;
use crate::result::Result;
use crate::workspace::Workspace;
use std::path::{Path, PathBuf};
use source::SourcePackager;

/// Run one packaging action and return the artifact it produced
pub fn run(action: Action, config: &Config, workspace: &Workspace) -> Result<PathBuf> {
    let Some(dest) = destination(action, config, workspace.output_dir()) else {
        return installer::create(action, config);
    };
    match action {
        Action::BinaryZip => binary::package(workspace.prefix(), ArchiveKind::Zip, &dest),
        Action::BinaryTar => binary::package(workspace.prefix(), ArchiveKind::TarGz, &dest),
        Action::SourceZip => source_archive(config, ArchiveKind::Zip, &dest),
        Action::SourceTar => source_archive(config, ArchiveKind::TarGz, &dest),
        Action::InstallerNix | Action::InstallerWin => installer::create(action, config),
    }
}

/// Where an action writes its archive; installers produce none
pub fn destination(action: Action, config: &Config, output_dir: &Path) -> Option<PathBuf> {
    let (label, kind) = match action {
        Action::BinaryZip => ("bin", ArchiveKind::Zip),
        Action::BinaryTar => ("bin", ArchiveKind::TarGz),
        Action::SourceZip => ("src", ArchiveKind::Zip),
        Action::SourceTar => ("src", ArchiveKind::TarGz),
        Action::InstallerNix | Action::InstallerWin => return None,
    };
    Some(output_dir.join(config.artifact_name(label, kind.extension())))
}

fn source_archive(config: &Config, kind: ArchiveKind, dest: &Path) -> Result<PathBuf> {
    SourcePackager::new(config.manifest.clone(), &config.source_dir, &config.source_root)?
        .package(kind, dest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destinations() {
        let config = Config::from_toml("product = \"demo\"", Path::new(".")).unwrap();
        let out = Path::new("release");
        assert_eq!(
            destination(Action::BinaryTar, &config, out),
            Some(out.join("demo-bin.tar.gz"))
        );
        assert_eq!(
            destination(Action::SourceZip, &config, out),
            Some(out.join("demo-src.zip"))
        );
        assert_eq!(destination(Action::InstallerWin, &config, out), None);
    }
}
