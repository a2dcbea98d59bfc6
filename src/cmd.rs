use crate::context::Context;
use crate::error::{Error, IoResultExt};
use crate::result::Result;
use std::path::Path;
use std::process::{Command, Stdio};

/// Run `program` in `cwd`, wait for it and return its combined
/// stdout and stderr. A non-zero exit, or a program that cannot be
/// started, is a [`Error::BuildFailure`].
pub fn execute(ctx: &Context, cwd: &Path, program: &str, args: &[String]) -> Result<String> {
    let command_line = command_line(program, args);
    if ctx.verbose {
        log::info!("Executing: {} (in {})", command_line, cwd.display());
    }

    let output = match Command::new(program)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .output()
    {
        Ok(output) => output,
        Err(e) => {
            return Err(Error::BuildFailure {
                command: command_line,
                code: -1,
                output: format!("failed to start {}: {}", program, e),
            });
        }
    };

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));

    if !output.status.success() {
        return Err(Error::BuildFailure {
            command: command_line,
            code: output.status.code().unwrap_or(-1),
            output: combined,
        });
    }

    Ok(combined)
}

/// Check that `cwd` is usable before spawning anything in it
pub fn check_dir(cwd: &Path) -> Result<()> {
    let metadata = std::fs::metadata(cwd).at_path(cwd)?;
    if !metadata.is_dir() {
        return Err(Error::custom(format!("{} is not a directory", cwd.display())));
    }
    Ok(())
}

fn command_line(program: &str, args: &[String]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}
