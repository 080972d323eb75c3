//! Child-process plumbing shared by builder defaults, phase overrides, and
//! the requirements iterator.
//!
//! All external tools run with inherited stdio so their output streams to
//! the user. A non-zero exit maps to [`Error::Tool`]; nothing here retries
//! or swallows failures.

use std::path::Path;
use std::process::Command;

use log::info;

use crate::error::{Error, Result};
use crate::phases::BuildContext;

/// Run an external tool and fail on non-zero exit.
pub fn run_tool(program: &str, args: &[String], cwd: Option<&Path>) -> Result<()> {
    info!("running {} {}", program, args.join(" "));
    let mut cmd = Command::new(program);
    cmd.args(args);
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }
    let status = cmd.status().map_err(|e| Error::Tool {
        tool: program.to_string(),
        message: e.to_string(),
    })?;
    if !status.success() {
        return Err(Error::Tool {
            tool: program.to_string(),
            message: format!("exited with {}", status),
        });
    }
    Ok(())
}

/// Run a shell command with the build context exported into its
/// environment. Used for phase overrides from the project override file.
///
/// The command runs inside the checkout when one exists, in the invocation
/// directory otherwise.
pub fn run_shell(command: &str, ctx: &BuildContext) -> Result<()> {
    info!("running override command: {}", command);
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    for (key, value) in ctx.export_env() {
        cmd.env(key, value);
    }
    if let Some(dir) = &ctx.source_dir {
        cmd.current_dir(dir);
    }
    let status = cmd.status().map_err(|e| Error::Tool {
        tool: "sh".to_string(),
        message: e.to_string(),
    })?;
    if !status.success() {
        return Err(Error::Tool {
            tool: "sh".to_string(),
            message: format!("override command exited with {}", status),
        });
    }
    Ok(())
}

/// Split a whitespace-separated option string (`PKG_BUILD_ARGS` and
/// friends) into argv elements. Empty input yields no elements.
pub fn split_opts(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(str::to_string).collect()
}
