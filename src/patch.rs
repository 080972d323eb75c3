//! # Patch Application
//!
//! Applies an optional project patch to the checkout. The patch file name
//! is derived deterministically from the checkout directory name and the
//! package version, so a patch directory can hold one patch per package
//! revision.
//!
//! Idempotence guard: before applying, a reverse dry-run is attempted. If
//! the reversal would succeed the patch is already present in the working
//! tree and nothing is written. A missing patch file is a no-op, not an
//! error.

use std::path::Path;
use std::process::{Command, Stdio};

use log::{debug, info};

use crate::error::{Error, Result};
use crate::phases::BuildContext;

/// Deterministic patch file name: `<source-dir>-<version>.patch`.
pub fn patch_filename(source_dir_name: &str, version: &str) -> String {
    format!("{}-{}.patch", source_dir_name, version)
}

/// The shared patch default action.
pub fn apply(ctx: &mut BuildContext) -> Result<()> {
    let Some(patch_dir) = ctx.config.patch_dir.clone() else {
        debug!("no patch directory configured, skipping patch phase");
        return Ok(());
    };
    let Some(source_dir) = ctx.source_dir.clone() else {
        debug!("no checkout present, skipping patch phase");
        return Ok(());
    };
    let dir_name = source_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let file = patch_dir.join(patch_filename(
        &dir_name,
        ctx.package.effective_version(),
    ));
    if !file.exists() {
        debug!("no patch file at {} - nothing to apply", file.display());
        return Ok(());
    }

    if reverse_applies(&file, &source_dir)? {
        info!("patch {} already applied", file.display());
        return Ok(());
    }
    apply_forward(&file, &source_dir)
}

/// Dry-run reverse apply: succeeds only when the patch is already present
/// in the working tree.
fn reverse_applies(file: &Path, dir: &Path) -> Result<bool> {
    let status = Command::new("patch")
        .args(["-R", "-p1", "--dry-run", "--force", "-i"])
        .arg(file)
        .current_dir(dir)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map_err(|e| Error::Patch {
            file: file.display().to_string(),
            message: e.to_string(),
        })?;
    Ok(status.success())
}

fn apply_forward(file: &Path, dir: &Path) -> Result<()> {
    info!("applying patch {}", file.display());
    let output = Command::new("patch")
        .args(["-N", "-p1", "-i"])
        .arg(file)
        .current_dir(dir)
        .output()
        .map_err(|e| Error::Patch {
            file: file.display().to_string(),
            message: e.to_string(),
        })?;
    if !output.status.success() {
        let mut message = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            if !message.is_empty() {
                message.push('\n');
            }
            message.push_str(stderr.trim());
        }
        return Err(Error::Patch {
            file: file.display().to_string(),
            message,
        });
    }
    Ok(())
}
