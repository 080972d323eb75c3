//! # Source Acquisition
//!
//! Resolves a package version into a repotag, then brings the repository
//! checkout into existence: reuse when the target directory already holds a
//! git checkout, shallow clone for tag/branch refs, init + pinned fetch for
//! exact commits, optional submodule sync afterwards.
//!
//! This uses the system git command, which automatically handles SSH keys,
//! credential helpers, and anything else configured in `~/.gitconfig`.
//!
//! Failure semantics are deliberately asymmetric: a failed tag/branch clone
//! is swallowed with a warning (a missing upstream tag is a skip condition,
//! and a later phase may fail instead), while commit fetch and submodule
//! sync failures abort the run (they indicate a broken checkout rather than
//! a missing one).
//!
//! Reuse is keyed on directory presence, not content: a stale checkout is
//! reused as-is. Freshening an existing checkout is out of scope here.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::{debug, info, warn};

use crate::config::RepoTagType;
use crate::error::{Error, Result};
use crate::phases::BuildContext;

/// Scoped working-directory guard.
///
/// `push` changes into the target directory and remembers the previous one;
/// dropping the guard changes back. Acquisition hands its guard to the
/// build context, so the directory is restored exactly once no matter which
/// later phase fails.
pub struct DirGuard {
    prev: PathBuf,
}

impl DirGuard {
    pub fn push(target: &Path) -> Result<DirGuard> {
        let prev = env::current_dir()?;
        env::set_current_dir(target)?;
        debug!("entered {}", target.display());
        Ok(DirGuard { prev })
    }
}

impl Drop for DirGuard {
    fn drop(&mut self) {
        if let Err(e) = env::set_current_dir(&self.prev) {
            warn!(
                "failed to restore working directory {}: {}",
                self.prev.display(),
                e
            );
        } else {
            debug!("returned to {}", self.prev.display());
        }
    }
}

/// Derive the checkout directory name from a repository URL: the last path
/// segment with any `.git` suffix stripped.
pub fn repo_dir_name(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    let last = trimmed
        .rsplit(['/', ':'])
        .next()
        .unwrap_or(trimmed);
    last.strip_suffix(".git").unwrap_or(last).to_string()
}

/// The shared get-source default action.
///
/// Resolves the repotag, ensures a checkout exists (reuse, shallow clone,
/// or pinned commit fetch), optionally syncs submodules, then changes into
/// the checkout and records it on the context.
pub fn acquire(ctx: &mut BuildContext) -> Result<()> {
    let Some(url) = ctx.config.repo.clone() else {
        debug!("no source repository configured, skipping acquisition");
        return Ok(());
    };
    let repotag = ctx.config.resolve_repotag(&ctx.package)?;
    let dir = PathBuf::from(repo_dir_name(&url));

    info!(
        "acquiring {} at {} {} into {}",
        url,
        ctx.config.repotag_type.name(),
        repotag,
        dir.display()
    );

    if dir.join(".git").is_dir() {
        info!("existing checkout at {} - reusing", dir.display());
    } else {
        match ctx.config.repotag_type {
            RepoTagType::Tag | RepoTagType::Branch => {
                if let Err(e) = clone_at_ref(&url, &repotag, &dir) {
                    warn!("{} (continuing without a checkout)", e);
                    return Ok(());
                }
            }
            RepoTagType::Commit => fetch_commit(&url, &repotag, &dir)?,
        }
    }

    if ctx.config.submodules {
        sync_submodules(&dir, ctx.config.submodules_recursive)?;
    }

    let abs = fs::canonicalize(&dir)?;
    let guard = DirGuard::push(&abs)?;
    ctx.enter_source_dir(abs, guard);
    Ok(())
}

/// Shallow clone directly at a tag or branch.
fn clone_at_ref(url: &str, ref_name: &str, target: &Path) -> Result<()> {
    let output = Command::new("git")
        .args(["clone", "--depth=1", "--branch", ref_name, url])
        .arg(target)
        .output()
        .map_err(|e| Error::GitClone {
            url: url.to_string(),
            r#ref: ref_name.to_string(),
            message: e.to_string(),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::GitClone {
            url: url.to_string(),
            r#ref: ref_name.to_string(),
            message: stderr.trim().to_string(),
        });
    }
    Ok(())
}

/// Pin an exact commit. Shallow clone cannot target an arbitrary SHA, so
/// this inits an empty repository and fetches just that commit.
fn fetch_commit(url: &str, sha: &str, target: &Path) -> Result<()> {
    fs::create_dir_all(target)?;
    run_git(target, &["init", "--quiet"])?;
    run_git(target, &["remote", "add", "origin", url])?;
    run_git(target, &["fetch", "--depth=1", "origin", sha])?;
    run_git(target, &["reset", "--hard", "FETCH_HEAD"])?;
    Ok(())
}

/// Sync submodules after checkout. Cannot be folded into clone-time flags
/// because the commit-pinned path never runs `git clone`.
fn sync_submodules(dir: &Path, recursive: bool) -> Result<()> {
    let mut args = vec!["submodule", "update", "--init"];
    if recursive {
        args.push("--recursive");
    }
    info!("syncing submodules in {}", dir.display());
    run_git(dir, &args).map_err(|e| Error::Submodule {
        dir: dir.display().to_string(),
        message: e.to_string(),
    })
}

fn run_git(dir: &Path, args: &[&str]) -> Result<()> {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .map_err(|e| Error::GitCommand {
            command: format!("git {}", args.join(" ")),
            stderr: e.to_string(),
        })?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::GitCommand {
            command: format!("git {}", args.join(" ")),
            stderr: stderr.trim().to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::BuilderKind;
    use crate::config::{BuildConfig, PackageId};
    use serial_test::serial;

    fn test_ctx(config: BuildConfig) -> BuildContext {
        BuildContext::new(PackageId::new("foo", "1.2.3", BuilderKind::Pip), config)
    }

    #[test]
    fn test_repo_dir_name_https() {
        assert_eq!(repo_dir_name("https://github.com/acme/widget.git"), "widget");
        assert_eq!(repo_dir_name("https://github.com/acme/widget"), "widget");
        assert_eq!(repo_dir_name("https://github.com/acme/widget/"), "widget");
    }

    #[test]
    fn test_repo_dir_name_scp_style() {
        assert_eq!(repo_dir_name("git@github.com:acme/widget.git"), "widget");
    }

    #[test]
    fn test_repo_dir_name_bare() {
        assert_eq!(repo_dir_name("widget"), "widget");
    }

    #[test]
    fn test_acquire_without_repo_is_noop() {
        let mut ctx = test_ctx(BuildConfig::default());
        acquire(&mut ctx).unwrap();
        assert!(ctx.source_dir.is_none());
    }

    #[test]
    #[serial]
    fn test_acquire_reuses_existing_checkout_without_network() {
        let temp = tempfile::tempdir().unwrap();
        let _cd = DirGuard::push(temp.path()).unwrap();
        // A directory with .git metadata counts as a checkout; the bogus
        // URL proves no network fetch is attempted.
        std::fs::create_dir_all("widget/.git").unwrap();

        let config = BuildConfig {
            repo: Some("https://example.invalid/acme/widget.git".to_string()),
            ..BuildConfig::default()
        };
        let mut ctx = test_ctx(config);
        acquire(&mut ctx).unwrap();

        let source_dir = ctx.source_dir.clone().expect("checkout recorded");
        assert!(source_dir.ends_with("widget"));
        assert_eq!(env::current_dir().unwrap(), source_dir);

        ctx.restore_dir();
        assert_eq!(
            env::current_dir().unwrap(),
            fs::canonicalize(temp.path()).unwrap()
        );
    }

    #[test]
    #[serial]
    fn test_acquire_repeated_is_idempotent() {
        let temp = tempfile::tempdir().unwrap();
        let _cd = DirGuard::push(temp.path()).unwrap();
        std::fs::create_dir_all("widget/.git").unwrap();

        let config = BuildConfig {
            repo: Some("https://example.invalid/acme/widget.git".to_string()),
            ..BuildConfig::default()
        };

        for _ in 0..2 {
            let mut ctx = test_ctx(config.clone());
            acquire(&mut ctx).unwrap();
            assert!(ctx.source_dir.is_some());
            ctx.restore_dir();
        }
    }

    #[test]
    #[serial]
    fn test_tag_clone_failure_is_swallowed() {
        let temp = tempfile::tempdir().unwrap();
        let _cd = DirGuard::push(temp.path()).unwrap();

        let config = BuildConfig {
            repo: Some(format!(
                "file://{}/no-such-repo.git",
                temp.path().display()
            )),
            ..BuildConfig::default()
        };
        let mut ctx = test_ctx(config);
        // Missing upstream refs are a skip condition, not a failure.
        acquire(&mut ctx).unwrap();
        assert!(ctx.source_dir.is_none());
        assert_eq!(
            env::current_dir().unwrap(),
            fs::canonicalize(temp.path()).unwrap()
        );
    }

    #[test]
    #[serial]
    fn test_commit_fetch_failure_is_fatal() {
        let temp = tempfile::tempdir().unwrap();
        let _cd = DirGuard::push(temp.path()).unwrap();

        let config = BuildConfig {
            repo: Some(format!(
                "file://{}/no-such-repo.git",
                temp.path().display()
            )),
            repotag: Some("0123456789abcdef0123456789abcdef01234567".to_string()),
            repotag_type: RepoTagType::Commit,
            ..BuildConfig::default()
        };
        let mut ctx = test_ctx(config);
        assert!(acquire(&mut ctx).is_err());
        assert!(ctx.source_dir.is_none());
    }

    #[test]
    #[serial]
    fn test_dir_guard_restores_on_drop() {
        let before = env::current_dir().unwrap();
        let temp = tempfile::tempdir().unwrap();
        {
            let _guard = DirGuard::push(temp.path()).unwrap();
            assert_ne!(env::current_dir().unwrap(), before);
        }
        assert_eq!(env::current_dir().unwrap(), before);
    }
}
