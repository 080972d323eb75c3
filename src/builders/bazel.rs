//! Default phase actions for Bazel-built packages.
//!
//! Bazel has no separate configure or packaging step: packaging is just
//! another build target, so only compile gets a default here. Projects
//! needing more override the remaining phases.

use crate::builder::{Builder, BuilderKind};
use crate::error::Result;
use crate::exec::run_tool;
use crate::phases::BuildContext;

/// Drives `bazel build` with the configured jobs, args, and targets.
pub struct BazelBuilder;

fn build_args(ctx: &BuildContext) -> Vec<String> {
    let mut args = vec![
        "build".to_string(),
        "--jobs".to_string(),
        ctx.config.jobs.to_string(),
    ];
    args.extend(ctx.config.build_args.iter().cloned());
    if ctx.config.build_targets.is_empty() {
        args.push("//...".to_string());
    } else {
        args.extend(ctx.config.build_targets.iter().cloned());
    }
    args
}

impl Builder for BazelBuilder {
    fn kind(&self) -> BuilderKind {
        BuilderKind::Bazel
    }

    fn get_source(&self, ctx: &mut BuildContext) -> Result<()> {
        crate::source::acquire(ctx)
    }

    fn patch(&self, ctx: &mut BuildContext) -> Result<()> {
        crate::patch::apply(ctx)
    }

    fn compile(&self, ctx: &mut BuildContext) -> Result<()> {
        let args = build_args(ctx);
        run_tool("bazel", &args, ctx.source_dir.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BuildConfig, PackageId};

    #[test]
    fn test_build_args_default_target() {
        let config = BuildConfig {
            jobs: 8,
            ..BuildConfig::default()
        };
        let ctx = BuildContext::new(PackageId::new("svc", "0.3", BuilderKind::Bazel), config);
        assert_eq!(build_args(&ctx), vec!["build", "--jobs", "8", "//..."]);
    }

    #[test]
    fn test_build_args_explicit_targets_and_args() {
        let config = BuildConfig {
            jobs: 2,
            build_args: vec!["--config=release".to_string()],
            build_targets: vec!["//pkg:dist".to_string()],
            ..BuildConfig::default()
        };
        let ctx = BuildContext::new(PackageId::new("svc", "0.3", BuilderKind::Bazel), config);
        assert_eq!(
            build_args(&ctx),
            vec!["build", "--jobs", "2", "--config=release", "//pkg:dist"]
        );
    }
}
