//! Default phase actions for Maven-built JVM packages.

use crate::builder::{Builder, BuilderKind};
use crate::error::Result;
use crate::exec::run_tool;
use crate::phases::BuildContext;

/// Drives `mvn` in batch mode with the configured worker count.
pub struct MavenBuilder;

fn mvn_args(ctx: &BuildContext, goal: &str, skip_tests: bool) -> Vec<String> {
    let mut args = vec![
        "-B".to_string(),
        "-T".to_string(),
        ctx.config.jobs.to_string(),
    ];
    if skip_tests {
        args.push("-DskipTests".to_string());
    }
    args.extend(ctx.config.build_args.iter().cloned());
    args.push(goal.to_string());
    args
}

impl Builder for MavenBuilder {
    fn kind(&self) -> BuilderKind {
        BuilderKind::Maven
    }

    fn get_source(&self, ctx: &mut BuildContext) -> Result<()> {
        crate::source::acquire(ctx)
    }

    fn patch(&self, ctx: &mut BuildContext) -> Result<()> {
        crate::patch::apply(ctx)
    }

    fn compile(&self, ctx: &mut BuildContext) -> Result<()> {
        let args = mvn_args(ctx, "compile", false);
        run_tool("mvn", &args, ctx.source_dir.as_deref())
    }

    fn package_filename(&self, ctx: &mut BuildContext) -> Result<()> {
        ctx.package_file = Some(format!(
            "target/{}-{}.jar",
            ctx.package.effective_name(),
            ctx.package.effective_version()
        ));
        Ok(())
    }

    fn package(&self, ctx: &mut BuildContext) -> Result<()> {
        let args = mvn_args(ctx, "package", true);
        run_tool("mvn", &args, ctx.source_dir.as_deref())
    }

    fn install(&self, ctx: &mut BuildContext) -> Result<()> {
        let args = mvn_args(ctx, "install", true);
        run_tool("mvn", &args, ctx.source_dir.as_deref())
    }
}
