//! Default phase actions for CMake-built packages.

use crate::builder::{Builder, BuilderKind};
use crate::error::Result;
use crate::exec::run_tool;
use crate::phases::BuildContext;

/// Out-of-tree build directory name used by the configure default.
const BUILD_DIR: &str = "build";

/// Drives the cmake configure/build/install flow with an out-of-tree
/// build directory, plus `cpack` for the package phase.
pub struct CmakeBuilder;

impl Builder for CmakeBuilder {
    fn kind(&self) -> BuilderKind {
        BuilderKind::Cmake
    }

    fn get_source(&self, ctx: &mut BuildContext) -> Result<()> {
        crate::source::acquire(ctx)
    }

    fn patch(&self, ctx: &mut BuildContext) -> Result<()> {
        crate::patch::apply(ctx)
    }

    fn configure(&self, ctx: &mut BuildContext) -> Result<()> {
        let mut args = vec![
            "-S".to_string(),
            ".".to_string(),
            "-B".to_string(),
            BUILD_DIR.to_string(),
        ];
        args.extend(ctx.config.build_args.iter().cloned());
        run_tool("cmake", &args, ctx.source_dir.as_deref())
    }

    fn compile(&self, ctx: &mut BuildContext) -> Result<()> {
        let mut args = vec![
            "--build".to_string(),
            BUILD_DIR.to_string(),
            "--parallel".to_string(),
            ctx.config.jobs.to_string(),
        ];
        for target in &ctx.config.build_targets {
            args.push("--target".to_string());
            args.push(target.clone());
        }
        run_tool("cmake", &args, ctx.source_dir.as_deref())
    }

    fn package(&self, ctx: &mut BuildContext) -> Result<()> {
        std::fs::create_dir_all(&ctx.config.out_dir)?;
        let args = vec![
            "-B".to_string(),
            ctx.config.out_dir.display().to_string(),
        ];
        let build_dir = ctx
            .source_dir
            .as_ref()
            .map(|d| d.join(BUILD_DIR))
            .unwrap_or_else(|| BUILD_DIR.into());
        run_tool("cpack", &args, Some(&build_dir))
    }

    fn install(&self, ctx: &mut BuildContext) -> Result<()> {
        let args = vec![
            "--install".to_string(),
            BUILD_DIR.to_string(),
            "--prefix".to_string(),
            ctx.config.out_dir.display().to_string(),
        ];
        run_tool("cmake", &args, ctx.source_dir.as_deref())
    }
}
