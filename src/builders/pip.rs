//! Default phase actions for pip-built Python packages.

use std::fs;

use log::info;

use crate::builder::{Builder, BuilderKind};
use crate::error::{Error, Result};
use crate::exec::run_tool;
use crate::phases::BuildContext;

/// Builds Python packages into wheels and installs them with pip.
pub struct PipBuilder;

/// Wheel glob pattern for a package: `<name>-<version>*.whl`. The suffix
/// wildcard covers the build and platform tags pip appends.
pub fn wheel_pattern(name: &str, version: &str) -> String {
    format!("{}-{}*.whl", name, version)
}

impl Builder for PipBuilder {
    fn kind(&self) -> BuilderKind {
        BuilderKind::Pip
    }

    fn builder_setup(&self, _ctx: &mut BuildContext) -> Result<()> {
        run_tool(
            "python3",
            &[
                "-m".to_string(),
                "pip".to_string(),
                "install".to_string(),
                "--upgrade".to_string(),
                "pip".to_string(),
            ],
            None,
        )
    }

    fn get_source(&self, ctx: &mut BuildContext) -> Result<()> {
        crate::source::acquire(ctx)
    }

    fn patch(&self, ctx: &mut BuildContext) -> Result<()> {
        crate::patch::apply(ctx)
    }

    fn package_filename(&self, ctx: &mut BuildContext) -> Result<()> {
        ctx.package_file = Some(wheel_pattern(
            ctx.package.effective_name(),
            ctx.package.effective_version(),
        ));
        Ok(())
    }

    fn package(&self, ctx: &mut BuildContext) -> Result<()> {
        fs::create_dir_all(&ctx.config.out_dir)?;
        let mut args = vec![
            "-m".to_string(),
            "pip".to_string(),
            "wheel".to_string(),
            "--no-deps".to_string(),
            "--wheel-dir".to_string(),
            ctx.config.out_dir.display().to_string(),
        ];
        args.extend(ctx.config.build_args.iter().cloned());
        args.push(".".to_string());
        run_tool("python3", &args, ctx.source_dir.as_deref())
    }

    fn install(&self, ctx: &mut BuildContext) -> Result<()> {
        let pattern = match &ctx.package_file {
            Some(pattern) => pattern.clone(),
            None => wheel_pattern(
                ctx.package.effective_name(),
                ctx.package.effective_version(),
            ),
        };
        let full_pattern = ctx.config.out_dir.join(&pattern);
        let mut installed = 0usize;
        for entry in glob::glob(&full_pattern.to_string_lossy())? {
            let wheel = entry.map_err(|e| Error::Tool {
                tool: "pip".to_string(),
                message: e.to_string(),
            })?;
            info!("installing wheel {}", wheel.display());
            run_tool(
                "python3",
                &[
                    "-m".to_string(),
                    "pip".to_string(),
                    "install".to_string(),
                    wheel.display().to_string(),
                ],
                None,
            )?;
            installed += 1;
        }
        if installed == 0 {
            return Err(Error::Tool {
                tool: "pip".to_string(),
                message: format!(
                    "no wheel matching {} in {}",
                    pattern,
                    ctx.config.out_dir.display()
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BuildConfig, PackageId};

    #[test]
    fn test_wheel_pattern() {
        assert_eq!(wheel_pattern("foo", "1.2.3"), "foo-1.2.3*.whl");
    }

    #[test]
    fn test_package_filename_records_wheel_pattern() {
        let mut ctx = BuildContext::new(
            PackageId::new("foo", "1.2.3", BuilderKind::Pip),
            BuildConfig::default(),
        );
        PipBuilder.package_filename(&mut ctx).unwrap();
        assert_eq!(ctx.package_file.as_deref(), Some("foo-1.2.3*.whl"));
    }

    #[test]
    fn test_package_filename_honors_aliases() {
        let mut id = PackageId::new("foo", "1.2.3", BuilderKind::Pip);
        id.alias_name = Some("foo_ng".to_string());
        id.alias_version = Some("2.0".to_string());
        let mut ctx = BuildContext::new(id, BuildConfig::default());
        PipBuilder.package_filename(&mut ctx).unwrap();
        assert_eq!(ctx.package_file.as_deref(), Some("foo_ng-2.0*.whl"));
    }

    #[test]
    fn test_install_fails_without_matching_wheel() {
        let out = tempfile::tempdir().unwrap();
        let config = BuildConfig {
            out_dir: out.path().to_path_buf(),
            ..BuildConfig::default()
        };
        let mut ctx = BuildContext::new(PackageId::new("foo", "1.2.3", BuilderKind::Pip), config);
        let err = PipBuilder.install(&mut ctx).unwrap_err();
        assert!(err.to_string().contains("no wheel matching"));
    }
}
