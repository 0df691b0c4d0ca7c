//! CLI commands for rust-android
//!
//! Provides command-line interface functionality for automation and scripting.

use std::path::{Path, PathBuf};
use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use rust_android_build_engine::{BuildContext, StagedArtifact, Variant, VariantBuild};
use rust_android_core::Settings;
use rust_android_toolchain::{HostPlatform, ToolchainKind, ToolchainRegistry};

fn load_context(config_path: &Path) -> Result<BuildContext> {
    let settings = Settings::load(config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;
    Ok(BuildContext::new(settings, HostPlatform::current())?)
}

/// Variant as selected on the command line
#[derive(Debug, Clone, Default)]
pub struct VariantOptions {
    /// Variant name; the project's default variant when unset
    pub name: Option<String>,
    pub build_type: Option<String>,
    pub no_debuggable: bool,
}

impl VariantOptions {
    pub fn resolve(&self, default: Variant) -> Variant {
        let mut variant = match self.name {
            Some(ref name) => Variant::new(name),
            None => default,
        };
        if let Some(ref build_type) = self.build_type {
            variant = variant.with_build_type(build_type);
        }
        if self.no_debuggable {
            variant = variant.with_debuggable(false);
        }
        variant
    }
}

/// Units of a variant, optionally restricted to some platforms
fn variant_build(ctx: &BuildContext, variant: &Variant, targets: &[String]) -> Result<VariantBuild> {
    if targets.is_empty() {
        return Ok(ctx.variant(variant)?);
    }

    let units = targets
        .iter()
        .map(|platform| ctx.unit(variant, platform))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(VariantBuild {
        name: variant.task_name(),
        units,
    })
}

/// Build command options
pub struct BuildCommand {
    pub config_path: PathBuf,
    pub variant: VariantOptions,
    pub targets: Vec<String>,
}

impl BuildCommand {
    /// Build every unit of the variant and stage the libraries
    pub async fn execute(&self) -> Result<Vec<StagedArtifact>> {
        let ctx = load_context(&self.config_path)?;
        let variant = self.variant.resolve(ctx.default_variant());
        let build = variant_build(&ctx, &variant, &self.targets)?;

        info!("Building variant {} ({})", variant.name, variant.profile());

        let mut staged = Vec::new();
        let mut failed = Vec::new();

        for outcome in build.run(&ctx).await {
            match outcome.result {
                Ok(artifact) => {
                    if artifact.is_empty() {
                        warn!("{}: nothing staged for {}", outcome.unit, outcome.abi);
                    }
                    staged.push(artifact);
                }
                Err(_) => failed.push(outcome.unit),
            }
        }

        if !failed.is_empty() {
            bail!("{} failed: {}", build.name, failed.join(", "));
        }

        info!("{} finished, {} target(s) staged", build.name, staged.len());
        Ok(staged)
    }
}

/// Plan command options
pub struct PlanCommand {
    pub config_path: PathBuf,
    pub variant: VariantOptions,
    pub targets: Vec<String>,
}

impl PlanCommand {
    /// Print the units a build would run
    pub fn execute(&self) -> Result<()> {
        let ctx = load_context(&self.config_path)?;
        let variant = self.variant.resolve(ctx.default_variant());
        let build = variant_build(&ctx, &variant, &self.targets)?;

        println!("{} ({})", build.name, variant.profile());
        for unit in &build.units {
            println!(
                "  {:<32} {:<20} {:<28} {:<14} {}",
                unit.name,
                unit.request.platform,
                unit.toolchain.target,
                unit.abi(),
                unit.output_dir.join(unit.abi()).display()
            );
        }
        Ok(())
    }
}

/// Toolchains command options
pub struct ToolchainsCommand {
    /// Show the generated-toolchain entries instead of the prebuilt ones
    pub generated: bool,
}

impl ToolchainsCommand {
    /// List the supported platforms
    pub fn execute(&self) -> Result<()> {
        let kind = if self.generated {
            ToolchainKind::AndroidGenerated
        } else {
            ToolchainKind::AndroidPrebuilt
        };

        for t in ToolchainRegistry::new(kind).iter() {
            println!(
                "{:<20} {:<10} {:<28} {}",
                t.platform,
                t.kind.as_str(),
                t.target,
                t.folder
            );
        }
        Ok(())
    }
}

/// Env command options
pub struct EnvCommand {
    pub config_path: PathBuf,
    pub platform: String,
}

impl EnvCommand {
    /// Print the environment cargo would get for one platform
    pub fn execute(&self) -> Result<()> {
        let ctx = load_context(&self.config_path)?;
        let unit = ctx.unit(&ctx.default_variant(), &self.platform)?;
        let env = unit.environment(&ctx)?;

        if env.is_empty() {
            info!("{} uses the host toolchain, no variables needed", self.platform);
            return Ok(());
        }

        print!("{}", env.shell_exports(ctx.synthesizer().host()));
        Ok(())
    }
}
