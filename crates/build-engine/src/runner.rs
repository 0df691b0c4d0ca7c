//! Build Runner
//!
//! One build unit per (variant, platform), grouped under one umbrella per
//! variant. Units share nothing mutable: each gets its own environment map
//! and its own output directory.

use std::path::{Path, PathBuf};
use std::time::Instant;
use futures::future::join_all;
use tracing::{error, info};

use rust_android_core::Settings;
use rust_android_toolchain::{
    detect_default_triple, EnvironmentSynthesizer, HostPlatform, LinkerWrapper, NdkInstallation,
    ResolvedEnvironment, ToolchainDescriptor, ToolchainRegistry,
};

use crate::cargo_build::{CargoCommand, Invocation};
use crate::config::{BuildRequest, Variant};
use crate::stager::{self, StagedArtifact};
use crate::BuildError;

/// Read-only state shared by every unit of a build
#[derive(Debug, Clone)]
pub struct BuildContext {
    settings: Settings,
    registry: ToolchainRegistry,
    ndk: Option<NdkInstallation>,
    synthesizer: EnvironmentSynthesizer,
}

impl BuildContext {
    /// Validate settings and locate the NDK
    pub fn new(settings: Settings, host: HostPlatform) -> Result<Self, BuildError> {
        settings.validate()?;

        let ndk = settings
            .ndk_dir()
            .map(|dir| NdkInstallation::from_dir(&dir))
            .transpose()?;

        let ndk_major = ndk.as_ref().and_then(|n| n.version_major().ok());
        let registry = ToolchainRegistry::for_ndk(settings.prebuilt_toolchains()?, ndk_major);

        let synthesizer = EnvironmentSynthesizer::new(
            host,
            LinkerWrapper::in_build_dir(&settings.build_dir()),
            settings.python_command(),
        );

        Ok(Self {
            settings,
            registry,
            ndk,
            synthesizer,
        })
    }

    /// Replace the NDK found in the settings
    pub fn with_ndk(mut self, ndk: NdkInstallation) -> Self {
        self.ndk = Some(ndk);
        self
    }

    /// Replace the toolchain registry
    pub fn with_registry(mut self, registry: ToolchainRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn registry(&self) -> &ToolchainRegistry {
        &self.registry
    }

    pub fn ndk(&self) -> Option<&NdkInstallation> {
        self.ndk.as_ref()
    }

    pub fn synthesizer(&self) -> &EnvironmentSynthesizer {
        &self.synthesizer
    }

    /// Variant built when none is named, after the configured profile
    pub fn default_variant(&self) -> Variant {
        Variant::new(self.settings.default_profile().as_str())
    }

    /// Root of all staged libraries for a variant
    pub fn jni_libs_dir(&self, variant: &Variant) -> PathBuf {
        self.settings
            .build_dir()
            .join("intermediates")
            .join("rustJniLibs")
            .join(&variant.name)
    }

    /// Resolve one unit. Every configuration problem surfaces here, before
    /// any process is started.
    pub fn unit(&self, variant: &Variant, platform: &str) -> Result<BuildUnit, BuildError> {
        let toolchain = self.registry.resolve(platform)?;

        let android = if toolchain.is_desktop() {
            None
        } else {
            let ndk = self.ndk.clone().ok_or_else(|| {
                BuildError::Config(rust_android_core::CoreError::config(format!(
                    "Android NDK not found for target '{}'. Set `cargo.ndk_directory`, `ndk.dir` or ANDROID_NDK_HOME.",
                    platform
                )))
            })?;
            ndk.version_major()?;
            Some(AndroidTarget {
                ndk,
                api_level: self.settings.api_level(platform)?,
            })
        };

        let request = BuildRequest {
            platform: platform.to_string(),
            profile: variant.profile(),
            libname: self.settings.libname()?.to_string(),
            module_dir: self.settings.module_dir()?,
            extra_args: self.settings.extra_cargo_build_arguments().to_vec(),
            features: self.settings.features().clone(),
        };

        Ok(BuildUnit {
            name: variant.target_task_name(platform),
            toolchain,
            output_dir: self.jni_libs_dir(variant).join(platform),
            android,
            request,
        })
    }

    /// All units of a variant
    pub fn variant(&self, variant: &Variant) -> Result<VariantBuild, BuildError> {
        let units = self
            .settings
            .targets()?
            .iter()
            .map(|platform| self.unit(variant, platform))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(VariantBuild {
            name: variant.task_name(),
            units,
        })
    }
}

/// NDK inputs of an Android unit
#[derive(Debug, Clone)]
pub struct AndroidTarget {
    pub ndk: NdkInstallation,
    pub api_level: u32,
}

/// One cargo build for one platform of one variant
#[derive(Debug, Clone)]
pub struct BuildUnit {
    pub name: String,
    pub toolchain: &'static ToolchainDescriptor,
    pub request: BuildRequest,
    /// Staged libraries go to `<output_dir>/<abi>`
    pub output_dir: PathBuf,
    /// `None` for desktop platforms
    pub android: Option<AndroidTarget>,
}

/// A unit with its default triple detected and its invocation built
#[derive(Debug, Clone)]
pub struct PreparedBuild {
    pub default_target: Option<String>,
    pub invocation: Invocation,
}

impl BuildUnit {
    pub fn abi(&self) -> &'static str {
        self.toolchain.abi()
    }

    /// Environment for this unit's cargo process
    pub fn environment(&self, ctx: &BuildContext) -> Result<ResolvedEnvironment, BuildError> {
        match self.android {
            Some(ref android) => Ok(ctx.synthesizer.synthesize(
                self.toolchain,
                &android.ndk,
                android.api_level,
                &self.request.libname,
                ctx.settings.generate_build_id(),
            )?),
            None => Ok(ResolvedEnvironment::new()),
        }
    }

    /// Build the invocation for a known default triple
    pub fn invocation(
        &self,
        ctx: &BuildContext,
        default_target: Option<&str>,
    ) -> Result<Invocation, BuildError> {
        let command = CargoCommand {
            cargo: ctx.settings.cargo_command(),
            rustup_channel: ctx.settings.rustup_channel(),
            verbose: ctx.settings.verbose(),
            features: self.request.features.clone(),
            profile: self.request.profile,
            target: self.toolchain.target.to_string(),
            default_target: default_target.map(str::to_string),
            extra_args: self.request.extra_args.clone(),
        };

        let working_dir = self
            .request
            .module_dir
            .canonicalize()
            .unwrap_or_else(|_| self.request.module_dir.clone());

        Ok(Invocation::new(command.args(), working_dir, self.environment(ctx)?))
    }

    /// Detect the default triple and build the invocation
    pub async fn prepare(&self, ctx: &BuildContext) -> Result<PreparedBuild, BuildError> {
        let default_target = detect_default_triple(&ctx.settings.rustc_command()).await;
        let invocation = self.invocation(ctx, default_target.as_deref())?;
        Ok(PreparedBuild {
            default_target,
            invocation,
        })
    }

    /// Where cargo writes this unit's output
    pub fn cargo_output_dir(&self, ctx: &BuildContext, default_target: Option<&str>) -> PathBuf {
        let settings = &ctx.settings;
        let root = stager::cargo_target_root(
            settings.local_target_dir(),
            settings.env_target_dir(),
            settings.cargo().target_directory.as_deref(),
            &self.request.module_dir,
            settings.root_dir(),
        );
        stager::build_output_dir(&root, self.toolchain.target, default_target, self.request.profile)
    }

    /// Copy the built library into `<output_dir>/<abi>`
    pub fn stage(&self, ctx: &BuildContext, default_target: Option<&str>) -> Result<StagedArtifact, BuildError> {
        stager::stage(
            &self.output_dir,
            &self.cargo_output_dir(ctx, default_target),
            self.abi(),
            ctx.settings.target_includes(),
            &self.request.libname,
        )
    }

    /// Run cargo, then stage its output
    pub async fn run(&self, ctx: &BuildContext) -> Result<StagedArtifact, BuildError> {
        let start = Instant::now();
        info!("{}: building {} for {}", self.name, self.request.libname, self.toolchain.target);

        let prepared = self.prepare(ctx).await?;
        prepared.invocation.run().await?;
        let staged = self.stage(ctx, prepared.default_target.as_deref())?;

        info!("{}: done in {:.2}s", self.name, start.elapsed().as_secs_f64());
        Ok(staged)
    }
}

/// Outcome of one unit
#[derive(Debug)]
pub struct UnitOutcome {
    pub unit: String,
    pub abi: &'static str,
    pub result: Result<StagedArtifact, BuildError>,
}

/// All units of one variant
#[derive(Debug, Clone)]
pub struct VariantBuild {
    pub name: String,
    pub units: Vec<BuildUnit>,
}

impl VariantBuild {
    /// Run every unit concurrently. A failing unit does not stop the others.
    pub async fn run(&self, ctx: &BuildContext) -> Vec<UnitOutcome> {
        info!("{}: {} target(s)", self.name, self.units.len());

        join_all(self.units.iter().map(|unit| async move {
            let result = unit.run(ctx).await;
            if let Err(ref e) = result {
                error!("{} failed: {}", unit.name, e);
            }
            UnitOutcome {
                unit: unit.name.clone(),
                abi: unit.abi(),
                result,
            }
        }))
        .await
    }

    /// Directories holding staged libraries, one per unit
    pub fn output_dirs(&self) -> impl Iterator<Item = &Path> {
        self.units.iter().map(|u| u.output_dir.as_path())
    }
}
