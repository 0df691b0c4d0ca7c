//! rust-android command line
//!
//! Builds the configured Rust library for every target of a variant and
//! stages the results under `build/intermediates/rustJniLibs`.

use std::path::PathBuf;
use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use rust_android::commands::{BuildCommand, EnvCommand, PlanCommand, ToolchainsCommand, VariantOptions};
use rust_android::core::{PROJECT_FILE, VERSION};

#[derive(Parser)]
#[command(name = "rust-android", version, about = "Cross-compile Rust libraries for Android")]
struct Cli {
    /// Project file
    #[arg(short, long, default_value = PROJECT_FILE, global = true)]
    config: PathBuf,

    /// Debug logging (also passes --verbose to cargo unless configured otherwise)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args)]
struct VariantArgs {
    /// Variant name, defaults to the configured profile
    #[arg(long)]
    variant: Option<String>,

    /// Build type, defaults to the variant name
    #[arg(long)]
    build_type: Option<String>,

    /// Treat the variant as not debuggable
    #[arg(long)]
    no_debuggable: bool,

    /// Only these platforms instead of the configured targets
    #[arg(long = "target")]
    targets: Vec<String>,
}

impl VariantArgs {
    fn variant(&self) -> VariantOptions {
        VariantOptions {
            name: self.variant.clone(),
            build_type: self.build_type.clone(),
            no_debuggable: self.no_debuggable,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Build and stage every target of a variant
    Build(VariantArgs),
    /// Show the build units of a variant
    Plan(VariantArgs),
    /// List supported platforms
    Toolchains {
        /// Show generated NDK toolchains instead of prebuilt ones
        #[arg(long)]
        generated: bool,
    },
    /// Print the cargo environment for one platform
    Env {
        platform: String,
    },
}

/// Main entry point
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    info!("rust-android v{}", VERSION);

    let result = match cli.command {
        Command::Build(args) => BuildCommand {
            config_path: cli.config,
            variant: args.variant(),
            targets: args.targets,
        }
        .execute()
        .await
        .map(|_| ()),
        Command::Plan(args) => PlanCommand {
            config_path: cli.config,
            variant: args.variant(),
            targets: args.targets,
        }
        .execute(),
        Command::Toolchains { generated } => ToolchainsCommand { generated }.execute(),
        Command::Env { platform } => EnvCommand {
            config_path: cli.config,
            platform,
        }
        .execute(),
    };

    if let Err(ref e) = result {
        error!("{:#}", e);
    }
    result
}
