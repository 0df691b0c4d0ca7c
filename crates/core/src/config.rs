//! Project Configuration
//!
//! Settings come from three places:
//! - the project file (`rust-android.toml`, `[cargo]` table)
//! - `local.properties` next to it (per-machine overrides)
//! - the process environment
//!
//! Named settings resolve in that order, falling back to a built-in default.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{CoreError, Result};
use crate::properties::Properties;

/// Default project file name
pub const PROJECT_FILE: &str = "rust-android.toml";

/// Per-machine overrides file name
pub const LOCAL_PROPERTIES: &str = "local.properties";

/// Build optimization mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    #[default]
    Debug,
    Release,
}

impl Profile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Debug => "debug",
            Profile::Release => "release",
        }
    }

    pub fn cargo_flag(&self) -> Option<&'static str> {
        match self {
            Profile::Debug => None,
            Profile::Release => Some("--release"),
        }
    }

    /// Parse a profile name. Only exactly `release` selects a release build.
    pub fn from_name(name: &str) -> Self {
        if name == "release" {
            Profile::Release
        } else {
            Profile::Debug
        }
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cargo feature names, deduplicated, keeping first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct FeatureSet(Vec<String>);

impl FeatureSet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut features: Vec<String> = Vec::new();
        for name in names {
            let name = name.into();
            if !features.contains(&name) {
                features.push(name);
            }
        }
        Self(features)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Space-joined, as cargo's `--features` expects
    pub fn joined(&self) -> String {
        self.0.join(" ")
    }
}

impl From<Vec<String>> for FeatureSet {
    fn from(names: Vec<String>) -> Self {
        Self::new(names)
    }
}

impl From<FeatureSet> for Vec<String> {
    fn from(set: FeatureSet) -> Self {
        set.0
    }
}

/// Which cargo features to build with. Exactly one mode is active.
///
/// In TOML: `features = { all = true }` (or just `features = "all"`),
/// `features = { default_and = ["a"] }` or `features = { no_default_but = ["a"] }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "FeatureTable")]
pub enum FeatureSelection {
    All,
    DefaultAnd(FeatureSet),
    NoDefaultBut(FeatureSet),
}

impl Default for FeatureSelection {
    fn default() -> Self {
        FeatureSelection::DefaultAnd(FeatureSet::default())
    }
}

/// Accepted spellings of `features`
#[derive(Deserialize)]
#[serde(untagged)]
enum FeatureTable {
    Mode(String),
    Table {
        #[serde(default)]
        all: bool,
        default_and: Option<FeatureSet>,
        no_default_but: Option<FeatureSet>,
    },
}

impl TryFrom<FeatureTable> for FeatureSelection {
    type Error = String;

    fn try_from(table: FeatureTable) -> std::result::Result<Self, Self::Error> {
        match table {
            FeatureTable::Mode(mode) if mode == "all" => Ok(FeatureSelection::All),
            FeatureTable::Mode(mode) => Err(format!("unknown feature mode `{}`, expected `all`", mode)),
            FeatureTable::Table {
                all,
                default_and,
                no_default_but,
            } => match (all, default_and, no_default_but) {
                (true, None, None) => Ok(FeatureSelection::All),
                (false, Some(set), None) => Ok(FeatureSelection::DefaultAnd(set)),
                (false, None, Some(set)) => Ok(FeatureSelection::NoDefaultBut(set)),
                (false, None, None) => Ok(FeatureSelection::default()),
                _ => Err("only one of `all`, `default_and` and `no_default_but` may be set".to_string()),
            },
        }
    }
}

/// The `[cargo]` table of the project file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CargoConfig {
    /// Directory of the crate to build, relative to the project root
    pub module: Option<String>,
    /// Library name, without `lib` prefix or extension
    pub libname: Option<String>,
    /// Platform names to build for
    pub targets: Option<Vec<String>>,
    /// Prefer prebuilt NDK toolchains over generated ones
    pub prebuilt_toolchains: Option<bool>,
    /// Pass `--verbose` to cargo
    pub verbose: Option<bool>,
    /// Cargo target directory override
    pub target_directory: Option<String>,
    /// Glob patterns selecting the files to stage
    pub target_includes: Option<Vec<String>>,
    /// Profile of the default variant, used when none is named
    pub profile: Profile,
    /// Appended verbatim to the cargo command line
    pub extra_cargo_build_arguments: Option<Vec<String>>,
    /// API level used when `api_levels` has no entry for a platform
    pub api_level: Option<u32>,
    /// Per-platform API levels
    pub api_levels: HashMap<String, u32>,
    /// Emit a build ID when linking
    pub generate_build_id: bool,
    pub features: FeatureSelection,
    pub cargo_command: String,
    pub rustup_channel: String,
    pub python_command: String,
    pub rustc_command: String,
    /// Android NDK installation
    pub ndk_directory: Option<PathBuf>,
}

impl Default for CargoConfig {
    fn default() -> Self {
        Self {
            module: None,
            libname: None,
            targets: None,
            prebuilt_toolchains: None,
            verbose: None,
            target_directory: None,
            target_includes: None,
            profile: Profile::Debug,
            extra_cargo_build_arguments: None,
            api_level: None,
            api_levels: HashMap::new(),
            generate_build_id: false,
            features: FeatureSelection::default(),
            cargo_command: String::new(),
            rustup_channel: String::new(),
            python_command: String::new(),
            rustc_command: String::new(),
            ndk_directory: None,
        }
    }
}

/// Contents of the project file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Project name, used for `rust.targets.<name>` overrides
    pub name: Option<String>,
    /// Build directory, relative to the project root
    pub build_dir: Option<PathBuf>,
    pub cargo: CargoConfig,
}

impl ProjectConfig {
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

/// Fully merged view over project file, `local.properties` and environment
#[derive(Debug, Clone)]
pub struct Settings {
    root_dir: PathBuf,
    project: ProjectConfig,
    local: Properties,
    env: HashMap<String, String>,
}

impl Settings {
    /// Combine already-loaded sources
    pub fn new(
        root_dir: PathBuf,
        project: ProjectConfig,
        local: Properties,
        env: HashMap<String, String>,
    ) -> Self {
        Self {
            root_dir,
            project,
            local,
            env,
        }
    }

    /// Load the project file and its sibling `local.properties`, capturing
    /// the current process environment
    pub fn load(config_path: &Path) -> Result<Self> {
        info!("Loading configuration from {:?}", config_path);

        let content = std::fs::read_to_string(config_path)?;
        let project = ProjectConfig::from_toml(&content)?;

        let root_dir = project_root(config_path)?;
        let local = Properties::load(&root_dir.join(LOCAL_PROPERTIES))?;
        debug!("Loaded {} local properties", local.len());

        Ok(Self::new(root_dir, project, local, std::env::vars().collect()))
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    pub fn cargo(&self) -> &CargoConfig {
        &self.project.cargo
    }

    /// Project name, defaulting to the root directory's name
    pub fn project_name(&self) -> String {
        if let Some(ref name) = self.project.name {
            return name.clone();
        }
        self.root_dir
            .canonicalize()
            .ok()
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().to_string()))
            .unwrap_or_else(|| "project".to_string())
    }

    /// Build directory of the project
    pub fn build_dir(&self) -> PathBuf {
        let dir = self
            .project
            .build_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("build"));
        self.resolve(dir)
    }

    /// Environment variable from the captured environment
    pub fn env_var(&self, name: &str) -> Option<&str> {
        self.env.get(name).map(String::as_str)
    }

    /// `local.properties` value, then environment variable
    pub fn property(&self, camel_case_name: &str, snake_case_name: &str) -> Option<&str> {
        self.local
            .get(camel_case_name)
            .or_else(|| self.env_var(snake_case_name))
    }

    /// Boolean property: `1`/`true`/`0`/`false`; unset or empty is `None`
    pub fn flag_property(&self, camel_case_name: &str, snake_case_name: &str) -> Result<Option<bool>> {
        match self.property(camel_case_name, snake_case_name) {
            None | Some("") => Ok(None),
            Some("1") | Some("true") => Ok(Some(true)),
            Some("0") | Some("false") => Ok(Some(false)),
            Some(_) => Err(CoreError::InvalidFlag {
                property: camel_case_name.to_string(),
                env: snake_case_name.to_string(),
            }),
        }
    }

    fn named(&self, explicit: &str, camel: &str, snake: &str, default: &str) -> String {
        if !explicit.is_empty() {
            return explicit.to_string();
        }
        self.property(camel, snake).unwrap_or(default).to_string()
    }

    pub fn cargo_command(&self) -> String {
        self.named(
            &self.cargo().cargo_command,
            "rust.cargoCommand",
            "RUST_ANDROID_GRADLE_CARGO_COMMAND",
            "cargo",
        )
    }

    pub fn rustup_channel(&self) -> String {
        self.named(
            &self.cargo().rustup_channel,
            "rust.rustupChannel",
            "RUST_ANDROID_GRADLE_RUSTUP_CHANNEL",
            "",
        )
    }

    pub fn python_command(&self) -> String {
        self.named(
            &self.cargo().python_command,
            "rust.pythonCommand",
            "RUST_ANDROID_GRADLE_PYTHON_COMMAND",
            "python",
        )
    }

    /// Needed to read the default target triple; cargo has no way to report it
    pub fn rustc_command(&self) -> String {
        self.named(
            &self.cargo().rustc_command,
            "rust.rustcCommand",
            "RUST_ANDROID_GRADLE_RUSTC_COMMAND",
            "rustc",
        )
    }

    pub fn module(&self) -> Result<&str> {
        self.cargo()
            .module
            .as_deref()
            .ok_or_else(|| CoreError::config("`cargo.module` and `cargo.libname` properties must be set."))
    }

    pub fn libname(&self) -> Result<&str> {
        self.cargo()
            .libname
            .as_deref()
            .ok_or_else(|| CoreError::config("`cargo.module` and `cargo.libname` properties must be set."))
    }

    /// Module directory, resolved against the project root
    pub fn module_dir(&self) -> Result<PathBuf> {
        Ok(self.resolve(self.module()?))
    }

    /// Requested platforms; `local.properties` may replace the configured list
    pub fn targets(&self) -> Result<Vec<String>> {
        let project_key = format!("rust.targets.{}", self.project_name());
        let local = self
            .local
            .get(&project_key)
            .or_else(|| self.local.get("rust.targets"));

        if let Some(list) = local {
            debug!("Targets overridden by {}: {}", LOCAL_PROPERTIES, list);
            return Ok(list.split(',').map(|t| t.trim().to_string()).collect());
        }

        self.cargo()
            .targets
            .clone()
            .ok_or_else(|| CoreError::config("`cargo.targets` must be set."))
    }

    /// Check the mandatory settings up front
    pub fn validate(&self) -> Result<()> {
        self.module()?;
        self.libname()?;
        self.targets()?;
        Ok(())
    }

    pub fn api_level(&self, platform: &str) -> Result<u32> {
        self.cargo()
            .api_levels
            .get(platform)
            .copied()
            .or(self.cargo().api_level)
            .ok_or_else(|| {
                CoreError::config(format!("apiLevel for {} is not set in cargo.api_levels", platform))
            })
    }

    /// Explicit toolchain kind preference, if any
    pub fn prebuilt_toolchains(&self) -> Result<Option<bool>> {
        if let Some(prebuilt) = self.cargo().prebuilt_toolchains {
            return Ok(Some(prebuilt));
        }
        self.flag_property("rust.prebuiltToolchains", "RUST_ANDROID_GRADLE_PREBUILT_TOOLCHAINS")
    }

    /// Explicit `verbose`, else whether debug logging is on
    pub fn verbose(&self) -> bool {
        self.cargo()
            .verbose
            .unwrap_or_else(|| tracing::enabled!(tracing::Level::DEBUG))
    }

    /// `rust.cargoTargetDir` from `local.properties`
    pub fn local_target_dir(&self) -> Option<&str> {
        self.local.get("rust.cargoTargetDir")
    }

    /// `CARGO_TARGET_DIR` from the environment
    pub fn env_target_dir(&self) -> Option<&str> {
        self.env_var("CARGO_TARGET_DIR")
    }

    pub fn target_includes(&self) -> &[String] {
        self.cargo().target_includes.as_deref().unwrap_or(&[])
    }

    pub fn extra_cargo_build_arguments(&self) -> &[String] {
        self.cargo()
            .extra_cargo_build_arguments
            .as_deref()
            .unwrap_or(&[])
    }

    pub fn features(&self) -> &FeatureSelection {
        &self.cargo().features
    }

    pub fn generate_build_id(&self) -> bool {
        self.cargo().generate_build_id
    }

    /// Profile to build when no variant is named
    pub fn default_profile(&self) -> Profile {
        self.cargo().profile
    }

    /// NDK directory: project file, `ndk.dir`, then the usual environment variables
    pub fn ndk_dir(&self) -> Option<PathBuf> {
        if let Some(ref dir) = self.cargo().ndk_directory {
            return Some(self.resolve(dir));
        }
        self.local
            .get("ndk.dir")
            .or_else(|| self.env_var("ANDROID_NDK_HOME"))
            .or_else(|| self.env_var("ANDROID_NDK_ROOT"))
            .map(|dir| self.resolve(dir))
    }

    /// Make a possibly relative path absolute against the project root
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root_dir.join(path)
        }
    }
}

/// Absolute directory holding the project file. Every path handed to a
/// child process is resolved against it, and children run elsewhere.
fn project_root(config_path: &Path) -> Result<PathBuf> {
    match config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(dir) if dir.is_absolute() => Ok(dir.to_path_buf()),
        Some(dir) => Ok(std::env::current_dir()?.join(dir)),
        None => Ok(std::env::current_dir()?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(toml: &str, local: &str, env: &[(&str, &str)]) -> Settings {
        Settings::new(
            PathBuf::from("/work/app"),
            ProjectConfig::from_toml(toml).unwrap(),
            Properties::parse(local),
            env.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_parse_project_file() {
        let config = ProjectConfig::from_toml(
            r#"
name = "app"

[cargo]
module = "../rust"
libname = "foo"
targets = ["arm64", "x86_64"]
api_level = 21
generate_build_id = true
features = { no_default_but = ["x", "y", "x"] }

[cargo.api_levels]
arm64 = 24
"#,
        )
        .unwrap();

        assert_eq!(config.name.as_deref(), Some("app"));
        assert_eq!(config.cargo.module.as_deref(), Some("../rust"));
        assert_eq!(config.cargo.api_levels.get("arm64"), Some(&24));
        assert!(config.cargo.generate_build_id);
        assert_eq!(
            config.cargo.features,
            FeatureSelection::NoDefaultBut(FeatureSet::new(["x", "y"]))
        );
    }

    #[test]
    fn test_features_all_and_default() {
        let config = ProjectConfig::from_toml("[cargo]\nfeatures = \"all\"\n").unwrap();
        assert_eq!(config.cargo.features, FeatureSelection::All);

        let config = ProjectConfig::from_toml("[cargo]\nfeatures = { all = true }\n").unwrap();
        assert_eq!(config.cargo.features, FeatureSelection::All);

        let config = ProjectConfig::from_toml("[cargo]\nfeatures = { default_and = [\"a\"] }\n").unwrap();
        assert_eq!(
            config.cargo.features,
            FeatureSelection::DefaultAnd(FeatureSet::new(["a"]))
        );

        let config = ProjectConfig::from_toml("[cargo]\n").unwrap();
        assert_eq!(config.cargo.features, FeatureSelection::default());
    }

    #[test]
    fn test_features_rejects_mixed_modes() {
        assert!(ProjectConfig::from_toml("[cargo]\nfeatures = { all = true, default_and = [\"a\"] }\n").is_err());
        assert!(ProjectConfig::from_toml("[cargo]\nfeatures = \"some\"\n").is_err());
    }

    #[test]
    fn test_default_profile() {
        assert_eq!(settings("", "", &[]).default_profile(), Profile::Debug);
        assert_eq!(
            settings("[cargo]\nprofile = \"release\"\n", "", &[]).default_profile(),
            Profile::Release
        );
    }

    #[test]
    fn test_project_root_is_absolute() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(project_root(Path::new(PROJECT_FILE)).unwrap(), cwd);
        assert_eq!(project_root(Path::new("app/rust-android.toml")).unwrap(), cwd.join("app"));
        assert_eq!(
            project_root(Path::new("/work/app/rust-android.toml")).unwrap(),
            PathBuf::from("/work/app")
        );
    }

    #[test]
    fn test_named_setting_precedence() {
        let s = settings(
            "[cargo]\ncargo_command = \"/explicit/cargo\"\n",
            "rust.cargoCommand=/local/cargo\nrust.rustcCommand=/local/rustc\n",
            &[
                ("RUST_ANDROID_GRADLE_CARGO_COMMAND", "/env/cargo"),
                ("RUST_ANDROID_GRADLE_RUSTC_COMMAND", "/env/rustc"),
                ("RUST_ANDROID_GRADLE_PYTHON_COMMAND", "/env/python3"),
            ],
        );

        assert_eq!(s.cargo_command(), "/explicit/cargo");
        assert_eq!(s.rustc_command(), "/local/rustc");
        assert_eq!(s.python_command(), "/env/python3");
        assert_eq!(s.rustup_channel(), "");
    }

    #[test]
    fn test_named_setting_defaults() {
        let s = settings("", "", &[]);
        assert_eq!(s.cargo_command(), "cargo");
        assert_eq!(s.rustc_command(), "rustc");
        assert_eq!(s.python_command(), "python");
    }

    #[test]
    fn test_flag_property() {
        let s = settings("", "rust.prebuiltToolchains=1\n", &[]);
        assert_eq!(s.prebuilt_toolchains().unwrap(), Some(true));

        let s = settings("", "", &[("RUST_ANDROID_GRADLE_PREBUILT_TOOLCHAINS", "false")]);
        assert_eq!(s.prebuilt_toolchains().unwrap(), Some(false));

        let s = settings("", "rust.prebuiltToolchains=\n", &[]);
        assert_eq!(s.prebuilt_toolchains().unwrap(), None);

        let s = settings("", "rust.prebuiltToolchains=yes\n", &[]);
        assert!(matches!(
            s.prebuilt_toolchains(),
            Err(CoreError::InvalidFlag { .. })
        ));

        let s = settings("[cargo]\nprebuilt_toolchains = false\n", "rust.prebuiltToolchains=1\n", &[]);
        assert_eq!(s.prebuilt_toolchains().unwrap(), Some(false));
    }

    #[test]
    fn test_mandatory_settings() {
        let s = settings("[cargo]\nmodule = \"rust\"\n", "", &[]);
        assert!(matches!(s.libname(), Err(CoreError::Config(_))));
        assert!(s.validate().is_err());

        let s = settings("[cargo]\nmodule = \"rust\"\nlibname = \"foo\"\n", "", &[]);
        assert!(matches!(s.targets(), Err(CoreError::Config(_))));

        let s = settings(
            "[cargo]\nmodule = \"rust\"\nlibname = \"foo\"\ntargets = [\"arm\"]\n",
            "",
            &[],
        );
        assert!(s.validate().is_ok());
        assert_eq!(s.module_dir().unwrap(), PathBuf::from("/work/app/rust"));
    }

    #[test]
    fn test_targets_override() {
        let toml = "name = \"app\"\n[cargo]\ntargets = [\"arm\"]\n";

        let s = settings(toml, "rust.targets=x86, arm64\n", &[]);
        assert_eq!(s.targets().unwrap(), vec!["x86", "arm64"]);

        let s = settings(toml, "rust.targets=x86\nrust.targets.app=darwin\n", &[]);
        assert_eq!(s.targets().unwrap(), vec!["darwin"]);

        let s = settings(toml, "", &[]);
        assert_eq!(s.targets().unwrap(), vec!["arm"]);
    }

    #[test]
    fn test_api_level_lookup() {
        let s = settings("[cargo]\napi_level = 21\n[cargo.api_levels]\narm64 = 26\n", "", &[]);
        assert_eq!(s.api_level("arm64").unwrap(), 26);
        assert_eq!(s.api_level("x86").unwrap(), 21);

        let s = settings("", "", &[]);
        assert!(s.api_level("x86").is_err());
    }

    #[test]
    fn test_ndk_dir_sources() {
        let s = settings("", "ndk.dir=/sdk/ndk/25.2\n", &[("ANDROID_NDK_HOME", "/env/ndk")]);
        assert_eq!(s.ndk_dir(), Some(PathBuf::from("/sdk/ndk/25.2")));

        let s = settings("", "", &[("ANDROID_NDK_HOME", "/env/ndk")]);
        assert_eq!(s.ndk_dir(), Some(PathBuf::from("/env/ndk")));

        let s = settings("[cargo]\nndk_directory = \"ndk\"\n", "", &[]);
        assert_eq!(s.ndk_dir(), Some(PathBuf::from("/work/app/ndk")));

        assert_eq!(settings("", "", &[]).ndk_dir(), None);
    }

    #[test]
    fn test_profile_from_name() {
        assert_eq!(Profile::from_name("release"), Profile::Release);
        assert_eq!(Profile::from_name("Release"), Profile::Debug);
        assert_eq!(Profile::Release.cargo_flag(), Some("--release"));
        assert_eq!(Profile::Debug.cargo_flag(), None);
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join(PROJECT_FILE);
        std::fs::write(&config_path, "[cargo]\nmodule = \"rust\"\nlibname = \"foo\"\n").unwrap();
        std::fs::write(dir.path().join(LOCAL_PROPERTIES), "rust.targets=arm64\n").unwrap();

        let s = Settings::load(&config_path).unwrap();
        assert_eq!(s.libname().unwrap(), "foo");
        assert_eq!(s.targets().unwrap(), vec!["arm64"]);
        assert_eq!(s.build_dir(), dir.path().join("build"));
    }
}
