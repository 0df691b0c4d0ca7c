//! Build Configuration
//!
//! Variants and the per-target build request derived from them.

use std::path::PathBuf;

use rust_android_core::{FeatureSelection, Profile};

/// A build variant, e.g. `debug` or `release`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    pub name: String,
    pub build_type: String,
    pub debuggable: bool,
}

impl Variant {
    /// Variant whose build type is its name; only `release` is not debuggable
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            build_type: name.clone(),
            debuggable: name != "release",
            name,
        }
    }

    pub fn with_build_type(mut self, build_type: impl Into<String>) -> Self {
        self.build_type = build_type.into();
        self
    }

    pub fn with_debuggable(mut self, debuggable: bool) -> Self {
        self.debuggable = debuggable;
        self
    }

    /// Release builds for release build types and for anything not debuggable
    pub fn profile(&self) -> Profile {
        if self.debuggable {
            Profile::from_name(&self.build_type)
        } else {
            Profile::Release
        }
    }

    /// Name of the umbrella unit building every target of this variant
    pub fn task_name(&self) -> String {
        format!("cargoBuild{}", capitalize(&self.name))
    }

    /// Name of the unit building one platform of this variant
    pub fn target_task_name(&self, platform: &str) -> String {
        format!("{}{}", self.task_name(), capitalize(platform))
    }
}

/// Upper-case the first character
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Everything one cargo invocation is built from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    pub platform: String,
    pub profile: Profile,
    pub libname: String,
    pub module_dir: PathBuf,
    pub extra_args: Vec<String>,
    pub features: FeatureSelection,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_profile() {
        assert_eq!(Variant::new("debug").profile(), Profile::Debug);
        assert_eq!(Variant::new("release").profile(), Profile::Release);
        assert_eq!(Variant::new("staging").with_debuggable(false).profile(), Profile::Release);
        assert_eq!(
            Variant::new("freeRelease").with_build_type("release").profile(),
            Profile::Release
        );
        assert_eq!(Variant::new("freeDebug").with_build_type("debug").profile(), Profile::Debug);
    }

    #[test]
    fn test_task_names() {
        let variant = Variant::new("release");
        assert_eq!(variant.task_name(), "cargoBuildRelease");
        assert_eq!(variant.target_task_name("arm64"), "cargoBuildReleaseArm64");
        assert_eq!(variant.target_task_name("x86_64"), "cargoBuildReleaseX86_64");
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize(""), "");
        assert_eq!(capitalize("darwin-aarch64"), "Darwin-aarch64");
    }
}
