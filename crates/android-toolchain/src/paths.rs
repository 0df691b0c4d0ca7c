//! Toolchain Path Resolver
//!
//! Compiler and archiver locations relative to the NDK toolchain directory.
//! Nothing here checks that the files exist; a wrong path shows up when
//! cargo fails to run them.

use std::path::PathBuf;

use crate::host::HostPlatform;
use crate::registry::{ToolchainDescriptor, ToolchainKind};

/// First NDK release where every ABI shares `llvm-ar`
pub const UNIFIED_ARCHIVER_NDK: u32 = 23;

impl ToolchainDescriptor {
    fn clang(&self, api_level: u32, host: &HostPlatform, driver: &str) -> Option<PathBuf> {
        let suffix = host.clang_suffix();
        match self.kind {
            ToolchainKind::Desktop => None,
            ToolchainKind::AndroidPrebuilt => Some(
                PathBuf::from("bin")
                    .join(format!("{}{}-{}{}", self.compiler_triple, api_level, driver, suffix)),
            ),
            ToolchainKind::AndroidGenerated => Some(
                PathBuf::from(format!("{}-{}", self.platform, api_level))
                    .join("bin")
                    .join(format!("{}-{}{}", self.compiler_triple, driver, suffix)),
            ),
        }
    }

    /// C compiler. `None` for desktop toolchains.
    pub fn cc(&self, api_level: u32, host: &HostPlatform) -> Option<PathBuf> {
        self.clang(api_level, host, "clang")
    }

    /// C++ compiler. `None` for desktop toolchains.
    pub fn cxx(&self, api_level: u32, host: &HostPlatform) -> Option<PathBuf> {
        self.clang(api_level, host, "clang++")
    }

    /// Archiver. `None` for desktop toolchains.
    pub fn ar(&self, api_level: u32, ndk_version_major: u32) -> Option<PathBuf> {
        if self.kind == ToolchainKind::Desktop {
            return None;
        }

        if ndk_version_major >= UNIFIED_ARCHIVER_NDK {
            return Some(PathBuf::from("bin").join("llvm-ar"));
        }

        let ar = format!("{}-ar", self.binutils_triple);
        match self.kind {
            ToolchainKind::AndroidGenerated => Some(
                PathBuf::from(format!("{}-{}", self.platform, api_level))
                    .join("bin")
                    .join(ar),
            ),
            _ => Some(PathBuf::from("bin").join(ar)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HostOs;
    use crate::registry::{ToolchainRegistry, TOOLCHAINS};

    fn linux() -> HostPlatform {
        HostPlatform::new(HostOs::Linux, "x86_64")
    }

    fn windows() -> HostPlatform {
        HostPlatform::new(HostOs::Windows, "x86_64")
    }

    #[test]
    fn test_generated_arm64_paths() {
        let t = ToolchainRegistry::resolve_kind("arm64", ToolchainKind::AndroidGenerated).unwrap();

        let cc = t.cc(21, &linux()).unwrap();
        let ar = t.ar(21, 22).unwrap();

        assert!(cc.ends_with("arm64-21/bin/aarch64-linux-android-clang"));
        assert!(ar.ends_with("arm64-21/bin/aarch64-linux-android-ar"));
        assert_eq!(
            t.cxx(21, &linux()).unwrap(),
            PathBuf::from("arm64-21/bin/aarch64-linux-android-clang++")
        );
    }

    #[test]
    fn test_prebuilt_arm_paths() {
        let t = ToolchainRegistry::resolve_kind("arm", ToolchainKind::AndroidPrebuilt).unwrap();

        assert_eq!(
            t.cc(24, &linux()).unwrap(),
            PathBuf::from("bin/armv7a-linux-androideabi24-clang")
        );
        assert_eq!(
            t.cxx(24, &windows()).unwrap(),
            PathBuf::from("bin/armv7a-linux-androideabi24-clang++.cmd")
        );
        assert_eq!(t.ar(24, 21).unwrap(), PathBuf::from("bin/arm-linux-androideabi-ar"));
    }

    #[test]
    fn test_windows_generated_suffix() {
        let t = ToolchainRegistry::resolve_kind("x86", ToolchainKind::AndroidGenerated).unwrap();
        assert_eq!(
            t.cc(19, &windows()).unwrap(),
            PathBuf::from("x86-19/bin/i686-linux-android-clang.cmd")
        );
    }

    #[test]
    fn test_unified_archiver_from_ndk_23() {
        for t in TOOLCHAINS.iter().filter(|t| t.kind.is_android()) {
            for major in [23, 25, 27] {
                assert_eq!(t.ar(21, major).unwrap(), PathBuf::from("bin/llvm-ar"));
            }
        }
    }

    #[test]
    fn test_archiver_nesting_below_23() {
        for t in TOOLCHAINS.iter().filter(|t| t.kind.is_android()) {
            let ar = t.ar(21, 22).unwrap();
            let segment = format!("{}-21", t.platform);
            let nested = ar.iter().any(|c| c.to_str() == Some(segment.as_str()));
            assert_eq!(nested, t.kind == ToolchainKind::AndroidGenerated, "{:?}", ar);
        }
    }

    #[test]
    fn test_desktop_has_no_ndk_paths() {
        let t = ToolchainRegistry::default().resolve("linux-x86-64").unwrap();
        assert!(t.cc(21, &linux()).is_none());
        assert!(t.cxx(21, &linux()).is_none());
        assert!(t.ar(21, 25).is_none());
    }
}
