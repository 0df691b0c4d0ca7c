//! Toolchain Registry
//!
//! Static catalog of the platforms we know how to build for. Entries are
//! looked up by platform name, never by triple: the generated and prebuilt
//! NDK entries for one ABI share a target triple.

use tracing::debug;

use crate::ToolchainError;

/// NDK layout convention (or none, for desktop builds)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolchainKind {
    /// Toolchains shipped inside the NDK under `toolchains/llvm/prebuilt`
    AndroidPrebuilt,
    /// Standalone toolchains generated per platform and API level
    AndroidGenerated,
    /// Host toolchain, used unmodified
    Desktop,
}

impl ToolchainKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolchainKind::AndroidPrebuilt => "prebuilt",
            ToolchainKind::AndroidGenerated => "generated",
            ToolchainKind::Desktop => "desktop",
        }
    }

    pub fn is_android(&self) -> bool {
        !matches!(self, ToolchainKind::Desktop)
    }
}

/// One supported platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolchainDescriptor {
    /// Name users put in `cargo.targets`
    pub platform: &'static str,
    pub kind: ToolchainKind,
    /// Rust target triple
    pub target: &'static str,
    /// Prefix of the clang driver binaries
    pub compiler_triple: &'static str,
    /// Prefix of the binutils binaries
    pub binutils_triple: &'static str,
    /// Output folder, e.g. `android/arm64-v8a`
    pub folder: &'static str,
}

impl ToolchainDescriptor {
    /// ABI name: the last segment of the output folder
    pub fn abi(&self) -> &'static str {
        self.folder.rsplit('/').next().unwrap_or(self.folder)
    }

    pub fn is_desktop(&self) -> bool {
        self.kind == ToolchainKind::Desktop
    }
}

const fn desktop(platform: &'static str, target: &'static str, folder: &'static str) -> ToolchainDescriptor {
    ToolchainDescriptor {
        platform,
        kind: ToolchainKind::Desktop,
        target,
        compiler_triple: "<compilerTriple>",
        binutils_triple: "<binutilsTriple>",
        folder,
    }
}

const fn android(
    platform: &'static str,
    kind: ToolchainKind,
    target: &'static str,
    compiler_triple: &'static str,
    binutils_triple: &'static str,
    folder: &'static str,
) -> ToolchainDescriptor {
    ToolchainDescriptor {
        platform,
        kind,
        target,
        compiler_triple,
        binutils_triple,
        folder,
    }
}

use ToolchainKind::{AndroidGenerated as Generated, AndroidPrebuilt as Prebuilt};

/// Every supported platform. See https://forge.rust-lang.org/platform-support.html.
pub static TOOLCHAINS: &[ToolchainDescriptor] = &[
    desktop("linux-x86-64", "x86_64-unknown-linux-gnu", "desktop/linux-x86-64"),
    // Superseded by darwin-x86-64, kept for existing configurations
    desktop("darwin", "x86_64-apple-darwin", "desktop/darwin"),
    desktop("darwin-x86-64", "x86_64-apple-darwin", "desktop/darwin-x86-64"),
    desktop("darwin-aarch64", "aarch64-apple-darwin", "desktop/darwin-aarch64"),
    desktop("win32-x86-64-msvc", "x86_64-pc-windows-msvc", "desktop/win32-x86-64"),
    desktop("win32-x86-64-gnu", "x86_64-pc-windows-gnu", "desktop/win32-x86-64"),
    android("arm", Generated, "armv7-linux-androideabi", "arm-linux-androideabi", "arm-linux-androideabi", "android/armeabi-v7a"),
    android("arm64", Generated, "aarch64-linux-android", "aarch64-linux-android", "aarch64-linux-android", "android/arm64-v8a"),
    android("x86", Generated, "i686-linux-android", "i686-linux-android", "i686-linux-android", "android/x86"),
    android("x86_64", Generated, "x86_64-linux-android", "x86_64-linux-android", "x86_64-linux-android", "android/x86_64"),
    // 32-bit ARM clang is prefixed armv7a-linux-androideabi, its binutils arm-linux-androideabi
    android("arm", Prebuilt, "armv7-linux-androideabi", "armv7a-linux-androideabi", "arm-linux-androideabi", "android/armeabi-v7a"),
    android("arm64", Prebuilt, "aarch64-linux-android", "aarch64-linux-android", "aarch64-linux-android", "android/arm64-v8a"),
    android("x86", Prebuilt, "i686-linux-android", "i686-linux-android", "i686-linux-android", "android/x86"),
    android("x86_64", Prebuilt, "x86_64-linux-android", "x86_64-linux-android", "x86_64-linux-android", "android/x86_64"),
];

/// NDK major version from which generated standalone toolchains are no longer needed
pub const PREBUILT_TOOLCHAINS_MIN_NDK: u32 = 19;

/// Lookup over [`TOOLCHAINS`] with a preferred Android layout
#[derive(Debug, Clone, Copy)]
pub struct ToolchainRegistry {
    android_kind: ToolchainKind,
}

impl Default for ToolchainRegistry {
    fn default() -> Self {
        Self::new(ToolchainKind::AndroidPrebuilt)
    }
}

impl ToolchainRegistry {
    /// Registry that resolves Android platforms to `android_kind` entries
    pub fn new(android_kind: ToolchainKind) -> Self {
        Self { android_kind }
    }

    /// Pick the layout from an explicit preference or, failing that, the NDK version
    pub fn for_ndk(prebuilt: Option<bool>, ndk_version_major: Option<u32>) -> Self {
        let prebuilt = prebuilt.unwrap_or_else(|| {
            ndk_version_major
                .map(|major| major >= PREBUILT_TOOLCHAINS_MIN_NDK)
                .unwrap_or(true)
        });
        let kind = if prebuilt {
            ToolchainKind::AndroidPrebuilt
        } else {
            ToolchainKind::AndroidGenerated
        };
        debug!("Using {} Android toolchains", kind.as_str());
        Self::new(kind)
    }

    /// Resolve a platform name. Desktop platforms have a single entry; Android
    /// platforms resolve to the entry of the preferred layout.
    pub fn resolve(&self, platform: &str) -> Result<&'static ToolchainDescriptor, ToolchainError> {
        TOOLCHAINS
            .iter()
            .filter(|t| t.platform == platform)
            .find(|t| t.kind == ToolchainKind::Desktop || t.kind == self.android_kind)
            .ok_or_else(|| ToolchainError::UnknownPlatform(platform.to_string()))
    }

    /// Resolve a platform name with an exact layout
    pub fn resolve_kind(
        platform: &str,
        kind: ToolchainKind,
    ) -> Result<&'static ToolchainDescriptor, ToolchainError> {
        TOOLCHAINS
            .iter()
            .find(|t| t.platform == platform && t.kind == kind)
            .ok_or_else(|| ToolchainError::UnknownPlatform(platform.to_string()))
    }

    /// Entries visible through this registry, in catalog order
    pub fn iter(&self) -> impl Iterator<Item = &'static ToolchainDescriptor> + '_ {
        TOOLCHAINS
            .iter()
            .filter(move |t| t.kind == ToolchainKind::Desktop || t.kind == self.android_kind)
    }
}
