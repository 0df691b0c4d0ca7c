//! Artifact Locator/Stager
//!
//! Finds where cargo put its output and copies the library into a
//! per-ABI directory for packaging. Finding nothing to copy is not an error
//! here; the packaging step is the one that notices a missing library.

use std::path::{Path, PathBuf};
use glob::{MatchOptions, Pattern};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use rust_android_core::Profile;

use crate::BuildError;

/// Cargo's target directory. First match wins: `local.properties`, the
/// environment, the project file, then `<module>/target`. Relative values
/// resolve against `base`.
pub fn cargo_target_root(
    local_override: Option<&str>,
    env_override: Option<&str>,
    project_override: Option<&str>,
    module_dir: &Path,
    base: &Path,
) -> PathBuf {
    match local_override.or(env_override).or(project_override) {
        Some(dir) => {
            let dir = Path::new(dir);
            if dir.is_absolute() {
                dir.to_path_buf()
            } else {
                base.join(dir)
            }
        }
        None => module_dir.join("target"),
    }
}

/// Directory cargo writes a profile's output to. Cross builds nest one
/// level deeper, under the target triple.
pub fn build_output_dir(
    target_root: &Path,
    target: &str,
    default_target: Option<&str>,
    profile: Profile,
) -> PathBuf {
    if default_target == Some(target) {
        target_root.join(profile.as_str())
    } else {
        target_root.join(target).join(profile.as_str())
    }
}

/// Library file names to look for when no include patterns are configured
pub fn default_includes(libname: &str) -> Vec<String> {
    vec![
        format!("lib{}.so", libname),
        format!("lib{}.dylib", libname),
        format!("{}.dll", libname),
    ]
}

/// Files copied into a target's staging directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedArtifact {
    /// `<destination>/<abi>`
    pub dir: PathBuf,
    /// Copied files, at their staged locations
    pub files: Vec<PathBuf>,
}

impl StagedArtifact {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Copy the files under `source_dir` that match `includes` (or the default
/// library names) into `<destination>/<abi>`, keeping relative paths.
pub fn stage(
    destination: &Path,
    source_dir: &Path,
    abi: &str,
    includes: &[String],
    libname: &str,
) -> Result<StagedArtifact, BuildError> {
    let patterns = if includes.is_empty() {
        default_includes(libname)
    } else {
        includes.to_vec()
    };
    let patterns = patterns
        .iter()
        .map(|p| Pattern::new(p))
        .collect::<Result<Vec<_>, _>>()?;

    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    };

    let dest_dir = destination.join(abi);
    std::fs::create_dir_all(&dest_dir)?;

    let mut files = Vec::new();

    if !source_dir.is_dir() {
        warn!("Build output directory {:?} does not exist", source_dir);
        return Ok(StagedArtifact { dir: dest_dir, files });
    }

    for entry in WalkDir::new(source_dir).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = match entry.path().strip_prefix(source_dir) {
            Ok(relative) => relative,
            Err(_) => continue,
        };
        let relative_str = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        if !patterns.iter().any(|p| p.matches_with(&relative_str, options)) {
            continue;
        }

        let target = dest_dir.join(relative);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::copy(entry.path(), &target)?;
        debug!("Staged {:?} -> {:?}", entry.path(), target);
        files.push(target);
    }

    if files.is_empty() {
        warn!("No files in {:?} matched {:?}", source_dir, patterns.iter().map(Pattern::as_str).collect::<Vec<_>>());
    } else {
        info!("Staged {} file(s) into {:?}", files.len(), dest_dir);
    }

    Ok(StagedArtifact { dir: dest_dir, files })
}
