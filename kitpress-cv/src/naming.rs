//! Output naming policy
//!
//! Pure derivation of candidate output names and paths. The disambiguation
//! search itself lives in the driver because it needs the backend's
//! existence probe; this module only supplies the candidates.

use std::path::{Path, PathBuf};

/// Extension of every produced output
pub const TARGET_EXTENSION: &str = "wav";

/// Marker embedded in temporary output names so strays are recognizable
const TEMP_MARKER: &str = "__kp_tmp";

/// Cap on the disambiguation suffix search
///
/// The search is conceptually unbounded; this guards against a pathological
/// probe that never reports a free name.
pub const MAX_NAME_SUFFIX: u32 = 10_000;

/// Strip the last extension from a file name
///
/// A dot at position zero does not count: leading-dot names are treated as
/// extensionless.
pub fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(0) | None => name,
        Some(dot) => &name[..dot],
    }
}

/// Derive the candidate output name for a source name and suffix
///
/// Suffix 0 is the plain candidate; positive suffixes append `_{suffix}`
/// before the target extension.
pub fn derive_output_name(source_name: &str, suffix: u32) -> String {
    let stem = strip_extension(source_name);
    if suffix > 0 {
        format!("{}_{}.{}", stem, suffix, TARGET_EXTENSION)
    } else {
        format!("{}.{}", stem, TARGET_EXTENSION)
    }
}

/// Derive the candidate output path beside a persistent input
pub fn derive_output_path(input: &Path, suffix: u32) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let output_name = derive_output_name(&name, suffix);
    match input.parent() {
        Some(parent) => parent.join(output_name),
        None => PathBuf::from(output_name),
    }
}

/// Build a fresh temporary output path beside a persistent input
///
/// Used when the output path equals the input path: the engine reads its
/// input incrementally while writing, so it must never write over the file
/// it is reading. The marker + timestamp + random suffix guarantee the temp
/// name collides with nothing the naming policy would ever produce.
pub fn temp_output_path(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = strip_extension(&name).to_string();
    let stamp = chrono::Utc::now().timestamp_millis();
    let random = uuid::Uuid::new_v4().simple().to_string();
    let temp_name = format!(
        "{}.{}_{}_{}.{}",
        stem,
        TEMP_MARKER,
        stamp,
        &random[..8],
        TARGET_EXTENSION
    );
    match input.parent() {
        Some(parent) => parent.join(temp_name),
        None => PathBuf::from(temp_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_last_extension_only() {
        assert_eq!(strip_extension("kick.wav"), "kick");
        assert_eq!(strip_extension("kick.old.wav"), "kick.old");
        assert_eq!(strip_extension("noext"), "noext");
    }

    #[test]
    fn leading_dot_names_are_extensionless() {
        assert_eq!(strip_extension(".hidden"), ".hidden");
        assert_eq!(strip_extension(".hidden.mp3"), ".hidden");
    }

    #[test]
    fn suffix_zero_is_plain() {
        assert_eq!(derive_output_name("kick.mp3", 0), "kick.wav");
        assert_eq!(derive_output_name("kick.mp3", 1), "kick_1.wav");
        assert_eq!(derive_output_name("kick.mp3", 2), "kick_2.wav");
    }

    #[test]
    fn output_path_stays_beside_input() {
        let path = derive_output_path(Path::new("/music/loops/break.aiff"), 0);
        assert_eq!(path, Path::new("/music/loops/break.wav"));
        let path = derive_output_path(Path::new("/music/loops/break.aiff"), 3);
        assert_eq!(path, Path::new("/music/loops/break_3.wav"));
    }

    #[test]
    fn temp_path_never_matches_a_candidate() {
        let input = Path::new("/music/kick.wav");
        let temp = temp_output_path(input);
        assert_eq!(temp.parent(), input.parent());
        let temp_name = temp.file_name().unwrap().to_string_lossy().into_owned();
        assert!(temp_name.starts_with("kick."));
        assert!(temp_name.contains(TEMP_MARKER));
        assert!(temp_name.ends_with(".wav"));
        assert_ne!(temp, input);
    }

    #[test]
    fn temp_paths_are_unique_per_call() {
        let input = Path::new("/music/kick.wav");
        assert_ne!(temp_output_path(input), temp_output_path(input));
    }
}
