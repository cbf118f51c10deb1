//! Kit export planning
//!
//! Turns the current selection into a bounded, deterministically renumbered
//! export plan. Pure and idempotent: the plan is rebuilt from scratch on
//! every request and never mutated.

use crate::types::FileItem;
use std::cmp::Ordering;

/// Maximum number of samples in one kit export
pub const KIT_MAX_SAMPLES: usize = 10;

/// Destination folder every kit export writes into
pub const KIT_FOLDER_NAME: &str = "H";

/// User-facing rejection message when the selection exceeds capacity
pub const KIT_LIMIT_WARNING: &str =
    "Kit Maker supports up to 10 samples. Please select 10 or fewer.";

/// One renumbered entry of a kit plan
#[derive(Debug, Clone)]
pub struct KitEntry {
    /// The input this entry converts
    pub item: FileItem,
    /// Plan-assigned output name, `{index}.wav`
    pub output_name: String,
    /// Zero-based position in sorted order
    pub index: usize,
}

/// A kit export plan
///
/// Either fully blocked (`blocked` set, `entries` empty) or fully valid
/// (1..=10 entries, empty warning) — never partially populated. An empty
/// selection blocks without a warning; only the capacity case carries the
/// limit message.
#[derive(Debug, Clone)]
pub struct KitPlan {
    /// Whether the export must not run
    pub blocked: bool,
    /// Rejection message, empty unless capacity was exceeded
    pub warning: String,
    /// Fixed destination folder name
    pub folder_name: String,
    /// Renumbered entries in sorted order
    pub entries: Vec<KitEntry>,
}

/// Case-insensitive filename ascending, case-sensitive tie-break
///
/// This ordering makes the numbering reproducible regardless of selection
/// order or platform sort quirks.
fn compare_filenames(left: &FileItem, right: &FileItem) -> Ordering {
    let a_lower = left.name.to_lowercase();
    let b_lower = right.name.to_lowercase();
    a_lower
        .cmp(&b_lower)
        .then_with(|| left.name.cmp(&right.name))
}

/// Build the kit export plan for the current selection
pub fn build_kit_plan(files: &[FileItem]) -> KitPlan {
    if files.is_empty() {
        return KitPlan {
            blocked: true,
            warning: String::new(),
            folder_name: KIT_FOLDER_NAME.to_string(),
            entries: Vec::new(),
        };
    }

    if files.len() > KIT_MAX_SAMPLES {
        return KitPlan {
            blocked: true,
            warning: KIT_LIMIT_WARNING.to_string(),
            folder_name: KIT_FOLDER_NAME.to_string(),
            entries: Vec::new(),
        };
    }

    let mut sorted: Vec<FileItem> = files.to_vec();
    sorted.sort_by(compare_filenames);

    let entries = sorted
        .into_iter()
        .enumerate()
        .map(|(index, item)| KitEntry {
            item,
            output_name: format!("{}.wav", index),
            index,
        })
        .collect();

    KitPlan {
        blocked: false,
        warning: String::new(),
        folder_name: KIT_FOLDER_NAME.to_string(),
        entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(names: &[&str]) -> Vec<FileItem> {
        names
            .iter()
            .map(|name| FileItem::from_bytes(*name, vec![0u8; 4], 0))
            .collect()
    }

    #[test]
    fn sorts_files_by_filename_ascending_before_numbering() {
        let plan = build_kit_plan(&items(&["kick.wav", "Hat.wav", "snare.wav"]));
        assert!(!plan.blocked);
        let names: Vec<&str> = plan.entries.iter().map(|e| e.item.name.as_str()).collect();
        assert_eq!(names, ["Hat.wav", "kick.wav", "snare.wav"]);
    }

    #[test]
    fn names_outputs_from_zero_to_n_minus_one() {
        let plan = build_kit_plan(&items(&["b.wav", "a.wav", "c.wav"]));
        assert!(!plan.blocked);
        let outputs: Vec<&str> = plan
            .entries
            .iter()
            .map(|e| e.output_name.as_str())
            .collect();
        assert_eq!(outputs, ["0.wav", "1.wav", "2.wav"]);
        assert_eq!(plan.folder_name, "H");
    }

    #[test]
    fn numbering_is_independent_of_selection_order() {
        let names = ["kick.wav", "Hat.wav", "snare.wav", "Tom.wav"];
        let baseline = build_kit_plan(&items(&names));
        let baseline_pairs: Vec<(String, String)> = baseline
            .entries
            .iter()
            .map(|e| (e.item.name.clone(), e.output_name.clone()))
            .collect();

        // Every rotation of the input must produce the identical plan.
        for rotation in 1..names.len() {
            let mut permuted = names.to_vec();
            permuted.rotate_left(rotation);
            let plan = build_kit_plan(&items(&permuted));
            let pairs: Vec<(String, String)> = plan
                .entries
                .iter()
                .map(|e| (e.item.name.clone(), e.output_name.clone()))
                .collect();
            assert_eq!(pairs, baseline_pairs);
        }
    }

    #[test]
    fn case_sensitive_tie_break_is_stable() {
        let plan = build_kit_plan(&items(&["a.wav", "A.wav"]));
        let names: Vec<&str> = plan.entries.iter().map(|e| e.item.name.as_str()).collect();
        // "A" < "a" byte-wise once the case-insensitive key ties.
        assert_eq!(names, ["A.wav", "a.wav"]);
    }

    #[test]
    fn exactly_ten_files_are_accepted() {
        let names: Vec<String> = (0..10).map(|i| format!("sample-{}.wav", i)).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let plan = build_kit_plan(&items(&refs));
        assert!(!plan.blocked);
        assert_eq!(plan.entries.len(), 10);
        assert!(plan.warning.is_empty());
    }

    #[test]
    fn blocks_selection_larger_than_ten() {
        let names: Vec<String> = (0..11).map(|i| format!("sample-{}.wav", i)).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let plan = build_kit_plan(&items(&refs));
        assert!(plan.blocked);
        assert_eq!(plan.warning, KIT_LIMIT_WARNING);
        assert!(plan.entries.is_empty());
    }

    #[test]
    fn empty_selection_blocks_without_warning() {
        let plan = build_kit_plan(&[]);
        assert!(plan.blocked);
        assert!(plan.warning.is_empty());
        assert!(plan.entries.is_empty());
    }
}
