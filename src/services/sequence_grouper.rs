//! Post group reconstruction from an unordered folder listing
//!
//! Buckets parsed files by their numeric prefix, orders each bucket with the
//! main asset (no letter) first and secondaries in ascending letter order,
//! and checks the numeric sequence for continuity. Every anomaly is a
//! warning, never a fatal error: one malformed name or missing main asset
//! must not block the rest of the listing.

use std::collections::BTreeMap;
use std::fmt;

use crate::services::drive_client::RawFile;
use crate::services::filename_parser::{self, ParsedName};

/// One publishable post: the main asset plus its lettered secondaries
#[derive(Debug, Clone, PartialEq)]
pub struct PostGroup {
    pub number: u64,
    pub main: RawFile,
    /// Ordered by ascending letter
    pub secondaries: Vec<RawFile>,
}

impl PostGroup {
    /// Main asset first, then secondaries in letter order
    pub fn all_assets(&self) -> impl Iterator<Item = &RawFile> {
        std::iter::once(&self.main).chain(self.secondaries.iter())
    }
}

/// Non-fatal anomalies found while grouping
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupWarning {
    /// Filename does not fit the post asset grammar
    Unparsed { name: String },
    /// Gap in the numeric sequence
    MissingExpected { expected: u64 },
    /// A secondary asset exists but its group has no main asset;
    /// the whole group is excluded
    OrphanSecondary { number: u64, name: String },
}

impl fmt::Display for GroupWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupWarning::Unparsed { name } => {
                write!(f, "file '{}' does not match expected pattern", name)
            }
            GroupWarning::MissingExpected { expected } => {
                write!(f, "missing main image for expected number {}", expected)
            }
            GroupWarning::OrphanSecondary { number, name } => {
                write!(
                    f,
                    "secondary image '{}' found but main image {} is missing",
                    name, number
                )
            }
        }
    }
}

/// Build ordered post groups from a folder listing.
///
/// Returns the valid groups in ascending number order plus all warnings
/// collected along the way.
pub fn build_groups(files: &[RawFile]) -> (Vec<PostGroup>, Vec<GroupWarning>) {
    let mut warnings = Vec::new();

    // BTreeMap gives ascending numeric iteration for free
    let mut buckets: BTreeMap<u64, Vec<(ParsedName, RawFile)>> = BTreeMap::new();
    for file in files {
        match filename_parser::parse(&file.name) {
            Some(parsed) => {
                buckets
                    .entry(parsed.number)
                    .or_default()
                    .push((parsed, file.clone()));
            }
            None => {
                tracing::warn!(name = %file.name, "File does not match expected pattern, skipping");
                warnings.push(GroupWarning::Unparsed {
                    name: file.name.clone(),
                });
            }
        }
    }

    let mut groups = Vec::new();
    let mut last_number: u64 = 0;

    for (number, mut entries) in buckets {
        if number != last_number + 1 {
            tracing::warn!(
                expected = last_number + 1,
                found = number,
                "Gap in post sequence"
            );
            warnings.push(GroupWarning::MissingExpected {
                expected: last_number + 1,
            });
        }
        last_number = number;

        // Main asset (no letter) first, then secondaries by ascending letter
        entries.sort_by_key(|(parsed, _)| parsed.letter);

        let main_idx = entries.iter().position(|(parsed, _)| parsed.letter.is_none());
        let Some(main_idx) = main_idx else {
            for (_, file) in &entries {
                tracing::warn!(
                    number,
                    name = %file.name,
                    "Secondary image found but main image is missing"
                );
                warnings.push(GroupWarning::OrphanSecondary {
                    number,
                    name: file.name.clone(),
                });
            }
            continue;
        };

        let (_, main) = entries.remove(main_idx);
        let secondaries = entries.into_iter().map(|(_, file)| file).collect();

        groups.push(PostGroup {
            number,
            main,
            secondaries,
        });
    }

    (groups, warnings)
}
