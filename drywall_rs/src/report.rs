//! jscpd report reduction.
//!
//! Parses the JSON report jscpd writes, flattens each duplicate pair into a
//! compact record, ranks the list by duplicated line count, and caps it so
//! only the highest-impact clones survive. Every field of the raw report is
//! treated as optional - jscpd's output shape is not ours to trust.

use serde::{Deserialize, Serialize};

/// How many duplicate records survive reduction by default.
pub const DEFAULT_MAX_DUPLICATES: usize = 20;
/// Default fragment truncation length, in characters.
pub const DEFAULT_MAX_FRAGMENT_LENGTH: usize = 500;

const TRUNCATION_MARKER: &str = "\n[...truncated]";

// Raw report shapes, field names as jscpd emits them.

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawReport {
    duplicates: Vec<RawDuplicate>,
    statistics: RawStatistics,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawStatistics {
    total: RawTotals,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawTotals {
    clones: u64,
    duplicated_lines: u64,
    percentage: f64,
    lines: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawDuplicate {
    first_file: RawFileRef,
    second_file: RawFileRef,
    lines: u64,
    fragment: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawFileRef {
    name: String,
    start_loc: RawLoc,
    end_loc: RawLoc,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawLoc {
    line: u64,
}

/// One duplicate pair, flattened for the tool response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Duplicate {
    pub first_file: String,
    pub first_start: u64,
    pub first_end: u64,
    pub second_file: String,
    pub second_start: u64,
    pub second_end: u64,
    pub lines: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fragment: Option<String>,
}

/// Aggregate statistics, each field independently defaulted to zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub clones: u64,
    pub duplicated_lines: u64,
    pub percentage: f64,
    pub total_lines: u64,
}

/// The reduced report: summary plus the ranked, capped duplicate list.
#[derive(Debug, Serialize)]
pub struct Reduction {
    pub summary: Summary,
    pub duplicates: Vec<Duplicate>,
}

/// Overrides for the reduction limits, typically sourced from the
/// `maxDuplicates` / `maxFragmentLength` config keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReduceLimits {
    pub max_duplicates: Option<usize>,
    pub max_fragment_length: Option<usize>,
}

/// Reduce a raw jscpd JSON report.
///
/// Malformed JSON is a hard error; missing fields are not - an entirely
/// empty report (`{}`) reduces to an all-zero summary and no duplicates.
/// Records are sorted by duplicated line count, descending, before the cap
/// is applied, so the highest-impact clones always survive truncation.
pub fn reduce_report(raw: &str, limits: ReduceLimits) -> Result<Reduction, serde_json::Error> {
    let report: RawReport = serde_json::from_str(raw)?;
    let cap = limits.max_duplicates.unwrap_or(DEFAULT_MAX_DUPLICATES);
    let fragment_limit = limits
        .max_fragment_length
        .unwrap_or(DEFAULT_MAX_FRAGMENT_LENGTH);

    let mut duplicates: Vec<Duplicate> = report
        .duplicates
        .into_iter()
        .map(|d| Duplicate {
            first_file: d.first_file.name,
            first_start: d.first_file.start_loc.line,
            first_end: d.first_file.end_loc.line,
            second_file: d.second_file.name,
            second_start: d.second_file.start_loc.line,
            second_end: d.second_file.end_loc.line,
            lines: d.lines,
            fragment: d.fragment.map(|f| truncate_fragment(f, fragment_limit)),
        })
        .collect();

    // Stable sort: ties keep the detector's emission order
    duplicates.sort_by(|a, b| b.lines.cmp(&a.lines));
    duplicates.truncate(cap);

    let total = report.statistics.total;
    Ok(Reduction {
        summary: Summary {
            clones: total.clones,
            duplicated_lines: total.duplicated_lines,
            percentage: total.percentage,
            total_lines: total.lines,
        },
        duplicates,
    })
}

/// Truncate a fragment to `limit` characters, marking the cut. A fragment at
/// or under the limit is returned unchanged. Cuts on char boundaries only.
fn truncate_fragment(fragment: String, limit: usize) -> String {
    match fragment.char_indices().nth(limit) {
        None => fragment,
        Some((byte_idx, _)) => {
            let mut out = String::with_capacity(byte_idx + TRUNCATION_MARKER.len());
            out.push_str(&fragment[..byte_idx]);
            out.push_str(TRUNCATION_MARKER);
            out
        }
    }
}
