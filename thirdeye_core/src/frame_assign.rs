//! Frame Assigner - deterministic track-to-frame attribution.
//!
//! Resolution strategies are attempted top-to-bottom per track and stop at
//! the first success; no two strategies are ever combined:
//! 1. Path match: the canonical frame whose file name appears in the
//!    track's `first_frame_path` (first match in canonical order wins)
//! 2. Index hypothesis: the configured 0-based/1-based interpretation of
//!    `first_frame_index`, with the alternate interpretation as fallback
//! 3. Otherwise the track is unassigned (counted, never an error)

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::frames::FrameUniverse;
use crate::model::{AssignReport, Track};

/// Frame-to-tracks multimap. Keyed by canonical frame number (stable
/// ascending order); each track list preserves source-map insertion order.
pub type FrameAssignments = BTreeMap<u32, Vec<Track>>;

/// Which convention `first_frame_index` follows.
///
/// The source data exhibits both conventions depending on dataset, so the
/// interpretation is configurable rather than hard-coded. Each hypothesis
/// tries its primary reading first and falls back to the alternate one;
/// the reading that succeeded is logged for auditability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexHypothesis {
    /// The index is 0-based upstream: try `index + 1`, then `index` as-is
    #[default]
    OneBasedFirst,

    /// The index already matches frame numbering: try `index` as-is,
    /// then `index + 1`
    ZeroBasedFirst,
}

impl IndexHypothesis {
    /// Candidate frame numbers in priority order.
    fn candidates(&self, index: u32) -> [u32; 2] {
        match self {
            Self::OneBasedFirst => [index + 1, index],
            Self::ZeroBasedFirst => [index, index + 1],
        }
    }
}

impl fmt::Display for IndexHypothesis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OneBasedFirst => write!(f, "one-based-first"),
            Self::ZeroBasedFirst => write!(f, "zero-based-first"),
        }
    }
}

impl FromStr for IndexHypothesis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "one-based-first" => Ok(Self::OneBasedFirst),
            "zero-based-first" => Ok(Self::ZeroBasedFirst),
            other => Err(format!("unknown index hypothesis '{}'", other)),
        }
    }
}

/// Attribute every track to at most one canonical frame.
///
/// Tracks whose resolved frame falls outside the universe are unassigned,
/// as are tracks carrying neither a path hint nor a frame index.
pub fn assign(
    tracks: &[Track],
    universe: &FrameUniverse,
    hypothesis: IndexHypothesis,
) -> (FrameAssignments, AssignReport) {
    let mut assignments = FrameAssignments::new();
    let mut report = AssignReport::default();

    for track in tracks {
        match resolve_frame(track, universe, hypothesis) {
            Some(frame_number) => {
                assignments
                    .entry(frame_number)
                    .or_default()
                    .push(track.clone());
                report.assigned += 1;
            }
            None => {
                debug!("track '{}' has no resolvable frame, excluded", track.id);
                report.unassigned += 1;
            }
        }
    }

    (assignments, report)
}

/// Resolve the canonical frame for one track; first strategy wins.
fn resolve_frame(
    track: &Track,
    universe: &FrameUniverse,
    hypothesis: IndexHypothesis,
) -> Option<u32> {
    // Strategy 1: path match. Scan canonical frames in order and take the
    // first whose file name occurs in the hint path.
    if let Some(path) = &track.first_frame_path {
        for n in 1..=universe.count {
            if path.contains(&universe.frame_name(n)) {
                debug!("track '{}' -> frame {} (path match)", track.id, n);
                return Some(n);
            }
        }
    }

    // Strategy 2: index hypothesis with fallback interpretation
    if let Some(index) = track.first_frame_index {
        for (attempt, candidate) in hypothesis.candidates(index).into_iter().enumerate() {
            if universe.contains(candidate) {
                debug!(
                    "track '{}' -> frame {} (index {}, {} {})",
                    track.id,
                    candidate,
                    index,
                    hypothesis,
                    if attempt == 0 { "primary" } else { "fallback" }
                );
                return Some(candidate);
            }
        }
    }

    None
}
