//! Frame Selector - density ranking and top-N cut.
//!
//! Ranks frames by how many objects they contain (ties broken by ascending
//! frame number) and keeps the best `top_n`. Density order only decides
//! WHICH frames qualify; the final delivered order downstream is
//! chronological among the selected subset. [`Selection`] exposes both
//! traversal orders over the same chosen frames.

use tracing::debug;

use crate::frame_assign::FrameAssignments;
use crate::model::Track;

/// One frame that survived selection, with its assigned tracks.
#[derive(Debug, Clone)]
pub struct SelectedFrame {
    /// 1-based canonical frame number
    pub frame_number: u32,

    /// Tracks attributed to this frame, in source-map order
    pub tracks: Vec<Track>,
}

/// The chosen top-N subset, traversable by density or by time.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    /// Frames in selection (density) order
    frames: Vec<SelectedFrame>,
}

impl Selection {
    /// Frames in density order: most objects first, ties by ascending
    /// frame number.
    pub fn by_density(&self) -> &[SelectedFrame] {
        &self.frames
    }

    /// The same frames re-sorted by ascending frame number, for sequential
    /// playback and for the final annotation list.
    pub fn chronological(&self) -> Vec<&SelectedFrame> {
        let mut frames: Vec<&SelectedFrame> = self.frames.iter().collect();
        frames.sort_by_key(|f| f.frame_number);
        frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Keep the `top_n` densest frames that contain at least one object.
///
/// Frames with zero assigned objects never rank. When fewer than `top_n`
/// frames qualify, all of them are returned without padding.
pub fn select(assignments: FrameAssignments, top_n: usize) -> Selection {
    let mut frames: Vec<SelectedFrame> = assignments
        .into_iter()
        .filter(|(_, tracks)| !tracks.is_empty())
        .map(|(frame_number, tracks)| SelectedFrame {
            frame_number,
            tracks,
        })
        .collect();

    // (object count desc, frame number asc) - deterministic and reproducible
    frames.sort_by(|a, b| {
        b.tracks
            .len()
            .cmp(&a.tracks.len())
            .then_with(|| a.frame_number.cmp(&b.frame_number))
    });
    frames.truncate(top_n);

    debug!(
        "selected {} frame(s): {:?}",
        frames.len(),
        frames
            .iter()
            .map(|f| (f.frame_number, f.tracks.len()))
            .collect::<Vec<(u32, usize)>>()
    );

    Selection { frames }
}
