//! The canonical frame universe.
//!
//! A fixed, ordered, finite set of representative video frames with known
//! image paths. The universe is externally configured (count, naming
//! convention, base path) and is never derived from the track set.

use serde::{Deserialize, Serialize};

/// Configuration of the canonical frame sequence.
///
/// Frame numbers are 1-based: the universe covers `[1, count]`. File names
/// follow `<prefix><zero-padded number>.<extension>`, e.g. `frame_000007.png`
/// with the defaults below.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameUniverse {
    /// Number of canonical frames (observed production value: 47)
    pub count: u32,

    /// File-name prefix (default: "frame_")
    pub prefix: String,

    /// Zero-pad width of the frame number (default: 6)
    pub pad_width: usize,

    /// File extension without the dot (default: "png")
    pub extension: String,

    /// Directory prefix joined onto file names for image paths; empty means
    /// file names are used as-is
    pub base_path: String,
}

impl Default for FrameUniverse {
    fn default() -> Self {
        Self {
            count: 47,
            prefix: "frame_".to_string(),
            pad_width: 6,
            extension: "png".to_string(),
            base_path: String::new(),
        }
    }
}

impl FrameUniverse {
    /// Universe with the default naming convention and the given frame count.
    pub fn with_count(count: u32) -> Self {
        Self {
            count,
            ..Default::default()
        }
    }

    /// True when `frame_number` lies inside the universe.
    #[inline]
    pub fn contains(&self, frame_number: u32) -> bool {
        frame_number >= 1 && frame_number <= self.count
    }

    /// Canonical file name for a frame, e.g. `frame_000007.png`.
    pub fn frame_name(&self, frame_number: u32) -> String {
        format!(
            "{}{:0pad$}.{}",
            self.prefix,
            frame_number,
            self.extension,
            pad = self.pad_width
        )
    }

    /// Resolved image path: `base_path` joined with the frame file name.
    pub fn image_path(&self, frame_number: u32) -> String {
        if self.base_path.is_empty() {
            self.frame_name(frame_number)
        } else {
            format!(
                "{}/{}",
                self.base_path.trim_end_matches('/'),
                self.frame_name(frame_number)
            )
        }
    }

    /// Iterate `(frame_number, image_path)` pairs in canonical order.
    pub fn frames(&self) -> impl Iterator<Item = (u32, String)> + '_ {
        (1..=self.count).map(|n| (n, self.image_path(n)))
    }
}
