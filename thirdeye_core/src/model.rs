//! Core data model for the annotation pipeline.
//!
//! Everything here is derived fresh from the immutable source map on each
//! pipeline invocation. Inputs are normalized into [`Track`] records by the
//! map loader; outputs are [`FrameAnnotation`] / [`SpatialObject`] records
//! consumed by the slideshow UI and the LLM context builder.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

// ============================================================================
// INPUT SIDE (normalized tracks)
// ============================================================================

/// One tracked physical object instance across the whole session.
///
/// A track may have been observed in many raw video frames, but only its
/// first-seen appearance participates in this pipeline: each track is
/// attributed to at most one canonical frame.
#[derive(Debug, Clone, Serialize)]
pub struct Track {
    /// Opaque stable identifier (the key in the source map, e.g. "chair_3")
    pub id: String,

    /// Semantic class name (e.g. "ladder", "mug"); free text
    pub label: String,

    /// Representative 3D position in meters; origin when the source record
    /// carried no usable geometry
    pub center: Vector3<f64>,

    /// 3D extent from bbox_max - bbox_min; zero when absent
    pub size: Vector3<f64>,

    /// Zero-based index into the upstream frame sequence at first observation
    pub first_frame_index: Option<u32>,

    /// Image-path hint for the first observation. May disagree with
    /// `first_frame_index`; the path wins during frame assignment.
    pub first_frame_path: Option<String>,

    /// Pixel bounding box [x1, y1, x2, y2] at first detection,
    /// [0, 0, 0, 0] when absent or malformed
    pub first_bbox: [f64; 4],
}

impl Track {
    /// Euclidean distance of the 3D center from the camera origin.
    ///
    /// Zero for tracks whose source record lacked geometry (their center
    /// normalizes to the origin).
    #[inline]
    pub fn distance(&self) -> f64 {
        self.center.norm()
    }

    /// Euclidean distance between two tracked objects' centers.
    #[inline]
    pub fn distance_to(&self, other: &Track) -> f64 {
        (self.center - other.center).norm()
    }
}

// ============================================================================
// OUTPUT SIDE (annotations)
// ============================================================================

/// Planar footprint of an object, taken from the first two size components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Extent along the first size axis, meters
    pub length: f64,

    /// Extent along the second size axis, meters
    pub width: f64,
}

/// One object as displayed inside its assigned frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotatedObject {
    /// Copied from the track
    pub id: String,

    /// Copied from the track
    pub label: String,

    /// Pixel bounding box [x1, y1, x2, y2]; [0, 0, 0, 0] when unknown
    pub bbox: [f64; 4],

    /// Euclidean norm of the track center, meters; 0 when geometry was missing
    pub distance: f64,

    /// Planar footprint; zero components when the source had no size
    pub dimensions: Dimensions,
}

impl AnnotatedObject {
    /// Derive the displayable record for a track.
    pub fn from_track(track: &Track) -> Self {
        Self {
            id: track.id.clone(),
            label: track.label.clone(),
            bbox: track.first_bbox,
            distance: track.distance(),
            dimensions: Dimensions {
                length: track.size.x,
                width: track.size.y,
            },
        }
    }
}

/// One selected canonical frame with its objects, ready for display.
///
/// `objects` preserves source-map insertion order, not any spatial sort.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameAnnotation {
    /// 1-based index into the canonical frame sequence
    pub frame_number: u32,

    /// Resolved path of the representative image, derived from the frame
    /// naming convention (never copied from a single track's path hint)
    pub image_path: String,

    /// Objects attributed to this frame, in source-map order
    pub objects: Vec<AnnotatedObject>,
}

/// One entry of the flattened, LLM-consumable spatial snapshot.
///
/// The (x, y, z) position is a pseudo-3D approximation projected from the
/// pixel bbox center and the object distance. It is NOT a reconstruction;
/// callers must not treat it as ground truth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpatialObject {
    /// Canonical frame number the snapshot was taken from
    pub frame: u32,

    /// Label with distance and footprint inlined,
    /// e.g. "ladder [dist: 4.1 m, size: 1.0x0.5 m]"
    pub object_name: String,

    pub x: f64,
    pub y: f64,
    pub z: f64,
}

// ============================================================================
// REPORTS (non-fatal degradation counters)
// ============================================================================

/// Load-stage side channel: how much of the source map was usable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadReport {
    /// Records normalized into tracks
    pub loaded: usize,

    /// Records skipped because they failed structural decoding
    pub malformed_skipped: usize,
}

/// Assignment-stage side channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignReport {
    /// Tracks attributed to a canonical frame
    pub assigned: usize,

    /// Tracks with no resolvable frame (excluded, not an error)
    pub unassigned: usize,
}

/// Whole-pipeline report rolled up from the per-stage side channels.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PipelineReport {
    pub load: LoadReport,
    pub assign: AssignReport,

    /// Number of frames that survived density selection
    pub selected_frames: usize,

    /// True when the fallback annotation set was substituted (empty map or
    /// empty selection)
    pub used_fallback: bool,
}
