//! Fallback annotation providers.
//!
//! When the source map yields zero usable tracks (empty or fully malformed)
//! or no frame survives selection, the pipeline substitutes a fixed
//! annotation set so downstream UI/demo code always has something to
//! render. The provider is an injectable strategy: swap it for real fixture
//! data, or for [`NoFallback`] in builds that prefer an empty result.

use nalgebra::Vector3;

use crate::frames::FrameUniverse;
use crate::model::{AnnotatedObject, FrameAnnotation, Track};

/// Strategy for producing the substitute annotation set.
pub trait FallbackProvider: Send + Sync {
    /// Produce the fallback annotations, bounded by the given universe.
    fn annotations(&self, universe: &FrameUniverse) -> Vec<FrameAnnotation>;
}

/// Default provider: a fixed three-frame synthetic workplace scene.
///
/// Content (documented, deliberately stable):
/// - frame 1: ladder, doorway, worker
/// - frame 2: heavy equipment, overhead shelf
/// - frame 3: worker, hard hat
///
/// Distances and dimensions derive from the synthetic geometry through the
/// same rules as real tracks. Frames beyond the universe are dropped, so a
/// one-frame universe yields a one-frame fallback (and an empty universe an
/// empty set).
#[derive(Debug, Clone, Copy, Default)]
pub struct DemoFallback;

impl DemoFallback {
    fn scene() -> Vec<(u32, Vec<Track>)> {
        vec![
            (
                1,
                vec![
                    demo_track("ladder_demo", "ladder", [2.5, 0.0, 3.2], [0.6, 0.4, 2.0], [150.0, 200.0, 250.0, 600.0]),
                    demo_track("doorway_demo", "doorway", [2.4, 0.0, 3.5], [0.9, 0.1, 2.1], [140.0, 150.0, 280.0, 650.0]),
                    demo_track("worker_demo", "worker", [-1.5, 0.0, 4.0], [0.5, 0.4, 1.8], [500.0, 350.0, 600.0, 650.0]),
                ],
            ),
            (
                2,
                vec![
                    demo_track("equipment_demo", "heavy equipment", [0.0, 2.8, 5.0], [1.2, 0.8, 1.0], [450.0, 100.0, 550.0, 200.0]),
                    demo_track("shelf_demo", "overhead shelf", [2.5, 2.3, 3.0], [1.4, 0.4, 0.3], [130.0, 120.0, 270.0, 180.0]),
                ],
            ),
            (
                3,
                vec![
                    demo_track("worker_demo", "worker", [2.3, 0.0, 3.3], [0.5, 0.4, 1.8], [180.0, 250.0, 240.0, 580.0]),
                    demo_track("hardhat_demo", "hard hat", [2.5, 2.1, 3.2], [0.3, 0.25, 0.15], [175.0, 175.0, 215.0, 210.0]),
                ],
            ),
        ]
    }
}

impl FallbackProvider for DemoFallback {
    fn annotations(&self, universe: &FrameUniverse) -> Vec<FrameAnnotation> {
        Self::scene()
            .into_iter()
            .filter(|(frame_number, _)| universe.contains(*frame_number))
            .map(|(frame_number, tracks)| FrameAnnotation {
                frame_number,
                image_path: universe.image_path(frame_number),
                objects: tracks.iter().map(AnnotatedObject::from_track).collect(),
            })
            .collect()
    }
}

/// Provider that disables the fallback entirely.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFallback;

impl FallbackProvider for NoFallback {
    fn annotations(&self, _universe: &FrameUniverse) -> Vec<FrameAnnotation> {
        Vec::new()
    }
}

fn demo_track(
    id: &str,
    label: &str,
    center: [f64; 3],
    size: [f64; 3],
    bbox: [f64; 4],
) -> Track {
    Track {
        id: id.to_string(),
        label: label.to_string(),
        center: Vector3::new(center[0], center[1], center[2]),
        size: Vector3::new(size[0], size[1], size[2]),
        first_frame_index: None,
        first_frame_path: None,
        first_bbox: bbox,
    }
}
