//! Annotation Builder - final displayable records and the LLM snapshot.
//!
//! Builds one [`FrameAnnotation`] per selected frame, in chronological
//! order, with the image path derived from the canonical naming convention
//! (never copied from a single track's path hint, which can disagree across
//! tracks in the same frame). Also provides the degenerate single-frame
//! "spatial snapshot" transform used to ground an LLM's spatial reasoning.

use serde::{Deserialize, Serialize};

use crate::frame_select::Selection;
use crate::frames::FrameUniverse;
use crate::model::{AnnotatedObject, FrameAnnotation, SpatialObject};

/// Normalization constants for the bbox-center pseudo-3D projection.
///
/// Defaults correspond to a 640x480 source image: pixel coordinates are
/// shifted by the image center and scaled back to [-1, 1] before being
/// multiplied by the object distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SnapshotConfig {
    /// Horizontal image center in pixels (default: 320)
    pub center_x: f64,

    /// Vertical image center in pixels (default: 240)
    pub center_y: f64,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            center_x: 320.0,
            center_y: 240.0,
        }
    }
}

/// Build the final annotation list for the selected frames.
///
/// Emission order is chronological among the selected subset (ascending
/// frame number); density order only decided which frames qualified.
/// Per-frame object order preserves the source map's insertion order.
pub fn build(selection: &Selection, universe: &FrameUniverse) -> Vec<FrameAnnotation> {
    selection
        .chronological()
        .into_iter()
        .map(|frame| FrameAnnotation {
            frame_number: frame.frame_number,
            image_path: universe.image_path(frame.frame_number),
            objects: frame.tracks.iter().map(AnnotatedObject::from_track).collect(),
        })
        .collect()
}

/// Flatten one frame's annotation into LLM-consumable spatial context.
///
/// For each object, the bbox center is projected through the fixed
/// normalization `((cx - center_x) / center_x, (cy - center_y) / center_y)`
/// and scaled by the object distance; `z` is the distance itself. This is
/// an approximation rather than a true 3D reconstruction - the result
/// grounds free-text spatial answers, it is not measurement data.
///
/// Pure: the input annotation is never mutated.
pub fn build_snapshot(
    annotation: &FrameAnnotation,
    config: &SnapshotConfig,
) -> Vec<SpatialObject> {
    annotation
        .objects
        .iter()
        .map(|object| {
            let [x1, y1, x2, y2] = object.bbox;
            let bbox_center_x = (x1 + x2) / 2.0;
            let bbox_center_y = (y1 + y2) / 2.0;

            SpatialObject {
                frame: annotation.frame_number,
                object_name: format!(
                    "{} [dist: {:.1} m, size: {:.1}x{:.1} m]",
                    object.label,
                    object.distance,
                    object.dimensions.length,
                    object.dimensions.width
                ),
                x: (bbox_center_x - config.center_x) / config.center_x * object.distance,
                y: (bbox_center_y - config.center_y) / config.center_y * object.distance,
                z: object.distance,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame_assign::FrameAssignments;
    use crate::frame_select::select;
    use crate::model::{Dimensions, Track};
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    fn track(id: &str, center: Vector3<f64>) -> Track {
        Track {
            id: id.to_string(),
            label: id.split('_').next().unwrap_or(id).to_string(),
            center,
            size: Vector3::new(1.0, 0.5, 2.0),
            first_frame_index: None,
            first_frame_path: None,
            first_bbox: [220.0, 140.0, 420.0, 340.0],
        }
    }

    fn selection_with(frame: u32, tracks: Vec<Track>) -> Selection {
        let mut assignments = FrameAssignments::new();
        assignments.insert(frame, tracks);
        select(assignments, 5)
    }

    #[test]
    fn test_image_path_derived_from_naming_convention() {
        let universe = FrameUniverse::with_count(10);
        let mut bad_hint = track("ladder_0", Vector3::new(0.0, 0.0, 2.0));
        // A stale hint must not leak into the output path
        bad_hint.first_frame_path = Some("/tmp/other_name.png".to_string());

        let annotations = build(&selection_with(7, vec![bad_hint]), &universe);

        assert_eq!(annotations.len(), 1);
        assert_eq!(annotations[0].frame_number, 7);
        assert_eq!(annotations[0].image_path, "frame_000007.png");
    }

    #[test]
    fn test_build_emits_chronological_order() {
        let universe = FrameUniverse::with_count(10);
        let mut assignments = FrameAssignments::new();
        assignments.insert(2, vec![track("a_1", Vector3::zeros())]);
        assignments.insert(
            9,
            vec![
                track("b_1", Vector3::zeros()),
                track("b_2", Vector3::zeros()),
            ],
        );

        // Density order is [9, 2]; emission must be [2, 9]
        let annotations = build(&select(assignments, 5), &universe);
        let frames: Vec<u32> = annotations.iter().map(|a| a.frame_number).collect();
        assert_eq!(frames, vec![2, 9]);
    }

    #[test]
    fn test_snapshot_centered_bbox_projects_to_axis() {
        // bbox [220,140,420,340] has center (320, 240): normalized (0, 0),
        // so x = y = 0 and z = distance
        let annotation = FrameAnnotation {
            frame_number: 3,
            image_path: "frame_000003.png".to_string(),
            objects: vec![AnnotatedObject {
                id: "mug_1".to_string(),
                label: "mug".to_string(),
                bbox: [220.0, 140.0, 420.0, 340.0],
                distance: 2.0,
                dimensions: Dimensions {
                    length: 0.1,
                    width: 0.1,
                },
            }],
        };

        let snapshot = build_snapshot(&annotation, &SnapshotConfig::default());

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].frame, 3);
        assert_relative_eq!(snapshot[0].x, 0.0);
        assert_relative_eq!(snapshot[0].y, 0.0);
        assert_relative_eq!(snapshot[0].z, 2.0);
    }

    #[test]
    fn test_snapshot_off_center_bbox_scales_with_distance() {
        let annotation = FrameAnnotation {
            frame_number: 1,
            image_path: "frame_000001.png".to_string(),
            objects: vec![AnnotatedObject {
                id: "door_1".to_string(),
                label: "door".to_string(),
                // center (480, 360): normalized (0.5, 0.5)
                bbox: [440.0, 320.0, 520.0, 400.0],
                distance: 4.0,
                dimensions: Dimensions {
                    length: 0.9,
                    width: 0.1,
                },
            }],
        };

        let snapshot = build_snapshot(&annotation, &SnapshotConfig::default());

        assert_relative_eq!(snapshot[0].x, 2.0);
        assert_relative_eq!(snapshot[0].y, 2.0);
        assert_relative_eq!(snapshot[0].z, 4.0);
    }

    #[test]
    fn test_snapshot_label_format() {
        let universe = FrameUniverse::with_count(10);
        let annotations = build(
            &selection_with(2, vec![track("ladder_0", Vector3::new(3.0, 4.0, 0.0))]),
            &universe,
        );
        let snapshot = build_snapshot(&annotations[0], &SnapshotConfig::default());

        assert_eq!(snapshot[0].object_name, "ladder [dist: 5.0 m, size: 1.0x0.5 m]");
    }

    #[test]
    fn test_snapshot_does_not_mutate_annotation() {
        let universe = FrameUniverse::with_count(10);
        let annotations = build(
            &selection_with(2, vec![track("mug_0", Vector3::new(0.0, 0.0, 1.0))]),
            &universe,
        );
        let before = serde_json::to_string(&annotations[0]).unwrap();

        let _ = build_snapshot(&annotations[0], &SnapshotConfig::default());

        let after = serde_json::to_string(&annotations[0]).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_object_order_preserved_within_frame() {
        let universe = FrameUniverse::with_count(10);
        let annotations = build(
            &selection_with(
                4,
                vec![
                    track("zebra_9", Vector3::zeros()),
                    track("apple_1", Vector3::zeros()),
                ],
            ),
            &universe,
        );

        let ids: Vec<&str> = annotations[0]
            .objects
            .iter()
            .map(|o| o.id.as_str())
            .collect();
        assert_eq!(ids, vec!["zebra_9", "apple_1"]);
    }
}
