//! The full annotation pipeline.
//!
//! Chains the four stages (load -> assign -> select -> build) behind one
//! entry point. The pipeline is a pure function of its inputs: no shared
//! mutable state, no caching, safe to call from any request context. Bad
//! data degrades to smaller-but-valid output or to the fallback set; only
//! an unusable source document is a hard error.

use serde_json::Value;
use tracing::{info, warn};

use crate::annotate::{build, build_snapshot, SnapshotConfig};
use crate::fallback::{DemoFallback, FallbackProvider};
use crate::frame_assign::{assign, IndexHypothesis};
use crate::frame_select::select;
use crate::frames::FrameUniverse;
use crate::map_loader::{load_tracks, LoadError};
use crate::model::{AnnotatedObject, FrameAnnotation, PipelineReport, SpatialObject};

/// Tunables for one pipeline instance.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// The canonical frame universe
    pub universe: FrameUniverse,

    /// Interpretation of `first_frame_index` (see [`IndexHypothesis`])
    pub hypothesis: IndexHypothesis,

    /// How many of the densest frames to keep (default: 5)
    pub top_n: usize,

    /// Normalization constants for [`Pipeline::snapshot`]
    pub snapshot: SnapshotConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            universe: FrameUniverse::default(),
            hypothesis: IndexHypothesis::default(),
            top_n: 5,
            snapshot: SnapshotConfig::default(),
        }
    }
}

/// Result of one pipeline invocation.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Final annotation list, chronological among the selected frames;
    /// never empty unless the fallback provider is [`crate::fallback::NoFallback`]
    pub annotations: Vec<FrameAnnotation>,

    /// Degradation counters for observability
    pub report: PipelineReport,
}

impl PipelineOutput {
    /// All annotated objects of a given class, with the frame each was
    /// last seen in. Label comparison is case-insensitive; emission order
    /// follows the annotation list.
    ///
    /// This backs the assistant's "where did I last see my X" lookup.
    pub fn find_by_label<'a>(&'a self, label: &str) -> Vec<(u32, &'a AnnotatedObject)> {
        let needle = label.to_lowercase();
        self.annotations
            .iter()
            .flat_map(|annotation| {
                annotation
                    .objects
                    .iter()
                    .filter(|object| object.label.to_lowercase() == needle)
                    .map(|object| (annotation.frame_number, object))
            })
            .collect()
    }
}

/// Hard pipeline failures. Everything else degrades gracefully.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("failed to load source map: {0}")]
    Load(#[from] LoadError),
}

/// The aggregation pipeline: raw object map in, frame annotations out.
pub struct Pipeline {
    config: PipelineConfig,
    fallback: Box<dyn FallbackProvider>,
}

impl Pipeline {
    /// Pipeline with the default demo fallback provider.
    pub fn new(config: PipelineConfig) -> Self {
        Self::with_fallback(config, Box::new(DemoFallback))
    }

    /// Pipeline with an injected fallback strategy.
    pub fn with_fallback(config: PipelineConfig, fallback: Box<dyn FallbackProvider>) -> Self {
        Self { config, fallback }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run all four stages over a raw source map document.
    ///
    /// The input is never mutated; every invocation derives fresh output.
    /// An empty selection (empty map, fully malformed map, or no
    /// assignable track) substitutes the fallback set and flags it in the
    /// report rather than erroring.
    pub fn run(&self, doc: &Value) -> Result<PipelineOutput, PipelineError> {
        let (tracks, load) = load_tracks(doc)?;
        let (assignments, assign_report) =
            assign(&tracks, &self.config.universe, self.config.hypothesis);
        let selection = select(assignments, self.config.top_n);

        let mut report = PipelineReport {
            load,
            assign: assign_report,
            selected_frames: selection.len(),
            used_fallback: false,
        };

        let annotations = if selection.is_empty() {
            warn!("no frame has any assigned object, substituting fallback set");
            report.used_fallback = true;
            self.fallback.annotations(&self.config.universe)
        } else {
            build(&selection, &self.config.universe)
        };

        info!(
            "pipeline: {} tracks in, {} frame(s) out (fallback: {})",
            report.load.loaded,
            annotations.len(),
            report.used_fallback
        );

        Ok(PipelineOutput {
            annotations,
            report,
        })
    }

    /// Spatial snapshot of one built frame, using this pipeline's
    /// normalization config. The frame cursor is owned by the caller.
    pub fn snapshot(&self, annotation: &FrameAnnotation) -> Vec<SpatialObject> {
        build_snapshot(annotation, &self.config.snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fallback::NoFallback;
    use approx::assert_relative_eq;
    use serde_json::json;

    fn ten_frame_config() -> PipelineConfig {
        PipelineConfig {
            universe: FrameUniverse::with_count(10),
            ..Default::default()
        }
    }

    /// The cross-stage scenario: a path-matched track, an index-matched
    /// track, and a geometry-less track with no frame hint.
    fn scenario_map() -> Value {
        json!({
            "ladder_0": {
                "label": "ladder",
                "center": [3.0, 4.0, 0.0],
                "size": [0.6, 0.4, 2.0],
                "first_frame_path": "../alumni_images/frame_000005.png",
                "first_frame_idx": 0,
                "first_bbox": [150.0, 200.0, 250.0, 600.0],
            },
            "mug_1": {
                "label": "mug",
                "center": [0.0, 0.0, 2.0],
                "first_frame_idx": 6,
                "first_bbox": [220.0, 140.0, 420.0, 340.0],
            },
            "ghost_2": {
                "label": "ghost",
            },
        })
    }

    #[test]
    fn test_scenario_selection_and_order() {
        let pipeline = Pipeline::new(ten_frame_config());
        let output = pipeline.run(&scenario_map()).unwrap();

        // Exactly two frames qualify: 5 (path match) and 7 (index 6 + 1).
        // The geometry-less, hintless track is dropped. No padding.
        let frames: Vec<u32> = output
            .annotations
            .iter()
            .map(|a| a.frame_number)
            .collect();
        assert_eq!(frames, vec![5, 7]);

        assert_eq!(output.report.load.loaded, 3);
        assert_eq!(output.report.assign.assigned, 2);
        assert_eq!(output.report.assign.unassigned, 1);
        assert_eq!(output.report.selected_frames, 2);
        assert!(!output.report.used_fallback);
    }

    #[test]
    fn test_scenario_derivations() {
        let pipeline = Pipeline::new(ten_frame_config());
        let output = pipeline.run(&scenario_map()).unwrap();

        let ladder = &output.annotations[0].objects[0];
        assert_relative_eq!(ladder.distance, 5.0);
        assert_eq!(output.annotations[0].image_path, "frame_000005.png");

        // Path match wins over the conflicting index 0 on the ladder
        assert_eq!(output.annotations[0].frame_number, 5);

        let snapshot = pipeline.snapshot(&output.annotations[1]);
        assert_eq!(snapshot[0].frame, 7);
        assert_relative_eq!(snapshot[0].x, 0.0);
        assert_relative_eq!(snapshot[0].z, 2.0);
    }

    #[test]
    fn test_determinism_across_runs() {
        let pipeline = Pipeline::new(ten_frame_config());
        let doc = scenario_map();

        let first = serde_json::to_string(&pipeline.run(&doc).unwrap().annotations).unwrap();
        for _ in 0..5 {
            let again =
                serde_json::to_string(&pipeline.run(&doc).unwrap().annotations).unwrap();
            assert_eq!(first, again);
        }
    }

    #[test]
    fn test_empty_map_substitutes_fallback() {
        let pipeline = Pipeline::new(ten_frame_config());
        let output = pipeline.run(&json!({})).unwrap();

        assert!(!output.annotations.is_empty());
        assert!(output.report.used_fallback);
        assert_eq!(output.report.selected_frames, 0);
    }

    #[test]
    fn test_unassignable_map_substitutes_fallback() {
        let pipeline = Pipeline::new(ten_frame_config());
        // Loads fine but nothing can be attributed to a frame
        let output = pipeline
            .run(&json!({ "orphan_1": { "label": "orphan", "center": [1.0, 0.0, 0.0] } }))
            .unwrap();

        assert!(output.report.used_fallback);
        assert_eq!(output.report.assign.unassigned, 1);
        assert!(!output.annotations.is_empty());
    }

    #[test]
    fn test_no_fallback_provider_yields_empty_output() {
        let pipeline = Pipeline::with_fallback(ten_frame_config(), Box::new(NoFallback));
        let output = pipeline.run(&json!({})).unwrap();

        assert!(output.annotations.is_empty());
        assert!(output.report.used_fallback);
    }

    #[test]
    fn test_find_by_label_is_case_insensitive() {
        let pipeline = Pipeline::new(ten_frame_config());
        let output = pipeline.run(&scenario_map()).unwrap();

        let hits = output.find_by_label("Ladder");
        assert_eq!(hits.len(), 1);
        let (frame, object) = hits[0];
        assert_eq!(frame, 5);
        assert_eq!(object.id, "ladder_0");

        assert!(output.find_by_label("piano").is_empty());
    }

    #[test]
    fn test_wrapped_map_end_to_end() {
        let pipeline = Pipeline::new(ten_frame_config());
        let doc = json!({ "object_map": {
            "chair_0": { "label": "chair", "center": [1.0, 1.0, 1.0], "first_frame_idx": 2 }
        }});

        let output = pipeline.run(&doc).unwrap();
        assert_eq!(output.annotations.len(), 1);
        assert_eq!(output.annotations[0].frame_number, 3);
    }

    #[test]
    fn test_non_object_source_is_hard_error() {
        let pipeline = Pipeline::new(ten_frame_config());
        assert!(matches!(
            pipeline.run(&json!("nope")),
            Err(PipelineError::Load(LoadError::NotAnObject))
        ));
    }
}
