//! Third Eye Core - Spatial Annotation Aggregation Pipeline
//!
//! Derives a compact, deterministic, frame-indexed annotation set from a
//! raw object-tracking map, in four independently testable stages:
//! 1. **Map Loader**: normalize the raw map into tracks
//! 2. **Frame Assigner**: attribute each track to one canonical frame
//! 3. **Frame Selector**: rank frames by object density, keep the top N
//! 4. **Annotation Builder**: emit bounded, ordered annotation records
//!    (plus the single-frame spatial snapshot for LLM grounding)

pub mod annotate;
pub mod fallback;
pub mod frame_assign;
pub mod frame_select;
pub mod frames;
pub mod map_loader;
pub mod model;
pub mod pipeline;

// Re-export key types for convenience
pub use annotate::{build, build_snapshot, SnapshotConfig};
pub use fallback::{DemoFallback, FallbackProvider, NoFallback};
pub use frame_assign::{assign, FrameAssignments, IndexHypothesis};
pub use frame_select::{select, SelectedFrame, Selection};
pub use frames::FrameUniverse;
pub use map_loader::{load_tracks, LoadError};
pub use model::{
    AnnotatedObject, AssignReport, Dimensions, FrameAnnotation, LoadReport, PipelineReport,
    SpatialObject, Track,
};
pub use pipeline::{Pipeline, PipelineConfig, PipelineError, PipelineOutput};
