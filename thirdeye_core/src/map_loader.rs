//! Map Loader - source-map normalization.
//!
//! Turns the raw object-track map (a keyed JSON structure produced by the
//! upstream SLAM/VLM exporter) into normalized [`Track`] records:
//! - accepts both the flat shape and the `{"object_map": {...}}` wrapper
//! - fills documented defaults for missing optional fields
//! - skips (and counts) records that fail structural decoding, never
//!   failing the whole load for one bad record
//!
//! The parse is pure: no I/O, no caching, no mutation of the input value.

use nalgebra::Vector3;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::model::{LoadReport, Track};

/// Hard failure of the load stage.
///
/// Everything short of this degrades gracefully to a smaller track list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    /// The top-level document is not a JSON object at all
    #[error("source document is not a JSON object")]
    NotAnObject,
}

/// Raw per-record shape as written by the upstream exporter.
///
/// Every field is optional; `position` is an alias of `center` and
/// `bbox_min`/`bbox_max` reconstruct `size` when it is absent. Extra fields
/// (point clouds, observation counts, embedding indices) are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
struct RawTrack {
    label: Option<String>,
    center: Option<Vec<f64>>,
    position: Option<Vec<f64>>,
    size: Option<Vec<f64>>,
    bbox_min: Option<Vec<f64>>,
    bbox_max: Option<Vec<f64>>,
    first_frame_idx: Option<i64>,
    first_frame_path: Option<String>,
    first_bbox: Option<Vec<f64>>,
}

/// Normalize a source map into tracks, in document order.
///
/// Defaults applied per record: missing center/size become zero vectors
/// (distance and dimensions then derive to 0), a missing bbox becomes
/// `[0, 0, 0, 0]`, a missing label becomes `"unknown"`, and a negative
/// frame index is treated as unset.
///
/// Returns [`LoadError::NotAnObject`] only when no keyed records can be
/// obtained at all; the caller decides whether to substitute a fallback
/// dataset.
pub fn load_tracks(doc: &Value) -> Result<(Vec<Track>, LoadReport), LoadError> {
    let map = unwrap_object_map(doc)?;

    let mut tracks = Vec::with_capacity(map.len());
    let mut report = LoadReport::default();

    for (key, value) in map {
        match RawTrack::deserialize(value) {
            Ok(raw) => {
                tracks.push(normalize(key, raw));
                report.loaded += 1;
            }
            Err(err) => {
                warn!("skipping malformed record '{}': {}", key, err);
                report.malformed_skipped += 1;
            }
        }
    }

    debug!(
        "loaded {} tracks ({} malformed records skipped)",
        report.loaded, report.malformed_skipped
    );
    Ok((tracks, report))
}

/// Resolve the record map: the `object_map` wrapper when present, the
/// document itself otherwise.
fn unwrap_object_map(doc: &Value) -> Result<&serde_json::Map<String, Value>, LoadError> {
    let top = doc.as_object().ok_or(LoadError::NotAnObject)?;

    match top.get("object_map") {
        Some(Value::Object(inner)) => Ok(inner),
        _ => Ok(top),
    }
}

fn normalize(key: &str, raw: RawTrack) -> Track {
    // `position` is the exporter's alias for `center`
    let center = vec3(raw.center.as_deref())
        .or_else(|| vec3(raw.position.as_deref()))
        .unwrap_or_else(Vector3::zeros);

    // Prefer the explicit size; reconstruct from the point-cloud bounds
    // when it is absent
    let size = vec3(raw.size.as_deref())
        .or_else(|| {
            let min = vec3(raw.bbox_min.as_deref())?;
            let max = vec3(raw.bbox_max.as_deref())?;
            Some(max - min)
        })
        .unwrap_or_else(Vector3::zeros);

    let first_frame_index = raw
        .first_frame_idx
        .and_then(|idx| u32::try_from(idx).ok());

    let first_bbox = match raw.first_bbox.as_deref() {
        Some([x1, y1, x2, y2]) => [*x1, *y1, *x2, *y2],
        _ => [0.0; 4],
    };

    Track {
        id: key.to_string(),
        label: raw.label.unwrap_or_else(|| "unknown".to_string()),
        center,
        size,
        first_frame_index,
        first_frame_path: raw.first_frame_path,
        first_bbox,
    }
}

/// First three components as a vector; None unless at least three are present.
fn vec3(values: Option<&[f64]>) -> Option<Vector3<f64>> {
    match values {
        Some([x, y, z, ..]) => Some(Vector3::new(*x, *y, *z)),
        _ => None,
    }
}
