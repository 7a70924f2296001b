use serde::{Deserialize, Serialize};

/// Sentinel label reported for a face that matches no gallery entry.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Bounding box for a detected face, in pixel coordinates.
///
/// Produced by the external face detector and carried through matching
/// unchanged; the matcher never inspects it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Face embedding vector (dimensionality fixed by the embedding provider,
/// typically 128 or 512).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Embedding {
    pub values: Vec<f32>,
}

impl Embedding {
    pub fn new(values: Vec<f32>) -> Self {
        Self { values }
    }

    /// Number of components.
    pub fn dim(&self) -> usize {
        self.values.len()
    }

    /// True if every component is a finite number.
    pub fn is_finite(&self) -> bool {
        self.values.iter().all(|v| v.is_finite())
    }

    /// Compute Euclidean distance to another embedding.
    ///
    /// This is the metric the embedding provider was trained for; lower
    /// means more similar.
    pub fn euclidean_distance(&self, other: &Embedding) -> f32 {
        self.values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f32>()
            .sqrt()
    }
}

impl From<Vec<f32>> for Embedding {
    fn from(values: Vec<f32>) -> Self {
        Self { values }
    }
}

/// A detected face awaiting identification: its embedding plus the bounding
/// box it was extracted from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryFace {
    pub embedding: Embedding,
    pub bbox: BoundingBox,
}

/// Result of matching one query face against the gallery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    /// Winning gallery label, or [`UNKNOWN_LABEL`] if rejected.
    pub label: String,
    /// Calibrated confidence in [0.0, 1.0], rounded to 2 decimals.
    pub confidence: f32,
    /// The query's bounding box, passed through unchanged.
    pub bbox: BoundingBox,
}

impl MatchResult {
    /// Result for a face with nothing to match against.
    pub fn unknown(bbox: BoundingBox) -> Self {
        Self {
            label: UNKNOWN_LABEL.to_string(),
            confidence: 0.0,
            bbox,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_euclidean_distance_identical() {
        let a = Embedding::new(vec![0.1, 0.2, 0.3]);
        let b = a.clone();
        assert_eq!(a.euclidean_distance(&b), 0.0);
    }

    #[test]
    fn test_euclidean_distance_known() {
        // 3-4-5 triangle
        let a = Embedding::new(vec![0.0, 0.0]);
        let b = Embedding::new(vec![3.0, 4.0]);
        assert!((a.euclidean_distance(&b) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_euclidean_distance_symmetric() {
        let a = Embedding::new(vec![0.5, -0.25, 1.0]);
        let b = Embedding::new(vec![-0.5, 0.75, 0.0]);
        assert_eq!(a.euclidean_distance(&b), b.euclidean_distance(&a));
    }

    #[test]
    fn test_is_finite() {
        assert!(Embedding::new(vec![0.0, 1.0, -1.0]).is_finite());
        assert!(!Embedding::new(vec![0.0, f32::NAN]).is_finite());
        assert!(!Embedding::new(vec![f32::INFINITY]).is_finite());
    }

    #[test]
    fn test_embedding_serializes_as_bare_array() {
        let e = Embedding::new(vec![0.1, 0.2]);
        let json = serde_json::to_string(&e).unwrap();
        assert_eq!(json, "[0.1,0.2]");
        let back: Embedding = serde_json::from_str(&json).unwrap();
        assert_eq!(back, e);
    }

    #[test]
    fn test_unknown_result() {
        let bbox = BoundingBox {
            x: 1.0,
            y: 2.0,
            width: 3.0,
            height: 4.0,
        };
        let result = MatchResult::unknown(bbox);
        assert_eq!(result.label, UNKNOWN_LABEL);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.bbox, bbox);
    }
}
