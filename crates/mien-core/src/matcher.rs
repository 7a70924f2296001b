//! Nearest-neighbor matching against the gallery.

use crate::confidence::ScoringStrategy;
use crate::gallery::Gallery;
use crate::types::{MatchResult, QueryFace, UNKNOWN_LABEL};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MatchError {
    #[error("threshold must be a finite number in (0.0, 1.0], got {0}")]
    InvalidThreshold(f32),
    #[error("query embedding has {actual} components, gallery embeddings have {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("query embedding contains non-finite components")]
    NonFiniteEmbedding,
    #[error("non-finite distance to gallery entry {label:?}")]
    NonFiniteDistance { label: String },
}

/// Validate an accept/reject distance threshold.
///
/// Zero is rejected along with everything outside (0.0, 1.0]: both scoring
/// curves divide by the threshold.
pub fn validate_threshold(threshold: f32) -> Result<(), MatchError> {
    if !threshold.is_finite() || threshold <= 0.0 || threshold > 1.0 {
        return Err(MatchError::InvalidThreshold(threshold));
    }
    Ok(())
}

/// Matches query faces against an immutable gallery.
///
/// Owns the gallery for its lifetime and holds no mutable state, so a
/// single matcher can serve concurrent readers without locks.
#[derive(Debug, Clone)]
pub struct Matcher {
    gallery: Gallery,
    threshold: f32,
    strategy: ScoringStrategy,
}

impl Matcher {
    /// Default accept/reject distance threshold.
    pub const DEFAULT_THRESHOLD: f32 = 0.6;

    /// Create a matcher over `gallery`.
    ///
    /// The threshold is the single tunable controlling the precision/recall
    /// trade-off; an invalid one is rejected here rather than discovered
    /// mid-match.
    pub fn new(
        gallery: Gallery,
        threshold: f32,
        strategy: ScoringStrategy,
    ) -> Result<Self, MatchError> {
        validate_threshold(threshold)?;
        tracing::debug!(
            subjects = gallery.len(),
            threshold,
            strategy = %strategy,
            "matcher created"
        );
        Ok(Self {
            gallery,
            threshold,
            strategy,
        })
    }

    pub fn gallery(&self) -> &Gallery {
        &self.gallery
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn strategy(&self) -> ScoringStrategy {
        self.strategy
    }

    /// Match one query face against the gallery.
    ///
    /// Scans every entry, keeps the minimum distance (ties resolve to the
    /// earliest-inserted entry), and accepts the winning label only when
    /// the distance is strictly below the threshold. Under the asymmetric
    /// strategy a rejected face still carries the scorer's falloff value;
    /// under linear-threshold rejection is a hard zero.
    pub fn match_face(&self, query: &QueryFace) -> Result<MatchResult, MatchError> {
        let Some(expected) = self.gallery.dim() else {
            // Empty gallery: everyone is a stranger, no scoring involved.
            return Ok(MatchResult::unknown(query.bbox));
        };

        if !query.embedding.is_finite() {
            return Err(MatchError::NonFiniteEmbedding);
        }
        if query.embedding.dim() != expected {
            return Err(MatchError::DimensionMismatch {
                expected,
                actual: query.embedding.dim(),
            });
        }

        let mut best_idx = 0usize;
        let mut best_distance = f32::INFINITY;
        for (i, entry) in self.gallery.entries().iter().enumerate() {
            let distance = query.embedding.euclidean_distance(&entry.embedding);
            if !distance.is_finite() {
                return Err(MatchError::NonFiniteDistance {
                    label: entry.label.clone(),
                });
            }
            // Strict comparison keeps the earliest entry on equal distances.
            if distance < best_distance {
                best_distance = distance;
                best_idx = i;
            }
        }

        let entry = &self.gallery.entries()[best_idx];
        let accepted = best_distance < self.threshold;
        let confidence = self.strategy.score(best_distance, self.threshold);
        let label = if accepted {
            entry.label.clone()
        } else {
            UNKNOWN_LABEL.to_string()
        };

        tracing::debug!(
            label = %label,
            nearest = %entry.label,
            distance = best_distance,
            confidence,
            "query face matched"
        );

        Ok(MatchResult {
            label,
            confidence,
            bbox: query.bbox,
        })
    }

    /// Match a batch of query faces, isolating per-face failures.
    ///
    /// A face that fails validation is logged and omitted; sibling faces
    /// still produce results, in input order.
    pub fn match_all(&self, queries: &[QueryFace]) -> Vec<MatchResult> {
        let mut results = Vec::with_capacity(queries.len());
        for (i, query) in queries.iter().enumerate() {
            match self.match_face(query) {
                Ok(result) => results.push(result),
                Err(err) => {
                    tracing::warn!(face = i, error = %err, "skipping query face");
                }
            }
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BoundingBox, Embedding};

    fn emb(values: &[f32]) -> Embedding {
        Embedding::new(values.to_vec())
    }

    fn bbox() -> BoundingBox {
        BoundingBox {
            x: 10.0,
            y: 20.0,
            width: 30.0,
            height: 40.0,
        }
    }

    fn query(values: &[f32]) -> QueryFace {
        QueryFace {
            embedding: emb(values),
            bbox: bbox(),
        }
    }

    fn two_person_gallery() -> Gallery {
        Gallery::build(vec![
            ("alice".to_string(), emb(&[0.0, 0.0])),
            ("bob".to_string(), emb(&[0.7, 0.0])),
        ])
    }

    #[test]
    fn test_nearest_neighbor_wins() {
        // distance to alice = 0.2, to bob = 0.5
        let matcher = Matcher::new(two_person_gallery(), 0.6, ScoringStrategy::LinearThreshold)
            .unwrap();
        let result = matcher.match_face(&query(&[0.2, 0.0])).unwrap();
        assert_eq!(result.label, "alice");
        assert_eq!(result.confidence, 0.67);
        assert_eq!(result.bbox, bbox());
    }

    #[test]
    fn test_reject_beyond_threshold_linear() {
        let matcher = Matcher::new(two_person_gallery(), 0.6, ScoringStrategy::LinearThreshold)
            .unwrap();
        // nearest distance is 0.8 (to alice)
        let result = matcher.match_face(&query(&[-0.8, 0.0])).unwrap();
        assert_eq!(result.label, UNKNOWN_LABEL);
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn test_reject_beyond_threshold_asymmetric_keeps_falloff() {
        let matcher =
            Matcher::new(two_person_gallery(), 0.6, ScoringStrategy::Asymmetric).unwrap();
        let result = matcher.match_face(&query(&[-0.8, 0.0])).unwrap();
        assert_eq!(result.label, UNKNOWN_LABEL);
        // Rejected, but the asymmetric curve still ranks it: (1-0.8)/0.8.
        assert_eq!(result.confidence, 0.25);
    }

    #[test]
    fn test_at_threshold_is_rejected() {
        // Distance exactly at the threshold: acceptance is strict.
        let gallery = Gallery::build(vec![("alice".to_string(), emb(&[0.0, 0.0]))]);
        let matcher = Matcher::new(gallery, 0.5, ScoringStrategy::Asymmetric).unwrap();
        let result = matcher.match_face(&query(&[0.5, 0.0])).unwrap();
        assert_eq!(result.label, UNKNOWN_LABEL);
        assert_eq!(result.confidence, 0.5);
    }

    #[test]
    fn test_equal_distances_resolve_to_earliest_entry() {
        let gallery = Gallery::build(vec![
            ("first".to_string(), emb(&[0.1, 0.0])),
            ("second".to_string(), emb(&[-0.1, 0.0])),
        ]);
        let matcher = Matcher::new(gallery, 0.6, ScoringStrategy::Asymmetric).unwrap();
        let result = matcher.match_face(&query(&[0.0, 0.0])).unwrap();
        assert_eq!(result.label, "first");
    }

    #[test]
    fn test_empty_gallery_yields_unknown() {
        let matcher =
            Matcher::new(Gallery::default(), 0.6, ScoringStrategy::Asymmetric).unwrap();
        let result = matcher.match_face(&query(&[0.0, 0.0])).unwrap();
        assert_eq!(result.label, UNKNOWN_LABEL);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.bbox, bbox());
    }

    #[test]
    fn test_dimension_mismatch_is_an_error() {
        let matcher =
            Matcher::new(two_person_gallery(), 0.6, ScoringStrategy::Asymmetric).unwrap();
        let err = matcher.match_face(&query(&[0.0, 0.0, 0.0])).unwrap_err();
        assert!(matches!(
            err,
            MatchError::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        ));
    }

    #[test]
    fn test_non_finite_query_is_an_error() {
        let matcher =
            Matcher::new(two_person_gallery(), 0.6, ScoringStrategy::Asymmetric).unwrap();
        let err = matcher.match_face(&query(&[f32::NAN, 0.0])).unwrap_err();
        assert!(matches!(err, MatchError::NonFiniteEmbedding));
    }

    #[test]
    fn test_match_all_isolates_bad_faces() {
        let matcher = Matcher::new(two_person_gallery(), 0.6, ScoringStrategy::LinearThreshold)
            .unwrap();
        let queries = vec![
            query(&[0.2, 0.0]),
            query(&[0.0, 0.0, 0.0]), // wrong dimension, skipped
            query(&[0.6, 0.0]),      // distance 0.1 to bob
        ];
        let results = matcher.match_all(&queries);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].label, "alice");
        assert_eq!(results[1].label, "bob");
    }

    #[test]
    fn test_invalid_thresholds_rejected_at_construction() {
        for bad in [0.0, -0.1, 1.5, f32::NAN, f32::INFINITY] {
            let result = Matcher::new(Gallery::default(), bad, ScoringStrategy::Asymmetric);
            assert!(matches!(result, Err(MatchError::InvalidThreshold(_))), "{bad}");
        }
        // 1.0 is the inclusive upper edge.
        assert!(Matcher::new(Gallery::default(), 1.0, ScoringStrategy::Asymmetric).is_ok());
    }
}
