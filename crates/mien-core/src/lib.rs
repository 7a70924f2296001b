//! mien-core — Gallery matching and confidence scoring for face embeddings.
//!
//! Compares query embeddings produced by an external provider against an
//! immutable gallery of labeled embeddings, picks the nearest entry by
//! Euclidean distance, applies an accept/reject threshold, and converts the
//! raw distance into a calibrated confidence score in [0, 1].

pub mod confidence;
pub mod gallery;
pub mod matcher;
pub mod types;

pub use confidence::ScoringStrategy;
pub use gallery::{Gallery, GalleryEntry};
pub use matcher::{MatchError, Matcher};
pub use types::{BoundingBox, Embedding, MatchResult, QueryFace, UNKNOWN_LABEL};
