//! Boundary with the external embedding provider.

use mien_core::{BoundingBox, Embedding};
use std::path::PathBuf;
use thiserror::Error;

/// Where an image comes from.
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// Filesystem path, decoded by the provider.
    Path(PathBuf),
    /// Raw encoded bytes (e.g. an uploaded file).
    Bytes(Vec<u8>),
}

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("image decode failed: {0}")]
    Decode(String),
    #[error("face detection failed: {0}")]
    Detection(String),
    #[error("embedding extraction failed: {0}")]
    Extraction(String),
}

/// External face pipeline: image decoding, face detection, and embedding
/// extraction.
///
/// The engine relies only on this contract. Methods take `&mut self`
/// because inference runtimes commonly require exclusive session access.
pub trait EmbeddingProvider: Send + 'static {
    /// Decoded image representation, opaque to the engine.
    type Image;

    fn load_image(&mut self, source: &ImageSource) -> Result<Self::Image, ProviderError>;

    /// Detect faces, returning one bounding box per face.
    fn detect_faces(&mut self, image: &Self::Image) -> Result<Vec<BoundingBox>, ProviderError>;

    /// Extract one embedding per box, in box order.
    fn extract_embeddings(
        &mut self,
        image: &Self::Image,
        boxes: &[BoundingBox],
    ) -> Result<Vec<Embedding>, ProviderError>;
}
