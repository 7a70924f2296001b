use mien_core::{Embedding, Gallery, MatchError, MatchResult, Matcher, QueryFace, ScoringStrategy};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

use crate::provider::{EmbeddingProvider, ImageSource, ProviderError};

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),
    #[error("matcher error: {0}")]
    Matcher(#[from] MatchError),
    #[error("provider returned {embeddings} embeddings for {boxes} boxes")]
    EmbeddingCountMismatch { boxes: usize, embeddings: usize },
    #[error("engine thread exited")]
    ChannelClosed,
}

/// Messages sent from async callers to the engine thread.
enum EngineRequest {
    Recognize {
        source: ImageSource,
        reply: oneshot::Sender<Result<Vec<MatchResult>, EngineError>>,
    },
}

/// Clone-safe handle to the engine thread.
#[derive(Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<EngineRequest>,
}

impl EngineHandle {
    /// Identify every face in an image: detect, extract, match.
    ///
    /// Results are in detection order; a face whose embedding fails
    /// validation is omitted while its siblings still come back. An image
    /// with no detectable faces yields an empty list.
    pub async fn recognize(&self, source: ImageSource) -> Result<Vec<MatchResult>, EngineError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(EngineRequest::Recognize {
                source,
                reply: reply_tx,
            })
            .await
            .map_err(|_| EngineError::ChannelClosed)?;
        reply_rx.await.map_err(|_| EngineError::ChannelClosed)?
    }
}

/// Spawn the engine on a dedicated OS thread.
///
/// The gallery is built and the matcher configuration validated before the
/// thread starts (fail-fast); callers holding the returned handle can never
/// observe a half-built gallery.
pub fn spawn_engine<P: EmbeddingProvider>(
    mut provider: P,
    labeled: Vec<(String, Embedding)>,
    threshold: f32,
    strategy: ScoringStrategy,
) -> Result<EngineHandle, EngineError> {
    let gallery = Gallery::build(labeled);
    tracing::info!(subjects = gallery.len(), dim = ?gallery.dim(), "gallery built");

    let matcher = Matcher::new(gallery, threshold, strategy)?;

    let (tx, mut rx) = mpsc::channel::<EngineRequest>(4);

    std::thread::Builder::new()
        .name("mien-engine".into())
        .spawn(move || {
            tracing::info!("engine thread started");
            while let Some(req) = rx.blocking_recv() {
                match req {
                    EngineRequest::Recognize { source, reply } => {
                        let result = run_recognize(&mut provider, &matcher, &source);
                        let _ = reply.send(result);
                    }
                }
            }
            tracing::info!("engine thread exiting");
        })
        .expect("failed to spawn engine thread");

    Ok(EngineHandle { tx })
}

/// Run the full pipeline for one image: load, detect, extract, match.
fn run_recognize<P: EmbeddingProvider>(
    provider: &mut P,
    matcher: &Matcher,
    source: &ImageSource,
) -> Result<Vec<MatchResult>, EngineError> {
    let image = provider.load_image(source)?;

    let boxes = provider.detect_faces(&image)?;
    if boxes.is_empty() {
        tracing::debug!("no faces detected");
        return Ok(Vec::new());
    }

    let embeddings = provider.extract_embeddings(&image, &boxes)?;
    if embeddings.len() != boxes.len() {
        return Err(EngineError::EmbeddingCountMismatch {
            boxes: boxes.len(),
            embeddings: embeddings.len(),
        });
    }

    let queries: Vec<QueryFace> = boxes
        .into_iter()
        .zip(embeddings)
        .map(|(bbox, embedding)| QueryFace { embedding, bbox })
        .collect();

    tracing::debug!(faces = queries.len(), "matching detected faces");
    Ok(matcher.match_all(&queries))
}
