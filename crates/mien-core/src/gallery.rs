//! Immutable gallery of labeled embeddings.

use crate::types::Embedding;
use serde::{Deserialize, Serialize};

/// A known subject: stable label plus one canonical embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryEntry {
    pub label: String,
    pub embedding: Embedding,
}

/// Ordered collection of known subjects.
///
/// Built once at startup from already-extracted `(label, embedding)` pairs
/// and never mutated afterwards, so concurrent readers need no
/// synchronization. Where the pairs come from (directory scans, databases)
/// is the caller's concern.
#[derive(Debug, Clone, Default)]
pub struct Gallery {
    entries: Vec<GalleryEntry>,
}

impl Gallery {
    /// Build a gallery from labeled embeddings, preserving input order.
    ///
    /// Only the first valid embedding per label is retained; later pairs
    /// with an already-seen label are ignored. Pairs with an empty label,
    /// non-finite components, or a dimensionality different from the first
    /// retained entry are skipped with a warning. An empty result is a
    /// valid gallery: every query will come back `"Unknown"`.
    pub fn build<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, Embedding)>,
    {
        let mut entries: Vec<GalleryEntry> = Vec::new();
        let mut dim: Option<usize> = None;

        for (label, embedding) in pairs {
            if label.is_empty() {
                tracing::warn!("skipping gallery entry with empty label");
                continue;
            }
            if entries.iter().any(|e| e.label == label) {
                tracing::warn!(label, "duplicate label, keeping first embedding");
                continue;
            }
            if !embedding.is_finite() {
                tracing::warn!(label, "skipping embedding with non-finite components");
                continue;
            }
            match dim {
                Some(expected) if embedding.dim() != expected => {
                    tracing::warn!(
                        label,
                        expected,
                        actual = embedding.dim(),
                        "skipping embedding with mismatched dimension"
                    );
                    continue;
                }
                Some(_) => {}
                None => dim = Some(embedding.dim()),
            }
            entries.push(GalleryEntry { label, embedding });
        }

        Self { entries }
    }

    pub fn entries(&self) -> &[GalleryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Embedding dimensionality shared by every entry, or `None` while
    /// empty.
    pub fn dim(&self) -> Option<usize> {
        self.entries.first().map(|e| e.embedding.dim())
    }
}
