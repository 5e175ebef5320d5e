//! Semantic similarity over sentence embeddings, with a bounded cache

use crate::config::{Config, EmbedderKind};
use crate::error::{MatcherError, Result};
use crate::processing::text_processor::TextProcessor;
use log::{debug, info};
use model2vec_rs::model::StaticModel;
use moka::sync::Cache;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// Text to fixed-dimension vector
pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    fn name(&self) -> &str;
}

/// Pretrained Model2Vec static embeddings
pub struct Model2VecEmbedder {
    model: StaticModel,
    model_name: String,
}

impl Model2VecEmbedder {
    /// Load from a local model directory or a Hugging Face repo id
    pub fn load(model_path: &Path) -> Result<Self> {
        let start_time = Instant::now();
        info!("Loading Model2Vec embedding model from: {}", model_path.display());

        let model = StaticModel::from_pretrained(model_path, None, None, None)
            .map_err(|e| MatcherError::ModelLoading(format!("Failed to load embedding model: {}", e)))?;

        info!("Embedding model loaded in {:.2?}", start_time.elapsed());

        Ok(Self {
            model,
            model_name: model_path.to_string_lossy().to_string(),
        })
    }
}

impl Embedder for Model2VecEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.model.encode_single(text))
    }

    fn name(&self) -> &str {
        &self.model_name
    }
}

/// Deterministic feature-hashing embedder.
///
/// Hashes stop-word-filtered terms into fixed buckets weighted by frequency and
/// L2-normalizes the result. Needs no model files.
pub struct HashingEmbedder {
    dimensions: usize,
    processor: TextProcessor,
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
            processor: TextProcessor::new(),
        }
    }

    /// FNV-1a bucket for a term
    fn bucket(&self, term: &str) -> usize {
        let mut h: u64 = 0xcbf29ce484222325;
        for b in term.as_bytes() {
            h ^= *b as u64;
            h = h.wrapping_mul(0x100000001b3);
        }
        (h % self.dimensions as u64) as usize
    }
}

impl Embedder for HashingEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut tf: HashMap<String, f32> = HashMap::new();
        for term in self.processor.analyze_terms(text) {
            *tf.entry(term).or_default() += 1.0;
        }

        let mut vector = vec![0.0f32; self.dimensions];
        for (term, count) in &tf {
            vector[self.bucket(term)] += count;
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for v in &mut vector {
                *v /= norm;
            }
        }

        Ok(vector)
    }

    fn name(&self) -> &str {
        "hashing"
    }
}

/// Build the embedder selected in the configuration
pub fn build_embedder(config: &Config) -> Result<Box<dyn Embedder>> {
    match config.models.embedder {
        EmbedderKind::Model2Vec => {
            let model_path = config.embedding_model_path();
            Ok(Box::new(Model2VecEmbedder::load(&model_path)?))
        }
        EmbedderKind::Hashing => Ok(Box::new(HashingEmbedder::new(config.models.hashing_dimensions))),
    }
}

#[derive(Debug, Clone)]
pub struct CacheStats {
    pub entries: u64,
    pub capacity: u64,
    pub model_name: String,
}

/// Embedding-based cosine similarity.
///
/// Owns the only state that outlives a single request: the embedding cache,
/// keyed by normalized text. Embedding is a pure function of the text, so two
/// threads racing to fill the same key store identical values.
pub struct SemanticScorer {
    embedder: Box<dyn Embedder>,
    cache: Cache<String, Arc<Vec<f32>>>,
    capacity: u64,
    processor: TextProcessor,
}

impl SemanticScorer {
    pub fn new(embedder: Box<dyn Embedder>, cache_capacity: u64) -> Self {
        Self {
            embedder,
            cache: Cache::new(cache_capacity),
            capacity: cache_capacity,
            processor: TextProcessor::new(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let embedder = build_embedder(config)?;
        Ok(Self::new(embedder, config.processing.embedding_cache_capacity))
    }

    /// Embed normalized text, consulting the cache first
    pub fn embed(&self, text: &str) -> Result<Arc<Vec<f32>>> {
        let key = self.processor.normalize(text);
        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached);
        }

        let embedding = Arc::new(self.embedder.embed(&key)?);
        // Only successful embeddings are cached
        self.cache.insert(key, Arc::clone(&embedding));
        debug!("Embedded {} characters with {}", text.len(), self.embedder.name());
        Ok(embedding)
    }

    /// Cosine similarity of the two embeddings, clamped to `[0, 1]`
    pub fn similarity(&self, text_a: &str, text_b: &str) -> Result<f64> {
        let a = self.embed(text_a)?;
        let b = self.embed(text_b)?;
        let score = cosine_similarity(&a, &b)?;
        Ok((score as f64).clamp(0.0, 1.0))
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.run_pending_tasks();
        CacheStats {
            entries: self.cache.entry_count(),
            capacity: self.capacity,
            model_name: self.embedder.name().to_string(),
        }
    }
}

/// Cosine similarity between two embeddings
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(MatcherError::Embedding(format!(
            "Embedding dimensions don't match: {} vs {}",
            a.len(),
            b.len()
        )));
    }

    if a.is_empty() {
        return Ok(0.0);
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        Ok(0.0)
    } else {
        Ok(dot_product / (norm_a * norm_b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingEmbedder {
        calls: Arc<AtomicUsize>,
    }

    impl Embedder for CountingEmbedder {
        fn embed(&self, text: &str) -> Result<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            HashingEmbedder::new(64).embed(text)
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    struct FailingEmbedder;

    impl Embedder for FailingEmbedder {
        fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(MatcherError::Embedding("model unavailable".to_string()))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    #[test]
    fn test_hashing_embedder_is_unit_length_and_deterministic() {
        let embedder = HashingEmbedder::new(256);
        let a = embedder.embed("rust developer with tokio experience").unwrap();
        let b = embedder.embed("rust developer with tokio experience").unwrap();

        assert_eq!(a.len(), 256);
        assert_eq!(a, b);
        let norm: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_hashing_embedder_empty_text_is_zero_vector() {
        let v = HashingEmbedder::new(32).embed("").unwrap();
        assert!(v.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]).unwrap() - 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).unwrap(), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]).unwrap(), 0.0);
        assert!(cosine_similarity(&[1.0], &[1.0, 0.0]).is_err());
    }

    #[test]
    fn test_cache_avoids_recomputation() {
        let calls = Arc::new(AtomicUsize::new(0));
        let scorer = SemanticScorer::new(Box::new(CountingEmbedder { calls: Arc::clone(&calls) }), 16);

        let job = "Python developer with Docker";
        scorer.similarity(job, "Python engineer").unwrap();
        scorer.similarity(job, "Docker operator").unwrap();
        // Same normalized key as the job text
        scorer.similarity("  PYTHON developer with docker ", "Python engineer").unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(scorer.cache_stats().entries, 3);
    }

    #[test]
    fn test_identical_text_similarity_is_one() {
        let scorer = SemanticScorer::new(Box::new(HashingEmbedder::new(384)), 8);
        let sim = scorer.similarity("backend engineer rust", "backend engineer rust").unwrap();
        assert!((sim - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_embedder_failure_is_not_cached() {
        let scorer = SemanticScorer::new(Box::new(FailingEmbedder), 8);
        assert!(matches!(scorer.similarity("a b", "c d"), Err(MatcherError::Embedding(_))));
        assert_eq!(scorer.cache_stats().entries, 0);
    }
}
