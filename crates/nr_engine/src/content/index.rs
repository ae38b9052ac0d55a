use nr_core::Article;
use rayon::prelude::*;
use tracing::debug;

use super::tfidf::{SparseVector, TfidfVectorizer};

/// TF-IDF space over a corpus snapshot plus its pairwise cosine similarities.
#[derive(Debug, Clone, Default)]
pub struct ContentIndex {
    vectorizer: TfidfVectorizer,
    vectors: Vec<SparseVector>,
    similarity: Vec<Vec<f64>>,
}

impl ContentIndex {
    pub fn build(corpus: &[Article]) -> Self {
        let cleaned: Vec<&str> = corpus.iter().map(|a| a.cleaned_summary.as_str()).collect();
        let (vectorizer, vectors) = TfidfVectorizer::fit_transform(&cleaned);
        let similarity = similarity_matrix(&vectors);

        debug!(
            "Built content index: {} articles, {} terms",
            corpus.len(),
            vectorizer.vocabulary_len()
        );

        Self {
            vectorizer,
            vectors,
            similarity,
        }
    }

    pub fn len(&self) -> usize {
        self.similarity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.similarity.is_empty()
    }

    pub fn vectorizer(&self) -> &TfidfVectorizer {
        &self.vectorizer
    }

    pub fn vector(&self, index: usize) -> Option<&SparseVector> {
        self.vectors.get(index)
    }

    pub fn row(&self, index: usize) -> Option<&[f64]> {
        self.similarity.get(index).map(Vec::as_slice)
    }

    pub fn similarity(&self, i: usize, j: usize) -> Option<f64> {
        self.similarity.get(i).and_then(|row| row.get(j)).copied()
    }

    pub fn matrix(&self) -> &[Vec<f64>] {
        &self.similarity
    }
}

/// Full cosine similarity matrix. Only the upper triangle is computed; the
/// lower one is mirrored so the result is exactly symmetric.
fn similarity_matrix(vectors: &[SparseVector]) -> Vec<Vec<f64>> {
    let n = vectors.len();
    let upper: Vec<Vec<f64>> = (0..n)
        .into_par_iter()
        .map(|i| {
            (i + 1..n)
                .map(|j| vectors[i].dot(&vectors[j]).clamp(-1.0, 1.0))
                .collect()
        })
        .collect();

    let mut matrix = vec![vec![0.0; n]; n];
    for (i, row) in upper.iter().enumerate() {
        matrix[i][i] = 1.0;
        for (offset, &value) in row.iter().enumerate() {
            let j = i + 1 + offset;
            matrix[i][j] = value;
            matrix[j][i] = value;
        }
    }
    matrix
}
