use rand::Rng;

use crate::math::Matrix;
use crate::rng::seeded_stream;

/// Embedding layer: maps token ids into dense `embed_dim` vectors.
///
/// A single instance is shared between the encoder and the decoder; the row
/// for the PAD id is fixed at zero so padded positions carry no signal.
pub struct EmbeddingT {
    pub table: Matrix, // vocab_size x embed_dim
    pad_id: usize,
}

impl EmbeddingT {
    pub fn new(vocab_size: usize, embed_dim: usize, pad_id: usize) -> Self {
        assert!(pad_id < vocab_size, "pad id must be a vocabulary index");
        let mut rng = seeded_stream();
        let mut table = Matrix::from_vec(
            vocab_size,
            embed_dim,
            (0..vocab_size * embed_dim)
                .map(|_| (rng.gen::<f32>() - 0.5) * 0.02)
                .collect(),
        );
        for c in 0..embed_dim {
            table.set(pad_id, c, 0.0);
        }
        Self { table, pad_id }
    }

    /// Look up a batch of token ids, one output row per id.  An id outside
    /// the vocabulary is fatal.
    pub fn embed(&self, token_ids: &[usize]) -> Matrix {
        let dim = self.table.cols;
        let mut out = Matrix::zeros(token_ids.len(), dim);
        for (r, &id) in token_ids.iter().enumerate() {
            assert!(id < self.table.rows, "token id out of range");
            out.data[r * dim..(r + 1) * dim].copy_from_slice(self.table.row(id));
        }
        out
    }

    pub fn vocab_size(&self) -> usize {
        self.table.rows
    }

    pub fn embed_dim(&self) -> usize {
        self.table.cols
    }

    pub fn pad_id(&self) -> usize {
        self.pad_id
    }
}
