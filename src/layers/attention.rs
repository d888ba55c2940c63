use crate::config::ScoreMode;
use crate::device::Device;
use crate::math::Matrix;
use crate::tensor::Tensor;

use super::linear::LinearT;
use super::tanh;

/// Masked attention between a batch of query vectors and per-position key
/// vectors.
///
/// Scores use the bilinear "general" form: the query is projected into key
/// space and matched against every key by dot product.  Positions flagged by
/// the key padding mask are forced to `-inf` before the softmax, so they
/// receive exactly zero weight.
pub struct Attention {
    /// Query projection into key space, `output_dim x input_dim`.
    pub attn: LinearT,
    /// Affine output map over `[context, query]`.
    pub output_proj: LinearT,
    mode: ScoreMode,
    input_dim: usize,
}

impl Attention {
    /// `input_dim` is the key/value (encoder) dimension, `output_dim` the
    /// query (decoder) dimension.
    pub fn new(input_dim: usize, output_dim: usize, mode: ScoreMode) -> Self {
        Self {
            attn: LinearT::new(output_dim, input_dim),
            output_proj: LinearT::with_bias(input_dim + output_dim, output_dim),
            mode,
            input_dim,
        }
    }

    /// Attention weights, one `batch x key_len` distribution row per query.
    ///
    /// Every row must retain at least one unmasked key; batches are
    /// validated upstream so an all-padding row cannot reach this point.
    pub fn score(
        &self,
        query: &Matrix,
        keys: &Tensor,
        key_padding_mask: &[bool],
        device: &dyn Device,
    ) -> Matrix {
        let batch = keys.shape[0];
        let key_len = keys.shape[1];
        assert_eq!(query.rows, batch);
        assert_eq!(keys.shape[2], self.input_dim);
        assert_eq!(key_padding_mask.len(), batch * key_len);

        let projected = match self.mode {
            ScoreMode::General => self.attn.forward(query, device),
        };
        let mut scores = Matrix::zeros(batch, key_len);
        for b in 0..batch {
            let q = projected.row(b);
            debug_assert!(
                key_padding_mask[b * key_len..(b + 1) * key_len]
                    .iter()
                    .any(|&m| !m),
                "attention row with every key masked"
            );
            for j in 0..key_len {
                if key_padding_mask[b * key_len + j] {
                    scores.set(b, j, f32::NEG_INFINITY);
                    continue;
                }
                let mut dot = 0.0;
                for d in 0..self.input_dim {
                    dot += q[d] * keys.get(&[b, j, d]);
                }
                scores.set(b, j, dot);
            }
        }
        scores.softmax()
    }

    /// Full attention read: returns the tanh-squashed output vector and the
    /// attention weights it was computed from.
    pub fn forward(
        &self,
        query: &Matrix,
        keys: &Tensor,
        key_padding_mask: &[bool],
        device: &dyn Device,
    ) -> (Matrix, Matrix) {
        let weights = self.score(query, keys, key_padding_mask, device);
        let batch = keys.shape[0];
        let key_len = keys.shape[1];
        let mut context = Matrix::zeros(batch, self.input_dim);
        for b in 0..batch {
            for j in 0..key_len {
                let w = weights.get(b, j);
                if w == 0.0 {
                    continue;
                }
                for d in 0..self.input_dim {
                    context.data[b * self.input_dim + d] += w * keys.get(&[b, j, d]);
                }
            }
        }
        let mut out = self
            .output_proj
            .forward(&Matrix::concat_cols(&context, query), device);
        tanh::forward_matrix(&mut out);
        (out, weights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::Cpu;

    #[test]
    fn padding_positions_get_zero_weight() {
        let mut attn = Attention::new(2, 2, ScoreMode::General);
        attn.attn.w = Matrix::from_vec(2, 2, vec![1.0, 0.0, 0.0, 1.0]);
        let keys = Tensor::new(vec![1.0, 0.0, 0.0, 1.0, 9.0, 9.0], vec![1, 3, 2]);
        let mask = vec![false, false, true];
        let query = Matrix::from_vec(1, 2, vec![1.0, 0.5]);
        let weights = attn.score(&query, &keys, &mask, &Cpu);
        assert_eq!(weights.get(0, 2), 0.0);
        let sum: f32 = weights.row(0).iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
    }
}
