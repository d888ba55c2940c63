use crate::data::SequenceBatch;
use crate::device::Device;
use crate::layers::{tanh, LinearT};
use crate::math::Matrix;

use super::encoder::EncoderState;

/// The "attentive read" half of the copy mechanism.
///
/// Given the token emitted at the previous step, this unit locates every
/// source position holding that token and folds the encoder states at those
/// positions into a single context vector, telling the decoder where it just
/// copied from.
pub struct SelectiveRead {
    /// Projection of encoder states into decoder-hidden space.
    pub input_copy_proj: LinearT,
}

impl SelectiveRead {
    pub fn new(src_hidden: usize, target_hidden: usize) -> Self {
        Self {
            input_copy_proj: LinearT::new(src_hidden, target_hidden),
        }
    }

    /// Compute the copy state, `batch x src_hidden`.
    ///
    /// `prev_context` is the attention output of the previous decode step
    /// (zero at decode start).
    pub fn read(
        &self,
        prev_tokens: &[usize],
        src: &SequenceBatch,
        enc: &EncoderState,
        prev_context: &Matrix,
        device: &dyn Device,
    ) -> Matrix {
        let b_size = src.batch_size();
        let max_len = src.max_len();
        let src_hidden = enc.outputs.shape[2];
        assert_eq!(prev_tokens.len(), b_size);
        assert_eq!(prev_context.rows, b_size);

        // Zero the encoder states at positions whose token does not match
        // the previously emitted one.
        let mut masked = enc.outputs.flatten_leading();
        let mut matches = vec![false; b_size * max_len];
        for b in 0..b_size {
            for j in 0..max_len {
                if src.token(b, j) == prev_tokens[b] {
                    matches[b * max_len + j] = true;
                } else {
                    let row = b * max_len + j;
                    for v in &mut masked.data[row * src_hidden..(row + 1) * src_hidden] {
                        *v = 0.0;
                    }
                }
            }
        }

        let mut aggregate = self.input_copy_proj.forward(&masked, device);
        tanh::forward_matrix(&mut aggregate);

        let mut scores = Matrix::zeros(b_size, max_len);
        for b in 0..b_size {
            let ctx = prev_context.row(b);
            let has_match = matches[b * max_len..(b + 1) * max_len].iter().any(|&m| m);
            for j in 0..max_len {
                // Rows without any match keep their raw scores: masking every
                // position to -inf would turn the softmax into NaN.
                if has_match && !matches[b * max_len + j] {
                    scores.set(b, j, f32::NEG_INFINITY);
                    continue;
                }
                let agg = aggregate.row(b * max_len + j);
                let mut dot = 0.0;
                for (a, c) in agg.iter().zip(ctx.iter()) {
                    dot += a * c;
                }
                scores.set(b, j, dot);
            }
        }

        let weights = scores.softmax();
        let mut copy_state = Matrix::zeros(b_size, src_hidden);
        for b in 0..b_size {
            for j in 0..max_len {
                let w = weights.get(b, j);
                if w == 0.0 {
                    continue;
                }
                for d in 0..src_hidden {
                    copy_state.data[b * src_hidden + d] += w * enc.outputs.get(&[b, j, d]);
                }
            }
        }
        copy_state
    }
}
