use std::rc::Rc;

use crate::config::CopyRnnConfig;
use crate::data::{ExtendedVocabBatch, SequenceBatch};
use crate::device::Device;
use crate::error::ModelError;
use crate::layers::{tanh, Attention, EmbeddingT, LinearT, LSTM};
use crate::math::Matrix;

use super::encoder::EncoderState;
use super::selective_read::SelectiveRead;

/// Recurrent state threaded by the caller across decode steps.
///
/// Created at decode start and replaced wholesale by every step; search
/// drivers must not introspect or mutate it.
#[derive(Clone)]
pub struct DecoderState {
    pub hidden: Matrix,
    pub cell: Matrix,
    /// Attention output of the previous step, the query for the next
    /// selective read.  Zero at decode start.
    pub prev_context: Matrix,
}

impl DecoderState {
    /// Initial state: recurrent pair taken from the encoder final state,
    /// previous context zeroed.
    pub fn from_encoder(enc: &EncoderState, target_hidden: usize) -> Self {
        Self {
            hidden: enc.final_hidden.clone(),
            cell: enc.final_cell.clone(),
            prev_context: Matrix::zeros(enc.final_hidden.rows, target_hidden),
        }
    }
}

/// One-token-at-a-time decoder fusing generation over the fixed vocabulary
/// with copying from the source sequence.
pub struct CopyRnnDecoder {
    embedding: Rc<EmbeddingT>,
    pub lstm: LSTM,
    pub attn_layer: Attention,
    pub selective_read: SelectiveRead,
    /// Encoder-state projection for the copy score.
    pub copy_proj: LinearT,
    /// Attention-output projection onto the fixed vocabulary.
    pub generate_proj: LinearT,
    vocab_size: usize,
    max_oov_count: usize,
}

impl CopyRnnDecoder {
    pub fn new(embedding: Rc<EmbeddingT>, config: &CopyRnnConfig) -> Self {
        let embed_dim = embedding.embed_dim();
        Self {
            embedding,
            lstm: LSTM::new(embed_dim + config.src_hidden_size, config.target_hidden_size),
            attn_layer: Attention::new(
                config.src_hidden_size,
                config.target_hidden_size,
                config.score_mode,
            ),
            selective_read: SelectiveRead::new(config.src_hidden_size, config.target_hidden_size),
            copy_proj: LinearT::new(config.src_hidden_size, config.target_hidden_size),
            generate_proj: LinearT::new(config.target_hidden_size, config.vocab_size),
            vocab_size: config.vocab_size,
            max_oov_count: config.max_oov_count,
        }
    }

    /// Advance the decoder one step.
    ///
    /// Returns the log-probability distribution over the extended vocabulary
    /// (`batch x (vocab_size + max_oov_count)`), the attention output, and
    /// the state to thread into the next step.
    pub fn decode_step(
        &self,
        prev_tokens: &[usize],
        src: &SequenceBatch,
        ext: &ExtendedVocabBatch,
        enc: &EncoderState,
        state: &DecoderState,
        device: &dyn Device,
    ) -> Result<(Matrix, Matrix, DecoderState), ModelError> {
        let b_size = src.batch_size();
        if prev_tokens.len() != b_size {
            return Err(ModelError::ShapeMismatch {
                expected: format!("{b_size} previous tokens"),
                got: format!("{}", prev_tokens.len()),
            });
        }

        let copy_state =
            self.selective_read
                .read(prev_tokens, src, enc, &state.prev_context, device);

        let embedded = self.embedding.embed(prev_tokens);
        let decoder_input = Matrix::concat_cols(&embedded, &copy_state);
        let (hidden, cell) = self
            .lstm
            .step(&decoder_input, &state.hidden, &state.cell, device);

        let (attn_output, _attn_weights) =
            self.attn_layer
                .forward(&hidden, &enc.outputs, &enc.padding_mask, device);

        let generate_logits = self.generate_proj.forward(&attn_output, device);
        let copy_scores = self.copy_scores(enc, &attn_output, device);
        let log_probs = self.fuse(&generate_logits, &copy_scores, ext)?;

        let new_state = DecoderState {
            hidden,
            cell,
            prev_context: attn_output.clone(),
        };
        Ok((log_probs, attn_output, new_state))
    }

    /// Raw copy score per source position, `batch x max_len`, with padding
    /// positions at `-inf`.
    fn copy_scores(&self, enc: &EncoderState, attn_output: &Matrix, device: &dyn Device) -> Matrix {
        let b_size = enc.outputs.shape[0];
        let max_len = enc.outputs.shape[1];
        let mut projected = self.copy_proj.forward(&enc.outputs.flatten_leading(), device);
        tanh::forward_matrix(&mut projected);

        let mut scores = Matrix::zeros(b_size, max_len);
        for b in 0..b_size {
            let q = attn_output.row(b);
            for j in 0..max_len {
                if enc.padding_mask[b * max_len + j] {
                    scores.set(b, j, f32::NEG_INFINITY);
                    continue;
                }
                let p = projected.row(b * max_len + j);
                let mut dot = 0.0;
                for (pv, qv) in p.iter().zip(q.iter()) {
                    dot += pv * qv;
                }
                scores.set(b, j, dot);
            }
        }
        scores
    }

    /// Additive generate/copy fusion over the extended vocabulary.
    ///
    /// Both branches are exponentiated after shifting by the row maximum over
    /// their union; the shift cancels in the joint normalisation.  Copy
    /// masses landing on the same extended id sum.  OOV slots receive no
    /// generation mass, so a slot with no copy mass ends at probability zero.
    fn fuse(
        &self,
        generate_logits: &Matrix,
        copy_scores: &Matrix,
        ext: &ExtendedVocabBatch,
    ) -> Result<Matrix, ModelError> {
        let b_size = generate_logits.rows;
        let max_len = copy_scores.cols;
        let ext_size = self.vocab_size + self.max_oov_count;
        let mut log_probs = Matrix::zeros(b_size, ext_size);

        for b in 0..b_size {
            let gen = generate_logits.row(b);
            let copy = copy_scores.row(b);
            let shift = gen
                .iter()
                .chain(copy.iter())
                .cloned()
                .filter(|v| v.is_finite())
                .fold(f32::NEG_INFINITY, f32::max);

            let mut mass = vec![0.0f32; ext_size];
            for (v, &logit) in gen.iter().enumerate() {
                mass[v] = (logit - shift).exp();
            }
            for j in 0..max_len {
                let score = copy[j];
                if !score.is_finite() {
                    continue;
                }
                let id = ext.id(b, j);
                if id >= ext_size {
                    return Err(ModelError::OovIdOutOfRange {
                        id,
                        limit: ext_size,
                    });
                }
                mass[id] += (score - shift).exp();
            }

            let total: f32 = mass.iter().sum();
            for (slot, m) in mass.iter().enumerate() {
                log_probs.set(b, slot, (m / total).ln());
            }
        }
        Ok(log_probs)
    }
}
