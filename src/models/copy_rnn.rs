use std::rc::Rc;

use crate::config::CopyRnnConfig;
use crate::data::{ExtendedVocabBatch, SequenceBatch};
use crate::device::{self, Device};
use crate::error::ModelError;
use crate::layers::EmbeddingT;
use crate::math::Matrix;

use super::decoder::{CopyRnnDecoder, DecoderState};
use super::encoder::{CopyRnnEncoder, EncoderState};

/// Keyphrase model facade: one shared embedding table, an encoder run once
/// per source batch, and a decoder stepped under caller control.
///
/// Decoding follows an explicit two-phase contract: [`CopyRnn::start_sequence`]
/// encodes the source and builds the initial decoder state, then every
/// [`CopyRnn::continue_sequence`] call advances one output token, threading
/// the returned state into the next call.  The encoder state is never
/// recomputed between steps.
pub struct CopyRnn {
    pub config: CopyRnnConfig,
    pub embedding: Rc<EmbeddingT>,
    pub encoder: CopyRnnEncoder,
    pub decoder: CopyRnnDecoder,
    device: Box<dyn Device>,
}

impl CopyRnn {
    /// Build the model, resolving the compute device once.
    pub fn new(config: CopyRnnConfig) -> Result<Self, ModelError> {
        config.validate()?;
        let embedding = Rc::new(EmbeddingT::new(
            config.vocab_size,
            config.embed_size,
            config.pad_id,
        ));
        let encoder = CopyRnnEncoder::new(
            Rc::clone(&embedding),
            config.src_hidden_size,
            config.dropout,
            config.pad_id,
        );
        let decoder = CopyRnnDecoder::new(Rc::clone(&embedding), &config);
        let device = device::best_available();
        log::debug!(
            "copy-rnn constructed: vocab={} embed={} src_hidden={} target_hidden={} max_oov={}",
            config.vocab_size,
            config.embed_size,
            config.src_hidden_size,
            config.target_hidden_size,
            config.max_oov_count
        );
        Ok(Self {
            config,
            embedding,
            encoder,
            decoder,
            device,
        })
    }

    fn check_src(&self, src: &SequenceBatch) -> Result<(), ModelError> {
        if src.max_len() != self.config.max_src_len {
            return Err(ModelError::ShapeMismatch {
                expected: format!("source padded to {}", self.config.max_src_len),
                got: format!("{}", src.max_len()),
            });
        }
        if src.pad_id() != self.config.pad_id {
            return Err(ModelError::InvalidConfig(format!(
                "batch pad id {} does not match configured pad id {}",
                src.pad_id(),
                self.config.pad_id
            )));
        }
        Ok(())
    }

    /// Encode a source batch and derive the initial decoder state from the
    /// encoder final state.
    pub fn start_sequence(
        &self,
        src: &SequenceBatch,
    ) -> Result<(EncoderState, DecoderState), ModelError> {
        self.check_src(src)?;
        log::debug!(
            "start_sequence: batch={} max_len={}",
            src.batch_size(),
            src.max_len()
        );
        let enc = self.encoder.encode(src, self.device.as_ref());
        let state = DecoderState::from_encoder(&enc, self.config.target_hidden_size);
        Ok((enc, state))
    }

    /// Training-mode variant of [`CopyRnn::start_sequence`]: the encoder
    /// applies dropout to the embedded source tokens.
    pub fn start_sequence_train(
        &mut self,
        src: &SequenceBatch,
    ) -> Result<(EncoderState, DecoderState), ModelError> {
        self.check_src(src)?;
        let enc = self.encoder.encode_train(src, self.device.as_ref());
        let state = DecoderState::from_encoder(&enc, self.config.target_hidden_size);
        Ok((enc, state))
    }

    /// Advance decoding one step, reusing the supplied encoder state
    /// unchanged.
    ///
    /// Returns the log-probability distribution over
    /// `vocab_size + max_oov_count` classes, the attention output, and the
    /// decoder state for the next call.
    pub fn continue_sequence(
        &self,
        prev_tokens: &[usize],
        src: &SequenceBatch,
        ext: &ExtendedVocabBatch,
        enc: &EncoderState,
        state: &DecoderState,
    ) -> Result<(Matrix, Matrix, DecoderState), ModelError> {
        self.check_src(src)?;
        self.decoder
            .decode_step(prev_tokens, src, ext, enc, state, self.device.as_ref())
    }

    /// Teacher-forced decoding over a gold prefix matrix.
    ///
    /// `prev_output_tokens` is a flat row-major `batch x steps` matrix; step
    /// `t` feeds its column `t` as the previous output.  Returns one
    /// log-probability matrix per step.
    pub fn decode_sequence(
        &self,
        src: &SequenceBatch,
        ext: &ExtendedVocabBatch,
        prev_output_tokens: &[usize],
        steps: usize,
    ) -> Result<Vec<Matrix>, ModelError> {
        let b_size = src.batch_size();
        if steps == 0 || prev_output_tokens.len() != b_size * steps {
            return Err(ModelError::ShapeMismatch {
                expected: format!("{} previous output tokens", b_size * steps),
                got: format!("{}", prev_output_tokens.len()),
            });
        }
        let (enc, mut state) = self.start_sequence(src)?;
        let mut all_log_probs = Vec::with_capacity(steps);
        for t in 0..steps {
            let prev: Vec<usize> = (0..b_size)
                .map(|b| prev_output_tokens[b * steps + t])
                .collect();
            let (log_probs, _attn_output, next) =
                self.decoder
                    .decode_step(&prev, src, ext, &enc, &state, self.device.as_ref())?;
            state = next;
            all_log_probs.push(log_probs);
        }
        Ok(all_log_probs)
    }

    /// The compute device resolved at construction.
    pub fn device(&self) -> &dyn Device {
        self.device.as_ref()
    }
}
