use std::rc::Rc;

use crate::data::SequenceBatch;
use crate::device::Device;
use crate::layers::{Dropout, EmbeddingT, LSTM};
use crate::math::Matrix;
use crate::tensor::Tensor;

/// Immutable product of one encoder pass, shared read-only by every decode
/// step that follows.
pub struct EncoderState {
    /// Per-position hidden vectors, `batch x max_len x hidden`.  Positions at
    /// or beyond a row's true length are filled with the PAD id as
    /// placeholder value.
    pub outputs: Tensor,
    /// Flat `batch x max_len` mask, true where the source token is PAD.
    pub padding_mask: Vec<bool>,
    /// Hidden state at the last true position of each row, `batch x hidden`.
    pub final_hidden: Matrix,
    /// Cell state at the last true position of each row, `batch x hidden`.
    pub final_cell: Matrix,
}

/// Single-layer forward LSTM over padded source batches.
///
/// Rows are stepped in lockstep but each row's true length decides which
/// states are emitted, so padding never leaks into the states of true
/// positions and row order is structurally irrelevant: permuting the input
/// rows permutes the output rows identically.
pub struct CopyRnnEncoder {
    embedding: Rc<EmbeddingT>,
    pub lstm: LSTM,
    dropout: Dropout,
    dropout_p: f32,
    hidden_size: usize,
    pad_id: usize,
}

impl CopyRnnEncoder {
    pub fn new(embedding: Rc<EmbeddingT>, hidden_size: usize, dropout_p: f32, pad_id: usize) -> Self {
        let embed_dim = embedding.embed_dim();
        Self {
            embedding,
            lstm: LSTM::new(embed_dim, hidden_size),
            dropout: Dropout::new(),
            dropout_p,
            hidden_size,
            pad_id,
        }
    }

    /// Inference-mode encoding.
    pub fn encode(&self, batch: &SequenceBatch, device: &dyn Device) -> EncoderState {
        let embedded = self.embedding.embed(batch.tokens());
        self.run(batch, &embedded, device)
    }

    /// Training-mode encoding: applies dropout to the embedded tokens.
    pub fn encode_train(&mut self, batch: &SequenceBatch, device: &dyn Device) -> EncoderState {
        let embedded = self.embedding.embed(batch.tokens());
        let embedded = self.dropout.forward(&embedded, self.dropout_p, true);
        self.run(batch, &embedded, device)
    }

    fn run(&self, batch: &SequenceBatch, embedded: &Matrix, device: &dyn Device) -> EncoderState {
        let b_size = batch.batch_size();
        let max_len = batch.max_len();
        let hidden = self.hidden_size;
        let embed_dim = embedded.cols;
        let pad_fill = self.pad_id as f32;

        let mut outputs = Tensor::zeros(vec![b_size, max_len, hidden]);
        let mut final_hidden = Matrix::zeros(b_size, hidden);
        let mut final_cell = Matrix::zeros(b_size, hidden);
        let mut h = Matrix::zeros(b_size, hidden);
        let mut c = Matrix::zeros(b_size, hidden);

        for t in 0..max_len {
            // Gather the embedded token at position t for every row.
            let mut x_t = Matrix::zeros(b_size, embed_dim);
            for b in 0..b_size {
                x_t.data[b * embed_dim..(b + 1) * embed_dim]
                    .copy_from_slice(embedded.row(b * max_len + t));
            }
            let (h_next, c_next) = self.lstm.step(&x_t, &h, &c, device);
            h = h_next;
            c = c_next;

            for b in 0..b_size {
                let len = batch.len_of(b);
                if t < len {
                    for d in 0..hidden {
                        outputs.set(&[b, t, d], h.get(b, d));
                    }
                    if t + 1 == len {
                        for d in 0..hidden {
                            final_hidden.set(b, d, h.get(b, d));
                            final_cell.set(b, d, c.get(b, d));
                        }
                    }
                } else {
                    // Re-expand to the uniform length with the pad
                    // placeholder; the state h keeps stepping for this row
                    // but its values past the true length are never emitted.
                    for d in 0..hidden {
                        outputs.set(&[b, t, d], pad_fill);
                    }
                }
            }
        }

        EncoderState {
            outputs,
            padding_mask: batch.padding_mask(),
            final_hidden,
            final_cell,
        }
    }
}
