use crate::error::ModelError;

/// Rectangular batch of token-id sequences with per-row true lengths.
///
/// Rows are padded with the PAD id up to `max_len`; the invariant that a
/// position holds PAD exactly when it lies at or beyond the row's true
/// length is checked at construction so downstream masked softmaxes never
/// see an inconsistent mask.
#[derive(Clone, Debug)]
pub struct SequenceBatch {
    tokens: Vec<usize>,
    lens: Vec<usize>,
    batch_size: usize,
    max_len: usize,
    pad_id: usize,
}

impl SequenceBatch {
    /// Build a batch from a flat row-major `batch_size x max_len` id matrix.
    pub fn new(
        tokens: Vec<usize>,
        lens: Vec<usize>,
        max_len: usize,
        pad_id: usize,
    ) -> Result<Self, ModelError> {
        if max_len == 0 || tokens.len() % max_len != 0 {
            return Err(ModelError::ShapeMismatch {
                expected: format!("token count divisible by max_len {max_len}"),
                got: format!("{} tokens", tokens.len()),
            });
        }
        let batch_size = tokens.len() / max_len;
        if lens.len() != batch_size {
            return Err(ModelError::ShapeMismatch {
                expected: format!("{batch_size} lengths"),
                got: format!("{}", lens.len()),
            });
        }
        for &len in &lens {
            if len == 0 || len > max_len {
                return Err(ModelError::LengthOutOfRange { len, max: max_len });
            }
        }
        for b in 0..batch_size {
            for j in 0..max_len {
                let is_pad = tokens[b * max_len + j] == pad_id;
                if is_pad != (j >= lens[b]) {
                    return Err(ModelError::PaddingMaskViolation { row: b, pos: j });
                }
            }
        }
        Ok(Self {
            tokens,
            lens,
            batch_size,
            max_len,
            pad_id,
        })
    }

    /// Pad variable-length rows with the PAD id up to `max_len`.
    pub fn from_rows(
        rows: &[Vec<usize>],
        max_len: usize,
        pad_id: usize,
    ) -> Result<Self, ModelError> {
        let mut tokens = Vec::with_capacity(rows.len() * max_len);
        let mut lens = Vec::with_capacity(rows.len());
        for row in rows {
            if row.is_empty() || row.len() > max_len {
                return Err(ModelError::LengthOutOfRange {
                    len: row.len(),
                    max: max_len,
                });
            }
            tokens.extend_from_slice(row);
            tokens.extend(std::iter::repeat(pad_id).take(max_len - row.len()));
            lens.push(row.len());
        }
        Self::new(tokens, lens, max_len, pad_id)
    }

    pub fn token(&self, b: usize, j: usize) -> usize {
        self.tokens[b * self.max_len + j]
    }

    pub fn len_of(&self, b: usize) -> usize {
        self.lens[b]
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    pub fn pad_id(&self) -> usize {
        self.pad_id
    }

    /// Flat row-major view of the id matrix.
    pub fn tokens(&self) -> &[usize] {
        &self.tokens
    }

    /// Derived boolean padding mask, true where a position holds PAD.
    pub fn padding_mask(&self) -> Vec<bool> {
        self.tokens.iter().map(|&t| t == self.pad_id).collect()
    }
}

/// Per-batch extended-vocabulary view of a source batch.
///
/// `ids` maps every source position to an id in the extended space: a
/// regular vocabulary id, or `vocab_size + local_oov_index` for a token the
/// fixed vocabulary does not contain.
#[derive(Clone, Debug)]
pub struct ExtendedVocabBatch {
    ids: Vec<usize>,
    oov_counts: Vec<usize>,
    max_len: usize,
}

impl ExtendedVocabBatch {
    pub fn new(
        ids: Vec<usize>,
        oov_counts: Vec<usize>,
        src: &SequenceBatch,
        vocab_size: usize,
        max_oov_count: usize,
    ) -> Result<Self, ModelError> {
        if ids.len() != src.batch_size() * src.max_len() {
            return Err(ModelError::ShapeMismatch {
                expected: format!("{} extended ids", src.batch_size() * src.max_len()),
                got: format!("{}", ids.len()),
            });
        }
        if oov_counts.len() != src.batch_size() {
            return Err(ModelError::ShapeMismatch {
                expected: format!("{} oov counts", src.batch_size()),
                got: format!("{}", oov_counts.len()),
            });
        }
        let limit = vocab_size + max_oov_count;
        for &id in &ids {
            if id >= limit {
                return Err(ModelError::OovIdOutOfRange { id, limit });
            }
        }
        for &count in &oov_counts {
            if count > max_oov_count {
                return Err(ModelError::OovCountOutOfRange {
                    count,
                    max: max_oov_count,
                });
            }
        }
        Ok(Self {
            ids,
            oov_counts,
            max_len: src.max_len(),
        })
    }

    pub fn id(&self, b: usize, j: usize) -> usize {
        self.ids[b * self.max_len + j]
    }

    pub fn oov_count(&self, b: usize) -> usize {
        self.oov_counts[b]
    }
}
