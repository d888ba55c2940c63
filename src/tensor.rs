use crate::math::Matrix;

/// N-dimensional tensor backed by a flat `Vec<f32>`.
///
/// The tensor stores its shape explicitly allowing operations on
/// higher-rank data.  The encoder output is the main rank-3 user; most of
/// the numerical code operates on the 2-D [`Matrix`] type, so conversion
/// helpers are provided.
#[derive(Clone, Debug, PartialEq)]
pub struct Tensor {
    /// Tensor elements in row-major order.
    pub data: Vec<f32>,
    /// Sizes for each dimension.
    pub shape: Vec<usize>,
}

impl Tensor {
    /// Create a new tensor from raw parts.  The number of elements in `data`
    /// must match the product of the requested `shape`.
    pub fn new(data: Vec<f32>, shape: Vec<usize>) -> Self {
        assert_eq!(data.len(), shape.iter().product::<usize>());
        Tensor { data, shape }
    }

    /// Create a tensor of zeros with the given shape.
    pub fn zeros(shape: Vec<usize>) -> Self {
        let len: usize = shape.iter().product();
        Tensor {
            data: vec![0.0; len],
            shape,
        }
    }

    /// Compute the flat index for a multi-dimensional coordinate.
    fn offset(&self, idx: &[usize]) -> usize {
        assert_eq!(idx.len(), self.shape.len());
        let mut stride = 1;
        let mut off = 0usize;
        for (i, &dim) in self.shape.iter().rev().enumerate() {
            let id = idx[self.shape.len() - 1 - i];
            assert!(id < dim, "index out of bounds");
            off += id * stride;
            stride *= dim;
        }
        off
    }

    /// Basic immutable indexing.
    pub fn get(&self, idx: &[usize]) -> f32 {
        let off = self.offset(idx);
        self.data[off]
    }

    /// Mutable indexing support.
    pub fn set(&mut self, idx: &[usize], value: f32) {
        let off = self.offset(idx);
        self.data[off] = value;
    }

    /// View one entry of the leading (batch) dimension of a rank-3 tensor as
    /// an owned [`Matrix`].
    pub fn batch_entry(&self, b: usize) -> Matrix {
        assert_eq!(self.shape.len(), 3);
        assert!(b < self.shape[0]);
        let rows = self.shape[1];
        let cols = self.shape[2];
        let start = b * rows * cols;
        Matrix::from_vec(rows, cols, self.data[start..start + rows * cols].to_vec())
    }

    /// Flatten the two leading dimensions of a rank-3 tensor into a matrix of
    /// shape `(d0 * d1) x d2`.  The storage order is unchanged.
    pub fn flatten_leading(&self) -> Matrix {
        assert_eq!(self.shape.len(), 3);
        Matrix::from_vec(
            self.shape[0] * self.shape[1],
            self.shape[2],
            self.data.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_entry_extracts_expected_rows() {
        let t = Tensor::new((0..12).map(|i| i as f32).collect(), vec![2, 3, 2]);
        let m = t.batch_entry(1);
        assert_eq!(m.rows, 3);
        assert_eq!(m.cols, 2);
        assert_eq!(m.row(0), &[6.0, 7.0]);
    }
}
