use rand::Rng;

use crate::device::Device;
use crate::math::Matrix;
use crate::rng::seeded_stream;

/// Dense projection `x * W (+ b)`.
///
/// Weights are initialised from a seeded uniform distribution so runs are
/// reproducible under the `SEED` environment variable.
pub struct LinearT {
    pub w: Matrix,
    pub b: Option<Vec<f32>>,
}

impl LinearT {
    /// Projection without a bias term.
    pub fn new(in_dim: usize, out_dim: usize) -> Self {
        let mut rng = seeded_stream();
        let w = Matrix::from_vec(
            in_dim,
            out_dim,
            (0..in_dim * out_dim)
                .map(|_| (rng.gen::<f32>() - 0.5) * 0.02)
                .collect(),
        );
        Self { w, b: None }
    }

    /// Projection with a zero-initialised bias term.
    pub fn with_bias(in_dim: usize, out_dim: usize) -> Self {
        let mut layer = Self::new(in_dim, out_dim);
        layer.b = Some(vec![0.0; out_dim]);
        layer
    }

    pub fn forward(&self, x: &Matrix, device: &dyn Device) -> Matrix {
        let mut y = device.matmul(x, &self.w);
        if let Some(b) = &self.b {
            for r in 0..y.rows {
                for c in 0..y.cols {
                    y.data[r * y.cols + c] += b[c];
                }
            }
        }
        y
    }
}
