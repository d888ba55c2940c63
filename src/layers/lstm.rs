use crate::device::Device;
use crate::math::Matrix;

use super::linear::LinearT;
use super::{sigmoid, tanh};

fn elem_mul(a: &Matrix, b: &Matrix) -> Matrix {
    let mut v = vec![0.0; a.data.len()];
    for i in 0..v.len() {
        v[i] = a.data[i] * b.data[i];
    }
    Matrix::from_vec(a.rows, a.cols, v)
}

/// Single-layer LSTM cell stepped one position at a time over a whole batch.
///
/// Inputs are `batch x input_dim` matrices; the hidden/cell pair is carried
/// by the caller, which lets the encoder honour per-row true lengths and the
/// decoder thread its state across decode steps.
pub struct LSTM {
    pub w_ii: LinearT,
    pub w_if: LinearT,
    pub w_io: LinearT,
    pub w_ig: LinearT,
    pub w_hi: LinearT,
    pub w_hf: LinearT,
    pub w_ho: LinearT,
    pub w_hg: LinearT,
    input_dim: usize,
    hidden_dim: usize,
}

impl LSTM {
    pub fn new(input_dim: usize, hidden_dim: usize) -> Self {
        Self {
            w_ii: LinearT::new(input_dim, hidden_dim),
            w_if: LinearT::new(input_dim, hidden_dim),
            w_io: LinearT::new(input_dim, hidden_dim),
            w_ig: LinearT::new(input_dim, hidden_dim),
            w_hi: LinearT::new(hidden_dim, hidden_dim),
            w_hf: LinearT::new(hidden_dim, hidden_dim),
            w_ho: LinearT::new(hidden_dim, hidden_dim),
            w_hg: LinearT::new(hidden_dim, hidden_dim),
            input_dim,
            hidden_dim,
        }
    }

    /// Advance the cell one position.  Rows of the batch are independent.
    pub fn step(
        &self,
        x_t: &Matrix,
        h_prev: &Matrix,
        c_prev: &Matrix,
        device: &dyn Device,
    ) -> (Matrix, Matrix) {
        assert_eq!(x_t.cols, self.input_dim);
        assert_eq!(h_prev.cols, self.hidden_dim);
        let mut i = self
            .w_ii
            .forward(x_t, device)
            .add(&self.w_hi.forward(h_prev, device));
        sigmoid::forward_matrix(&mut i);
        let mut f = self
            .w_if
            .forward(x_t, device)
            .add(&self.w_hf.forward(h_prev, device));
        sigmoid::forward_matrix(&mut f);
        let mut o = self
            .w_io
            .forward(x_t, device)
            .add(&self.w_ho.forward(h_prev, device));
        sigmoid::forward_matrix(&mut o);
        let mut g = self
            .w_ig
            .forward(x_t, device)
            .add(&self.w_hg.forward(h_prev, device));
        tanh::forward_matrix(&mut g);
        let c = elem_mul(&f, c_prev).add(&elem_mul(&i, &g));
        let mut h = c.clone();
        tanh::forward_matrix(&mut h);
        let h = elem_mul(&o, &h);
        (h, c)
    }

    pub fn hidden_dim(&self) -> usize {
        self.hidden_dim
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::Cpu;

    #[test]
    fn step_rows_are_independent() {
        let lstm = LSTM::new(2, 3);
        let h0 = Matrix::zeros(2, 3);
        let c0 = Matrix::zeros(2, 3);
        let x = Matrix::from_vec(2, 2, vec![1.0, -1.0, 0.5, 0.25]);
        let (h, _) = lstm.step(&x, &h0, &c0, &Cpu);

        // Stepping row 1 alone must give the same result as in the batch.
        let x1 = Matrix::from_vec(1, 2, vec![0.5, 0.25]);
        let (h1, _) = lstm.step(&x1, &Matrix::zeros(1, 3), &Matrix::zeros(1, 3), &Cpu);
        for c in 0..3 {
            assert!((h.get(1, c) - h1.get(0, c)).abs() < 1e-6);
        }
    }
}
