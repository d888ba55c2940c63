use crate::math::Matrix;
use crate::rng::seeded_stream;
use rand::Rng;

/// Dropout layer that randomly zeros elements during training.
///
/// During the forward pass, each element of the input is kept with
/// probability `1 - p`. When an element is kept its value is scaled by
/// `1/(1 - p)` to preserve the expected activation ("inverted" dropout).
pub struct Dropout {
    rng: rand::rngs::StdRng,
}

impl Dropout {
    pub fn new() -> Self {
        Self {
            rng: seeded_stream(),
        }
    }

    /// Forward pass for dropout.
    ///
    /// * `x` - Input matrix.
    /// * `p` - Dropout probability (fraction of units to drop).
    /// * `train` - Whether the network is in training mode.
    ///
    /// When `train` is `false` the input is returned unchanged.
    pub fn forward(&mut self, x: &Matrix, p: f32, train: bool) -> Matrix {
        if !train || p == 0.0 {
            return x.clone();
        }
        let mut out = Matrix::zeros(x.rows, x.cols);
        let scale = 1.0 / (1.0 - p);
        for i in 0..x.data.len() {
            if self.rng.gen::<f32>() >= p {
                out.data[i] = x.data[i] * scale;
            }
        }
        out
    }
}

impl Default for Dropout {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn training_forward_zeroes_some_units_and_rescales_the_rest() {
        let mut d = Dropout::new();
        let x = Matrix::from_vec(20, 50, vec![1.0; 1000]);
        let out = d.forward(&x, 0.5, true);
        let dropped = out.data.iter().filter(|&&v| v == 0.0).count();
        let kept = out.data.iter().filter(|&&v| v == 2.0).count();
        assert_eq!(dropped + kept, 1000);
        assert!(dropped > 0, "no unit was dropped at p = 0.5");
        assert!(kept > 0, "every unit was dropped at p = 0.5");
    }

    #[test]
    fn inference_forward_is_the_identity() {
        let mut d = Dropout::new();
        let x = Matrix::from_vec(2, 3, vec![1.0, -2.0, 3.0, 0.5, -0.5, 4.0]);
        assert_eq!(d.forward(&x, 0.5, false), x);
        assert_eq!(d.forward(&x, 0.0, true), x);
    }
}
