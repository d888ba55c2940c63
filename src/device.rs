use crate::math::Matrix;

/// Abstraction over a compute device capable of executing matrix operations.
///
/// The device is resolved once at model construction and threaded explicitly
/// into every layer forward, so call sites never re-check backend
/// availability.
pub trait Device {
    /// Multiply two matrices returning the result on the same device.
    fn matmul(&self, a: &Matrix, b: &Matrix) -> Matrix;
}

/// Default CPU implementation of [`Device`].
#[derive(Default, Clone, Copy)]
pub struct Cpu;

impl Device for Cpu {
    fn matmul(&self, a: &Matrix, b: &Matrix) -> Matrix {
        Matrix::matmul(a, b)
    }
}

/// Resolve the best available compute device for this process.
pub fn best_available() -> Box<dyn Device> {
    Box::new(Cpu)
}
