use crate::math::Matrix;

/// Apply tanh activation in place on a matrix.
pub fn forward_matrix(m: &mut Matrix) {
    for v in m.data.iter_mut() {
        *v = v.tanh();
    }
}
