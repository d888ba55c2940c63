#[derive(Clone, Debug, PartialEq)]
pub struct Matrix {
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<f32>,
}

impl Matrix {
    pub fn zeros(r: usize, c: usize) -> Self {
        Matrix {
            rows: r,
            cols: c,
            data: vec![0.0; r * c],
        }
    }

    pub fn from_vec(r: usize, c: usize, v: Vec<f32>) -> Self {
        assert_eq!(v.len(), r * c);
        Matrix {
            rows: r,
            cols: c,
            data: v,
        }
    }

    pub fn get(&self, r: usize, c: usize) -> f32 {
        self.data[r * self.cols + c]
    }

    pub fn set(&mut self, r: usize, c: usize, v: f32) {
        self.data[r * self.cols + c] = v;
    }

    /// Borrow one row as a slice.
    pub fn row(&self, r: usize) -> &[f32] {
        &self.data[r * self.cols..(r + 1) * self.cols]
    }

    pub fn matmul(a: &Matrix, b: &Matrix) -> Matrix {
        assert_eq!(a.cols, b.rows);
        let mut out = vec![0.0; a.rows * b.cols];
        for i in 0..a.rows {
            let a_row = &a.data[i * a.cols..(i + 1) * a.cols];
            for k in 0..a.cols {
                let a_val = a_row[k];
                let b_row = &b.data[k * b.cols..(k + 1) * b.cols];
                for j in 0..b.cols {
                    out[i * b.cols + j] += a_val * b_row[j];
                }
            }
        }
        Matrix::from_vec(a.rows, b.cols, out)
    }

    pub fn add(&self, other: &Matrix) -> Matrix {
        assert_eq!(self.rows, other.rows);
        assert_eq!(self.cols, other.cols);
        let mut v = vec![0.0; self.data.len()];
        for i in 0..v.len() {
            v[i] = self.data[i] + other.data[i];
        }
        Matrix::from_vec(self.rows, self.cols, v)
    }

    /// Concatenate two matrices with the same row count along the column
    /// dimension.
    pub fn concat_cols(a: &Matrix, b: &Matrix) -> Matrix {
        assert_eq!(a.rows, b.rows);
        let cols = a.cols + b.cols;
        let mut v = vec![0.0; a.rows * cols];
        for r in 0..a.rows {
            v[r * cols..r * cols + a.cols].copy_from_slice(a.row(r));
            v[r * cols + a.cols..(r + 1) * cols].copy_from_slice(b.row(r));
        }
        Matrix::from_vec(a.rows, cols, v)
    }

    /// Row-wise softmax, stabilised against overflow by shifting each row by
    /// its maximum.  Entries of `-inf` get exactly zero probability; callers
    /// must guarantee at least one finite entry per row.
    pub fn softmax(&self) -> Matrix {
        let mut v = vec![0.0; self.data.len()];
        for r in 0..self.rows {
            let row_start = r * self.cols;
            let row_slice = &self.data[row_start..row_start + self.cols];
            let max = row_slice.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
            let mut sum = 0.0;
            for c in 0..self.cols {
                let e = (self.get(r, c) - max).exp();
                v[row_start + c] = e;
                sum += e;
            }
            for c in 0..self.cols {
                v[row_start + c] /= sum;
            }
        }
        Matrix::from_vec(self.rows, self.cols, v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn softmax_rows_sum_to_one() {
        let m = Matrix::from_vec(2, 3, vec![1.0, 2.0, 3.0, -1.0, 0.0, 1.0]);
        let sm = m.softmax();
        for r in 0..sm.rows {
            let sum: f32 = sm.row(r).iter().sum();
            assert!((sum - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn softmax_neg_infinity_gets_zero_weight() {
        let m = Matrix::from_vec(1, 3, vec![0.5, f32::NEG_INFINITY, 0.5]);
        let sm = m.softmax();
        assert_eq!(sm.get(0, 1), 0.0);
        assert!((sm.get(0, 0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn concat_cols_places_columns_side_by_side() {
        let a = Matrix::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]);
        let b = Matrix::from_vec(2, 1, vec![5.0, 6.0]);
        let c = Matrix::concat_cols(&a, &b);
        assert_eq!(c.row(0), &[1.0, 2.0, 5.0]);
        assert_eq!(c.row(1), &[3.0, 4.0, 6.0]);
    }
}
