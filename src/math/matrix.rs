use std::io::{self, Write};

use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Serialize, Deserialize};

use crate::error::{NetError, Result};

/// Dense row-major matrix. The shape is fixed at construction; values are
/// mutated in place by the elementwise operations below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<Vec<f64>>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix {
            rows,
            cols,
            data: vec![vec![0.0; cols]; rows],
        }
    }

    /// Builds a matrix from row vectors. All rows must have the same length.
    pub fn from_data(data: Vec<Vec<f64>>) -> Result<Matrix> {
        let rows = data.len();
        let cols = data.first().map_or(0, |row| row.len());
        if let Some(bad) = data.iter().find(|row| row.len() != cols) {
            return Err(NetError::shape("from_data", (rows, cols), (1, bad.len())));
        }
        Ok(Matrix { rows, cols, data })
    }

    /// Column vector of shape (values.len(), 1).
    pub fn column(values: &[f64]) -> Matrix {
        Matrix {
            rows: values.len(),
            cols: 1,
            data: values.iter().map(|&v| vec![v]).collect(),
        }
    }

    /// Samples every entry i.i.d. from N(0, sigma²).
    pub fn random_gaussian<R: Rng + ?Sized>(rows: usize, cols: usize, sigma: f64, rng: &mut R) -> Result<Matrix> {
        let normal = Normal::new(0.0, sigma).map_err(|_| NetError::InvalidSigma { sigma })?;
        let mut res = Matrix::zeros(rows, cols);
        for row in res.data.iter_mut() {
            for x in row.iter_mut() {
                *x = normal.sample(rng);
            }
        }
        Ok(res)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn same_shape(&self, other: &Matrix) -> bool {
        self.shape() == other.shape()
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row][col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[row][col] = value;
    }

    /// Iterates every entry in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.data.iter().flat_map(|row| row.iter().copied())
    }

    pub fn transpose(&self) -> Matrix {
        let mut res = Matrix::zeros(self.cols, self.rows);

        for i in 0..res.rows {
            for j in 0..res.cols {
                res.data[i][j] = self.data[j][i];
            }
        }

        res
    }

    /// Replaces every entry `x` with `f(x)`.
    pub fn map<F>(&mut self, f: F)
    where
        F: Fn(f64) -> f64,
    {
        for row in self.data.iter_mut() {
            for x in row.iter_mut() {
                *x = f(*x);
            }
        }
    }

    /// Writes `f(src)` into `self` entry by entry; shapes must agree.
    pub fn map_from<F>(&mut self, src: &Matrix, f: F) -> Result<()>
    where
        F: Fn(f64) -> f64,
    {
        self.check_same("map_from", src)?;
        for (dst_row, src_row) in self.data.iter_mut().zip(src.data.iter()) {
            for (d, s) in dst_row.iter_mut().zip(src_row.iter()) {
                *d = f(*s);
            }
        }
        Ok(())
    }

    /// `self += other`.
    pub fn add_assign(&mut self, other: &Matrix) -> Result<()> {
        self.zip_with("add", other, |a, b| a + b)
    }

    /// `self -= other`.
    pub fn sub_assign(&mut self, other: &Matrix) -> Result<()> {
        self.zip_with("sub", other, |a, b| a - b)
    }

    /// Hadamard product, `self ⊙= other`.
    pub fn mul_elementwise(&mut self, other: &Matrix) -> Result<()> {
        self.zip_with("mul_elementwise", other, |a, b| a * b)
    }

    /// `self = self_factor · self + other_factor · other`.
    pub fn scale_add(&mut self, self_factor: f64, other: &Matrix, other_factor: f64) -> Result<()> {
        self.zip_with("scale_add", other, |a, b| self_factor * a + other_factor * b)
    }

    pub fn scale(&mut self, factor: f64) {
        self.map(|x| x * factor);
    }

    pub fn set_zero(&mut self) {
        self.map(|_| 0.0);
    }

    /// Overwrites `self` with the values of `src` without reallocating.
    pub fn copy_from(&mut self, src: &Matrix) -> Result<()> {
        self.zip_with("copy_from", src, |_, b| b)
    }

    /// `C = op(A) · op(B)` where `op` optionally transposes its operand.
    pub fn matmul(transpose_a: bool, transpose_b: bool, a: &Matrix, b: &Matrix) -> Result<Matrix> {
        let rows = if transpose_a { a.cols } else { a.rows };
        let cols = if transpose_b { b.rows } else { b.cols };
        let mut res = Matrix::zeros(rows, cols);
        Matrix::matmul_into(transpose_a, transpose_b, a, b, &mut res)?;
        Ok(res)
    }

    /// Same as [`Matrix::matmul`] but writes into an existing buffer whose
    /// shape must already match the product.
    pub fn matmul_into(
        transpose_a: bool,
        transpose_b: bool,
        a: &Matrix,
        b: &Matrix,
        dest: &mut Matrix,
    ) -> Result<()> {
        let (a_rows, a_inner) = if transpose_a { (a.cols, a.rows) } else { (a.rows, a.cols) };
        let (b_inner, b_cols) = if transpose_b { (b.cols, b.rows) } else { (b.rows, b.cols) };

        if a_inner != b_inner {
            return Err(NetError::shape("matmul", (a_rows, a_inner), (b_inner, b_cols)));
        }
        if dest.shape() != (a_rows, b_cols) {
            return Err(NetError::shape("matmul_into", dest.shape(), (a_rows, b_cols)));
        }

        let at = |i: usize, k: usize| if transpose_a { a.data[k][i] } else { a.data[i][k] };
        let bt = |k: usize, j: usize| if transpose_b { b.data[j][k] } else { b.data[k][j] };

        for i in 0..a_rows {
            for j in 0..b_cols {
                let mut sum = 0.0;

                for k in 0..a_inner {
                    sum += at(i, k) * bt(k, j);
                }

                dest.data[i][j] = sum;
            }
        }

        Ok(())
    }

    /// Row-major index of the largest entry; ties resolve to the lowest
    /// index. Returns `None` for an empty matrix.
    pub fn argmax(&self) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, x) in self.iter().enumerate() {
            match best {
                Some((_, max)) if x <= max => {}
                _ => best = Some((i, x)),
            }
        }
        best.map(|(i, _)| i)
    }

    /// One line per row, entries separated by a single space.
    pub fn write_rows<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for row in &self.data {
            let line: Vec<String> = row.iter().map(|x| x.to_string()).collect();
            writeln!(out, "{}", line.join(" "))?;
        }
        Ok(())
    }

    fn check_same(&self, op: &'static str, other: &Matrix) -> Result<()> {
        if !self.same_shape(other) {
            return Err(NetError::shape(op, self.shape(), other.shape()));
        }
        Ok(())
    }

    fn zip_with<F>(&mut self, op: &'static str, other: &Matrix, f: F) -> Result<()>
    where
        F: Fn(f64, f64) -> f64,
    {
        self.check_same(op, other)?;
        for (row, other_row) in self.data.iter_mut().zip(other.data.iter()) {
            for (x, y) in row.iter_mut().zip(other_row.iter()) {
                *x = f(*x, *y);
            }
        }
        Ok(())
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix { rows: 0, cols: 0, data: vec![] }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn m(data: Vec<Vec<f64>>) -> Matrix {
        Matrix::from_data(data).unwrap()
    }

    #[test]
    fn matmul_respects_transpose_flags() {
        let a = m(vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]); // 3x2
        let b = m(vec![vec![1.0, 0.0, 2.0], vec![0.0, 1.0, 1.0]]); // 2x3

        let ab = Matrix::matmul(false, false, &a, &b).unwrap();
        assert_eq!(ab.shape(), (3, 3));
        assert_eq!(ab.get(2, 2), 16.0);

        // aᵗ · a is 2x2
        let ata = Matrix::matmul(true, false, &a, &a).unwrap();
        assert_eq!(ata, m(vec![vec![35.0, 44.0], vec![44.0, 56.0]]));

        // a · bᵗ fails: inner dimensions 2 vs 3
        assert!(matches!(
            Matrix::matmul(false, true, &a, &b),
            Err(NetError::ShapeMismatch { .. })
        ));

        let abt = Matrix::matmul(true, true, &a, &b).unwrap();
        assert_eq!(abt, Matrix::matmul(false, false, &a.transpose(), &b.transpose()).unwrap());
    }

    #[test]
    fn matmul_into_checks_destination_shape() {
        let a = Matrix::column(&[1.0, 2.0]);
        let mut dest = Matrix::zeros(2, 1);
        let err = Matrix::matmul_into(false, true, &a, &a, &mut dest);
        assert!(matches!(err, Err(NetError::ShapeMismatch { op: "matmul_into", .. })));

        let mut outer = Matrix::zeros(2, 2);
        Matrix::matmul_into(false, true, &a, &a, &mut outer).unwrap();
        assert_eq!(outer, m(vec![vec![1.0, 2.0], vec![2.0, 4.0]]));
    }

    #[test]
    fn elementwise_ops_mutate_in_place_and_check_shapes() {
        let mut a = m(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        let b = m(vec![vec![1.0, 1.0], vec![2.0, 2.0]]);

        a.add_assign(&b).unwrap();
        assert_eq!(a, m(vec![vec![2.0, 3.0], vec![5.0, 6.0]]));
        a.sub_assign(&b).unwrap();
        a.mul_elementwise(&b).unwrap();
        assert_eq!(a, m(vec![vec![1.0, 2.0], vec![6.0, 8.0]]));
        a.scale(0.5);
        assert_eq!(a.get(1, 1), 4.0);

        let col = Matrix::column(&[1.0, 2.0]);
        assert!(a.add_assign(&col).is_err());
        assert!(a.mul_elementwise(&col).is_err());
        // failed op leaves values untouched
        assert_eq!(a.get(1, 1), 4.0);
    }

    #[test]
    fn map_from_requires_same_shape() {
        let src = Matrix::column(&[-1.0, 2.0]);
        let mut dest = Matrix::zeros(2, 1);
        dest.map_from(&src, |x| x * x).unwrap();
        assert_eq!(dest, Matrix::column(&[1.0, 4.0]));

        let mut wrong = Matrix::zeros(1, 2);
        assert!(wrong.map_from(&src, |x| x).is_err());
    }

    #[test]
    fn copy_is_independent() {
        let a = Matrix::column(&[1.0, 2.0]);
        let mut b = a.clone();
        b.set(0, 0, 9.0);
        assert_eq!(a.get(0, 0), 1.0);

        let mut c = Matrix::zeros(2, 1);
        c.copy_from(&b).unwrap();
        assert_eq!(c, b);
    }

    #[test]
    fn from_data_rejects_ragged_rows() {
        assert!(Matrix::from_data(vec![vec![1.0, 2.0], vec![3.0]]).is_err());
    }

    #[test]
    fn argmax_ties_pick_lowest_index() {
        assert_eq!(Matrix::column(&[0.2, 0.7, 0.7, 0.1]).argmax(), Some(1));
        assert_eq!(Matrix::default().argmax(), None);
    }

    #[test]
    fn gaussian_is_reproducible_from_seed() {
        let a = Matrix::random_gaussian(3, 4, 1.0, &mut ChaCha8Rng::seed_from_u64(7)).unwrap();
        let b = Matrix::random_gaussian(3, 4, 1.0, &mut ChaCha8Rng::seed_from_u64(7)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.shape(), (3, 4));
        assert!(a.iter().any(|x| x != 0.0));
    }

    #[test]
    fn gaussian_rejects_bad_sigma() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for sigma in [-1.0, f64::NAN] {
            let err = Matrix::random_gaussian(2, 2, sigma, &mut rng);
            assert!(matches!(err, Err(NetError::InvalidSigma { .. })), "sigma {sigma}");
        }
    }

    #[test]
    fn write_rows_is_space_separated() {
        let a = m(vec![vec![1.0, -0.5], vec![2.25, 3.0]]);
        let mut out = Vec::new();
        a.write_rows(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "1 -0.5\n2.25 3\n");
    }
}
