//! Small sparse-matrix helpers shared by the basis, regularization, and
//! formulation code: block-diagonal replication and sparse x dense-vector
//! products over `sprs` CSR matrices.
use ndarray::{Array1, Array2, Axis};
use sprs::{CsMat, TriMat};

/// Block-diagonal replication: `copies` copies of `m` along the diagonal.
///
/// Used to replicate a per-epoch basis or roughening matrix across all
/// epochs of a stacked spatio-temporal parameter vector.
pub fn block_diagonal(m: &CsMat<f64>, copies: usize) -> CsMat<f64> {
    let (rows, cols) = (m.rows(), m.cols());
    let mut tri = TriMat::with_capacity((rows * copies, cols * copies), m.nnz() * copies);
    for copy in 0..copies {
        for (&value, (row, col)) in m.iter() {
            tri.add_triplet(copy * rows + row, copy * cols + col, value);
        }
    }
    tri.to_csr()
}

/// Sparse matrix x dense vector product.
pub fn mul_vec(m: &CsMat<f64>, v: &Array1<f64>) -> Array1<f64> {
    let v2 = v.view().insert_axis(Axis(1));
    let product: Array2<f64> = m * &v2;
    product.column(0).to_owned()
}
