//! Compressed sparse row storage.
//!
//! `CsrMatrix<T>` is the build-time representation every hierarchy level starts
//! from: coarsening strategies read it, Galerkin products are formed with it, and
//! backends copy it into their own resident form.
//!
//! # Layout
//!
//! For an `m x n` matrix with `nnz` stored entries:
//! - `row_ptr` has length `m + 1`, `row_ptr[0] == 0`, `row_ptr[m] == nnz`
//! - `col_idx` and `values` have length `nnz`
//! - row `i` occupies `row_ptr[i]..row_ptr[i + 1]`

use crate::error::AmgError;
use faer::Mat;
use num_traits::{Float, PrimInt, Signed};

/// A read-only sparse matrix supporting y = A * x.
pub trait SparseMatrix<T> {
    /// Number of rows.
    fn nrows(&self) -> usize;
    /// Number of columns.
    fn ncols(&self) -> usize;
    /// Number of stored entries.
    fn nnz(&self) -> usize;
    /// Compute y = A * x.  `x.len() == ncols()`, `y.len() == nrows()`.
    fn spmv(&self, x: &[T], y: &mut [T]);
}

#[derive(Debug, Clone, PartialEq)]
pub struct CsrMatrix<T> {
    nrows: usize,
    ncols: usize,
    row_ptr: Vec<usize>,
    col_idx: Vec<usize>,
    values: Vec<T>,
}

impl<T: Float> CsrMatrix<T> {
    /// Build a CSR from raw row-ptr, col-idx, and values, validating the structure.
    pub fn from_csr(
        nrows: usize,
        ncols: usize,
        row_ptr: Vec<usize>,
        col_idx: Vec<usize>,
        values: Vec<T>,
    ) -> Result<Self, AmgError> {
        if row_ptr.len() != nrows + 1 {
            return Err(AmgError::InvalidInput(format!(
                "row pointer has length {} for {} rows",
                row_ptr.len(),
                nrows
            )));
        }
        if row_ptr[0] != 0 {
            return Err(AmgError::InvalidInput("row pointer must start at zero".into()));
        }
        if let Some(i) = row_ptr.windows(2).position(|w| w[0] > w[1]) {
            return Err(AmgError::InvalidInput(format!("row pointer decreases at row {i}")));
        }
        let nnz = row_ptr[nrows];
        if col_idx.len() != nnz || values.len() != nnz {
            return Err(AmgError::InvalidInput(format!(
                "expected {} entries, got {} column indices and {} values",
                nnz,
                col_idx.len(),
                values.len()
            )));
        }
        if let Some(&c) = col_idx.iter().find(|&&c| c >= ncols) {
            return Err(AmgError::InvalidInput(format!(
                "column index {c} out of bounds for {ncols} columns"
            )));
        }
        Ok(Self { nrows, ncols, row_ptr, col_idx, values })
    }

    /// Assemble from arrays already known to form a valid CSR structure.
    pub(crate) fn from_parts_unchecked(
        nrows: usize,
        ncols: usize,
        row_ptr: Vec<usize>,
        col_idx: Vec<usize>,
        values: Vec<T>,
    ) -> Self {
        debug_assert_eq!(row_ptr.len(), nrows + 1);
        debug_assert_eq!(col_idx.len(), values.len());
        debug_assert!(col_idx.iter().all(|&c| c < ncols));
        Self { nrows, ncols, row_ptr, col_idx, values }
    }

    /// Build from CSR arrays with signed integer indices, as handed over by
    /// external codes. Negative indices are rejected.
    pub fn from_raw_parts<I: PrimInt + Signed>(
        nrows: usize,
        ncols: usize,
        row_ptr: &[I],
        col_idx: &[I],
        values: &[T],
    ) -> Result<Self, AmgError> {
        let convert = |v: &[I], what: &str| -> Result<Vec<usize>, AmgError> {
            v.iter()
                .map(|i| {
                    i.to_usize().ok_or_else(|| {
                        AmgError::InvalidInput(format!("negative or oversized {what} index"))
                    })
                })
                .collect()
        };
        let row_ptr = convert(row_ptr, "row pointer")?;
        let col_idx = convert(col_idx, "column")?;
        Self::from_csr(nrows, ncols, row_ptr, col_idx, values.to_vec())
    }

    /// Assemble from (row, col, value) triplets. Duplicate entries are summed.
    pub fn from_triplets(
        nrows: usize,
        ncols: usize,
        triplets: &[(usize, usize, T)],
    ) -> Result<Self, AmgError> {
        let mut entries = triplets.to_vec();
        if let Some(&(i, j, _)) = entries.iter().find(|&&(i, j, _)| i >= nrows || j >= ncols) {
            return Err(AmgError::InvalidInput(format!(
                "entry ({i}, {j}) outside a {nrows}x{ncols} matrix"
            )));
        }
        entries.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));

        let mut row_ptr = vec![0; nrows + 1];
        let mut col_idx = Vec::with_capacity(entries.len());
        let mut values: Vec<T> = Vec::with_capacity(entries.len());
        let mut last: Option<(usize, usize)> = None;
        for (i, j, v) in entries {
            if last == Some((i, j)) {
                if let Some(acc) = values.last_mut() {
                    *acc = *acc + v;
                }
                continue;
            }
            col_idx.push(j);
            values.push(v);
            row_ptr[i + 1] += 1;
            last = Some((i, j));
        }
        for i in 0..nrows {
            row_ptr[i + 1] += row_ptr[i];
        }
        Ok(Self { nrows, ncols, row_ptr, col_idx, values })
    }

    /// The `n x n` identity.
    pub fn identity(n: usize) -> Self {
        Self {
            nrows: n,
            ncols: n,
            row_ptr: (0..=n).collect(),
            col_idx: (0..n).collect(),
            values: vec![T::one(); n],
        }
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    pub fn is_square(&self) -> bool {
        self.nrows == self.ncols
    }

    pub fn row_ptr(&self) -> &[usize] {
        &self.row_ptr
    }

    pub fn col_idx(&self) -> &[usize] {
        &self.col_idx
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Column indices and values of row `i`.
    #[inline]
    pub fn row(&self, i: usize) -> (&[usize], &[T]) {
        let range = self.row_ptr[i]..self.row_ptr[i + 1];
        (&self.col_idx[range.clone()], &self.values[range])
    }

    /// Main diagonal; missing entries read as zero.
    pub fn diagonal(&self) -> Vec<T> {
        (0..self.nrows.min(self.ncols))
            .map(|i| {
                let (cols, vals) = self.row(i);
                cols.iter()
                    .zip(vals)
                    .filter(|&(&c, _)| c == i)
                    .fold(T::zero(), |acc, (_, &v)| acc + v)
            })
            .collect()
    }

    pub fn has_sorted_rows(&self) -> bool {
        (0..self.nrows).all(|i| self.row(i).0.windows(2).all(|w| w[0] < w[1]))
    }

    /// Sort every row by column index.
    pub fn sort_rows(&mut self) {
        for i in 0..self.nrows {
            let range = self.row_ptr[i]..self.row_ptr[i + 1];
            sort_row(&mut self.col_idx[range.clone()], &mut self.values[range]);
        }
    }

    /// Transpose. Rows of the result come out sorted.
    pub fn transpose(&self) -> Self {
        let mut row_ptr = vec![0; self.ncols + 1];
        for &c in &self.col_idx {
            row_ptr[c + 1] += 1;
        }
        for j in 0..self.ncols {
            row_ptr[j + 1] += row_ptr[j];
        }
        let mut next = row_ptr.clone();
        let mut col_idx = vec![0; self.nnz()];
        let mut values = vec![T::zero(); self.nnz()];
        for i in 0..self.nrows {
            let (cols, vals) = self.row(i);
            for (&c, &v) in cols.iter().zip(vals) {
                let dst = next[c];
                col_idx[dst] = i;
                values[dst] = v;
                next[c] += 1;
            }
        }
        Self { nrows: self.ncols, ncols: self.nrows, row_ptr, col_idx, values }
    }

    /// Sparse product `self * other`, accumulated row by row. Rows of the result
    /// are sorted by column index.
    pub fn matmul(&self, other: &CsrMatrix<T>) -> Result<Self, AmgError> {
        if self.ncols != other.nrows {
            return Err(AmgError::InvalidInput(format!(
                "cannot multiply {}x{} by {}x{}",
                self.nrows, self.ncols, other.nrows, other.ncols
            )));
        }
        let mut marker = vec![usize::MAX; other.ncols];
        let mut row_ptr = Vec::with_capacity(self.nrows + 1);
        let mut col_idx = Vec::new();
        let mut values: Vec<T> = Vec::new();
        row_ptr.push(0);

        for i in 0..self.nrows {
            let row_start = col_idx.len();
            let (a_cols, a_vals) = self.row(i);
            for (&k, &a_ik) in a_cols.iter().zip(a_vals) {
                let (b_cols, b_vals) = other.row(k);
                for (&j, &b_kj) in b_cols.iter().zip(b_vals) {
                    let pos = marker[j];
                    if pos == usize::MAX || pos < row_start {
                        marker[j] = col_idx.len();
                        col_idx.push(j);
                        values.push(a_ik * b_kj);
                    } else {
                        values[pos] = values[pos] + a_ik * b_kj;
                    }
                }
            }
            sort_row(&mut col_idx[row_start..], &mut values[row_start..]);
            row_ptr.push(col_idx.len());
        }

        Ok(Self { nrows: self.nrows, ncols: other.ncols, row_ptr, col_idx, values })
    }
}

impl CsrMatrix<f64> {
    /// Dense copy as a faer matrix.
    pub fn to_dense(&self) -> Mat<f64> {
        let mut dense = Mat::<f64>::zeros(self.nrows, self.ncols);
        for i in 0..self.nrows {
            let (cols, vals) = self.row(i);
            for (&j, &v) in cols.iter().zip(vals) {
                dense[(i, j)] += v;
            }
        }
        dense
    }
}

impl<T: Float> SparseMatrix<T> for CsrMatrix<T> {
    fn nrows(&self) -> usize {
        self.nrows
    }
    fn ncols(&self) -> usize {
        self.ncols
    }
    fn nnz(&self) -> usize {
        self.values.len()
    }
    fn spmv(&self, x: &[T], y: &mut [T]) {
        assert_eq!(x.len(), self.ncols);
        assert_eq!(y.len(), self.nrows);
        for (i, yi) in y.iter_mut().enumerate() {
            let (cols, vals) = self.row(i);
            *yi = cols
                .iter()
                .zip(vals)
                .fold(T::zero(), |acc, (&j, &v)| acc + v * x[j]);
        }
    }
}

fn sort_row<T: Copy>(cols: &mut [usize], vals: &mut [T]) {
    if cols.windows(2).all(|w| w[0] <= w[1]) {
        return;
    }
    let mut pairs: Vec<(usize, T)> = cols.iter().copied().zip(vals.iter().copied()).collect();
    pairs.sort_unstable_by_key(|&(c, _)| c);
    for (k, (c, v)) in pairs.into_iter().enumerate() {
        cols[k] = c;
        vals[k] = v;
    }
}
