use crate::backend::CpuBackend;
use crate::config::OptionGroup;
use crate::error::AmgError;
use crate::matrix::CsrMatrix;
use crate::relaxation::Relaxation;
use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// Order in which a Gauss-Seidel sweep visits the rows.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct SweepDirection: u32 {
        const FORWARD   = 0b01;
        const BACKWARD  = 0b10;
        const SYMMETRIC = Self::FORWARD.bits() | Self::BACKWARD.bits();
    }
}

impl SweepDirection {
    fn parse(key: &str, value: &str) -> Result<Self, AmgError> {
        match value {
            "forward" => Ok(Self::FORWARD),
            "backward" => Ok(Self::BACKWARD),
            "symmetric" => Ok(Self::SYMMETRIC),
            _ => Err(AmgError::invalid_option(key, value)),
        }
    }
}

/// Directions used before restriction and after prolongation. The defaults
/// (forward then backward) keep a V-cycle symmetric.
#[derive(Debug, Clone)]
pub struct GaussSeidelParams {
    pub pre: SweepDirection,
    pub post: SweepDirection,
}

impl Default for GaussSeidelParams {
    fn default() -> Self {
        Self { pre: SweepDirection::FORWARD, post: SweepDirection::BACKWARD }
    }
}

impl OptionGroup for GaussSeidelParams {
    fn set_option(&mut self, key: &str, value: &str) -> Result<(), AmgError> {
        match key {
            "pre" => self.pre = SweepDirection::parse(key, value)?,
            "post" => self.post = SweepDirection::parse(key, value)?,
            _ => return Err(AmgError::invalid_option(key, value)),
        }
        Ok(())
    }
}

/// Point Gauss-Seidel updating `x` in place.
///
/// The sweep is inherently sequential, so this smoother reads the host CSR
/// matrix directly and is only offered for [`CpuBackend`].
pub struct GaussSeidel {
    inv_diag: Vec<f64>,
}

impl GaussSeidel {
    fn relax_row(&self, a: &CsrMatrix<f64>, rhs: &[f64], x: &mut [f64], i: usize) {
        let (cols, vals) = a.row(i);
        let sigma = cols
            .iter()
            .zip(vals)
            .filter(|&(&j, _)| j != i)
            .fold(0.0, |acc, (&j, &v)| acc + v * x[j]);
        x[i] = (rhs[i] - sigma) * self.inv_diag[i];
    }

    fn sweep(&self, a: &CsrMatrix<f64>, rhs: &[f64], x: &mut [f64], dir: SweepDirection) {
        let n = a.nrows();
        if dir.contains(SweepDirection::FORWARD) {
            for i in 0..n {
                self.relax_row(a, rhs, x, i);
            }
        }
        if dir.contains(SweepDirection::BACKWARD) {
            for i in (0..n).rev() {
                self.relax_row(a, rhs, x, i);
            }
        }
    }
}

impl fmt::Display for GaussSeidel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GaussSeidel(n={})", self.inv_diag.len())
    }
}

impl Relaxation<CpuBackend> for GaussSeidel {
    type Params = GaussSeidelParams;

    fn new(a: &CsrMatrix<f64>, _prm: &GaussSeidelParams, _backend_prm: &()) -> Result<Self, AmgError> {
        let inv_diag = a
            .diagonal()
            .into_iter()
            .enumerate()
            .map(|(i, aii)| if aii == 0.0 { Err(AmgError::ZeroPivot(i)) } else { Ok(1.0 / aii) })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { inv_diag })
    }

    fn apply_pre(&self, a: &CsrMatrix<f64>, rhs: &Vec<f64>, x: &mut Vec<f64>, _tmp: &mut Vec<f64>, prm: &GaussSeidelParams) {
        self.sweep(a, rhs, x, prm.pre);
    }

    fn apply_post(&self, a: &CsrMatrix<f64>, rhs: &Vec<f64>, x: &mut Vec<f64>, _tmp: &mut Vec<f64>, prm: &GaussSeidelParams) {
        self.sweep(a, rhs, x, prm.post);
    }
}
