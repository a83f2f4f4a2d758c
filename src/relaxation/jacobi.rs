// Damped Jacobi smoother

use crate::backend::Backend;
use crate::config::{OptionGroup, parse_option};
use crate::error::AmgError;
use crate::matrix::CsrMatrix;
use crate::relaxation::Relaxation;
use crate::utils::scalar;
use num_traits::{One, Zero};

#[derive(Debug, Clone)]
pub struct DampedJacobiParams {
    pub damping: f64,
}

impl Default for DampedJacobiParams {
    fn default() -> Self {
        Self { damping: 0.72 }
    }
}

impl OptionGroup for DampedJacobiParams {
    fn set_option(&mut self, key: &str, value: &str) -> Result<(), AmgError> {
        match key {
            "damping" => self.damping = parse_option(key, value)?,
            _ => return Err(AmgError::invalid_option(key, value)),
        }
        Ok(())
    }
}

/// `x <- x + w D^-1 (rhs - A x)`.
pub struct DampedJacobi<B: Backend> {
    /// `w / a_ii`, damping folded in at setup.
    scaled_inv_diag: B::Vector,
}

impl<B: Backend> DampedJacobi<B> {
    fn sweep(&self, a: &B::Matrix, rhs: &B::Vector, x: &mut B::Vector, tmp: &mut B::Vector) {
        B::residual(rhs, a, x, tmp);
        B::vmul(B::Value::one(), &self.scaled_inv_diag, tmp, B::Value::one(), x);
    }
}

impl<B: Backend> Relaxation<B> for DampedJacobi<B> {
    type Params = DampedJacobiParams;

    fn new(
        a: &CsrMatrix<B::Value>,
        prm: &DampedJacobiParams,
        backend_prm: &B::Params,
    ) -> Result<Self, AmgError> {
        let w: B::Value = scalar(prm.damping);
        let d = a
            .diagonal()
            .into_iter()
            .enumerate()
            .map(|(i, aii)| {
                if aii == B::Value::zero() {
                    Err(AmgError::ZeroPivot(i))
                } else {
                    Ok(w / aii)
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { scaled_inv_diag: B::copy_vector(d, backend_prm) })
    }

    fn apply_pre(&self, a: &B::Matrix, rhs: &B::Vector, x: &mut B::Vector, tmp: &mut B::Vector, _prm: &DampedJacobiParams) {
        self.sweep(a, rhs, x, tmp);
    }

    fn apply_post(&self, a: &B::Matrix, rhs: &B::Vector, x: &mut B::Vector, tmp: &mut B::Vector, _prm: &DampedJacobiParams) {
        self.sweep(a, rhs, x, tmp);
    }
}
