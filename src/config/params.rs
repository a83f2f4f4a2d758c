//! AMG parameters.
//!
//! `AmgParams` carries the options the hierarchy builder and the cycle engine
//! recognize, plus nested option groups owned by the coarsening strategy, the
//! relaxation scheme and the backend. The nested types are opaque here.

use crate::config::{OptionGroup, parse_option};
use crate::error::AmgError;

/// Default row-count threshold below which the coarsest level is solved directly.
pub const DEFAULT_COARSE_ENOUGH: usize = 300;

#[derive(Debug, Clone)]
pub struct AmgParams<CP, RP, BP> {
    /// Stop coarsening once a level has at most this many rows.
    pub coarse_enough: usize,
    /// Pre-relaxation sweeps per cycle.
    pub npre: usize,
    /// Post-relaxation sweeps per cycle.
    pub npost: usize,
    /// Cycles per level: 1 gives a V-cycle, 2 a W-cycle.
    pub ncycle: usize,
    /// Accelerate the coarse correction of every `kcycle`-th level with two
    /// flexible CG iterations (K-cycle). 0 disables it.
    pub kcycle: usize,
    /// Cycles per preconditioner application; 0 turns `apply` into a copy.
    pub pre_cycles: usize,
    /// Relative residual target of the standalone solver.
    pub tol: f64,
    /// Iteration cap of the standalone solver.
    pub maxiter: usize,
    /// Coarsening strategy options.
    pub coarsening: CP,
    /// Relaxation options.
    pub relax: RP,
    /// Backend options.
    pub backend: BP,
}

impl<CP: Default, RP: Default, BP: Default> Default for AmgParams<CP, RP, BP> {
    fn default() -> Self {
        Self {
            coarse_enough: DEFAULT_COARSE_ENOUGH,
            npre: 1,
            npost: 1,
            ncycle: 1,
            kcycle: 0,
            pre_cycles: 1,
            tol: 1e-8,
            maxiter: 100,
            coarsening: CP::default(),
            relax: RP::default(),
            backend: BP::default(),
        }
    }
}

impl<CP, RP, BP> AmgParams<CP, RP, BP> {
    pub fn with_coarse_enough(mut self, coarse_enough: usize) -> Self {
        self.coarse_enough = coarse_enough;
        self
    }
    pub fn with_npre(mut self, npre: usize) -> Self {
        self.npre = npre;
        self
    }
    pub fn with_npost(mut self, npost: usize) -> Self {
        self.npost = npost;
        self
    }
    pub fn with_ncycle(mut self, ncycle: usize) -> Self {
        self.ncycle = ncycle;
        self
    }
    pub fn with_kcycle(mut self, kcycle: usize) -> Self {
        self.kcycle = kcycle;
        self
    }
    pub fn with_pre_cycles(mut self, pre_cycles: usize) -> Self {
        self.pre_cycles = pre_cycles;
        self
    }
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }
    pub fn with_maxiter(mut self, maxiter: usize) -> Self {
        self.maxiter = maxiter;
        self
    }
    pub fn with_coarsening(mut self, coarsening: CP) -> Self {
        self.coarsening = coarsening;
        self
    }
    pub fn with_relax(mut self, relax: RP) -> Self {
        self.relax = relax;
        self
    }

    /// Reject parameter combinations the cycle cannot run with.
    pub fn validate(&self) -> Result<(), AmgError> {
        if self.ncycle == 0 {
            return Err(AmgError::InvalidInput("ncycle must be at least 1".into()));
        }
        if !(self.tol >= 0.0) {
            return Err(AmgError::InvalidInput(format!("tolerance {} is not a non-negative number", self.tol)));
        }
        Ok(())
    }
}

impl<CP: OptionGroup, RP: OptionGroup, BP: OptionGroup> AmgParams<CP, RP, BP> {
    /// Set one option. Nested groups are addressed as `coarsening.<key>`,
    /// `relax.<key>` and `backend.<key>`.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), AmgError> {
        if let Some((group, inner)) = key.split_once('.') {
            let nested = match group {
                "coarsening" => self.coarsening.set_option(inner, value),
                "relax" => self.relax.set_option(inner, value),
                "backend" => self.backend.set_option(inner, value),
                _ => Err(AmgError::invalid_option(key, value)),
            };
            return nested.map_err(|_| AmgError::invalid_option(key, value));
        }
        match key {
            "coarse_enough" => self.coarse_enough = parse_option(key, value)?,
            "npre" => self.npre = parse_option(key, value)?,
            "npost" => self.npost = parse_option(key, value)?,
            "ncycle" => self.ncycle = parse_option(key, value)?,
            "kcycle" => self.kcycle = parse_option(key, value)?,
            "pre_cycles" => self.pre_cycles = parse_option(key, value)?,
            "tol" => self.tol = parse_option(key, value)?,
            "maxiter" => self.maxiter = parse_option(key, value)?,
            _ => return Err(AmgError::invalid_option(key, value)),
        }
        Ok(())
    }

    /// Apply a sequence of key/value pairs in order.
    pub fn from_pairs<'a, I>(mut self, pairs: I) -> Result<Self, AmgError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (key, value) in pairs {
            self.set(key, value)?;
        }
        Ok(self)
    }
}
