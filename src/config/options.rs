//! String-keyed options.
//!
//! Every nested parameter record (coarsening, relaxation, backend) implements
//! [`OptionGroup`] so that a whole configuration can be driven from key/value
//! pairs such as `("npre", "2")` or `("coarsening.eps_strong", "0.1")`.

use crate::error::AmgError;
use std::str::FromStr;

/// A parameter record that accepts `key = value` updates.
pub trait OptionGroup {
    /// Update the option named `key`. Unknown keys and unparsable values are
    /// reported as [`AmgError::InvalidOption`].
    fn set_option(&mut self, key: &str, value: &str) -> Result<(), AmgError>;
}

/// Parameterless groups reject every key.
impl OptionGroup for () {
    fn set_option(&mut self, key: &str, value: &str) -> Result<(), AmgError> {
        Err(AmgError::invalid_option(key, value))
    }
}

/// Parse `value` for option `key`.
pub fn parse_option<V: FromStr>(key: &str, value: &str) -> Result<V, AmgError> {
    value.trim().parse().map_err(|_| AmgError::invalid_option(key, value))
}
