//! Parameters of the AMG hierarchy and cycle, plus string-keyed option parsing.

pub mod options;
pub mod params;

pub use options::{OptionGroup, parse_option};
pub use params::{AmgParams, DEFAULT_COARSE_ENOUGH};
