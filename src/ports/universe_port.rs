//! Source of externally supplied symbol lists.

use crate::domain::error::TraderError;

pub trait UniversePort {
    /// Raw symbols in file order; normalisation and validation happen in the
    /// domain.
    fn load_symbols(&self, path: &str) -> Result<Vec<String>, TraderError>;
}
