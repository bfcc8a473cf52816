//! CSV universe file adapter.
//!
//! Reads the `symbol` column of a CSV file with a header row. Other columns
//! (name, sector, ...) are ignored, blank symbols are skipped.

use crate::domain::error::TraderError;
use crate::ports::universe_port::UniversePort;
use std::fs;
use std::path::PathBuf;

pub struct CsvUniverseAdapter {
    base_path: PathBuf,
}

impl CsvUniverseAdapter {
    /// Relative paths are resolved against `base_path`, normally the
    /// directory holding the config file.
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.base_path.join(path)
    }
}

impl UniversePort for CsvUniverseAdapter {
    fn load_symbols(&self, path: &str) -> Result<Vec<String>, TraderError> {
        let full_path = self.resolve(path);
        let file_err = |reason: String| TraderError::UniverseFile {
            file: full_path.display().to_string(),
            reason,
        };

        let content = fs::read_to_string(&full_path).map_err(|e| file_err(e.to_string()))?;

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let headers = rdr
            .headers()
            .map_err(|e| file_err(format!("CSV header error: {}", e)))?;
        let column = headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case("symbol"))
            .ok_or_else(|| file_err("missing symbol column".into()))?;

        let mut symbols = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| file_err(format!("CSV parse error: {}", e)))?;
            match record.get(column) {
                Some(symbol) if !symbol.is_empty() => symbols.push(symbol.to_string()),
                _ => continue,
            }
        }

        Ok(symbols)
    }
}
