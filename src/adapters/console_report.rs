//! Console report: prints the ranked selection to stdout.

use crate::domain::error::TraderError;
use crate::domain::observation::Observation;
use crate::ports::report_port::ReportPort;
use std::io::{self, Write};

/// One `Stock: <SYMBOL> Change: <pct>%` line per selected observation.
pub fn format_selection(selected: &[Observation]) -> String {
    let mut out = String::new();
    for obs in selected {
        out.push_str(&format!(
            "Stock: {} Change: {}%\n",
            obs.symbol, obs.percent_change
        ));
    }
    out
}

pub struct ConsoleReport;

impl ReportPort for ConsoleReport {
    fn write_selection(&self, selected: &[Observation]) -> Result<(), TraderError> {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle.write_all(format_selection(selected).as_bytes())?;
        handle.flush()?;
        Ok(())
    }
}
