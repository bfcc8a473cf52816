//! Configuration access port trait.

use std::time::Duration;

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> i64;
    fn get_double(&self, section: &str, key: &str, default: f64) -> f64;

    /// Whole milliseconds; negative or unparsable values fall back to
    /// `default_ms`.
    fn get_millis(&self, section: &str, key: &str, default_ms: u64) -> Duration {
        let ms = self.get_int(section, key, default_ms as i64);
        Duration::from_millis(u64::try_from(ms).unwrap_or(default_ms))
    }

    /// Fractional seconds. Values that are not positive or do not fit in a
    /// `Duration` fall back to `default_secs`.
    fn get_secs(&self, section: &str, key: &str, default_secs: f64) -> Duration {
        let secs = self.get_double(section, key, default_secs);
        Duration::try_from_secs_f64(secs)
            .ok()
            .filter(|d| !d.is_zero())
            .or_else(|| Duration::try_from_secs_f64(default_secs).ok())
            .unwrap_or_default()
    }
}
