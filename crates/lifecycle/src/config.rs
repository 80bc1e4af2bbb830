//! Polling cadence and deadline configuration.

use std::time::Duration;

use minigen_core::Preset;

/// Tunable parameters for one polling session.
///
/// Presets may carry their own hints (`poll_interval_seconds`,
/// `timeout_seconds`, `eta_seconds`); [`PollConfig::for_preset`]
/// applies them on top of the defaults.
#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    /// Delay between status (and result) fetches.
    pub interval: Duration,
    /// Overall wall-clock ceiling from submission to a terminal
    /// status; on expiry the session becomes timed-out, not failed.
    pub timeout: Duration,
    /// Advisory completion estimate for the remaining-time readout.
    pub eta: Option<Duration>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(1500),
            timeout: Duration::from_secs(150),
            eta: None,
        }
    }
}

impl PollConfig {
    /// Apply a preset's polling hints on top of this config.
    ///
    /// Hints are service-supplied data.  An interval outside
    /// 0.1..=600 seconds (including NaN/infinite values, which
    /// `Duration::from_secs_f64` rejects by panicking) or a zero
    /// timeout is ignored in favor of the configured value.
    pub fn for_preset(&self, preset: &Preset) -> Self {
        Self {
            interval: preset
                .poll_interval_seconds
                .filter(|secs| (0.1..=600.0).contains(secs))
                .map(Duration::from_secs_f64)
                .unwrap_or(self.interval),
            timeout: preset
                .timeout_seconds
                .filter(|&secs| secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(self.timeout),
            eta: preset.eta_seconds.map(Duration::from_secs).or(self.eta),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preset_with_hints() -> Preset {
        serde_json::from_value(serde_json::json!({
            "id": "vid",
            "label": "Video",
            "job_type": "video",
            "network_id": "n2",
            "eta_seconds": 90,
            "poll_interval_seconds": 2.0,
            "timeout_seconds": 180,
            "fields": [],
        }))
        .unwrap()
    }

    #[test]
    fn preset_hints_override_defaults() {
        let config = PollConfig::default().for_preset(&preset_with_hints());
        assert_eq!(config.interval, Duration::from_secs(2));
        assert_eq!(config.timeout, Duration::from_secs(180));
        assert_eq!(config.eta, Some(Duration::from_secs(90)));
    }

    #[test]
    fn defaults_survive_a_preset_without_hints() {
        let preset: Preset = serde_json::from_value(serde_json::json!({
            "id": "img",
            "label": "Image",
            "job_type": "image",
            "network_id": "n1",
            "fields": [],
        }))
        .unwrap();

        let config = PollConfig::default().for_preset(&preset);
        assert_eq!(config.interval, Duration::from_millis(1500));
        assert_eq!(config.timeout, Duration::from_secs(150));
        assert_eq!(config.eta, None);
    }

    #[test]
    fn hostile_hints_fall_back_to_defaults() {
        // A malformed preset from the service must not reach the
        // panicking Duration/interval constructors.
        let mut preset = preset_with_hints();
        for bad in [-1.0, 0.0, f64::NAN, f64::INFINITY, 1e30] {
            preset.poll_interval_seconds = Some(bad);
            let config = PollConfig::default().for_preset(&preset);
            assert_eq!(
                config.interval,
                Duration::from_millis(1500),
                "interval hint {bad}"
            );
            assert!(!config.interval.is_zero());
        }

        preset.timeout_seconds = Some(0);
        let config = PollConfig::default().for_preset(&preset);
        assert_eq!(config.timeout, Duration::from_secs(150));
    }
}
