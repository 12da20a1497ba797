//! Left/right peak estimation from the host's metering sources.
//!
//! Record-armed tracks read the UI peak-hold, which follows the monitored
//! input. Other tracks read the processing peaks and fall back to the
//! peak-hold when those read as silence, since they can miss a block boundary.

use std::time::{Duration, Instant};

use crate::host::{SessionHost, TrackAttribute};
use crate::limits::clamp_unit;

#[cfg(test)]
mod tests;

/// Peak-hold values below this are silence.
pub const SILENCE_FLOOR_DB: f64 = -150.0;

/// Processing peaks below this on both channels count as "not metered".
pub const DEAD_PEAK_EPSILON: f64 = 1e-6;

pub fn db_to_gain_factor(db: f64) -> f64 {
    10_f64.powf(db / 20_f64)
}

/// Peak-hold sources report dB in `[-150, 0]`; anything above 0 is already linear.
pub fn normalize_peak(value: f64) -> f64 {
    if value.is_nan() || value < SILENCE_FLOOR_DB {
        0.0
    } else if value <= 0.0 {
        clamp_unit(db_to_gain_factor(value))
    } else {
        clamp_unit(value)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StereoPeaks {
    pub left:  f64,
    pub right: f64,
}

impl StereoPeaks {
    fn max(self, other: StereoPeaks) -> StereoPeaks {
        StereoPeaks { left:  self.left.max(other.left),
                      right: self.right.max(other.right), }
    }
}

#[derive(Debug)]
pub struct PeakEstimator {
    hold_clear_interval: Duration,
    last_hold_clear:     Option<Instant>,
}

impl PeakEstimator {
    pub fn new(hold_clear_interval: Duration) -> Self {
        Self { hold_clear_interval,
               last_hold_clear: None }
    }

    pub fn peaks_of<H: SessionHost>(&mut self, host: &H, track: H::Track, now: Instant) -> StereoPeaks {
        let armed = host.track_value(track, TrackAttribute::RecordArm)
                        .map(|value| value >= 0.5)
                        .unwrap_or(false);
        if armed {
            return self.hold_peaks(host, track, now);
        }

        match (host.track_peak_info(track, 0), host.track_peak_info(track, 1)) {
            (Ok(left), Ok(right)) => {
                let processed = StereoPeaks { left:  clamp_unit(left),
                                              right: clamp_unit(right), };

                if processed.left < DEAD_PEAK_EPSILON && processed.right < DEAD_PEAK_EPSILON {
                    processed.max(self.hold_peaks(host, track, now))
                } else {
                    processed
                }
            }
            _ => self.hold_peaks(host, track, now),
        }
    }

    /// The hold reset is shared by every track; all tracks metered at the same
    /// instant observe the same decision.
    fn should_clear_hold(&mut self, now: Instant) -> bool {
        match self.last_hold_clear {
            Some(last) if last == now => true,
            Some(last) if now.saturating_duration_since(last) < self.hold_clear_interval => false,
            _ => {
                self.last_hold_clear = Some(now);
                true
            }
        }
    }

    fn hold_peaks<H: SessionHost>(&mut self, host: &H, track: H::Track, now: Instant) -> StereoPeaks {
        let clear = self.should_clear_hold(now);

        match (host.track_ui_peak_hold_db(track, 0, clear), host.track_ui_peak_hold_db(track, 1, clear)) {
            (Ok(left), Ok(right)) => StereoPeaks { left:  normalize_peak(left),
                                                   right: normalize_peak(right), },
            _ => StereoPeaks::default(),
        }
    }
}
