//! Value domains shared by snapshots and commands.

/// Linear gain ceiling, just above +12 dB.
pub const MAX_VOLUME: f64 = 4.0;
pub const MIN_TEMPO: f64 = 20.0;
pub const MAX_TEMPO: f64 = 300.0;

fn clamp_or(value: f64, min: f64, max: f64, fallback: f64) -> f64 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(min, max)
    }
}

pub fn clamp_volume(volume: f64) -> f64 {
    clamp_or(volume, 0.0, MAX_VOLUME, 1.0)
}

pub fn clamp_pan(pan: f64) -> f64 {
    clamp_or(pan, -1.0, 1.0, 0.0)
}

pub fn clamp_unit(value: f64) -> f64 {
    clamp_or(value, 0.0, 1.0, 0.0)
}

pub fn clamp_tempo(bpm: f64) -> f64 {
    clamp_or(bpm, MIN_TEMPO, MAX_TEMPO, 120.0)
}

/// Converts the UI's 1-based input number to the host's 0-based selector.
pub fn record_input_selector(input: i64) -> f64 {
    input.saturating_sub(1).max(0) as f64
}

/// Converts a wire index to a host slot; negative indices address nothing.
pub fn slot(index: i64) -> Option<usize> {
    usize::try_from(index).ok()
}
