use std::time::{Duration, Instant};

use crate::host::mocked::MockedSession;
use crate::host::TrackAttribute;
use crate::meters::{normalize_peak, PeakEstimator, StereoPeaks};

const HOLD_CLEAR: Duration = Duration::from_millis(120);

fn assert_close(actual: f64, expected: f64) {
    assert!((actual - expected).abs() < 1e-3, "expected {expected}, got {actual}");
}

#[test]
fn decibels_map_to_linear_peaks() {
    assert_close(normalize_peak(-150.0), 0.0);
    assert_close(normalize_peak(-6.0), 0.501);
    assert_close(normalize_peak(0.0), 1.0);
    assert_eq!(normalize_peak(-200.0), 0.0);
    assert_eq!(normalize_peak(f64::NAN), 0.0);
}

#[test]
fn values_above_unity_are_clamped() {
    assert_eq!(normalize_peak(3.0), 1.0);
    assert_eq!(normalize_peak(1.5), 1.0);
    assert_eq!(normalize_peak(0.25), 0.25);
}

#[test]
fn processing_peaks_win_when_live() {
    let mut host = MockedSession::new();
    let track = host.add_track("Vox");
    if let Some(data) = host.track_mut(track) {
        data.processing_peaks = (0.3, 0.4);
        data.hold_peaks_db = (0.0, 0.0);
    }

    let mut estimator = PeakEstimator::new(HOLD_CLEAR);
    let peaks = estimator.peaks_of(&host, track, Instant::now());

    assert_eq!(peaks, StereoPeaks { left: 0.3, right: 0.4 });
    assert_eq!(host.hold_clears(), 0);
}

#[test]
fn armed_tracks_read_the_peak_hold() {
    let mut host = MockedSession::new();
    let track = host.add_track("Guitar DI");
    if let Some(data) = host.track_mut(track) {
        data.values.insert(TrackAttribute::RecordArm, 1.0);
        data.processing_peaks = (0.9, 0.9);
        data.hold_peaks_db = (-6.0, 0.0);
    }

    let mut estimator = PeakEstimator::new(HOLD_CLEAR);
    let peaks = estimator.peaks_of(&host, track, Instant::now());

    assert_close(peaks.left, 0.501);
    assert_close(peaks.right, 1.0);
}

#[test]
fn silent_processing_peaks_fall_back_to_peak_hold() {
    let mut host = MockedSession::new();
    let track = host.add_track("Synth");
    if let Some(data) = host.track_mut(track) {
        data.processing_peaks = (0.0, 0.0);
        data.hold_peaks_db = (-6.0, -150.0);
    }

    let mut estimator = PeakEstimator::new(HOLD_CLEAR);
    let peaks = estimator.peaks_of(&host, track, Instant::now());

    assert_close(peaks.left, 0.501);
    assert_close(peaks.right, 0.0);
}

#[test]
fn missing_processing_peaks_use_peak_hold() {
    let mut host = MockedSession::new();
    host.processing_peaks = false;
    let track = host.add_track("Keys");
    if let Some(data) = host.track_mut(track) {
        data.processing_peaks = (0.7, 0.7);
        data.hold_peaks_db = (0.0, -6.0);
    }

    let mut estimator = PeakEstimator::new(HOLD_CLEAR);
    let peaks = estimator.peaks_of(&host, track, Instant::now());

    assert_close(peaks.left, 1.0);
    assert_close(peaks.right, 0.501);
}

#[test]
fn peak_hold_clears_are_throttled() {
    let mut host = MockedSession::new();
    host.processing_peaks = false;
    let first = host.add_track("One");
    let second = host.add_track("Two");

    let mut estimator = PeakEstimator::new(HOLD_CLEAR);
    let start = Instant::now();

    estimator.peaks_of(&host, first, start);
    estimator.peaks_of(&host, second, start);
    assert_eq!(host.hold_clears(), 4, "both channels of both tracks clear at the same instant");

    estimator.peaks_of(&host, first, start + Duration::from_millis(20));
    estimator.peaks_of(&host, first, start + Duration::from_millis(100));
    assert_eq!(host.hold_clears(), 4);

    estimator.peaks_of(&host, first, start + Duration::from_millis(130));
    assert_eq!(host.hold_clears(), 6);
}
