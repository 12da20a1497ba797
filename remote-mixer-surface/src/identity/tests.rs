use remote_mixer_api::TrackGuid;

use crate::host::mocked::{MockedSession, MASTER_HANDLE};
use crate::host::SessionHost;
use crate::identity::{is_braced_guid, looks_like_pointer, IdentityResolver};

#[test]
fn pointer_shapes_are_recognised() {
    assert!(looks_like_pointer("(MediaTrack*)0x0000021A3F"));
    assert!(looks_like_pointer("(GUID*)0x00007FF000000010"));
    assert!(looks_like_pointer("0x1F00A0C8"));
    assert!(!looks_like_pointer("{1B4E28BA-2FA1-11D2-883F-0016D3CCA427}"));
    assert!(!looks_like_pointer("0x12"));
    assert!(!looks_like_pointer(""));
}

#[test]
fn braced_guids_are_recognised() {
    assert!(is_braced_guid("{1B4E28BA-2FA1-11D2-883F-0016D3CCA427}"));
    assert!(!is_braced_guid("{}"));
    assert!(!is_braced_guid("1B4E28BA"));
}

#[test]
fn master_is_always_the_sentinel() {
    let host = MockedSession::new();
    let identity = IdentityResolver::new();

    for _ in 0..3 {
        assert_eq!(identity.identifier_of(&host, MASTER_HANDLE), TrackGuid::master());
    }

    assert_eq!(identity.resolve(&host, &TrackGuid::new("MASTER")), Some(MASTER_HANDLE));
    assert_eq!(identity.resolve(&host, &TrackGuid::new("{MASTER}")), Some(MASTER_HANDLE));
}

#[test]
fn identifier_is_stable_although_raw_guid_changes() {
    let mut host = MockedSession::new();
    let drums = host.add_track("Drums");
    let identity = IdentityResolver::new();

    assert_ne!(host.track_guid(drums).ok(), host.track_guid(drums).ok());

    let first = identity.identifier_of(&host, drums);
    let second = identity.identifier_of(&host, drums);

    assert_eq!(first, second);
    assert_eq!(Some(first.as_str().to_owned()), host.stable_guid_of(drums));
}

#[test]
fn resolves_by_linear_scan() {
    let mut host = MockedSession::new();
    let _drums = host.add_track("Drums");
    let bass = host.add_track("Bass");
    let identity = IdentityResolver::new();

    let guid = identity.identifier_of(&host, bass);
    assert_eq!(identity.resolve(&host, &guid), Some(bass));
}

#[test]
fn missing_targets_are_not_found() {
    let mut host = MockedSession::new();
    let drums = host.add_track("Drums");
    let identity = IdentityResolver::new();

    let guid = identity.identifier_of(&host, drums);
    host.remove_track(drums);
    host.phantom_tracks = 2;

    assert_eq!(identity.resolve(&host, &guid), None);
    assert_eq!(identity.resolve(&host, &TrackGuid::default()), None);
    assert_eq!(identity.resolve(&MockedSession::new(), &guid), None);
}

#[test]
fn degraded_mode_falls_back_to_raw_guid() {
    let mut host = MockedSession::new();
    host.stable_guids = false;
    let drums = host.add_track("Drums");
    let identity = IdentityResolver::new();

    let guid = identity.identifier_of(&host, drums);
    assert!(looks_like_pointer(guid.as_str()));

    // the raw value churns, so it no longer resolves on the next call
    assert_eq!(identity.resolve(&host, &guid), None);
    assert_eq!(identity.identifier_of(&host, MASTER_HANDLE), TrackGuid::master());
}
