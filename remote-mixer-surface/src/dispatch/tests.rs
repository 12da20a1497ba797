use maplit::hashmap;
use serde_json::json;

use remote_mixer_api::{SendMode, SurfaceCommand, SurfaceEvent, TrackGuid, TransportCommand};

use crate::dispatch::{normalize_fx_name, split_candidates, Dispatcher};
use crate::host::mocked::{MockedSession, MockedTrackHandle, MASTER_HANDLE};
use crate::host::{MarkerInfo, RouteAttribute, TrackAttribute, TransportAction};
use crate::identity::IdentityResolver;
use crate::snapshot::Stamp;

const STAMP: Stamp<'static> = Stamp { version: "0.1.0",
                                      ts:      0.0, };

struct Fixture {
    host:     MockedSession,
    identity: IdentityResolver,
    track:    MockedTrackHandle,
    guid:     TrackGuid,
}

impl Fixture {
    fn new() -> Self {
        let mut host = MockedSession::new();
        let track = host.add_track("Vox");
        let identity = IdentityResolver::new();
        let guid = identity.identifier_of(&host, track);

        Self { host,
               identity,
               track,
               guid }
    }

    fn dispatch(&mut self, command: SurfaceCommand) -> Option<SurfaceEvent> {
        Dispatcher::new(&mut self.host, &self.identity, STAMP).dispatch(command)
    }

    fn dispatch_json(&mut self, value: serde_json::Value) -> Option<SurfaceEvent> {
        let command = serde_json::from_value(value).expect("valid command");
        self.dispatch(command)
    }

    fn value(&self, attribute: TrackAttribute) -> f64 {
        self.host.track_data(self.track).map(|data| data.value(attribute)).unwrap_or(f64::NAN)
    }

    fn fx_names(&self) -> Vec<String> {
        self.host
            .track_data(self.track)
            .map(|data| data.fx.iter().map(|fx| fx.name.clone()).collect())
            .unwrap_or_default()
    }
}

#[test]
fn valid_volumes_are_stored_unmodified() {
    let mut fixture = Fixture::new();

    for vol in [0.0, 0.125, 0.7071, 1.0, 2.5] {
        let guid = fixture.guid.clone();
        assert_eq!(fixture.dispatch(SurfaceCommand::SetVol { guid, vol }), None);
        assert_eq!(fixture.value(TrackAttribute::Volume), vol);
    }
}

#[test]
fn tempo_is_clamped_in_both_directions() {
    let mut fixture = Fixture::new();

    fixture.dispatch(SurfaceCommand::SetBpm { bpm: 5.0 });
    assert_eq!(fixture.host.tempo, Some(20.0));

    fixture.dispatch(SurfaceCommand::SetBpm { bpm: 480.0 });
    assert_eq!(fixture.host.tempo, Some(300.0));

    fixture.dispatch(SurfaceCommand::SetBpm { bpm: 96.0 });
    assert_eq!(fixture.host.tempo, Some(96.0));
}

#[test]
fn unresolved_targets_are_no_ops() {
    let mut fixture = Fixture::new();
    let stranger = TrackGuid::new("{00000000-0000-0000-0000-000000000000}");

    assert_eq!(fixture.dispatch(SurfaceCommand::SetVol { guid: stranger.clone(),
                                                         vol:  0.2, }),
               None);
    assert_eq!(fixture.dispatch(SurfaceCommand::AddFx { guid: stranger,
                                                        name: "ReaEQ".to_owned(), }),
               None);
    assert_eq!(fixture.value(TrackAttribute::Volume), 1.0);
}

#[test]
fn master_is_addressable_by_sentinel() {
    let mut fixture = Fixture::new();

    fixture.dispatch_json(json!({"type": "setVol", "guid": "{MASTER}", "vol": 0.5}));
    fixture.dispatch_json(json!({"type": "setMute", "guid": "MASTER", "mute": 1}));

    let master = fixture.host.track_data(MASTER_HANDLE).expect("master");
    assert_eq!(master.value(TrackAttribute::Volume), 0.5);
    assert_eq!(master.value(TrackAttribute::Mute), 1.0);
}

#[test]
fn track_flags_use_host_values() {
    let mut fixture = Fixture::new();
    let guid = fixture.guid.clone();

    fixture.dispatch(SurfaceCommand::SetSolo { guid: guid.clone(),
                                               solo: true, });
    assert_eq!(fixture.value(TrackAttribute::Solo), 2.0);

    fixture.dispatch(SurfaceCommand::SetSolo { guid: guid.clone(),
                                               solo: false, });
    assert_eq!(fixture.value(TrackAttribute::Solo), 0.0);

    fixture.dispatch(SurfaceCommand::SetRec { guid: guid.clone(),
                                              rec:  true, });
    assert_eq!(fixture.value(TrackAttribute::RecordArm), 1.0);

    fixture.dispatch(SurfaceCommand::SetPan { guid, pan: -4.0 });
    assert_eq!(fixture.value(TrackAttribute::Pan), -1.0);
}

#[test]
fn record_input_is_converted_to_zero_based() {
    let mut fixture = Fixture::new();

    fixture.dispatch_json(json!({"type": "setRecInput", "guid": fixture.guid, "input": 3}));
    assert_eq!(fixture.value(TrackAttribute::RecordInput), 2.0);

    fixture.dispatch_json(json!({"type": "setRecInput", "guid": fixture.guid, "input": 0}));
    assert_eq!(fixture.value(TrackAttribute::RecordInput), 0.0);
}

#[test]
fn send_mode_maps_to_two_host_values() {
    let mut fixture = Fixture::new();
    let bus = fixture.host.add_track("Bus");
    fixture.host.add_send(fixture.track, bus);

    let send_mode = |fixture: &Fixture| {
        fixture.host
               .track_data(fixture.track)
               .map(|data| data.sends[0].value(RouteAttribute::Mode))
               .unwrap_or(f64::NAN)
    };

    for (mode, expected) in [(json!(1), 1.0), (json!(0), 0.0), (json!(3), 1.0), (json!(false), 0.0)] {
        fixture.dispatch_json(json!({"type": "setSendMode", "guid": fixture.guid, "index": 0, "mode": mode}));
        assert_eq!(send_mode(&fixture), expected);
    }

    fixture.dispatch(SurfaceCommand::SetSendMode { guid:  fixture.guid.clone(),
                                                   index: 0,
                                                   mode:  SendMode::PreFader, });
    assert_eq!(send_mode(&fixture), 1.0);
}

#[test]
fn receives_are_addressed_from_the_receiving_track() {
    let mut fixture = Fixture::new();
    let source = fixture.host.add_track("Guitar");
    fixture.host.add_send(source, fixture.track);

    fixture.dispatch_json(json!({"type": "setRecvVol", "guid": fixture.guid, "index": 0, "vol": 0.25}));
    fixture.dispatch_json(json!({"type": "setRecvMute", "guid": fixture.guid, "index": 0, "mute": true}));
    fixture.dispatch_json(json!({"type": "setRecvVol", "guid": fixture.guid, "index": -1, "vol": 0.75}));

    let send = fixture.host.track_data(source).map(|data| data.sends[0].clone()).expect("send");
    assert_eq!(send.value(RouteAttribute::Volume), 0.25);
    assert_eq!(send.value(RouteAttribute::Mute), 1.0);
}

#[test]
fn transport_actions_reach_the_host() {
    let mut fixture = Fixture::new();

    fixture.dispatch(SurfaceCommand::Transport { action: TransportCommand::Play });
    fixture.dispatch(SurfaceCommand::Transport { action: TransportCommand::Unknown });
    fixture.dispatch(SurfaceCommand::Transport { action: TransportCommand::Stop });

    assert_eq!(fixture.host.transport_log, vec![TransportAction::Play, TransportAction::Stop]);
}

#[test]
fn goto_region_moves_the_edit_cursor() {
    let mut fixture = Fixture::new();
    fixture.host.markers = vec![MarkerInfo { is_region: false,
                                             start:     2.0,
                                             end:       2.0,
                                             name:      "Hit".to_owned(),
                                             index:     4, },
                                MarkerInfo { is_region: true,
                                             start:     30.0,
                                             end:       45.0,
                                             name:      "Bridge".to_owned(),
                                             index:     4, }];

    fixture.dispatch(SurfaceCommand::GotoRegion { index: 4 });
    assert_eq!(fixture.host.cursor_position, 30.0);

    fixture.host.cursor_position = 0.0;
    fixture.dispatch(SurfaceCommand::GotoRegion { index: -1 });
    fixture.dispatch(SurfaceCommand::GotoRegion { index: 9 });
    assert_eq!(fixture.host.cursor_position, 0.0);
}

#[test]
fn requests_reply_with_documents() {
    let mut fixture = Fixture::new();
    fixture.host.add_fx(fixture.track, "ReaEQ");

    match fixture.dispatch(SurfaceCommand::ReqState) {
        Some(SurfaceEvent::State(state)) => assert_eq!(state.tracks.len(), 1),
        other => panic!("expected state, got {other:?}"),
    }

    match fixture.dispatch(SurfaceCommand::ReqFxList { guid: fixture.guid.clone() }) {
        Some(SurfaceEvent::FxList(list)) => assert_eq!(list.fx[0].name, "ReaEQ"),
        other => panic!("expected fx list, got {other:?}"),
    }

    match fixture.dispatch(SurfaceCommand::ReqFxParams { guid:     fixture.guid.clone(),
                                                         fx_index: 0, })
    {
        Some(SurfaceEvent::FxParams(params)) => assert_eq!(params.params.len(), 1),
        other => panic!("expected fx params, got {other:?}"),
    }

    assert!(matches!(fixture.dispatch(SurfaceCommand::ReqRegions), Some(SurfaceEvent::Regions(_))));
}

#[test]
fn requests_for_unknown_tracks_reply_empty() {
    let mut fixture = Fixture::new();
    let stranger = TrackGuid::new("{DEADBEEF-0000-0000-0000-000000000000}");

    match fixture.dispatch(SurfaceCommand::ReqFxList { guid: stranger.clone() }) {
        Some(SurfaceEvent::FxList(list)) => {
            assert_eq!(list.guid, stranger);
            assert!(list.fx.is_empty());
        }
        other => panic!("expected fx list, got {other:?}"),
    }

    match fixture.dispatch(SurfaceCommand::ReqFxParams { guid:     stranger,
                                                         fx_index: 2, })
    {
        Some(SurfaceEvent::FxParams(params)) => {
            assert_eq!(params.fx_index, 2);
            assert!(params.params.is_empty());
        }
        other => panic!("expected fx params, got {other:?}"),
    }
}

#[test]
fn effect_chain_edits() {
    let mut fixture = Fixture::new();
    for name in ["EQ", "Comp", "Limiter"] {
        fixture.host.add_fx(fixture.track, name);
    }
    let guid = fixture.guid.clone();

    fixture.dispatch(SurfaceCommand::MoveFx { guid: guid.clone(),
                                              from: 2,
                                              to:   0, });
    assert_eq!(fixture.fx_names(), vec!["Limiter", "EQ", "Comp"]);

    fixture.dispatch(SurfaceCommand::DeleteFx { guid: guid.clone(),
                                                index: 1, });
    assert_eq!(fixture.fx_names(), vec!["Limiter", "Comp"]);

    fixture.dispatch(SurfaceCommand::SetFxAllEnabled { guid: guid.clone(),
                                                       enabled: false, });
    fixture.dispatch(SurfaceCommand::SetFxEnabled { guid: guid.clone(),
                                                    index: 1,
                                                    enabled: true, });
    let enabled = fixture.host
                         .track_data(fixture.track)
                         .map(|data| data.fx.iter().map(|fx| fx.enabled).collect::<Vec<_>>())
                         .unwrap_or_default();
    assert_eq!(enabled, vec![false, true]);

    fixture.dispatch(SurfaceCommand::SetFxParam { guid: guid.clone(),
                                                  fx_index: 0,
                                                  param: 0,
                                                  value: 1.5, });
    let value = fixture.host.track_data(fixture.track).map(|data| data.fx[0].params[0].value);
    assert_eq!(value, Some(1.0));

    fixture.dispatch(SurfaceCommand::ShowFxChain { guid });
    assert_eq!(fixture.host.shown_fx_chains, vec![fixture.track]);
}

#[test]
fn add_fx_stops_at_first_candidate_that_instantiates() {
    let mut fixture = Fixture::new();
    fixture.host.catalog = vec!["Comp B".to_owned(), "Comp C".to_owned()];

    let reply = fixture.dispatch(SurfaceCommand::AddFx { guid: fixture.guid.clone(),
                                                         name: "Comp A||Comp B||Comp C".to_owned(), });

    assert_eq!(fixture.fx_names(), vec!["Comp B"]);
    match reply {
        Some(SurfaceEvent::FxList(list)) => {
            assert_eq!(list.guid, fixture.guid);
            assert_eq!(list.fx.len(), 1);
            assert_eq!(list.fx[0].name, "Comp B");
        }
        other => panic!("expected fx list, got {other:?}"),
    }
}

#[test]
fn add_fx_duplicates_an_existing_instance_when_add_by_name_is_inert() {
    let mut fixture = Fixture::new();
    fixture.host.add_by_name_works = false;
    fixture.host.add_fx(fixture.track, "VST3: Pro-Q 3 (FabFilter)");
    fixture.host.add_fx(fixture.track, "JS: Volume Adjustment");

    fixture.dispatch(SurfaceCommand::AddFx { guid: fixture.guid.clone(),
                                             name: "Missing Plugin||vst3:pro-q 3".to_owned(), });

    assert_eq!(fixture.fx_names(),
               vec!["VST3: Pro-Q 3 (FabFilter)", "JS: Volume Adjustment", "VST3: Pro-Q 3 (FabFilter)"]);
}

#[test]
fn add_fx_replies_even_when_nothing_matches() {
    let mut fixture = Fixture::new();

    let reply = fixture.dispatch(SurfaceCommand::AddFx { guid: fixture.guid.clone(),
                                                         name: "Nope||Also Nope".to_owned(), });

    assert!(fixture.fx_names().is_empty());
    assert!(matches!(reply, Some(SurfaceEvent::FxList(list)) if list.fx.is_empty()));
    assert_eq!(fixture.dispatch(SurfaceCommand::AddFx { guid: fixture.guid.clone(),
                                                        name: "  ".to_owned(), }),
               None);
}

#[test]
fn rename_skips_master_and_blank_names() {
    let mut fixture = Fixture::new();

    fixture.dispatch(SurfaceCommand::RenameTrack { guid: fixture.guid.clone(),
                                                   name: "  Lead Vox ".to_owned(), });
    fixture.dispatch(SurfaceCommand::RenameTrack { guid: fixture.guid.clone(),
                                                   name: String::new(), });
    fixture.dispatch(SurfaceCommand::RenameTrack { guid: TrackGuid::master(),
                                                   name: "Main".to_owned(), });

    assert_eq!(fixture.host.track_data(fixture.track).map(|data| data.name.as_str()), Some("Lead Vox"));
    assert_eq!(fixture.host.track_data(MASTER_HANDLE).map(|data| data.name.as_str()), Some("MASTER"));
}

#[test]
fn track_values_can_be_seeded() {
    let mut fixture = Fixture::new();
    if let Some(data) = fixture.host.track_mut(fixture.track) {
        data.values = hashmap! {
            TrackAttribute::Volume => 0.5,
            TrackAttribute::Mute => 1.0,
        };
    }

    fixture.dispatch(SurfaceCommand::SetMute { guid: fixture.guid.clone(),
                                               mute: false, });

    assert_eq!(fixture.value(TrackAttribute::Volume), 0.5);
    assert_eq!(fixture.value(TrackAttribute::Mute), 0.0);
}

#[test]
fn unknown_commands_are_ignored() {
    let mut fixture = Fixture::new();

    assert_eq!(fixture.dispatch_json(json!({"type": "fromTheFuture", "guid": fixture.guid})), None);
    assert_eq!(fixture.value(TrackAttribute::Volume), 1.0);
}

#[test]
fn candidate_names_are_split_and_normalized() {
    assert_eq!(split_candidates(" Comp A || ||Comp B"), vec!["Comp A", "Comp B"]);
    assert!(split_candidates("||").is_empty());

    assert_eq!(normalize_fx_name("VST3: Pro-Q 3 (FabFilter)"), "pro-q 3 (fabfilter)");
    assert_eq!(normalize_fx_name("JS: Volume"), "volume");
    assert_eq!(normalize_fx_name("CLAPi: Surge XT"), "surge xt");
    assert_eq!(normalize_fx_name("ReaEQ"), "reaeq");
}
