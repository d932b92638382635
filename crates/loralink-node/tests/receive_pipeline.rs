//! End-to-end tests of a master and a scripted client sharing an in-memory
//! radio channel.

use loralink_frame::{encode_frame, FrameError, BROADCAST_ADDRESS};
use loralink_node::{
    route, Dispatcher, Disposition, DuplicateKey, LinkConfig, LinkQuality, MemoryRadio, Radio,
    RouteDecision,
};
use loralink_telemetry::{Field, ParseError, TelemetryRecord};

const CLIENT: u8 = 2;

fn inverter_report() -> TelemetryRecord {
    TelemetryRecord::new(
        "tiny32-AB12CD",
        "1.0",
        "inverter",
        [220.5, 5.2, 1150.0, 49.9, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    )
}

/// A client sending frames to the master at address 1.
struct Client {
    radio: MemoryRadio,
    session: Dispatcher,
}

impl Client {
    fn new(radio: MemoryRadio) -> Self {
        let config = LinkConfig {
            local_address: CLIENT,
            ..Default::default()
        };
        Client {
            radio,
            session: Dispatcher::new(config),
        }
    }

    fn report(&mut self, record: &TelemetryRecord) -> u8 {
        self.session
            .send(&mut self.radio, &record.to_payload(), 1)
            .unwrap()
    }

    fn raw(&mut self, bytes: Vec<u8>) {
        self.radio.transmit(&bytes).unwrap();
    }
}

fn setup() -> (Dispatcher, MemoryRadio, Client) {
    let (master_radio, client_radio) = MemoryRadio::pair();
    let master_radio = master_radio.with_quality(LinkQuality {
        rssi_dbm: -72,
        snr_db: 9.75,
    });
    (
        Dispatcher::new(LinkConfig::default()),
        master_radio,
        Client::new(client_radio),
    )
}

#[test]
fn test_client_report_reaches_master() {
    let (mut master, mut radio, mut client) = setup();

    let sequence = client.report(&inverter_report());
    let disposition = master.poll(&mut radio).unwrap();

    assert_eq!(disposition, Disposition::Accepted { sender: CLIENT, sequence });
    assert_eq!(master.telemetry(), Some(&inverter_report()));
}

#[test]
fn test_spec_example_payload() {
    let (mut master, mut radio, mut client) = setup();
    client.raw(
        encode_frame(
            1,
            CLIENT,
            0,
            br#"{"id":"X1","fw":"2.0","topic":"t",1,2,3,4,5,6,7,8,9,10}"#,
        )
        .unwrap(),
    );

    assert!(master.poll(&mut radio).unwrap().is_accepted());
    let record = master.telemetry().unwrap();
    assert_eq!(record.id, "X1");
    assert_eq!(record.firmware_version, "2.0");
    assert_eq!(record.topic, "t");
    for n in 1..=10 {
        assert_eq!(record.param(n), Some(n as f32));
    }
}

#[test]
fn test_retransmission_suppressed() {
    let (mut master, mut radio, mut client) = setup();
    let frame = encode_frame(1, 3, 7, inverter_report().to_payload().as_bytes()).unwrap();

    client.raw(frame.clone());
    client.raw(frame);
    client.raw(encode_frame(1, 3, 8, inverter_report().to_payload().as_bytes()).unwrap());

    assert!(master.poll(&mut radio).unwrap().is_accepted());
    assert_eq!(
        master.poll(&mut radio).unwrap(),
        Disposition::Duplicate { sender: 3, sequence: 7 }
    );
    assert!(master.poll(&mut radio).unwrap().is_accepted());
}

#[test]
fn test_single_slot_filter_misses_interleaved_repeat() {
    let (mut master, mut radio, mut client) = setup();
    let payload = inverter_report().to_payload();

    client.raw(encode_frame(1, 3, 7, payload.as_bytes()).unwrap());
    client.raw(encode_frame(1, 4, 7, payload.as_bytes()).unwrap());
    client.raw(encode_frame(1, 3, 7, payload.as_bytes()).unwrap());

    for _ in 0..3 {
        assert!(master.poll(&mut radio).unwrap().is_accepted());
    }
}

#[test]
fn test_malformed_frame_changes_nothing() {
    let (mut master, mut radio, mut client) = setup();
    client.report(&inverter_report());
    master.poll(&mut radio).unwrap();
    let filter_before = master.duplicate_filter().last_accepted();

    let mut short = vec![1, CLIENT, 42, 10];
    short.extend_from_slice(b"1234567");
    client.raw(short);
    client.raw(vec![1, CLIENT]);

    assert_eq!(
        master.poll(&mut radio).unwrap(),
        Disposition::Malformed(FrameError::LengthMismatch { declared: 10, actual: 7 })
    );
    assert!(matches!(
        master.poll(&mut radio).unwrap(),
        Disposition::Malformed(FrameError::TruncatedHeader { .. })
    ));
    assert_eq!(master.telemetry(), Some(&inverter_report()));
    assert_eq!(master.duplicate_filter().last_accepted(), filter_before);
    assert_eq!(
        filter_before,
        Some(DuplicateKey { sender: CLIENT, sequence: 0 })
    );
}

#[test]
fn test_frames_for_other_nodes_ignored() {
    let (mut master, mut radio, mut client) = setup();
    let payload = inverter_report().to_payload();

    client.raw(encode_frame(5, CLIENT, 1, payload.as_bytes()).unwrap());
    client.raw(encode_frame(BROADCAST_ADDRESS, CLIENT, 2, payload.as_bytes()).unwrap());

    assert_eq!(
        master.poll(&mut radio).unwrap(),
        Disposition::NotForMe { destination: 5 }
    );
    assert_eq!(
        master.poll(&mut radio).unwrap(),
        Disposition::NotForMe { destination: BROADCAST_ADDRESS }
    );
    assert!(master.telemetry().is_none());
}

#[test]
fn test_exact_match_routing() {
    assert_eq!(route(5, 5), RouteDecision::ForMe);
    for local in (0..=255u8).filter(|a| *a != 5) {
        assert_eq!(route(5, local), RouteDecision::NotForMe);
    }
}

#[test]
fn test_missing_marker_reports_field() {
    let (mut master, mut radio, mut client) = setup();
    client.report(&inverter_report());
    master.poll(&mut radio).unwrap();

    client.raw(
        encode_frame(1, CLIENT, 1, br#"{"id":"X1","topic":"t",1,2,3,4,5,6,7,8,9,10}"#).unwrap(),
    );
    match master.poll(&mut radio).unwrap() {
        Disposition::ParseFailed { error, .. } => {
            assert_eq!(error.field_name(), "fw");
            assert!(matches!(error, ParseError::MissingMarker { field: Field::Firmware, .. }));
        }
        other => panic!("Expected ParseFailed, got {:?}", other),
    }
    assert_eq!(master.telemetry(), Some(&inverter_report()));
}

#[test]
fn test_master_commands_reach_client() {
    let (mut master, mut radio, mut client) = setup();

    assert_eq!(master.send(&mut radio, "relay:on", CLIENT).unwrap(), 0);
    assert_eq!(master.send(&mut radio, "relay:off", CLIENT).unwrap(), 1);

    // Commands are not telemetry, so the client reports a parse failure
    for expected in [0, 1] {
        match client.session.poll(&mut client.radio).unwrap() {
            Disposition::ParseFailed { sender, .. } => assert_eq!(sender, 1),
            other => panic!("Expected ParseFailed for command {}, got {:?}", expected, other),
        }
    }
}

#[test]
fn test_sequence_wraps_over_hundred_sends() {
    let (mut master, mut radio, _client) = setup();

    for _ in 0..37 {
        master.send(&mut radio, "tick", CLIENT).unwrap();
    }
    let before = master.next_sequence();
    let mut seen = Vec::new();
    for _ in 0..100 {
        seen.push(master.send(&mut radio, "tick", CLIENT).unwrap());
    }

    assert_eq!(master.next_sequence(), before);
    assert!(seen.iter().all(|s| *s < 100));
    assert!(seen.windows(2).any(|w| w[0] == 99 && w[1] == 0));
}
