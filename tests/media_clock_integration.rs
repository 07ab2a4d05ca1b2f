//! Listener lock events and FIFO observations driving media clock recovery

mod common;

use avb1722::media_clock::RecoveryState;
use avb1722::testing::{RecordingSink, offset_translator};
use avb1722::{
    ChannelMap, ClockType, Listener, ListenerStreamConfig, MediaClocks, PacketDisposition,
    RecoveryConfig, SinkId, StreamHandle, StreamObservation, TalkerStreamConfig,
};
use common::{TICKS_PER_FRAME, init_logging, run_talker, streaming_talker};

const STREAM: StreamHandle = StreamHandle(0);
const CLOCK: u32 = 0;

/// Minimal FIFO: reports the newest presentation time as leaving `lateness_ns` late
struct Fifo {
    lateness_ns: u32,
    local_ts: u32,
}

impl Fifo {
    fn observation(&mut self, sink: &RecordingSink, locked: bool) -> StreamObservation {
        self.local_ts = self.local_ts.wrapping_add(6 * TICKS_PER_FRAME);
        let presentation_ts = sink.timestamps(SinkId(0)).last().copied().unwrap_or(0);
        StreamObservation {
            local_ts: self.local_ts,
            outgoing_ptp_ts: presentation_ts.wrapping_add(self.lateness_ns),
            presentation_ts,
            locked,
            fill: i32::try_from(sink.samples(SinkId(0)).len()).unwrap(),
        }
    }
}

fn run(lateness_ns: u32) -> MediaClocks {
    let mut talker = streaming_talker(STREAM, TalkerStreamConfig::builder().channels(2).build());
    let packets = run_talker(&mut talker, STREAM, 40 * 6, 2, &offset_translator(0));

    let mut listener = Listener::new();
    listener
        .configure_stream(
            STREAM,
            ListenerStreamConfig::aaf(2, ChannelMap::identity(2)),
        )
        .unwrap();
    let mut clocks = MediaClocks::new(RecoveryConfig::default());
    clocks.init(CLOCK, 48_000).unwrap();

    let mut sink = RecordingSink::new();
    let mut fifo = Fifo {
        lateness_ns,
        local_ts: 0,
    };
    for packet in &packets {
        match listener.process_packet(STREAM, packet, &mut sink).unwrap() {
            PacketDisposition::Locked { .. } => clocks.inform_of_lock(CLOCK).unwrap(),
            PacketDisposition::Delivered { .. } => {
                let observation = fifo.observation(&sink, true);
                clocks.observe(CLOCK, observation).unwrap();
            }
            _ => {}
        }
        clocks
            .compute(CLOCK, ClockType::InputStreamDerived)
            .unwrap();
    }
    clocks
}

#[test]
fn test_on_time_stream_stays_nominal() {
    init_logging();

    let clocks = run(0);
    let clock = clocks.get(CLOCK).unwrap();
    assert_eq!(clock.state(), RecoveryState::Tracking);
    assert_eq!(clock.wordlen(), clock.nominal_wordlen());
}

#[test]
fn test_late_stream_speeds_up_clock() {
    init_logging();

    let mut clocks = run(2_000);
    let clock = clocks.get(CLOCK).unwrap();
    assert_eq!(clock.state(), RecoveryState::Tracking);
    assert!(clock.wordlen() < clock.nominal_wordlen());
    assert!(clock.integral_error() > 0);

    let recovered = clocks
        .compute(CLOCK, ClockType::InputStreamDerived)
        .unwrap();
    let nominal = clocks.compute(CLOCK, ClockType::LocalClock).unwrap();
    assert!(recovered < nominal);
}

#[test]
fn test_stream_loss_returns_to_nominal() {
    init_logging();

    let mut clocks = run(2_000);
    let sink = RecordingSink::new();
    let mut fifo = Fifo {
        lateness_ns: 0,
        local_ts: 0,
    };
    let observation = fifo.observation(&sink, false);
    clocks.observe(CLOCK, observation).unwrap();
    let wordlen = clocks
        .compute(CLOCK, ClockType::InputStreamDerived)
        .unwrap();

    let clock = clocks.get(CLOCK).unwrap();
    assert_eq!(clock.state(), RecoveryState::Cold);
    let nominal = clocks.compute(CLOCK, ClockType::LocalClock).unwrap();
    assert_eq!(wordlen, nominal);
}
