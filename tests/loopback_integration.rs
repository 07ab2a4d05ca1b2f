//! Talker to listener over an in-memory link

mod common;

use avb1722::listener::LOCK_THRESHOLD;
use avb1722::testing::{NetworkSimulator, RecordingSink, SinkEvent, offset_translator, sample_value};
use avb1722::{
    ChannelMap, Listener, ListenerStreamConfig, LockState, PacketDisposition, SinkId, StreamHandle,
    TalkerStreamConfig,
};
use common::{init_logging, run_talker, streaming_talker};

const STREAM: StreamHandle = StreamHandle(1);

fn listener(channels: usize) -> Listener {
    let mut listener = Listener::new();
    listener
        .configure_stream(
            STREAM,
            ListenerStreamConfig::aaf(channels, ChannelMap::identity(channels)),
        )
        .unwrap();
    listener
}

#[test]
fn test_stereo_loopback() {
    init_logging();

    let mut talker = streaming_talker(STREAM, TalkerStreamConfig::builder().channels(2).build());
    let packets = run_talker(&mut talker, STREAM, 20 * 6, 2, &offset_translator(0));
    assert_eq!(packets.len(), 20);
    assert_eq!(talker.counters().sent_1722, 20);

    let mut listener = listener(2);
    let mut sink = RecordingSink::new();
    let dispositions: Vec<_> = packets
        .iter()
        .map(|p| listener.process_packet(STREAM, p, &mut sink).unwrap())
        .collect();

    let lock_index = LOCK_THRESHOLD as usize - 1;
    assert_eq!(
        dispositions[lock_index],
        PacketDisposition::Locked { rate: 48_000 }
    );
    let acquiring = |d: &PacketDisposition| matches!(d, PacketDisposition::Acquiring { .. });
    assert!(dispositions[..lock_index].iter().all(acquiring));
    let delivered = PacketDisposition::Delivered { frames: 6 };
    let steady = &dispositions[lock_index + 1..];
    assert!(steady.iter().all(|d| *d == delivered));

    // Packets 16..20 carry frames 96..120
    let expected: Vec<u32> = (96..120).map(|f| sample_value(f, 0)).collect();
    assert_eq!(sink.samples(SinkId(0)), expected.as_slice());
    let expected: Vec<u32> = (96..120).map(|f| sample_value(f, 1)).collect();
    assert_eq!(sink.samples(SinkId(1)), expected.as_slice());

    let stream = listener.stream(STREAM).unwrap();
    assert_eq!(stream.lock_state(), LockState::Locked);
    assert_eq!(stream.frames_per_packet(), 6);
    assert_eq!(stream.last_sequence(), Some(19));
    assert_eq!(listener.counters().received_1722, 20);
    assert_eq!(listener.counters().rejected, 0);
}

#[test]
fn test_presentation_times_reach_sinks() {
    init_logging();

    let mut talker = streaming_talker(
        STREAM,
        TalkerStreamConfig::builder()
            .channels(1)
            .presentation_delay_ns(1_000_000)
            .build(),
    );
    let translator = |local_ts: u32| local_ts.wrapping_mul(10);
    let packets = run_talker(&mut talker, STREAM, 18 * 6, 1, &translator);

    let mut listener = listener(1);
    let mut sink = RecordingSink::new();
    for packet in &packets {
        listener.process_packet(STREAM, packet, &mut sink).unwrap();
    }

    // Each packet is stamped from its last frame: frames 101 and 107
    let stamp = |frame: u32| frame * common::TICKS_PER_FRAME * 10 + 1_000_000;
    assert_eq!(sink.timestamps(SinkId(0)), vec![stamp(101), stamp(107)]);
    assert_eq!(sink.maintain_count(SinkId(0)), 2);
}

#[test]
fn test_swapped_channel_maps() {
    init_logging();

    let config = TalkerStreamConfig::builder().map(vec![1, 0]).build();
    let mut talker = streaming_talker(STREAM, config);
    let packets = run_talker(&mut talker, STREAM, 17 * 6, 2, &offset_translator(0));

    let mut listener = Listener::new();
    listener
        .configure_stream(
            STREAM,
            ListenerStreamConfig::aaf(2, ChannelMap::new(vec![None, Some(SinkId(7))])),
        )
        .unwrap();
    let mut sink = RecordingSink::new();
    for packet in &packets {
        listener.process_packet(STREAM, packet, &mut sink).unwrap();
    }

    // Stream channel 1 carries frame slot 0
    let expected: Vec<u32> = (96..102).map(|f| sample_value(f, 0)).collect();
    assert_eq!(sink.samples(SinkId(7)), expected.as_slice());
    assert!(sink.samples(SinkId(0)).is_empty());
}

#[test]
fn test_talker_restart_does_not_break_lock() {
    init_logging();

    let mut talker = streaming_talker(STREAM, TalkerStreamConfig::builder().channels(2).build());
    let mut listener = listener(2);
    let mut sink = RecordingSink::new();

    for packet in run_talker(&mut talker, STREAM, 20 * 6, 2, &offset_translator(0)) {
        listener.process_packet(STREAM, &packet, &mut sink).unwrap();
    }
    talker.stop_stream(STREAM).unwrap();
    talker.start_stream(STREAM).unwrap();
    for packet in run_talker(&mut talker, STREAM, 4 * 6, 2, &offset_translator(0)) {
        assert!(listener
            .process_packet(STREAM, &packet, &mut sink)
            .unwrap()
            .is_delivered());
    }

    assert_eq!(listener.stream(STREAM).unwrap().stats().relocks, 0);
    assert_eq!(sink.samples(SinkId(0)).len(), 8 * 6);
}

#[test]
fn test_lossy_link_keeps_payload_integrity() {
    init_logging();

    let mut talker = streaming_talker(STREAM, TalkerStreamConfig::builder().channels(2).build());
    let packets = run_talker(&mut talker, STREAM, 400 * 6, 2, &offset_translator(0));

    let mut link = NetworkSimulator::stress_test(0x1722);
    let received = link.transmit(packets);

    let mut listener = listener(2);
    let mut sink = RecordingSink::new();
    for packet in &received {
        listener.process_packet(STREAM, packet, &mut sink).unwrap();
    }

    let stream = listener.stream(STREAM).unwrap();
    assert_eq!(stream.lock_state(), LockState::Locked);
    assert_eq!(stream.stats().relocks, 0);
    assert_eq!(stream.stats().rejected, 0);
    assert!(stream.sequence().stats().total_gaps > 0);

    // Whatever arrived, each push is one whole packet of consecutive frames
    let pushes: Vec<&Vec<u32>> = sink
        .events()
        .iter()
        .filter_map(|event| match event {
            SinkEvent::Push { sink, samples } if *sink == SinkId(1) => Some(samples),
            _ => None,
        })
        .collect();
    assert!(!pushes.is_empty());
    for samples in pushes {
        assert_eq!(samples.len(), 6);
        let first = samples[0] & 0x00FF_FFFF;
        assert_eq!(first % 6, 0);
        for (i, sample) in samples.iter().enumerate() {
            assert_eq!(*sample, sample_value(first as usize + i, 1));
        }
    }
}
