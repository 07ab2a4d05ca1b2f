use crate::listener::{LOCK_THRESHOLD, ListenerStream, LockState, PacketDisposition};
use crate::protocol::avbtp::AvbtpDecodeError;
use crate::testing::{Iec61883PacketBuilder, RecordingSink, sample_value};
use crate::types::{ChannelMap, ListenerStreamConfig, SinkId, StreamFormat, StreamHandle};

fn stream(channels: usize) -> ListenerStream {
    ListenerStream::new(
        StreamHandle(2),
        ListenerStreamConfig::aaf(channels, ChannelMap::identity(channels))
            .format(StreamFormat::Iec61883_6),
    )
}

#[allow(clippy::cast_possible_truncation)]
fn packet(channels: usize, blocks: usize, index: usize) -> Vec<u8> {
    Iec61883PacketBuilder::new(channels, blocks)
        .dbc((index * blocks) as u8)
        .sequence(index as u8)
        .build()
}

/// Packets needed to lock: one to seed the DBC, then the threshold
fn lock(
    stream: &mut ListenerStream,
    sink: &mut RecordingSink,
    channels: usize,
    blocks: usize,
) -> usize {
    let count = LOCK_THRESHOLD as usize + 1;
    for i in 0..count {
        stream.process_packet(&packet(channels, blocks, i), sink);
    }
    count
}

#[test]
fn test_first_packet_only_seeds() {
    let mut stream = stream(2);
    let mut sink = RecordingSink::new();

    assert_eq!(
        stream.process_packet(&packet(2, 6, 0), &mut sink),
        PacketDisposition::Acquiring { chan_lock: 0 }
    );
    assert_eq!(
        stream.process_packet(&packet(2, 6, 1), &mut sink),
        PacketDisposition::Acquiring { chan_lock: 1 }
    );
}

#[test]
fn test_block_counts_map_to_rates() {
    for (blocks, rate) in [(6, 48_000), (12, 96_000), (24, 192_000)] {
        let mut stream = stream(2);
        let mut sink = RecordingSink::new();
        lock(&mut stream, &mut sink, 2, blocks);

        assert_eq!(stream.lock_state(), LockState::Locked);
        assert_eq!(stream.rate(), rate, "{blocks} blocks");
        assert_eq!(stream.frames_per_packet(), blocks);
        assert_eq!(stream.num_channels_in_payload(), 2);
    }
}

#[test]
fn test_channels_inferred_from_dbc() {
    let mut stream = stream(8);
    let mut sink = RecordingSink::new();
    lock(&mut stream, &mut sink, 8, 6);

    assert_eq!(stream.num_channels_in_payload(), 8);
    assert_eq!(stream.rate(), 48_000);
}

#[test]
fn test_locked_delivery_uses_payload_stride() {
    let mut stream = stream(2);
    let mut sink = RecordingSink::new();
    let next = lock(&mut stream, &mut sink, 4, 6);

    assert_eq!(
        stream.process_packet(&packet(4, 6, next), &mut sink),
        PacketDisposition::Delivered { frames: 6 }
    );

    let expected: Vec<u32> = (0..6).map(|f| sample_value(f, 1)).collect();
    assert_eq!(sink.samples(SinkId(1)), expected.as_slice());
    // Only the configured channels are delivered
    assert!(sink.samples(SinkId(2)).is_empty());
}

#[test]
fn test_timestamp_forwarded() {
    let mut stream = stream(2);
    let mut sink = RecordingSink::new();
    let next = lock(&mut stream, &mut sink, 2, 6);

    #[allow(clippy::cast_possible_truncation)]
    let frame = Iec61883PacketBuilder::new(2, 6)
        .dbc((next * 6) as u8)
        .timestamp(1234)
        .build();
    stream.process_packet(&frame, &mut sink);

    assert_eq!(sink.timestamps(SinkId(0)), vec![1234]);
    assert_eq!(sink.timestamps(SinkId(1)), vec![1234]);
}

#[test]
fn test_missing_cip_header_rejected() {
    let mut stream = stream(2);
    let mut sink = RecordingSink::new();
    let frame = packet(2, 6, 0);

    // One byte of payload: enough for the frame, not for the CIP header
    let truncated = &frame[..18 + 24 + 1];
    assert!(matches!(
        stream.process_packet(truncated, &mut sink),
        PacketDisposition::Rejected(AvbtpDecodeError::TooShort { .. })
    ));
}
