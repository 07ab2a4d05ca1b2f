mod iec61883;

use super::{LOCK_THRESHOLD, ListenerStream, PacketDisposition};
use crate::testing::{AafPacketBuilder, RecordingSink};

/// Feed exactly enough consistent packets to lock, returning the next sequence
fn lock_aaf(
    stream: &mut ListenerStream,
    sink: &mut RecordingSink,
    builder: &AafPacketBuilder,
) -> u8 {
    let mut seq = 0u8;
    for _ in 0..LOCK_THRESHOLD {
        let frame = builder.clone().sequence(seq).build();
        stream.process_packet(&frame, sink);
        seq = seq.wrapping_add(1);
    }
    seq
}

fn is_acquiring(disposition: PacketDisposition) -> bool {
    matches!(disposition, PacketDisposition::Acquiring { .. })
}
