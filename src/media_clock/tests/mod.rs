
use super::StreamObservation;

/// Locked observation at local time `local_ts` whose sample left `error_ns`
/// after its presentation time
#[allow(clippy::cast_sign_loss)]
fn observation(local_ts: u32, error_ns: i32) -> StreamObservation {
    let presentation_ts = 0x4000_0000u32.wrapping_add(local_ts.wrapping_mul(10));
    StreamObservation {
        local_ts,
        outgoing_ptp_ts: presentation_ts.wrapping_add(error_ns as u32),
        presentation_ts,
        locked: true,
        fill: 0,
    }
}

fn unlocked(local_ts: u32) -> StreamObservation {
    StreamObservation {
        locked: false,
        ..observation(local_ts, 0)
    }
}
