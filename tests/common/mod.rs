//! Common test utilities and fixtures
#![allow(dead_code)]

use std::sync::Once;

use avb1722::testing::sample_value;
use avb1722::{AudioFrame, StreamHandle, Talker, TalkerStreamConfig};
use tracing_subscriber::{EnvFilter, fmt};

static INIT: Once = Once::new();

/// Initialize test logging (call once per test module)
pub fn init_logging() {
    INIT.call_once(|| {
        let filter = EnvFilter::from_default_env().add_directive("avb1722=debug".parse().unwrap());

        fmt().with_env_filter(filter).with_test_writer().init();
    });
}

/// Local timer ticks per 48 kHz frame at 100 MHz
pub const TICKS_PER_FRAME: u32 = 2_083;

/// Streaming talker with one stream at `handle`
pub fn streaming_talker(handle: StreamHandle, config: TalkerStreamConfig) -> Talker {
    let mut talker = Talker::new();
    talker.configure_stream(handle, config).unwrap();
    talker.start_stream(handle).unwrap();
    talker
}

/// Feed `frames` recognisable frames of `slots` slots and collect the packets
pub fn run_talker<P: avb1722::PtpTranslator>(
    talker: &mut Talker,
    handle: StreamHandle,
    frames: usize,
    slots: usize,
    translator: &P,
) -> Vec<Vec<u8>> {
    let mut packets = Vec::new();
    let mut samples = vec![0u32; slots];
    for frame in 0..frames {
        for (slot, sample) in samples.iter_mut().enumerate() {
            *sample = sample_value(frame, slot);
        }
        let local_ts = u32::try_from(frame).unwrap() * TICKS_PER_FRAME;
        let audio = AudioFrame::new(&samples, local_ts);
        if let Some(packet) = talker.build(handle, &audio, translator).unwrap() {
            packets.push(packet.to_vec());
        }
    }
    packets
}
