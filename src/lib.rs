//! # avb1722
//!
//! IEEE 1722 (AVBTP) audio transport for AVB endpoints, with media clock
//! recovery.
//!
//! ## Features
//!
//! - AAF, IEC 61883-6 and CRF stream decoding with lock acquisition
//! - AAF talker packetisation with presentation timestamps
//! - PI media clock recovery driven by FIFO observations
//!
//! ## Example
//!
//! ```rust
//! use avb1722::prelude::*;
//! use avb1722::testing::{AafPacketBuilder, RecordingSink};
//!
//! # fn example() -> avb1722::Result<()> {
//! let mut listener = Listener::new();
//! let stream = StreamHandle(0);
//! listener.configure_stream(stream, ListenerStreamConfig::aaf(2, ChannelMap::identity(2)))?;
//!
//! let mut sink = RecordingSink::default();
//! let packet = AafPacketBuilder::new().build();
//! for _ in 0..17 {
//!     listener.process_packet(stream, &packet, &mut sink)?;
//! }
//! assert_eq!(sink.samples(SinkId(0)).len(), 6);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! # Architecture
//!
//! - **Wire format**: [`protocol::avbtp`] - byte views over 1722 frames
//! - **Paths**: [`Listener`] and [`Talker`] - per-stream packet state
//! - **Timing**: [`MediaClocks`] - sample period recovery

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Public modules
/// Error types
pub mod error;
/// Core types
pub mod types;

/// Testing utilities
pub mod testing;

pub mod listener;
pub mod media_clock;
pub mod protocol;
pub mod ptp;
pub mod talker;


// Re-exports
pub use error::{Avb1722Error, ConfigError, Result};
pub use listener::{
    AudioSink, Listener, ListenerStream, LockState, PacketDisposition, StridedSamples,
};
pub use media_clock::{
    ClockType, MediaClockError, MediaClockRecovery, MediaClocks, RecoveryConfig, StreamObservation,
};
pub use ptp::{PtpTimeInfo, PtpTranslator};
pub use talker::{AudioFrame, Talker, TalkerStream};
pub use types::{
    ChannelMap, ListenerStreamConfig, MacAddress, SinkId, StreamFormat, StreamHandle,
    TalkerStreamConfig,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude for common imports
///
/// Convenient re-exports
pub mod prelude {
    pub use crate::{
        AudioFrame, AudioSink, Avb1722Error, ChannelMap, ClockType, Listener, ListenerStreamConfig,
        MacAddress, MediaClocks, PacketDisposition, PtpTranslator, SinkId, StreamFormat,
        StreamHandle, StreamObservation, Talker, TalkerStreamConfig,
    };
}
