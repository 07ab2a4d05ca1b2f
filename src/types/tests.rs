use super::*;
use crate::error::ConfigError;

// --- config.rs tests ---

#[test]
fn test_talker_config_defaults() {
    let config = TalkerStreamConfig::default();

    assert_eq!(config.num_channels, 2);
    assert_eq!(config.sample_rate, 48_000);
    assert_eq!(config.presentation_delay_ns, 2_000_000);
    assert_eq!(config.vlan, 2);
    assert_eq!(config.samples_per_packet(), 6);
    assert!(config.validate().is_ok());
}

#[test]
fn test_talker_config_builder() {
    let config = TalkerStreamConfig::builder()
        .destination(MacAddress([0x91, 0xE0, 0xF0, 0x00, 0xFE, 0x00]))
        .stream_id(0x0011_2233_4455_0001)
        .map(vec![3, 2, 1, 0])
        .sample_rate(96_000)
        .presentation_delay_ns(1_000_000)
        .build();

    assert_eq!(config.num_channels, 4);
    assert_eq!(config.map, vec![3, 2, 1, 0]);
    assert_eq!(config.samples_per_packet(), 12);
    assert!(config.destination.is_multicast());
    assert!(config.validate().is_ok());
}

#[test]
fn test_samples_per_packet_rounds_up() {
    let config = TalkerStreamConfig::builder().sample_rate(44_100).build();
    assert_eq!(config.samples_per_packet(), 6);

    let config = TalkerStreamConfig::builder().sample_rate(192_000).build();
    assert_eq!(config.samples_per_packet(), 24);
}

#[test]
fn test_talker_config_rejects_bad_rate() {
    let config = TalkerStreamConfig::builder().sample_rate(22_050).build();
    assert_eq!(
        config.validate(),
        Err(ConfigError::UnsupportedSampleRate(22_050))
    );
}

#[test]
fn test_talker_config_rejects_channel_counts() {
    let config = TalkerStreamConfig::builder().channels(0).build();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidChannelCount { count: 0, .. })
    ));

    let config = TalkerStreamConfig::builder().channels(9).build();
    assert!(config.validate().is_err());

    let mut config = TalkerStreamConfig::default();
    config.map.push(2);
    assert_eq!(
        config.validate(),
        Err(ConfigError::InvalidChannelMap {
            entries: 3,
            channels: 2
        })
    );
}

#[test]
fn test_talker_config_rejects_wide_vlan() {
    let config = TalkerStreamConfig::builder().vlan(0x1000).build();
    assert_eq!(config.validate(), Err(ConfigError::InvalidVlan(0x1000)));
}

#[test]
fn test_listener_config_validate() {
    let config = ListenerStreamConfig::aaf(8, ChannelMap::identity(8));
    assert!(config.validate().is_ok());

    let config = ListenerStreamConfig::aaf(2, ChannelMap::identity(9));
    assert!(config.validate().is_err());
}

#[test]
fn test_listener_config_from_json() {
    let json = r#"{"format":"iec61883_6","num_channels":2,"map":[4,null]}"#;
    let config: ListenerStreamConfig = serde_json::from_str(json).unwrap();

    assert_eq!(config.format, StreamFormat::Iec61883_6);
    assert_eq!(config.num_channels, 2);
    assert_eq!(config.map.sink(0), Some(SinkId(4)));
    assert_eq!(config.map.sink(1), None);
}

#[test]
fn test_talker_config_json_defaults() {
    let config: TalkerStreamConfig = serde_json::from_str(r#"{"stream_id":7}"#).unwrap();
    assert_eq!(config.stream_id, 7);
    assert_eq!(config.sample_rate, 48_000);
}

// --- mod.rs tests ---

#[test]
fn test_channel_map_from_raw() {
    let map = ChannelMap::from_raw(&[0, -1, 5]);

    assert_eq!(map.len(), 3);
    assert_eq!(map.sink(0), Some(SinkId(0)));
    assert_eq!(map.sink(1), None);
    assert_eq!(map.sink(2), Some(SinkId(5)));
    assert_eq!(map.sink(3), None);
}

#[test]
fn test_channel_map_mapped_limits_channels() {
    let map = ChannelMap::from_raw(&[1, -1, 2, 3]);
    let mapped: Vec<_> = map.mapped(3).collect();

    assert_eq!(mapped, vec![(0, SinkId(1)), (2, SinkId(2))]);
}

#[test]
fn test_mac_display() {
    let mac = MacAddress([0x00, 0x22, 0x97, 0x0A, 0xBC, 0xFF]);
    assert_eq!(mac.to_string(), "00:22:97:0a:bc:ff");
    assert!(!mac.is_multicast());
}
