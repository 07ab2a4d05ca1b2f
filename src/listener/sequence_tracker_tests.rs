use super::sequence_tracker::*;

#[test]
fn test_sequential_packets() {
    let mut tracker = SequenceTracker::new();

    assert!(tracker.record(100).is_none());
    assert!(tracker.record(101).is_none());
    assert!(tracker.record(102).is_none());

    assert_eq!(tracker.stats().packets_received, 3);
    assert_eq!(tracker.stats().total_gaps, 0);
    assert_eq!(tracker.last_sequence(), Some(102));
}

#[test]
fn test_single_gap_detected() {
    let mut tracker = SequenceTracker::new();

    let gaps: Vec<_> = [0u8, 1, 2, 4]
        .into_iter()
        .filter_map(|seq| tracker.record(seq))
        .collect();

    assert_eq!(
        gaps,
        vec![GapInfo {
            previous: 2,
            current: 4,
            lost: 1
        }]
    );
    assert_eq!(tracker.stats().total_gaps, 1);
    assert_eq!(tracker.stats().total_lost, 1);
}

#[test]
fn test_wraparound() {
    let mut tracker = SequenceTracker::new();

    for seq in [253u8, 254, 255, 0] {
        assert!(tracker.record(seq).is_none());
    }
    assert_eq!(tracker.stats().total_gaps, 0);
}

#[test]
fn test_repeat_is_gap_without_loss() {
    let mut tracker = SequenceTracker::new();

    tracker.record(7);
    let gap = tracker.record(7).unwrap();

    assert_eq!(gap.lost, 0);
    assert_eq!(tracker.stats().total_gaps, 1);
    assert_eq!(tracker.stats().total_lost, 0);
}

#[test]
fn test_gap_history_bounded() {
    let mut tracker = SequenceTracker::new();

    let mut seq = 0u8;
    for _ in 0..(SequenceTracker::DEFAULT_HISTORY + 4) {
        tracker.record(seq);
        seq = seq.wrapping_add(2);
    }

    assert_eq!(
        tracker.recent_gaps().count(),
        SequenceTracker::DEFAULT_HISTORY
    );
}

#[test]
fn test_loss_ratio_and_reset() {
    let mut tracker = SequenceTracker::new();

    tracker.record(10);
    tracker.record(15); // 11..=14 lost
    // Received 2, lost 4: 4 / 6
    assert!((tracker.loss_ratio() - 0.666).abs() < 0.01);

    tracker.reset();
    assert_eq!(tracker.stats().packets_received, 0);
    assert!(tracker.record(99).is_none());
}
