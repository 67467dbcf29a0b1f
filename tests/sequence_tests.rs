//! Integration tests for ChaseSequence and DimSequence

mod common;
use common::*;

use ac_chaser::patterns::{BUILTIN_DIM_TABLES, CHASE_PATTERNS};
use ac_chaser::{ChannelRamp, ChaseSequence, DimSequence, DimStep, Error, SequenceStore};

#[test]
fn chase_rejects_empty_pattern_list() {
    let result = ChaseSequence::new(&[]);
    assert!(matches!(result, Err(Error::EmptySequence)));
}

#[test]
fn chase_pattern_lookup_wraps_to_first_step() {
    let seq = ChaseSequence::new(leak_patterns(&[0x01, 0x80])).unwrap();
    assert_eq!(seq.len(), 2);
    assert_eq!(seq.pattern(1), 0x80);
    assert_eq!(seq.pattern(2), 0x01);
}

#[test]
fn every_compiled_in_chase_is_selectable() {
    let store = SequenceStore::<1>::new();
    for (id, patterns) in CHASE_PATTERNS.iter().enumerate() {
        let seq = store.select_chase(id as u8).unwrap();
        assert_eq!(seq.patterns(), *patterns);
    }
}

#[test]
fn builder_rejects_empty_sequence() {
    let result = DimSequence::<8>::builder().build();
    assert!(matches!(result, Err(Error::EmptySequence)));
}

#[test]
fn builder_rejects_zero_duration() {
    let result = DimSequence::<8>::builder()
        .push(DimStep::uniform(0, 0, 255))
        .unwrap()
        .build();
    assert!(matches!(result, Err(Error::ZeroDuration)));
}

#[test]
fn builder_rejects_too_many_steps() {
    let result = DimSequence::<2>::builder()
        .push(DimStep::uniform(1, 0, 0))
        .unwrap()
        .push(DimStep::uniform(1, 0, 0))
        .unwrap()
        .push(DimStep::uniform(1, 0, 0));
    assert!(matches!(result, Err(Error::CapacityExceeded)));
}

#[test]
fn builder_keeps_step_order() {
    let mut channels = [ChannelRamp::hold(10); 8];
    channels[5] = ChannelRamp::new(200, 20);

    let seq = DimSequence::<4>::builder()
        .push(DimStep::uniform(5, 0, 255))
        .unwrap()
        .step(7, channels)
        .unwrap()
        .build()
        .unwrap();

    assert_eq!(seq.len(), 2);
    assert_eq!(seq.get_step(0).unwrap().duration_ticks, 5);
    let second = seq.get_step(1).unwrap();
    assert_eq!(second.duration_ticks, 7);
    assert_eq!(second.channels[5], ChannelRamp::new(200, 20));
    assert_eq!(second.channels[4], ChannelRamp::hold(10));
    assert!(seq.get_step(2).is_none());
}

#[test]
fn compiled_in_dim_tables_fit_default_capacity() {
    for table in BUILTIN_DIM_TABLES {
        let seq = DimSequence::<8>::from_steps(table).unwrap();
        assert_eq!(seq.steps(), table);
    }
}

#[test]
fn from_steps_reports_capacity() {
    let steps = [DimStep::uniform(1, 0, 0); 3];
    assert_eq!(DimSequence::<2>::from_steps(&steps), Err(Error::CapacityExceeded));
}

#[test]
fn hold_ramp_is_constant() {
    let ramp = ChannelRamp::hold(99);
    for elapsed in 0..=10 {
        assert_eq!(ramp.brightness_at(elapsed, 10), 99);
    }
}

#[test]
fn ramp_past_end_clamps_to_stop() {
    let ramp = ChannelRamp::new(10, 20);
    assert_eq!(ramp.brightness_at(50, 10), 20);
    assert_eq!(ramp.brightness_at(5, 0), 10);
}
