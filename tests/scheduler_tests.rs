//! Integration tests for ZeroCrossScheduler

mod common;
use common::*;

use ac_chaser::scheduler::step_delays;
use ac_chaser::{
    ChannelRamp, ChaseSequence, DimSequence, DimStep, Interpolation, Program, Role, SharedState,
    StepTransition, SyncEvent, ZeroCrossAction, ZeroCrossScheduler,
};

fn dim_delays(scheduler: &ZeroCrossScheduler<'_, 8>) -> [u8; 8] {
    match scheduler.current_action() {
        ZeroCrossAction::Dim { delays } => delays,
        other => panic!("expected dimmer action, got {:?}", other),
    }
}

fn ramp_on_channel_0(duration: u8, start: u8, stop: u8) -> DimStep {
    let mut channels = [ChannelRamp::hold(0); 8];
    channels[0] = ChannelRamp::new(start, stop);
    DimStep::new(duration, channels)
}

#[test]
fn chase_of_length_n_restarts_after_n_steps() {
    for len in 1..=8usize {
        let patterns: Vec<u8> = (0..len as u8).map(|i| 1 << i).collect();
        let seq = ChaseSequence::new(leak_patterns(&patterns)).unwrap();
        let shared = SharedState::new(1);
        let mut scheduler =
            ZeroCrossScheduler::<1>::new(Role::Master, Program::Chase(seq), 1, Interpolation::Linear);

        for step in 1..len {
            let outcome = scheduler.on_zero_cross(&shared);
            assert_eq!(outcome.transition, Some(StepTransition::Step));
            assert_eq!(scheduler.run_state().current_step, step);
        }

        let outcome = scheduler.on_zero_cross(&shared);
        assert_eq!(outcome.transition, Some(StepTransition::Restart), "length {}", len);
        assert_eq!(scheduler.run_state().current_step, 0);
    }
}

#[test]
fn master_chase_counts_speed_ticks_per_step() {
    let seq = ChaseSequence::new(leak_patterns(&[1, 2, 4])).unwrap();
    let shared = SharedState::new(5);
    let mut scheduler =
        ZeroCrossScheduler::<1>::new(Role::Master, Program::Chase(seq), 5, Interpolation::Linear);

    for _ in 0..4 {
        assert_eq!(scheduler.on_zero_cross(&shared).transition, None);
    }
    let outcome = scheduler.on_zero_cross(&shared);
    assert_eq!(outcome.transition, Some(StepTransition::Step));
    assert_eq!(outcome.action, ZeroCrossAction::Chase { pattern: 2 });
    assert_eq!(shared.take_outbound(), Some(SyncEvent::Step));
    assert_eq!(scheduler.run_state().tick_count, 0);
}

#[test]
fn master_chase_follows_shared_speed() {
    let seq = ChaseSequence::new(leak_patterns(&[1, 2])).unwrap();
    let shared = SharedState::new(300);
    let mut scheduler =
        ZeroCrossScheduler::<1>::new(Role::Master, Program::Chase(seq), 300, Interpolation::Linear);

    scheduler.on_zero_cross(&shared);
    shared.set_speed(2);
    let outcome = scheduler.on_zero_cross(&shared);
    assert_eq!(outcome.transition, Some(StepTransition::Step));
    assert_eq!(scheduler.run_state().speed_param, 2);
}

#[test]
fn slave_ignores_tick_thresholds() {
    let seq = ChaseSequence::new(leak_patterns(&[1, 2, 4])).unwrap();
    let shared = SharedState::new(1);
    let mut scheduler =
        ZeroCrossScheduler::<1>::new(Role::Slave, Program::Chase(seq), 1, Interpolation::Linear);

    for _ in 0..50 {
        assert_eq!(scheduler.on_zero_cross(&shared).transition, None);
    }
    assert_eq!(scheduler.run_state().current_step, 0);

    shared.post_inbound(SyncEvent::Step);
    let outcome = scheduler.on_zero_cross(&shared);
    assert_eq!(outcome.transition, Some(StepTransition::Step));
    assert_eq!(outcome.action, ZeroCrossAction::Chase { pattern: 2 });

    shared.post_inbound(SyncEvent::Restart);
    scheduler.on_zero_cross(&shared);
    assert_eq!(scheduler.run_state().current_step, 0);
}

#[test]
fn slaves_fed_the_same_events_stay_identical() {
    let seq = ChaseSequence::new(leak_patterns(&[1, 2, 4, 8, 16])).unwrap();
    let stream = [
        SyncEvent::Step,
        SyncEvent::Step,
        SyncEvent::SetSpeed(40),
        SyncEvent::Restart,
        SyncEvent::Step,
        SyncEvent::Step,
        SyncEvent::Step,
        SyncEvent::Step,
        SyncEvent::Step,
        SyncEvent::Step,
    ];

    let mut a = ZeroCrossScheduler::<1>::new(Role::Slave, Program::Chase(seq), 1, Interpolation::Linear);
    let mut b = ZeroCrossScheduler::<1>::new(Role::Slave, Program::Chase(seq), 1, Interpolation::Linear);

    let steps_a: Vec<usize> = stream
        .iter()
        .map(|event| {
            a.apply(*event);
            a.run_state().current_step
        })
        .collect();
    let steps_b: Vec<usize> = stream
        .iter()
        .map(|event| {
            b.apply(*event);
            b.run_state().current_step
        })
        .collect();

    assert_eq!(steps_a, steps_b);
    assert_eq!(steps_a, vec![1, 2, 2, 0, 1, 2, 3, 4, 0, 1]);
}

#[test]
fn linear_ramp_matches_formula_at_every_tick() {
    // Brightness 0, 63, 127, 191, 255 at ticks 0..=4
    let ramp = ChannelRamp::new(0, 255);
    let levels: Vec<u8> = (0..=4).map(|t| ramp.brightness_at(t, 4)).collect();
    assert_eq!(levels, vec![0, 63, 127, 191, 255]);
}

#[test]
fn ramp_boundaries_are_exact_for_all_durations() {
    for duration in 1..=255u32 {
        for (start, stop) in [(0u8, 255u8), (255, 0), (12, 200), (77, 77)] {
            let ramp = ChannelRamp::new(start, stop);
            assert_eq!(ramp.brightness_at(0, duration), start);
            assert_eq!(ramp.brightness_at(duration, duration), stop);
            for t in 0..=duration {
                let level = ramp.brightness_at(t, duration);
                assert!(level >= start.min(stop) && level <= start.max(stop));
            }
        }
    }
}

#[test]
fn master_dimmer_ramps_each_zero_cross() {
    let seq = DimSequence::<8>::from_steps(&[
        ramp_on_channel_0(4, 0, 255),
        ramp_on_channel_0(2, 255, 255),
    ])
    .unwrap();
    let shared = SharedState::new(1);
    let mut scheduler =
        ZeroCrossScheduler::new(Role::Master, Program::Dimmer(&seq), 1, Interpolation::Linear);

    assert_eq!(dim_delays(&scheduler)[0], 255);

    let mut delays = Vec::new();
    for _ in 0..3 {
        let outcome = scheduler.on_zero_cross(&shared);
        assert_eq!(outcome.transition, None);
        delays.push(dim_delays(&scheduler)[0]);
    }
    assert_eq!(delays, vec![255 - 63, 255 - 127, 255 - 191]);
    assert_eq!(dim_delays(&scheduler)[1], 255);

    let outcome = scheduler.on_zero_cross(&shared);
    assert_eq!(outcome.transition, Some(StepTransition::Step));
    assert_eq!(scheduler.run_state().current_step, 1);
    assert_eq!(dim_delays(&scheduler)[0], 0);
    assert_eq!(shared.take_outbound(), Some(SyncEvent::Step));
}

#[test]
fn dimmer_step_length_scales_with_speed() {
    let seq = DimSequence::<8>::from_steps(&[DimStep::uniform(2, 0, 255), DimStep::uniform(2, 255, 0)])
        .unwrap();
    let shared = SharedState::new(3);
    let mut scheduler =
        ZeroCrossScheduler::new(Role::Master, Program::Dimmer(&seq), 3, Interpolation::Linear);
    assert_eq!(scheduler.step_ticks(), 6);

    for _ in 0..5 {
        assert_eq!(scheduler.on_zero_cross(&shared).transition, None);
    }
    assert_eq!(scheduler.on_zero_cross(&shared).transition, Some(StepTransition::Step));

    for _ in 0..5 {
        scheduler.on_zero_cross(&shared);
    }
    assert_eq!(scheduler.on_zero_cross(&shared).transition, Some(StepTransition::Restart));
    assert_eq!(shared.take_outbound(), Some(SyncEvent::Step));
    assert_eq!(shared.take_outbound(), Some(SyncEvent::Restart));
}

#[test]
fn resync_restarts_step_with_new_speed() {
    let seq = DimSequence::<8>::from_steps(&[DimStep::uniform(10, 0, 100)]).unwrap();
    let shared = SharedState::new(1);
    let mut scheduler =
        ZeroCrossScheduler::new(Role::Master, Program::Dimmer(&seq), 1, Interpolation::Linear);

    for _ in 0..5 {
        scheduler.on_zero_cross(&shared);
    }
    assert_eq!(scheduler.run_state().tick_count, 5);

    shared.set_speed(4);
    shared.request_resync();
    scheduler.on_zero_cross(&shared);

    assert_eq!(scheduler.step_ticks(), 40);
    assert_eq!(scheduler.run_state().tick_count, 1);
    assert_eq!(scheduler.run_state().current_step, 0);
    // 100 * 1 / 40 = 2
    assert_eq!(dim_delays(&scheduler), [253; 8]);
}

#[test]
fn slave_dimmer_ramps_then_holds() {
    let seq = DimSequence::<8>::from_steps(&[
        ramp_on_channel_0(2, 0, 100),
        ramp_on_channel_0(2, 100, 0),
    ])
    .unwrap();
    let shared = SharedState::new(2);
    let mut scheduler =
        ZeroCrossScheduler::new(Role::Slave, Program::Dimmer(&seq), 2, Interpolation::Linear);
    assert_eq!(scheduler.step_ticks(), 4);

    let mut levels = Vec::new();
    for _ in 0..6 {
        scheduler.on_zero_cross(&shared);
        levels.push(255 - dim_delays(&scheduler)[0]);
    }
    assert_eq!(levels, vec![25, 50, 75, 100, 100, 100]);

    shared.post_inbound(SyncEvent::Step);
    let outcome = scheduler.on_zero_cross(&shared);
    assert_eq!(outcome.transition, Some(StepTransition::Step));
    assert_eq!(scheduler.run_state().tick_count, 0);
    assert_eq!(255 - dim_delays(&scheduler)[0], 100);
}

#[test]
fn slave_dimmer_picks_up_received_speed_at_step_boundary() {
    let seq = DimSequence::<8>::from_steps(&[DimStep::uniform(3, 0, 255), DimStep::uniform(3, 255, 0)])
        .unwrap();
    let shared = SharedState::new(1);
    let mut scheduler =
        ZeroCrossScheduler::new(Role::Slave, Program::Dimmer(&seq), 1, Interpolation::Linear);

    shared.set_speed(7);
    shared.post_inbound(SyncEvent::Step);
    scheduler.on_zero_cross(&shared);

    assert_eq!(scheduler.step_ticks(), 21);
    assert_eq!(scheduler.run_state().speed_param, 7);
}

#[test]
fn stepped_snapshot_holds_start_for_whole_step() {
    let seq = DimSequence::<8>::from_steps(&[DimStep::uniform(4, 40, 240)]).unwrap();
    let shared = SharedState::new(1);
    let mut scheduler = ZeroCrossScheduler::new(
        Role::Master,
        Program::Dimmer(&seq),
        1,
        Interpolation::SteppedSnapshot,
    );

    for _ in 0..3 {
        scheduler.on_zero_cross(&shared);
        assert_eq!(dim_delays(&scheduler), [215; 8]);
    }
}

#[test]
fn step_delays_follow_each_channel() {
    let mut channels = [ChannelRamp::hold(0); 8];
    for (i, channel) in channels.iter_mut().enumerate() {
        *channel = ChannelRamp::new(0, (i as u8) * 32);
    }
    let delays = step_delays(&DimStep::new(2, channels), 1, 2, Interpolation::Linear);
    for (i, delay) in delays.iter().enumerate() {
        assert_eq!(*delay, 255 - (i as u8) * 16);
    }
}
