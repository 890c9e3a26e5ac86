//! End-to-end scenario: collect notes, hear them loop, then cross a
//! phase boundary and come out the other side clean and re-armed.

use pulsemaze::bridge::{BridgeConfig, BridgeOrchestrator, BridgePhase, PhasePlan};
use pulsemaze::harmony::{CandidatePool, ChordShape, ScaleTemplate};
use pulsemaze::messaging::channels::create_notification_channel;
use pulsemaze::messaging::notification::NotificationLevel;
use pulsemaze::sequencer::{GridConfig, ScheduledNote, TimingJudge, TransportState, WindowConfig};
use pulsemaze::session::snapshot::{NoteEntry, PhaseTag};
use pulsemaze::session::{load_history, save_history};
use pulsemaze::track::{Track, TrackId, TrackRegistry, TrackRole};
use pulsemaze::world::{CollectibleField, CollectibleSource, NotePlayer, WorldSink};
use ringbuf::traits::Consumer;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Default)]
struct RecordingPlayer {
    calls: Vec<(u8, u32, u8, u8)>,
}

impl NotePlayer for RecordingPlayer {
    fn play(&mut self, pitch: u8, duration_ms: u32, velocity: u8, channel: u8) {
        self.calls.push((pitch, duration_ms, velocity, channel));
    }
}

#[derive(Default)]
struct RecordingWorld {
    replay_sizes: Vec<usize>,
    clears: usize,
    layouts: usize,
}

impl WorldSink for RecordingWorld {
    fn show_replay(&mut self, notes: &[NoteEntry]) {
        self.replay_sizes.push(notes.len());
    }
    fn clear_all(&mut self) {
        self.clears += 1;
    }
    fn configure_grid(&mut self, _steps_per_bin: u32) {}
    fn request_layout(&mut self) {
        self.layouts += 1;
    }
}

/// A collectible source that drains one actor per tick, like real actors
/// animating out over several frames.
struct SlowDrainField {
    remaining: usize,
}

impl CollectibleSource for SlowDrainField {
    fn despawn_all(&mut self) {}
    fn active_count(&self) -> usize {
        self.remaining
    }
    fn consume_step(&mut self, _track: TrackId, _step: u32) {}
}

fn make_track(id: TrackId, role: TrackRole) -> Track {
    let scale = ScaleTemplate::major(60);
    let pool = CandidatePool::build(
        &scale,
        &ChordShape::major_triad(),
        role.default_range(),
        &[(2, 2), (4, 1)],
    );
    Track::new(id, role, id as u8 + 1, [0.2 * id as f32, 0.5, 0.8], GridConfig::new(16, 1), pool)
}

#[test]
fn test_collect_then_play_then_transition() {
    let mut registry = TrackRegistry::new();
    registry.add(make_track(0, TrackRole::Lead));
    registry.add(make_track(1, TrackRole::Bass));

    let mut field = CollectibleField::new();
    let mut player = RecordingPlayer::default();
    let mut world = RecordingWorld::default();
    let judge = TimingJudge::new(WindowConfig::new(1.0));

    // Loop: 1600 ticks at 2.5 ms per tick = 4.0 seconds, 16 steps
    let mut transport = TransportState::new(1600, 2.5);
    let loop_secs = transport.loop_length_secs();
    assert!((loop_secs - 4.0).abs() < 1e-9);

    // A collectible on the lead track, targetable at steps 4 and 12
    let collectible = field.spawn(0, 67, 4, vec![4, 12]);
    let hits = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&hits);
    field.subscribe(collectible, Box::new(move |e| sink.borrow_mut().push((e.step, e.pitch, e.duration_ticks))));

    // Player action at 1.0s: step 4's ideal time exactly (4 * 0.25s)
    let judgment = field.handle_action(0, &judge, 1.0, 0.0, loop_secs, 16);
    assert!(judgment.is_hit());

    // The observer wiring inserts the note and sounds it immediately
    {
        let collected = hits.borrow();
        assert_eq!(collected.as_slice(), &[(4, 67, 4)]);
        let (step, pitch, duration_ticks) = collected[0];
        let lead = registry.get_mut(0).unwrap();
        lead.collect(
            ScheduledNote::new(step, pitch, duration_ticks, 0.9, 60),
            &transport,
            &mut player,
        );
    }
    assert_eq!(player.calls.len(), 1);
    assert_eq!(player.calls[0].0, 67);
    player.calls.clear();

    // Play through the loop; the collected note fires exactly once
    for tick in [0u64, 300, 450, 700, 1100, 1599] {
        transport.position_ticks = tick;
        for track in registry.iter_mut() {
            track.poll_playback(&transport, 0, None, &mut player);
        }
    }
    assert_eq!(player.calls.len(), 1);
    assert_eq!(player.calls[0], (67, 10, 114, 1)); // 4 ticks * 2.5 ms, 0.9 vel

    // Cross into the next phase
    let (producer, mut notifications) = create_notification_channel(16);
    let mut bridge = BridgeOrchestrator::new(
        BridgeConfig::default(),
        PhaseTag::Verse,
        [0.1, 0.6, 0.3],
    )
    .with_notifications(producer);

    let plan = PhasePlan {
        next_phase: PhaseTag::Chorus,
        phase_color: [0.8, 0.2, 0.2],
        scale: ScaleTemplate::minor_pentatonic(57),
        chord: ChordShape::minor_triad(),
        duration_weights: vec![(2, 1), (4, 1)],
        seed_roles: vec![TrackRole::Bass],
    };
    assert!(bridge.request_transition(plan, &mut registry, &mut field, loop_secs));

    // Freezing despawned the field: a perfect action is now a miss
    let judgment = field.handle_action(0, &judge, 1.0, 0.0, loop_secs, 16);
    assert!(!judgment.is_hit());

    // Frozen schedulers emit nothing even over a note
    transport.position_ticks = 500;
    for track in registry.iter_mut() {
        track.poll_playback(&transport, 0, None, &mut player);
    }
    assert_eq!(player.calls.len(), 1); // unchanged

    // Drive the whole transition
    bridge.tick(0.1, &mut registry, &mut field, &mut world); // -> replay
    assert_eq!(bridge.phase(), BridgePhase::CinematicReplay);
    assert_eq!(world.replay_sizes, vec![1]);

    bridge.tick(4.0, &mut registry, &mut field, &mut world); // -> fade out
    bridge.tick(1.5, &mut registry, &mut field, &mut world); // fade done
    bridge.notify_loop_boundary();
    bridge.tick(0.0, &mut registry, &mut field, &mut world); // -> commit
    bridge.tick(0.0, &mut registry, &mut field, &mut world); // -> arm
    bridge.tick(0.0, &mut registry, &mut field, &mut world); // -> fade in
    bridge.tick(1.5, &mut registry, &mut field, &mut world); // -> idle

    assert_eq!(bridge.phase(), BridgePhase::Idle);
    assert_eq!(world.clears, 1);
    assert_eq!(world.layouts, 1);

    // The lead is clean; the seeded bass opens the new phase
    assert!(registry.get(0).unwrap().store().is_empty());
    assert_eq!(registry.get(1).unwrap().store().len(), 2);
    for track in registry.iter() {
        assert_eq!(track.grid().bin_count, 1);
        assert_eq!(track.volume, 1.0);
        assert!(!track.scheduler.is_suspended());
    }

    // The finished phase went on record with the collected note
    assert_eq!(bridge.history().len(), 1);
    let record = &bridge.history().records()[0];
    assert_eq!(record.phase, PhaseTag::Verse);
    assert_eq!(record.notes.len(), 1);
    assert_eq!(record.notes[0].step, 4);
    assert_eq!(record.notes[0].pitch, 67);

    // Completion was announced on the telemetry channel
    let mut saw_info = false;
    while let Some(n) = notifications.try_pop() {
        if n.level == NotificationLevel::Info {
            saw_info = true;
        }
        assert_ne!(n.level, NotificationLevel::Error);
    }
    assert!(saw_info);
}

#[test]
fn test_slow_drain_completes_without_force() {
    let mut registry = TrackRegistry::new();
    registry.add(make_track(0, TrackRole::Lead));

    let mut field = SlowDrainField { remaining: 3 };
    let mut world = RecordingWorld::default();
    let mut bridge = BridgeOrchestrator::new(
        BridgeConfig::default(),
        PhaseTag::Intro,
        [0.0; 3],
    );

    let plan = PhasePlan {
        next_phase: PhaseTag::Verse,
        phase_color: [0.0; 3],
        scale: ScaleTemplate::major(60),
        chord: ChordShape::major_triad(),
        duration_weights: vec![(2, 1)],
        seed_roles: Vec::new(),
    };
    bridge.request_transition(plan, &mut registry, &mut field, 4.0);

    // Actors drain one per tick; steady progress must never trip the
    // self-heal even past the loop-boundary threshold
    for _ in 0..3 {
        bridge.notify_loop_boundary();
        bridge.tick(0.5, &mut registry, &mut field, &mut world);
        if field.remaining > 0 {
            field.remaining -= 1;
        }
    }
    bridge.tick(0.5, &mut registry, &mut field, &mut world);

    assert_eq!(bridge.phase(), BridgePhase::CinematicReplay);
    assert!(!bridge.session().unwrap().was_force_advanced());
}

#[test]
fn test_history_round_trips_through_disk() {
    let mut registry = TrackRegistry::new();
    registry.add(make_track(0, TrackRole::Lead));
    registry
        .get_mut(0)
        .unwrap()
        .store_mut()
        .insert(ScheduledNote::new(7, 64, 2, 0.6, 60));

    let mut field = CollectibleField::new();
    let mut world = RecordingWorld::default();
    let mut bridge = BridgeOrchestrator::new(
        BridgeConfig::default(),
        PhaseTag::Bridge,
        [0.3, 0.3, 0.9],
    );

    let plan = PhasePlan {
        next_phase: PhaseTag::Outro,
        phase_color: [0.1; 3],
        scale: ScaleTemplate::major(60),
        chord: ChordShape::major_triad(),
        duration_weights: vec![(2, 1)],
        seed_roles: Vec::new(),
    };
    bridge.request_transition(plan, &mut registry, &mut field, 4.0);
    bridge.tick(0.1, &mut registry, &mut field, &mut world);
    bridge.tick(4.0, &mut registry, &mut field, &mut world);
    bridge.tick(1.5, &mut registry, &mut field, &mut world);
    bridge.notify_loop_boundary();
    bridge.tick(0.0, &mut registry, &mut field, &mut world);
    bridge.tick(0.0, &mut registry, &mut field, &mut world);
    bridge.tick(0.0, &mut registry, &mut field, &mut world);
    bridge.tick(1.5, &mut registry, &mut field, &mut world);
    assert_eq!(bridge.history().len(), 1);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session_history.ron");

    save_history(&path, bridge.history()).unwrap();
    let restored = load_history(&path).unwrap();

    assert_eq!(&restored, bridge.history());
    assert_eq!(restored.records()[0].phase, PhaseTag::Bridge);
    assert_eq!(restored.records()[0].notes[0].step, 7);
}
