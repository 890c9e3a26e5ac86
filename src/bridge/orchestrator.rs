// Bridge orchestrator - Coordinates the engine across a phase change
// Freeze, replay, fade out, commit, re-arm, fade in; one session at a time

use crate::bridge::fade::LinearFade;
use crate::bridge::session::{BridgePhase, BridgeSession, PhasePlan};
use crate::harmony::{CandidatePool, DEFAULT_DURATION_TICKS};
use crate::messaging::channels::NotificationProducer;
use crate::messaging::notification::{Notification, NotificationCategory};
use crate::sequencer::ScheduledNote;
use crate::session::snapshot::{NoteEntry, PhaseRecord, PhaseTag, SessionHistory};
use crate::track::TrackRegistry;
use crate::world::{CollectibleSource, WorldSink};
use ringbuf::traits::Producer;

/// Velocity for notes seeded into a freshly armed phase
const SEED_VELOCITY: f32 = 0.75;

/// Timing configuration of the phase bridge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BridgeConfig {
    /// Duration of the volume ramp to silence
    pub fade_out_secs: f32,
    /// Duration of the volume ramp back to the pre-fade targets
    pub fade_in_secs: f32,
    /// Freeze self-heal: loop boundaries without drain progress
    pub collectable_clear_timeout_loops: u32,
    /// Freeze self-heal: seconds without drain progress
    pub collectable_clear_timeout_secs: f32,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            fade_out_secs: 1.5,
            fade_in_secs: 1.5,
            collectable_clear_timeout_loops: 2,
            collectable_clear_timeout_secs: 8.0,
        }
    }
}

/// State machine driving a phase transition end to end
///
/// The orchestrator is the only actor allowed to bulk-mutate note stores,
/// and it only does so while every scheduler is suspended. A session, once
/// started, always runs to Idle; the freeze self-heal bounds its worst-case
/// duration instead of offering cancellation.
pub struct BridgeOrchestrator {
    config: BridgeConfig,
    session: Option<BridgeSession>,
    history: SessionHistory,
    current_phase: PhaseTag,
    current_color: [f32; 3],
    notifications: Option<NotificationProducer>,
}

impl BridgeOrchestrator {
    /// Creates an idle orchestrator
    pub fn new(config: BridgeConfig, opening_phase: PhaseTag, opening_color: [f32; 3]) -> Self {
        Self {
            config,
            session: None,
            history: SessionHistory::new(),
            current_phase: opening_phase,
            current_color: opening_color,
            notifications: None,
        }
    }

    /// Attach a telemetry channel
    pub fn with_notifications(mut self, producer: NotificationProducer) -> Self {
        self.notifications = Some(producer);
        self
    }

    /// Current state, Idle when no session is in flight
    pub fn phase(&self) -> BridgePhase {
        self.session
            .as_ref()
            .map_or(BridgePhase::Idle, |s| s.phase())
    }

    /// The in-flight session, if any
    pub fn session(&self) -> Option<&BridgeSession> {
        self.session.as_ref()
    }

    /// Phase tag currently playing
    pub fn current_phase(&self) -> PhaseTag {
        self.current_phase
    }

    /// History of completed phases
    pub fn history(&self) -> &SessionHistory {
        &self.history
    }

    /// Begin a phase transition
    ///
    /// Suspends every scheduler, requests despawn of all collectibles, and
    /// snapshots the completed loop for the replay and the history record.
    /// Refused with a warning while a session is already in flight.
    pub fn request_transition(
        &mut self,
        plan: PhasePlan,
        registry: &mut TrackRegistry,
        collectibles: &mut dyn CollectibleSource,
        loop_length_secs: f64,
    ) -> bool {
        if self.session.is_some() {
            log::warn!("phase transition requested while one is in flight, refusing");
            self.notify(Notification::warning(
                NotificationCategory::Bridge,
                "transition refused: bridge already active".to_string(),
            ));
            return false;
        }

        // The replay hold is one full musical loop at the bin count that
        // was reached during the ending phase, not a fixed constant.
        let replay_hold_secs = loop_length_secs * registry.max_bin_count() as f64;

        let mut snapshot_notes = Vec::new();
        for track in registry.iter_mut() {
            track.scheduler.suspend();
            track.rebuild_cache_if_dirty();
            let steps_per_bin = track.grid().steps_per_bin;
            for entry in track.cache().entries_sorted() {
                snapshot_notes.push(NoteEntry {
                    step: entry.bin * steps_per_bin + entry.local_step,
                    pitch: entry.pitch,
                    velocity: entry.velocity,
                    color: track.color,
                });
            }
        }

        collectibles.despawn_all();

        let session = BridgeSession::new(
            plan,
            loop_length_secs,
            replay_hold_secs,
            snapshot_notes,
            collectibles.active_count(),
        );
        log::info!("bridge session {} started", session.id);
        self.session = Some(session);
        true
    }

    /// Report that the transport crossed a loop boundary
    pub fn notify_loop_boundary(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.boundaries_in_phase += 1;
            session.boundaries_since_progress += 1;
        }
    }

    /// Drive the in-flight session forward
    ///
    /// Advances at most one state per call so every state is observable
    /// between ticks. A no-op while idle.
    pub fn tick(
        &mut self,
        dt_secs: f32,
        registry: &mut TrackRegistry,
        collectibles: &mut dyn CollectibleSource,
        world: &mut dyn WorldSink,
    ) {
        let Some(mut session) = self.session.take() else {
            return;
        };
        session.elapsed_in_phase += dt_secs;

        let mut completed = false;
        match session.phase() {
            BridgePhase::Idle => unreachable!("idle sessions are not stored"),

            BridgePhase::Freezing => {
                let active = collectibles.active_count();
                if active == 0 {
                    session.enter(BridgePhase::CinematicReplay);
                    world.show_replay(&session.snapshot_notes);
                } else {
                    if active < session.last_active_count {
                        session.last_active_count = active;
                        session.stalled_secs = 0.0;
                        session.boundaries_since_progress = 0;
                    } else {
                        session.stalled_secs += dt_secs;
                    }

                    let loops_exceeded = session.boundaries_since_progress
                        >= self.config.collectable_clear_timeout_loops;
                    let time_exceeded =
                        session.stalled_secs >= self.config.collectable_clear_timeout_secs;
                    if loops_exceeded || time_exceeded {
                        // An actor that never despawns broke its contract;
                        // advancing anyway beats deadlocking the bridge.
                        log::error!(
                            "bridge session {} freeze never drained ({} actors), forcing replay",
                            session.id,
                            active
                        );
                        self.notify(Notification::error(
                            NotificationCategory::Bridge,
                            format!("freeze drain stalled with {} actors, forced advance", active),
                        ));
                        session.forced_advance = true;
                        session.enter(BridgePhase::CinematicReplay);
                        world.show_replay(&session.snapshot_notes);
                    }
                }
            }

            BridgePhase::CinematicReplay => {
                // Hold the full duration even when the snapshot is empty,
                // so fade timing never depends on how much was collected.
                if session.elapsed_in_phase as f64 >= session.replay_hold_secs {
                    session.enter(BridgePhase::FadingOut);
                    session.fades = registry
                        .iter_mut()
                        .map(|track| {
                            track.target_volume = track.volume;
                            (track.id, LinearFade::new(track.volume, 0.0, self.config.fade_out_secs))
                        })
                        .collect();
                }
            }

            BridgePhase::FadingOut => {
                Self::advance_fades(&mut session, dt_secs, registry);
                let finished = session.fades.iter().all(|(_, f)| f.is_finished());
                // Hold at silence until the boundary so the commit lands
                // exactly on it, never mid-loop.
                if finished && session.boundaries_in_phase >= 1 {
                    session.enter(BridgePhase::Committing);
                }
            }

            BridgePhase::Committing => {
                self.history.push(PhaseRecord::new(
                    self.current_phase,
                    self.current_color,
                    session.snapshot_notes.clone(),
                ));

                for track in registry.iter_mut() {
                    track.store_mut().clear();
                    track.set_bin_count(1);
                    track.scheduler.reset();
                }
                world.clear_all();

                // The staged harmonic change becomes current only here,
                // behind silence.
                self.current_phase = session.plan.next_phase;
                self.current_color = session.plan.phase_color;

                session.enter(BridgePhase::Arming);
            }

            BridgePhase::Arming => {
                let plan = &session.plan;
                for track in registry.iter_mut() {
                    let range = track.role.default_range();
                    track.set_pool(CandidatePool::build(
                        &plan.scale,
                        &plan.chord,
                        range,
                        &plan.duration_weights,
                    ));

                    if plan.seed_roles.contains(&track.role) {
                        let steps_per_bin = track.grid().steps_per_bin;
                        let pitch = range.clamp(plan.scale.root);
                        for step in [0, steps_per_bin / 2] {
                            track.store_mut().insert(ScheduledNote::new(
                                step,
                                pitch,
                                DEFAULT_DURATION_TICKS,
                                SEED_VELOCITY,
                                plan.scale.root,
                            ));
                        }
                    }
                }

                if let Some(track) = registry.iter().next() {
                    world.configure_grid(track.grid().steps_per_bin);
                }
                world.request_layout();

                session.enter(BridgePhase::FadingIn);
                session.fades = registry
                    .iter_mut()
                    .map(|track| {
                        track.volume = 0.0;
                        track.scheduler.resume();
                        (track.id, LinearFade::new(0.0, track.target_volume, self.config.fade_in_secs))
                    })
                    .collect();
            }

            BridgePhase::FadingIn => {
                Self::advance_fades(&mut session, dt_secs, registry);
                if session.fades.iter().all(|(_, f)| f.is_finished()) {
                    for (id, fade) in &session.fades {
                        if let Some(track) = registry.get_mut(*id) {
                            track.volume = fade.target();
                        }
                    }
                    log::info!("bridge session {} complete", session.id);
                    self.notify(Notification::info(
                        NotificationCategory::Bridge,
                        format!("phase {:?} armed", self.current_phase),
                    ));
                    completed = true;
                }
            }
        }

        if !completed {
            self.session = Some(session);
        }
    }

    /// Advance the active fade leg and apply values to track volumes
    fn advance_fades(session: &mut BridgeSession, dt_secs: f32, registry: &mut TrackRegistry) {
        for (id, fade) in session.fades.iter_mut() {
            fade.advance(dt_secs);
            if let Some(track) = registry.get_mut(*id) {
                track.volume = fade.value();
            }
        }
    }

    fn notify(&mut self, notification: Notification) {
        if let Some(producer) = self.notifications.as_mut() {
            let _ = producer.try_push(notification);
        }
    }
}
