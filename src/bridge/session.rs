// Bridge session - Transient state of one phase transition
// Created when a transition is requested, destroyed when the phase is armed

use crate::bridge::fade::LinearFade;
use crate::harmony::{ChordShape, ScaleTemplate};
use crate::session::snapshot::{NoteEntry, PhaseTag};
use crate::track::{TrackId, TrackRole};
use uuid::Uuid;

/// States of the phase bridge, in transition order
///
/// A live session walks every state exactly once with no skipping; the
/// only shortcut is the freeze self-heal, which jumps forward inside
/// Freezing, never over a later state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgePhase {
    Idle,
    Freezing,
    CinematicReplay,
    FadingOut,
    Committing,
    Arming,
    FadingIn,
}

impl BridgePhase {
    /// Check whether a transition is in flight
    pub fn is_active(&self) -> bool {
        !matches!(self, BridgePhase::Idle)
    }
}

/// Everything the next phase needs, staged before the transition starts
///
/// The harmonic change is prepared here silently and only committed by the
/// bridge, so it is never audible mid-fade.
#[derive(Debug, Clone)]
pub struct PhasePlan {
    pub next_phase: PhaseTag,
    pub phase_color: [f32; 3],
    pub scale: ScaleTemplate,
    pub chord: ChordShape,
    /// Duration weights for the regenerated candidate pools
    pub duration_weights: Vec<(u32, i32)>,
    /// Roles reseeded with a starter pattern so the phase opens audible
    pub seed_roles: Vec<TrackRole>,
}

/// Transient state of one in-flight transition
///
/// At most one session exists at a time; requesting a second transition
/// while one is live is refused by the orchestrator.
#[derive(Debug)]
pub struct BridgeSession {
    pub id: Uuid,
    pub(crate) phase: BridgePhase,
    pub(crate) plan: PhasePlan,

    /// Seconds spent in the current state
    pub(crate) elapsed_in_phase: f32,
    /// Loop boundaries crossed since entering the current state
    pub(crate) boundaries_in_phase: u32,
    /// Freeze drain watch: boundaries crossed since the last progress
    pub(crate) boundaries_since_progress: u32,
    /// Freeze drain watch: seconds since the last progress
    pub(crate) stalled_secs: f32,
    /// Last observed live collectible count
    pub(crate) last_active_count: usize,

    /// Authoritative loop duration captured at freeze time
    pub(crate) loop_length_secs: f64,
    /// Replay hold: one full loop at the bin count current when frozen
    pub(crate) replay_hold_secs: f64,

    /// Snapshot of the completed loop, rendered during the replay
    pub(crate) snapshot_notes: Vec<NoteEntry>,
    /// Per-track volume ramps for the active fade leg
    pub(crate) fades: Vec<(TrackId, LinearFade)>,
    /// Set when the freeze self-heal fired; kept for telemetry
    pub(crate) forced_advance: bool,
}

impl BridgeSession {
    /// Creates a session entering the Freezing state
    pub(crate) fn new(
        plan: PhasePlan,
        loop_length_secs: f64,
        replay_hold_secs: f64,
        snapshot_notes: Vec<NoteEntry>,
        initial_active_count: usize,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            phase: BridgePhase::Freezing,
            plan,
            elapsed_in_phase: 0.0,
            boundaries_in_phase: 0,
            boundaries_since_progress: 0,
            stalled_secs: 0.0,
            last_active_count: initial_active_count,
            loop_length_secs,
            replay_hold_secs,
            snapshot_notes,
            fades: Vec::new(),
            forced_advance: false,
        }
    }

    /// Current state of the transition
    pub fn phase(&self) -> BridgePhase {
        self.phase
    }

    /// Whether the freeze self-heal fired during this transition
    pub fn was_force_advanced(&self) -> bool {
        self.forced_advance
    }

    /// Move to the next state, resetting per-state counters
    pub(crate) fn enter(&mut self, phase: BridgePhase) {
        log::debug!("bridge session {} entering {:?}", self.id, phase);
        self.phase = phase;
        self.elapsed_in_phase = 0.0;
        self.boundaries_in_phase = 0;
    }
}
