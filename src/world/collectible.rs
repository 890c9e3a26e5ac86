// Collectible field - Live actors whose capture writes notes into the loop
// Owns the per-actor observer list with deterministic unsubscribe

use crate::sequencer::window::{ActionJudgment, TimingJudge};
use crate::track::TrackId;
use crate::world::CollectibleSource;

/// Unique identifier for collectibles
pub type CollectibleId = u64;

/// Handle returned by `subscribe`, used to unsubscribe
pub type ObserverId = u64;

/// One collectible actor: the note it carries and the steps it can land on
#[derive(Debug, Clone)]
pub struct Collectible {
    pub id: CollectibleId,
    pub track: TrackId,
    pub pitch: u8,
    pub duration_ticks: u32,
    eligible_steps: Vec<u32>,
}

impl Collectible {
    /// Steps this collectible can still be credited to
    pub fn eligible_steps(&self) -> &[u32] {
        &self.eligible_steps
    }
}

/// Fired at an observer when a collectible's step is credited
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollectEvent {
    pub collectible: CollectibleId,
    pub track: TrackId,
    pub step: u32,
    pub pitch: u8,
    pub duration_ticks: u32,
    pub delta_secs: f64,
}

type CollectObserver = Box<dyn FnMut(&CollectEvent)>;

/// Owner of all live collectibles and their collect observers
///
/// Observers are registered against a specific collectible and removed
/// with it, so a despawn during a phase freeze can never leave a callback
/// that fires into a cleared note store.
#[derive(Default)]
pub struct CollectibleField {
    collectibles: Vec<Collectible>,
    observers: Vec<(ObserverId, CollectibleId, CollectObserver)>,
    next_collectible_id: CollectibleId,
    next_observer_id: ObserverId,
}

impl CollectibleField {
    /// Creates an empty field
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a collectible carrying a note over a set of eligible steps
    pub fn spawn(
        &mut self,
        track: TrackId,
        pitch: u8,
        duration_ticks: u32,
        eligible_steps: Vec<u32>,
    ) -> CollectibleId {
        let id = self.next_collectible_id;
        self.next_collectible_id += 1;
        self.collectibles.push(Collectible {
            id,
            track,
            pitch,
            duration_ticks,
            eligible_steps,
        });
        id
    }

    /// Attach an observer to one collectible's collect events
    pub fn subscribe(
        &mut self,
        collectible: CollectibleId,
        observer: CollectObserver,
    ) -> ObserverId {
        let id = self.next_observer_id;
        self.next_observer_id += 1;
        self.observers.push((id, collectible, observer));
        id
    }

    /// Remove one observer
    pub fn unsubscribe(&mut self, observer: ObserverId) {
        self.observers.retain(|(id, _, _)| *id != observer);
    }

    /// Remove one collectible and every observer attached to it
    pub fn despawn(&mut self, collectible: CollectibleId) {
        self.collectibles.retain(|c| c.id != collectible);
        self.observers.retain(|(_, c, _)| *c != collectible);
    }

    /// Collectible by id
    pub fn get(&self, id: CollectibleId) -> Option<&Collectible> {
        self.collectibles.iter().find(|c| c.id == id)
    }

    /// Judge a player action against one track's live collectibles
    ///
    /// On a hit the matching collectible's observers fire, the step is
    /// consumed from its eligibility, and an exhausted collectible
    /// despawns. A miss changes nothing.
    pub fn handle_action(
        &mut self,
        track: TrackId,
        judge: &TimingJudge,
        now: f64,
        loop_start_anchor: f64,
        loop_length_secs: f64,
        total_steps: u32,
    ) -> ActionJudgment {
        let eligible: Vec<u32> = self
            .collectibles
            .iter()
            .filter(|c| c.track == track)
            .flat_map(|c| c.eligible_steps.iter().copied())
            .collect();

        let judgment = judge.judge(
            now,
            loop_start_anchor,
            loop_length_secs,
            total_steps,
            &eligible,
        );

        if let ActionJudgment::Hit { step, delta_secs } = judgment {
            let hit = self
                .collectibles
                .iter()
                .find(|c| c.track == track && c.eligible_steps.contains(&step))
                .map(|c| (c.id, c.pitch, c.duration_ticks));

            if let Some((id, pitch, duration_ticks)) = hit {
                let event = CollectEvent {
                    collectible: id,
                    track,
                    step,
                    pitch,
                    duration_ticks,
                    delta_secs,
                };
                for (_, target, observer) in self.observers.iter_mut() {
                    if *target == id {
                        observer(&event);
                    }
                }
                self.consume_step(track, step);
            }
        }

        judgment
    }
}

impl CollectibleSource for CollectibleField {
    fn despawn_all(&mut self) {
        self.collectibles.clear();
        self.observers.clear();
    }

    fn active_count(&self) -> usize {
        self.collectibles.len()
    }

    fn consume_step(&mut self, track: TrackId, step: u32) {
        let mut exhausted = Vec::new();
        for collectible in self
            .collectibles
            .iter_mut()
            .filter(|c| c.track == track)
        {
            collectible.eligible_steps.retain(|&s| s != step);
            if collectible.eligible_steps.is_empty() {
                exhausted.push(collectible.id);
            }
        }
        for id in exhausted {
            self.despawn(id);
        }
    }
}
