// Candidate pools - Weighted pitch and duration material for one phase
// Weight is expressed by repetition: an entry of weight W appears W times

use crate::harmony::scale::{ChordShape, PitchRange, ScaleTemplate};
use rand::Rng;

/// Fallback duration in ticks when a duration pool expands to nothing
pub const DEFAULT_DURATION_TICKS: u32 = 2;

/// Pool weight for pitches that are chord tones of the current harmony
const CHORD_TONE_WEIGHT: i32 = 3;

/// Pool weight for the remaining scale pitches
const SCALE_TONE_WEIGHT: i32 = 1;

/// Flat, expanded selection list
///
/// An entry of weight W appears exactly W times, so uniform selection over
/// the expansion realizes the weighting with no sampling algorithm. The
/// distribution is exactly `count(value) / total` by construction.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedList<T> {
    entries: Vec<T>,
}

impl<T: Clone> WeightedList<T> {
    /// Expand weighted pairs into a flat list
    ///
    /// Entries with weight <= 0 are invalid; they are dropped with a
    /// warning and never crash the build.
    pub fn from_weighted(pairs: &[(T, i32)]) -> Self
    where
        T: std::fmt::Debug,
    {
        let mut entries = Vec::new();
        for (value, weight) in pairs {
            if *weight <= 0 {
                log::warn!("dropping pool entry {:?} with weight {}", value, weight);
                continue;
            }
            for _ in 0..*weight {
                entries.push(value.clone());
            }
        }
        Self { entries }
    }

    /// Uniform selection over the expansion
    pub fn choose<R: Rng>(&self, rng: &mut R) -> Option<&T> {
        if self.entries.is_empty() {
            return None;
        }
        self.entries.get(rng.gen_range(0..self.entries.len()))
    }

    /// Expanded length (sum of positive weights)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the expansion is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The expanded entries, for exact distribution checks
    pub fn entries(&self) -> &[T] {
        &self.entries
    }
}

impl<T: Clone + PartialEq> WeightedList<T> {
    /// Occurrences of a value in the expansion
    pub fn count_of(&self, value: &T) -> usize {
        self.entries.iter().filter(|e| *e == value).count()
    }
}

/// Weighted pitch and duration material for one track during one phase
///
/// Built once per phase and role assignment, replaced wholesale at the
/// next phase boundary, never mutated in place.
#[derive(Debug, Clone)]
pub struct CandidatePool {
    pitches: WeightedList<u8>,
    durations: WeightedList<u32>,
    fallback_pitch: u8,
}

impl CandidatePool {
    /// Build a pool from raw pitch and duration weights
    ///
    /// `fallback_pitch` is returned by `choose_pitch` when the pitch
    /// expansion is empty. Empty expansions are logged here, once per
    /// build, not on every selection.
    pub fn from_weights(
        pitch_weights: &[(u8, i32)],
        duration_weights: &[(u32, i32)],
        fallback_pitch: u8,
    ) -> Self {
        let pitches = WeightedList::from_weighted(pitch_weights);
        let durations = WeightedList::from_weighted(duration_weights);

        if pitches.is_empty() {
            log::warn!(
                "pitch pool expanded to nothing, selections fall back to {}",
                fallback_pitch
            );
        }
        if durations.is_empty() {
            log::warn!(
                "duration pool expanded to nothing, selections fall back to {} ticks",
                DEFAULT_DURATION_TICKS
            );
        }

        Self {
            pitches,
            durations,
            fallback_pitch,
        }
    }

    /// Build a pool from harmonic templates and a role's pitch range
    ///
    /// Scale pitches inside the range enter with weight 1; chord tones of
    /// the current harmony are weighted heavier.
    pub fn build(
        scale: &ScaleTemplate,
        chord: &ChordShape,
        range: PitchRange,
        duration_weights: &[(u32, i32)],
    ) -> Self {
        let pitch_weights: Vec<(u8, i32)> = scale
            .pitches_in_range(range)
            .into_iter()
            .map(|p| {
                let weight = if chord.contains(scale.root, p) {
                    CHORD_TONE_WEIGHT
                } else {
                    SCALE_TONE_WEIGHT
                };
                (p, weight)
            })
            .collect();

        Self::from_weights(&pitch_weights, duration_weights, range.clamp(scale.root))
    }

    /// Pick a pitch uniformly over the expansion
    pub fn choose_pitch<R: Rng>(&self, rng: &mut R) -> u8 {
        self.pitches
            .choose(rng)
            .copied()
            .unwrap_or(self.fallback_pitch)
    }

    /// Pick a duration uniformly over the expansion
    pub fn choose_duration<R: Rng>(&self, rng: &mut R) -> u32 {
        self.durations
            .choose(rng)
            .copied()
            .unwrap_or(DEFAULT_DURATION_TICKS)
    }

    /// The expanded pitch list
    pub fn pitches(&self) -> &WeightedList<u8> {
        &self.pitches
    }

    /// The expanded duration list
    pub fn durations(&self) -> &WeightedList<u32> {
        &self.durations
    }
}
