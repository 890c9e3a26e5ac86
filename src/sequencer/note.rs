// Note representation for the loop sequencer
// A scheduled note is a grid-addressed event with pitch, duration, and velocity

/// A note scheduled at a global step of a track's loop
///
/// Identity is `(track, global_step)`: at most one scheduled note exists per
/// step per track, and a later write replaces an earlier one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledNote {
    /// Absolute step index across all bins of the current loop multiplier
    pub global_step: u32,

    /// MIDI note number (0-127, where 60 = C4)
    pub pitch: u8,

    /// Duration in transport ticks
    pub duration_ticks: u32,

    /// Normalized velocity (0.0 to 1.0)
    pub velocity: f32,

    /// Root pitch of the scale the note was authored against
    /// Kept so a later harmonic change can re-anchor replayed material
    pub authored_root_pitch: u8,
}

impl ScheduledNote {
    /// Creates a new scheduled note
    pub fn new(
        global_step: u32,
        pitch: u8,
        duration_ticks: u32,
        velocity: f32,
        authored_root_pitch: u8,
    ) -> Self {
        assert!(pitch <= 127, "MIDI pitch must be 0-127");
        assert!(authored_root_pitch <= 127, "Root pitch must be 0-127");
        assert!(duration_ticks > 0, "Note duration must be > 0");

        Self {
            global_step,
            pitch,
            duration_ticks,
            velocity: velocity.clamp(0.0, 1.0),
            authored_root_pitch,
        }
    }

    /// Velocity mapped to the note player's 1-127 range
    /// Rounds, then clamps to 1 so an authored note is never silenced
    pub fn midi_velocity(&self) -> u8 {
        (self.velocity * 127.0).round().clamp(1.0, 127.0) as u8
    }

    /// Get the note name (e.g., "C4", "A#5")
    pub fn note_name(&self) -> String {
        const NOTE_NAMES: [&str; 12] = [
            "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
        ];

        let octave = (self.pitch / 12) as i32 - 1;
        let note_index = (self.pitch % 12) as usize;

        format!("{}{}", NOTE_NAMES[note_index], octave)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_creation() {
        let note = ScheduledNote::new(37, 60, 4, 0.8, 48);

        assert_eq!(note.global_step, 37);
        assert_eq!(note.pitch, 60);
        assert_eq!(note.duration_ticks, 4);
        assert_eq!(note.authored_root_pitch, 48);
    }

    #[test]
    fn test_velocity_clamped() {
        let loud = ScheduledNote::new(0, 60, 1, 2.5, 60);
        assert_eq!(loud.velocity, 1.0);
        assert_eq!(loud.midi_velocity(), 127);

        let quiet = ScheduledNote::new(0, 60, 1, 0.001, 60);
        // Rounds to 0 but the player floor is 1
        assert_eq!(quiet.midi_velocity(), 1);
    }

    #[test]
    fn test_midi_velocity_mapping() {
        let note = ScheduledNote::new(0, 60, 1, 0.5, 60);
        // 0.5 * 127 = 63.5, rounds to 64
        assert_eq!(note.midi_velocity(), 64);
    }

    #[test]
    fn test_note_name() {
        let note_c4 = ScheduledNote::new(0, 60, 1, 1.0, 60);
        assert_eq!(note_c4.note_name(), "C4");

        let note_a4 = ScheduledNote::new(0, 69, 1, 1.0, 60);
        assert_eq!(note_a4.note_name(), "A4");
    }

    #[test]
    #[should_panic(expected = "MIDI pitch must be 0-127")]
    fn test_invalid_pitch() {
        ScheduledNote::new(0, 128, 1, 1.0, 60);
    }

    #[test]
    #[should_panic(expected = "Note duration must be > 0")]
    fn test_zero_duration() {
        ScheduledNote::new(0, 60, 0, 1.0, 60);
    }
}
