// Scale and chord templates - Harmonic material for candidate pools
// A template is pitch-class shaped; pools expand it into concrete pitches

/// Inclusive MIDI pitch range constraint for one track role
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PitchRange {
    pub low: u8,
    pub high: u8,
}

impl PitchRange {
    /// Creates a pitch range
    pub fn new(low: u8, high: u8) -> Self {
        assert!(low <= high, "Range low must not exceed high");
        assert!(high <= 127, "MIDI pitch must be 0-127");
        Self { low, high }
    }

    /// Check whether a pitch lies in the range
    pub fn contains(&self, pitch: u8) -> bool {
        pitch >= self.low && pitch <= self.high
    }

    /// Clamp a pitch into the range
    pub fn clamp(&self, pitch: u8) -> u8 {
        pitch.clamp(self.low, self.high)
    }
}

/// A scale as a root pitch plus semitone intervals within one octave
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ScaleTemplate {
    pub root: u8,
    intervals: Vec<u8>,
}

impl ScaleTemplate {
    /// Creates a scale from a root and semitone offsets (0 = root)
    pub fn new(root: u8, intervals: Vec<u8>) -> Self {
        assert!(root <= 127, "MIDI pitch must be 0-127");
        assert!(!intervals.is_empty(), "Scale needs at least one interval");
        assert!(
            intervals.iter().all(|&i| i < 12),
            "Intervals are semitones within one octave"
        );
        Self { root, intervals }
    }

    /// Major scale on the given root
    pub fn major(root: u8) -> Self {
        Self::new(root, vec![0, 2, 4, 5, 7, 9, 11])
    }

    /// Natural minor scale on the given root
    pub fn natural_minor(root: u8) -> Self {
        Self::new(root, vec![0, 2, 3, 5, 7, 8, 10])
    }

    /// Minor pentatonic scale on the given root
    pub fn minor_pentatonic(root: u8) -> Self {
        Self::new(root, vec![0, 3, 5, 7, 10])
    }

    /// Dorian mode on the given root
    pub fn dorian(root: u8) -> Self {
        Self::new(root, vec![0, 2, 3, 5, 7, 9, 10])
    }

    /// Semitone intervals of this scale
    pub fn intervals(&self) -> &[u8] {
        &self.intervals
    }

    /// Check whether a pitch belongs to the scale (any octave)
    pub fn contains(&self, pitch: u8) -> bool {
        let offset = (pitch as i32 - self.root as i32).rem_euclid(12) as u8;
        self.intervals.contains(&offset)
    }

    /// All scale pitches inside a range, ascending
    pub fn pitches_in_range(&self, range: PitchRange) -> Vec<u8> {
        (range.low..=range.high)
            .filter(|&p| self.contains(p))
            .collect()
    }
}

/// A chord as semitone offsets from the scale root
///
/// Chord tones get a heavier weight in candidate pools, so collected
/// notes lean toward the current harmony without being locked to it.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ChordShape {
    offsets: Vec<u8>,
}

impl ChordShape {
    /// Creates a chord shape from semitone offsets (0 = root)
    pub fn new(offsets: Vec<u8>) -> Self {
        assert!(!offsets.is_empty(), "Chord needs at least one tone");
        Self { offsets }
    }

    /// Major triad
    pub fn major_triad() -> Self {
        Self::new(vec![0, 4, 7])
    }

    /// Minor triad
    pub fn minor_triad() -> Self {
        Self::new(vec![0, 3, 7])
    }

    /// Suspended fourth
    pub fn sus4() -> Self {
        Self::new(vec![0, 5, 7])
    }

    /// Check whether a pitch is a chord tone relative to a root (any octave)
    pub fn contains(&self, root: u8, pitch: u8) -> bool {
        let offset = (pitch as i32 - root as i32).rem_euclid(12) as u8;
        self.offsets.iter().any(|&o| o % 12 == offset)
    }
}
