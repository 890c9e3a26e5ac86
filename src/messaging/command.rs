// Types de commandes - Communication moteur → shell audio

/// Parameters for one fire-and-forget note trigger
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NotePlayParams {
    pub pitch: u8,
    pub duration_ms: u32,
    /// Note player velocity range (1-127)
    pub velocity: u8,
    pub channel: u8,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EngineCommand {
    PlayNote(NotePlayParams),
    SetChannelVolume { channel: u8, gain: f32 },
    AllNotesOff,
}
