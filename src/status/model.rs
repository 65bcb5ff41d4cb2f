/// One complete playback status as reported by the status source.
///
/// Values are immutable once built; a refresh produces a new record.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PlaybackStatus {
    /// Artist, the part of the title line before the first `" - "`.
    pub artist: String,
    /// Song, the part of the title line after the first `" - "`.
    pub song: String,
    /// `true` only when the player state is exactly `playing`.
    pub playing: bool,
    /// 1-based position in the playlist.
    pub track: u32,
    /// Playlist length.
    pub tracks: u32,
    /// Elapsed time as printed, e.g. `1:23`.
    pub time: String,
    /// Track length as printed, e.g. `4:56`.
    pub duration: String,
    /// Elapsed fraction, `0.0..=1.0`.
    pub progress: f32,
    /// Volume fraction, `0.0..=1.0`.
    pub volume: f32,
    /// `repeat: on`.
    pub repeat: bool,
    /// `random: on`.
    pub random: bool,
    /// `single: on`.
    pub single: bool,
    /// `consume: on`.
    pub consume: bool,
}

impl PlaybackStatus {
    /// Marquee text: `"<artist> - <song>"`.
    pub fn title(&self) -> String {
        format!("{} - {}", self.artist, self.song)
    }
}
