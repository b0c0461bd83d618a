use std::fmt;
use std::time::Duration;

/// Metadata of the track a player currently holds.
///
/// Built fresh from the `Track` property on every read. Fields the remote side
/// did not report are left empty or zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Track {
    pub artist: String,
    pub title: String,
    pub album: String,
    pub genre: String,
    pub track_number: u32,
    pub number_of_tracks: u32,
    pub duration: Duration,
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = if self.title.trim().is_empty() {
            "Unknown"
        } else {
            self.title.trim()
        };
        match self.artist.trim() {
            "" => write!(f, "{title}")?,
            artist => write!(f, "{artist} - {title}")?,
        }
        if !self.album.trim().is_empty() {
            write!(f, " ({})", self.album.trim())?;
        }
        if self.number_of_tracks > 0 {
            write!(f, " #{}/{}", self.track_number, self.number_of_tracks)?;
        }
        write!(f, " [{}]", format_elapsed(self.duration))
    }
}

/// Render a duration as zero-padded `HH:MM:SS`. Hours are not wrapped.
pub fn format_elapsed(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}
