//! Member and property names of the player interface.

/// Control methods exposed by the player interface.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Method {
    Play,
    Pause,
    Stop,
    Next,
    Previous,
    FastForward,
    Rewind,
    Press,
    Hold,
    Release,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Play => "Play",
            Method::Pause => "Pause",
            Method::Stop => "Stop",
            Method::Next => "Next",
            Method::Previous => "Previous",
            Method::FastForward => "FastForward",
            Method::Rewind => "Rewind",
            Method::Press => "Press",
            Method::Hold => "Hold",
            Method::Release => "Release",
        }
    }
}

/// Wire shape of a property's value.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ValueKind {
    Bool,
    Text,
    Path,
    Unsigned,
    Track,
}

/// Properties of the player interface.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Property {
    Browsable,
    Device,
    Equalizer,
    Name,
    Playlist,
    Position,
    Repeat,
    Scan,
    Searchable,
    Shuffle,
    Status,
    Subtype,
    Track,
    Type,
}

impl Property {
    pub const ALL: [Property; 14] = [
        Property::Browsable,
        Property::Device,
        Property::Equalizer,
        Property::Name,
        Property::Playlist,
        Property::Position,
        Property::Repeat,
        Property::Scan,
        Property::Searchable,
        Property::Shuffle,
        Property::Status,
        Property::Subtype,
        Property::Track,
        Property::Type,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Property::Browsable => "Browsable",
            Property::Device => "Device",
            Property::Equalizer => "Equalizer",
            Property::Name => "Name",
            Property::Playlist => "Playlist",
            Property::Position => "Position",
            Property::Repeat => "Repeat",
            Property::Scan => "Scan",
            Property::Searchable => "Searchable",
            Property::Shuffle => "Shuffle",
            Property::Status => "Status",
            Property::Subtype => "Subtype",
            Property::Track => "Track",
            Property::Type => "Type",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == name)
    }

    pub fn kind(self) -> ValueKind {
        match self {
            Property::Browsable | Property::Searchable => ValueKind::Bool,
            Property::Device | Property::Playlist => ValueKind::Path,
            Property::Position => ValueKind::Unsigned,
            Property::Track => ValueKind::Track,
            Property::Equalizer
            | Property::Name
            | Property::Repeat
            | Property::Scan
            | Property::Shuffle
            | Property::Status
            | Property::Subtype
            | Property::Type => ValueKind::Text,
        }
    }
}

/// Keys of the `Track` dictionary.
pub mod track_field {
    pub const TITLE: &str = "Title";
    pub const ARTIST: &str = "Artist";
    pub const ALBUM: &str = "Album";
    pub const GENRE: &str = "Genre";
    pub const NUMBER_OF_TRACKS: &str = "NumberOfTracks";
    pub const TRACK_NUMBER: &str = "TrackNumber";
    pub const DURATION: &str = "Duration";
}
