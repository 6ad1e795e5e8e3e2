use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct SongSearchParams {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ImageSearchParams {
    pub query: Option<String>,
    #[serde(rename = "type")]
    pub media_type: Option<String>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockMediaKind {
    Image,
    Video,
}

impl StockMediaKind {
    /// Anything other than `video` searches photos
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("video") => StockMediaKind::Video,
            _ => StockMediaKind::Image,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub tracks: Vec<PlaylistTrack>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistTrack {
    pub name: String,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub image: Option<String>,
}
