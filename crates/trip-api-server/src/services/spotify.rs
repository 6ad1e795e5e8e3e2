use base64::{engine::general_purpose::STANDARD, Engine as _};
use parking_lot::Mutex;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::config::SpotifyConfig;
use crate::models::media::{Playlist, PlaylistTrack};
use crate::utils::ApiError;

/// Refresh this long before the provider-reported expiry
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: Instant,
}

// Playlist payload, only the fields we reshape
#[derive(Debug, Deserialize)]
struct PlaylistResponse {
    name: String,
    description: Option<String>,
    #[serde(default)]
    images: Vec<ImageObject>,
    tracks: TrackPage,
}

#[derive(Debug, Deserialize)]
struct ImageObject {
    url: String,
}

#[derive(Debug, Deserialize)]
struct TrackPage {
    #[serde(default)]
    items: Vec<TrackItem>,
}

#[derive(Debug, Deserialize)]
struct TrackItem {
    track: Option<TrackObject>,
}

#[derive(Debug, Deserialize)]
struct TrackObject {
    name: String,
    #[serde(default)]
    artists: Vec<ArtistObject>,
    album: Option<AlbumObject>,
}

#[derive(Debug, Deserialize)]
struct ArtistObject {
    name: String,
}

#[derive(Debug, Deserialize)]
struct AlbumObject {
    name: String,
    #[serde(default)]
    images: Vec<ImageObject>,
}

impl From<PlaylistResponse> for Playlist {
    fn from(raw: PlaylistResponse) -> Self {
        Playlist {
            name: raw.name,
            description: raw.description,
            image: raw.images.into_iter().next().map(|i| i.url),
            tracks: raw
                .tracks
                .items
                .into_iter()
                .filter_map(|item| item.track)
                .map(|track| {
                    let (album, image) = match track.album {
                        Some(album) => (Some(album.name), album.images.into_iter().next().map(|i| i.url)),
                        None => (None, None),
                    };
                    PlaylistTrack {
                        name: track.name,
                        artist: track.artists.into_iter().next().map(|a| a.name),
                        album,
                        image,
                    }
                })
                .collect(),
        }
    }
}

/// Playlist lookup with a cached client-credentials token
#[derive(Clone)]
pub struct SpotifyService {
    client: Client,
    config: SpotifyConfig,
    token: Arc<Mutex<Option<CachedToken>>>,
}

impl SpotifyService {
    pub fn new(client: Client, config: SpotifyConfig) -> Self {
        Self {
            client,
            config,
            token: Arc::new(Mutex::new(None)),
        }
    }

    async fn access_token(&self) -> Result<String, ApiError> {
        let cached = self.token.lock().clone();
        if let Some(cached) = cached.filter(|t| t.expires_at > Instant::now()) {
            return Ok(cached.value);
        }

        debug!("Requesting Spotify client-credentials token");

        let credentials = STANDARD.encode(format!("{}:{}", self.config.client_id, self.config.client_secret));
        let response = self
            .client
            .post(format!("{}/api/token", self.config.accounts_url))
            .header("Authorization", format!("Basic {}", credentials))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| ApiError::UpstreamError(format!("Spotify token request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(ApiError::UpstreamError(format!("Spotify token error: {}", status)));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| ApiError::UpstreamError(format!("Failed to parse Spotify token: {}", e)))?;

        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(TOKEN_EXPIRY_MARGIN);
        *self.token.lock() = Some(CachedToken {
            value: token.access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });

        Ok(token.access_token)
    }

    pub async fn playlist(&self, playlist_id: &str) -> Result<Playlist, ApiError> {
        let access_token = self.access_token().await?;

        let response = self
            .client
            .get(format!("{}/v1/playlists/{}", self.config.api_url, playlist_id))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| ApiError::UpstreamError(format!("Failed to fetch playlist: {}", e)))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(format!("Playlist {} not found", playlist_id)));
        }
        if !response.status().is_success() {
            let status = response.status();
            return Err(ApiError::UpstreamError(format!("Failed to fetch playlist: {}", status)));
        }

        let raw: PlaylistResponse = response
            .json()
            .await
            .map_err(|e| ApiError::UpstreamError(format!("Failed to parse playlist: {}", e)))?;

        let playlist = Playlist::from(raw);
        info!("Fetched playlist '{}' with {} tracks", playlist.name, playlist.tracks.len());
        Ok(playlist)
    }
}
