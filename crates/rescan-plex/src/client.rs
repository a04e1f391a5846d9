//! Blocking HTTP client for the Plex Media Server API.

use std::time::Duration;

use camino::Utf8Path;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, HeaderValue};
use rescan_core::{IndexError, LibraryDescriptor, LibraryId, MediaIndex, MediaItem, PlexConfig};
use serde_json::Error as JsonError;
use tracing::debug;

use crate::api::{self, ServerIdentity};
use crate::error::PlexError;

/// Header carrying the Plex token.
const TOKEN_HEADER: &str = "X-Plex-Token";

/// Upper bound for a single request. Large libraries take a while to list.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// A Plex server connection.
///
/// Uses `reqwest`'s blocking client, so it must be created, used and dropped
/// off the async runtime (the scan runs on a `spawn_blocking` thread).
#[derive(Debug, Clone)]
pub struct PlexClient {
    http: Client,
    base_url: String,
    token: String,
}

impl PlexClient {
    /// Creates a client for the configured server.
    ///
    /// # Errors
    ///
    /// Returns [`PlexError::InvalidUrl`] if the server URL is not an
    /// `http`/`https` URL, and [`PlexError::Http`] if the HTTP client cannot
    /// be built.
    pub fn new(config: &PlexConfig) -> Result<Self, PlexError> {
        let base_url = normalize_base_url(&config.server)?;

        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|source| PlexError::Http {
                url: base_url.clone(),
                source,
            })?;

        Ok(Self {
            http,
            base_url,
            token: config.token.clone(),
        })
    }

    /// Returns the server base URL, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetches the server identity; used as the startup connectivity check.
    pub fn identity(&self) -> Result<ServerIdentity, PlexError> {
        self.get_json("/identity", api::decode_identity)
    }

    /// Lists every library section.
    pub fn library_sections(&self) -> Result<Vec<LibraryDescriptor>, PlexError> {
        self.get_json("/library/sections", api::decode_sections)
    }

    /// Lists the top-level items of a section.
    pub fn section_items(&self, library: &LibraryId) -> Result<Vec<MediaItem>, PlexError> {
        let path = format!("/library/sections/{}/all", urlencoding::encode(library.as_str()));
        self.get_json(&path, api::decode_items)
    }

    /// Lists every episode of a show.
    pub fn show_episodes(&self, rating_key: &str) -> Result<Vec<MediaItem>, PlexError> {
        let path = format!("/library/metadata/{}/allLeaves", urlencoding::encode(rating_key));
        self.get_json(&path, api::decode_items)
    }

    /// Asks the server to re-scan one folder of a section.
    pub fn refresh_folder(&self, library: &LibraryId, folder: &Utf8Path) -> Result<(), PlexError> {
        let url = self.url(&refresh_path(library, folder));
        debug!(%url, "Requesting folder refresh");
        self.send(&url).map(drop)
    }

    /// Builds the absolute URL for an API path.
    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn get_json<T>(
        &self,
        path: &str,
        decode: impl FnOnce(&str) -> Result<T, JsonError>,
    ) -> Result<T, PlexError> {
        let url = self.url(path);
        let body = self.send(&url)?;
        decode(&body).map_err(|source| PlexError::Decode { url, source })
    }

    /// Sends an authenticated GET and returns the body of a success response.
    fn send(&self, url: &str) -> Result<String, PlexError> {
        debug!(%url, "Plex request");

        let response = self
            .http
            .get(url)
            .header(TOKEN_HEADER, &self.token)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .send()
            .map_err(|source| PlexError::Http {
                url: url.to_owned(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PlexError::Status {
                url: url.to_owned(),
                status,
            });
        }

        response.text().map_err(|source| PlexError::Http {
            url: url.to_owned(),
            source,
        })
    }
}

impl MediaIndex for PlexClient {
    fn sections(&self) -> Result<Vec<LibraryDescriptor>, IndexError> {
        self.library_sections()
            .map_err(|err| err.into_index_error("listing library sections"))
    }

    fn items(&self, library: &LibraryId) -> Result<Vec<MediaItem>, IndexError> {
        self.section_items(library)
            .map_err(|err| err.into_index_error(format!("listing section {library}")))
    }

    fn episodes(&self, show: &MediaItem) -> Result<Vec<MediaItem>, IndexError> {
        self.show_episodes(&show.rating_key)
            .map_err(|err| err.into_index_error(format!("listing episodes of '{}'", show.title)))
    }

    fn refresh(&self, library: &LibraryId, folder: &Utf8Path) -> Result<(), IndexError> {
        self.refresh_folder(library, folder)
            .map_err(|err| err.into_index_error(format!("refreshing {folder}")))
    }
}

/// Validates the configured server URL and strips trailing slashes.
fn normalize_base_url(raw: &str) -> Result<String, PlexError> {
    let trimmed = raw.trim().trim_end_matches('/');

    let Some((scheme, rest)) = trimmed.split_once("://") else {
        return Err(PlexError::invalid_url(raw, "missing scheme (expected http:// or https://)"));
    };
    if !scheme.eq_ignore_ascii_case("http") && !scheme.eq_ignore_ascii_case("https") {
        return Err(PlexError::invalid_url(raw, format!("unsupported scheme '{scheme}'")));
    }
    if rest.is_empty() {
        return Err(PlexError::invalid_url(raw, "missing host"));
    }

    Ok(trimmed.to_owned())
}

/// Path and query of a folder refresh request.
fn refresh_path(library: &LibraryId, folder: &Utf8Path) -> String {
    format!(
        "/library/sections/{}/refresh?path={}",
        urlencoding::encode(library.as_str()),
        urlencoding::encode(folder.as_str())
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(server: &str) -> PlexConfig {
        PlexConfig {
            server: server.to_owned(),
            token: "secret".to_owned(),
        }
    }

    #[test]
    fn test_base_url_trailing_slash_removed() {
        let client = PlexClient::new(&config("http://plex:32400/")).unwrap();
        assert_eq!(client.base_url(), "http://plex:32400");
        assert_eq!(client.url("/identity"), "http://plex:32400/identity");
    }

    #[test]
    fn test_invalid_base_urls() {
        for raw in ["plex:32400", "ftp://plex", "http://", ""] {
            let err = PlexClient::new(&config(raw)).unwrap_err();
            assert!(matches!(err, PlexError::InvalidUrl { .. }), "{raw}: {err}");
        }
    }

    #[test]
    fn test_https_accepted() {
        assert!(PlexClient::new(&config("HTTPS://plex.example.com")).is_ok());
    }

    #[test]
    fn test_refresh_path_escapes_folder() {
        let path = refresh_path(
            &LibraryId::new("2"),
            Utf8Path::new("/media/tv/Marvel's Agents & Co/Season 1"),
        );
        assert_eq!(
            path,
            "/library/sections/2/refresh?path=%2Fmedia%2Ftv%2FMarvel%27s%20Agents%20%26%20Co%2FSeason%201"
        );
    }

    #[test]
    fn test_urls_do_not_carry_token() {
        let client = PlexClient::new(&config("http://plex:32400")).unwrap();
        let url = client.url(&refresh_path(&LibraryId::new("1"), Utf8Path::new("/m")));
        assert!(!url.contains("secret"));
    }
}
