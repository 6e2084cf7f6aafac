//! Pinterest board listing and pin downloads.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::PinterestConfig;
use crate::error::{SlideshowError, SlideshowResult};

const PAGE_SIZE: &str = "100";

/// One page of `GET /boards/{board_id}/pins`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PinPage {
    #[serde(default)]
    pub items: Vec<RawPin>,
    /// Cursor for the next page; absent or empty on the last page
    #[serde(default)]
    pub bookmark: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPin {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub media: Option<PinMedia>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PinMedia {
    #[serde(default)]
    pub images: HashMap<String, PinImage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PinImage {
    pub url: Option<String>,
}

impl RawPin {
    /// URL of the original-resolution asset, if the pin has one.
    pub fn original_url(&self) -> Option<&str> {
        self.media
            .as_ref()?
            .images
            .get("originals")?
            .url
            .as_deref()
            .filter(|url| !url.is_empty())
    }
}

/// A selectable remote candidate. Position in the board listing is its recency rank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pin {
    pub id: String,
    pub image_url: String,
}

/// Transport used by the remote pipeline.
pub trait BoardApi {
    /// Fetch one page of a board's pins, starting at `bookmark` when given.
    fn pins_page(&self, board_id: &str, bookmark: Option<&str>) -> SlideshowResult<PinPage>;

    /// Fetch the raw bytes of an image asset.
    fn download(&self, url: &str) -> SlideshowResult<Vec<u8>>;
}

/// Blocking HTTP implementation of [`BoardApi`] for the Pinterest v5 API.
pub struct PinterestApi {
    http: Client,
    base_url: String,
    access_token: String,
}

impl PinterestApi {
    pub fn new(config: &PinterestConfig) -> SlideshowResult<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
        })
    }
}

impl BoardApi for PinterestApi {
    fn pins_page(&self, board_id: &str, bookmark: Option<&str>) -> SlideshowResult<PinPage> {
        let url = format!("{}/boards/{}/pins", self.base_url, board_id);
        let mut request = self
            .http
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(&[("page_size", PAGE_SIZE)]);
        if let Some(bookmark) = bookmark {
            request = request.query(&[("bookmark", bookmark)]);
        }

        debug!("GET {} (bookmark: {:?})", url, bookmark);
        let body = request.send()?.error_for_status()?.text()?;
        Ok(serde_json::from_str(&body)?)
    }

    fn download(&self, url: &str) -> SlideshowResult<Vec<u8>> {
        let response = self.http.get(url).send()?.error_for_status()?;
        Ok(response.bytes()?.to_vec())
    }
}

/// Turn a board URL into `owner/board-name`; anything that is not a URL is
/// returned unchanged.
pub fn extract_board_id(board_url_or_id: &str) -> String {
    let input = board_url_or_id.trim();
    if !input.starts_with("http") {
        return input.to_string();
    }

    let Ok(url) = Url::parse(input) else {
        return input.to_string();
    };
    let segments: Vec<&str> = url
        .path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();

    match segments.as_slice() {
        [.., owner, board] => format!("{owner}/{board}"),
        _ => input.to_string(),
    }
}

/// Follow the bookmark cursor until the board is exhausted.
///
/// Pins without an original image (video pins, deleted media) are dropped.
pub fn fetch_board_pins(api: &impl BoardApi, board_id: &str) -> SlideshowResult<Vec<Pin>> {
    let mut raw_pins = Vec::new();
    let mut bookmark: Option<String> = None;

    loop {
        let page = api.pins_page(board_id, bookmark.as_deref())?;
        debug!("Fetched {} pins (total {})", page.items.len(), raw_pins.len() + page.items.len());
        raw_pins.extend(page.items);

        let next = page.bookmark.filter(|b| !b.is_empty());
        match next {
            Some(next) if bookmark.as_deref() == Some(next.as_str()) => {
                warn!("Board API returned the same bookmark twice, stopping pagination");
                break;
            }
            Some(next) => bookmark = Some(next),
            None => break,
        }
    }

    if raw_pins.is_empty() {
        return Err(SlideshowError::empty_input("No pins found in board"));
    }

    let total = raw_pins.len();
    let pins: Vec<Pin> = raw_pins
        .into_iter()
        .enumerate()
        .filter_map(|(i, raw)| match raw.original_url() {
            Some(url) => Some(Pin {
                id: raw.id.clone().unwrap_or_else(|| i.to_string()),
                image_url: url.to_string(),
            }),
            None => {
                warn!("Skipping pin {:?}: no original image", raw.id);
                None
            }
        })
        .collect();

    info!("Board {} has {} pins ({} with images)", board_id, total, pins.len());
    if pins.is_empty() {
        return Err(SlideshowError::empty_input("No pins with images found in board"));
    }
    Ok(pins)
}

/// File extension of the asset a URL points at; query strings are ignored.
pub fn extension_from_url(image_url: &str) -> String {
    let path = match Url::parse(image_url) {
        Ok(url) => url.path().to_string(),
        Err(_) => image_url.split(['?', '#']).next().unwrap_or_default().to_string(),
    };

    path.rsplit('/')
        .next()
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_lowercase())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| "jpg".to_string())
}

/// Download every selected pin into `cache_dir` as `pin_<index>.<ext>`.
///
/// The batch is all-or-nothing: the first failure is returned.
pub fn download_pins(
    api: &impl BoardApi,
    pins: &[Pin],
    cache_dir: &Path,
) -> SlideshowResult<Vec<PathBuf>> {
    fs::create_dir_all(cache_dir)?;

    let mut image_paths = Vec::with_capacity(pins.len());
    for (i, pin) in pins.iter().enumerate() {
        debug!("Downloading pin {} ({}/{})", pin.id, i + 1, pins.len());
        let bytes = api.download(&pin.image_url)?;

        let image_path = cache_dir.join(format!("pin_{}.{}", i, extension_from_url(&pin.image_url)));
        fs::write(&image_path, bytes)?;
        image_paths.push(image_path);
    }
    Ok(image_paths)
}
