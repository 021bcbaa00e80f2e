//! Client for the IPStream dashboard API and the SonicPanel stream status.
//!
//! Every call goes through an `HttpRunner`. Handing it the cache controller
//! gives the pages' data requests the same offline policy as any other fetch.

use std::sync::{Arc, OnceLock};

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::api_defaults;
use crate::error::SWError;
use crate::http::{resolve_url, Request};
use crate::io::HttpRunner;
use crate::{json_loads, Result};
use crate::{log_debug, log_error};

lazy_static! {
    static ref STREAM_PORT: Regex = Regex::new(r":(\d+)").unwrap();
}

/// Runtime configuration served at `/config/config.json`.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct RuntimeConfig {
    pub ipstream_base_url: String,
    #[serde(rename = "clientId", deserialize_with = "string_or_number")]
    pub client_id: String,
    #[serde(default)]
    pub sonicpanel_stream_url: String,
    #[serde(default)]
    pub template: Option<String>,
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or a number, got {other}"
        ))),
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentSong {
    pub title: String,
    pub art: Option<String>,
    pub listeners: u64,
    pub unique_listeners: u64,
    pub bitrate: String,
    pub dj_username: Option<String>,
    pub dj_profile: Option<String>,
    pub history: Vec<Value>,
}

impl CurrentSong {
    /// Shown when the stream status cannot be retrieved.
    pub fn placeholder() -> Self {
        CurrentSong {
            title: "Radio en Vivo".to_string(),
            art: None,
            listeners: 0,
            unique_listeners: 0,
            bitrate: "N/A".to_string(),
            dj_username: None,
            dj_profile: None,
            history: Vec::new(),
        }
    }

    fn from_sonic_panel(data: &Value) -> Self {
        CurrentSong {
            title: non_empty(&data["title"]).unwrap_or_else(|| "Sin información".to_string()),
            art: non_empty(&data["art"]),
            listeners: count(&data["listeners"]),
            unique_listeners: count(&data["ulistener"]),
            bitrate: non_empty(&data["bitrate"]).unwrap_or_else(|| "N/A".to_string()),
            dj_username: non_empty(&data["djusername"]),
            dj_profile: non_empty(&data["djprofile"]),
            history: data["history"].as_array().cloned().unwrap_or_default(),
        }
    }
}

// Empty strings and zeroes count as missing.
fn non_empty(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    }
}

fn count(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().map(|f| f.max(0.0) as u64))
            .unwrap_or_default(),
        Value::String(s) => s.trim().parse().unwrap_or_default(),
        _ => 0,
    }
}

/// Port the stream listens on, used to query its SonicPanel status.
pub fn stream_port(stream_url: &str) -> &str {
    STREAM_PORT
        .captures(stream_url)
        .and_then(|caps| caps.get(1))
        .map(|port| port.as_str())
        .unwrap_or(api_defaults::SONICPANEL_DEFAULT_PORT)
}

pub struct DataClient<R> {
    runner: Arc<R>,
    origin: String,
    runtime_config: OnceLock<RuntimeConfig>,
}

impl<R: HttpRunner> DataClient<R> {
    pub fn new(runner: Arc<R>, origin: &str) -> Self {
        DataClient {
            runner,
            origin: origin.to_string(),
            runtime_config: OnceLock::new(),
        }
    }

    /// The runtime configuration, fetched on first use and kept for the
    /// lifetime of the client.
    pub fn runtime_config(&self) -> Result<&RuntimeConfig> {
        if let Some(config) = self.runtime_config.get() {
            return Ok(config);
        }
        let url = resolve_url(&self.origin, api_defaults::RUNTIME_CONFIG_PATH);
        let data = self.fetch_json(&url)?;
        let config: RuntimeConfig = serde_json::from_value(data)
            .map_err(|err| SWError::ConfigurationError(format!("{url}: {err}")))?;
        log_debug!("Loaded runtime config for client {}", config.client_id);
        Ok(self.runtime_config.get_or_init(|| config))
    }

    fn api_base(&self) -> Result<String> {
        let config = self.runtime_config()?;
        Ok(format!("{}/{}", config.ipstream_base_url, config.client_id))
    }

    fn get(&self, resource: &str) -> Result<Value> {
        let base = self.api_base()?;
        if resource.is_empty() {
            return self.fetch_json(&base);
        }
        self.fetch_json(&format!("{base}/{resource}"))
    }

    fn fetch_json(&self, url: &str) -> Result<Value> {
        let response = self.runner.fetch(&Request::get(url))?;
        let body = response.text();
        if !response.is_ok() {
            let message = json_loads(&body)
                .ok()
                .and_then(|data| data["error"].as_str().map(|msg| msg.to_string()))
                .unwrap_or_else(|| format!("HTTP {}", response.status));
            log_error!("API error for {}: {}", url, message);
            return Err(SWError::ApiError(message).into());
        }
        json_loads(&body)
    }

    pub fn all_client_data(&self) -> Result<Value> {
        self.get("")
    }

    pub fn basic_data(&self) -> Result<Value> {
        self.get("basic-data")
    }

    pub fn programs(&self) -> Result<Value> {
        self.get("programs")
    }

    pub fn news(&self, page: u32, limit: u32) -> Result<Value> {
        self.get(&format!("news?page={page}&limit={limit}"))
    }

    pub fn news_by_slug(&self, slug: &str) -> Result<Value> {
        self.get(&format!("news/{slug}"))
    }

    pub fn videos(&self) -> Result<Value> {
        self.get("videos")
    }

    pub fn sponsors(&self) -> Result<Value> {
        self.get("sponsors")
    }

    pub fn promotions(&self) -> Result<Value> {
        self.get("promotions")
    }

    pub fn podcasts(&self, page: u32, limit: u32) -> Result<Value> {
        self.get(&format!("podcasts?page={page}&limit={limit}"))
    }

    pub fn podcast_by_id(&self, id: &str) -> Result<Value> {
        self.get(&format!("podcasts/{id}"))
    }

    pub fn videocasts(&self, page: u32, limit: u32) -> Result<Value> {
        self.get(&format!("videocasts?page={page}&limit={limit}"))
    }

    pub fn videocast_by_id(&self, id: &str) -> Result<Value> {
        self.get(&format!("videocasts/{id}"))
    }

    pub fn social_networks(&self) -> Result<Value> {
        self.get("social-networks")
    }

    /// Absolute URL for an image path returned by the API. Images are served
    /// from the API host, outside the `/api/public` prefix.
    pub fn build_image_url(&self, path: &str) -> Result<String> {
        let config = self.runtime_config()?;
        let base = config.ipstream_base_url.replacen("/api/public", "", 1);
        Ok(format!("{base}{path}"))
    }

    pub fn sonic_panel_info(&self) -> Result<Value> {
        let config = self.runtime_config()?;
        let port = stream_port(&config.sonicpanel_stream_url);
        let url = format!("{}?p={}", api_defaults::SONICPANEL_INFO_URL, port);
        let response = self.runner.fetch(&Request::get(&url))?;
        if !response.is_ok() {
            return Err(SWError::ApiError(format!("HTTP error! status: {}", response.status)).into());
        }
        json_loads(&response.text())
    }

    /// What is on air right now. Never fails: any error yields the
    /// placeholder song.
    pub fn current_song(&self) -> CurrentSong {
        match self.sonic_panel_info() {
            Ok(data) => CurrentSong::from_sonic_panel(&data),
            Err(err) => {
                log_error!("Error getting current song: {}", err);
                CurrentSong::placeholder()
            }
        }
    }
}
