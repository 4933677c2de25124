// Copyright 2018 The GeoRust Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//	http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::Error;

fn default_feature_path() -> String {
    "feat".to_string()
}

fn default_property_path() -> String {
    "prop".to_string()
}

fn default_csrf_header() -> String {
    "X-CSRFToken".to_string()
}

fn default_timeout_secs() -> u64 {
    5
}

fn default_srid() -> u32 {
    4326
}

/// Where the feature API lives and how to talk to it.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Prefix of every API url, e.g. `https://example.org/geojson`.
    pub base_url: String,
    #[serde(default = "default_feature_path")]
    pub feature_path: String,
    #[serde(default = "default_property_path")]
    pub property_path: String,
    #[serde(default = "default_csrf_header")]
    pub csrf_header: String,
    /// Value of the CSRF cookie, forwarded on every request when set.
    #[serde(default)]
    pub csrf_token: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Spatial reference used when a response does not name one.
    #[serde(default = "default_srid")]
    pub default_srid: u32,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        ClientConfig {
            base_url: base_url.to_owned(),
            feature_path: default_feature_path(),
            property_path: default_property_path(),
            csrf_header: default_csrf_header(),
            csrf_token: None,
            timeout_secs: default_timeout_secs(),
            default_srid: default_srid(),
        }
    }

    pub fn with_csrf_token(mut self, token: &str) -> Self {
        self.csrf_token = Some(token.to_owned());
        self
    }

    pub fn from_json_str(s: &str) -> Result<Self, Error> {
        let config: ClientConfig =
            serde_json::from_str(s).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::InvalidConfig(format!("{}: {}", path.display(), e)))?;
        log::debug!("loading client configuration from {}", path.display());
        Self::from_json_str(&contents)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn validate(&self) -> Result<(), Error> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(Error::InvalidConfig(format!(
                "base_url '{}' must be an http(s) url",
                self.base_url
            )));
        }
        if self.feature_path.trim_matches('/').is_empty()
            || self.property_path.trim_matches('/').is_empty()
        {
            return Err(Error::InvalidConfig(
                "resource paths must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
