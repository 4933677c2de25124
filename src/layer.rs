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

use std::collections::HashMap;

use crate::client::Client;
use crate::esri::{collection_srid, feature_to_graphic, Graphic};
use crate::route::{FeatureRoute, LimitParams};
use crate::transport::Transport;
use crate::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueryState {
    InFlight,
    Loaded,
}

/// Remembers which queries were already sent, so the same graphics are
/// never added to a layer twice.
#[derive(Clone, Debug, Default)]
pub struct RequestDedup {
    states: HashMap<String, QueryState>,
}

impl RequestDedup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `key` in flight. Returns `false` if it was already started
    /// or loaded.
    pub fn try_begin(&mut self, key: &str) -> bool {
        if self.states.contains_key(key) {
            return false;
        }
        self.states.insert(key.to_owned(), QueryState::InFlight);
        true
    }

    pub fn finish(&mut self, key: &str) {
        self.states.insert(key.to_owned(), QueryState::Loaded);
    }

    /// Forgets `key`, e.g. after a failed request, so it can be retried.
    pub fn release(&mut self, key: &str) {
        self.states.remove(key);
    }

    pub fn state(&self, key: &str) -> Option<QueryState> {
        self.states.get(key).copied()
    }

    pub fn clear(&mut self) {
        self.states.clear();
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

/// Graphics fetched from the feature API, loaded at most once per query.
#[derive(Clone, Debug, Default)]
pub struct FeatureLayer {
    route: FeatureRoute,
    graphics: Vec<Graphic>,
    queries: RequestDedup,
}

impl FeatureLayer {
    pub fn new(route: FeatureRoute) -> Self {
        FeatureLayer {
            route,
            graphics: Vec::new(),
            queries: RequestDedup::new(),
        }
    }

    pub fn graphics(&self) -> &[Graphic] {
        &self.graphics
    }

    pub fn queries(&self) -> &RequestDedup {
        &self.queries
    }

    /// Fetches the features matching `params` and adds them as graphics.
    ///
    /// Returns `Ok(None)` without sending anything when the same query was
    /// made before, otherwise the graphics that were added. Features whose
    /// geometry has no graphic form are skipped.
    pub fn load<T: Transport>(
        &mut self,
        client: &Client<T>,
        params: &LimitParams,
    ) -> Result<Option<&[Graphic]>, Error> {
        let key = params.to_string();
        if !self.queries.try_begin(&key) {
            log::debug!("query '{}' already sent for this layer", key);
            return Ok(None);
        }
        let collection = match client.get_features(&self.route, params) {
            Ok(fc) => fc,
            Err(e) => {
                self.queries.release(&key);
                return Err(e);
            }
        };
        let srid = collection_srid(&collection, client.config().default_srid);
        let before = self.graphics.len();
        for (index, feature) in collection.features.iter().enumerate() {
            match feature_to_graphic(feature, srid) {
                Ok(graphic) => self.graphics.push(graphic),
                Err(e) => log::warn!("skipping feature {}: {}", index, e),
            }
        }
        self.queries.finish(&key);
        log::debug!(
            "query '{}' added {} graphics",
            key,
            self.graphics.len() - before
        );
        Ok(Some(&self.graphics[before..]))
    }

    /// Drops every graphic and forgets all queries.
    pub fn clear(&mut self) {
        self.graphics.clear();
        self.queries.clear();
    }
}
