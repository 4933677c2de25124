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

//! Client for a GeoJSON feature and property storage API.
//!
//! # Example
//!
//! ```no_run
//! use geojson_rest::{complement, Client, ClientConfig, FeatureRoute, LimitParams, UserSelector};
//!
//! # fn main() -> Result<(), geojson_rest::Error> {
//! let client = Client::new(ClientConfig::new("https://example.org/geojson"));
//! let mine = client.get_features(&FeatureRoute::new(), &LimitParams::new())?;
//! let everyone = client.get_features(
//!     &FeatureRoute::new().user(UserSelector::All),
//!     &LimitParams::new(),
//! )?;
//! let others = complement(&everyone, &mine)?;
//! println!("{} features by other users", others.features.len());
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;
pub mod esri;
pub mod json;
mod layer;
mod property;
mod route;
mod set_ops;
pub mod transport;

pub use crate::client::{Client, Created};
pub use crate::config::ClientConfig;
pub use crate::error::{Error, Operand};
pub use crate::layer::{FeatureLayer, QueryState, RequestDedup};
pub use crate::property::parse_properties;
pub use crate::route::{
    FeatureRoute, FeatureScope, GroupSelector, LimitParams, PropertyRoute, PropertySelector,
    UserSelector, MAX_GROUP_LEN,
};
pub use crate::set_ops::{
    complement, complement_in_place, feature_ids, intersect, union, union_in_place, FeatureKey,
};
