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

use crate::json::{JsonObject, JsonValue};
use crate::Error;

/// Decodes a property GET answer into a list of properties.
///
/// A single match is sent as the bare property object, several as
/// `{"totalResults": n, "entry": [...]}`.
pub fn parse_properties(body: &str) -> Result<Vec<JsonObject>, Error> {
    let mut object = match serde_json::from_str::<JsonValue>(body)? {
        JsonValue::Object(o) => o,
        _ => return Err(Error::MalformedJson("expected a JSON object".to_string())),
    };
    if !object.contains_key("entry") {
        return Ok(vec![object]);
    }
    let entries = match object.remove("entry") {
        Some(JsonValue::Array(a)) => a,
        _ => return Err(Error::ExpectedProperty("entry".to_string())),
    };
    let mut properties = Vec::with_capacity(entries.len());
    for entry in entries {
        match entry {
            JsonValue::Object(o) => properties.push(o),
            _ => return Err(Error::MalformedJson("property entry is not an object".to_string())),
        }
    }
    if let Some(total) = object.get("totalResults").and_then(JsonValue::as_u64) {
        if total as usize != properties.len() {
            log::warn!(
                "property answer announced {} results but carried {}",
                total,
                properties.len()
            );
        }
    }
    Ok(properties)
}
