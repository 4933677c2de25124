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

use geojson::feature::Id;
use geojson::{Feature, FeatureCollection, GeoJson};

use crate::json::{JsonObject, JsonValue};
use crate::property::parse_properties;
use crate::route::{join_url, FeatureRoute, LimitParams, PropertyRoute};
use crate::transport::{ApiRequest, ApiResponse, Method, Transport, UreqTransport};
use crate::{ClientConfig, Error};

/// Answer to a successful POST: where the new entity lives and what the
/// server stored.
#[derive(Clone, Debug, PartialEq)]
pub struct Created {
    pub location: Option<String>,
    pub entity: JsonValue,
}

impl Created {
    /// The id the server assigned, if the entity carries one.
    pub fn id(&self) -> Option<u64> {
        self.entity.get("id").and_then(JsonValue::as_u64)
    }
}

/// Client for the feature and property resources of the API.
pub struct Client<T = UreqTransport> {
    config: ClientConfig,
    transport: T,
}

impl Client<UreqTransport> {
    pub fn new(config: ClientConfig) -> Self {
        let transport = UreqTransport::new(config.timeout());
        Client { config, transport }
    }
}

impl<T: Transport> Client<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Client { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn feature_url(&self, route: &FeatureRoute) -> String {
        join_url(&self.config.base_url, &self.config.feature_path, &route.segments())
    }

    pub fn property_url(&self, route: &PropertyRoute) -> String {
        join_url(&self.config.base_url, &self.config.property_path, &route.segments())
    }

    fn request(&self, method: Method, url: String, body: Option<String>) -> ApiRequest {
        let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
        if let Some(ref token) = self.config.csrf_token {
            headers.push((self.config.csrf_header.clone(), token.clone()));
        }
        ApiRequest {
            method,
            url,
            headers,
            body,
        }
    }

    fn execute(&self, request: ApiRequest) -> Result<ApiResponse, Error> {
        let response = self.transport.send(&request)?;
        if !response.is_success() {
            log::warn!(
                "{} {} answered {}",
                request.method,
                request.url,
                response.status
            );
        }
        response.error_for_status()
    }

    fn created(response: ApiResponse) -> Result<Created, Error> {
        let entity = if response.body.trim().is_empty() {
            JsonValue::Null
        } else {
            serde_json::from_str(&response.body)?
        };
        Ok(Created {
            location: response.location,
            entity,
        })
    }

    /// Fetches the features below `route`, narrowed by `params`.
    pub fn get_features(
        &self,
        route: &FeatureRoute,
        params: &LimitParams,
    ) -> Result<FeatureCollection, Error> {
        let url = format!("{}{}", self.feature_url(route), params);
        let response = self.execute(self.request(Method::Get, url, None))?;
        match response.body.parse::<GeoJson>()? {
            GeoJson::FeatureCollection(fc) => Ok(fc),
            _ => Err(Error::MalformedJson(
                "expected a FeatureCollection".to_string(),
            )),
        }
    }

    /// Saves a new feature, or every feature of a collection.
    pub fn create_feature(
        &self,
        route: &FeatureRoute,
        geojson: &GeoJson,
    ) -> Result<Created, Error> {
        let body = serde_json::to_string(geojson)?;
        let request = self.request(Method::Post, self.feature_url(route), Some(body));
        let response = self.execute(request)?;
        Self::created(response)
    }

    /// Updates a feature that has been saved before and so has an id.
    pub fn update_feature(&self, feature: &Feature) -> Result<Feature, Error> {
        let id = update_id(feature)?;
        let url = self.feature_url(&FeatureRoute::new().feature(id));
        let body = serde_json::to_string(feature)?;
        let response = self.execute(self.request(Method::Put, url, Some(body)))?;
        match response.body.parse::<GeoJson>()? {
            GeoJson::Feature(f) => Ok(f),
            _ => Err(Error::MalformedJson("expected a Feature".to_string())),
        }
    }

    /// Updates every feature of `collection` in turn, stopping at the
    /// first failure.
    pub fn update_features(&self, collection: &FeatureCollection) -> Result<Vec<Feature>, Error> {
        // Check all ids first so a bad collection sends nothing.
        for feature in &collection.features {
            update_id(feature)?;
        }
        collection
            .features
            .iter()
            .map(|feature| self.update_feature(feature))
            .collect()
    }

    /// Deletes the feature, or all features of a collection that carry an
    /// id, in a single request.
    pub fn delete_feature(&self, geojson: &GeoJson) -> Result<String, Error> {
        let ids = delete_ids(geojson)?;
        let ids = serde_json::to_string(&ids)?;
        let params = LimitParams::new().with("ids", &ids);
        let url = format!("{}{}", self.feature_url(&FeatureRoute::new()), params);
        Ok(self.execute(self.request(Method::Delete, url, None))?.body)
    }

    /// Deletes the single feature addressed by `route`.
    pub fn delete_feature_at(&self, route: &FeatureRoute) -> Result<String, Error> {
        Ok(self
            .execute(self.request(Method::Delete, self.feature_url(route), None))?
            .body)
    }

    pub fn get_properties(&self, route: &PropertyRoute) -> Result<Vec<JsonObject>, Error> {
        let response = self.execute(self.request(Method::Get, self.property_url(route), None))?;
        parse_properties(&response.body)
    }

    pub fn create_property(
        &self,
        route: &PropertyRoute,
        property: &JsonObject,
    ) -> Result<Created, Error> {
        let body = serde_json::to_string(property)?;
        let request = self.request(Method::Post, self.property_url(route), Some(body));
        let response = self.execute(request)?;
        Self::created(response)
    }

    pub fn update_property(
        &self,
        route: &PropertyRoute,
        property: &JsonObject,
    ) -> Result<JsonObject, Error> {
        if route.property.is_none() {
            return Err(Error::InvalidPathSegment {
                kind: "property",
                value: String::new(),
            });
        }
        let body = serde_json::to_string(property)?;
        let request = self.request(Method::Put, self.property_url(route), Some(body));
        let response = self.execute(request)?;
        match serde_json::from_str(&response.body)? {
            JsonValue::Object(o) => Ok(o),
            _ => Err(Error::MalformedJson("expected a property object".to_string())),
        }
    }

    pub fn delete_property(&self, route: &PropertyRoute) -> Result<String, Error> {
        if route.property.is_none() {
            return Err(Error::InvalidPathSegment {
                kind: "property",
                value: String::new(),
            });
        }
        Ok(self
            .execute(self.request(Method::Delete, self.property_url(route), None))?
            .body)
    }
}

fn update_id(feature: &Feature) -> Result<u64, Error> {
    match feature.id {
        Some(Id::Number(ref n)) => n.as_u64().ok_or(Error::MissingUpdateId),
        Some(Id::String(ref s)) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => {
            s.parse().map_err(|_| Error::MissingUpdateId)
        }
        Some(Id::String(_)) | None => Err(Error::MissingUpdateId),
    }
}

fn id_value(id: &Id) -> JsonValue {
    match id {
        Id::String(s) => JsonValue::String(s.clone()),
        Id::Number(n) => JsonValue::Number(n.clone()),
    }
}

/// Ids sent with a delete: the id of a feature, or the ids of every
/// feature of a collection that has one.
fn delete_ids(geojson: &GeoJson) -> Result<Vec<JsonValue>, Error> {
    match geojson {
        GeoJson::Feature(feature) => match feature.id {
            Some(ref id) => Ok(vec![id_value(id)]),
            None => Err(Error::FeatureWithoutId),
        },
        GeoJson::FeatureCollection(fc) => {
            let ids: Vec<JsonValue> = fc
                .features
                .iter()
                .filter_map(|f| f.id.as_ref())
                .map(id_value)
                .collect();
            if ids.len() < fc.features.len() {
                log::debug!(
                    "skipping {} features without id",
                    fc.features.len() - ids.len()
                );
            }
            Ok(ids)
        }
        GeoJson::Geometry(_) => Err(Error::ExpectedFeatureOrCollection),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::{FeatureScope, GroupSelector, PropertySelector, UserSelector};
    use crate::transport::mock::RecordingTransport;
    use geojson::{Geometry, Value};

    const BASE: &str = "http://localhost:8000/geojson";

    fn client(transport: RecordingTransport) -> Client<RecordingTransport> {
        Client::with_transport(ClientConfig::new(BASE).with_csrf_token("tok"), transport)
    }

    fn point(id: Option<Id>) -> Feature {
        Feature {
            bbox: None,
            geometry: Some(Geometry::new(Value::Point(vec![20.0, 30.0]))),
            id,
            properties: Some(JsonObject::new()),
            foreign_members: None,
        }
    }

    #[test]
    fn get_features_builds_url_and_headers() {
        let body = r#"{"type":"FeatureCollection","features":[{"type":"Feature","id":7,"geometry":{"type":"Point","coordinates":[1.0,2.0]},"properties":{}}],"crs":{"type":"name","properties":{"code":"EPSG:4326"}}}"#;
        let c = client(RecordingTransport::new().respond(200, body));
        let route = FeatureRoute::new().user(UserSelector::named("user1").unwrap());
        let fc = c
            .get_features(&route, &LimitParams::new().time("2012"))
            .unwrap();
        assert_eq!(fc.features.len(), 1);
        assert!(fc.foreign_members.unwrap().contains_key("crs"));

        let sent = c.transport.sent();
        assert_eq!(sent[0].method, Method::Get);
        assert_eq!(sent[0].url, format!("{}/feat/user1?time=2012", BASE));
        assert!(sent[0]
            .headers
            .contains(&("X-CSRFToken".to_string(), "tok".to_string())));
        assert!(sent[0]
            .headers
            .contains(&("Content-Type".to_string(), "application/json".to_string())));
    }

    #[test]
    fn http_errors_are_reported() {
        let c = client(
            RecordingTransport::new()
                .respond(401, "The request has to be made by a signed in user"),
        );
        let err = c
            .get_features(&FeatureRoute::new(), &LimitParams::new())
            .unwrap_err();
        assert_eq!(
            err,
            Error::Http {
                status: 401,
                body: "The request has to be made by a signed in user".to_string()
            }
        );
    }

    #[test]
    fn transport_errors_pass_through() {
        let c = client(RecordingTransport::new().fail("connection refused"));
        assert_eq!(
            c.get_features(&FeatureRoute::new(), &LimitParams::new()),
            Err(Error::Transport("connection refused".to_string()))
        );
    }

    #[test]
    fn create_feature_posts_geojson() {
        let c = client(RecordingTransport::new().respond_created(
            "/geojson/feat/user1/@self/12",
            r#"{"type":"Feature","id":12,"geometry":{"type":"Point","coordinates":[20.0,30.0]},"properties":{}}"#,
        ));
        let created = c
            .create_feature(&FeatureRoute::new(), &GeoJson::Feature(point(None)))
            .unwrap();
        assert_eq!(created.id(), Some(12));
        assert_eq!(created.location.as_deref(), Some("/geojson/feat/user1/@self/12"));

        let sent = c.transport.sent();
        assert_eq!(sent[0].method, Method::Post);
        assert_eq!(sent[0].url, format!("{}/feat", BASE));
        let body: JsonValue = serde_json::from_str(sent[0].body.as_ref().unwrap()).unwrap();
        assert_eq!(body["type"], "Feature");
        assert_eq!(body["geometry"]["coordinates"], serde_json::json!([20.0, 30.0]));
    }

    #[test]
    fn update_feature_puts_to_feature_path() {
        let c = client(RecordingTransport::new().respond(
            200,
            r#"{"type":"Feature","id":5,"geometry":{"type":"Point","coordinates":[20.0,30.0]},"properties":{"a":1}}"#,
        ));
        let updated = c.update_feature(&point(Some(Id::Number(5.into())))).unwrap();
        assert_eq!(updated.id, Some(Id::Number(5.into())));
        let sent = c.transport.sent();
        assert_eq!(sent[0].method, Method::Put);
        assert_eq!(sent[0].url, format!("{}/feat/@me/@self/5", BASE));
    }

    #[test]
    fn update_needs_numeric_id() {
        let c = client(RecordingTransport::new());
        assert_eq!(c.update_feature(&point(None)), Err(Error::MissingUpdateId));
        assert_eq!(
            c.update_feature(&point(Some(Id::String("abc".to_string())))),
            Err(Error::MissingUpdateId)
        );
        let fc = FeatureCollection {
            bbox: None,
            features: vec![point(Some(Id::Number(1.into()))), point(None)],
            foreign_members: None,
        };
        assert_eq!(c.update_features(&fc), Err(Error::MissingUpdateId));
        assert!(c.transport.sent().is_empty());
    }

    #[test]
    fn delete_sends_ids_of_collection() {
        let c = client(RecordingTransport::new().respond(200, "A feature was deleted"));
        let fc = FeatureCollection {
            bbox: None,
            features: vec![
                point(Some(Id::Number(1.into()))),
                point(None),
                point(Some(Id::Number(3.into()))),
            ],
            foreign_members: None,
        };
        let answer = c.delete_feature(&GeoJson::FeatureCollection(fc)).unwrap();
        assert_eq!(answer, "A feature was deleted");
        let sent = c.transport.sent();
        assert_eq!(sent[0].method, Method::Delete);
        assert_eq!(sent[0].url, format!("{}/feat?ids=%5B1%2C3%5D", BASE));
        assert_eq!(sent[0].body, None);
    }

    #[test]
    fn delete_of_feature_without_id_sends_nothing() {
        let c = client(RecordingTransport::new());
        let err = c.delete_feature(&GeoJson::Feature(point(None))).unwrap_err();
        assert_eq!(err, Error::FeatureWithoutId);
        assert_eq!(err.to_string(), "Feature has no 'id'.");
        assert!(c.transport.sent().is_empty());
    }

    #[test]
    fn update_id_must_be_all_digits() {
        let c = client(RecordingTransport::new().respond(
            200,
            r#"{"type":"Feature","id":5,"geometry":{"type":"Point","coordinates":[20.0,30.0]},"properties":{}}"#,
        ));
        for id in ["+5", " 5", "", "5a"] {
            assert_eq!(
                c.update_feature(&point(Some(Id::String(id.to_string())))),
                Err(Error::MissingUpdateId)
            );
        }
        assert!(c.transport.sent().is_empty());
        c.update_feature(&point(Some(Id::String("5".to_string()))))
            .unwrap();
        assert_eq!(c.transport.sent()[0].url, format!("{}/feat/@me/@self/5", BASE));
    }

    #[test]
    fn delete_rejects_bare_geometry() {
        let c = client(RecordingTransport::new());
        let geometry = GeoJson::Geometry(Geometry::new(Value::Point(vec![0.0, 0.0])));
        assert_eq!(c.delete_feature(&geometry), Err(Error::ExpectedFeatureOrCollection));
    }

    #[test]
    fn delete_feature_at_path() {
        let c = client(RecordingTransport::new().respond(200, "A feature was deleted"));
        let route = FeatureRoute::new()
            .group(GroupSelector::named("survey").unwrap())
            .feature(9);
        c.delete_feature_at(&route).unwrap();
        assert_eq!(c.transport.sent()[0].url, format!("{}/feat/@me/survey/9", BASE));
    }

    #[test]
    fn property_round_trip() {
        let c = client(
            RecordingTransport::new()
                .respond_created("/geojson/prop/user1/@self/@null/4", r#"{"id":4,"color":"red"}"#)
                .respond(200, r#"{"totalResults":2,"entry":[{"id":4},{"id":5}]}"#)
                .respond(200, r#"{"id":4,"color":"blue"}"#)
                .respond(200, "A property was deleted"),
        );
        let mut prop = JsonObject::new();
        prop.insert("color".to_string(), "red".into());

        let created = c.create_property(&PropertyRoute::new(), &prop).unwrap();
        assert_eq!(created.id(), Some(4));

        let all = c
            .get_properties(
                &PropertyRoute::new()
                    .feature(FeatureScope::Null)
                    .property(PropertySelector::All),
            )
            .unwrap();
        assert_eq!(all.len(), 2);

        let route = PropertyRoute::new().property(PropertySelector::Id(4));
        prop.insert("color".to_string(), "blue".into());
        let updated = c.update_property(&route, &prop).unwrap();
        assert_eq!(updated["color"], "blue");

        c.delete_property(&route).unwrap();

        let urls: Vec<String> = c.transport.sent().into_iter().map(|r| r.url).collect();
        assert_eq!(
            urls,
            vec![
                format!("{}/prop", BASE),
                format!("{}/prop/@me/@self/@null/@all", BASE),
                format!("{}/prop/@me/@self/@null/4", BASE),
                format!("{}/prop/@me/@self/@null/4", BASE),
            ]
        );
    }

    #[test]
    fn property_writes_need_a_property_id() {
        let c = client(RecordingTransport::new());
        assert!(c.delete_property(&PropertyRoute::new()).is_err());
        assert!(c.update_property(&PropertyRoute::new(), &JsonObject::new()).is_err());
        assert!(c.transport.sent().is_empty());
    }
}
