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

//! Translation between ESRI graphics and GeoJSON features.
//!
//! These helpers are kept for callers that still work with ESRI JSON
//! geometries. New code should send GeoJSON through [`Client`] directly.

use geojson::feature::Id;
use geojson::{Feature, FeatureCollection, Geometry, GeoJson, Value};
use serde::{Deserialize, Serialize};

use crate::client::{Client, Created};
use crate::json::{JsonObject, JsonValue};
use crate::route::FeatureRoute;
use crate::transport::Transport;
use crate::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpatialReference {
    pub wkid: u32,
}

/// ESRI JSON geometry, tagged by its lowercase `type`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EsriGeometry {
    Point {
        x: f64,
        y: f64,
        #[serde(rename = "spatialReference")]
        spatial_reference: SpatialReference,
    },
    Polyline {
        paths: Vec<Vec<Vec<f64>>>,
        #[serde(rename = "spatialReference")]
        spatial_reference: SpatialReference,
    },
    Polygon {
        rings: Vec<Vec<Vec<f64>>>,
        #[serde(rename = "spatialReference")]
        spatial_reference: SpatialReference,
    },
}

impl EsriGeometry {
    pub fn spatial_reference(&self) -> SpatialReference {
        match *self {
            EsriGeometry::Point {
                spatial_reference, ..
            }
            | EsriGeometry::Polyline {
                spatial_reference, ..
            }
            | EsriGeometry::Polygon {
                spatial_reference, ..
            } => spatial_reference,
        }
    }
}

/// A geometry with attributes, as drawn on an ESRI map layer.
#[derive(Clone, Debug, PartialEq)]
pub struct Graphic {
    pub geometry: EsriGeometry,
    pub attributes: JsonObject,
    pub id: Option<Id>,
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Point(..) => "Point",
        Value::MultiPoint(..) => "MultiPoint",
        Value::LineString(..) => "LineString",
        Value::MultiLineString(..) => "MultiLineString",
        Value::Polygon(..) => "Polygon",
        Value::MultiPolygon(..) => "MultiPolygon",
        Value::GeometryCollection(..) => "GeometryCollection",
    }
}

fn crs_member(wkid: u32) -> JsonObject {
    let mut members = JsonObject::new();
    members.insert(
        "crs".to_string(),
        serde_json::json!({"type": "EPSG", "properties": {"code": wkid}}),
    );
    members
}

/// Converts a graphic to a feature.
///
/// A polyline keeps only its first path. The geometry carries the
/// spatial reference as an `EPSG` `crs` member.
pub fn graphic_to_feature(graphic: &Graphic) -> Result<Feature, Error> {
    let value = match graphic.geometry {
        EsriGeometry::Point { x, y, .. } => Value::Point(vec![x, y]),
        EsriGeometry::Polyline { ref paths, .. } => match paths.first() {
            Some(path) => Value::LineString(path.clone()),
            None => return Err(Error::ExpectedProperty("paths".to_string())),
        },
        EsriGeometry::Polygon { ref rings, .. } => Value::Polygon(rings.clone()),
    };
    let wkid = graphic.geometry.spatial_reference().wkid;
    Ok(Feature {
        bbox: None,
        geometry: Some(Geometry {
            bbox: None,
            value,
            foreign_members: Some(crs_member(wkid)),
        }),
        id: graphic.id.clone(),
        properties: Some(graphic.attributes.clone()),
        foreign_members: None,
    })
}

/// Converts a feature to a graphic in the spatial reference `wkid`.
///
/// Only Point, LineString and Polygon geometries have a graphic form.
pub fn feature_to_graphic(feature: &Feature, wkid: u32) -> Result<Graphic, Error> {
    let spatial_reference = SpatialReference { wkid };
    let value = match feature.geometry {
        Some(ref g) => &g.value,
        None => return Err(Error::ExpectedProperty("geometry".to_string())),
    };
    let geometry = match value {
        Value::Point(pos) if pos.len() >= 2 => EsriGeometry::Point {
            x: pos[0],
            y: pos[1],
            spatial_reference,
        },
        Value::Point(_) => return Err(Error::ExpectedProperty("coordinates".to_string())),
        Value::LineString(line) => EsriGeometry::Polyline {
            paths: vec![line.clone()],
            spatial_reference,
        },
        Value::Polygon(rings) => EsriGeometry::Polygon {
            rings: rings.clone(),
            spatial_reference,
        },
        other => return Err(Error::UnsupportedGeometry(type_name(other).to_string())),
    };
    Ok(Graphic {
        geometry,
        attributes: feature.properties.clone().unwrap_or_default(),
        id: feature.id.clone(),
    })
}

fn parse_srid(code: &JsonValue) -> Option<u32> {
    match code {
        JsonValue::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        // "EPSG:4326", "urn:ogc:def:crs:EPSG::4326" or a bare "4326"
        JsonValue::String(s) => s.rsplit(':').next().and_then(|n| n.trim().parse().ok()),
        _ => None,
    }
}

/// Spatial reference named by the `crs` member of `collection`.
pub fn collection_srid(collection: &FeatureCollection, default: u32) -> u32 {
    let code = collection
        .foreign_members
        .as_ref()
        .and_then(|m| m.get("crs"))
        .and_then(|crs| crs.get("properties"))
        .and_then(|p| p.get("code"));
    match code.and_then(parse_srid) {
        Some(srid) => srid,
        None => {
            if code.is_some() {
                log::warn!("unreadable crs code {:?}, using {}", code, default);
            }
            default
        }
    }
}

/// What [`save_graphic`] did with a graphic.
#[derive(Clone, Debug, PartialEq)]
pub enum Saved {
    Created(Created),
    Updated(Feature),
}

/// Updates the graphic when it has an id, creates it otherwise.
pub fn save_graphic<T: Transport>(client: &Client<T>, graphic: &Graphic) -> Result<Saved, Error> {
    let feature = graphic_to_feature(graphic)?;
    if feature.id.is_some() {
        client.update_feature(&feature).map(Saved::Updated)
    } else {
        client
            .create_feature(&FeatureRoute::new(), &GeoJson::Feature(feature))
            .map(Saved::Created)
    }
}

/// Deletes the feature behind a graphic.
pub fn remove_graphic<T: Transport>(client: &Client<T>, id: Id) -> Result<String, Error> {
    let feature = Feature {
        bbox: None,
        geometry: None,
        id: Some(id),
        properties: None,
        foreign_members: None,
    };
    client.delete_feature(&GeoJson::Feature(feature))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::RecordingTransport;
    use crate::transport::Method;
    use crate::ClientConfig;

    fn attributes() -> JsonObject {
        let mut attrs = JsonObject::new();
        attrs.insert("name".to_string(), "bench".into());
        attrs
    }

    fn wgs84() -> SpatialReference {
        SpatialReference { wkid: 4326 }
    }

    #[test]
    fn decode_esri_json() {
        let geometry: EsriGeometry = serde_json::from_str(
            r#"{"type":"polyline","paths":[[[1.0,2.0],[3.0,4.0]]],"spatialReference":{"wkid":3067}}"#,
        )
        .unwrap();
        assert_eq!(
            geometry,
            EsriGeometry::Polyline {
                paths: vec![vec![vec![1.0, 2.0], vec![3.0, 4.0]]],
                spatial_reference: SpatialReference { wkid: 3067 },
            }
        );
    }

    #[test]
    fn point_graphic_to_feature() {
        let graphic = Graphic {
            geometry: EsriGeometry::Point {
                x: 24.9,
                y: 60.2,
                spatial_reference: wgs84(),
            },
            attributes: attributes(),
            id: Some(Id::Number(3.into())),
        };
        let feature = graphic_to_feature(&graphic).unwrap();
        let json = serde_json::to_value(&feature).unwrap();
        assert_eq!(json["geometry"]["type"], "Point");
        assert_eq!(json["geometry"]["coordinates"], serde_json::json!([24.9, 60.2]));
        assert_eq!(
            json["geometry"]["crs"],
            serde_json::json!({"type": "EPSG", "properties": {"code": 4326}})
        );
        assert_eq!(json["properties"]["name"], "bench");
        assert_eq!(json["id"], 3);
    }

    #[test]
    fn polyline_keeps_first_path() {
        let graphic = Graphic {
            geometry: EsriGeometry::Polyline {
                paths: vec![vec![vec![0.0, 0.0], vec![1.0, 1.0]], vec![vec![5.0, 5.0]]],
                spatial_reference: wgs84(),
            },
            attributes: JsonObject::new(),
            id: None,
        };
        let feature = graphic_to_feature(&graphic).unwrap();
        assert_eq!(
            feature.geometry.unwrap().value,
            Value::LineString(vec![vec![0.0, 0.0], vec![1.0, 1.0]])
        );
        assert_eq!(feature.id, None);
    }

    #[test]
    fn empty_polyline_is_rejected() {
        let graphic = Graphic {
            geometry: EsriGeometry::Polyline {
                paths: vec![],
                spatial_reference: wgs84(),
            },
            attributes: JsonObject::new(),
            id: None,
        };
        assert_eq!(
            graphic_to_feature(&graphic),
            Err(Error::ExpectedProperty("paths".to_string()))
        );
    }

    #[test]
    fn feature_to_graphic_and_back() {
        let rings = vec![vec![
            vec![0.0, 0.0],
            vec![1.0, 0.0],
            vec![1.0, 1.0],
            vec![0.0, 0.0],
        ]];
        let feature = Feature {
            bbox: None,
            geometry: Some(Geometry::new(Value::Polygon(rings.clone()))),
            id: Some(Id::String("a".to_string())),
            properties: Some(attributes()),
            foreign_members: None,
        };
        let graphic = feature_to_graphic(&feature, 3067).unwrap();
        assert_eq!(
            graphic.geometry,
            EsriGeometry::Polygon {
                rings,
                spatial_reference: SpatialReference { wkid: 3067 },
            }
        );
        assert_eq!(graphic.attributes, attributes());
        let back = graphic_to_feature(&graphic).unwrap();
        assert_eq!(back.id, feature.id);
        assert_eq!(back.geometry.unwrap().value, feature.geometry.unwrap().value);
    }

    #[test]
    fn multi_geometries_have_no_graphic() {
        let feature = Feature {
            bbox: None,
            geometry: Some(Geometry::new(Value::MultiPoint(vec![vec![0.0, 0.0]]))),
            id: None,
            properties: None,
            foreign_members: None,
        };
        assert_eq!(
            feature_to_graphic(&feature, 4326),
            Err(Error::UnsupportedGeometry("MultiPoint".to_string()))
        );
    }

    #[test]
    fn srid_from_crs_member() {
        let mut fc = FeatureCollection {
            bbox: None,
            features: vec![],
            foreign_members: None,
        };
        assert_eq!(collection_srid(&fc, 4326), 4326);

        let mut members = JsonObject::new();
        members.insert(
            "crs".to_string(),
            serde_json::json!({"type": "name", "properties": {"code": "EPSG:3067"}}),
        );
        fc.foreign_members = Some(members);
        assert_eq!(collection_srid(&fc, 4326), 3067);

        fc.foreign_members = Some(crs_member(2393));
        assert_eq!(collection_srid(&fc, 4326), 2393);
    }

    #[test]
    fn save_graphic_creates_or_updates() {
        let transport = RecordingTransport::new()
            .respond_created("/feat/user1/@self/8", r#"{"id":8}"#)
            .respond(
                200,
                r#"{"type":"Feature","id":8,"geometry":{"type":"Point","coordinates":[1.0,2.0]},"properties":{}}"#,
            );
        let client = Client::with_transport(ClientConfig::new("http://localhost"), transport);
        let mut graphic = Graphic {
            geometry: EsriGeometry::Point {
                x: 1.0,
                y: 2.0,
                spatial_reference: wgs84(),
            },
            attributes: JsonObject::new(),
            id: None,
        };
        match save_graphic(&client, &graphic).unwrap() {
            Saved::Created(created) => assert_eq!(created.id(), Some(8)),
            other => panic!("expected a create, got {:?}", other),
        }
        graphic.id = Some(Id::Number(8.into()));
        match save_graphic(&client, &graphic).unwrap() {
            Saved::Updated(feature) => assert_eq!(feature.id, graphic.id),
            other => panic!("expected an update, got {:?}", other),
        }
    }

    #[test]
    fn remove_graphic_deletes_by_id() {
        let transport = RecordingTransport::new().respond(200, "A feature was deleted");
        let client = Client::with_transport(ClientConfig::new("http://localhost"), &transport);
        remove_graphic(&client, Id::Number(4.into())).unwrap();
        let sent = transport.sent();
        assert_eq!(sent[0].method, Method::Delete);
        assert_eq!(sent[0].url, "http://localhost/feat?ids=%5B4%5D");
    }
}
