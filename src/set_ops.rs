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

//! Set algebra over feature collections, keyed by feature `id`.
//!
//! Every feature taking part in an operation must carry an `id`. A feature
//! without one is reported as [`Error::MissingFeatureId`] instead of being
//! matched against nothing.

use std::collections::HashSet;

use geojson::feature::Id;
use geojson::{Feature, FeatureCollection};

use crate::{Error, Operand};

/// Hashable identity of a feature id.
///
/// Numbers compare by value, so `1` and `1.0` are the same feature, but a
/// string id never matches a numeric one.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FeatureKey {
    String(String),
    /// Bits of the `f64` value.
    Number(u64),
}

impl From<&Id> for FeatureKey {
    fn from(id: &Id) -> Self {
        match id {
            Id::String(s) => FeatureKey::String(s.clone()),
            Id::Number(n) => {
                // as_f64 only fails with serde_json's arbitrary_precision,
                // which this crate does not enable.
                let f = n.as_f64().unwrap_or(f64::NAN);
                // -0.0 and 0.0 are the same id
                let f = if f == 0.0 { 0.0 } else { f };
                FeatureKey::Number(f.to_bits())
            }
        }
    }
}

fn feature_key(feature: &Feature, operand: Operand, index: usize) -> Result<FeatureKey, Error> {
    feature
        .id
        .as_ref()
        .map(FeatureKey::from)
        .ok_or(Error::MissingFeatureId { operand, index })
}

fn keys(collection: &FeatureCollection, operand: Operand) -> Result<Vec<FeatureKey>, Error> {
    collection
        .features
        .iter()
        .enumerate()
        .map(|(index, feature)| feature_key(feature, operand, index))
        .collect()
}

fn key_set(
    collection: &FeatureCollection,
    operand: Operand,
) -> Result<HashSet<FeatureKey>, Error> {
    Ok(keys(collection, operand)?.into_iter().collect())
}

/// The ids of `collection` in feature order.
pub fn feature_ids(collection: &FeatureCollection) -> Result<Vec<Id>, Error> {
    collection
        .features
        .iter()
        .enumerate()
        .map(|(index, feature)| {
            feature.id.clone().ok_or(Error::MissingFeatureId {
                operand: Operand::First,
                index,
            })
        })
        .collect()
}

/// Features of `a`, followed by the features of `b` whose id is not in `a`.
///
/// The result keeps the `bbox` and foreign members (such as `crs`) of `a`.
pub fn union(a: &FeatureCollection, b: &FeatureCollection) -> Result<FeatureCollection, Error> {
    let mut result = a.clone();
    union_in_place(&mut result, b)?;
    Ok(result)
}

/// Like [`union`], but appends to the features of `a` directly.
///
/// `a` is left untouched when an error is returned.
pub fn union_in_place(a: &mut FeatureCollection, b: &FeatureCollection) -> Result<(), Error> {
    let present = key_set(a, Operand::First)?;
    let b_keys = keys(b, Operand::Second)?;
    let before = a.features.len();
    a.features.extend(
        b.features
            .iter()
            .zip(b_keys)
            .filter(|(_, key)| !present.contains(key))
            .map(|(feature, _)| feature.clone()),
    );
    log::debug!(
        "union added {} of {} features",
        a.features.len() - before,
        b.features.len()
    );
    Ok(())
}

/// Features of `a` whose id also appears in `b`, in the order of `a`.
pub fn intersect(
    a: &FeatureCollection,
    b: &FeatureCollection,
) -> Result<FeatureCollection, Error> {
    let a_keys = keys(a, Operand::First)?;
    let wanted = key_set(b, Operand::Second)?;
    let features = a
        .features
        .iter()
        .zip(a_keys)
        .filter(|(_, key)| wanted.contains(key))
        .map(|(feature, _)| feature.clone())
        .collect();
    Ok(FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    })
}

/// Features of `a` whose id does not appear in `b`, in the order of `a`.
///
/// The result keeps the `bbox` and foreign members of `a`.
pub fn complement(
    a: &FeatureCollection,
    b: &FeatureCollection,
) -> Result<FeatureCollection, Error> {
    let mut result = a.clone();
    complement_in_place(&mut result, b)?;
    Ok(result)
}

/// Like [`complement`], but removes the matching features from `a`.
///
/// `a` is left untouched when an error is returned.
pub fn complement_in_place(a: &mut FeatureCollection, b: &FeatureCollection) -> Result<(), Error> {
    let a_keys = keys(a, Operand::First)?;
    let removed = key_set(b, Operand::Second)?;
    let mut a_keys = a_keys.into_iter();
    a.features.retain(|_| match a_keys.next() {
        Some(key) => !removed.contains(&key),
        None => true,
    });
    Ok(())
}
