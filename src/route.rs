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

//! Paths of the feature (`feat/...`) and property (`prop/...`) resources.

use std::fmt;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::Error;

/// Characters left as-is in query values.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Longest group name the server keeps.
pub const MAX_GROUP_LEN: usize = 50;

fn is_word(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '+'
}

fn check_name(kind: &'static str, value: &str, allow_dot: bool) -> Result<(), Error> {
    let valid = !value.is_empty()
        && !value.starts_with('@')
        && value.chars().all(|c| is_word(c) || (allow_dot && c == '.'));
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidPathSegment {
            kind,
            value: value.to_owned(),
        })
    }
}

/// Whose resources a request is about.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum UserSelector {
    /// The signed in user.
    #[default]
    Me,
    /// Every user the server lets the caller see.
    All,
    /// Public resources of everyone but the signed in user.
    Others,
    Named(String),
}

impl UserSelector {
    pub fn named(name: &str) -> Result<Self, Error> {
        check_name("user", name, true)?;
        Ok(UserSelector::Named(name.to_owned()))
    }
}

impl fmt::Display for UserSelector {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            UserSelector::Me => f.write_str("@me"),
            UserSelector::All => f.write_str("@all"),
            UserSelector::Others => f.write_str("@others"),
            UserSelector::Named(ref name) => f.write_str(name),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum GroupSelector {
    /// The default group of a user.
    #[default]
    OwnGroup,
    All,
    Named(String),
}

impl GroupSelector {
    pub fn named(name: &str) -> Result<Self, Error> {
        check_name("group", name, false)?;
        if name.chars().count() > MAX_GROUP_LEN {
            return Err(Error::InvalidPathSegment {
                kind: "group",
                value: name.to_owned(),
            });
        }
        Ok(GroupSelector::Named(name.to_owned()))
    }
}

impl fmt::Display for GroupSelector {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            GroupSelector::OwnGroup => f.write_str("@self"),
            GroupSelector::All => f.write_str("@all"),
            GroupSelector::Named(ref name) => f.write_str(name),
        }
    }
}

/// Which feature a property request is scoped to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeatureScope {
    Id(u64),
    /// Properties not attached to any feature.
    Null,
    All,
}

impl fmt::Display for FeatureScope {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            FeatureScope::Id(id) => write!(f, "{}", id),
            FeatureScope::Null => f.write_str("@null"),
            FeatureScope::All => f.write_str("@all"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PropertySelector {
    Id(u64),
    All,
}

impl fmt::Display for PropertySelector {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            PropertySelector::Id(id) => write!(f, "{}", id),
            PropertySelector::All => f.write_str("@all"),
        }
    }
}

/// Path below the feature resource, `feat/{user}/{group}/{feature}`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FeatureRoute {
    pub user: UserSelector,
    pub group: GroupSelector,
    pub feature: Option<u64>,
}

impl FeatureRoute {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user(mut self, user: UserSelector) -> Self {
        self.user = user;
        self
    }

    pub fn group(mut self, group: GroupSelector) -> Self {
        self.group = group;
        self
    }

    pub fn feature(mut self, id: u64) -> Self {
        self.feature = Some(id);
        self
    }

    /// Segments after the resource name. Trailing defaults are dropped.
    pub fn segments(&self) -> Vec<String> {
        let mut segments = Vec::with_capacity(3);
        let with_feature = self.feature.is_some();
        let with_group = with_feature || self.group != GroupSelector::default();
        let with_user = with_group || self.user != UserSelector::default();
        if with_user {
            segments.push(self.user.to_string());
        }
        if with_group {
            segments.push(self.group.to_string());
        }
        if let Some(id) = self.feature {
            segments.push(id.to_string());
        }
        segments
    }
}

/// Path below the property resource,
/// `prop/{user}/{group}/{feature}/{property}`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PropertyRoute {
    pub user: UserSelector,
    pub group: GroupSelector,
    pub feature: Option<FeatureScope>,
    pub property: Option<PropertySelector>,
}

impl PropertyRoute {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user(mut self, user: UserSelector) -> Self {
        self.user = user;
        self
    }

    pub fn group(mut self, group: GroupSelector) -> Self {
        self.group = group;
        self
    }

    pub fn feature(mut self, scope: FeatureScope) -> Self {
        self.feature = Some(scope);
        self
    }

    pub fn property(mut self, property: PropertySelector) -> Self {
        self.property = Some(property);
        self
    }

    /// Segments after the resource name. A property without a feature
    /// scope is addressed as an unattached (`@null`) property.
    pub fn segments(&self) -> Vec<String> {
        let mut segments = Vec::with_capacity(4);
        let feature = match (self.feature, self.property) {
            (Some(scope), _) => Some(scope),
            (None, Some(_)) => Some(FeatureScope::Null),
            (None, None) => None,
        };
        let with_group = feature.is_some() || self.group != GroupSelector::default();
        let with_user = with_group || self.user != UserSelector::default();
        if with_user {
            segments.push(self.user.to_string());
        }
        if with_group {
            segments.push(self.group.to_string());
        }
        if let Some(scope) = feature {
            segments.push(scope.to_string());
        }
        if let Some(property) = self.property {
            segments.push(property.to_string());
        }
        segments
    }
}

/// Query parameters that limit which features a GET returns.
///
/// Reserved keys include `user_id` and `time`. The rendered string starts
/// with `?` unless there are no parameters at all.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LimitParams(Vec<(String, String)>);

impl LimitParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.push(key, value);
        self
    }

    pub fn push(&mut self, key: &str, value: &str) {
        self.0.push((key.to_owned(), value.to_owned()));
    }

    pub fn user_id(self, user_id: &str) -> Self {
        self.with("user_id", user_id)
    }

    pub fn time(self, time: &str) -> Self {
        self.with("time", time)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for LimitParams {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, (key, value)) in self.0.iter().enumerate() {
            f.write_str(if i == 0 { "?" } else { "&" })?;
            write!(
                f,
                "{}={}",
                utf8_percent_encode(key, QUERY_VALUE),
                utf8_percent_encode(value, QUERY_VALUE)
            )?;
        }
        Ok(())
    }
}

/// Joins `base`, the resource name and `segments` with single slashes.
pub fn join_url(base: &str, resource: &str, segments: &[String]) -> String {
    let mut url = base.trim_end_matches('/').to_owned();
    let parts = std::iter::once(resource.trim_matches('/'))
        .chain(segments.iter().map(|s| s.as_str()));
    for part in parts {
        if part.is_empty() {
            continue;
        }
        url.push('/');
        url.push_str(part);
    }
    url
}
