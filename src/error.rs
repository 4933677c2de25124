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

/// Which argument of a set operation an error refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operand {
    First,
    Second,
}

impl std::fmt::Display for Operand {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            Operand::First => f.write_str("first"),
            Operand::Second => f.write_str("second"),
        }
    }
}

/// Error when talking to the feature API or combining feature collections
#[derive(Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    MissingFeatureId { operand: Operand, index: usize },
    MissingUpdateId,
    FeatureWithoutId,
    ExpectedFeatureOrCollection,
    InvalidPathSegment { kind: &'static str, value: String },
    InvalidConfig(String),
    MalformedJson(String),
    Http { status: u16, body: String },
    Transport(String),
    UnsupportedGeometry(String),
    ExpectedProperty(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            Error::MissingFeatureId { operand, index } => write!(
                f,
                "Feature at index {} of the {} collection has no 'id'.",
                index, operand
            ),
            Error::MissingUpdateId => {
                write!(f, "A feature needs a numeric 'id' before it can be updated.")
            }
            Error::FeatureWithoutId => write!(f, "Feature has no 'id'."),
            Error::ExpectedFeatureOrCollection => {
                write!(f, "Expected a Feature or a FeatureCollection.")
            }
            Error::InvalidPathSegment { kind, ref value } => {
                write!(f, "'{}' is not a valid {} path segment.", value, kind)
            }
            Error::InvalidConfig(ref msg) => write!(f, "Invalid client configuration: {}", msg),
            Error::MalformedJson(ref msg) => write!(f, "Encountered malformed JSON: {}", msg),
            Error::Http { status, ref body } => {
                write!(f, "Server answered with HTTP status {}: {}", status, body)
            }
            Error::Transport(ref msg) => write!(f, "Request could not be sent: {}", msg),
            Error::UnsupportedGeometry(ref ty) => {
                write!(f, "Geometry type '{}' cannot be translated.", ty)
            }
            Error::ExpectedProperty(ref name) => write!(f, "Expected member '{}'.", name),
        }
    }
}

impl std::error::Error for Error {}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::MalformedJson(e.to_string())
    }
}

impl From<geojson::Error> for Error {
    fn from(e: geojson::Error) -> Self {
        Error::MalformedJson(e.to_string())
    }
}

impl From<ureq::Error> for Error {
    fn from(e: ureq::Error) -> Self {
        Error::Transport(e.to_string())
    }
}
