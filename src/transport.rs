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

use std::fmt;
use std::time::Duration;

use ureq::{Agent, RequestBuilder};

use crate::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        })
    }
}

/// A fully built request, ready to be handed to a [`Transport`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    /// The `Location` header, set by the server on `201 Created`.
    pub location: Option<String>,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turns a non-2xx answer into [`Error::Http`].
    pub fn error_for_status(self) -> Result<Self, Error> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(Error::Http {
                status: self.status,
                body: self.body,
            })
        }
    }
}

/// Sends requests to the API. Statuses outside 2xx are returned as
/// responses; only failures to exchange a request are errors.
pub trait Transport {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, Error>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, Error> {
        (**self).send(request)
    }
}

/// Blocking [`Transport`] backed by a `ureq` agent.
#[derive(Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        let config = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build();
        let agent: Agent = config.into();
        UreqTransport { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}

fn with_headers<B>(
    mut builder: RequestBuilder<B>,
    headers: &[(String, String)],
) -> RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

impl Transport for UreqTransport {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, Error> {
        log::debug!("{} {}", request.method, request.url);
        let body = request.body.as_deref().unwrap_or("");
        let url = request.url.as_str();
        let result = match request.method {
            Method::Get => with_headers(self.agent.get(url), &request.headers).call(),
            Method::Delete => with_headers(self.agent.delete(url), &request.headers).call(),
            Method::Post => with_headers(self.agent.post(url), &request.headers).send(body),
            Method::Put => with_headers(self.agent.put(url), &request.headers).send(body),
        };
        let mut response = match result {
            Ok(response) => response,
            Err(e) => {
                log::warn!("{} {} failed: {}", request.method, request.url, e);
                return Err(e.into());
            }
        };
        let status = response.status().as_u16();
        let location = response
            .headers()
            .get("location")
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_owned());
        let body = response.body_mut().read_to_string()?;
        log::debug!("{} {} answered {}", request.method, request.url, status);
        Ok(ApiResponse {
            status,
            location,
            body,
        })
    }
}
