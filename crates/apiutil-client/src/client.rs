//! Generic API client
//!
//! Verb-shaped operations against the service. URLs are compiled as
//! `<base_url>/<api>/v2.0/<endpoint>`, JSON bodies are encoded and decoded
//! here, and any non-200 answer becomes a normalized [`Error`].

use crate::auth::{ApiCaller, AuthenticatedClient};
use crate::endpoint::Endpointer;
use crate::error::{ApiErrorResponse, Error, Result};
use crate::transport::{HttpRequest, HttpResponse};
use apiutil_common::query::Query;
use apiutil_config::AppConfig;
use http::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use http::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use url::form_urlencoded;

/// Supported version of the service APIs
pub const API_VERSION: &str = "v2.0";

pub const RESOURCE_STATUS_CHECK: &str = "status_check";
pub const RESOURCE_TOKEN: &str = "token";

/// Modifier applied to the query before a GET
pub type QueryModifier<'a> = &'a dyn Fn(&mut Query);

/// Modifier applied to the request headers before a POST, PUT or DELETE
pub type HeaderModifier<'a> = &'a dyn Fn(&mut HeaderMap);

/// Client for one API of the service.
///
/// The [`ApiCaller`] may be shared. The response-code history is not: verbs
/// take `&mut self`, so one owner (or external locking) is required to share
/// an `ApiClient` between threads.
pub struct ApiClient {
    caller: Arc<dyn ApiCaller>,
    base_url: String,
    api: String,
    response_codes: Vec<u16>,
}

impl ApiClient {
    /// `base_url` is used without any trailing slash.
    pub fn new(
        caller: Arc<dyn ApiCaller>,
        base_url: impl Into<String>,
        api: impl Into<String>,
    ) -> Self {
        let base_url: String = base_url.into();
        Self {
            caller,
            base_url: base_url.trim_end_matches('/').to_string(),
            api: api.into(),
            response_codes: Vec::new(),
        }
    }

    /// Validate the configuration and build the authenticated client it describes.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| Error::Config(e.to_string()))?;

        let caller = AuthenticatedClient::from_config(config)?;
        Ok(Self::new(
            Arc::new(caller),
            &config.api.base_url,
            &config.api.name,
        ))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api(&self) -> &str {
        &self.api
    }

    /// Check if the service is up. Unauthenticated.
    ///
    /// `Ok(false)` for any answer other than 200. Always records one status
    /// code, 0 when no response was obtained.
    pub fn status_check(&mut self) -> Result<bool> {
        let result = self.status_check_url().and_then(|url| {
            let request = http::Request::get(url).body(Vec::new())?;
            self.caller.call_raw(request)
        });
        self.record(&result);

        Ok(result?.status() == StatusCode::OK)
    }

    /// Request a new token and store it on the underlying caller.
    pub fn set_new_api_token(&self) -> Result<()> {
        let url = self.token_url()?;
        let request = http::Request::post(url).body(Vec::new())?;
        self.caller.set_new_api_token(request)
    }

    /// GET `endpoint` with the query modifiers applied in order, decoding the JSON body.
    ///
    /// Parameters already present on the endpoint are kept; the modifiers add to them.
    pub fn get<T, E>(&mut self, endpoint: &E, queries: &[QueryModifier<'_>]) -> Result<T>
    where
        T: DeserializeOwned,
        E: Endpointer + ?Sized,
    {
        let url = with_queries(self.endpoint_url(endpoint)?, queries);
        let request = http::Request::get(url).body(Vec::new())?;
        let response = self.call(request)?;
        decode(response)
    }

    pub fn post<P, T, E>(
        &mut self,
        endpoint: &E,
        payload: &P,
        headers: &[HeaderModifier<'_>],
    ) -> Result<T>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
        E: Endpointer + ?Sized,
    {
        self.post_put(Method::POST, endpoint, payload, headers)
    }

    pub fn put<P, T, E>(
        &mut self,
        endpoint: &E,
        payload: &P,
        headers: &[HeaderModifier<'_>],
    ) -> Result<T>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
        E: Endpointer + ?Sized,
    {
        self.post_put(Method::PUT, endpoint, payload, headers)
    }

    pub fn delete<T, E>(&mut self, endpoint: &E, headers: &[HeaderModifier<'_>]) -> Result<T>
    where
        T: DeserializeOwned,
        E: Endpointer + ?Sized,
    {
        let url = self.endpoint_url(endpoint)?;

        let mut request = http::Request::delete(url).body(Vec::new())?;
        for modifier in headers {
            modifier(request.headers_mut());
        }

        let response = self.call(request)?;
        decode(response)
    }

    /// Authenticated GET returning the response as received, whatever its status.
    pub fn get_with_raw_response<E>(&mut self, endpoint: &E) -> Result<HttpResponse>
    where
        E: Endpointer + ?Sized,
    {
        let url = self.endpoint_url(endpoint)?;
        let request = http::Request::get(url).body(Vec::new())?;
        self.call(request)
    }

    pub fn unset_auth_token(&self) {
        self.caller.unset_auth_token();
    }

    pub fn last_response_code(&self) -> Option<u16> {
        self.response_codes.last().copied()
    }

    /// Every observed status code, oldest first
    pub fn response_codes(&self) -> &[u16] {
        &self.response_codes
    }

    fn post_put<P, T, E>(
        &mut self,
        method: Method,
        endpoint: &E,
        payload: &P,
        headers: &[HeaderModifier<'_>],
    ) -> Result<T>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
        E: Endpointer + ?Sized,
    {
        let url = self.endpoint_url(endpoint)?;
        let body = serde_json::to_vec(payload)?;

        let mut request = http::Request::builder()
            .method(method)
            .uri(url)
            .body(body)?;
        request
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        for modifier in headers {
            modifier(request.headers_mut());
        }

        let response = self.call(request)?;
        decode(response)
    }

    fn call(&mut self, request: HttpRequest) -> Result<HttpResponse> {
        let result = self.caller.call(request);
        self.record(&result);
        result
    }

    fn record(&mut self, result: &Result<HttpResponse>) {
        let code = match result {
            Ok(response) => response.status().as_u16(),
            Err(_) => 0,
        };
        self.response_codes.push(code);
    }

    /// The path is used as written: no escaping and no dot-segment removal.
    fn endpoint_url<E>(&self, endpoint: &E) -> Result<String>
    where
        E: Endpointer + ?Sized,
    {
        let path = endpoint.get_endpoint()?;
        let path = path.trim_start_matches('/');

        let base_url = self.require_base_url()?;
        let url = if self.api.is_empty() {
            format!("{}/{}/{}", base_url, API_VERSION, path)
        } else {
            format!(
                "{}/{}/{}/{}",
                base_url, self.api, API_VERSION, path
            )
        };
        Ok(url)
    }

    fn status_check_url(&self) -> Result<String> {
        if self.base_url.is_empty() {
            return Err(Error::Config(
                "could not compile status check URL: missing base URL".to_string(),
            ));
        }
        Ok(format!(
            "{}/{}/{}",
            self.base_url, API_VERSION, RESOURCE_STATUS_CHECK
        ))
    }

    fn token_url(&self) -> Result<String> {
        if self.base_url.is_empty() || self.api.is_empty() {
            return Err(Error::Config(
                "could not compile token URL: missing base URL or API name".to_string(),
            ));
        }
        Ok(format!(
            "{}/{}/{}/{}",
            self.base_url, self.api, API_VERSION, RESOURCE_TOKEN
        ))
    }

    fn require_base_url(&self) -> Result<&str> {
        if self.base_url.is_empty() {
            return Err(Error::Config(
                "could not compile endpoint URL: missing base URL".to_string(),
            ));
        }
        Ok(&self.base_url)
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("api", &self.api)
            .field("response_codes", &self.response_codes)
            .finish()
    }
}

/// Turn a failed response into the most descriptive error available.
///
/// A JSON body with code, type and combined info wins. Otherwise 401 gives
/// [`Error::Unauthorized`] and anything else [`Error::ResponseNotOk`].
pub fn make_response_error(response: &HttpResponse) -> Error {
    if is_json(response.headers()) {
        if let Ok(body) = serde_json::from_slice::<ApiErrorResponse>(response.body()) {
            if body.has_information() {
                return body.into();
            }
        }
    }

    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        Error::Unauthorized(status.as_u16())
    } else {
        Error::ResponseNotOk(status.as_u16())
    }
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|media_type| media_type.trim().eq_ignore_ascii_case("application/json"))
        .unwrap_or(false)
}

/// Decode a 200 body. An empty body decodes as JSON `null`.
fn decode<T: DeserializeOwned>(response: HttpResponse) -> Result<T> {
    if response.status() != StatusCode::OK {
        return Err(make_response_error(&response));
    }

    let body = response.body();
    if body.is_empty() {
        return Ok(serde_json::from_slice(b"null")?);
    }
    Ok(serde_json::from_slice(body)?)
}

/// Merge the query modifiers into the query `url` already carries.
///
/// Without modifiers the URL is returned untouched.
fn with_queries(url: String, queries: &[QueryModifier<'_>]) -> String {
    if queries.is_empty() {
        return url;
    }

    let (path, existing) = match url.split_once('?') {
        Some((path, existing)) => (path, existing),
        None => (url.as_str(), ""),
    };

    let mut query = Query::new();
    for (key, value) in form_urlencoded::parse(existing.as_bytes()) {
        query.add(key, value);
    }
    for modifier in queries {
        modifier(&mut query);
    }

    if query.is_empty() {
        path.to_string()
    } else {
        format!("{}?{}", path, query.encode())
    }
}
