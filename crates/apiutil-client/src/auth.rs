//! Authenticated client
//!
//! Owns the user credentials and the session token. Every authenticated call
//! carries HTTP Basic auth with a `user;accountID` identity; once a token is
//! held it is sent in the `token` header and the password is left empty.

use crate::config::ClientOptions;
use crate::error::{Error, Result};
use crate::transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
use apiutil_common::logging::Logger;
use apiutil_config::AppConfig;
use base64::prelude::*;
use http::header::{HeaderValue, AUTHORIZATION};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Request and response header carrying the session token
pub const TOKEN_HEADER: &str = "token";

/// The operations the generic API client needs from an authenticated client.
pub trait ApiCaller: Send + Sync {
    /// Authenticate, then perform the request
    fn call(&self, request: HttpRequest) -> Result<HttpResponse>;

    /// Perform the request as given
    fn call_raw(&self, request: HttpRequest) -> Result<HttpResponse>;

    /// Perform an authenticated token issuance request and keep the token
    fn set_new_api_token(&self, request: HttpRequest) -> Result<()>;

    fn unset_auth_token(&self);
}

/// User credentials. `account_id` of `None` means no account.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
    pub account_id: Option<u64>,
}

impl Credentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
            account_id: None,
        }
    }

    /// Zero clears the account
    pub fn with_account_id(mut self, account_id: u64) -> Self {
        self.account_id = (account_id != 0).then_some(account_id);
        self
    }

    /// Basic-auth user field: `user;` or `user;<accountID>`
    pub fn username(&self) -> String {
        match self.account_id {
            Some(id) => format!("{};{}", self.user, id),
            None => format!("{};", self.user),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"***")
            .field("account_id", &self.account_id)
            .finish()
    }
}

/// Client holding credentials, the session token and the transport.
///
/// Safe to share between threads: the token is only touched under its lock,
/// and the lock is never held across a network call.
pub struct AuthenticatedClient {
    credentials: Credentials,
    token: Mutex<String>,
    transport: Arc<dyn Transport>,
    logger: Arc<dyn Logger>,
    harvest_tokens: bool,
}

impl AuthenticatedClient {
    /// Create a client. Builds the default `reqwest` transport unless the
    /// options carry one.
    pub fn new(credentials: Credentials, options: ClientOptions) -> Result<Self> {
        let transport: Arc<dyn Transport> = match options.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(
                options.timeout,
                &options.user_agent,
            )?),
        };

        Ok(Self {
            credentials,
            token: Mutex::new(options.token.unwrap_or_default()),
            transport,
            logger: options.logger,
            harvest_tokens: options.harvest_tokens,
        })
    }

    /// Client for the configured credentials, timeout, user agent and
    /// harvesting setting.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let credentials = Credentials::new(&config.credentials.user, &config.credentials.password)
            .with_account_id(config.credentials.account_id);

        let mut options = ClientOptions::new()
            .with_timeout(Duration::from_secs(config.http.timeout_secs))
            .with_token_harvesting(config.harvest_tokens);
        if let Some(user_agent) = &config.http.user_agent {
            options = options.with_user_agent(user_agent);
        }

        Self::new(credentials, options)
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Apply authentication, then perform the request.
    pub fn call(&self, mut request: HttpRequest) -> Result<HttpResponse> {
        self.set_auth(&mut request)?;
        self.call_raw(request)
    }

    /// Perform the request without adding authentication.
    ///
    /// While no token is held, a `token` response header is adopted as the
    /// new token. That side channel never changes the returned result.
    pub fn call_raw(&self, request: HttpRequest) -> Result<HttpResponse> {
        let target = describe(&request);
        self.logger.info(&format!("Calling URL: {}", target));

        let result = self.transport.execute(request);

        match &result {
            Ok(response) => {
                self.logger.info(&format!(
                    "Request [{}] responded with status: {}",
                    target,
                    response.status()
                ));
                if self.harvest_tokens {
                    self.harvest_token(response);
                }
            }
            Err(err) => self.logger.debug(&format!("Request [{}] failed: {}", target, err)),
        }

        result
    }

    /// Perform a token issuance request and store the token from its
    /// `token` response header.
    pub fn set_new_api_token(&self, request: HttpRequest) -> Result<()> {
        let token = self.call(request).and_then(|response| token_from(&response));

        match token {
            Ok(token) => {
                *self.token.lock() = token;
                Ok(())
            }
            Err(err) => {
                self.logger.debug(&format!("Could not set new API token: {}", err));
                Err(err)
            }
        }
    }

    /// Current token; empty when unauthenticated
    pub fn auth_token(&self) -> String {
        self.token.lock().clone()
    }

    pub fn set_auth_token(&self, token: impl Into<String>) {
        *self.token.lock() = token.into();
    }

    /// Clear the token so the next authenticated call falls back to the password.
    pub fn unset_auth_token(&self) {
        self.token.lock().clear();
    }

    /// Add Basic auth and, when a token is held, the `token` header.
    pub fn set_auth(&self, request: &mut HttpRequest) -> Result<()> {
        let token = self.auth_token();

        let password = if token.is_empty() {
            self.credentials.password.as_str()
        } else {
            request
                .headers_mut()
                .insert(TOKEN_HEADER, HeaderValue::from_str(&token)?);
            ""
        };

        let encoded =
            BASE64_STANDARD.encode(format!("{}:{}", self.credentials.username(), password));
        request.headers_mut().insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Basic {}", encoded))?,
        );
        Ok(())
    }

    fn harvest_token(&self, response: &HttpResponse) {
        if !self.token.lock().is_empty() {
            return;
        }

        let token = match token_from(response) {
            Ok(token) => token,
            Err(err) => {
                self.logger.debug(&format!("Token not harvested: {}", err));
                return;
            }
        };

        // Another caller may have set a token since the check above
        let adopted = {
            let mut current = self.token.lock();
            if current.is_empty() {
                *current = token;
                true
            } else {
                false
            }
        };

        if adopted {
            self.logger.debug("Token harvested from response");
        }
    }
}

impl ApiCaller for AuthenticatedClient {
    fn call(&self, request: HttpRequest) -> Result<HttpResponse> {
        AuthenticatedClient::call(self, request)
    }

    fn call_raw(&self, request: HttpRequest) -> Result<HttpResponse> {
        AuthenticatedClient::call_raw(self, request)
    }

    fn set_new_api_token(&self, request: HttpRequest) -> Result<()> {
        AuthenticatedClient::set_new_api_token(self, request)
    }

    fn unset_auth_token(&self) {
        AuthenticatedClient::unset_auth_token(self)
    }
}

impl fmt::Debug for AuthenticatedClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticatedClient")
            .field("credentials", &self.credentials)
            .field("has_token", &!self.token.lock().is_empty())
            .field("harvest_tokens", &self.harvest_tokens)
            .finish()
    }
}

fn token_from(response: &HttpResponse) -> Result<String> {
    response
        .headers()
        .get(TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .ok_or(Error::MissingToken)
}

/// `METHOD host/path?query` for log lines
fn describe(request: &HttpRequest) -> String {
    let uri = request.uri();
    let mut target = format!(
        "{} {}{}",
        request.method(),
        uri.host().unwrap_or_default(),
        uri.path()
    );
    if let Some(query) = uri.query() {
        target.push('?');
        target.push_str(query);
    }
    target
}
