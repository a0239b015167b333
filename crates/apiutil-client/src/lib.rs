//! # apiutil client
//!
//! Credential-aware, blocking HTTP client for the remote REST service.
//!
//! - **Authentication**: Basic auth with a `user;accountID` identity, replaced
//!   by a session token once one is held
//! - **Generic API client**: status check, token issuance and GET/POST/PUT/DELETE
//!   against templated endpoints, with normalized errors
//! - **Pluggable transport**: `reqwest` by default, anything implementing
//!   [`Transport`] otherwise
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use apiutil_client::{ApiClient, AuthenticatedClient, ClientOptions, Credentials};
//! use apiutil_common::query;
//! use std::sync::Arc;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let credentials = Credentials::new("alice", "secret").with_account_id(42);
//!     let auth = AuthenticatedClient::new(credentials, ClientOptions::new())?;
//!
//!     let mut client = ApiClient::new(Arc::new(auth), "https://api.example.com", "publishing");
//!     client.set_new_api_token()?;
//!
//!     let books: Vec<serde_json::Value> = client.get("books", &[&query::limit(10, 0)])?;
//!     println!("Found {} books", books.len());
//!
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod transport;

// Re-export main types
pub use auth::{ApiCaller, AuthenticatedClient, Credentials, TOKEN_HEADER};
pub use client::{make_response_error, ApiClient, API_VERSION};
pub use config::ClientOptions;
pub use endpoint::{EndpointTemplates, Endpointer, Resource};
pub use error::{ApiErrorDetail, ApiErrorResponse, Error, Result};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
