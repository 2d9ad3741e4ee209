#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Casdoor SDK
//!
//! Client for the user-management API of a Casdoor identity server:
//! - [`AuthConfig`]: endpoint, credentials and organization, built in code or loaded
//!   from YAML and `CASDOOR__*` environment variables
//! - [`UsersApi`]: list, fetch, add, update and delete users, implemented by
//!   [`CasdoorClient`]
//! - login helpers: signin/signup/profile URLs, authorization-code exchange and
//!   JWT verification
//! - [`global`]: a process-wide client for applications configured once at startup
//!
//! ## Usage
//!
//! ```ignore
//! use casdoor_sdk::{AuthConfig, CasdoorClient, UsersApi};
//!
//! let config = AuthConfig::new(endpoint, client_id, client_secret, jwt_secret, "acme");
//! let client = CasdoorClient::new(config)?;
//!
//! match client.get_user("alice").await? {
//!     Some(user) => println!("{} <{}>", user.display_name, user.email),
//!     None => println!("no such user"),
//! }
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

pub mod api;
pub mod client;
pub mod config;
pub mod errors;
pub mod global;
pub mod jwt;
pub mod models;
pub mod urls;

pub use api::UsersApi;
pub use client::CasdoorClient;
pub use config::{AuthConfig, HttpSettings};
pub use errors::SdkError;
pub use global::init_config;
pub use models::{Claims, ModifyResponse, OAuthToken, User};
