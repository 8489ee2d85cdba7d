//! `entsync-auth` — access-token retrieval from stored session data.
//!
//! This crate never talks to an identity provider. It only reads the token
//! response the host stored when the user last authenticated.

pub mod accessor;
pub mod session;
pub mod token;

pub use accessor::{TokenAccessor, TokenError};
pub use session::{SessionStore, LAST_TOKEN_RESPONSE_KEY};
pub use token::{AccessToken, TokenResponse};
