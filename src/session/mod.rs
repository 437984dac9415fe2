//! Cookie-backed session persistence.
//!
//! ARCHITECTURE
//! ============
//! A [`PersistentStore`] is a reactive cell whose durable copy lives in a
//! cookie. Where that cookie comes from is abstracted by [`SessionSource`]:
//! the browser source reads and writes a live cookie document, the server
//! source wraps the request's cookie jar and is never written through.
//! Stores are built per request/session, never shared as globals.

pub mod source;
pub mod store;

pub use source::{BrowserSessionSource, CookieDocument, ServerCookieSessionSource, SessionSource};
pub use store::{PersistentStore, StoreConfig, Subscription};

use std::sync::Arc;

use crate::codec::StringCodec;

/// Cookie that carries the member's bearer token.
pub const JWT_TOKEN_NAME: &str = "gdsc-member-portal-jwt-token";

/// Store holding the raw bearer token.
pub type TokenStore = PersistentStore<StringCodec>;

/// Build the member token store over `source`.
#[must_use]
pub fn jwt_token_store(source: Arc<dyn SessionSource>) -> TokenStore {
    let config = StoreConfig::new(JWT_TOKEN_NAME, StringCodec).secure(true);
    PersistentStore::initialize(config, source)
}
