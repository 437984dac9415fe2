//! Where session cookies are read from and written to.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use axum_extra::extract::cookie::{Cookie, CookieJar};
use time::OffsetDateTime;

/// Execution-context specific access to session cookies.
pub trait SessionSource: Send + Sync {
    /// `true` when running in an interactive (browser) context.
    fn is_interactive(&self) -> bool;

    /// Current value of cookie `name`, if present.
    fn read(&self, name: &str) -> Option<String>;

    /// Apply a `Set-Cookie` to the underlying storage.
    fn write(&self, cookie: Cookie<'static>);
}

// =============================================================================
// COOKIE DOCUMENT
// =============================================================================

/// Browser-side cookie storage.
///
/// Reads behave like `document.cookie`; writes apply `Set-Cookie` semantics,
/// so a cookie written with `Max-Age=0` or an `Expires` in the past is
/// removed. Clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct CookieDocument {
    cookies: Arc<Mutex<BTreeMap<String, String>>>,
}

impl CookieDocument {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from an ambient `Cookie` header (`a=1; b=2`). Unparsable pairs are skipped.
    #[must_use]
    pub fn from_header(header: &str) -> Self {
        let cookies = Cookie::split_parse(header)
            .filter_map(Result::ok)
            .map(|c| (c.name().to_owned(), c.value().to_owned()))
            .collect();
        Self { cookies: Arc::new(Mutex::new(cookies)) }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<String> {
        self.lock().get(name).cloned()
    }

    pub fn apply(&self, cookie: &Cookie<'_>) {
        let mut cookies = self.lock();
        if is_expired(cookie, OffsetDateTime::now_utc()) {
            cookies.remove(cookie.name());
        } else {
            cookies.insert(cookie.name().to_owned(), cookie.value().to_owned());
        }
    }

    /// Render as a `Cookie` request header.
    #[must_use]
    pub fn header(&self) -> String {
        self.lock()
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.cookies
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

pub(crate) fn is_expired(cookie: &Cookie<'_>, now: OffsetDateTime) -> bool {
    cookie.max_age().is_some_and(|age| age <= time::Duration::ZERO)
        || cookie.expires_datetime().is_some_and(|at| at <= now)
}

// =============================================================================
// SOURCES
// =============================================================================

/// Interactive source backed by a live [`CookieDocument`].
#[derive(Debug, Clone, Default)]
pub struct BrowserSessionSource {
    document: CookieDocument,
}

impl BrowserSessionSource {
    #[must_use]
    pub fn new(document: CookieDocument) -> Self {
        Self { document }
    }

    #[must_use]
    pub fn document(&self) -> &CookieDocument {
        &self.document
    }
}

impl SessionSource for BrowserSessionSource {
    fn is_interactive(&self) -> bool {
        true
    }

    fn read(&self, name: &str) -> Option<String> {
        self.document.get(name)
    }

    fn write(&self, cookie: Cookie<'static>) {
        self.document.apply(&cookie);
    }
}

/// Non-interactive source over an incoming request's cookies.
///
/// Persistent stores never read or write through it; the server fetch path
/// reads the raw jar via [`ServerCookieSessionSource::jar`].
#[derive(Debug, Clone, Default)]
pub struct ServerCookieSessionSource {
    jar: CookieJar,
}

impl ServerCookieSessionSource {
    #[must_use]
    pub fn new(jar: CookieJar) -> Self {
        Self { jar }
    }

    #[must_use]
    pub fn jar(&self) -> &CookieJar {
        &self.jar
    }
}

impl SessionSource for ServerCookieSessionSource {
    fn is_interactive(&self) -> bool {
        false
    }

    fn read(&self, name: &str) -> Option<String> {
        self.jar.get(name).map(|c| c.value().to_owned())
    }

    fn write(&self, cookie: Cookie<'static>) {
        tracing::warn!(cookie = cookie.name(), "ignoring cookie write in server context");
    }
}

#[cfg(test)]
#[path = "source_test.rs"]
mod tests;
