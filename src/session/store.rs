//! Reactive value container persisted in a cookie.
//!
//! INVARIANTS
//! ==========
//! - Non-interactive stores never touch cookie storage: they start at the
//!   configured default and `set` is a no-op.
//! - After a completed `set` in an interactive store, the in-memory value and
//!   the cookie agree. The cookie write is attempted first and the in-memory
//!   value is published last, so observers never see a value that was not
//!   offered to durable storage. Concurrent `set`s are serialized across both
//!   steps; observers run after the write lock is released.
//! - Codec failures are logged and absorbed here; callers never see them.

use std::sync::{Arc, Mutex};

use axum_extra::extract::cookie::{Cookie, SameSite};
use time::{Duration, OffsetDateTime};

use super::source::SessionSource;
use crate::codec::CookieCodec;

/// One year.
pub const DEFAULT_MAX_AGE_SECS: i64 = 60 * 60 * 24 * 365;

/// Payload written when a cookie is cleared.
pub const CLEARED_SENTINEL: &str = "null";

/// Configuration for one cookie-persisted value.
#[derive(Clone)]
pub struct StoreConfig<C: CookieCodec> {
    pub name: String,
    pub initial_value: Option<C::Value>,
    pub max_age_secs: i64,
    pub codec: C,
    pub secure: bool,
}

impl<C: CookieCodec> StoreConfig<C> {
    #[must_use]
    pub fn new(name: impl Into<String>, codec: C) -> Self {
        Self { name: name.into(), initial_value: None, max_age_secs: DEFAULT_MAX_AGE_SECS, codec, secure: false }
    }

    #[must_use]
    pub fn initial_value(mut self, value: C::Value) -> Self {
        self.initial_value = Some(value);
        self
    }

    #[must_use]
    pub fn max_age_secs(mut self, secs: i64) -> Self {
        self.max_age_secs = secs;
        self
    }

    /// Adds `SameSite=Strict` to every cookie the store writes.
    #[must_use]
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }
}

/// `Set-Cookie` persisting `encoded` under the store's name.
pub(crate) fn persist_cookie<C: CookieCodec>(config: &StoreConfig<C>, encoded: String) -> Cookie<'static> {
    let mut builder = Cookie::build((config.name.clone(), encoded))
        .path("/")
        .max_age(Duration::seconds(config.max_age_secs));
    if config.secure {
        builder = builder.same_site(SameSite::Strict);
    }
    builder.build()
}

/// `Set-Cookie` clearing the store's cookie.
pub(crate) fn clear_cookie<C: CookieCodec>(config: &StoreConfig<C>) -> Cookie<'static> {
    let mut builder = Cookie::build((config.name.clone(), CLEARED_SENTINEL))
        .path("/")
        .expires(OffsetDateTime::UNIX_EPOCH + Duration::seconds(1));
    if config.secure {
        builder = builder.same_site(SameSite::Strict);
    }
    builder.build()
}

// =============================================================================
// STORE
// =============================================================================

type Observer<T> = Arc<dyn Fn(Option<&T>) + Send + Sync>;

struct Observers<T> {
    next_id: u64,
    entries: Vec<(u64, Observer<T>)>,
}

struct StoreInner<C: CookieCodec> {
    config: StoreConfig<C>,
    source: Arc<dyn SessionSource>,
    /// Held across the cookie write and the in-memory update.
    write: Mutex<()>,
    value: Mutex<Option<C::Value>>,
    observers: Mutex<Observers<C::Value>>,
}

/// Cookie-backed reactive cell. Clones share state.
pub struct PersistentStore<C: CookieCodec> {
    inner: Arc<StoreInner<C>>,
}

impl<C: CookieCodec> Clone for PersistentStore<C> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<C: CookieCodec> PersistentStore<C> {
    /// Build a store whose initial snapshot comes from `source`.
    ///
    /// Non-interactive sources yield the configured default without being
    /// consulted. Interactive sources are read and decoded; a missing cookie
    /// or a decode failure yields the default.
    #[must_use]
    pub fn initialize(config: StoreConfig<C>, source: Arc<dyn SessionSource>) -> Self {
        let value = initial_value(&config, source.as_ref());
        Self {
            inner: Arc::new(StoreInner {
                config,
                source,
                write: Mutex::new(()),
                value: Mutex::new(value),
                observers: Mutex::new(Observers { next_id: 0, entries: Vec::new() }),
            }),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.config.name
    }

    /// Synchronous snapshot of the current value.
    #[must_use]
    pub fn get(&self) -> Option<C::Value> {
        self.lock_value().clone()
    }

    /// Replace the value, persisting it to the cookie first.
    pub fn set(&self, value: Option<C::Value>) {
        let inner = &self.inner;
        if !inner.source.is_interactive() {
            return;
        }

        {
            let _write = inner.write.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            match &value {
                Some(data) => match inner.config.codec.encode(data) {
                    Ok(encoded) => inner.source.write(persist_cookie(&inner.config, encoded)),
                    Err(e) => {
                        tracing::error!(error = %e, cookie = %inner.config.name, "failed to encode cookie value");
                    }
                },
                None => inner.source.write(clear_cookie(&inner.config)),
            }
            *self.lock_value() = value.clone();
        }

        self.notify(value.as_ref());
    }

    /// Register `observer`; it is called with the current value right away
    /// and after every `set` until the returned [`Subscription`] is dropped.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(Option<&C::Value>) + Send + Sync + 'static,
    {
        let observer: Observer<C::Value> = Arc::new(observer);
        let id = {
            let mut observers = self.lock_observers();
            let id = observers.next_id;
            observers.next_id += 1;
            observers.entries.push((id, Arc::clone(&observer)));
            id
        };

        let current = self.get();
        observer(current.as_ref());

        let weak = Arc::downgrade(&self.inner);
        Subscription {
            cancel: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    let mut observers = inner
                        .observers
                        .lock()
                        .unwrap_or_else(std::sync::PoisonError::into_inner);
                    observers.entries.retain(|(entry_id, _)| *entry_id != id);
                }
            })),
        }
    }

    fn notify(&self, value: Option<&C::Value>) {
        // Snapshot so observers may subscribe or set without deadlocking.
        let observers: Vec<Observer<C::Value>> =
            self.lock_observers().entries.iter().map(|(_, o)| Arc::clone(o)).collect();
        for observer in observers {
            observer(value);
        }
    }

    fn lock_value(&self) -> std::sync::MutexGuard<'_, Option<C::Value>> {
        self.inner
            .value
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn lock_observers(&self) -> std::sync::MutexGuard<'_, Observers<C::Value>> {
        self.inner
            .observers
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

fn initial_value<C: CookieCodec>(config: &StoreConfig<C>, source: &dyn SessionSource) -> Option<C::Value> {
    if !source.is_interactive() {
        return config.initial_value.clone();
    }

    let Some(raw) = source.read(&config.name).filter(|raw| !raw.is_empty()) else {
        return config.initial_value.clone();
    };

    match config.codec.decode(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::error!(error = %e, cookie = %config.name, "failed to decode cookie value");
            config.initial_value.clone()
        }
    }
}

// =============================================================================
// SUBSCRIPTION
// =============================================================================

/// Handle returned by [`PersistentStore::subscribe`]. Dropping it unsubscribes.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    pub fn unsubscribe(mut self) {
        self.cancel_now();
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
