// ABOUTME: Holder for the single active Glooko session between sign-in and fetch
// ABOUTME: Records when a session was stored so callers can refuse one past its refresh delay
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use crate::Session;

#[derive(Debug, Clone)]
struct Stored {
    session: Session,
    stored_at: Instant,
}

/// Active session slot
///
/// Hands back whatever session it was given. How long a session may be reused
/// is the caller's decision, usually [`crate::driver::SessionDelays::refresh_after`].
#[derive(Debug, Default)]
pub struct SessionStore {
    current: RwLock<Option<Stored>>,
}

impl SessionStore {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new session, returning the one it replaced
    pub async fn replace(&self, session: Session) -> Option<Session> {
        let stored = Stored {
            session,
            stored_at: Instant::now(),
        };
        self.current
            .write()
            .await
            .replace(stored)
            .map(|old| old.session)
    }

    /// Clone of the current session, if any
    pub async fn get(&self) -> Option<Session> {
        self.current
            .read()
            .await
            .as_ref()
            .map(|stored| stored.session.clone())
    }

    /// Clone of the current session if it was stored less than `max_age` ago
    pub async fn get_fresh(&self, max_age: Duration) -> Option<Session> {
        self.current
            .read()
            .await
            .as_ref()
            .filter(|stored| stored.stored_at.elapsed() < max_age)
            .map(|stored| stored.session.clone())
    }

    /// Drop the current session
    pub async fn clear(&self) -> Option<Session> {
        self.current.write().await.take().map(|old| old.session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AuthStrategy;

    #[tokio::test]
    async fn test_store_hands_back_what_it_was_given() {
        let store = SessionStore::new();
        assert!(store.get().await.is_none());

        let first = Session::new("a=1", "us-east-1-x", AuthStrategy::LegacyApiLogin).unwrap();
        let second = Session::new("b=2", "us-east-1-y", AuthStrategy::WebFormLogin).unwrap();

        assert!(store.replace(first.clone()).await.is_none());
        assert_eq!(store.get().await, Some(first.clone()));
        assert_eq!(store.replace(second.clone()).await, Some(first));
        assert_eq!(store.clear().await, Some(second));
        assert!(store.get().await.is_none());
    }

    #[tokio::test]
    async fn test_get_fresh_respects_max_age() {
        let store = SessionStore::new();
        let session = Session::new("a=1", "us-east-1-x", AuthStrategy::LegacyApiLogin).unwrap();
        store.replace(session.clone()).await;

        assert_eq!(
            store.get_fresh(Duration::from_secs(60)).await,
            Some(session.clone())
        );
        assert!(store.get_fresh(Duration::ZERO).await.is_none());
        assert_eq!(store.get().await, Some(session));
    }
}
