//! Notification hub
//!
//! Keeps one outbound channel per connected user and pushes job-status payloads
//! to it without ever blocking the caller:
//! - Registering a client replaces any earlier session of the same user
//! - Unregistering or disconnecting drops the sender, closing the session's receiver
//! - A full buffer drops the newest payload

mod client;

pub use client::{Client, ClientId};

use crate::state::UserId;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use tokio::sync::mpsc::error::TrySendError;

/// Sink for serialized job notifications
///
/// The orchestrator depends on this trait; the hub is the production implementation.
pub trait Notifier: Send + Sync {
    fn notify(&self, user_id: UserId, payload: Vec<u8>);
}

/// Directory of live client sessions, one per user
#[derive(Debug, Default)]
pub struct Hub {
    clients: RwLock<HashMap<UserId, Client>>,
}

impl Hub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associates the client with its user, retiring any previous session
    pub fn register(&self, client: Client) {
        let user_id = client.user_id();
        let client_id = client.id();

        let previous = self
            .clients
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user_id, client);

        if let Some(previous) = previous {
            tracing::debug!(
                user_id,
                client_id = previous.id(),
                "Replaced existing session"
            );
        }
        tracing::info!(user_id, client_id, "Client registered");
    }

    /// Removes the registration if it still belongs to `client_id`
    ///
    /// Returns true if a session was removed. A stale unregister from a session
    /// that was already replaced leaves the newer one alone.
    pub fn unregister(&self, user_id: UserId, client_id: ClientId) -> bool {
        let mut clients = self.clients.write().unwrap_or_else(PoisonError::into_inner);

        match clients.get(&user_id) {
            Some(current) if current.id() == client_id => {
                clients.remove(&user_id);
                tracing::info!(user_id, client_id, "Client unregistered");
                true
            }
            _ => false,
        }
    }

    /// Removes whatever session the user currently has
    ///
    /// Returns true if the user was registered.
    pub fn disconnect(&self, user_id: UserId) -> bool {
        let removed = self
            .clients
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&user_id);

        match removed {
            Some(client) => {
                tracing::info!(user_id, client_id = client.id(), "Client disconnected");
                true
            }
            None => false,
        }
    }

    pub fn is_registered(&self, user_id: UserId) -> bool {
        self.clients
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&user_id)
    }

    /// Number of registered sessions
    pub fn len(&self) -> usize {
        self.clients
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Attempts non-blocking delivery to the user's session, if any
    pub fn send(&self, user_id: UserId, payload: Vec<u8>) {
        let clients = self.clients.read().unwrap_or_else(PoisonError::into_inner);

        let Some(client) = clients.get(&user_id) else {
            tracing::trace!(user_id, "No session registered, notification skipped");
            return;
        };

        match client.sender().try_send(payload) {
            Ok(()) => {
                tracing::debug!(user_id, client_id = client.id(), "Notification queued");
            }
            Err(TrySendError::Full(_)) => {
                tracing::warn!(
                    user_id,
                    client_id = client.id(),
                    "Outbound buffer full, notification dropped"
                );
            }
            Err(TrySendError::Closed(_)) => {
                tracing::debug!(
                    user_id,
                    client_id = client.id(),
                    "Session receiver gone, notification dropped"
                );
            }
        }
    }
}

impl Notifier for Hub {
    fn notify(&self, user_id: UserId, payload: Vec<u8>) {
        self.send(user_id, payload);
    }
}
