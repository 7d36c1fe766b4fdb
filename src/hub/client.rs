use crate::state::UserId;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;

static NEXT_CLIENT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of one client session
pub type ClientId = u64;

/// One connected session of a user
///
/// Holds the sending half of the session's outbound buffer. The transport layer
/// keeps the matching receiver, forwards every payload to the network peer, and
/// stops when the receiver yields `None`.
#[derive(Debug)]
pub struct Client {
    id: ClientId,
    user_id: UserId,
    sender: mpsc::Sender<Vec<u8>>,
}

impl Client {
    /// Creates a client with an outbound buffer of `capacity` payloads
    pub fn new(user_id: UserId, capacity: usize) -> (Self, mpsc::Receiver<Vec<u8>>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let client = Self {
            id: NEXT_CLIENT_ID.fetch_add(1, Ordering::Relaxed),
            user_id,
            sender,
        };
        (client, receiver)
    }

    pub fn id(&self) -> ClientId {
        self.id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub(crate) fn sender(&self) -> &mpsc::Sender<Vec<u8>> {
        &self.sender
    }
}
