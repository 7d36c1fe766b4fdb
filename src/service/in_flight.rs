use crate::state::JobId;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

/// Ids of jobs with a background execution currently running
#[derive(Debug, Clone, Default)]
pub(crate) struct InFlight {
    ids: Arc<Mutex<HashSet<JobId>>>,
}

impl InFlight {
    /// Marks `id` as running, or returns `None` if it already is
    pub(crate) fn claim(&self, id: JobId) -> Option<InFlightGuard> {
        let inserted = self
            .ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id);

        inserted.then(|| InFlightGuard {
            id,
            ids: Arc::clone(&self.ids),
        })
    }

    pub(crate) fn contains(&self, id: JobId) -> bool {
        self.ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&id)
    }
}

/// Releases the claim on drop, including when the owning task panics
#[derive(Debug)]
pub(crate) struct InFlightGuard {
    id: JobId,
    ids: Arc<Mutex<HashSet<JobId>>>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
    }
}
