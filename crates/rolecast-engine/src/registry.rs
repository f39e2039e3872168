//! Tracks which guilds have an active run.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

/// Shared set of guilds with a run in progress.
#[derive(Debug, Clone, Default)]
pub struct RunRegistry {
    active: Arc<Mutex<HashSet<String>>>,
}

impl RunRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `guild_id`; returns `None` while another permit for it is alive.
    #[must_use]
    pub fn try_acquire(&self, guild_id: &str) -> Option<RunPermit> {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        active.insert(guild_id.to_string()).then(|| RunPermit {
            guild_id: guild_id.to_string(),
            active: Arc::clone(&self.active),
        })
    }

    /// Whether a run for `guild_id` currently holds a permit.
    #[must_use]
    pub fn is_active(&self, guild_id: &str) -> bool {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(guild_id)
    }
}

/// Exclusive claim on one guild's ledger; released on drop.
#[derive(Debug)]
pub struct RunPermit {
    guild_id: String,
    active: Arc<Mutex<HashSet<String>>>,
}

impl RunPermit {
    /// Guild this permit covers.
    #[must_use]
    pub fn guild_id(&self) -> &str {
        &self.guild_id
    }
}

impl Drop for RunPermit {
    fn drop(&mut self) {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.guild_id);
    }
}
