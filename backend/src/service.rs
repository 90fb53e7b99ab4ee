use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use shared::{
    validation::{parse_poll_id, validate_poll_request},
    OptionIndex, Poll, PollDisplay, PollError, PollSummary, VoteMarker,
};
use time::OffsetDateTime;
use tracing::{error, info};

use crate::error::ApiError;
use crate::store::PollStore;

/// Poll creation, lookup and voting on top of a [`PollStore`].
pub struct PollService {
    store: Mutex<PollStore>,
}

impl PollService {
    pub fn new(store: PollStore) -> Self {
        Self { store: Mutex::new(store) }
    }

    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ApiError> {
        PollStore::load(path).map(Self::new)
    }

    fn store(&self) -> Result<MutexGuard<'_, PollStore>, ApiError> {
        self.store.lock().map_err(|e| {
            error!("Failed to acquire poll store lock: {}", e);
            ApiError::Storage("poll store unavailable".into())
        })
    }

    /// `options[n]` fills slot n+1. Returns the new poll's id.
    pub fn create_poll(&self, question: &str, options: &[String]) -> Result<u32, ApiError> {
        validate_poll_request(question, options)?;

        let mut store = self.store()?;
        let id = store.next_id()?;
        store.insert(Poll::new(id, question, options.iter().cloned()))?;

        info!("Created poll {}", id);
        Ok(id)
    }

    /// Looks a poll up by its raw identifier as it arrives in a URL.
    pub fn get_poll_for_display(&self, id: &str) -> Result<PollDisplay, ApiError> {
        let id = parse_poll_id(id)?;
        self.display(id)
    }

    pub fn display(&self, id: u32) -> Result<PollDisplay, ApiError> {
        let store = self.store()?;
        Ok(store.get(id)?.display())
    }

    pub fn list_polls(&self) -> Result<Vec<PollSummary>, ApiError> {
        let store = self.store()?;
        Ok(store.list().map(Poll::summary).collect())
    }

    /// Records one vote. On success the returned marker must be handed back
    /// to the client so it cannot vote on this poll again for a day.
    pub fn cast_vote(
        &self,
        id: u32,
        option: usize,
        voter_has_marker: bool,
    ) -> Result<VoteMarker, ApiError> {
        if voter_has_marker {
            return Err(PollError::AlreadyVoted.into());
        }

        let mut store = self.store()?;
        let poll = store.get(id)?;
        let index = OptionIndex::new(option)
            .filter(|&index| poll.is_populated(index))
            .ok_or(PollError::InvalidOption)?;

        let count = store.increment_vote(id, index.get())?;
        info!("Vote recorded for poll {} option {} (now {})", id, index, count);
        Ok(VoteMarker::new(id, OffsetDateTime::now_utc()))
    }
}
