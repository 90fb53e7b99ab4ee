use serde::{Serialize, Deserialize};
use std::fmt;
use time::{Duration, OffsetDateTime};

use crate::error::PollError;

/// Number of option slots every poll carries.
pub const MAX_OPTIONS: usize = 42;

/// How long a vote marker keeps a client from voting again on the same poll.
pub const VOTE_MARKER_TTL_HOURS: i64 = 24;

/// A 1-based option slot number, always within `1..=MAX_OPTIONS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct OptionIndex(usize);

impl OptionIndex {
    pub fn new(index: usize) -> Option<Self> {
        (1..=MAX_OPTIONS).contains(&index).then_some(Self(index))
    }

    pub const fn get(self) -> usize {
        self.0
    }

    fn slot(self) -> usize {
        self.0 - 1
    }

    pub fn all() -> impl Iterator<Item = OptionIndex> {
        (1..=MAX_OPTIONS).map(OptionIndex)
    }
}

impl TryFrom<usize> for OptionIndex {
    type Error = PollError;

    fn try_from(index: usize) -> Result<Self, PollError> {
        Self::new(index).ok_or(PollError::InvalidOption)
    }
}

impl From<OptionIndex> for usize {
    fn from(index: OptionIndex) -> usize {
        index.0
    }
}

impl fmt::Display for OptionIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Poll {
    pub id: u32,
    pub question: String,
    options: [Option<String>; MAX_OPTIONS],
    votes: [u32; MAX_OPTIONS],
}

impl Poll {
    /// Builds a fresh poll with every count at zero. The n-th item of
    /// `options` lands in slot n+1; blank entries leave their slot unused.
    pub fn new<I, S>(id: u32, question: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut slots: [Option<String>; MAX_OPTIONS] = std::array::from_fn(|_| None);
        for (slot, text) in slots.iter_mut().zip(options) {
            *slot = Some(text.into()).filter(|t: &String| !t.trim().is_empty());
        }

        Self {
            id,
            question: question.into(),
            options: slots,
            votes: [0; MAX_OPTIONS],
        }
    }

    pub fn from_parts(
        id: u32,
        question: String,
        options: [Option<String>; MAX_OPTIONS],
        votes: [u32; MAX_OPTIONS],
    ) -> Self {
        Self { id, question, options, votes }
    }

    pub fn options(&self) -> &[Option<String>; MAX_OPTIONS] {
        &self.options
    }

    pub fn vote_counts(&self) -> &[u32; MAX_OPTIONS] {
        &self.votes
    }

    pub fn option(&self, index: OptionIndex) -> Option<&str> {
        self.options[index.slot()].as_deref()
    }

    pub fn votes(&self, index: OptionIndex) -> u32 {
        self.votes[index.slot()]
    }

    pub fn is_populated(&self, index: OptionIndex) -> bool {
        self.option(index).is_some()
    }

    /// Populated slots in slot order.
    pub fn populated(&self) -> impl Iterator<Item = (OptionIndex, &str)> + '_ {
        OptionIndex::all().filter_map(move |index| self.option(index).map(|text| (index, text)))
    }

    pub fn total_votes(&self) -> u64 {
        self.votes.iter().map(|&v| u64::from(v)).sum()
    }

    /// Adds one vote to `index` and returns the new count.
    pub fn increment(&mut self, index: OptionIndex) -> u32 {
        let count = &mut self.votes[index.slot()];
        *count = count.saturating_add(1);
        *count
    }

    /// Undoes a previous [`Poll::increment`].
    pub fn decrement(&mut self, index: OptionIndex) {
        let count = &mut self.votes[index.slot()];
        *count = count.saturating_sub(1);
    }

    pub fn display(&self) -> PollDisplay {
        PollDisplay {
            id: self.id,
            question: self.question.clone(),
            options: self
                .populated()
                .map(|(index, text)| DisplayOption {
                    index,
                    text: text.to_string(),
                    votes: self.votes(index),
                })
                .collect(),
        }
    }

    pub fn summary(&self) -> PollSummary {
        PollSummary {
            id: self.id,
            question: self.question.clone(),
            option_count: self.populated().count(),
            total_votes: self.total_votes(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DisplayOption {
    pub index: OptionIndex,
    pub text: String,
    pub votes: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PollDisplay {
    pub id: u32,
    pub question: String,
    pub options: Vec<DisplayOption>,
}

impl PollDisplay {
    pub fn option(&self, index: OptionIndex) -> Option<&DisplayOption> {
        self.options.iter().find(|o| o.index == index)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PollSummary {
    pub id: u32,
    pub question: String,
    pub option_count: usize,
    pub total_votes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    pub username: String,
    pub password: String,
}

/// Client-held proof that a vote was cast on a poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteMarker {
    pub poll_id: u32,
    pub cast_at: OffsetDateTime,
}

impl VoteMarker {
    pub fn new(poll_id: u32, cast_at: OffsetDateTime) -> Self {
        Self { poll_id, cast_at }
    }

    pub fn ttl() -> Duration {
        Duration::hours(VOTE_MARKER_TTL_HOURS)
    }

    pub fn name_for(poll_id: u32) -> String {
        format!("voted_poll_{poll_id}")
    }

    pub fn name(&self) -> String {
        Self::name_for(self.poll_id)
    }

    pub fn expires_at(&self) -> OffsetDateTime {
        self.cast_at + Self::ttl()
    }

    pub fn is_fresh(&self, now: OffsetDateTime) -> bool {
        now < self.expires_at()
    }

    pub fn encode(&self) -> String {
        self.cast_at.unix_timestamp().to_string()
    }

    pub fn decode(poll_id: u32, value: &str) -> Option<Self> {
        let seconds = value.trim().parse::<i64>().ok()?;
        let cast_at = OffsetDateTime::from_unix_timestamp(seconds).ok()?;
        Some(Self { poll_id, cast_at })
    }

    /// Whether a stored marker value still blocks voting. Values that are not
    /// timestamps count as present.
    pub fn blocks(poll_id: u32, value: &str, now: OffsetDateTime) -> bool {
        Self::decode(poll_id, value).map_or(true, |marker| marker.is_fresh(now))
    }
}
