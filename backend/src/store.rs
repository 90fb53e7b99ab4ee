use std::collections::btree_map::{BTreeMap, Entry};
use std::fs;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, Writer};
use shared::{OptionIndex, Poll, PollError, Resource, MAX_OPTIONS};
use tracing::{debug, info, warn};

use crate::error::ApiError;

pub const ID_COLUMN: &str = "id";
pub const POLL_COLUMN: &str = "poll";

/// Column names in persisted order: id, poll, option1..option42, vote1..vote42.
pub fn header_row() -> Vec<String> {
    let options = (1..=MAX_OPTIONS).map(|i| format!("option{i}"));
    let votes = (1..=MAX_OPTIONS).map(|i| format!("vote{i}"));
    [ID_COLUMN.to_string(), POLL_COLUMN.to_string()]
        .into_iter()
        .chain(options)
        .chain(votes)
        .collect()
}

fn poll_row(poll: &Poll) -> Vec<String> {
    let options = poll.options().iter().map(|o| o.clone().unwrap_or_default());
    let votes = poll.vote_counts().iter().map(u32::to_string);
    [poll.id.to_string(), poll.question.clone()]
        .into_iter()
        .chain(options)
        .chain(votes)
        .collect()
}

/// Reads a vote cell. Blank, negative and non-numeric cells count as zero;
/// float renderings such as `3.0` are accepted.
fn parse_count(cell: &str) -> u32 {
    let cell = cell.trim();
    cell.parse::<u32>().unwrap_or_else(|_| match cell.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => v as u32,
        _ => 0,
    })
}

/// Reads an id cell. Float renderings such as `7.0` are accepted only when
/// they name a whole number that fits in a `u32`.
fn parse_id(cell: &str) -> Option<u32> {
    let cell = cell.trim();
    let id = cell.parse::<u32>().ok().or_else(|| {
        cell.parse::<f64>()
            .ok()
            .filter(|v| v.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(v))
            .map(|v| v as u32)
    })?;
    (id > 0).then_some(id)
}

/// Positions of the known columns inside whatever header a file carries.
struct ColumnMap {
    id: Option<usize>,
    poll: Option<usize>,
    options: [Option<usize>; MAX_OPTIONS],
    votes: [Option<usize>; MAX_OPTIONS],
}

impl ColumnMap {
    fn from_headers(headers: &StringRecord) -> Self {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        Self {
            id: find(ID_COLUMN),
            poll: find(POLL_COLUMN),
            options: std::array::from_fn(|i| find(&format!("option{}", i + 1))),
            votes: std::array::from_fn(|i| find(&format!("vote{}", i + 1))),
        }
    }

    fn cell<'a>(record: &'a StringRecord, column: Option<usize>) -> &'a str {
        column.and_then(|c| record.get(c)).unwrap_or("")
    }

    fn parse(&self, record: &StringRecord) -> Option<Poll> {
        let id = parse_id(Self::cell(record, self.id))?;
        let question = Self::cell(record, self.poll).to_string();
        let options = std::array::from_fn(|i| {
            Some(Self::cell(record, self.options[i]))
                .filter(|text| !text.is_empty())
                .map(str::to_string)
        });
        let votes = std::array::from_fn(|i| parse_count(Self::cell(record, self.votes[i])));
        Some(Poll::from_parts(id, question, options, votes))
    }
}

/// The poll table and its on-disk mirror. Every mutation rewrites the whole
/// file before returning.
#[derive(Debug)]
pub struct PollStore {
    path: PathBuf,
    polls: BTreeMap<u32, Poll>,
}

impl PollStore {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ApiError> {
        let mut store = Self {
            path: path.into(),
            polls: BTreeMap::new(),
        };

        let has_content = fs::metadata(&store.path).map(|m| m.len() > 0).unwrap_or(false);
        if !has_content {
            info!("Initializing empty poll table at {}", store.path.display());
            store.persist()?;
            return Ok(store);
        }

        let mut reader = ReaderBuilder::new().flexible(true).from_path(&store.path)?;
        let columns = ColumnMap::from_headers(reader.headers()?);
        if columns.id.is_none() {
            warn!("Poll table {} has no id column; starting empty", store.path.display());
        }

        for (line, record) in reader.records().enumerate() {
            let record = record?;
            let Some(poll) = columns.parse(&record) else {
                warn!("Skipping poll row {} with a missing or invalid id", line + 2);
                continue;
            };
            match store.polls.entry(poll.id) {
                Entry::Vacant(slot) => {
                    slot.insert(poll);
                }
                Entry::Occupied(_) => debug!("Dropping duplicate row for poll {}", poll.id),
            }
        }

        info!("📋 Loaded {} polls from {}", store.polls.len(), store.path.display());
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn persist(&self) -> Result<(), ApiError> {
        let mut writer = Writer::from_path(&self.path)?;
        writer.write_record(header_row())?;
        for poll in self.polls.values() {
            writer.write_record(poll_row(poll))?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn next_id(&self) -> Result<u32, PollError> {
        match self.polls.keys().next_back() {
            None => Ok(1),
            Some(max) => max.checked_add(1).ok_or(PollError::IdsExhausted),
        }
    }

    pub fn insert(&mut self, poll: Poll) -> Result<(), ApiError> {
        let id = poll.id;
        match self.polls.entry(id) {
            Entry::Occupied(_) => return Err(PollError::DuplicateId(id).into()),
            Entry::Vacant(slot) => {
                slot.insert(poll);
            }
        }

        if let Err(e) = self.persist() {
            self.polls.remove(&id);
            return Err(e);
        }
        Ok(())
    }

    pub fn get(&self, id: u32) -> Result<&Poll, PollError> {
        self.polls.get(&id).ok_or(PollError::NotFound(Resource::Poll))
    }

    pub fn list(&self) -> impl Iterator<Item = &Poll> {
        self.polls.values()
    }

    pub fn len(&self) -> usize {
        self.polls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polls.is_empty()
    }

    /// Adds one vote and persists. Only the slot range is checked here;
    /// whether the slot is populated is the caller's concern.
    pub fn increment_vote(&mut self, id: u32, option: usize) -> Result<u32, ApiError> {
        let index = OptionIndex::try_from(option)?;
        let poll = self
            .polls
            .get_mut(&id)
            .ok_or(PollError::NotFound(Resource::Poll))?;
        let count = poll.increment(index);

        if let Err(e) = self.persist() {
            if let Some(poll) = self.polls.get_mut(&id) {
                poll.decrement(index);
            }
            return Err(e);
        }
        Ok(count)
    }
}
