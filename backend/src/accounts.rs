use std::fs;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, Writer};
use shared::{validation::validate_credentials, Account, PollError, Resource};
use tracing::info;

use crate::error::ApiError;

/// Username/password table backed by a two-column CSV file.
#[derive(Debug)]
pub struct AccountStore {
    path: PathBuf,
    accounts: Vec<Account>,
}

impl AccountStore {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ApiError> {
        let mut store = Self {
            path: path.into(),
            accounts: Vec::new(),
        };

        let has_content = fs::metadata(&store.path).map(|m| m.len() > 0).unwrap_or(false);
        if !has_content {
            info!("Initializing empty account table at {}", store.path.display());
            store.persist()?;
            return Ok(store);
        }

        let mut reader = ReaderBuilder::new().from_path(&store.path)?;
        for row in reader.deserialize::<Account>() {
            store.accounts.push(row?);
        }

        info!("👤 Loaded {} accounts from {}", store.accounts.len(), store.path.display());
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn persist(&self) -> Result<(), ApiError> {
        let mut writer = Writer::from_path(&self.path)?;
        // Written explicitly so an empty table still carries its header.
        writer.write_record(["username", "password"])?;
        for account in &self.accounts {
            writer.write_record([account.username.as_str(), account.password.as_str()])?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn exists(&self, username: &str) -> bool {
        self.find(username).is_some()
    }

    fn find(&self, username: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.username == username)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn create(&mut self, username: &str, password: &str) -> Result<(), ApiError> {
        validate_credentials(username, password)?;
        if self.exists(username) {
            return Err(PollError::DuplicateUsername.into());
        }

        self.accounts.push(Account {
            username: username.to_string(),
            password: password.to_string(),
        });
        if let Err(e) = self.persist() {
            self.accounts.pop();
            return Err(e);
        }

        info!("Created account {}", username);
        Ok(())
    }

    pub fn verify(&self, username: &str, password: &str) -> Result<(), PollError> {
        let account = self
            .find(username)
            .ok_or(PollError::NotFound(Resource::Account))?;
        if account.password != password {
            return Err(PollError::WrongPassword);
        }
        Ok(())
    }
}
