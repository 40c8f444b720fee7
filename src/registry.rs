//! In-memory profile registry backed by the record store.
//!
//! The registry keeps the profile collection in insertion order, which is
//! the order the shell displays with 1-based numbering; index lookups must
//! match that numbering exactly. Every mutation rewrites the whole backing
//! document, and rolls back in memory if the write fails so the record set
//! never diverges from disk.

use crate::error::{Error, Result};
use crate::store::{Profile, Settings, Store};

pub struct ProfileRegistry {
    store: Store,
    settings: Settings,
    profiles: Vec<Profile>,
}

impl ProfileRegistry {
    pub fn open(store: Store, settings: Settings, profiles: Vec<Profile>) -> Self {
        Self {
            store,
            settings,
            profiles,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Known profiles in insertion order.
    pub fn all(&self) -> &[Profile] {
        &self.profiles
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Exact, case-sensitive lookup by name.
    pub fn get(&self, name: &str) -> Option<&Profile> {
        self.profiles.iter().find(|profile| profile.name == name)
    }

    /// 1-based lookup matching the display numbering produced by [`all`].
    ///
    /// Index 0 is the "go back" entry and yields `Ok(None)` without
    /// touching the sequence; anything past the end is [`Error::NotFound`].
    ///
    /// [`all`]: Self::all
    pub fn by_display_index(&self, index: usize) -> Result<Option<&Profile>> {
        if index == 0 {
            return Ok(None);
        }
        self.profiles
            .get(index - 1)
            .map(Some)
            .ok_or_else(|| Error::NotFound(format!("entry {index}")))
    }

    /// Append a profile and persist, rejecting duplicate names.
    pub fn add(&mut self, profile: Profile) -> Result<()> {
        if self.get(&profile.name).is_some() {
            return Err(Error::DuplicateName(profile.name));
        }
        self.profiles.push(profile);
        if let Err(err) = self.persist() {
            self.profiles.pop();
            return Err(err);
        }
        Ok(())
    }

    /// Remove the profile with this name and persist.
    pub fn remove(&mut self, name: &str) -> Result<Profile> {
        let index = self
            .profiles
            .iter()
            .position(|profile| profile.name == name)
            .ok_or_else(|| Error::NotFound(name.to_string()))?;

        let removed = self.profiles.remove(index);
        if let Err(err) = self.persist() {
            self.profiles.insert(index, removed);
            return Err(err);
        }
        Ok(removed)
    }

    /// Swap in new settings and persist (the "setup" operation).
    pub fn replace_settings(&mut self, settings: Settings) -> Result<()> {
        let previous = std::mem::replace(&mut self.settings, settings);
        if let Err(err) = self.persist() {
            self.settings = previous;
            return Err(err);
        }
        Ok(())
    }

    fn persist(&self) -> Result<()> {
        self.store.save(&self.settings, &self.profiles)
    }
}
