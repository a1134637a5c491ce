//! Once-only materialization of deferred fields
//!
//! A `Lazy<T>` starts `Unpopulated`, moves to `Materializing` while its loader
//! runs and ends `Populated`. The state is flipped before the loader is
//! called, so a loader that reads back into the same cell gets
//! `ModelError::Reentrant` instead of recursing. A failing loader puts the
//! cell back to `Unpopulated`, so the next read retries.

use crate::{Identity, ModelError};
use serde::Serialize;
use std::cell::{Cell, OnceCell};

/// Observable population state of a deferred field
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum LoadState {
    Unpopulated,
    Materializing,
    Populated,
}

/// A field populated on first access
#[derive(Clone, Debug)]
pub struct Lazy<T> {
    state: Cell<LoadState>,
    value: OnceCell<T>,
}

impl<T> Lazy<T> {
    /// A cell that will run its loader on first access
    pub fn pending() -> Self {
        Self {
            state: Cell::new(LoadState::Unpopulated),
            value: OnceCell::new(),
        }
    }

    /// A cell that is already populated
    pub fn ready(value: T) -> Self {
        Self {
            state: Cell::new(LoadState::Populated),
            value: OnceCell::from(value),
        }
    }

    pub fn state(&self) -> LoadState {
        self.state.get()
    }

    pub fn is_populated(&self) -> bool {
        self.state.get() == LoadState::Populated
    }

    /// The value if it has been populated, without loading
    pub fn peek(&self) -> Option<&T> {
        self.value.get()
    }

    /// Return the value, running `load` if this is the first access.
    ///
    /// `owner` names the entity in errors.
    pub fn get_or_load<F>(&self, owner: &Identity, load: F) -> Result<&T, ModelError>
    where
        F: FnOnce() -> Result<T, ModelError>,
    {
        if let Some(value) = self.value.get() {
            return Ok(value);
        }
        if self.state.get() == LoadState::Materializing {
            return Err(ModelError::Reentrant {
                identity: owner.clone(),
            });
        }

        self.state.set(LoadState::Materializing);
        match load() {
            Ok(value) => {
                self.state.set(LoadState::Populated);
                Ok(self.value.get_or_init(|| value))
            }
            Err(err) => {
                self.state.set(LoadState::Unpopulated);
                Err(err)
            }
        }
    }

    /// Mutable access, loading first if needed
    pub fn get_mut_or_load<F>(&mut self, owner: &Identity, load: F) -> Result<&mut T, ModelError>
    where
        F: FnOnce() -> Result<T, ModelError>,
    {
        if self.value.get().is_none() {
            // `&mut self` rules out re-entrant reads while `load` runs
            let value = load()?;
            self.set(value);
        }
        self.value.get_mut().ok_or_else(|| ModelError::Unpopulated {
            identity: owner.clone(),
        })
    }

    /// Replace the value, marking the cell populated
    pub fn set(&mut self, value: T) {
        self.value = OnceCell::from(value);
        self.state.set(LoadState::Populated);
    }

    pub fn into_inner(self) -> Option<T> {
        self.value.into_inner()
    }
}

impl<T> Default for Lazy<T> {
    fn default() -> Self {
        Self::pending()
    }
}
