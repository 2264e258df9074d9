//! Non-blocking profile load/save around the driver.
//!
//! Loads and saves run on tokio's blocking pool. Completed loads queue on an
//! mpsc channel and only enter the live world when the driver drains them
//! with [`SessionHost::admit_completed`], so nothing touches a profile before
//! its load finishes.
//!
//! A profile handed to a background save stays reachable until the store
//! has it. Reconnecting in that window is served from the in-flight copy, and
//! saves for one identity land in the order their sessions ended.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use stat_core::{EntityId, StatProfile, Timestamp};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::engine::Engine;
use crate::error::{StoreError, StoreResult};
use crate::store::ProfileStore;

struct LoadOutcome {
    id: EntityId,
    name: String,
    result: StoreResult<Option<StatProfile>>,
}

/// Newest profile handed to a save for one identity
struct InFlightSave {
    generation: u64,
    profile: StatProfile,
    /// Held while writing so saves for one identity never overlap
    write_lock: Arc<Mutex<()>>,
}

type InFlightSaves = Arc<Mutex<HashMap<EntityId, InFlightSave>>>;

pub struct SessionHost {
    store: Arc<dyn ProfileStore>,
    runtime: Handle,
    tx: mpsc::UnboundedSender<LoadOutcome>,
    rx: mpsc::UnboundedReceiver<LoadOutcome>,
    pending: HashSet<EntityId>,
    cancelled: HashSet<EntityId>,
    saving: InFlightSaves,
    next_generation: u64,
}

impl SessionHost {
    pub fn new(store: Arc<dyn ProfileStore>, runtime: Handle) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        SessionHost {
            store,
            runtime,
            tx,
            rx,
            pending: HashSet::new(),
            cancelled: HashSet::new(),
            saving: Arc::new(Mutex::new(HashMap::new())),
            next_generation: 0,
        }
    }

    /// Start loading a profile; false if a load for this session is already in flight
    ///
    /// A load left over from a session that ended before it completed is
    /// picked up by the new session instead of starting another.
    pub fn begin_load(&mut self, id: EntityId, name: impl Into<String>) -> bool {
        if self.pending.contains(&id) {
            let resumed = self.cancelled.remove(&id);
            if resumed {
                tracing::debug!(entity = %id, "reconnected while loading, keeping the in-flight load");
            }
            return resumed;
        }
        self.pending.insert(id);
        let name = name.into();

        if let Some(profile) = self.in_flight_profile(id) {
            tracing::debug!(entity = %id, "profile still saving, loading the in-flight copy");
            // receiver lives as long as self
            let _ = self.tx.send(LoadOutcome {
                id,
                name,
                result: Ok(Some(profile)),
            });
            return true;
        }

        let store = Arc::clone(&self.store);
        let tx = self.tx.clone();
        self.runtime.spawn_blocking(move || {
            let result = store.load(id);
            // receiver gone means the host was dropped
            let _ = tx.send(LoadOutcome { id, name, result });
        });
        tracing::debug!(entity = %id, "profile load started");
        true
    }

    pub fn is_pending(&self, id: EntityId) -> bool {
        self.pending.contains(&id)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Whether a save for `id` has not reached the store yet
    pub fn is_saving(&self, id: EntityId) -> bool {
        self.saving
            .lock()
            .map(|saving| saving.contains_key(&id))
            .unwrap_or(false)
    }

    /// Admit every load that has finished, without waiting
    pub fn admit_completed(&mut self, engine: &mut Engine) -> Vec<EntityId> {
        let mut admitted = Vec::new();
        while let Ok(outcome) = self.rx.try_recv() {
            if let Some(id) = self.admit(outcome, engine) {
                admitted.push(id);
            }
        }
        admitted
    }

    /// Wait for the next load to finish and admit it
    pub async fn admit_next(&mut self, engine: &mut Engine) -> Option<EntityId> {
        while !self.pending.is_empty() {
            let outcome = self.rx.recv().await?;
            if let Some(id) = self.admit(outcome, engine) {
                return Some(id);
            }
        }
        None
    }

    /// Tear down a live session and save the profile in the background
    ///
    /// Returns `None` when the identity was not live. A session whose load is
    /// still in flight is cancelled instead. A save overtaken by a later one
    /// for the same identity skips its write.
    pub fn end_session(
        &mut self,
        engine: &mut Engine,
        id: EntityId,
        now: Timestamp,
    ) -> Option<JoinHandle<StoreResult<()>>> {
        if self.pending.contains(&id) {
            self.cancelled.insert(id);
            tracing::debug!(entity = %id, "session ended before load completed");
            return None;
        }
        let profile = engine.teardown(id, now)?;

        self.next_generation += 1;
        let generation = self.next_generation;
        let write_lock = match self.saving.lock() {
            Ok(mut saving) => {
                let write_lock = saving
                    .get(&id)
                    .map(|previous| Arc::clone(&previous.write_lock))
                    .unwrap_or_default();
                saving.insert(
                    id,
                    InFlightSave {
                        generation,
                        profile: profile.clone(),
                        write_lock: Arc::clone(&write_lock),
                    },
                );
                write_lock
            }
            Err(_) => {
                tracing::error!(entity = %id, "save tracking lock poisoned");
                Arc::default()
            }
        };

        let store = Arc::clone(&self.store);
        let saving = Arc::clone(&self.saving);
        Some(self.runtime.spawn_blocking(move || {
            let result = write_in_order(store.as_ref(), &saving, &write_lock, generation, &profile);
            if let Err(err) = &result {
                tracing::error!(entity = %profile.id(), error = %err, "failed to save profile");
            }
            result
        }))
    }

    fn in_flight_profile(&self, id: EntityId) -> Option<StatProfile> {
        let saving = self.saving.lock().ok()?;
        saving.get(&id).map(|save| save.profile.clone())
    }

    fn admit(&mut self, outcome: LoadOutcome, engine: &mut Engine) -> Option<EntityId> {
        let LoadOutcome { id, name, result } = outcome;
        self.pending.remove(&id);
        if self.cancelled.remove(&id) {
            return None;
        }

        let profile = match result {
            Ok(Some(mut profile)) => {
                profile.rehydrate(engine.config());
                profile
            }
            Ok(None) => {
                tracing::debug!(entity = %id, "no stored profile, creating a new one");
                StatProfile::new(id, name, engine.config())
            }
            Err(err) => {
                tracing::error!(entity = %id, error = %err, "profile load failed, using a default profile");
                StatProfile::new(id, name, engine.config())
            }
        };
        engine.admit(profile);
        Some(id)
    }
}

/// Write `profile` unless a newer save for it has been queued
///
/// The in-flight entry is dropped once the newest save lands. A failed save
/// keeps it, so a reconnect still sees the unsaved profile.
fn write_in_order(
    store: &dyn ProfileStore,
    saving: &Mutex<HashMap<EntityId, InFlightSave>>,
    write_lock: &Mutex<()>,
    generation: u64,
    profile: &StatProfile,
) -> StoreResult<()> {
    let id = profile.id();
    let _writing = write_lock.lock().map_err(|_| StoreError::LockPoisoned)?;
    let is_newest = |saving: &HashMap<EntityId, InFlightSave>| {
        saving.get(&id).is_some_and(|save| save.generation == generation)
    };

    if !is_newest(&*saving.lock().map_err(|_| StoreError::LockPoisoned)?) {
        tracing::debug!(entity = %id, "save superseded by a later session");
        return Ok(());
    }
    store.save(profile)?;

    let mut saving = saving.lock().map_err(|_| StoreError::LockPoisoned)?;
    if is_newest(&*saving) {
        saving.remove(&id);
    }
    Ok(())
}
