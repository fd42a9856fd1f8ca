use std::collections::{BTreeMap, HashMap};
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::loader::{strip_extension, LoadError, Loader};
use crate::sample::TrajectorySample;
use crate::trajectory::Trajectory;

/// Joins a trajectory name and split index into a cache key. Cannot occur in a file name
/// produced by the planner.
pub const SPLIT_KEY_SEPARATOR: &str = ".:.";

fn split_key(name: &str, index: usize) -> String {
    format!("{}{}{}", name, SPLIT_KEY_SEPARATOR, index)
}

/// Backing map for a [`TrajectoryCache`].
pub trait TrajectoryStore<S> {
    fn get(&self, key: &str) -> Option<Arc<Trajectory<S>>>;
    fn insert(&mut self, key: String, trajectory: Arc<Trajectory<S>>);
    fn clear(&mut self);
    fn len(&self) -> usize;
}

impl<S> TrajectoryStore<S> for HashMap<String, Arc<Trajectory<S>>> {
    fn get(&self, key: &str) -> Option<Arc<Trajectory<S>>> {
        HashMap::get(self, key).cloned()
    }

    fn insert(&mut self, key: String, trajectory: Arc<Trajectory<S>>) {
        HashMap::insert(self, key, trajectory);
    }

    fn clear(&mut self) {
        HashMap::clear(self)
    }

    fn len(&self) -> usize {
        HashMap::len(self)
    }
}

impl<S> TrajectoryStore<S> for BTreeMap<String, Arc<Trajectory<S>>> {
    fn get(&self, key: &str) -> Option<Arc<Trajectory<S>>> {
        BTreeMap::get(self, key).cloned()
    }

    fn insert(&mut self, key: String, trajectory: Arc<Trajectory<S>>) {
        BTreeMap::insert(self, key, trajectory);
    }

    fn clear(&mut self) {
        BTreeMap::clear(self)
    }

    fn len(&self) -> usize {
        BTreeMap::len(self)
    }
}

/// Loads each trajectory (and each split) at most once and hands out shared
/// references afterwards.
///
/// Failed loads are not remembered, so a later call retries. Share across
/// threads behind a lock, e.g. `Arc<Mutex<TrajectoryCache<_>>>`.
pub struct TrajectoryCache<S, M = HashMap<String, Arc<Trajectory<S>>>> {
    loader: Arc<Loader>,
    store: M,
    _sample: PhantomData<fn() -> S>,
}

impl<S> TrajectoryCache<S>
where
    S: TrajectorySample + DeserializeOwned,
{
    pub fn new(loader: Arc<Loader>) -> Self {
        Self::with_store(loader, HashMap::new())
    }
}

impl<S, M> TrajectoryCache<S, M>
where
    S: TrajectorySample + DeserializeOwned,
    M: TrajectoryStore<S>,
{
    pub fn with_store(loader: Arc<Loader>, store: M) -> Self {
        Self {
            loader,
            store,
            _sample: PhantomData,
        }
    }

    pub fn loader(&self) -> &Loader {
        &self.loader
    }

    /// Returns the cached trajectory, loading and caching it on first request.
    ///
    /// `Ok(None)` means the file was missing or malformed (already logged).
    pub fn load(&mut self, name: &str) -> Result<Option<Arc<Trajectory<S>>>, LoadError> {
        let name = strip_extension(name);
        if let Some(trajectory) = self.store.get(name) {
            return Ok(Some(trajectory));
        }

        let Some(trajectory) = self.loader.load_trajectory::<S>(name)? else {
            return Ok(None);
        };
        let trajectory = Arc::new(trajectory);
        self.store.insert(name.to_string(), Arc::clone(&trajectory));
        Ok(Some(trajectory))
    }

    /// Returns split `index` of `name`, caching both the split and the whole trajectory.
    pub fn load_split(
        &mut self,
        name: &str,
        index: usize,
    ) -> Result<Option<Arc<Trajectory<S>>>, LoadError> {
        let name = strip_extension(name);
        let key = split_key(name, index);
        if let Some(split) = self.store.get(&key) {
            return Ok(Some(split));
        }

        let Some(parent) = self.load(name)? else {
            return Ok(None);
        };
        let Some(split) = parent.split(index) else {
            log::warn!("Trajectory {} has no split {}", name, index);
            return Ok(None);
        };
        let split = Arc::new(split);
        self.store.insert(key, Arc::clone(&split));
        Ok(Some(split))
    }

    /// Drops every cached trajectory and split.
    pub fn clear(&mut self) {
        self.store.clear();
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.len() == 0
    }
}
