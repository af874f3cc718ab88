//! In-process store keyed by full path. Keeps insertion order for listings
//! and records every delete call so callers can inspect what was pruned.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::ObjectStore;
use crate::models::RemoteObject;
use crate::{Error, Result};

#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: Mutex<Vec<(String, Vec<u8>)>>,
    deletes: Mutex<Vec<String>>,
    fail_deletes: bool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MemoryStore {
    // ---
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// A store whose delete calls are recorded but always fail.
    pub fn with_failing_deletes() -> Self {
        MemoryStore {
            fail_deletes: true,
            ..MemoryStore::default()
        }
    }

    /// Add or replace an object. Replacing keeps the original list position.
    pub fn insert(&self, full_path: impl Into<String>, content: impl Into<Vec<u8>>) {
        // ---
        let full_path = full_path.into();
        let content = content.into();
        let mut objects = lock(&self.objects);

        match objects.iter_mut().find(|(path, _)| *path == full_path) {
            Some(slot) => slot.1 = content,
            None => objects.push((full_path, content)),
        }
    }

    pub fn contains(&self, full_path: &str) -> bool {
        lock(&self.objects).iter().any(|(path, _)| path == full_path)
    }

    /// Every path a delete was requested for, in call order.
    pub fn delete_calls(&self) -> Vec<String> {
        lock(&self.deletes).clone()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    // ---
    async fn list_prefixes(&self) -> Result<Vec<String>> {
        // ---
        let mut prefixes: Vec<String> = Vec::new();
        for (path, _) in lock(&self.objects).iter() {
            if let Some((prefix, _)) = path.split_once('/') {
                if !prefixes.iter().any(|p| p == prefix) {
                    prefixes.push(prefix.to_string());
                }
            }
        }
        Ok(prefixes)
    }

    async fn list_items(&self, prefix: &str) -> Result<Vec<RemoteObject>> {
        // ---
        let dir = format!("{prefix}/");
        Ok(lock(&self.objects)
            .iter()
            .filter_map(|(path, _)| {
                let rest = path.strip_prefix(&dir)?;
                (!rest.contains('/')).then(|| RemoteObject::from_full_path(path.clone()))
            })
            .collect())
    }

    async fn read(&self, object: &RemoteObject) -> Result<Vec<u8>> {
        // ---
        lock(&self.objects)
            .iter()
            .find(|(path, _)| *path == object.full_path)
            .map(|(_, content)| content.clone())
            .ok_or_else(|| Error::Storage(format!("object '{}' not found", object.full_path)))
    }

    async fn delete(&self, object: &RemoteObject) -> Result<()> {
        // ---
        lock(&self.deletes).push(object.full_path.clone());

        if self.fail_deletes {
            return Err(Error::Storage(format!(
                "delete of '{}' refused",
                object.full_path
            )));
        }

        let mut objects = lock(&self.objects);
        let before = objects.len();
        objects.retain(|(path, _)| *path != object.full_path);

        if objects.len() == before {
            return Err(Error::Storage(format!("object '{}' not found", object.full_path)));
        }
        Ok(())
    }
}
