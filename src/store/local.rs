//! Directory-backed store: each subdirectory of the root is a prefix and the
//! regular files inside it are its objects. Matches the layout the sensor
//! uploader writes (`<interval>/<asctime>.csv`).

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use super::ObjectStore;
use crate::models::RemoteObject;
use crate::{Error, Result};

#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    // ---
    pub fn new(root: impl Into<PathBuf>) -> Self {
        LocalStore { root: root.into() }
    }

    /// Resolve an object path under the root, refusing anything that could
    /// escape it.
    fn resolve(&self, full_path: &str) -> Result<PathBuf> {
        // ---
        let relative = Path::new(full_path);
        let contained = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));

        if full_path.is_empty() || !contained {
            return Err(Error::Storage(format!("invalid object path '{full_path}'")));
        }

        Ok(self.root.join(relative))
    }

    async fn entries(&self, dir: &Path, want_dirs: bool) -> Result<Vec<String>> {
        // ---
        let mut names = Vec::new();
        let mut reader = fs::read_dir(dir).await?;

        while let Some(entry) = reader.next_entry().await? {
            let file_type = entry.file_type().await?;
            let keep = if want_dirs {
                file_type.is_dir()
            } else {
                file_type.is_file()
            };
            if !keep {
                continue;
            }

            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => debug!("Skipping non UTF-8 entry {:?} in {}", raw, dir.display()),
            }
        }

        // read_dir order is unspecified; list like an object store does.
        names.sort();
        Ok(names)
    }
}

#[async_trait]
impl ObjectStore for LocalStore {
    // ---
    async fn list_prefixes(&self) -> Result<Vec<String>> {
        self.entries(&self.root, true).await
    }

    async fn list_items(&self, prefix: &str) -> Result<Vec<RemoteObject>> {
        // ---
        let dir = self.resolve(prefix)?;
        let names = self.entries(&dir, false).await?;

        Ok(names
            .into_iter()
            .map(|name| RemoteObject {
                full_path: format!("{prefix}/{name}"),
                name,
            })
            .collect())
    }

    async fn read(&self, object: &RemoteObject) -> Result<Vec<u8>> {
        let path = self.resolve(&object.full_path)?;
        Ok(fs::read(path).await?)
    }

    async fn delete(&self, object: &RemoteObject) -> Result<()> {
        let path = self.resolve(&object.full_path)?;
        Ok(fs::remove_file(path).await?)
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    fn seed() -> tempfile::TempDir {
        // ---
        let dir = tempfile::tempdir().unwrap();
        for interval in ["daily", "hourly"] {
            std::fs::create_dir(dir.path().join(interval)).unwrap();
        }
        std::fs::write(dir.path().join("daily/Tue Nov 8 00:00:00 2022.csv"), "b").unwrap();
        std::fs::write(dir.path().join("daily/Mon Nov 7 00:00:00 2022.csv"), "a").unwrap();
        std::fs::create_dir(dir.path().join("daily/nested")).unwrap();
        std::fs::write(dir.path().join("stray.csv"), "x").unwrap();
        dir
    }

    #[tokio::test]
    async fn test_lists_directories_as_prefixes() {
        // ---
        let dir = seed();
        let store = LocalStore::new(dir.path());

        assert_eq!(store.list_prefixes().await.unwrap(), vec!["daily", "hourly"]);
    }

    #[tokio::test]
    async fn test_lists_files_only() {
        // ---
        let dir = seed();
        let store = LocalStore::new(dir.path());

        let items = store.list_items("daily").await.unwrap();
        let paths: Vec<_> = items.iter().map(|o| o.full_path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "daily/Mon Nov 7 00:00:00 2022.csv",
                "daily/Tue Nov 8 00:00:00 2022.csv"
            ]
        );
        assert_eq!(items[0].name, "Mon Nov 7 00:00:00 2022.csv");
    }

    #[tokio::test]
    async fn test_read_and_delete() {
        // ---
        let dir = seed();
        let store = LocalStore::new(dir.path());
        let obj = RemoteObject::from_full_path("daily/Mon Nov 7 00:00:00 2022.csv");

        assert_eq!(store.read(&obj).await.unwrap(), b"a");
        store.delete(&obj).await.unwrap();
        assert!(store.read(&obj).await.is_err());
        assert!(store.delete(&obj).await.is_err());
    }

    #[tokio::test]
    async fn test_rejects_escaping_paths() {
        // ---
        let dir = seed();
        let store = LocalStore::new(dir.path().join("daily"));

        let escape = RemoteObject::from_full_path("../stray.csv");
        assert!(matches!(store.read(&escape).await, Err(Error::Storage(_))));

        let absolute = RemoteObject::from_full_path("/etc/passwd");
        assert!(matches!(store.read(&absolute).await, Err(Error::Storage(_))));
    }
}
