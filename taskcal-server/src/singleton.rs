//! One taskcal-server per task database.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;

/// Holds the database lock until dropped.
pub struct DatabaseLock {
    _file: File,
}

/// `tasks.db` is guarded by `tasks.db.lock` in the same directory.
fn lock_path(database: &Path) -> Result<PathBuf> {
    let mut name = database
        .file_name()
        .with_context(|| format!("Database path {} has no file name", database.display()))?
        .to_os_string();
    name.push(".lock");
    Ok(database.with_file_name(name))
}

/// Lock `database` for this process, failing if another server already serves it.
pub fn acquire_lock(database: &Path) -> Result<DatabaseLock> {
    let path = lock_path(database)?;
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("Could not create {}", dir.display()))?;
    }
    let file = File::create(&path).context("Failed to create lock file")?;

    file.try_lock_exclusive().map_err(|_| {
        anyhow::anyhow!(
            "Another taskcal-server is already using {}.\n\
            If you believe this is an error, remove: {}",
            database.display(),
            path.display()
        )
    })?;

    Ok(DatabaseLock { _file: file })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_server_on_same_database_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let database = dir.path().join("data").join("tasks.db");

        let first = acquire_lock(&database).unwrap();
        let err = acquire_lock(&database).err().unwrap();
        assert!(err.to_string().contains("already using"));
        assert!(dir.path().join("data").join("tasks.db.lock").exists());

        drop(first);
        assert!(acquire_lock(&database).is_ok());
    }

    #[test]
    fn separate_databases_lock_independently() {
        let dir = tempfile::tempdir().unwrap();

        let _a = acquire_lock(&dir.path().join("a.db")).unwrap();
        let _b = acquire_lock(&dir.path().join("b.db")).unwrap();
    }
}
