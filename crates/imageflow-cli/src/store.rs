//! Filesystem save target for downloads
//!
//! Downloaded bytes are staged in a named temporary file; saving copies the staged
//! file into the output directory and releasing deletes it. A save never replaces an
//! existing file: a taken name gets a ` (n)` suffix before its extension.

use bytes::Bytes;
use imageflow_core::{ClientError, ObjectRef, ObjectStore};
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tempfile::NamedTempFile;

/// Suffixes tried before giving up on a taken file name
const MAX_NAME_ATTEMPTS: usize = 1000;

pub struct FsObjectStore {
    out_dir: PathBuf,
    staged: Mutex<HashMap<String, NamedTempFile>>,
    next_id: AtomicU64,
}

impl FsObjectStore {
    pub fn new(out_dir: impl Into<PathBuf>) -> Result<Self, ClientError> {
        let out_dir = out_dir.into();
        std::fs::create_dir_all(&out_dir)?;
        Ok(Self {
            out_dir,
            staged: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(0),
        })
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Number of staged objects not yet released
    pub fn staged_count(&self) -> usize {
        self.staged.lock().map(|staged| staged.len()).unwrap_or(0)
    }
}

/// Keep only the final path component so a backend-supplied name cannot escape the
/// output directory
fn safe_file_name(file_name: &str) -> Result<&str, ClientError> {
    Path::new(file_name)
        .file_name()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ClientError::Storage(format!("Invalid file name: {:?}", file_name)))
}

/// `name` for the first attempt, then `stem (n).ext`
fn numbered_name(name: &str, attempt: usize) -> String {
    if attempt == 0 {
        return name.to_string();
    }
    let path = Path::new(name);
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or(name);
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{} ({}).{}", stem, attempt, ext),
        None => format!("{} ({})", stem, attempt),
    }
}

impl FsObjectStore {
    /// Create a new file in the output directory, picking the first free variant of
    /// `name`
    fn create_unique(&self, name: &str) -> Result<(String, PathBuf, File), ClientError> {
        for attempt in 0..MAX_NAME_ATTEMPTS {
            let candidate = numbered_name(name, attempt);
            let path = self.out_dir.join(&candidate);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((candidate, path, file)),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Err(ClientError::Storage(format!(
            "No free file name for {:?} in {}",
            name,
            self.out_dir.display()
        )))
    }
}

impl ObjectStore for FsObjectStore {
    fn create_object(&self, bytes: Bytes) -> Result<ObjectRef, ClientError> {
        let mut file = NamedTempFile::new()?;
        file.write_all(&bytes)?;
        file.flush()?;

        let id = format!("staged-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        self.staged
            .lock()
            .map_err(|_| ClientError::Storage("staging table poisoned".to_string()))?
            .insert(id.clone(), file);
        Ok(ObjectRef(id))
    }

    fn save_as(&self, object: &ObjectRef, file_name: &str) -> Result<String, ClientError> {
        let name = safe_file_name(file_name)?;
        let source_path = self
            .staged
            .lock()
            .map_err(|_| ClientError::Storage("staging table poisoned".to_string()))?
            .get(&object.0)
            .map(|file| file.path().to_path_buf())
            .ok_or_else(|| ClientError::Storage(format!("Unknown object {}", object.0)))?;

        let mut source = File::open(&source_path)?;
        let (saved_name, target, mut file) = self.create_unique(name)?;
        if let Err(e) = std::io::copy(&mut source, &mut file).and_then(|_| file.flush()) {
            let _ = std::fs::remove_file(&target);
            return Err(e.into());
        }

        tracing::debug!(path = %target.display(), "Saved download");
        Ok(saved_name)
    }

    fn release(&self, object: ObjectRef) {
        if let Ok(mut staged) = self.staged.lock() {
            staged.remove(&object.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_copies_and_release_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsObjectStore::new(dir.path().join("out")).unwrap();

        let object = store.create_object(Bytes::from_static(b"pixels")).unwrap();
        assert_eq!(store.staged_count(), 1);

        assert_eq!(store.save_as(&object, "result.jpg").unwrap(), "result.jpg");
        let saved = std::fs::read(store.out_dir().join("result.jpg")).unwrap();
        assert_eq!(saved, b"pixels");

        store.release(object);
        assert_eq!(store.staged_count(), 0);
    }

    #[test]
    fn names_are_confined_to_out_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsObjectStore::new(dir.path()).unwrap();
        let object = store.create_object(Bytes::from_static(b"x")).unwrap();

        store.save_as(&object, "../../etc/evil.jpg").unwrap();
        assert!(dir.path().join("evil.jpg").exists());

        assert!(store.save_as(&object, "..").is_err());
        store.release(object);
    }

    #[test]
    fn unknown_object_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsObjectStore::new(dir.path()).unwrap();
        let err = store
            .save_as(&ObjectRef("missing".to_string()), "a.jpg")
            .unwrap_err();
        assert!(matches!(err, ClientError::Storage(_)));
    }

    #[test]
    fn same_name_saves_do_not_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsObjectStore::new(dir.path()).unwrap();
        let first = store.create_object(Bytes::from_static(b"a1")).unwrap();
        let second = store.create_object(Bytes::from_static(b"a2")).unwrap();

        let first_name = store.save_as(&first, "processed-image.jpg").unwrap();
        let second_name = store.save_as(&second, "processed-image.jpg").unwrap();
        assert_eq!(first_name, "processed-image.jpg");
        assert_eq!(second_name, "processed-image (1).jpg");

        let mut files: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        files.sort();
        assert_eq!(files, vec!["processed-image (1).jpg", "processed-image.jpg"]);
        assert_eq!(std::fs::read(dir.path().join("processed-image.jpg")).unwrap(), b"a1");
        assert_eq!(std::fs::read(dir.path().join("processed-image (1).jpg")).unwrap(), b"a2");

        store.release(first);
        store.release(second);
    }

    #[test]
    fn numbered_names_keep_the_extension() {
        assert_eq!(numbered_name("cat.jpg", 0), "cat.jpg");
        assert_eq!(numbered_name("cat.jpg", 2), "cat (2).jpg");
        assert_eq!(numbered_name("README", 1), "README (1)");
    }

    #[test]
    fn staging_table_is_free_while_saving() {
        let dir = tempfile::tempdir().unwrap();
        let store = std::sync::Arc::new(FsObjectStore::new(dir.path()).unwrap());
        let objects: Vec<_> = (0..8)
            .map(|i| store.create_object(Bytes::from(vec![i as u8; 64])).unwrap())
            .collect();

        let handles: Vec<_> = objects
            .into_iter()
            .map(|object| {
                let store = std::sync::Arc::clone(&store);
                std::thread::spawn(move || {
                    let name = store.save_as(&object, "shared.bin").unwrap();
                    store.release(object);
                    name
                })
            })
            .collect();
        let mut names: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        names.sort();
        names.dedup();

        assert_eq!(names.len(), 8);
        assert_eq!(store.staged_count(), 0);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 8);
    }
}
