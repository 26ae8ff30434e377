// Persistence adapter: whole-document load/save of an identifier -> record
// mapping against a named durable resource. Nothing is cached; every call
// re-reads or re-writes the full document.

use std::{
    collections::BTreeMap,
    fmt,
    fs,
    io::ErrorKind,
    marker::PhantomData,
    path::{Path, PathBuf},
    sync::Arc,
};

use dashmap::DashMap;
use parking_lot::Mutex;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::{error::StorageError, identifier::Identifier};

/// A full store document: every record of one entity type keyed by identifier.
pub type Records<R> = BTreeMap<Identifier, R>;

// Raw byte-level access to named resources. Implementations must fully replace
// the previous content on `write`.
pub trait StorageBackend: Send + Sync + 'static {
    // Returns None if the resource has never been written
    fn read(&self, resource: &str) -> Result<Option<Vec<u8>>, StorageError>;

    fn write(&self, resource: &str, contents: &[u8]) -> Result<(), StorageError>;
}

/// Load a store document. A missing resource yields an empty mapping, and so
/// does content that is not a JSON object (with a warning); neither is an
/// error. Records are decoded one at a time: a record that does not fit `R`
/// is skipped with a warning and the rest of the document is kept.
pub fn load<R>(backend: &dyn StorageBackend, resource: &str) -> Result<Records<R>, StorageError>
where
    R: DeserializeOwned,
{
    let Some(bytes) = backend.read(resource)? else {
        debug!(resource, "resource absent, starting from an empty store");
        return Ok(Records::new());
    };

    let raw: BTreeMap<Identifier, Value> = match serde_json::from_slice(&bytes) {
        Ok(raw) => raw,
        Err(err) => {
            warn!(resource, error = %err, "invalid JSON data in resource, returning empty store");
            return Ok(Records::new());
        }
    };

    let mut records = Records::new();
    for (id, value) in raw {
        match serde_json::from_value(value) {
            Ok(record) => {
                records.insert(id, record);
            }
            Err(err) => {
                warn!(resource, record_id = %id, error = %err, "skipping undecodable record");
            }
        }
    }
    Ok(records)
}

/// Serialize the whole mapping (4-space indented JSON) and replace the resource.
pub fn save<R>(
    backend: &dyn StorageBackend,
    resource: &str,
    records: &Records<R>,
) -> Result<(), StorageError>
where
    R: Serialize,
{
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    records
        .serialize(&mut serializer)
        .map_err(|source| StorageError::Encode {
            resource: resource.to_owned(),
            source,
        })?;

    backend.write(resource, &buf)
}

/// Typed handle on one resource. Registries receive one of these at
/// construction instead of reaching for a global file name.
pub struct Store<R> {
    backend: Arc<dyn StorageBackend>,
    resource: String,
    _record: PhantomData<fn() -> R>,
}

impl<R> Store<R> {
    pub fn new(backend: Arc<dyn StorageBackend>, resource: impl Into<String>) -> Self {
        Self {
            backend,
            resource: resource.into(),
            _record: PhantomData,
        }
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }
}

impl<R> Store<R>
where
    R: Serialize + DeserializeOwned,
{
    pub fn load(&self) -> Result<Records<R>, StorageError> {
        load(self.backend.as_ref(), &self.resource)
    }

    pub fn save(&self, records: &Records<R>) -> Result<(), StorageError> {
        save(self.backend.as_ref(), &self.resource, records)
    }
}

impl<R> Clone for Store<R> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            resource: self.resource.clone(),
            _record: PhantomData,
        }
    }
}

impl<R> fmt::Debug for Store<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("resource", &self.resource)
            .finish_non_exhaustive()
    }
}

/// One JSON file per resource under `root`.
///
/// Each resource has its own lock, held for the duration of a single read or
/// a single write, so a reader never observes a half-written file. The lock is
/// not held across a caller's read-modify-write cycle.
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl FileStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            locks: DashMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, resource: &str) -> PathBuf {
        self.root.join(resource)
    }

    fn lock_for(&self, resource: &str) -> Arc<Mutex<()>> {
        Arc::clone(&self.locks.entry(resource.to_owned()).or_default())
    }
}

impl StorageBackend for FileStore {
    fn read(&self, resource: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let lock = self.lock_for(resource);
        let _guard = lock.lock();

        match fs::read(self.path_for(resource)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StorageError::io(resource, err)),
        }
    }

    fn write(&self, resource: &str, contents: &[u8]) -> Result<(), StorageError> {
        let lock = self.lock_for(resource);
        let _guard = lock.lock();

        fs::create_dir_all(&self.root).map_err(|err| StorageError::io(resource, err))?;

        // write-then-rename so the old document is replaced in one step
        let target = self.path_for(resource);
        let staging = self.root.join(format!("{resource}.tmp"));
        fs::write(&staging, contents).map_err(|err| StorageError::io(resource, err))?;
        fs::rename(&staging, &target).map_err(|err| StorageError::io(resource, err))?;

        debug!(resource, bytes = contents.len(), "resource written");
        Ok(())
    }
}

/// Process-local backend. Keeps raw bytes so it behaves exactly like a file,
/// malformed content included.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: DashMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryStore {
    fn read(&self, resource: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.documents.get(resource).map(|doc| doc.value().clone()))
    }

    fn write(&self, resource: &str, contents: &[u8]) -> Result<(), StorageError> {
        self.documents.insert(resource.to_owned(), contents.to_vec());
        Ok(())
    }
}
