//! Memory-mapped backing storage for inputs, interned by resolved path so that two
//! `Input`s referring to the same file (an object named twice, or an object pulled
//! from two different archives that happen to be the same physical copy) share one
//! mapping.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use memmap2::Mmap;

/// Either a real `mmap`-backed region or an owned buffer, for inputs that cannot be
/// mapped (stdin, a synthetic internal file, or a platform where mapping failed and
/// the caller chose to fall back to a plain read).
pub enum Backing {
    /// Bytes mapped directly from the file
    Mapped(Mmap),
    /// Bytes read into an owned buffer
    Owned(Vec<u8>),
}

impl Backing {
    /// The bytes, regardless of which variant backs them.
    pub fn as_slice(&self) -> &[u8] {
        match self {
            Backing::Mapped(m) => m,
            Backing::Owned(v) => v,
        }
    }
}

/// One physical mapping, reference-counted since several `Input`s may share it.
pub type SharedBacking = Arc<Backing>;

/// Interning map from resolved path to its mapping. Built serially before parallel
/// input parsing begins (or guarded by the lock below if mappings are discovered
/// mid-parse, e.g. via a `GROUP` command encountered while parsing another input).
#[derive(Default)]
pub struct PathInterner {
    entries: std::sync::Mutex<HashMap<PathBuf, SharedBacking>>,
}

impl PathInterner {
    /// Return the mapping for `path`, creating and recording one if this is the first
    /// time `path` has been seen. Errors propagate from the underlying `open`/`mmap`
    /// call.
    pub fn get_or_map(&self, path: &Path) -> std::io::Result<SharedBacking> {
        #[allow(clippy::unwrap_used)]
        let mut entries = self.entries.lock().unwrap();
        if let Some(existing) = entries.get(path) {
            return Ok(Arc::clone(existing));
        }

        let file = std::fs::File::open(path)?;
        // SAFETY: the mapping is only ever read; the linker does not promise
        // coherency if the backing file is mutated by another process mid-link, which
        // matches every other ELF tool's mmap-based input handling.
        let backing = match unsafe { Mmap::map(&file) } {
            Ok(mmap) => Backing::Mapped(mmap),
            Err(_) => Backing::Owned(std::fs::read(path)?),
        };
        let shared = Arc::new(backing);
        entries.insert(path.to_path_buf(), Arc::clone(&shared));
        Ok(shared)
    }

    /// Number of distinct paths currently interned.
    pub fn len(&self) -> usize {
        #[allow(clippy::unwrap_used)]
        self.entries.lock().unwrap().len()
    }

    /// True if nothing has been interned yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;

    #[test]
    fn second_request_for_same_path_shares_the_mapping() {
        let mut file = tempfile_in_target();
        file.1.write_all(b"hello").unwrap();
        let interner = PathInterner::default();
        let a = interner.get_or_map(&file.0).unwrap();
        let b = interner.get_or_map(&file.0).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(interner.len(), 1);
        assert_eq!(a.as_slice(), b"hello");
    }

    fn tempfile_in_target() -> (PathBuf, std::fs::File) {
        let mut path = std::env::temp_dir();
        path.push(format!(
            "eld-core-test-{:?}-{}",
            std::thread::current().id(),
            path.as_os_str().len()
        ));
        let file = std::fs::OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .read(true)
            .open(&path)
            .unwrap();
        (path, file)
    }
}
