// src/fs/mock.rs

use super::{FileStamp, FileSystem};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime};

#[derive(Debug, Clone)]
pub enum MockEntry {
    /// File content plus the revision at which it was last written.
    File(Vec<u8>, u64),
    Symlink(PathBuf),
    Dir(Vec<String>), // List of child names
}

#[derive(Debug, Default)]
struct MockState {
    entries: HashMap<PathBuf, MockEntry>,
    failing_reads: HashSet<PathBuf>,
    revision: u64,
    reads: usize,
}

/// In-memory filesystem for tests.
///
/// Every write bumps a global revision which doubles as the file's mtime, so
/// stamps change on each write even when the size doesn't.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    state: Arc<Mutex<MockState>>,
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(ErrorKind::NotFound, format!("not found: {:?}", path))
}

fn parent_of(path: &Path) -> Option<&Path> {
    match path.parent() {
        Some(p) if p.as_os_str().is_empty() => Some(Path::new(".")),
        other => other,
    }
}

impl MockFileSystem {
    pub fn new() -> Self {
        let fs = Self::default();
        // Ensure root exists
        fs.lock()
            .entries
            .insert(PathBuf::from("."), MockEntry::Dir(Vec::new()));
        fs
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let mut state = self.lock();
        Self::insert_file(&mut state, path.as_ref(), content.into());
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut state = self.lock();
        Self::ensure_dir_entry(&mut state.entries, path.as_ref());
    }

    /// Make every subsequent read of `path` fail with `PermissionDenied`.
    pub fn fail_reads_of(&self, path: impl AsRef<Path>) {
        self.lock().failing_reads.insert(path.as_ref().to_path_buf());
    }

    pub fn clear_read_failures(&self) {
        self.lock().failing_reads.clear();
    }

    /// Number of successful `read` calls so far.
    pub fn read_count(&self) -> usize {
        self.lock().reads
    }

    /// Whether `path` is stored as a symlink.
    pub fn is_symlink(&self, path: impl AsRef<Path>) -> bool {
        matches!(self.lock().entries.get(path.as_ref()), Some(MockEntry::Symlink(_)))
    }

    /// All files below `root` (symlinks resolved) keyed by `/`-separated
    /// relative path.
    pub fn snapshot(&self, root: impl AsRef<Path>) -> BTreeMap<String, String> {
        let root = root.as_ref();
        let state = self.lock();
        let mut out = BTreeMap::new();
        for path in state.entries.keys() {
            let Ok(rel) = path.strip_prefix(root) else {
                continue;
            };
            if rel.as_os_str().is_empty() {
                continue;
            }
            if let Ok(content) = Self::resolve_file(&state, path) {
                out.insert(
                    rel.to_string_lossy().replace('\\', "/"),
                    String::from_utf8_lossy(&content).into_owned(),
                );
            }
        }
        out
    }

    fn insert_file(state: &mut MockState, path: &Path, content: Vec<u8>) {
        state.revision += 1;
        let revision = state.revision;
        Self::insert_entry(state, path, MockEntry::File(content, revision));
    }

    fn insert_entry(state: &mut MockState, path: &Path, entry: MockEntry) {
        state.entries.insert(path.to_path_buf(), entry);

        // Ensure parent directories exist implicitly for simplicity in this mock
        if let Some(parent) = parent_of(path) {
            Self::ensure_dir_entry(&mut state.entries, parent);
            Self::link_child(&mut state.entries, parent, path);
        }
    }

    fn link_child(entries: &mut HashMap<PathBuf, MockEntry>, parent: &Path, path: &Path) {
        if let Some(MockEntry::Dir(children)) = entries.get_mut(parent) {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if !children.iter().any(|c| c == name) {
                    children.push(name.to_string());
                }
            }
        }
    }

    fn unlink_child(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
        let Some(parent) = parent_of(path) else {
            return;
        };
        if let Some(MockEntry::Dir(children)) = entries.get_mut(parent) {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                children.retain(|c| c != name);
            }
        }
    }

    fn ensure_dir_entry(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
        if entries.contains_key(path) {
            return;
        }
        entries.insert(path.to_path_buf(), MockEntry::Dir(Vec::new()));
        if let Some(parent) = parent_of(path) {
            if parent != path {
                // Avoid infinite loop at root
                Self::ensure_dir_entry(entries, parent);
                Self::link_child(entries, parent, path);
            }
        }
    }

    /// Refuse to put a file where a directory is, or below a file, the way a
    /// real filesystem would.
    fn check_placement(state: &MockState, path: &Path) -> io::Result<()> {
        if let Some(MockEntry::Dir(_)) = state.entries.get(path) {
            return Err(io::Error::new(
                ErrorKind::IsADirectory,
                format!("is a directory: {:?}", path),
            ));
        }
        for ancestor in path.ancestors().skip(1) {
            if let Some(MockEntry::File(..) | MockEntry::Symlink(_)) = state.entries.get(ancestor) {
                return Err(io::Error::new(
                    ErrorKind::NotADirectory,
                    format!("not a directory: {:?}", ancestor),
                ));
            }
        }
        Ok(())
    }

    fn resolve_file(state: &MockState, path: &Path) -> io::Result<Vec<u8>> {
        match state.entries.get(path) {
            Some(MockEntry::File(content, _)) => Ok(content.clone()),
            Some(MockEntry::Symlink(target)) => Self::resolve_file(state, target),
            Some(MockEntry::Dir(_)) => Err(io::Error::new(
                ErrorKind::Other,
                format!("is a directory: {:?}", path),
            )),
            None => Err(not_found(path)),
        }
    }
}

impl FileSystem for MockFileSystem {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        let mut state = self.lock();
        if state.failing_reads.contains(path) {
            return Err(io::Error::new(
                ErrorKind::PermissionDenied,
                format!("permission denied: {:?}", path),
            ));
        }
        let content = Self::resolve_file(&state, path)?;
        state.reads += 1;
        Ok(content)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let mut state = self.lock();
        Self::check_placement(&state, path)?;
        Self::insert_file(&mut state, path, contents.to_vec());
        Ok(())
    }

    fn symlink(&self, target: &Path, link: &Path) -> io::Result<()> {
        let mut state = self.lock();
        Self::check_placement(&state, link)?;
        Self::insert_entry(&mut state, link, MockEntry::Symlink(target.to_path_buf()));
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        let mut state = self.lock();
        match state.entries.get(path) {
            Some(MockEntry::Dir(_)) => Err(io::Error::new(
                ErrorKind::Other,
                format!("is a directory: {:?}", path),
            )),
            Some(_) => {
                state.entries.remove(path);
                Self::unlink_child(&mut state.entries, path);
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        let mut state = self.lock();
        state.entries.retain(|p, _| !p.starts_with(path));
        Self::unlink_child(&mut state.entries, path);
        Ok(())
    }

    fn remove_dir_if_empty(&self, path: &Path) -> io::Result<bool> {
        let mut state = self.lock();
        match state.entries.get(path) {
            Some(MockEntry::Dir(children)) if children.is_empty() => {
                state.entries.remove(path);
                Self::unlink_child(&mut state.entries, path);
                Ok(true)
            }
            Some(MockEntry::Dir(_)) => Ok(false),
            _ => Err(not_found(path)),
        }
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        self.add_dir(path);
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.lock().entries.contains_key(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        let state = self.lock();
        Self::resolve_file(&state, path).is_ok()
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.lock().entries.get(path), Some(MockEntry::Dir(_)))
    }

    fn stat(&self, path: &Path) -> io::Result<FileStamp> {
        let state = self.lock();
        let mut current = path.to_path_buf();
        loop {
            match state.entries.get(&current) {
                Some(MockEntry::File(content, revision)) => {
                    return Ok(FileStamp {
                        len: content.len() as u64,
                        modified: Some(SystemTime::UNIX_EPOCH + Duration::from_nanos(*revision)),
                    });
                }
                Some(MockEntry::Symlink(target)) => current = target.clone(),
                Some(MockEntry::Dir(_)) => {
                    return Ok(FileStamp {
                        len: 0,
                        modified: None,
                    });
                }
                None => return Err(not_found(path)),
            }
        }
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        // In mock, we just return the path as is, assuming absolute paths are used in tests
        Ok(path.to_path_buf())
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let state = self.lock();
        match state.entries.get(path) {
            Some(MockEntry::Dir(children)) => {
                Ok(children.iter().map(|name| path.join(name)).collect())
            }
            _ => Err(not_found(path)),
        }
    }
}
