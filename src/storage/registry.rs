//! List registry
//!
//! In-memory index of every list file in the lists directory. Entries are
//! derived by scanning: each file is parsed only to compute its total, and
//! its timestamps come from the file's modification time. After creation an
//! entry changes only through [`ListRegistry::record_save`].

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::file_io::remove_file_if_exists;
use crate::codec::detect_path;
use crate::error::ShoplistResult;
use crate::models::{total_of, ListId, ListMetadata, Money, SortOrder};

/// Minimum digits of the `_<epochMillis>` suffix in a list file name
const MILLIS_SUFFIX_MIN_DIGITS: usize = 10;

/// Registry of known lists, held in presentation order
#[derive(Debug)]
pub struct ListRegistry {
    dir: PathBuf,
    entries: Vec<ListMetadata>,
    sort_order: SortOrder,
}

impl ListRegistry {
    /// Create an empty registry over `dir`
    pub fn new(dir: PathBuf, sort_order: SortOrder) -> Self {
        Self {
            dir,
            entries: Vec::new(),
            sort_order,
        }
    }

    /// Directory holding the list files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Entries in their current order
    pub fn entries(&self) -> &[ListMetadata] {
        &self.entries
    }

    /// Current sort order
    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    /// Number of registered lists
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get an entry by id
    pub fn get(&self, id: ListId) -> Option<&ListMetadata> {
        self.entries.iter().find(|m| m.id == id)
    }

    /// Find an entry by id, then by name (case-insensitive), then by file name
    pub fn find(&self, identifier: &str) -> Option<&ListMetadata> {
        let identifier = identifier.trim();
        self.entries
            .iter()
            .find(|m| m.id.matches(identifier))
            .or_else(|| {
                self.entries
                    .iter()
                    .find(|m| m.name.eq_ignore_ascii_case(identifier))
            })
            .or_else(|| {
                self.entries
                    .iter()
                    .find(|m| m.file_name() == Some(identifier))
            })
    }

    /// Replace all entries with a fresh scan, then sort
    ///
    /// An entry whose storage path was already registered keeps its id.
    pub fn replace_scanned(&mut self, mut scanned: Vec<ListMetadata>) {
        for entry in &mut scanned {
            if let Some(known) = self
                .entries
                .iter()
                .find(|m| m.storage_path == entry.storage_path)
            {
                entry.id = known.id;
            }
        }

        self.entries = scanned;
        self.sort();
    }

    /// Rescan the directory
    pub fn refresh(&mut self) {
        let scanned = scan_directory(&self.dir);
        self.replace_scanned(scanned);
    }

    /// Append a newly created list without reordering
    pub fn register(&mut self, metadata: ListMetadata) {
        self.entries.push(metadata);
    }

    /// Drop an entry without touching its file
    pub fn unregister(&mut self, id: ListId) -> Option<ListMetadata> {
        let index = self.entries.iter().position(|m| m.id == id)?;
        Some(self.entries.remove(index))
    }

    /// Write back the total and modification time after a save
    ///
    /// Returns `false` if the id is unknown.
    pub fn record_save(&mut self, id: ListId, total: Money, now: DateTime<Utc>) -> bool {
        match self.entries.iter_mut().find(|m| m.id == id) {
            Some(entry) => {
                entry.total_amount = total;
                entry.last_modified_at = now;
                true
            }
            None => false,
        }
    }

    /// Change the sort order and re-sort
    pub fn change_sort_order(&mut self, order: SortOrder) {
        self.sort_order = order;
        self.sort();
    }

    /// Stable sort by the current order, every key descending
    fn sort(&mut self) {
        match self.sort_order {
            SortOrder::LastModified => self
                .entries
                .sort_by(|a, b| b.last_modified_at.cmp(&a.last_modified_at)),
            SortOrder::CreatedDate => self
                .entries
                .sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            SortOrder::TotalAmount => self
                .entries
                .sort_by(|a, b| b.total_amount.cmp(&a.total_amount)),
        }
    }
}

/// Pick a path for a new list in `dir`, `<name>_<epochMillis>.txt`
///
/// Bumps the millisecond stamp while the path exists on disk or is one of
/// `registered`. Touches the filesystem.
pub fn allocate_path(
    dir: &Path,
    name: &str,
    now: DateTime<Utc>,
    registered: &[PathBuf],
) -> PathBuf {
    let stem = file_name_component(name);
    let mut millis = now.timestamp_millis();
    loop {
        let path = dir.join(format!("{}_{}.txt", stem, millis));
        if !path.exists() && !registered.contains(&path) {
            return path;
        }
        millis += 1;
    }
}

/// Remove a list's backing file
///
/// A file that is already gone counts as removed.
pub fn remove_list_file(path: &Path) -> ShoplistResult<()> {
    if !remove_file_if_exists(path)? {
        debug!(path = %path.display(), "Backing file was already gone");
    }
    Ok(())
}

/// Scan a directory for list files
///
/// Files of unknown format and files that fail to read or parse are left
/// out. An unreadable directory yields an empty scan.
pub fn scan_directory(dir: &Path) -> Vec<ListMetadata> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "Failed to scan lists directory");
            return Vec::new();
        }
    };

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    paths.sort();

    paths.iter().filter_map(|path| scan_file(path)).collect()
}

/// Build the registry entry for one file
fn scan_file(path: &Path) -> Option<ListMetadata> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Skipping unreadable list file");
            return None;
        }
    };

    let Some(kind) = detect_path(path, &bytes) else {
        debug!(path = %path.display(), "Skipping file of unsupported format");
        return None;
    };

    let items = match kind.parse(&bytes) {
        Ok(items) => items,
        Err(e) => {
            warn!(path = %path.display(), format = %kind, error = %e, "Skipping unparseable list file");
            return None;
        }
    };

    let modified = fs::metadata(path)
        .and_then(|m| m.modified())
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now());

    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();

    Some(ListMetadata {
        id: ListId::new(),
        name: display_name(stem),
        created_at: modified,
        last_modified_at: modified,
        total_amount: total_of(&items),
        storage_path: path.to_path_buf(),
    })
}

/// Display name for a file stem: drops a trailing `_<epochMillis>`
pub fn display_name(stem: &str) -> String {
    match stem.rsplit_once('_') {
        Some((base, suffix))
            if !base.is_empty()
                && suffix.len() >= MILLIS_SUFFIX_MIN_DIGITS
                && suffix.bytes().all(|b| b.is_ascii_digit()) =>
        {
            base.to_string()
        }
        _ => stem.to_string(),
    }
}

/// Make a list name usable inside a file name
pub(crate) fn file_name_component(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        "List".to_string()
    } else {
        cleaned
    }
}
