//! List store
//!
//! Owns the registry and the single active working set, and mediates every
//! mutation. The state mutex is held across file writes, so two writers
//! never touch the same list file at once. Snapshots of the registry and of
//! the working set are published on `watch` channels after every change.
//!
//! Lock order is the auto-save slot first, then the state. The auto-save
//! task only ever takes the state lock, so whoever holds the slot can wait
//! for the task to finish.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local, Utc};
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use super::autosave::AutoSave;
use crate::codec::{detect_path, ExportFormat};
use crate::config::{Settings, ShoplistPaths};
use crate::error::{ShoplistError, ShoplistResult};
use crate::models::{
    parse_price, parse_quantity, Item, ItemId, ListId, ListMetadata, Money, SortOrder, WorkingSet,
};
use crate::storage::registry::file_name_component;
use crate::storage::{
    allocate_path, display_name, read_bytes, remove_list_file, scan_directory, write_atomic,
    ListRegistry,
};

struct StoreState {
    registry: ListRegistry,
    working: Option<WorkingSet>,
}

struct Shared {
    state: Mutex<StoreState>,
    lists_tx: watch::Sender<Vec<ListMetadata>>,
    working_tx: watch::Sender<Option<WorkingSet>>,
}

impl Shared {
    fn publish_lists(&self, registry: &ListRegistry) {
        self.lists_tx.send_replace(registry.entries().to_vec());
    }

    fn publish_working(&self, working: Option<&WorkingSet>) {
        self.working_tx.send_replace(working.cloned());
    }
}

/// Run blocking file work off the async workers
async fn run_blocking<T, F>(work: F) -> ShoplistResult<T>
where
    F: FnOnce() -> ShoplistResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ShoplistError::Storage(format!("Background I/O task failed: {}", e)))?
}

/// Read and parse any supported list file
fn read_items(path: &Path) -> ShoplistResult<Vec<Item>> {
    let bytes = read_bytes(path)?;
    let kind = detect_path(path, &bytes)
        .ok_or_else(|| ShoplistError::UnsupportedFormat(path.display().to_string()))?;
    kind.parse(&bytes)
}

/// Write the active working set to its backing file and update its entry
///
/// Does nothing when no list is open.
async fn persist(shared: &Shared, state: &mut StoreState) -> ShoplistResult<()> {
    let Some(working) = state.working.as_ref() else {
        return Ok(());
    };

    let list_id = working.list_id;
    let meta = state
        .registry
        .get(list_id)
        .cloned()
        .ok_or_else(|| ShoplistError::list_not_found(list_id.to_string()))?;
    let items = working.items.clone();
    let total = working.total();
    let now = Utc::now();
    let format = ExportFormat::for_storage_path(&meta.storage_path);

    let written = run_blocking(move || {
        let bytes = format.serialize(&items, &meta, now)?;
        write_atomic(&meta.storage_path, &bytes)
    })
    .await;

    if let Err(e) = written {
        warn!(list = %list_id, error = %e, "Failed to save list");
        return Err(e);
    }

    state.registry.record_save(list_id, total, now);
    shared.publish_lists(&state.registry);
    debug!(list = %list_id, %total, "Saved list");
    Ok(())
}

/// Name given to a list created without one
fn default_list_name(now: DateTime<Utc>) -> String {
    format!(
        "Shopping_List_{}",
        now.with_timezone(&Local).format("%Y-%m-%d_%H-%M-%S")
    )
}

/// `<name>_<yyyyMMdd_HHmmss>.<ext>`
fn export_file_name(name: &str, format: ExportFormat, now: DateTime<Utc>) -> String {
    format!(
        "{}_{}.{}",
        file_name_component(name),
        now.with_timezone(&Local).format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}

/// The single owner of list state
pub struct ListStore {
    shared: Arc<Shared>,
    autosave: Mutex<Option<AutoSave>>,
    export_dir: PathBuf,
    autosave_interval: Duration,
}

impl ListStore {
    /// Open the store over a storage root and scan its lists directory
    pub async fn open(paths: &ShoplistPaths, settings: &Settings) -> ShoplistResult<Self> {
        let dirs = paths.clone();
        run_blocking(move || dirs.ensure_directories()).await?;

        let lists_dir = paths.lists_dir();
        let mut registry = ListRegistry::new(lists_dir.clone(), settings.sort_order);
        let scanned = run_blocking(move || Ok(scan_directory(&lists_dir))).await?;
        registry.replace_scanned(scanned);

        info!(
            lists = registry.len(),
            dir = %registry.dir().display(),
            "Opened list store"
        );

        let (lists_tx, _) = watch::channel(registry.entries().to_vec());
        let (working_tx, _) = watch::channel(None);

        Ok(Self {
            shared: Arc::new(Shared {
                state: Mutex::new(StoreState {
                    registry,
                    working: None,
                }),
                lists_tx,
                working_tx,
            }),
            autosave: Mutex::new(None),
            export_dir: paths.export_dir(),
            autosave_interval: settings.autosave_interval(),
        })
    }

    /// Directory export artifacts are written to
    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    // ========================================================================
    // Observable state
    // ========================================================================

    /// Current registry snapshot, in presentation order
    pub fn lists(&self) -> Vec<ListMetadata> {
        self.shared.lists_tx.borrow().clone()
    }

    /// Current working set snapshot
    pub fn working_set(&self) -> Option<WorkingSet> {
        self.shared.working_tx.borrow().clone()
    }

    /// Receive a registry snapshot after every scan, sort, save or delete
    pub fn subscribe_lists(&self) -> watch::Receiver<Vec<ListMetadata>> {
        self.shared.lists_tx.subscribe()
    }

    /// Receive a working set snapshot after every item change or list switch
    pub fn subscribe_working_set(&self) -> watch::Receiver<Option<WorkingSet>> {
        self.shared.working_tx.subscribe()
    }

    // ========================================================================
    // Registry
    // ========================================================================

    /// Rescan the lists directory
    ///
    /// The open list stays bound to its entry as long as its file is there.
    pub async fn refresh(&self) -> Vec<ListMetadata> {
        let mut state = self.shared.state.lock().await;
        let dir = state.registry.dir().to_path_buf();

        match run_blocking(move || Ok(scan_directory(&dir))).await {
            Ok(scanned) => {
                state.registry.replace_scanned(scanned);
                self.shared.publish_lists(&state.registry);
            }
            Err(e) => warn!(error = %e, "Failed to rescan lists"),
        }

        state.registry.entries().to_vec()
    }

    /// Get a list by id
    pub async fn get(&self, id: ListId) -> Option<ListMetadata> {
        self.shared.state.lock().await.registry.get(id).cloned()
    }

    /// Find a list by id, name or file name
    pub async fn find(&self, identifier: &str) -> Option<ListMetadata> {
        self.shared
            .state
            .lock()
            .await
            .registry
            .find(identifier)
            .cloned()
    }

    /// Metadata of the open list
    pub async fn active_list(&self) -> Option<ListMetadata> {
        let state = self.shared.state.lock().await;
        let id = state.working.as_ref()?.list_id;
        state.registry.get(id).cloned()
    }

    /// Current sort order
    pub async fn sort_order(&self) -> SortOrder {
        self.shared.state.lock().await.registry.sort_order()
    }

    /// Re-sort the registry
    pub async fn change_sort_order(&self, order: SortOrder) {
        let mut state = self.shared.state.lock().await;
        state.registry.change_sort_order(order);
        self.shared.publish_lists(&state.registry);
        debug!(%order, "Changed sort order");
    }

    /// Delete a list's file and entry
    ///
    /// Deleting the open list stops auto-save and clears the working set.
    /// If the file cannot be removed nothing changes and the error is
    /// returned.
    pub async fn delete_list(&self, id: ListId) -> ShoplistResult<ListMetadata> {
        let mut slot = self.autosave.lock().await;

        let is_active = {
            let state = self.shared.state.lock().await;
            state.working.as_ref().map(|w| w.list_id) == Some(id)
        };

        let stopped = if is_active { slot.take() } else { None };
        let had_task = stopped.is_some();
        if let Some(task) = stopped {
            task.stop().await;
        }

        let mut state = self.shared.state.lock().await;
        let removed = match state.registry.get(id) {
            Some(meta) => {
                let path = meta.storage_path.clone();
                run_blocking(move || remove_list_file(&path)).await
            }
            None => Err(ShoplistError::list_not_found(id.to_string())),
        };

        let deleted = removed.and_then(|()| {
            state
                .registry
                .unregister(id)
                .ok_or_else(|| ShoplistError::list_not_found(id.to_string()))
        });

        match deleted {
            Ok(meta) => {
                if is_active {
                    state.working = None;
                    self.shared.publish_working(None);
                }
                self.shared.publish_lists(&state.registry);
                info!(list = %id, name = %meta.name, "Deleted list");
                Ok(meta)
            }
            Err(e) => {
                warn!(list = %id, error = %e, "Failed to delete list");
                drop(state);
                if had_task {
                    *slot = Some(self.spawn_auto_save(id));
                }
                Err(e)
            }
        }
    }

    // ========================================================================
    // Opening lists
    // ========================================================================

    /// Create an empty list, open it and write its file right away
    ///
    /// Without a name, one is generated from the current time.
    pub async fn create_new_list(&self, name: Option<&str>) -> ShoplistResult<ListMetadata> {
        let now = Utc::now();
        let name = match name.map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => default_list_name(now),
        };

        self.open_new(name, Vec::new(), now).await
    }

    /// Open a registered list, replacing the working set wholesale
    ///
    /// Unsaved changes to the previous list are discarded. If the file
    /// cannot be read, the previous list stays open.
    pub async fn load_list(&self, id: ListId) -> ShoplistResult<WorkingSet> {
        let mut slot = self.autosave.lock().await;

        let meta = self
            .get(id)
            .await
            .ok_or_else(|| ShoplistError::list_not_found(id.to_string()))?;

        let path = meta.storage_path.clone();
        let items = match run_blocking(move || read_items(&path)).await {
            Ok(items) => items,
            Err(e) => {
                warn!(
                    list = %id,
                    path = %meta.storage_path.display(),
                    error = %e,
                    "Failed to load list"
                );
                return Err(e);
            }
        };

        if let Some(task) = slot.take() {
            task.stop().await;
        }

        let working = WorkingSet::new(id, items);
        {
            let mut state = self.shared.state.lock().await;
            state.working = Some(working.clone());
            self.shared.publish_working(state.working.as_ref());
        }

        *slot = Some(self.spawn_auto_save(id));
        info!(list = %id, items = working.items.len(), "Loaded list");
        Ok(working)
    }

    /// Import an external file as a new list named after the file
    ///
    /// Unsupported or unreadable files abort the import; no list is created.
    pub async fn import_file(&self, path: &Path) -> ShoplistResult<ListMetadata> {
        let source = path.to_path_buf();
        let items = match run_blocking(move || read_items(&source)).await {
            Ok(items) => items,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Import abandoned");
                return Err(ShoplistError::Import(format!("{}: {}", path.display(), e)));
            }
        };

        let now = Utc::now();
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .map(display_name)
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| default_list_name(now));

        info!(path = %path.display(), items = items.len(), "Importing list");
        self.open_new(name, items, now).await
    }

    /// Register, open and persist a new list
    async fn open_new(
        &self,
        name: String,
        items: Vec<Item>,
        now: DateTime<Utc>,
    ) -> ShoplistResult<ListMetadata> {
        let mut slot = self.autosave.lock().await;
        let previous_task = slot.take();
        let previous_list = previous_task.as_ref().map(AutoSave::list_id);
        if let Some(task) = previous_task {
            task.stop().await;
        }

        let created = async {
            let mut state = self.shared.state.lock().await;
            let dir = state.registry.dir().to_path_buf();
            let registered: Vec<PathBuf> = state
                .registry
                .entries()
                .iter()
                .map(|m| m.storage_path.clone())
                .collect();
            let stem = name.clone();
            let path = match run_blocking(move || Ok(allocate_path(&dir, &stem, now, &registered)))
                .await
            {
                Ok(path) => path,
                Err(e) => return Err(e),
            };

            let meta = ListMetadata::new(name, path, now);
            let list_id = meta.id;

            state.registry.register(meta);
            let previous = state.working.replace(WorkingSet::new(list_id, items));

            match persist(&self.shared, &mut state).await {
                Ok(()) => {
                    self.shared.publish_working(state.working.as_ref());
                    state
                        .registry
                        .get(list_id)
                        .cloned()
                        .ok_or_else(|| ShoplistError::list_not_found(list_id.to_string()))
                }
                Err(e) => {
                    state.registry.unregister(list_id);
                    state.working = previous;
                    self.shared.publish_lists(&state.registry);
                    Err(e)
                }
            }
        }
        .await;

        match created {
            Ok(meta) => {
                info!(list = %meta.id, name = %meta.name, "Created list");
                *slot = Some(self.spawn_auto_save(meta.id));
                Ok(meta)
            }
            Err(e) => {
                if let Some(id) = previous_list {
                    *slot = Some(self.spawn_auto_save(id));
                }
                Err(e)
            }
        }
    }

    // ========================================================================
    // Editing the working set
    // ========================================================================

    /// Apply an edit to the working set, publish it and persist
    ///
    /// An edit that returns an error leaves the working set untouched and
    /// writes nothing. If the write fails the edit stays in memory and the
    /// next save retries it.
    async fn edit_working<T, F>(&self, edit: F) -> ShoplistResult<T>
    where
        F: FnOnce(&mut WorkingSet) -> ShoplistResult<T> + Send,
    {
        let mut state = self.shared.state.lock().await;
        let working = state.working.as_mut().ok_or(ShoplistError::NoActiveList)?;

        let value = edit(working)?;
        self.shared.publish_working(state.working.as_ref());

        persist(&self.shared, &mut state).await?;
        Ok(value)
    }

    /// Add an item with the next free id
    ///
    /// A `Storage` error means the item was added in memory but not yet
    /// written; the next save retries the write.
    pub async fn add_item(
        &self,
        name: &str,
        quantity: i64,
        unit_price: Money,
    ) -> ShoplistResult<Item> {
        let name = name.trim().to_string();
        self.edit_working(move |working| {
            let item = Item::new(working.next_item_id(), name, quantity, unit_price);
            item.validate()
                .map_err(|e| ShoplistError::Validation(e.to_string()))?;
            working.items.push(item.clone());
            Ok(item)
        })
        .await
    }

    /// Add an item from raw text fields
    ///
    /// Quantity and price that do not parse become zero.
    pub async fn add_item_raw(
        &self,
        name: &str,
        quantity: &str,
        price: &str,
    ) -> ShoplistResult<Item> {
        self.add_item(name, parse_quantity(quantity), parse_price(price))
            .await
    }

    /// Remove the item with `id`
    ///
    /// A `Storage` error means the item is gone from memory but the file
    /// still holds it until the next save.
    pub async fn remove_item(&self, id: ItemId) -> ShoplistResult<Item> {
        self.edit_working(move |working| {
            let index = working
                .position(id)
                .ok_or_else(|| ShoplistError::item_not_found(id.to_string()))?;
            Ok(working.items.remove(index))
        })
        .await
    }

    /// Replace the item with the same id
    ///
    /// A `Storage` error means the change was applied in memory but not yet
    /// written; the next save retries the write.
    pub async fn update_item(&self, item: Item) -> ShoplistResult<Item> {
        item.validate()
            .map_err(|e| ShoplistError::Validation(e.to_string()))?;

        self.edit_working(move |working| {
            let index = working
                .position(item.id)
                .ok_or_else(|| ShoplistError::item_not_found(item.id.to_string()))?;
            working.items[index] = item.clone();
            Ok(item)
        })
        .await
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Write the open list to its file
    ///
    /// The codec follows the file's extension: lists created here are `.txt`
    /// and go through the standard text codec, while a scanned `.csv` or
    /// `.xlsx` list is rewritten in its own format. Does nothing when no
    /// list is open.
    pub async fn save(&self) -> ShoplistResult<()> {
        let mut state = self.shared.state.lock().await;
        persist(&self.shared, &mut state).await
    }

    /// Export the open list to the export directory
    ///
    /// Returns `None` without writing anything when no list is open or the
    /// open list has no items. The list's own file and entry are untouched.
    pub async fn export(&self, format: ExportFormat) -> ShoplistResult<Option<PathBuf>> {
        let state = self.shared.state.lock().await;

        let Some(working) = state.working.as_ref() else {
            debug!("Nothing to export: no list is open");
            return Ok(None);
        };
        if working.items.is_empty() {
            debug!(list = %working.list_id, "Nothing to export: list is empty");
            return Ok(None);
        }

        let meta = state
            .registry
            .get(working.list_id)
            .cloned()
            .ok_or_else(|| ShoplistError::list_not_found(working.list_id.to_string()))?;
        let items = working.items.clone();
        let now = Utc::now();

        let path = self
            .export_dir
            .join(export_file_name(&meta.name, format, now));
        let target = path.clone();

        run_blocking(move || {
            let bytes = format.serialize(&items, &meta, now)?;
            write_atomic(&target, &bytes).map_err(|e| ShoplistError::Export(e.to_string()))
        })
        .await?;

        info!(path = %path.display(), %format, "Exported list");
        Ok(Some(path))
    }

    // ========================================================================
    // Auto-save
    // ========================================================================

    fn spawn_auto_save(&self, list_id: ListId) -> AutoSave {
        let shared = Arc::clone(&self.shared);
        AutoSave::spawn(list_id, self.autosave_interval, move || {
            let shared = Arc::clone(&shared);
            async move {
                let mut state = shared.state.lock().await;
                persist(&shared, &mut state).await
            }
        })
    }

    /// Whether an auto-save task is running
    pub async fn is_auto_saving(&self) -> bool {
        self.autosave.lock().await.is_some()
    }

    /// Stop auto-save, waiting for a save in progress to finish
    pub async fn stop_auto_save(&self) {
        let mut slot = self.autosave.lock().await;
        if let Some(task) = slot.take() {
            task.stop().await;
        }
    }

    /// Stop auto-save and write the open list one last time
    pub async fn close(&self) -> ShoplistResult<()> {
        self.stop_auto_save().await;
        self.save().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    use crate::codec::FormatKind;
    use crate::models::total_of;

    async fn open_with(dir: &TempDir, settings: Settings) -> ListStore {
        let paths = ShoplistPaths::with_base_dir(dir.path().to_path_buf());
        ListStore::open(&paths, &settings).await.unwrap()
    }

    async fn open_store(dir: &TempDir) -> ListStore {
        open_with(dir, Settings::default()).await
    }

    fn fast_autosave() -> Settings {
        Settings {
            autosave_interval_ms: 30,
            ..Settings::default()
        }
    }

    fn price(s: &str) -> Money {
        Money::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_groceries_scenario() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;

        let meta = store.create_new_list(Some("Groceries")).await.unwrap();
        store.add_item("Milk", 2, price("50.0")).await.unwrap();
        store.add_item("Bread", 1, price("40.0")).await.unwrap();

        let working = store.working_set().unwrap();
        assert_eq!(working.total(), Money::new(140, 0));
        assert_eq!(store.get(meta.id).await.unwrap().total_amount, Money::new(140, 0));

        let exported = store.export(ExportFormat::Csv).await.unwrap().unwrap();
        assert!(exported.starts_with(store.export_dir()));
        let file_name = exported.file_name().unwrap().to_str().unwrap();
        assert!(file_name.starts_with("Groceries_"));
        assert!(file_name.ends_with(".csv"));

        let items = FormatKind::Csv.parse(&fs::read(&exported).unwrap()).unwrap();
        let names: Vec<_> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Milk", "Bread"]);
        assert_eq!(total_of(&items), Money::new(140, 0));
    }

    #[tokio::test]
    async fn test_new_list_is_written_immediately() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;

        let meta = store.create_new_list(None).await.unwrap();
        assert!(meta.name.starts_with("Shopping_List_"));
        assert!(meta.storage_path.exists());
        assert!(meta.storage_path.starts_with(dir.path().join("Shopping Lists")));
        assert_eq!(meta.total_amount, Money::zero());
        assert!(store.is_auto_saving().await);

        assert_eq!(store.lists().len(), 1);
        assert_eq!(store.working_set().unwrap().list_id, meta.id);
    }

    #[tokio::test]
    async fn test_reopening_store_finds_saved_lists() {
        let dir = TempDir::new().unwrap();
        {
            let store = open_store(&dir).await;
            store.create_new_list(Some("Groceries")).await.unwrap();
            store.add_item("Milk", 2, price("50.0")).await.unwrap();
            store.close().await.unwrap();
        }

        let store = open_store(&dir).await;
        let lists = store.lists();
        assert_eq!(lists.len(), 1);
        assert_eq!(lists[0].name, "Groceries");
        assert_eq!(lists[0].total_amount, Money::new(100, 0));

        let working = store.load_list(lists[0].id).await.unwrap();
        assert_eq!(working.items, vec![Item::new(0, "Milk", 2, Money::new(50, 0))]);
    }

    #[tokio::test]
    async fn test_export_needs_items() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;

        assert_eq!(store.export(ExportFormat::Text).await.unwrap(), None);

        store.create_new_list(Some("Empty")).await.unwrap();
        assert_eq!(store.export(ExportFormat::Spreadsheet).await.unwrap(), None);
        assert_eq!(fs::read_dir(store.export_dir()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_export_leaves_list_untouched() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;
        let meta = store.create_new_list(Some("Groceries")).await.unwrap();
        store.add_item("Milk", 2, price("50.0")).await.unwrap();

        let before_entry = store.get(meta.id).await.unwrap();
        let before_file = fs::read(&meta.storage_path).unwrap();

        let path = store.export(ExportFormat::Spreadsheet).await.unwrap().unwrap();
        assert!(path.extension().is_some_and(|ext| ext == "xlsx"));

        assert_eq!(store.get(meta.id).await.unwrap(), before_entry);
        assert_eq!(fs::read(&meta.storage_path).unwrap(), before_file);
    }

    #[tokio::test]
    async fn test_item_ids_are_max_plus_one() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;
        store.create_new_list(Some("Ids")).await.unwrap();

        for name in ["a", "b", "c"] {
            store.add_item(name, 1, Money::zero()).await.unwrap();
        }
        store.remove_item(1).await.unwrap();

        let added = store.add_item("d", 1, Money::zero()).await.unwrap();
        assert_eq!(added.id, 3);

        let ids: Vec<_> = store.working_set().unwrap().items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![0, 2, 3]);
    }

    #[tokio::test]
    async fn test_add_item_raw_is_lenient() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;
        store.create_new_list(Some("Raw")).await.unwrap();

        let item = store.add_item_raw("Milk", "3", "abc").await.unwrap();
        assert_eq!(item, Item::new(0, "Milk", 3, Money::zero()));
    }

    #[tokio::test]
    async fn test_invalid_items_are_rejected_without_writing() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;
        let meta = store.create_new_list(Some("Strict")).await.unwrap();
        let before = fs::read(&meta.storage_path).unwrap();

        assert!(store.add_item("  ", 1, Money::zero()).await.unwrap_err().is_validation());
        assert!(store.add_item("Milk", -1, Money::zero()).await.unwrap_err().is_validation());
        assert!(store
            .add_item("Milk", 1, Money::new(-5, 0))
            .await
            .unwrap_err()
            .is_validation());

        assert!(store.working_set().unwrap().items.is_empty());
        assert_eq!(fs::read(&meta.storage_path).unwrap(), before);
    }

    #[tokio::test]
    async fn test_unknown_item_ids() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;
        store.create_new_list(Some("Unknown")).await.unwrap();
        store.add_item("Milk", 1, Money::zero()).await.unwrap();

        assert!(store.remove_item(42).await.unwrap_err().is_not_found());
        let ghost = Item::new(42, "Ghost", 1, Money::zero());
        assert!(store.update_item(ghost).await.unwrap_err().is_not_found());
        assert_eq!(store.working_set().unwrap().items.len(), 1);
    }

    #[tokio::test]
    async fn test_update_item_recomputes_total() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;
        let meta = store.create_new_list(Some("Update")).await.unwrap();
        let mut milk = store.add_item("Milk", 1, price("50")).await.unwrap();

        milk.quantity = 4;
        store.update_item(milk).await.unwrap();

        assert_eq!(store.get(meta.id).await.unwrap().total_amount, Money::new(200, 0));
        let on_disk = FormatKind::PlainTextStandard
            .parse(&fs::read(&meta.storage_path).unwrap())
            .unwrap();
        assert_eq!(on_disk[0].quantity, 4);
    }

    #[tokio::test]
    async fn test_edits_need_an_open_list() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;

        let err = store.add_item("Milk", 1, Money::zero()).await.unwrap_err();
        assert!(matches!(err, ShoplistError::NoActiveList));
        assert!(store.save().await.is_ok());
    }

    #[tokio::test]
    async fn test_save_is_stable_apart_from_timestamp() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;
        let meta = store.create_new_list(Some("Stable")).await.unwrap();
        store.add_item("Milk", 2, price("50.0")).await.unwrap();

        let without_stamp = |bytes: Vec<u8>| -> Vec<String> {
            String::from_utf8(bytes)
                .unwrap()
                .lines()
                .filter(|line| !line.starts_with("# Exported"))
                .map(String::from)
                .collect()
        };

        store.save().await.unwrap();
        let first = without_stamp(fs::read(&meta.storage_path).unwrap());
        store.save().await.unwrap();
        let second = without_stamp(fs::read(&meta.storage_path).unwrap());
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_load_failure_keeps_previous_list() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;

        let other = store.create_new_list(Some("Other")).await.unwrap();
        let current = store.create_new_list(Some("Current")).await.unwrap();
        store.add_item("Milk", 1, Money::zero()).await.unwrap();

        fs::remove_file(&other.storage_path).unwrap();
        assert!(store.load_list(other.id).await.is_err());

        let working = store.working_set().unwrap();
        assert_eq!(working.list_id, current.id);
        assert_eq!(working.items.len(), 1);
        assert!(store.is_auto_saving().await);
    }

    #[tokio::test]
    async fn test_load_discards_unsaved_state() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;

        let first = store.create_new_list(Some("First")).await.unwrap();
        store.add_item("Milk", 1, Money::zero()).await.unwrap();
        store.create_new_list(Some("Second")).await.unwrap();

        let working = store.load_list(first.id).await.unwrap();
        assert_eq!(working.list_id, first.id);
        assert_eq!(working.items.len(), 1);
        assert_eq!(store.working_set(), Some(working));
    }

    #[tokio::test]
    async fn test_import_creates_list() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;

        let source = dir.path().join("Party.csv");
        fs::write(&source, "Item,Price,Quantity\nCake,300,1\nSoda,60,4\n").unwrap();

        let meta = store.import_file(&source).await.unwrap();
        assert_eq!(meta.name, "Party");
        assert_eq!(meta.total_amount, Money::new(540, 0));
        assert_eq!(
            meta.storage_path.extension().and_then(|e| e.to_str()),
            Some("txt")
        );

        let working = store.working_set().unwrap();
        assert_eq!(working.list_id, meta.id);
        assert_eq!(working.items[1], Item::new(1, "Soda", 4, Money::new(60, 0)));
    }

    #[tokio::test]
    async fn test_failed_import_creates_nothing() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;

        let unsupported = dir.path().join("list.json");
        fs::write(&unsupported, "{}").unwrap();
        let broken = dir.path().join("list.xlsx");
        fs::write(&broken, "not a workbook").unwrap();

        for path in [unsupported, broken, dir.path().join("missing.txt")] {
            let err = store.import_file(&path).await.unwrap_err();
            assert!(matches!(err, ShoplistError::Import(_)), "{}", err);
        }

        assert!(store.lists().is_empty());
        assert!(store.working_set().is_none());
        assert_eq!(fs::read_dir(dir.path().join("Shopping Lists")).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_delete_active_list() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;
        let meta = store.create_new_list(Some("Doomed")).await.unwrap();

        store.delete_list(meta.id).await.unwrap();

        assert!(!meta.storage_path.exists());
        assert!(store.lists().is_empty());
        assert!(store.working_set().is_none());
        assert!(!store.is_auto_saving().await);
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_entry() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;
        let meta = store.create_new_list(Some("Locked")).await.unwrap();
        store.stop_auto_save().await;

        // A directory in place of the file cannot be removed as a file
        fs::remove_file(&meta.storage_path).unwrap();
        fs::create_dir(&meta.storage_path).unwrap();

        assert!(store.delete_list(meta.id).await.is_err());
        assert!(store.get(meta.id).await.is_some());
        assert_eq!(store.lists().len(), 1);
        assert!(store.working_set().is_some());
    }

    #[tokio::test]
    async fn test_sort_order_change_is_published() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;

        store.create_new_list(Some("Cheap")).await.unwrap();
        store.add_item("Gum", 1, price("10")).await.unwrap();
        store.create_new_list(Some("Dear")).await.unwrap();
        store.add_item("Cheese", 1, price("900")).await.unwrap();

        let mut rx = store.subscribe_lists();
        store.change_sort_order(SortOrder::TotalAmount).await;
        assert!(rx.has_changed().unwrap());

        let names: Vec<_> = rx.borrow_and_update().iter().map(|m| m.name.clone()).collect();
        assert_eq!(names, vec!["Dear", "Cheap"]);
        assert_eq!(store.sort_order().await, SortOrder::TotalAmount);
    }

    #[tokio::test]
    async fn test_working_set_is_published() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;
        let mut rx = store.subscribe_working_set();

        store.create_new_list(Some("Watched")).await.unwrap();
        store.add_item("Milk", 1, Money::zero()).await.unwrap();

        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().as_ref().unwrap().items.len(), 1);
    }

    #[tokio::test]
    async fn test_refresh_keeps_open_list_bound() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;
        let meta = store.create_new_list(Some("Bound")).await.unwrap();

        fs::write(dir.path().join("Shopping Lists").join("notes.md"), "x").unwrap();
        let lists = store.refresh().await;
        assert_eq!(lists.len(), 1);
        assert_eq!(lists[0].id, meta.id);

        store.add_item("Milk", 1, price("5")).await.unwrap();
        assert_eq!(store.active_list().await.unwrap().total_amount, Money::new(5, 0));
    }

    #[tokio::test]
    async fn test_auto_save_rewrites_file() {
        let dir = TempDir::new().unwrap();
        let store = open_with(&dir, fast_autosave()).await;
        let meta = store.create_new_list(Some("Auto")).await.unwrap();
        store.add_item("Milk", 2, price("50.0")).await.unwrap();

        fs::remove_file(&meta.storage_path).unwrap();
        tokio::time::sleep(Duration::from_millis(250)).await;
        assert!(meta.storage_path.exists());

        fs::write(&meta.storage_path, "garbage").unwrap();
        tokio::time::sleep(Duration::from_millis(250)).await;

        let items = FormatKind::PlainTextStandard
            .parse(&fs::read(&meta.storage_path).unwrap())
            .unwrap();
        assert_eq!(items, vec![Item::new(0, "Milk", 2, Money::new(50, 0))]);
    }

    #[tokio::test]
    async fn test_stopped_auto_save_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let store = open_with(&dir, fast_autosave()).await;
        let meta = store.create_new_list(Some("Quiet")).await.unwrap();

        store.stop_auto_save().await;
        fs::remove_file(&meta.storage_path).unwrap();
        tokio::time::sleep(Duration::from_millis(150)).await;

        assert!(!meta.storage_path.exists());
        assert!(!store.is_auto_saving().await);
    }

    #[tokio::test]
    async fn test_opening_another_list_stops_previous_auto_save() {
        let dir = TempDir::new().unwrap();
        let store = open_with(&dir, fast_autosave()).await;
        let first = store.create_new_list(Some("First")).await.unwrap();
        let second = store.create_new_list(Some("Second")).await.unwrap();

        fs::remove_file(&first.storage_path).unwrap();
        fs::remove_file(&second.storage_path).unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;

        assert!(!first.storage_path.exists());
        assert!(second.storage_path.exists());

        // Loading back the first list moves auto-save over to it
        fs::write(&first.storage_path, "Milk: 50: 2\n").unwrap();
        store.load_list(first.id).await.unwrap();
        fs::remove_file(&first.storage_path).unwrap();
        fs::remove_file(&second.storage_path).unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;

        assert!(first.storage_path.exists());
        assert!(!second.storage_path.exists());
    }

    #[tokio::test]
    async fn test_failed_save_keeps_state_usable() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;
        let meta = store.create_new_list(Some("Fragile")).await.unwrap();
        store.stop_auto_save().await;
        store.add_item("Milk", 2, price("50")).await.unwrap();
        let saved = store.get(meta.id).await.unwrap();

        // A directory in place of the file cannot be replaced by a file
        fs::remove_file(&meta.storage_path).unwrap();
        fs::create_dir(&meta.storage_path).unwrap();

        let err = store.add_item("Bread", 1, price("40")).await.unwrap_err();
        assert!(matches!(err, ShoplistError::Storage(_)));
        assert!(store.save().await.is_err());

        let entry = store.get(meta.id).await.unwrap();
        assert_eq!(entry.total_amount, Money::new(100, 0));
        assert_eq!(entry.last_modified_at, saved.last_modified_at);
        assert_eq!(store.working_set().unwrap().items.len(), 2);

        let leftovers: Vec<_> = fs::read_dir(dir.path().join("Shopping Lists"))
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "tmp"))
            .collect();
        assert!(leftovers.is_empty());

        // Once the path is writable again the held edit reaches disk
        fs::remove_dir(&meta.storage_path).unwrap();
        store.save().await.unwrap();
        assert_eq!(store.get(meta.id).await.unwrap().total_amount, Money::new(140, 0));
        let items = FormatKind::PlainTextStandard
            .parse(&fs::read(&meta.storage_path).unwrap())
            .unwrap();
        assert_eq!(items.len(), 2);
    }

    #[tokio::test]
    async fn test_scanned_csv_list_is_saved_as_csv() {
        let dir = TempDir::new().unwrap();
        let lists = dir.path().join("Shopping Lists");
        fs::create_dir_all(&lists).unwrap();
        let path = lists.join("Party_1709285400000.csv");
        fs::write(&path, "Item,Price,Quantity\nCrisps,120,3\n").unwrap();

        let store = open_store(&dir).await;
        let meta = store.find("Party").await.unwrap();
        store.load_list(meta.id).await.unwrap();
        store.stop_auto_save().await;
        store.add_item("Soda", 6, price("80")).await.unwrap();

        let items = FormatKind::Csv.parse(&fs::read(&path).unwrap()).unwrap();
        let names: Vec<_> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Crisps", "Soda"]);
        assert_eq!(total_of(&items), Money::new(840, 0));
    }

    #[test]
    fn test_export_file_name() {
        let now = Utc::now();
        let name = export_file_name("Groceries", ExportFormat::Csv, now);
        assert!(name.starts_with("Groceries_"));
        assert!(name.ends_with(".csv"));
        // Groceries_ + yyyyMMdd_HHmmss + .csv
        assert_eq!(name.len(), "Groceries_".len() + 15 + 4);
    }
}
