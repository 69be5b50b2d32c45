// Task list engine over a key-value backend

use crate::error::{Result, TodoError};
use crate::kv::KvStore;
use crate::task::{Stats, Task, escape_html, now_ms};
use tracing::{debug, warn};

/// Key under which the whole task list is persisted.
pub const STORAGE_KEY: &str = "todoTasks";

/// Ordered task list with write-through persistence.
///
/// The in-memory list is the authority while the store is open: persisted
/// state is read exactly once, at [`TaskStore::open`], and every mutation
/// rewrites the whole list under [`STORAGE_KEY`]. Tasks are kept newest
/// first.
pub struct TaskStore {
    tasks: Vec<Task>,
    kv: Box<dyn KvStore>,
}

impl TaskStore {
    /// Open a store over the given backend and load any persisted list.
    ///
    /// An absent key yields an empty list. A present value that fails to
    /// parse is logged and discarded, and the store starts empty; backend
    /// read failures propagate.
    pub fn open<K: KvStore + 'static>(kv: K) -> Result<Self> {
        let tasks = match kv.get(STORAGE_KEY)? {
            Some(raw) => match parse_tasks(&raw) {
                Ok(tasks) => tasks,
                Err(e) => {
                    warn!(error = ?e, "Persisted task list is unreadable, starting empty");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        debug!(count = tasks.len(), "Loaded task list");
        Ok(Self {
            tasks,
            kv: Box::new(kv),
        })
    }

    /// Add a task from raw input text and return it.
    ///
    /// The text is trimmed, then HTML-escaped. Input that trims to nothing
    /// is rejected with [`TodoError::EmptyTaskText`] and the list stays
    /// untouched. The new task goes to the front of the list.
    pub fn add(&mut self, raw_text: &str) -> Result<Task> {
        let trimmed = raw_text.trim();
        if trimmed.is_empty() {
            return Err(TodoError::EmptyTaskText);
        }

        let task = Task {
            id: self.next_id(),
            text: escape_html(trimmed),
            completed: false,
        };

        self.tasks.insert(0, task.clone());
        self.persist()?;
        Ok(task)
    }

    /// Flip the completion flag of the task with the given id.
    ///
    /// Returns whether a task was toggled. An unknown id changes nothing,
    /// on disk or in memory, and is not an error.
    pub fn toggle(&mut self, id: i64) -> Result<bool> {
        let task = match self.tasks.iter().position(|t| t.id == id) {
            Some(idx) => &mut self.tasks[idx],
            None => {
                debug!(id, "Toggle: no matching task");
                return Ok(false);
            }
        };

        task.completed = !task.completed;
        self.persist()?;
        Ok(true)
    }

    /// Remove the task with the given id.
    ///
    /// Returns whether a task was removed. The list is rewritten even when
    /// nothing matched.
    pub fn delete(&mut self, id: i64) -> Result<bool> {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        let removed = self.tasks.len() < before;

        self.persist()?;
        Ok(removed)
    }

    /// Replace the text of the task with the given id.
    ///
    /// The replacement is trimmed and HTML-escaped like `add`, but empty
    /// replacement text is not an error: the rename is silently dropped and
    /// `false` returned, as for an unknown id.
    pub fn rename(&mut self, id: i64, new_text: &str) -> Result<bool> {
        let trimmed = new_text.trim();
        if trimmed.is_empty() {
            debug!(id, "Rename: empty replacement text, ignoring");
            return Ok(false);
        }

        let task = match self.tasks.iter().position(|t| t.id == id) {
            Some(idx) => &mut self.tasks[idx],
            None => return Ok(false),
        };

        task.text = escape_html(trimmed);
        self.persist()?;
        Ok(true)
    }

    /// Counts over the current list.
    pub fn stats(&self) -> Stats {
        let total = self.tasks.len();
        let completed = self.tasks.iter().filter(|t| t.completed).count();
        Stats {
            total,
            completed,
            remaining: total - completed,
        }
    }

    /// The current list, newest first.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Next task id: wall-clock milliseconds, clamped strictly above every
    /// existing id so that adds within one clock tick stay unique.
    fn next_id(&self) -> i64 {
        let max_id = self.tasks.iter().map(|t| t.id).max().unwrap_or(0);
        now_ms().max(max_id + 1)
    }

    /// Serialize the whole list and overwrite the persisted copy.
    fn persist(&mut self) -> Result<()> {
        let json =
            serde_json::to_string(&self.tasks).map_err(|e| TodoError::Storage(e.to_string()))?;
        self.kv.set(STORAGE_KEY, &json)?;

        debug!(count = self.tasks.len(), "Persisted task list");
        Ok(())
    }
}

fn parse_tasks(raw: &str) -> Result<Vec<Task>> {
    serde_json::from_str(raw).map_err(|e| TodoError::MalformedPersistedState(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::{MemoryKv, SqliteKv};
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;
    use std::rc::Rc;
    use tempfile::TempDir;

    /// Backend that stays inspectable after the store takes ownership.
    #[derive(Clone, Default)]
    struct SharedKv {
        entries: Rc<RefCell<HashMap<String, String>>>,
        sets: Rc<Cell<usize>>,
    }

    impl KvStore for SharedKv {
        fn get(&self, key: &str) -> Result<Option<String>> {
            Ok(self.entries.borrow().get(key).cloned())
        }

        fn set(&mut self, key: &str, value: &str) -> Result<()> {
            self.entries
                .borrow_mut()
                .insert(key.to_string(), value.to_string());
            self.sets.set(self.sets.get() + 1);
            Ok(())
        }
    }

    #[test]
    fn test_open_absent_key_starts_empty() {
        let store = TaskStore::open(MemoryKv::new()).unwrap();
        assert!(store.tasks().is_empty());
        assert_eq!(store.stats().total, 0);
    }

    #[test]
    fn test_add_prepends_newest_first() {
        let mut store = TaskStore::open(MemoryKv::new()).unwrap();

        let first = store.add("Buy milk").unwrap();
        let second = store.add("Walk the dog").unwrap();

        let tasks = store.tasks();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].id, second.id);
        assert_eq!(tasks[1].id, first.id);
        assert!(!tasks[0].completed);
        assert!(!tasks[1].completed);
    }

    #[test]
    fn test_add_trims_text() {
        let mut store = TaskStore::open(MemoryKv::new()).unwrap();

        let task = store.add("  Buy milk  ").unwrap();
        assert_eq!(task.text, "Buy milk");
    }

    #[test]
    fn test_add_empty_rejected() {
        let mut store = TaskStore::open(MemoryKv::new()).unwrap();
        store.add("keep").unwrap();

        assert!(matches!(store.add(""), Err(TodoError::EmptyTaskText)));
        assert!(matches!(store.add("   \t "), Err(TodoError::EmptyTaskText)));

        // Rejected input leaves the list untouched
        assert_eq!(store.tasks().len(), 1);
        assert_eq!(store.tasks()[0].text, "keep");
    }

    #[test]
    fn test_add_escapes_html() {
        let mut store = TaskStore::open(MemoryKv::new()).unwrap();

        let task = store.add("<script>&\"'").unwrap();
        assert_eq!(task.text, "&lt;script&gt;&amp;&quot;&#039;");
    }

    #[test]
    fn test_ids_unique_within_one_tick() {
        let mut store = TaskStore::open(MemoryKv::new()).unwrap();

        let a = store.add("a").unwrap();
        let b = store.add("b").unwrap();
        let c = store.add("c").unwrap();

        assert!(b.id > a.id);
        assert!(c.id > b.id);
    }

    #[test]
    fn test_ids_grow_past_stored_ones() {
        // A persisted task with a far-future id must not collide with new ids
        let far_future = now_ms() + 1_000_000;
        let kv = SharedKv::default();
        kv.entries.borrow_mut().insert(
            STORAGE_KEY.to_string(),
            format!(r#"[{{"id":{},"text":"future","completed":false}}]"#, far_future),
        );

        let mut store = TaskStore::open(kv).unwrap();
        let task = store.add("now").unwrap();
        assert!(task.id > far_future);
    }

    #[test]
    fn test_toggle_flips_and_restores() {
        let mut store = TaskStore::open(MemoryKv::new()).unwrap();
        let task = store.add("Buy milk").unwrap();

        assert!(store.toggle(task.id).unwrap());
        assert!(store.tasks()[0].completed);

        assert!(store.toggle(task.id).unwrap());
        assert!(!store.tasks()[0].completed);
    }

    #[test]
    fn test_toggle_unknown_id_does_not_persist() {
        let kv = SharedKv::default();
        let mut store = TaskStore::open(kv.clone()).unwrap();
        store.add("Buy milk").unwrap();
        let sets_before = kv.sets.get();

        assert!(!store.toggle(999).unwrap());
        assert!(!store.tasks()[0].completed);
        assert_eq!(kv.sets.get(), sets_before);
    }

    #[test]
    fn test_delete_removes_matching_task() {
        let mut store = TaskStore::open(MemoryKv::new()).unwrap();
        let a = store.add("a").unwrap();
        let b = store.add("b").unwrap();

        assert!(store.delete(a.id).unwrap());

        let tasks = store.tasks();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, b.id);
    }

    #[test]
    fn test_delete_unknown_id_keeps_list_but_persists() {
        let kv = SharedKv::default();
        let mut store = TaskStore::open(kv.clone()).unwrap();
        store.add("Buy milk").unwrap();
        let sets_before = kv.sets.get();

        // No match, but the list is still rewritten
        assert!(!store.delete(999).unwrap());
        assert_eq!(store.tasks().len(), 1);
        assert_eq!(kv.sets.get(), sets_before + 1);
    }

    #[test]
    fn test_rename_replaces_and_escapes() {
        let mut store = TaskStore::open(MemoryKv::new()).unwrap();
        let task = store.add("Old text").unwrap();

        assert!(store.rename(task.id, " New <b>text</b> ").unwrap());
        assert_eq!(store.tasks()[0].text, "New &lt;b&gt;text&lt;/b&gt;");
        assert_eq!(store.tasks()[0].id, task.id);
    }

    #[test]
    fn test_rename_empty_is_silent_noop() {
        let kv = SharedKv::default();
        let mut store = TaskStore::open(kv.clone()).unwrap();
        let task = store.add("Keep me").unwrap();
        let sets_before = kv.sets.get();

        assert!(!store.rename(task.id, "   ").unwrap());
        assert_eq!(store.tasks()[0].text, "Keep me");
        assert_eq!(kv.sets.get(), sets_before);
    }

    #[test]
    fn test_rename_unknown_id_returns_false() {
        let mut store = TaskStore::open(MemoryKv::new()).unwrap();
        store.add("Buy milk").unwrap();

        assert!(!store.rename(999, "New").unwrap());
        assert_eq!(store.tasks()[0].text, "Buy milk");
    }

    #[test]
    fn test_stats_lifecycle() {
        let mut store = TaskStore::open(MemoryKv::new()).unwrap();
        assert_eq!(
            store.stats(),
            Stats { total: 0, completed: 0, remaining: 0 }
        );

        let task = store.add("Buy milk").unwrap();
        assert_eq!(
            store.stats(),
            Stats { total: 1, completed: 0, remaining: 1 }
        );

        store.toggle(task.id).unwrap();
        assert_eq!(
            store.stats(),
            Stats { total: 1, completed: 1, remaining: 0 }
        );

        store.delete(task.id).unwrap();
        assert_eq!(
            store.stats(),
            Stats { total: 0, completed: 0, remaining: 0 }
        );
    }

    #[test]
    fn test_persisted_payload_is_plain_json_array() {
        let kv = SharedKv::default();
        let mut store = TaskStore::open(kv.clone()).unwrap();
        let task = store.add("Buy milk").unwrap();

        let raw = kv.entries.borrow().get(STORAGE_KEY).cloned().unwrap();
        let expected = format!(
            r#"[{{"id":{},"text":"Buy milk","completed":false}}]"#,
            task.id
        );
        assert_eq!(raw, expected);
    }

    #[test]
    fn test_reopen_restores_order_and_flags() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tasks.db");

        let (first_id, second_id) = {
            let mut store = TaskStore::open(SqliteKv::open(&path).unwrap()).unwrap();
            let first = store.add("first").unwrap();
            let second = store.add("second").unwrap();
            store.toggle(first.id).unwrap();
            (first.id, second.id)
        };

        let store = TaskStore::open(SqliteKv::open(&path).unwrap()).unwrap();
        let tasks = store.tasks();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].id, second_id);
        assert_eq!(tasks[1].id, first_id);
        assert!(!tasks[0].completed);
        assert!(tasks[1].completed);
        assert_eq!(tasks[0].text, "second");
        assert_eq!(tasks[1].text, "first");
    }

    #[test]
    fn test_malformed_state_starts_empty() {
        let mut kv = MemoryKv::new();
        kv.set(STORAGE_KEY, "{definitely not a task list").unwrap();

        let mut store = TaskStore::open(kv).unwrap();
        assert!(store.tasks().is_empty());

        // The store stays usable; the next mutation overwrites the junk
        store.add("fresh start").unwrap();
        assert_eq!(store.tasks().len(), 1);
    }

    #[test]
    fn test_wrong_shape_state_starts_empty() {
        let mut kv = MemoryKv::new();
        kv.set(STORAGE_KEY, r#"{"id":1,"text":"not a list","completed":false}"#)
            .unwrap();

        let store = TaskStore::open(kv).unwrap();
        assert!(store.tasks().is_empty());
    }
}
