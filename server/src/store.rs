//! In-memory todo store.
//!
//! # Design
//! The whole collection and the id counter sit behind one `tokio::sync::Mutex`.
//! Every operation holds the lock from lookup to return, so updates and
//! deletes cannot race between the existence check and the mutation. The
//! tokio mutex queues waiters in FIFO order and parks them instead of
//! spinning.
//!
//! Ids come from a counter that only ever grows; deleting an item never
//! frees its id.

use std::fmt;
use std::str::FromStr;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::{Result, TodoError, ID_INVALID, TITLE_BLANK, TITLE_REQUIRED};

/// Canonical identifier of a todo item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(pub u64);

impl TodoId {
    /// Normalize an identifier that arrived as text (query string or a JSON
    /// string) into the canonical integer form.
    pub fn parse(raw: &str) -> Result<Self> {
        raw.trim()
            .parse::<u64>()
            .map(TodoId)
            .map_err(|_| TodoError::validation(ID_INVALID))
    }
}

impl FromStr for TodoId {
    type Err = TodoError;

    fn from_str(s: &str) -> Result<Self> {
        TodoId::parse(s)
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single todo item as stored and as sent over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoItem {
    pub id: TodoId,
    pub title: String,
    pub completed: bool,
    /// UTC creation time, e.g. `2024-05-01T12:00:00.000Z`. Never changes.
    pub created_at: String,
}

#[derive(Debug, Default)]
struct TodoList {
    items: Vec<TodoItem>,
    next_id: u64,
}

impl TodoList {
    fn position(&self, id: TodoId) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }
}

/// Title rules shared by create and update.
fn check_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(TodoError::validation(TITLE_BLANK));
    }
    Ok(())
}

fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// The authoritative, process-local collection of todo items.
#[derive(Debug, Default)]
pub struct TodoStore {
    inner: Mutex<TodoList>,
}

impl TodoStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new item. `completed` defaults to `false` when absent.
    pub async fn add_todo(&self, title: Option<&str>, completed: Option<bool>) -> Result<TodoItem> {
        let mut list = self.inner.lock().await;

        let title = match title {
            Some(title) if !title.is_empty() => title,
            _ => return Err(TodoError::validation(TITLE_REQUIRED)),
        };
        check_title(title)?;

        list.next_id += 1;
        let item = TodoItem {
            id: TodoId(list.next_id),
            title: title.to_string(),
            completed: completed.unwrap_or(false),
            created_at: now_iso(),
        };
        list.items.push(item.clone());
        log::debug!("added todo {}", item.id);
        Ok(item)
    }

    pub async fn get_todo(&self, id: TodoId) -> Result<TodoItem> {
        let list = self.inner.lock().await;
        list.items
            .iter()
            .find(|item| item.id == id)
            .cloned()
            .ok_or_else(TodoError::not_found)
    }

    /// All items in insertion order.
    pub async fn get_todo_list(&self) -> Vec<TodoItem> {
        self.inner.lock().await.items.clone()
    }

    /// Update an item in place.
    ///
    /// An empty `title` counts as absent and leaves the stored title alone; a
    /// whitespace-only one is rejected. `completed` is always written, and an
    /// absent value clears the flag.
    pub async fn update_todo(
        &self,
        id: TodoId,
        title: Option<&str>,
        completed: Option<bool>,
    ) -> Result<TodoItem> {
        let mut list = self.inner.lock().await;
        let index = list.position(id).ok_or_else(TodoError::not_found)?;

        let title = title.filter(|title| !title.is_empty());
        if let Some(title) = title {
            check_title(title)?;
        }

        let item = &mut list.items[index];
        if let Some(title) = title {
            item.title = title.to_string();
        }
        item.completed = completed.unwrap_or(false);
        log::debug!("updated todo {id} (completed={})", item.completed);
        Ok(item.clone())
    }

    pub async fn delete_todo(&self, id: TodoId) -> Result<()> {
        let mut list = self.inner.lock().await;
        let before = list.items.len();
        list.items.retain(|item| item.id != id);
        if list.items.len() == before {
            return Err(TodoError::not_found());
        }
        log::debug!("deleted todo {id}");
        Ok(())
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.items.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::error::NOT_FOUND;

    #[tokio::test]
    async fn first_id_is_one_and_ids_increase() {
        let store = TodoStore::new();
        let a = store.add_todo(Some("a"), None).await.unwrap();
        let b = store.add_todo(Some("b"), None).await.unwrap();
        let c = store.add_todo(Some("c"), Some(true)).await.unwrap();
        assert_eq!(a.id, TodoId(1));
        assert!(b.id > a.id);
        assert!(c.id > b.id);
    }

    #[tokio::test]
    async fn add_defaults_completed_to_false() {
        let store = TodoStore::new();
        let item = store.add_todo(Some("Buy milk"), None).await.unwrap();
        assert!(!item.completed);
        assert_eq!(item.title, "Buy milk");
        assert!(item.created_at.ends_with('Z'));
    }

    #[tokio::test]
    async fn add_rejects_missing_and_blank_titles() {
        let store = TodoStore::new();
        assert_eq!(
            store.add_todo(None, None).await.unwrap_err(),
            TodoError::validation(TITLE_REQUIRED)
        );
        assert_eq!(
            store.add_todo(Some(""), Some(false)).await.unwrap_err(),
            TodoError::validation(TITLE_REQUIRED)
        );
        assert_eq!(
            store.add_todo(Some("   "), Some(false)).await.unwrap_err(),
            TodoError::validation(TITLE_BLANK)
        );
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn failed_add_does_not_consume_an_id() {
        let store = TodoStore::new();
        let _ = store.add_todo(Some(" \t "), None).await;
        let item = store.add_todo(Some("real"), None).await.unwrap();
        assert_eq!(item.id, TodoId(1));
    }

    #[tokio::test]
    async fn list_preserves_insertion_order() {
        let store = TodoStore::new();
        for title in ["one", "two", "three"] {
            store.add_todo(Some(title), None).await.unwrap();
        }
        let titles: Vec<_> = store
            .get_todo_list()
            .await
            .into_iter()
            .map(|item| item.title)
            .collect();
        assert_eq!(titles, ["one", "two", "three"]);
    }

    #[tokio::test]
    async fn deleted_ids_are_not_reused() {
        let store = TodoStore::new();
        let item = store.add_todo(Some("temp"), None).await.unwrap();
        store.delete_todo(item.id).await.unwrap();

        let err = store.get_todo(item.id).await.unwrap_err();
        assert_eq!(err, TodoError::NotFound(NOT_FOUND.to_string()));

        let next = store.add_todo(Some("next"), None).await.unwrap();
        assert!(next.id > item.id);
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let store = TodoStore::new();
        store.add_todo(Some("keep"), None).await.unwrap();
        assert_eq!(store.delete_todo(TodoId(99)).await.unwrap_err(), TodoError::not_found());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn update_missing_leaves_collection_unchanged() {
        let store = TodoStore::new();
        store.add_todo(Some("keep"), Some(true)).await.unwrap();
        let before = store.get_todo_list().await;

        let err = store
            .update_todo(TodoId(7), Some("other"), Some(false))
            .await
            .unwrap_err();
        assert_eq!(err, TodoError::not_found());
        assert_eq!(store.get_todo_list().await, before);
    }

    #[tokio::test]
    async fn update_completed_only_keeps_title_and_created_at() {
        let store = TodoStore::new();
        let item = store.add_todo(Some("Walk dog"), None).await.unwrap();

        let updated = store.update_todo(item.id, None, Some(true)).await.unwrap();
        assert!(updated.completed);
        assert_eq!(updated.title, item.title);
        assert_eq!(updated.created_at, item.created_at);
        assert_eq!(store.get_todo(item.id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn update_without_completed_clears_flag() {
        let store = TodoStore::new();
        let item = store.add_todo(Some("done"), Some(true)).await.unwrap();
        let updated = store.update_todo(item.id, Some("still here"), None).await.unwrap();
        assert!(!updated.completed);
        assert_eq!(updated.title, "still here");
    }

    #[tokio::test]
    async fn update_rejects_blank_title_without_mutating() {
        let store = TodoStore::new();
        let item = store.add_todo(Some("original"), Some(true)).await.unwrap();

        let err = store.update_todo(item.id, Some("   "), None).await.unwrap_err();
        assert_eq!(err, TodoError::validation(TITLE_BLANK));
        assert_eq!(store.get_todo(item.id).await.unwrap(), item);
    }

    #[tokio::test]
    async fn update_with_empty_title_keeps_stored_title() {
        let store = TodoStore::new();
        let item = store.add_todo(Some("original"), None).await.unwrap();
        let updated = store.update_todo(item.id, Some(""), Some(true)).await.unwrap();
        assert_eq!(updated.title, "original");
        assert!(updated.completed);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_adds_get_unique_gapless_ids() {
        let store = Arc::new(TodoStore::new());
        let handles: Vec<_> = (0..64)
            .map(|n| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    let title = format!("task {n}");
                    store.add_todo(Some(title.as_str()), None).await.unwrap().id
                })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap().0);
        }
        ids.sort_unstable();
        assert_eq!(ids, (1..=64).collect::<Vec<u64>>());
    }

    #[test]
    fn id_parse_normalizes_text() {
        assert_eq!(TodoId::parse("42").unwrap(), TodoId(42));
        assert_eq!(" 7 ".parse::<TodoId>().unwrap(), TodoId(7));
        assert_eq!(TodoId::parse("abc").unwrap_err(), TodoError::validation(ID_INVALID));
        assert!(TodoId::parse("-1").is_err());
    }

    #[test]
    fn item_serializes_with_camel_case_keys() {
        let item = TodoItem {
            id: TodoId(3),
            title: "Test".to_string(),
            completed: false,
            created_at: "2024-05-01T12:00:00.000Z".to_string(),
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["title"], "Test");
        assert_eq!(json["completed"], false);
        assert_eq!(json["createdAt"], "2024-05-01T12:00:00.000Z");
    }
}
