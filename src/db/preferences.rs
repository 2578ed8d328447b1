use crate::data_models::UserId;
use crate::db::errors::DBError;
use crate::db::file_store::{load_or_default, write_atomically};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};

pub type Preferences = BTreeMap<UserId, Vec<String>>;

/// Trims and lowercases a keyword; `None` when nothing is left.
pub fn normalize_keyword(raw: &str) -> Option<String> {
    let keyword = raw.trim().to_lowercase();
    if keyword.is_empty() {
        return None;
    }
    Some(keyword)
}

/// Keyword preferences per user, mirrored to a JSON file on every change.
///
/// Users without keywords are never present in the map. All mutations run
/// under the write lock and hit the disk before the in-memory map is swapped,
/// so memory and file never disagree.
#[derive(Debug)]
pub struct PreferenceStore {
    path: PathBuf,
    preferences: RwLock<Preferences>,
}

impl PreferenceStore {
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let stored: Preferences = load_or_default(&path);
        let preferences = sanitize(stored);
        info!(path = %path.display(), users = preferences.len(), "loaded keyword preferences");
        Self {
            path,
            preferences: RwLock::new(preferences),
        }
    }

    /// `Ok(false)` when the keyword is empty or already present.
    pub fn add(&self, user: &UserId, keyword: &str) -> Result<bool, DBError> {
        let Some(keyword) = normalize_keyword(keyword) else {
            return Ok(false);
        };
        let added = self.mutate(|preferences| {
            let keywords = preferences.entry(user.clone()).or_default();
            if keywords.contains(&keyword) {
                return false;
            }
            keywords.push(keyword.clone());
            true
        })?;
        if added {
            debug!(user = %user, keyword = %keyword, "keyword added");
        }
        Ok(added)
    }

    /// `Ok(false)` when the user never had the keyword.
    pub fn remove(&self, user: &UserId, keyword: &str) -> Result<bool, DBError> {
        let Some(keyword) = normalize_keyword(keyword) else {
            return Ok(false);
        };
        let removed = self.mutate(|preferences| {
            let Some(keywords) = preferences.get_mut(user) else {
                return false;
            };
            let Some(position) = keywords.iter().position(|kw| *kw == keyword) else {
                return false;
            };
            keywords.remove(position);
            if keywords.is_empty() {
                preferences.remove(user);
            }
            true
        })?;
        if removed {
            debug!(user = %user, keyword = %keyword, "keyword removed");
        }
        Ok(removed)
    }

    pub fn list(&self, user: &UserId) -> Vec<String> {
        self.read().get(user).cloned().unwrap_or_default()
    }

    /// Point-in-time copy of every user's keywords.
    pub fn snapshot(&self) -> Preferences {
        self.read().clone()
    }

    fn mutate<F>(&self, operation: F) -> Result<bool, DBError>
    where
        F: FnOnce(&mut Preferences) -> bool,
    {
        let mut preferences = self.write();
        let mut updated = preferences.clone();
        if !operation(&mut updated) {
            return Ok(false);
        }
        write_atomically(&self.path, &updated)?;
        *preferences = updated;
        Ok(true)
    }

    fn read(&self) -> RwLockReadGuard<'_, Preferences> {
        self.preferences
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Preferences> {
        self.preferences
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn sanitize(stored: Preferences) -> Preferences {
    let mut preferences = Preferences::new();
    for (user, raw_keywords) in stored {
        let mut keywords: Vec<String> = vec![];
        for keyword in raw_keywords.iter().filter_map(|kw| normalize_keyword(kw)) {
            if !keywords.contains(&keyword) {
                keywords.push(keyword);
            }
        }
        if !keywords.is_empty() {
            preferences.insert(user, keywords);
        }
    }
    preferences
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_store() -> (TempDir, PreferenceStore) {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let store = PreferenceStore::load(dir.path().join("user_prefs.json"));
        (dir, store)
    }

    fn user(id: &str) -> UserId {
        UserId::new(id)
    }

    #[test]
    fn normalize_keyword_works() {
        assert_eq!(normalize_keyword("  LapTop "), Some("laptop".to_string()));
        assert_eq!(normalize_keyword("   "), None);
        assert_eq!(normalize_keyword(""), None);
    }

    #[test]
    fn add_then_list_works() {
        let (_dir, store) = create_store();
        assert!(store.add(&user("1"), "Laptop").expect("Failed to add"));
        assert_eq!(store.list(&user("1")), vec!["laptop".to_string()]);
    }

    #[test]
    fn add_case_variants_stored_once() {
        let (_dir, store) = create_store();
        assert!(store.add(&user("1"), "laptop").expect("Failed to add"));
        assert!(!store.add(&user("1"), "  LAPTOP ").expect("Failed to add"));
        assert!(!store.add(&user("1"), "Laptop").expect("Failed to add"));
        assert_eq!(store.list(&user("1")), vec!["laptop".to_string()]);
    }

    #[test]
    fn add_empty_keyword_fails() {
        let (dir, store) = create_store();
        assert!(!store.add(&user("1"), "   ").expect("Failed to add"));
        assert!(store.list(&user("1")).is_empty());
        assert!(store.snapshot().is_empty());
        assert!(!dir.path().join("user_prefs.json").exists());
    }

    #[test]
    fn list_keeps_insertion_order() {
        let (_dir, store) = create_store();
        for keyword in ["zelda", "apple", "monitor"] {
            store.add(&user("1"), keyword).expect("Failed to add");
        }
        assert_eq!(store.list(&user("1")), vec!["zelda", "apple", "monitor"]);
    }

    #[test]
    fn list_unknown_user_is_empty() {
        let (_dir, store) = create_store();
        assert!(store.list(&user("nobody")).is_empty());
    }

    #[test]
    fn remove_absent_keyword_leaves_store_unchanged() {
        let (_dir, store) = create_store();
        store.add(&user("1"), "laptop").expect("Failed to add");
        let before = store.list(&user("1"));
        assert!(!store.remove(&user("1"), "chair").expect("Failed to remove"));
        assert!(!store.remove(&user("2"), "laptop").expect("Failed to remove"));
        assert_eq!(store.list(&user("1")), before);
    }

    #[test]
    fn remove_normalizes_keyword() {
        let (_dir, store) = create_store();
        store.add(&user("1"), "laptop").expect("Failed to add");
        store.add(&user("1"), "chair").expect("Failed to add");
        assert!(store.remove(&user("1"), " LAPTOP").expect("Failed to remove"));
        assert_eq!(store.list(&user("1")), vec!["chair".to_string()]);
    }

    #[test]
    fn remove_last_keyword_drops_user() {
        let (_dir, store) = create_store();
        store.add(&user("1"), "laptop").expect("Failed to add");
        assert!(store.remove(&user("1"), "laptop").expect("Failed to remove"));
        assert!(!store.snapshot().contains_key(&user("1")));
    }

    #[test]
    fn store_survives_reload() {
        let (dir, store) = create_store();
        store.add(&user("1"), "laptop").expect("Failed to add");
        store.add(&user("1"), "chair").expect("Failed to add");
        store.add(&user("2"), "phone").expect("Failed to add");
        let reloaded = PreferenceStore::load(dir.path().join("user_prefs.json"));
        assert_eq!(reloaded.snapshot(), store.snapshot());
        assert_eq!(reloaded.list(&user("1")), vec!["laptop", "chair"]);
    }

    #[test]
    fn corrupt_file_loads_empty() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("user_prefs.json");
        fs::write(&path, "[\"not\", \"a map\"").expect("Failed to write");
        let store = PreferenceStore::load(&path);
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn load_sanitizes_stored_keywords() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("user_prefs.json");
        fs::write(
            &path,
            r#"{"1": [" Laptop", "laptop", "", "Chair"], "2": [], "3": ["  "]}"#,
        )
        .expect("Failed to write");
        let store = PreferenceStore::load(&path);
        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(store.list(&user("1")), vec!["laptop", "chair"]);
    }

    #[test]
    fn failed_write_rolls_back() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "a file where a directory should be").expect("Failed to write");
        let store = PreferenceStore::load(blocker.join("user_prefs.json"));
        let result = store.add(&user("1"), "laptop");
        assert!(result.is_err());
        assert!(store.list(&user("1")).is_empty());
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn concurrent_mutations_never_tear_the_file() {
        let (dir, store) = create_store();
        let path = dir.path().join("user_prefs.json");
        let writers = 4;
        let per_writer = 25;

        std::thread::scope(|scope| {
            for writer in 0..writers {
                let store = &store;
                scope.spawn(move || {
                    let id = user(&writer.to_string());
                    for i in 0..per_writer {
                        store
                            .add(&id, &format!("keyword-{i}"))
                            .expect("Failed to add");
                        if i % 5 == 0 {
                            store
                                .remove(&id, &format!("keyword-{i}"))
                                .expect("Failed to remove");
                        }
                    }
                });
            }
            for _ in 0..2 {
                let store = &store;
                let path = &path;
                scope.spawn(move || {
                    for _ in 0..50 {
                        let _ = store.snapshot();
                        if let Ok(data) = fs::read_to_string(path) {
                            serde_json::from_str::<Preferences>(&data)
                                .expect("Store file must always parse");
                        }
                    }
                });
            }
        });

        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), writers);
        for writer in 0..writers {
            let expected: Vec<String> = (0..per_writer)
                .filter(|i| i % 5 != 0)
                .map(|i| format!("keyword-{i}"))
                .collect();
            assert_eq!(store.list(&user(&writer.to_string())), expected);
        }
        let reloaded = PreferenceStore::load(&path);
        assert_eq!(reloaded.snapshot(), snapshot);
    }
}
