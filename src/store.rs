use chrono::{SecondsFormat, Utc};
use log::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::checkout::TransactionRecord;
use crate::discount::Discount;
use crate::error::PosError;

pub const SESSIONS_KEY: &str = "customerSessions";
pub const TRANSACTION_KEY: &str = "currentTransaction";
pub const COMPLETED_KEY: &str = "transactionCompleted";
pub const CANCELLED_KEY: &str = "transactionCancelled";
pub const CASHIER_KEY: &str = "currentCashier";

/// String-keyed blob store. Values are read and written wholesale; there is
/// exactly one logical writer, and the last write wins.
pub trait KvStore {
    fn get(&self, key: &str) -> Option<String>;
    fn put(&self, key: &str, value: &str) -> io::Result<()>;
    fn remove(&self, key: &str) -> io::Result<()>;
}

/// One JSON file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileKvStore {
    dir: PathBuf,
}

impl FileKvStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let dir = AppDirs::store_dir().unwrap_or_else(|| PathBuf::from("till_store"));
        Self { dir }
    }

    pub fn with_dir<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KvStore for FileKvStore {
    fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.path_for(key)).ok()
    }

    fn put(&self, key: &str, value: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(key), value)
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}

/// Per-session persisted shape: identity, names, the bound rows as
/// productId+quantity pairs, and the discount selection. Derived totals are
/// never persisted; they are recomputed on restore.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSession {
    pub id: String,
    pub name: String,
    pub customer_number: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_name: Option<String>,
    #[serde(default)]
    pub discount: Discount,
    #[serde(default)]
    pub saved_items: Vec<SavedItem>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SavedItem {
    pub product_id: u32,
    pub quantity: u32,
}

/// The full registry snapshot stored under `customerSessions`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSessions {
    pub customers: Vec<PersistedSession>,
    #[serde(default)]
    pub current_customer_id: Option<String>,
    #[serde(default)]
    pub customer_counter: u32,
    #[serde(default)]
    pub row_counters: HashMap<String, u64>,
}

/// Completion handshake written by the checkout flow and consumed by the
/// session registry to decide whether a slot gets reset.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CompletionSignal {
    pub customer_id: String,
    pub customer_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<String>,
    pub action: String,
}

impl CompletionSignal {
    pub fn completed(record: &TransactionRecord, action: &str) -> Self {
        Self {
            customer_id: record.customer_id.clone(),
            customer_name: record.customer_name.clone(),
            completed_at: Some(now_iso()),
            cancelled_at: None,
            action: action.to_string(),
        }
    }

    pub fn cancelled(record: &TransactionRecord, action: &str) -> Self {
        Self {
            customer_id: record.customer_id.clone(),
            customer_name: record.customer_name.clone(),
            completed_at: None,
            cancelled_at: Some(now_iso()),
            action: action.to_string(),
        }
    }
}

fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Typed access to the shared key-value store.
///
/// Writes are best-effort: a failed write is logged and swallowed, never
/// surfaced — the system prefers availability over snapshot consistency.
/// Malformed data reads as absent.
pub struct PosStore<K: KvStore = FileKvStore> {
    kv: K,
}

impl PosStore<FileKvStore> {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            kv: FileKvStore::new(),
        }
    }

    pub fn with_dir<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            kv: FileKvStore::with_dir(dir),
        }
    }
}

impl<K: KvStore> PosStore<K> {
    pub fn from_kv(kv: K) -> Self {
        Self { kv }
    }

    fn read_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.kv.get(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                // Recovered locally: the caller starts from a clean slate.
                warn!("{} under {key}: {err}", PosError::MalformedPersistedState);
                None
            }
        }
    }

    fn write_json<T: Serialize>(&self, key: &str, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(json) => {
                if let Err(err) = self.kv.put(key, &json) {
                    warn!("best-effort write of {key} failed: {err}");
                }
            }
            Err(err) => warn!("could not serialize {key}: {err}"),
        }
    }

    fn delete(&self, key: &str) {
        if let Err(err) = self.kv.remove(key) {
            warn!("could not remove {key}: {err}");
        }
    }

    pub fn load_sessions(&self) -> Option<PersistedSessions> {
        self.read_json(SESSIONS_KEY)
    }

    pub fn save_sessions(&self, blob: &PersistedSessions) {
        self.write_json(SESSIONS_KEY, blob)
    }

    pub fn load_transaction(&self) -> Option<TransactionRecord> {
        self.read_json(TRANSACTION_KEY)
    }

    pub fn put_transaction(&self, record: &TransactionRecord) {
        self.write_json(TRANSACTION_KEY, record)
    }

    pub fn clear_transaction(&self) {
        self.delete(TRANSACTION_KEY)
    }

    pub fn put_completed(&self, signal: &CompletionSignal) {
        self.write_json(COMPLETED_KEY, signal)
    }

    /// Reads and consumes a pending completion signal.
    pub fn take_completed(&self) -> Option<CompletionSignal> {
        let signal = self.read_json(COMPLETED_KEY);
        self.delete(COMPLETED_KEY);
        signal
    }

    pub fn put_cancelled(&self, signal: &CompletionSignal) {
        self.write_json(CANCELLED_KEY, signal)
    }

    pub fn take_cancelled(&self) -> Option<CompletionSignal> {
        let signal = self.read_json(CANCELLED_KEY);
        self.delete(CANCELLED_KEY);
        signal
    }

    pub fn cashier(&self) -> Option<String> {
        self.read_json(CASHIER_KEY)
    }

    pub fn set_cashier(&self, name: &str) {
        self.write_json(CASHIER_KEY, &name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_blob() -> PersistedSessions {
        PersistedSessions {
            customers: vec![PersistedSession {
                id: "customer-1".to_string(),
                name: "Ada".to_string(),
                customer_number: 1,
                custom_name: Some("Ada".to_string()),
                discount: Discount::Custom(12.5),
                saved_items: vec![SavedItem {
                    product_id: 1,
                    quantity: 12,
                }],
            }],
            current_customer_id: Some("customer-1".to_string()),
            customer_counter: 1,
            row_counters: HashMap::from([("customer-1".to_string(), 1)]),
        }
    }

    #[test]
    fn test_sessions_roundtrip() {
        let dir = tempdir().unwrap();
        let store = PosStore::with_dir(dir.path());
        let blob = sample_blob();
        store.save_sessions(&blob);
        assert_eq!(store.load_sessions(), Some(blob));
    }

    #[test]
    fn test_absent_key_reads_as_none() {
        let dir = tempdir().unwrap();
        let store = PosStore::with_dir(dir.path());
        assert_eq!(store.load_sessions(), None);
        assert!(store.load_transaction().is_none());
    }

    #[test]
    fn test_malformed_blob_reads_as_none() {
        let dir = tempdir().unwrap();
        let kv = FileKvStore::with_dir(dir.path());
        kv.put(SESSIONS_KEY, "{not json").unwrap();
        let store = PosStore::from_kv(kv);
        assert_eq!(store.load_sessions(), None);
    }

    #[test]
    fn test_sessions_blob_uses_the_wire_keys() {
        let dir = tempdir().unwrap();
        let store = PosStore::with_dir(dir.path());
        store.save_sessions(&sample_blob());

        let raw = FileKvStore::with_dir(dir.path()).get(SESSIONS_KEY).unwrap();
        for key in [
            "customers",
            "currentCustomerId",
            "customerCounter",
            "rowCounters",
            "savedItems",
            "productId",
            "customerNumber",
        ] {
            assert!(raw.contains(key), "missing key {key} in {raw}");
        }
    }

    #[test]
    fn test_completion_signal_is_consumed_once() {
        let dir = tempdir().unwrap();
        let store = PosStore::with_dir(dir.path());
        let signal = CompletionSignal {
            customer_id: "customer-2".to_string(),
            customer_name: "Customer 2".to_string(),
            completed_at: Some("2025-09-20T14:30:00Z".to_string()),
            cancelled_at: None,
            action: "print_complete".to_string(),
        };
        store.put_completed(&signal);
        assert_eq!(store.take_completed(), Some(signal));
        assert_eq!(store.take_completed(), None);
    }

    #[test]
    fn test_cashier_roundtrip() {
        let dir = tempdir().unwrap();
        let store = PosStore::with_dir(dir.path());
        assert_eq!(store.cashier(), None);
        store.set_cashier("Mary Johnson");
        assert_eq!(store.cashier(), Some("Mary Johnson".to_string()));
    }

    #[test]
    fn test_write_failure_is_swallowed() {
        // Point the store at a path that cannot be a directory.
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("occupied");
        fs::write(&file_path, "x").unwrap();
        let store = PosStore::with_dir(file_path.join("nested"));
        // Must not panic; the failure is logged and dropped.
        store.save_sessions(&sample_blob());
        assert_eq!(store.load_sessions(), None);
    }
}
