// [libs/infra/coordination/src/memory.rs]
/*!
 * =================================================================
 * APARATO: IN-MEMORY COORDINATION DOUBLE (V4.1 - TESTKIT)
 * CLASIFICACIÓN: PROVING GROUNDS (ESTRATO L3-TEST)
 * RESPONSABILIDAD: SEMÁNTICA DEL ALMACÉN VOLÁTIL SIN SERVIDOR
 *
 * Reproduce expiración, set-if-absent y drenaje atómico bajo un único
 * mutex, preservando los contratos de linealizabilidad que los tests
 * del ledger y del broker certifican.
 * =================================================================
 */

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::errors::CoordinationError;
use crate::store::CoordinationStore;

#[derive(Debug)]
enum StoredValue {
    Text(String),
    Set(HashSet<String>),
    List(Vec<String>),
}

#[derive(Debug)]
struct StoredEntry {
    value: StoredValue,
    expires_at: Option<Instant>,
}

impl StoredEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| deadline <= now)
    }
}

/// Doble de pruebas del almacén de coordinación.
#[derive(Default)]
pub struct MemoryCoordinationStore {
    entries: Mutex<HashMap<String, StoredEntry>>,
}

impl MemoryCoordinationStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn purge_expired(entries: &mut HashMap<String, StoredEntry>) {
        let now = Instant::now();
        entries.retain(|_, entry| !entry.is_expired(now));
    }

    /// Tiempo de vida restante de una clave, si tiene expiración.
    pub fn remaining_ttl(&self, key: &str) -> Option<Duration> {
        let entries = self.entries.lock().expect("memory store lock");
        entries
            .get(key)?
            .expires_at
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }
}

#[async_trait]
impl CoordinationStore for MemoryCoordinationStore {
    async fn set_add_all_with_expiry(
        &self,
        key: &str,
        members: &[String],
        time_to_live: Duration,
    ) -> Result<(), CoordinationError> {
        let mut entries = self.entries.lock().expect("memory store lock");
        Self::purge_expired(&mut entries);

        let entry = entries.entry(key.to_string()).or_insert_with(|| StoredEntry {
            value: StoredValue::Set(HashSet::new()),
            expires_at: None,
        });

        if let StoredValue::Set(set) = &mut entry.value {
            set.extend(members.iter().cloned());
        }
        entry.expires_at = Some(Instant::now() + time_to_live);

        Ok(())
    }

    async fn set_members(&self, key: &str) -> Result<Vec<String>, CoordinationError> {
        let mut entries = self.entries.lock().expect("memory store lock");
        Self::purge_expired(&mut entries);

        Ok(match entries.get(key) {
            Some(StoredEntry {
                value: StoredValue::Set(set),
                ..
            }) => set.iter().cloned().collect(),
            _ => Vec::new(),
        })
    }

    async fn set_remove(&self, key: &str, member: &str) -> Result<bool, CoordinationError> {
        let mut entries = self.entries.lock().expect("memory store lock");
        Self::purge_expired(&mut entries);

        Ok(match entries.get_mut(key) {
            Some(StoredEntry {
                value: StoredValue::Set(set),
                ..
            }) => set.remove(member),
            _ => false,
        })
    }

    async fn string_set_if_absent(
        &self,
        key: &str,
        value: &str,
        time_to_live: Duration,
    ) -> Result<bool, CoordinationError> {
        let mut entries = self.entries.lock().expect("memory store lock");
        Self::purge_expired(&mut entries);

        if entries.contains_key(key) {
            return Ok(false);
        }

        entries.insert(
            key.to_string(),
            StoredEntry {
                value: StoredValue::Text(value.to_string()),
                expires_at: Some(Instant::now() + time_to_live),
            },
        );
        Ok(true)
    }

    async fn string_exists(&self, key: &str) -> Result<bool, CoordinationError> {
        let mut entries = self.entries.lock().expect("memory store lock");
        Self::purge_expired(&mut entries);
        Ok(entries.contains_key(key))
    }

    async fn list_push_right(
        &self,
        key: &str,
        elements: &[String],
    ) -> Result<(), CoordinationError> {
        if elements.is_empty() {
            return Ok(());
        }

        let mut entries = self.entries.lock().expect("memory store lock");
        Self::purge_expired(&mut entries);

        let entry = entries.entry(key.to_string()).or_insert_with(|| StoredEntry {
            value: StoredValue::List(Vec::new()),
            expires_at: None,
        });

        if let StoredValue::List(list) = &mut entry.value {
            list.extend(elements.iter().cloned());
        }

        Ok(())
    }

    async fn list_drain_head(
        &self,
        key: &str,
        max_elements: usize,
    ) -> Result<Vec<String>, CoordinationError> {
        if max_elements == 0 {
            return Ok(Vec::new());
        }

        let mut entries = self.entries.lock().expect("memory store lock");
        Self::purge_expired(&mut entries);

        Ok(match entries.get_mut(key) {
            Some(StoredEntry {
                value: StoredValue::List(list),
                ..
            }) => {
                let take = max_elements.min(list.len());
                list.drain(..take).collect()
            }
            _ => Vec::new(),
        })
    }

    async fn list_length(&self, key: &str) -> Result<usize, CoordinationError> {
        let mut entries = self.entries.lock().expect("memory store lock");
        Self::purge_expired(&mut entries);

        Ok(match entries.get(key) {
            Some(StoredEntry {
                value: StoredValue::List(list),
                ..
            }) => list.len(),
            _ => 0,
        })
    }

    async fn list_pop_blocking(
        &self,
        key: &str,
        timeout: Duration,
    ) -> Result<Option<String>, CoordinationError> {
        let deadline = Instant::now() + timeout;

        loop {
            {
                let mut entries = self.entries.lock().expect("memory store lock");
                Self::purge_expired(&mut entries);

                if let Some(StoredEntry {
                    value: StoredValue::List(list),
                    ..
                }) = entries.get_mut(key)
                {
                    if !list.is_empty() {
                        return Ok(Some(list.remove(0)));
                    }
                }
            }

            if Instant::now() >= deadline {
                return Ok(None);
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

// FIN DEL ARCHIVO [libs/infra/coordination/src/memory.rs]
