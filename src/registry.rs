use std::collections::HashMap;

use crate::catalog::Catalog;
use crate::checkout::{self, TransactionRecord};
use crate::discount::Discount;
use crate::error::PosError;
use crate::session::CartSession;
use crate::store::{
    CompletionSignal, FileKvStore, KvStore, PersistedSession, PersistedSessions, PosStore,
    SavedItem,
};

pub const MAX_SESSIONS: usize = 5;

/// Owns the concurrent customer sessions: at most five, one active, each on
/// its own slot number that is reused only after the slot is freed.
///
/// Every mutating operation writes the full registry snapshot back to the
/// store before returning (best-effort; failures are logged by the store
/// layer and swallowed).
pub struct SessionRegistry<K: KvStore = FileKvStore> {
    catalog: Catalog,
    sessions: Vec<CartSession>,
    active_id: Option<String>,
    sessions_created: u32,
    store: Option<PosStore<K>>,
}

impl<K: KvStore> SessionRegistry<K> {
    /// A registry with a single fresh session, persisted immediately.
    pub fn bootstrap(catalog: Catalog, store: Option<PosStore<K>>) -> Self {
        let mut registry = Self {
            catalog,
            sessions: Vec::new(),
            active_id: None,
            sessions_created: 0,
            store,
        };
        registry
            .create_session()
            .expect("an empty registry always has a free slot");
        registry
    }

    /// Restores from the store, or bootstraps a fresh single session when
    /// nothing (or nothing readable) is there.
    pub fn load_or_bootstrap(catalog: Catalog, store: PosStore<K>) -> Self {
        match store.load_sessions() {
            Some(blob) if !blob.customers.is_empty() => {
                Self::from_persisted(catalog, blob, Some(store))
            }
            _ => Self::bootstrap(catalog, Some(store)),
        }
    }

    pub fn from_persisted(
        catalog: Catalog,
        blob: PersistedSessions,
        store: Option<PosStore<K>>,
    ) -> Self {
        let mut sessions = Vec::new();
        for persisted in &blob.customers {
            let counter = blob.row_counters.get(&persisted.id).copied().unwrap_or(0);
            let mut session = CartSession::bare(
                persisted.customer_number,
                persisted.custom_name.clone(),
                persisted.discount,
                counter,
            );
            // Replay the saved rows through the editor so line ids keep
            // growing from the persisted counter.
            for item in &persisted.saved_items {
                let line_id = session.add_line();
                session.set_line_product(line_id, item.product_id, &catalog);
                session.set_line_quantity(line_id, item.quantity, &catalog);
            }
            if persisted.saved_items.is_empty() {
                session.add_line();
            }
            session.recompute(&catalog);
            sessions.push(session);
        }

        let active_id = blob
            .current_customer_id
            .filter(|id| sessions.iter().any(|s| &s.id == id))
            .or_else(|| sessions.first().map(|s| s.id.clone()));

        let registry = Self {
            catalog,
            sessions,
            active_id,
            sessions_created: blob.customer_counter,
            store,
        };
        if registry.sessions.is_empty() {
            return Self::bootstrap(registry.catalog, registry.store);
        }
        registry
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn store(&self) -> Option<&PosStore<K>> {
        self.store.as_ref()
    }

    pub fn sessions(&self) -> &[CartSession] {
        &self.sessions
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.sessions.len() >= MAX_SESSIONS
    }

    pub fn get(&self, id: &str) -> Option<&CartSession> {
        self.sessions.iter().find(|s| s.id == id)
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    pub fn active(&self) -> Option<&CartSession> {
        self.active_id
            .as_deref()
            .and_then(|id| self.sessions.iter().find(|s| s.id == id))
    }

    fn session_mut(&mut self, id: &str) -> Result<&mut CartSession, PosError> {
        self.sessions
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| PosError::UnknownSession(id.to_string()))
    }

    fn next_free_slot(&self) -> Option<u8> {
        (1..=MAX_SESSIONS as u8).find(|slot| !self.sessions.iter().any(|s| s.slot == *slot))
    }

    /// Allocates the lowest free slot and makes the new session active.
    pub fn create_session(&mut self) -> Result<String, PosError> {
        if self.is_full() {
            return Err(PosError::MaxSessionsReached(MAX_SESSIONS));
        }
        let slot = self
            .next_free_slot()
            .ok_or(PosError::MaxSessionsReached(MAX_SESSIONS))?;
        let mut session = CartSession::new(slot);
        session.recompute(&self.catalog);
        let id = session.id.clone();
        self.sessions.push(session);
        self.sessions_created += 1;
        self.active_id = Some(id.clone());
        self.persist();
        Ok(id)
    }

    /// Removes a session. Refused while any row has a bound product. If the
    /// active session was closed, the first remaining one becomes active; a
    /// fresh session is created when none remain.
    pub fn close_session(&mut self, id: &str) -> Result<(), PosError> {
        let position = self
            .sessions
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| PosError::UnknownSession(id.to_string()))?;
        if self.sessions[position].has_bound_product() {
            return Err(PosError::SessionNotEmpty);
        }
        self.sessions.remove(position);

        if self.sessions.is_empty() {
            self.active_id = None;
            self.create_session()?;
            return Ok(());
        }
        if self.active_id.as_deref() == Some(id) {
            self.active_id = Some(self.sessions[0].id.clone());
        }
        self.persist();
        Ok(())
    }

    pub fn switch_active(&mut self, id: &str) -> Result<(), PosError> {
        if self.get(id).is_none() {
            return Err(PosError::UnknownSession(id.to_string()));
        }
        self.active_id = Some(id.to_string());
        self.persist();
        Ok(())
    }

    /// Clears a session back to defaults after a completed transaction.
    pub fn reset_session(&mut self, id: &str) -> Result<(), PosError> {
        let catalog = self.catalog.clone();
        self.session_mut(id)?.reset(&catalog);
        self.persist();
        Ok(())
    }

    pub fn set_customer_name(&mut self, id: &str, name: &str) -> Result<(), PosError> {
        self.session_mut(id)?.set_custom_name(name);
        self.persist();
        Ok(())
    }

    pub fn add_line(&mut self, id: &str) -> Result<u64, PosError> {
        let line_id = self.session_mut(id)?.add_line();
        self.persist();
        Ok(line_id)
    }

    pub fn set_line_product(
        &mut self,
        id: &str,
        line_id: u64,
        product_id: u32,
    ) -> Result<(), PosError> {
        let catalog = self.catalog.clone();
        self.session_mut(id)?
            .set_line_product(line_id, product_id, &catalog);
        self.persist();
        Ok(())
    }

    pub fn clear_line_product(&mut self, id: &str, line_id: u64) -> Result<(), PosError> {
        let catalog = self.catalog.clone();
        self.session_mut(id)?.clear_line_product(line_id, &catalog);
        self.persist();
        Ok(())
    }

    pub fn set_line_quantity(
        &mut self,
        id: &str,
        line_id: u64,
        quantity: u32,
    ) -> Result<(), PosError> {
        let catalog = self.catalog.clone();
        self.session_mut(id)?
            .set_line_quantity(line_id, quantity, &catalog);
        self.persist();
        Ok(())
    }

    pub fn remove_line(&mut self, id: &str, line_id: u64) -> Result<(), PosError> {
        let catalog = self.catalog.clone();
        self.session_mut(id)?.remove_line(line_id, &catalog);
        self.persist();
        Ok(())
    }

    pub fn set_discount(&mut self, id: &str, discount: Discount) -> Result<(), PosError> {
        let catalog = self.catalog.clone();
        self.session_mut(id)?.set_discount(discount, &catalog);
        self.persist();
        Ok(())
    }

    /// Snapshots a session into a transaction record and hands it to the
    /// checkout collaborator via the store. The session is left intact.
    pub fn emit(&self, id: &str) -> Result<TransactionRecord, PosError> {
        let session = self
            .get(id)
            .ok_or_else(|| PosError::UnknownSession(id.to_string()))?;
        let record = checkout::emit(session, &self.catalog)?;
        if let Some(store) = &self.store {
            store.put_transaction(&record);
            store.save_sessions(&self.to_persisted());
        }
        Ok(record)
    }

    /// Applies a completed-transaction signal: resets exactly that customer's
    /// slot and switches to it. Unknown customers are ignored.
    pub fn apply_completion(&mut self, signal: &CompletionSignal) -> bool {
        if self.get(&signal.customer_id).is_none() {
            return false;
        }
        let id = signal.customer_id.clone();
        let catalog = self.catalog.clone();
        if let Ok(session) = self.session_mut(&id) {
            session.reset(&catalog);
        }
        self.active_id = Some(id);
        self.persist();
        true
    }

    pub fn to_persisted(&self) -> PersistedSessions {
        let customers = self
            .sessions
            .iter()
            .map(|session| PersistedSession {
                id: session.id.clone(),
                name: session.display_name(),
                customer_number: session.slot,
                custom_name: session.custom_name().map(str::to_string),
                discount: session.discount(),
                saved_items: session
                    .lines()
                    .iter()
                    .filter_map(|line| {
                        line.product_id.map(|product_id| SavedItem {
                            product_id,
                            quantity: line.quantity,
                        })
                    })
                    .collect(),
            })
            .collect();

        let row_counters: HashMap<String, u64> = self
            .sessions
            .iter()
            .map(|s| (s.id.clone(), s.line_counter()))
            .collect();

        PersistedSessions {
            customers,
            current_customer_id: self.active_id.clone(),
            customer_counter: self.sessions_created,
            row_counters,
        }
    }

    /// Writes the current snapshot; used by the periodic backstop and on
    /// teardown in addition to the per-mutation saves.
    pub fn persist(&self) {
        if let Some(store) = &self.store {
            store.save_sessions(&self.to_persisted());
        }
    }
}
