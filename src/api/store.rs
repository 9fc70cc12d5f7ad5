//! Observable store of persona física records.
//!
//! The store owns the cached collection and publishes every change on a
//! `watch` channel. Views only ever see read-only snapshots; all writes go
//! through the injected [`PersonasBackend`].

use crate::api::error::ApiError;
use crate::api::models::{NewPersonaFisica, PersonaFisica};
use std::future::Future;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Data-access seam for persona física records.
pub trait PersonasBackend: Send + Sync + 'static {
    fn list(&self) -> impl Future<Output = Result<Vec<PersonaFisica>, ApiError>> + Send;

    fn get(&self, id: &str) -> impl Future<Output = Result<PersonaFisica, ApiError>> + Send;

    fn create(
        &self,
        persona: &NewPersonaFisica,
    ) -> impl Future<Output = Result<PersonaFisica, ApiError>> + Send;

    fn update(
        &self,
        id: &str,
        changes: &NewPersonaFisica,
    ) -> impl Future<Output = Result<PersonaFisica, ApiError>> + Send;

    fn delete(&self, id: &str) -> impl Future<Output = Result<(), ApiError>> + Send;
}

/// Cached collection plus the backend it is synchronized with.
#[derive(Debug)]
pub struct PersonasStore<B> {
    backend: B,
    personas: watch::Sender<Vec<PersonaFisica>>,
}

impl<B: PersonasBackend> PersonasStore<B> {
    pub fn new(backend: B) -> Self {
        let (personas, _) = watch::channel(Vec::new());
        Self { backend, personas }
    }

    /// Subscribe to collection snapshots.
    ///
    /// # Returns
    /// * `watch::Receiver<Vec<PersonaFisica>>` - Read-only view of the collection
    pub fn subscribe(&self) -> watch::Receiver<Vec<PersonaFisica>> {
        self.personas.subscribe()
    }

    /// Current collection.
    #[cfg(test)]
    pub fn snapshot(&self) -> Vec<PersonaFisica> {
        self.personas.borrow().clone()
    }

    /// Fetch the whole collection and publish it.
    ///
    /// # Returns
    /// * `Result<usize, ApiError>` - Number of records loaded
    ///
    /// # Details
    /// Replaces the cached collection wholesale. On failure the previous
    /// snapshot is kept.
    pub async fn get_all_personas_fisicas(&self) -> Result<usize, ApiError> {
        debug!("fetching all personas físicas");
        let personas = self.backend.list().await.inspect_err(|e| {
            warn!(error = %e, "failed to fetch personas físicas");
        })?;
        let count = personas.len();
        self.personas.send_replace(personas);
        info!(count, "personas físicas loaded");
        Ok(count)
    }

    /// Fetch one record and upsert it into the collection.
    pub async fn get_persona_fisica(&self, id: &str) -> Result<PersonaFisica, ApiError> {
        debug!(id, "fetching persona física");
        let persona = self.backend.get(id).await.inspect_err(|e| {
            warn!(id, error = %e, "failed to fetch persona física");
        })?;
        self.upsert(persona.clone());
        Ok(persona)
    }

    /// Delete a record on the backend, then drop it from the collection.
    ///
    /// # Arguments
    /// * `id` - Identifier of the record to delete
    ///
    /// # Details
    /// The collection only changes after the backend confirms the delete.
    pub async fn delete_persona_fisica(&self, id: &str) -> Result<(), ApiError> {
        debug!(id, "deleting persona física");
        self.backend.delete(id).await.inspect_err(|e| {
            warn!(id, error = %e, "failed to delete persona física");
        })?;
        self.personas.send_modify(|personas| personas.retain(|p| p.id != id));
        info!(id, "persona física deleted");
        Ok(())
    }

    /// Create a record and append it to the collection.
    pub async fn create_persona_fisica(
        &self,
        persona: &NewPersonaFisica,
    ) -> Result<PersonaFisica, ApiError> {
        debug!(rfc = %persona.rfc, "creating persona física");
        let created = self.backend.create(persona).await.inspect_err(|e| {
            warn!(error = %e, "failed to create persona física");
        })?;
        self.upsert(created.clone());
        info!(id = %created.id, "persona física created");
        Ok(created)
    }

    /// Replace a record on the backend and in the collection.
    pub async fn update_persona_fisica(
        &self,
        id: &str,
        changes: &NewPersonaFisica,
    ) -> Result<PersonaFisica, ApiError> {
        debug!(id, "updating persona física");
        let updated = self.backend.update(id, changes).await.inspect_err(|e| {
            warn!(id, error = %e, "failed to update persona física");
        })?;
        self.upsert(updated.clone());
        info!(id, "persona física updated");
        Ok(updated)
    }

    fn upsert(&self, persona: PersonaFisica) {
        self.personas.send_modify(|personas| {
            match personas.iter_mut().find(|p| p.id == persona.id) {
                Some(existing) => *existing = persona,
                None => personas.push(persona),
            }
        });
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use reqwest::StatusCode;
    use std::sync::Mutex;

    pub(crate) fn persona(id: &str, nombre: &str) -> PersonaFisica {
        PersonaFisica {
            id: id.to_string(),
            nombre: nombre.to_string(),
            apellido_paterno: "Pérez".to_string(),
            apellido_materno: "Gómez".to_string(),
            rfc: "PEGA800101AB1".to_string(),
            fecha_nacimiento: NaiveDate::from_ymd_opt(1980, 1, 1).unwrap(),
            fecha_registro: Utc.with_ymd_and_hms(2024, 3, 10, 15, 30, 0).unwrap(),
            fecha_actualizacion: Utc.with_ymd_and_hms(2024, 3, 11, 8, 5, 9).unwrap(),
            activo: true,
        }
    }

    /// In-memory backend that records every call.
    #[derive(Default)]
    pub(crate) struct MemoryBackend {
        pub records: Mutex<Vec<PersonaFisica>>,
        pub calls: Mutex<Vec<String>>,
        pub fail_deletes: bool,
    }

    impl MemoryBackend {
        pub fn with(records: Vec<PersonaFisica>) -> Self {
            Self {
                records: Mutex::new(records),
                ..Self::default()
            }
        }

        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }
    }

    impl PersonasBackend for MemoryBackend {
        async fn list(&self) -> Result<Vec<PersonaFisica>, ApiError> {
            self.record("list".to_string());
            Ok(self.records.lock().unwrap().clone())
        }

        async fn get(&self, id: &str) -> Result<PersonaFisica, ApiError> {
            self.record(format!("get {id}"));
            self.records
                .lock()
                .unwrap()
                .iter()
                .find(|p| p.id == id)
                .cloned()
                .ok_or_else(|| ApiError::NotFound(id.to_string()))
        }

        async fn create(&self, new: &NewPersonaFisica) -> Result<PersonaFisica, ApiError> {
            self.record("create".to_string());
            let mut records = self.records.lock().unwrap();
            let mut created = persona(&(records.len() + 100).to_string(), &new.nombre);
            created.rfc = new.rfc.clone();
            records.push(created.clone());
            Ok(created)
        }

        async fn update(
            &self,
            id: &str,
            changes: &NewPersonaFisica,
        ) -> Result<PersonaFisica, ApiError> {
            self.record(format!("update {id}"));
            let mut records = self.records.lock().unwrap();
            let existing = records
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or_else(|| ApiError::NotFound(id.to_string()))?;
            existing.nombre = changes.nombre.clone();
            existing.activo = changes.activo;
            Ok(existing.clone())
        }

        async fn delete(&self, id: &str) -> Result<(), ApiError> {
            self.record(format!("delete {id}"));
            if self.fail_deletes {
                return Err(ApiError::Status {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    body: "boom".to_string(),
                });
            }
            self.records.lock().unwrap().retain(|p| p.id != id);
            Ok(())
        }
    }

    fn new_persona(nombre: &str) -> NewPersonaFisica {
        NewPersonaFisica {
            nombre: nombre.to_string(),
            apellido_paterno: "Pérez".to_string(),
            apellido_materno: String::new(),
            rfc: "PEXX800101AB1".to_string(),
            fecha_nacimiento: NaiveDate::from_ymd_opt(1980, 1, 1).unwrap(),
            activo: true,
        }
    }

    #[tokio::test]
    async fn test_get_all_publishes_snapshot() {
        let store = PersonasStore::new(MemoryBackend::with(vec![
            persona("1", "Ana"),
            persona("2", "Luis"),
        ]));
        let mut rx = store.subscribe();

        let count = store.get_all_personas_fisicas().await.unwrap();
        assert_eq!(count, 2);
        assert!(rx.has_changed().unwrap());
        let ids: Vec<String> = rx.borrow_and_update().iter().map(|p| p.id.clone()).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[tokio::test]
    async fn test_delete_removes_after_backend_confirms() {
        let store = PersonasStore::new(MemoryBackend::with(vec![
            persona("1", "Ana"),
            persona("2", "Luis"),
        ]));
        store.get_all_personas_fisicas().await.unwrap();

        store.delete_persona_fisica("1").await.unwrap();
        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, "2");
        assert_eq!(
            *store.backend.calls.lock().unwrap(),
            vec!["list".to_string(), "delete 1".to_string()]
        );
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_collection() {
        let backend = MemoryBackend {
            fail_deletes: true,
            ..MemoryBackend::with(vec![persona("1", "Ana")])
        };
        let store = PersonasStore::new(backend);
        store.get_all_personas_fisicas().await.unwrap();

        assert!(store.delete_persona_fisica("1").await.is_err());
        assert_eq!(store.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn test_create_and_update_upsert() {
        let store = PersonasStore::new(MemoryBackend::with(vec![persona("1", "Ana")]));
        store.get_all_personas_fisicas().await.unwrap();

        let created = store.create_persona_fisica(&new_persona("Eva")).await.unwrap();
        assert_eq!(store.snapshot().len(), 2);

        let mut changes = new_persona("Eva María");
        changes.activo = false;
        store.update_persona_fisica(&created.id, &changes).await.unwrap();
        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), 2);
        let updated = snapshot.iter().find(|p| p.id == created.id).unwrap();
        assert_eq!(updated.nombre, "Eva María");
        assert!(!updated.activo);
    }

    #[tokio::test]
    async fn test_get_one_inserts_missing_record() {
        let store = PersonasStore::new(MemoryBackend::with(vec![persona("5", "Ana")]));
        let fetched = store.get_persona_fisica("5").await.unwrap();
        assert_eq!(fetched.nombre, "Ana");
        assert_eq!(store.snapshot().len(), 1);
        assert!(matches!(
            store.get_persona_fisica("6").await,
            Err(ApiError::NotFound(_))
        ));
    }
}
