//! Runs UI actions against the store on background tasks.

use crate::api::{PersonasBackend, PersonasStore};
use crate::app::{Action, Completion};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

/// Spawn the store call for `action` and report its result on `tx`.
///
/// # Details
/// `Quit` is handled by the event loop and ignored here. A closed channel
/// means the UI is gone, so the result is dropped.
pub fn spawn_action<B: PersonasBackend>(
    store: &Arc<PersonasStore<B>>,
    action: Action,
    tx: &UnboundedSender<Completion>,
) {
    if action == Action::Quit {
        return;
    }

    let store = Arc::clone(store);
    let tx = tx.clone();
    tokio::spawn(async move {
        let completion = run_action(&store, action).await;
        if let Some(completion) = completion {
            let _ = tx.send(completion);
        }
    });
}

async fn run_action<B: PersonasBackend>(
    store: &PersonasStore<B>,
    action: Action,
) -> Option<Completion> {
    Some(match action {
        Action::FetchAll => Completion::Fetched(store.get_all_personas_fisicas().await),
        Action::FetchOne(id) => {
            let result = store.get_persona_fisica(&id).await;
            Completion::FetchedOne { id, result }
        }
        Action::Delete(id) => {
            let result = store.delete_persona_fisica(&id).await;
            Completion::Deleted { id, result }
        }
        Action::Create(persona) => Completion::Created(store.create_persona_fisica(&persona).await),
        Action::Update { id, changes } => {
            let result = store.update_persona_fisica(&id, &changes).await;
            Completion::Updated { id, result }
        }
        Action::Quit => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::store::tests::{MemoryBackend, persona};
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_delete_action_reports_completion() {
        let store = Arc::new(PersonasStore::new(MemoryBackend::with(vec![
            persona("1", "Ana"),
            persona("2", "Luis"),
        ])));
        let (tx, mut rx) = mpsc::unbounded_channel();

        spawn_action(&store, Action::FetchAll, &tx);
        assert!(matches!(rx.recv().await, Some(Completion::Fetched(Ok(2)))));

        spawn_action(&store, Action::Delete("1".to_string()), &tx);
        match rx.recv().await {
            Some(Completion::Deleted { id, result }) => {
                assert_eq!(id, "1");
                assert!(result.is_ok());
            }
            other => panic!("unexpected completion: {other:?}"),
        }
        assert_eq!(store.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn test_quit_spawns_nothing() {
        let store = Arc::new(PersonasStore::new(MemoryBackend::default()));
        let (tx, mut rx) = mpsc::unbounded_channel();
        spawn_action(&store, Action::Quit, &tx);
        drop(tx);
        assert!(rx.recv().await.is_none());
    }
}
