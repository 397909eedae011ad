// src/tasks.rs
//! One submission slot per kind. Starting a submission retires whatever was
//! in flight for that kind, so only the newest one may publish results.

use std::collections::HashMap;
use std::sync::Mutex;
use tokio::task::AbortHandle;
use uuid::Uuid;

use crate::state::SubmissionKind;

/// Identifies one submission attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub kind: SubmissionKind,
    pub generation: u64,
    pub id: Uuid,
}

#[derive(Default)]
struct Slot {
    generation: u64,
    running: Option<AbortHandle>,
}

#[derive(Default)]
pub struct SubmissionSlots {
    slots: Mutex<HashMap<SubmissionKind, Slot>>,
}

impl SubmissionSlots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Supersedes the in-flight submission of `kind` (aborting its task) and
    /// hands out a ticket for the next one.
    pub fn begin(&self, kind: SubmissionKind) -> Ticket {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        let slot = slots.entry(kind).or_default();
        if let Some(previous) = slot.running.take() {
            log::info!("Superseding in-flight {:?} submission #{}", kind, slot.generation);
            previous.abort();
        }
        slot.generation += 1;
        Ticket { kind, generation: slot.generation, id: Uuid::new_v4() }
    }

    /// Records the task running `ticket`. Ignored if the ticket is already stale.
    pub fn attach(&self, ticket: &Ticket, handle: AbortHandle) {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        match slots.get_mut(&ticket.kind) {
            Some(slot) if slot.generation == ticket.generation => slot.running = Some(handle),
            _ => handle.abort(),
        }
    }

    pub fn is_current(&self, ticket: &Ticket) -> bool {
        let slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots.get(&ticket.kind).is_some_and(|slot| slot.generation == ticket.generation)
    }

    /// Forgets the task handle once `ticket` has finished.
    pub fn complete(&self, ticket: &Ticket) {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(slot) = slots.get_mut(&ticket.kind) {
            if slot.generation == ticket.generation {
                slot.running = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_generations_are_per_kind() {
        let slots = SubmissionSlots::new();
        let a = slots.begin(SubmissionKind::Classify);
        let b = slots.begin(SubmissionKind::Upload);
        assert_eq!(a.generation, 1);
        assert_eq!(b.generation, 1);
        assert!(slots.is_current(&a));

        let c = slots.begin(SubmissionKind::Classify);
        assert!(!slots.is_current(&a));
        assert!(slots.is_current(&c));
        assert!(slots.is_current(&b));
    }

    #[tokio::test]
    async fn test_begin_aborts_previous_task() {
        let slots = SubmissionSlots::new();
        let first = slots.begin(SubmissionKind::Upload);
        let handle = tokio::spawn(async {
            tokio::time::sleep(Duration::from_secs(60)).await;
        });
        slots.attach(&first, handle.abort_handle());
        assert!(!handle.is_finished());

        let _second = slots.begin(SubmissionKind::Upload);
        let joined = handle.await;
        assert!(joined.unwrap_err().is_cancelled());
    }

    #[tokio::test]
    async fn test_attach_with_stale_ticket_aborts() {
        let slots = SubmissionSlots::new();
        let stale = slots.begin(SubmissionKind::Classify);
        let _fresh = slots.begin(SubmissionKind::Classify);

        let handle = tokio::spawn(async {
            tokio::time::sleep(Duration::from_secs(60)).await;
        });
        slots.attach(&stale, handle.abort_handle());
        assert!(handle.await.unwrap_err().is_cancelled());
    }
}
