// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::mem;

use crate::ids::RowId;
use crate::record::Record;
use crate::store::{Persistence, RecordStore, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingChange<'a, S> {
    pub subject_id: &'a RowId,
    pub from: S,
    pub to: S,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateState<S> {
    Idle,
    Pending {
        subject_id: RowId,
        from: S,
        to: S,
    },
}

/// Holds at most one status change until it is confirmed or cancelled.
#[derive(Debug, Clone)]
pub struct ConfirmationGate<R: Record> {
    state: GateState<R::Status>,
}

impl<R: Record> Default for ConfirmationGate<R> {
    fn default() -> Self {
        Self {
            state: GateState::Idle,
        }
    }
}

impl<R: Record> ConfirmationGate<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &GateState<R::Status> {
        &self.state
    }

    pub fn pending(&self) -> Option<PendingChange<'_, R::Status>> {
        match &self.state {
            GateState::Idle => None,
            GateState::Pending {
                subject_id,
                from,
                to,
            } => Some(PendingChange {
                subject_id,
                from: *from,
                to: *to,
            }),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, GateState::Idle)
    }

    /// Parks the change; a newer request replaces any pending one.
    pub fn request(&mut self, row: &R, to: R::Status) {
        if let GateState::Pending { subject_id, .. } = &self.state {
            tracing::debug!(
                entity = R::KIND.as_str(),
                replaced = %subject_id,
                "replacing pending confirmation"
            );
        }
        self.state = GateState::Pending {
            subject_id: row.id().clone(),
            from: row.status(),
            to,
        };
    }

    /// Applies the pending change exactly once; `Ok(None)` when nothing was pending.
    pub fn confirm<P: Persistence<R>>(
        &mut self,
        store: &mut RecordStore<R, P>,
    ) -> Result<Option<R>, StoreError> {
        match mem::replace(&mut self.state, GateState::Idle) {
            GateState::Idle => Ok(None),
            GateState::Pending { subject_id, to, .. } => store
                .update_one(&subject_id, R::status_patch(to))
                .map(Some),
        }
    }

    pub fn cancel(&mut self) {
        self.state = GateState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfirmationGate, GateState};
    use crate::ids::RowId;
    use crate::model::{Client, ClientStatus, DealType, NewClient};
    use crate::store::{RecordStore, StoreError};
    use time::{Date, Month};

    fn store() -> anyhow::Result<RecordStore<Client>> {
        let next_payment = Date::from_calendar_date(2025, Month::July, 15)?;
        let rows = ["C-1", "C-2"]
            .into_iter()
            .map(|id| {
                Client::from_new(
                    RowId::from(id),
                    NewClient {
                        client_number: id.to_owned(),
                        name: format!("Client {id}"),
                        property_name: "Oak Residence".to_owned(),
                        property_address: "456 Oak Ave".to_owned(),
                        deal: DealType::Buy,
                        amount_cents: 150_000,
                        next_payment,
                        status: ClientStatus::OnGoing,
                    },
                )
            })
            .collect();
        Ok(RecordStore::from_rows(rows)?)
    }

    #[test]
    fn request_does_not_mutate() -> anyhow::Result<()> {
        let store = store()?;
        let mut gate = ConfirmationGate::<Client>::new();
        gate.request(&store.list()[0], ClientStatus::Completed);
        assert!(!gate.is_idle());
        assert_eq!(store.list()[0].status, ClientStatus::OnGoing);
        Ok(())
    }

    #[test]
    fn second_request_replaces_first() -> anyhow::Result<()> {
        let mut store = store()?;
        let mut gate = ConfirmationGate::<Client>::new();
        gate.request(&store.list()[0], ClientStatus::Completed);
        gate.request(&store.list()[1], ClientStatus::Overdue);

        let pending = gate.pending().map(|change| (change.subject_id.clone(), change.to));
        assert_eq!(pending, Some((RowId::from("C-2"), ClientStatus::Overdue)));

        let committed = gate.confirm(&mut store)?;
        assert_eq!(committed.map(|row| row.id), Some(RowId::from("C-2")));
        assert_eq!(store.list()[0].status, ClientStatus::OnGoing);
        assert_eq!(store.list()[1].status, ClientStatus::Overdue);
        assert_eq!(gate.state(), &GateState::Idle);
        Ok(())
    }

    #[test]
    fn confirm_applies_exactly_once() -> anyhow::Result<()> {
        let mut store = store()?;
        let mut gate = ConfirmationGate::<Client>::new();
        gate.request(&store.list()[0], ClientStatus::Completed);
        assert!(gate.confirm(&mut store)?.is_some());
        assert!(gate.confirm(&mut store)?.is_none());
        Ok(())
    }

    #[test]
    fn cancel_discards_pending_change() -> anyhow::Result<()> {
        let mut store = store()?;
        let mut gate = ConfirmationGate::<Client>::new();
        gate.request(&store.list()[0], ClientStatus::Completed);
        gate.cancel();
        assert!(gate.confirm(&mut store)?.is_none());
        assert_eq!(store.list()[0].status, ClientStatus::OnGoing);
        Ok(())
    }

    #[test]
    fn confirm_surfaces_missing_row_and_returns_to_idle() -> anyhow::Result<()> {
        let mut store = store()?;
        let mut gate = ConfirmationGate::<Client>::new();
        let mut stray = store.list()[0].clone();
        stray.id = RowId::from("C-404");
        gate.request(&stray, ClientStatus::Completed);

        let result = gate.confirm(&mut store);
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
        assert!(gate.is_idle());
        Ok(())
    }
}
