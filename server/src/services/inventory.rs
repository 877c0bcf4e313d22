//! Best-effort inventory bookkeeping after a ticket sale.
//!
//! Each sale is dispatched onto a detached task with its own deadline. The
//! caller never waits for it, nothing is retried, and failures are only
//! logged: a crash or timeout leaves the sold counter one short.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::repositories::EventTicketRepository;

#[cfg_attr(test, mockall::automock)]
pub trait InventoryDispatch: Send + Sync {
    /// Record one sold ticket for `event_id` without waiting for the result.
    fn record_sale(&self, event_id: Uuid);
}

#[derive(Clone)]
pub struct InventoryUpdater {
    tickets: Arc<dyn EventTicketRepository>,
    timeout: Duration,
}

impl InventoryUpdater {
    pub fn new(tickets: Arc<dyn EventTicketRepository>, timeout: Duration) -> Self {
        Self { tickets, timeout }
    }

    /// Spawn the update and hand back its handle.
    pub fn spawn_sale(&self, event_id: Uuid) -> JoinHandle<()> {
        let tickets = Arc::clone(&self.tickets);
        let timeout = self.timeout;

        tokio::spawn(async move {
            match tokio::time::timeout(timeout, tickets.update_quantity(event_id)).await {
                Ok(Ok(Some(ticket))) => debug!(
                    %event_id,
                    sold = ticket.sold_quantity,
                    status = %ticket.status,
                    "Inventory sale recorded"
                ),
                Ok(Ok(None)) => warn!(%event_id, "No inventory record for event"),
                Ok(Err(e)) => warn!(%event_id, error = %e, "Inventory update failed"),
                Err(_) => warn!(%event_id, ?timeout, "Inventory update timed out"),
            }
        })
    }
}

impl InventoryDispatch for InventoryUpdater {
    fn record_sale(&self, event_id: Uuid) {
        drop(self.spawn_sale(event_id));
    }
}
