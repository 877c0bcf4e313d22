//! Storage ports used by the ticket assignment service.
//!
//! Each trait is a narrow contract over one collection. Adapters live in
//! [`postgres`]; tests use the in-memory adapters in `memory`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Discount, Event, EventTicket, TicketAssignment, User};

#[cfg(test)]
pub mod memory;
pub mod postgres;

/// Errors raised by repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// The backing store could not be reached.
    #[error("repository connection failed: {0}")]
    Connection(String),
    /// A query or mutation failed, or a stored row could not be decoded.
    #[error("repository query failed: {0}")]
    Query(String),
}

impl RepositoryError {
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    pub fn query(message: impl Into<String>) -> Self {
        Self::Query(message.into())
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Event>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DiscountRepository: Send + Sync {
    /// Find a discount for `user_id` on `event_id` whose window contains `at`.
    async fn find_applicable(
        &self,
        user_id: Uuid,
        event_id: Uuid,
        at: DateTime<Utc>,
    ) -> RepositoryResult<Option<Discount>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventTicketRepository: Send + Sync {
    /// Add one sold ticket to the event's inventory in a single store-side
    /// step, marking it sold out once nothing remains. Returns the updated
    /// record, or `None` when the event has no inventory.
    async fn update_quantity(&self, event_id: Uuid) -> RepositoryResult<Option<EventTicket>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TicketAssignmentRepository: Send + Sync {
    async fn insert(&self, assignment: &TicketAssignment) -> RepositoryResult<()>;

    /// Overwrite an existing assignment. Returns `false` when no row matched.
    async fn update(&self, assignment: &TicketAssignment) -> RepositoryResult<bool>;

    /// Remove an assignment. Returns `false` when no row matched.
    async fn delete(&self, id: Uuid) -> RepositoryResult<bool>;

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<TicketAssignment>>;

    async fn list_all(&self) -> RepositoryResult<Vec<TicketAssignment>>;

    async fn list_by_event_id(&self, event_id: Uuid) -> RepositoryResult<Vec<TicketAssignment>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<User>>;
}
