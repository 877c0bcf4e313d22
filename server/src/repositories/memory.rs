//! In-memory adapters backing router and service tests.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{
    DiscountRepository, EventRepository, EventTicketRepository, RepositoryResult,
    TicketAssignmentRepository, UserRepository,
};
use crate::models::{Discount, Event, EventTicket, TicketAssignment, User};

#[derive(Clone, Default)]
pub struct InMemoryStore {
    events: Arc<RwLock<HashMap<Uuid, Event>>>,
    discounts: Arc<RwLock<Vec<Discount>>>,
    tickets: Arc<RwLock<HashMap<Uuid, EventTicket>>>,
    assignments: Arc<RwLock<HashMap<Uuid, TicketAssignment>>>,
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_event(&self, event: Event) {
        self.events.write().unwrap().insert(event.id, event);
    }

    pub fn put_discount(&self, discount: Discount) {
        self.discounts.write().unwrap().push(discount);
    }

    pub fn put_ticket(&self, ticket: EventTicket) {
        self.tickets.write().unwrap().insert(ticket.id, ticket);
    }

    pub fn put_assignment(&self, assignment: TicketAssignment) {
        self.assignments
            .write()
            .unwrap()
            .insert(assignment.id, assignment);
    }

    pub fn put_user(&self, user: User) {
        self.users.write().unwrap().insert(user.id, user);
    }

    pub fn ticket(&self, id: Uuid) -> Option<EventTicket> {
        self.tickets.read().unwrap().get(&id).cloned()
    }

    pub fn assignment(&self, id: Uuid) -> Option<TicketAssignment> {
        self.assignments.read().unwrap().get(&id).cloned()
    }

    pub fn assignment_count(&self) -> usize {
        self.assignments.read().unwrap().len()
    }
}

#[async_trait]
impl EventRepository for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Event>> {
        Ok(self.events.read().unwrap().get(&id).cloned())
    }
}

#[async_trait]
impl DiscountRepository for InMemoryStore {
    async fn find_applicable(
        &self,
        user_id: Uuid,
        event_id: Uuid,
        at: DateTime<Utc>,
    ) -> RepositoryResult<Option<Discount>> {
        Ok(self
            .discounts
            .read()
            .unwrap()
            .iter()
            .find(|d| d.user_id == user_id && d.event_id == event_id && d.is_applicable_at(at))
            .cloned())
    }
}

#[async_trait]
impl EventTicketRepository for InMemoryStore {
    async fn update_quantity(&self, event_id: Uuid) -> RepositoryResult<Option<EventTicket>> {
        let mut tickets = self.tickets.write().unwrap();
        let Some(stored) = tickets.values_mut().find(|t| t.event_id == event_id) else {
            return Ok(None);
        };
        stored.record_sale();
        Ok(Some(stored.clone()))
    }
}

#[async_trait]
impl TicketAssignmentRepository for InMemoryStore {
    async fn insert(&self, assignment: &TicketAssignment) -> RepositoryResult<()> {
        self.put_assignment(assignment.clone());
        Ok(())
    }

    async fn update(&self, assignment: &TicketAssignment) -> RepositoryResult<bool> {
        let mut assignments = self.assignments.write().unwrap();
        match assignments.get_mut(&assignment.id) {
            Some(stored) => {
                *stored = assignment.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<bool> {
        Ok(self.assignments.write().unwrap().remove(&id).is_some())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<TicketAssignment>> {
        Ok(self.assignment(id))
    }

    async fn list_all(&self) -> RepositoryResult<Vec<TicketAssignment>> {
        let mut all: Vec<_> = self.assignments.read().unwrap().values().cloned().collect();
        all.sort_by(|a, b| b.purchase_date.cmp(&a.purchase_date));
        Ok(all)
    }

    async fn list_by_event_id(&self, event_id: Uuid) -> RepositoryResult<Vec<TicketAssignment>> {
        let mut matching: Vec<_> = self
            .assignments
            .read()
            .unwrap()
            .values()
            .filter(|a| a.event_id == event_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.purchase_date.cmp(&a.purchase_date));
        Ok(matching)
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<User>> {
        Ok(self.users.read().unwrap().get(&id).cloned())
    }
}
