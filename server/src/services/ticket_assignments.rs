//! Ticket assignment use cases.
//!
//! Creation resolves the event, prices the purchase against the buyer's
//! discount, stores the assignment and hands the inventory update off to the
//! [`InventoryDispatch`]. Corrections and deletions are admin-only. Reads go
//! through the injected caches, which every write clears.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use super::cache::{Cache, MemoryCache, ALL_KEY};
use super::inventory::InventoryDispatch;
use super::pricing::payable_price;
use crate::models::{AssignmentStatus, TicketAssignment};
use crate::repositories::{
    DiscountRepository, EventRepository, TicketAssignmentRepository, UserRepository,
};
use crate::utils::error::AppError;

/// Purchase request for [`TicketAssignmentService::create_one`].
#[derive(Debug, Clone)]
pub struct NewAssignment {
    pub event_id: Uuid,
    pub attendance_id: Uuid,
    pub unit_price: Decimal,
    pub quantity: i32,
    pub ticket_type: String,
    pub expiry_date: Option<DateTime<Utc>>,
    pub status: AssignmentStatus,
}

/// Partial correction applied by [`TicketAssignmentService::update_one`].
#[derive(Debug, Clone, Default)]
pub struct AssignmentChanges {
    pub price: Option<Decimal>,
    pub quantity: Option<i32>,
    pub ticket_type: Option<String>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub status: Option<AssignmentStatus>,
}

#[derive(Clone)]
pub struct AssignmentStores {
    pub events: Arc<dyn EventRepository>,
    pub discounts: Arc<dyn DiscountRepository>,
    pub assignments: Arc<dyn TicketAssignmentRepository>,
    pub users: Arc<dyn UserRepository>,
}

/// Read caches plus the generation that guards refills against a
/// concurrent write clearing them mid-read.
#[derive(Clone)]
pub struct AssignmentCaches {
    pub by_id: Arc<dyn Cache<TicketAssignment>>,
    pub listing: Arc<dyn Cache<Vec<TicketAssignment>>>,
    generation: Arc<Mutex<u64>>,
}

impl Default for AssignmentCaches {
    fn default() -> Self {
        Self::new(Arc::new(MemoryCache::new()), Arc::new(MemoryCache::new()))
    }
}

impl AssignmentCaches {
    pub fn new(
        by_id: Arc<dyn Cache<TicketAssignment>>,
        listing: Arc<dyn Cache<Vec<TicketAssignment>>>,
    ) -> Self {
        Self {
            by_id,
            listing,
            generation: Arc::new(Mutex::new(0)),
        }
    }

    fn generation(&self) -> u64 {
        *self.generation.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn clear(&self) {
        let mut generation = self.generation.lock().unwrap_or_else(PoisonError::into_inner);
        *generation += 1;
        self.by_id.clear();
        self.listing.clear();
    }

    /// Runs `fill` only if no write cleared the caches since `seen` was read.
    fn fill_if_current(&self, seen: u64, fill: impl FnOnce(&Self)) {
        let generation = self.generation.lock().unwrap_or_else(PoisonError::into_inner);
        if *generation == seen {
            fill(self);
        }
    }
}

#[derive(Clone)]
pub struct TicketAssignmentService {
    stores: AssignmentStores,
    inventory: Arc<dyn InventoryDispatch>,
    caches: AssignmentCaches,
}

fn validate_price(price: Decimal) -> Result<(), AppError> {
    if price < Decimal::ZERO {
        return Err(AppError::ValidationError(
            "price must not be negative".to_string(),
        ));
    }
    Ok(())
}

fn validate_quantity(quantity: i32) -> Result<(), AppError> {
    if quantity < 1 {
        return Err(AppError::ValidationError(
            "quantity must be at least 1".to_string(),
        ));
    }
    Ok(())
}

fn validate_ticket_type(ticket_type: &str) -> Result<(), AppError> {
    if ticket_type.trim().is_empty() {
        return Err(AppError::ValidationError(
            "ticket_type must not be empty".to_string(),
        ));
    }
    Ok(())
}

impl TicketAssignmentService {
    pub fn new(
        stores: AssignmentStores,
        inventory: Arc<dyn InventoryDispatch>,
        caches: AssignmentCaches,
    ) -> Self {
        Self {
            stores,
            inventory,
            caches,
        }
    }

    pub async fn create_one(
        &self,
        actor: Uuid,
        request: NewAssignment,
    ) -> Result<TicketAssignment, AppError> {
        validate_price(request.unit_price)?;
        validate_quantity(request.quantity)?;
        validate_ticket_type(&request.ticket_type)?;

        let event = self
            .stores
            .events
            .find_by_id(request.event_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("event {} not found", request.event_id)))?;

        let now = Utc::now();
        let discount = self
            .stores
            .discounts
            .find_applicable(actor, event.id, now)
            .await?;
        let price = payable_price(request.unit_price, discount.as_ref()).ok_or_else(|| {
            AppError::ValidationError("discounted price is out of range".to_string())
        })?;

        let assignment = TicketAssignment {
            id: Uuid::new_v4(),
            event_id: event.id,
            attendance_id: request.attendance_id,
            price,
            quantity: request.quantity,
            ticket_type: request.ticket_type,
            purchase_date: now,
            expiry_date: request.expiry_date,
            status: request.status,
            created_at: now,
            updated_at: now,
        };
        self.stores.assignments.insert(&assignment).await?;

        self.inventory.record_sale(event.id);
        self.caches.clear();

        info!(
            assignment_id = %assignment.id,
            event_id = %event.id,
            %price,
            discounted = discount.is_some(),
            "Ticket assignment created"
        );
        Ok(assignment)
    }

    pub async fn update_one(
        &self,
        actor: Uuid,
        id: Uuid,
        changes: AssignmentChanges,
    ) -> Result<TicketAssignment, AppError> {
        self.require_admin(actor).await?;

        if let Some(price) = changes.price {
            validate_price(price)?;
        }
        if let Some(quantity) = changes.quantity {
            validate_quantity(quantity)?;
        }
        if let Some(ticket_type) = &changes.ticket_type {
            validate_ticket_type(ticket_type)?;
        }

        let mut assignment = self
            .stores
            .assignments
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("ticket assignment {id} not found")))?;

        if let Some(price) = changes.price {
            assignment.price = price;
        }
        if let Some(quantity) = changes.quantity {
            assignment.quantity = quantity;
        }
        if let Some(ticket_type) = changes.ticket_type {
            assignment.ticket_type = ticket_type;
        }
        if let Some(expiry_date) = changes.expiry_date {
            assignment.expiry_date = Some(expiry_date);
        }
        if let Some(status) = changes.status {
            assignment.status = status;
        }
        assignment.updated_at = Utc::now();

        if !self.stores.assignments.update(&assignment).await? {
            return Err(AppError::NotFound(format!(
                "ticket assignment {id} not found"
            )));
        }
        self.caches.clear();

        info!(assignment_id = %id, %actor, "Ticket assignment updated");
        Ok(assignment)
    }

    pub async fn delete_one(&self, actor: Uuid, id: Uuid) -> Result<(), AppError> {
        self.require_admin(actor).await?;

        if !self.stores.assignments.delete(id).await? {
            return Err(AppError::NotFound(format!(
                "ticket assignment {id} not found"
            )));
        }
        self.caches.clear();

        info!(assignment_id = %id, %actor, "Ticket assignment deleted");
        Ok(())
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<TicketAssignment, AppError> {
        let key = id.to_string();
        if let Some(cached) = self.caches.by_id.get(&key) {
            return Ok(cached);
        }

        let seen = self.caches.generation();
        let assignment = self
            .stores
            .assignments
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("ticket assignment {id} not found")))?;
        self.caches
            .fill_if_current(seen, |caches| caches.by_id.set(&key, assignment.clone()));
        Ok(assignment)
    }

    pub async fn get_all(&self) -> Result<Vec<TicketAssignment>, AppError> {
        if let Some(cached) = self.caches.listing.get(ALL_KEY) {
            return Ok(cached);
        }

        let seen = self.caches.generation();
        let assignments = self.stores.assignments.list_all().await?;
        self.caches
            .fill_if_current(seen, |caches| caches.listing.set(ALL_KEY, assignments.clone()));
        Ok(assignments)
    }

    pub async fn get_by_event_id(&self, event_id: Uuid) -> Result<Vec<TicketAssignment>, AppError> {
        Ok(self.stores.assignments.list_by_event_id(event_id).await?)
    }

    async fn require_admin(&self, actor: Uuid) -> Result<(), AppError> {
        let user = self
            .stores
            .users
            .find_by_id(actor)
            .await?
            .ok_or_else(|| AppError::AuthError(format!("user {actor} not recognised")))?;

        if !user.role.is_admin() {
            return Err(AppError::Forbidden(
                "admin role required to modify ticket assignments".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "ticket_assignments_tests.rs"]
mod tests;
