use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::repositories::postgres::{
    PgDiscountRepository, PgEventRepository, PgEventTicketRepository,
    PgTicketAssignmentRepository, PgUserRepository,
};
use crate::services::{
    AssignmentCaches, AssignmentStores, InventoryUpdater, TicketAssignmentService,
};

#[derive(Clone)]
pub struct AppState {
    pub assignments: TicketAssignmentService,
}

impl AppState {
    pub fn new(assignments: TicketAssignmentService) -> Self {
        Self { assignments }
    }

    /// Wire the PostgreSQL adapters, inventory updater and caches together.
    pub fn from_pool(pool: PgPool, config: &Config) -> Self {
        let stores = AssignmentStores {
            events: Arc::new(PgEventRepository::new(pool.clone())),
            discounts: Arc::new(PgDiscountRepository::new(pool.clone())),
            assignments: Arc::new(PgTicketAssignmentRepository::new(pool.clone())),
            users: Arc::new(PgUserRepository::new(pool.clone())),
        };
        let inventory = InventoryUpdater::new(
            Arc::new(PgEventTicketRepository::new(pool)),
            config.inventory_update_timeout,
        );

        Self::new(TicketAssignmentService::new(
            stores,
            Arc::new(inventory),
            AssignmentCaches::default(),
        ))
    }
}
