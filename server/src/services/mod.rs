pub mod cache;
pub mod inventory;
pub mod pricing;
pub mod ticket_assignments;

pub use cache::{Cache, MemoryCache};
pub use inventory::{InventoryDispatch, InventoryUpdater};
pub use ticket_assignments::{
    AssignmentCaches, AssignmentChanges, AssignmentStores, NewAssignment, TicketAssignmentService,
};
