pub mod discount;
pub mod event;
pub mod ticket;
pub mod user;

pub use discount::{Discount, DiscountUnit};
pub use event::Event;
pub use ticket::{AssignmentStatus, EventTicket, InventoryStatus, TicketAssignment};
pub use user::{Role, User};
