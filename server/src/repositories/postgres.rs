//! PostgreSQL adapters for the repository ports.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{
    DiscountRepository, EventRepository, EventTicketRepository, RepositoryError,
    RepositoryResult, TicketAssignmentRepository, UserRepository,
};
use crate::models::{Discount, Event, EventTicket, InventoryStatus, TicketAssignment, User};

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                RepositoryError::connection(err.to_string())
            }
            other => RepositoryError::query(other.to_string()),
        }
    }
}

fn decode<T>(value: &str) -> RepositoryResult<T>
where
    T: std::str::FromStr<Err = String>,
{
    value.parse().map_err(RepositoryError::query)
}

#[derive(Debug, FromRow)]
struct DiscountRow {
    id: Uuid,
    event_id: Uuid,
    user_id: Uuid,
    value: Decimal,
    unit: String,
    valid_from: DateTime<Utc>,
    valid_until: DateTime<Utc>,
}

impl TryFrom<DiscountRow> for Discount {
    type Error = RepositoryError;

    fn try_from(row: DiscountRow) -> Result<Self, Self::Error> {
        Ok(Discount {
            id: row.id,
            event_id: row.event_id,
            user_id: row.user_id,
            value: row.value,
            unit: decode(&row.unit)?,
            valid_from: row.valid_from,
            valid_until: row.valid_until,
        })
    }
}

#[derive(Debug, FromRow)]
struct EventTicketRow {
    id: Uuid,
    event_id: Uuid,
    total_quantity: i32,
    sold_quantity: i32,
    status: String,
}

impl TryFrom<EventTicketRow> for EventTicket {
    type Error = RepositoryError;

    fn try_from(row: EventTicketRow) -> Result<Self, Self::Error> {
        Ok(EventTicket {
            id: row.id,
            event_id: row.event_id,
            total_quantity: row.total_quantity,
            sold_quantity: row.sold_quantity,
            status: decode(&row.status)?,
        })
    }
}

#[derive(Debug, FromRow)]
struct TicketAssignmentRow {
    id: Uuid,
    event_id: Uuid,
    attendance_id: Uuid,
    price: Decimal,
    quantity: i32,
    ticket_type: String,
    purchase_date: DateTime<Utc>,
    expiry_date: Option<DateTime<Utc>>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TicketAssignmentRow> for TicketAssignment {
    type Error = RepositoryError;

    fn try_from(row: TicketAssignmentRow) -> Result<Self, Self::Error> {
        Ok(TicketAssignment {
            id: row.id,
            event_id: row.event_id,
            attendance_id: row.attendance_id,
            price: row.price,
            quantity: row.quantity,
            ticket_type: row.ticket_type,
            purchase_date: row.purchase_date,
            expiry_date: row.expiry_date,
            status: decode(&row.status)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id,
            name: row.name,
            email: row.email,
            role: decode(&row.role)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const ASSIGNMENT_COLUMNS: &str = "id, event_id, attendance_id, price, quantity, ticket_type, \
     purchase_date, expiry_date, status, created_at, updated_at";

#[derive(Clone)]
pub struct PgEventRepository {
    pool: PgPool,
}

impl PgEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventRepository for PgEventRepository {
    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Event>> {
        let event = sqlx::query_as::<_, Event>(
            "SELECT id, organizer_id, venue_id, title, start_time, end_time, capacity,
                    created_at, updated_at
             FROM events WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(event)
    }
}

#[derive(Clone)]
pub struct PgDiscountRepository {
    pool: PgPool,
}

impl PgDiscountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DiscountRepository for PgDiscountRepository {
    async fn find_applicable(
        &self,
        user_id: Uuid,
        event_id: Uuid,
        at: DateTime<Utc>,
    ) -> RepositoryResult<Option<Discount>> {
        let row = sqlx::query_as::<_, DiscountRow>(
            "SELECT id, event_id, user_id, value, unit, valid_from, valid_until
             FROM discounts
             WHERE user_id = $1 AND event_id = $2 AND valid_from <= $3 AND valid_until > $3
             ORDER BY valid_from DESC
             LIMIT 1",
        )
        .bind(user_id)
        .bind(event_id)
        .bind(at)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Discount::try_from).transpose()
    }
}

#[derive(Clone)]
pub struct PgEventTicketRepository {
    pool: PgPool,
}

impl PgEventTicketRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventTicketRepository for PgEventTicketRepository {
    async fn update_quantity(&self, event_id: Uuid) -> RepositoryResult<Option<EventTicket>> {
        // Row lock taken by the UPDATE serialises concurrent sales.
        let row = sqlx::query_as::<_, EventTicketRow>(
            "UPDATE event_tickets
             SET sold_quantity = sold_quantity + 1,
                 status = CASE WHEN total_quantity - (sold_quantity + 1) <= 0
                               THEN $2 ELSE status END,
                 updated_at = NOW()
             WHERE event_id = $1
             RETURNING id, event_id, total_quantity, sold_quantity, status",
        )
        .bind(event_id)
        .bind(InventoryStatus::SoldOut.as_str())
        .fetch_optional(&self.pool)
        .await?;
        row.map(EventTicket::try_from).transpose()
    }
}

#[derive(Clone)]
pub struct PgTicketAssignmentRepository {
    pool: PgPool,
}

impl PgTicketAssignmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TicketAssignmentRepository for PgTicketAssignmentRepository {
    async fn insert(&self, assignment: &TicketAssignment) -> RepositoryResult<()> {
        sqlx::query(
            "INSERT INTO ticket_assignments
                (id, event_id, attendance_id, price, quantity, ticket_type,
                 purchase_date, expiry_date, status, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(assignment.id)
        .bind(assignment.event_id)
        .bind(assignment.attendance_id)
        .bind(assignment.price)
        .bind(assignment.quantity)
        .bind(&assignment.ticket_type)
        .bind(assignment.purchase_date)
        .bind(assignment.expiry_date)
        .bind(assignment.status.as_str())
        .bind(assignment.created_at)
        .bind(assignment.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update(&self, assignment: &TicketAssignment) -> RepositoryResult<bool> {
        let result = sqlx::query(
            "UPDATE ticket_assignments
             SET price = $2, quantity = $3, ticket_type = $4, expiry_date = $5,
                 status = $6, updated_at = $7
             WHERE id = $1",
        )
        .bind(assignment.id)
        .bind(assignment.price)
        .bind(assignment.quantity)
        .bind(&assignment.ticket_type)
        .bind(assignment.expiry_date)
        .bind(assignment.status.as_str())
        .bind(assignment.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<bool> {
        let result = sqlx::query("DELETE FROM ticket_assignments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<TicketAssignment>> {
        let row = sqlx::query_as::<_, TicketAssignmentRow>(&format!(
            "SELECT {ASSIGNMENT_COLUMNS} FROM ticket_assignments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(TicketAssignment::try_from).transpose()
    }

    async fn list_all(&self) -> RepositoryResult<Vec<TicketAssignment>> {
        let rows = sqlx::query_as::<_, TicketAssignmentRow>(&format!(
            "SELECT {ASSIGNMENT_COLUMNS} FROM ticket_assignments ORDER BY purchase_date DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(TicketAssignment::try_from).collect()
    }

    async fn list_by_event_id(&self, event_id: Uuid) -> RepositoryResult<Vec<TicketAssignment>> {
        let rows = sqlx::query_as::<_, TicketAssignmentRow>(&format!(
            "SELECT {ASSIGNMENT_COLUMNS} FROM ticket_assignments
             WHERE event_id = $1 ORDER BY purchase_date DESC"
        ))
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(TicketAssignment::try_from).collect()
    }
}

#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, email, role, created_at, updated_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(User::try_from).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AssignmentStatus, InventoryStatus};

    #[test]
    fn test_pool_timeout_maps_to_connection_error() {
        let err = RepositoryError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, RepositoryError::Connection(_)));
    }

    #[test]
    fn test_row_not_found_maps_to_query_error() {
        let err = RepositoryError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, RepositoryError::Query(_)));
    }

    #[test]
    fn test_assignment_row_decodes_status() {
        let now = Utc::now();
        let row = TicketAssignmentRow {
            id: Uuid::new_v4(),
            event_id: Uuid::new_v4(),
            attendance_id: Uuid::new_v4(),
            price: Decimal::from(80),
            quantity: 3,
            ticket_type: "vip".to_string(),
            purchase_date: now,
            expiry_date: None,
            status: "useless".to_string(),
            created_at: now,
            updated_at: now,
        };

        let assignment = TicketAssignment::try_from(row).expect("valid row");
        assert_eq!(assignment.status, AssignmentStatus::Useless);
        assert_eq!(assignment.price, Decimal::from(80));
    }

    #[test]
    fn test_unknown_stored_value_is_query_error() {
        let row = EventTicketRow {
            id: Uuid::new_v4(),
            event_id: Uuid::new_v4(),
            total_quantity: 5,
            sold_quantity: 0,
            status: "paused".to_string(),
        };
        let err = EventTicket::try_from(row).expect_err("unknown status");
        assert!(matches!(err, RepositoryError::Query(_)));

        let row = EventTicketRow {
            id: Uuid::new_v4(),
            event_id: Uuid::new_v4(),
            total_quantity: 5,
            sold_quantity: 5,
            status: "sold_out".to_string(),
        };
        let ticket = EventTicket::try_from(row).expect("valid row");
        assert_eq!(ticket.status, InventoryStatus::SoldOut);
    }
}
