//! HTTP handlers for `/api/v1/event-ticket-assignments`.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use super::auth::AuthUser;
use crate::models::AssignmentStatus;
use crate::services::{AssignmentChanges, NewAssignment};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{empty_success, success};

#[derive(Debug, Deserialize)]
pub struct CreateTicketAssignmentRequest {
    pub event_id: Uuid,
    pub attendance_id: Uuid,
    /// Unit price before any discount.
    pub price: Decimal,
    pub quantity: i32,
    pub ticket_type: String,
    #[serde(default)]
    pub expiry_date: Option<DateTime<Utc>>,
    pub status: AssignmentStatus,
}

impl From<CreateTicketAssignmentRequest> for NewAssignment {
    fn from(request: CreateTicketAssignmentRequest) -> Self {
        NewAssignment {
            event_id: request.event_id,
            attendance_id: request.attendance_id,
            unit_price: request.price,
            quantity: request.quantity,
            ticket_type: request.ticket_type,
            expiry_date: request.expiry_date,
            status: request.status,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateTicketAssignmentRequest {
    pub price: Option<Decimal>,
    pub quantity: Option<i32>,
    pub ticket_type: Option<String>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub status: Option<AssignmentStatus>,
}

impl From<UpdateTicketAssignmentRequest> for AssignmentChanges {
    fn from(request: UpdateTicketAssignmentRequest) -> Self {
        AssignmentChanges {
            price: request.price,
            quantity: request.quantity,
            ticket_type: request.ticket_type,
            expiry_date: request.expiry_date,
            status: request.status,
        }
    }
}

pub async fn create_assignment(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
    payload: Result<Json<CreateTicketAssignmentRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = payload?;
    state.assignments.create_one(actor, request.into()).await?;
    Ok(empty_success().into_response())
}

pub async fn list_assignments(
    _user: AuthUser,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let assignments = state.assignments.get_all().await?;
    Ok(success(assignments).into_response())
}

pub async fn get_assignment(
    _user: AuthUser,
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Response, AppError> {
    let Path(id) = path?;
    let assignment = state.assignments.get_by_id(id).await?;
    Ok(success(assignment).into_response())
}

pub async fn list_assignments_for_event(
    _user: AuthUser,
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Response, AppError> {
    let Path(event_id) = path?;
    let assignments = state.assignments.get_by_event_id(event_id).await?;
    Ok(success(assignments).into_response())
}

pub async fn update_assignment(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateTicketAssignmentRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Path(id) = path?;
    let Json(request) = payload?;
    state
        .assignments
        .update_one(actor, id, request.into())
        .await?;
    Ok(empty_success().into_response())
}

pub async fn delete_assignment(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Response, AppError> {
    let Path(id) = path?;
    state.assignments.delete_one(actor, id).await?;
    Ok(empty_success().into_response())
}
