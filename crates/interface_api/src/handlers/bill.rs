//! Bill handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use core_kernel::BillId;
use domain_bill::{
    AddLineItemRequest, CreateBillRequest, Currency, ListAllBillsRequest, ListBillsRequest,
};

use crate::dto::bill::*;
use crate::{error::ApiError, AppState};

/// Opens a new bill and starts its workflow.
pub async fn create_bill(
    State(state): State<AppState>,
    Json(body): Json<CreateBillBody>,
) -> Result<(StatusCode, Json<CreateBillResponse>), ApiError> {
    let currency = Currency::from_code(&body.currency)?;
    let bill_id = state
        .service
        .create_bill(CreateBillRequest {
            customer_id: body.customer_id,
            currency,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(CreateBillResponse {
            bill_id: bill_id.to_string(),
        }),
    ))
}

/// Appends a line item to an open bill.
pub async fn add_line_item(
    State(state): State<AppState>,
    Path(bill_id): Path<String>,
    Json(body): Json<AddLineItemBody>,
) -> Result<StatusCode, ApiError> {
    state
        .service
        .add_line_item(
            &BillId::from(bill_id),
            AddLineItemRequest {
                description: body.description,
                amount: body.amount,
            },
        )
        .await?;
    Ok(StatusCode::OK)
}

/// Requests the close transition for an open bill.
pub async fn close_bill(
    State(state): State<AppState>,
    Path(bill_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.service.close_bill(&BillId::from(bill_id)).await?;
    Ok(StatusCode::OK)
}

/// Gets a bill with its line items.
pub async fn get_bill(
    State(state): State<AppState>,
    Path(bill_id): Path<String>,
) -> Result<Json<BillResponse>, ApiError> {
    let bill = state.service.get_bill(&BillId::from(bill_id)).await?;
    Ok(Json(bill.into()))
}

/// Lists one customer's bills.
pub async fn list_bills(
    State(state): State<AppState>,
    Path(customer_id): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListBillsApiResponse>, ApiError> {
    let status = query.status_filter()?;
    let page = state
        .service
        .list_bills(ListBillsRequest {
            customer_id,
            status,
            limit: query.limit.unwrap_or(0),
            offset: query.offset.unwrap_or(0),
        })
        .await?;
    Ok(Json(page.into()))
}

/// Lists bills across all customers.
pub async fn list_all_bills(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListBillsApiResponse>, ApiError> {
    let status = query.status_filter()?;
    let page = state
        .service
        .list_all_bills(ListAllBillsRequest {
            status,
            limit: query.limit.unwrap_or(0),
            offset: query.offset.unwrap_or(0),
        })
        .await?;
    Ok(Json(page.into()))
}
