//! Bill repository implementation
//!
//! Database access for bills and their line items, and the PostgreSQL
//! implementation of the `BillStore` port. Queries are runtime-bound so the
//! workspace builds without a live database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, QueryBuilder};
use std::str::FromStr;

use core_kernel::BillId;
use domain_bill::{Bill, BillStatus, BillSummary, BillStore, Currency, LineItem, StoreError};

use crate::error::DatabaseError;

/// Repository for bills and line items.
#[derive(Debug, Clone)]
pub struct BillRepository {
    pool: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct BillRow {
    id: String,
    customer_id: String,
    currency: String,
    status: String,
    total_amount: i64,
    created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct LineItemRow {
    description: String,
    amount: i64,
    recorded_at: DateTime<Utc>,
}

impl BillRow {
    fn into_bill(self, line_items: Vec<LineItem>) -> Result<Bill, DatabaseError> {
        Ok(Bill {
            id: BillId::from(self.id),
            customer_id: self.customer_id,
            currency: parse_currency(&self.currency)?,
            status: parse_status(&self.status)?,
            line_items,
            total_amount: self.total_amount,
            created_at: self.created_at,
        })
    }

    fn into_summary(self) -> Result<BillSummary, DatabaseError> {
        Ok(BillSummary {
            currency: parse_currency(&self.currency)?,
            status: parse_status(&self.status)?,
            id: BillId::from(self.id),
            customer_id: self.customer_id,
            created_at: self.created_at,
        })
    }
}

fn parse_currency(code: &str) -> Result<Currency, DatabaseError> {
    Currency::from_code(code).map_err(|err| DatabaseError::InvalidRow(err.to_string()))
}

fn parse_status(status: &str) -> Result<BillStatus, DatabaseError> {
    BillStatus::from_str(status).map_err(|err| DatabaseError::InvalidRow(err.to_string()))
}

impl BillRepository {
    /// Creates a new BillRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a new bill row.
    pub async fn insert_bill(&self, bill: &Bill) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO bills (id, customer_id, currency, status, total_amount, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(bill.id.as_str())
        .bind(&bill.customer_id)
        .bind(bill.currency.code())
        .bind(bill.status.as_str())
        .bind(bill.total_amount)
        .bind(bill.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Fetches a bill with its line items in recording order.
    pub async fn fetch_bill(&self, bill_id: &BillId) -> Result<Bill, DatabaseError> {
        let row: BillRow = sqlx::query_as(
            "SELECT id, customer_id, currency, status, total_amount, created_at \
             FROM bills WHERE id = $1",
        )
        .bind(bill_id.as_str())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound(bill_id.to_string()))?;

        let line_items = self.fetch_line_items(bill_id).await?;
        row.into_bill(line_items)
    }

    /// Fetches only the status column.
    pub async fn fetch_status(&self, bill_id: &BillId) -> Result<BillStatus, DatabaseError> {
        let status: Option<(String,)> = sqlx::query_as("SELECT status FROM bills WHERE id = $1")
            .bind(bill_id.as_str())
            .fetch_optional(&self.pool)
            .await?;
        match status {
            Some((status,)) => parse_status(&status),
            None => Err(DatabaseError::NotFound(bill_id.to_string())),
        }
    }

    /// Appends one line item row.
    pub async fn insert_line_item(
        &self,
        bill_id: &BillId,
        item: &LineItem,
    ) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO line_items (bill_id, description, amount, recorded_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(bill_id.as_str())
        .bind(&item.description)
        .bind(item.amount)
        .bind(item.recorded_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Line items for one bill, ordered by recording time then insertion.
    pub async fn fetch_line_items(&self, bill_id: &BillId) -> Result<Vec<LineItem>, DatabaseError> {
        let rows: Vec<LineItemRow> = sqlx::query_as(
            "SELECT description, amount, recorded_at FROM line_items \
             WHERE bill_id = $1 ORDER BY recorded_at ASC, id ASC",
        )
        .bind(bill_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| LineItem {
                description: row.description,
                amount: row.amount,
                recorded_at: row.recorded_at,
            })
            .collect())
    }

    /// Sets status and total on the bill row; distinct not-found when the
    /// row is missing.
    pub async fn update_status_and_total(
        &self,
        bill_id: &BillId,
        status: BillStatus,
        total_amount: i64,
    ) -> Result<(), DatabaseError> {
        let result = sqlx::query("UPDATE bills SET status = $1, total_amount = $2 WHERE id = $3")
            .bind(status.as_str())
            .bind(total_amount)
            .bind(bill_id.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(bill_id.to_string()));
        }
        Ok(())
    }

    async fn list(
        &self,
        customer_id: Option<&str>,
        status: Option<BillStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<BillSummary>, DatabaseError> {
        let mut query = QueryBuilder::new(
            "SELECT id, customer_id, currency, status, total_amount, created_at FROM bills",
        );

        let mut prefix = " WHERE ";
        if let Some(customer_id) = customer_id {
            query.push(prefix).push("customer_id = ").push_bind(customer_id);
            prefix = " AND ";
        }
        if let Some(status) = status {
            query.push(prefix).push("status = ").push_bind(status.as_str());
        }
        query
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows: Vec<BillRow> = query.build_query_as().fetch_all(&self.pool).await?;
        rows.into_iter().map(BillRow::into_summary).collect()
    }
}

fn store_error(err: DatabaseError) -> StoreError {
    match err {
        DatabaseError::NotFound(id) => StoreError::NotFound(id),
        other => StoreError::Backend(other.to_string()),
    }
}

#[async_trait]
impl BillStore for BillRepository {
    async fn create_bill(&self, bill: &Bill) -> Result<(), StoreError> {
        self.insert_bill(bill).await.map_err(store_error)
    }

    async fn bill(&self, id: &BillId) -> Result<Bill, StoreError> {
        self.fetch_bill(id).await.map_err(store_error)
    }

    async fn bill_status(&self, id: &BillId) -> Result<BillStatus, StoreError> {
        self.fetch_status(id).await.map_err(store_error)
    }

    async fn add_line_item(&self, id: &BillId, item: &LineItem) -> Result<(), StoreError> {
        self.insert_line_item(id, item).await.map_err(store_error)
    }

    async fn finalize_bill(
        &self,
        id: &BillId,
        status: BillStatus,
        total_amount: i64,
    ) -> Result<(), StoreError> {
        self.update_status_and_total(id, status, total_amount)
            .await
            .map_err(store_error)
    }

    async fn list_by_customer(
        &self,
        customer_id: &str,
        status: Option<BillStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<BillSummary>, StoreError> {
        self.list(Some(customer_id), status, limit, offset)
            .await
            .map_err(store_error)
    }

    async fn list_all(
        &self,
        status: Option<BillStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<BillSummary>, StoreError> {
        self.list(None, status, limit, offset)
            .await
            .map_err(store_error)
    }
}
