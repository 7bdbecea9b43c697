//! Builders for test data

use chrono::{Duration, Utc};
use domain_bill::{Bill, BillStatus, Currency, LineItem};

/// Builder for test bills.
///
/// ```rust,ignore
/// let bill = BillBuilder::new("c1")
///     .currency(Currency::Gel)
///     .item("coffee", 300)
///     .build();
/// ```
pub struct BillBuilder {
    bill: Bill,
}

impl BillBuilder {
    pub fn new(customer_id: &str) -> Self {
        Self {
            bill: Bill::open(customer_id, Currency::Usd),
        }
    }

    pub fn currency(mut self, currency: Currency) -> Self {
        self.bill.currency = currency;
        self
    }

    pub fn status(mut self, status: BillStatus) -> Self {
        self.bill.status = status;
        self
    }

    /// Appends a line item; items get ascending timestamps in append order.
    pub fn item(mut self, description: &str, amount: i64) -> Self {
        let offset = self.bill.line_items.len() as i64;
        let mut item = LineItem::new(description, amount);
        item.recorded_at = self.bill.created_at + Duration::milliseconds(offset + 1);
        self.bill.line_items.push(item);
        self
    }

    /// Backdates the bill, useful for asserting newest-first ordering.
    pub fn created_minutes_ago(mut self, minutes: i64) -> Self {
        self.bill.created_at = Utc::now() - Duration::minutes(minutes);
        self
    }

    pub fn build(self) -> Bill {
        self.bill
    }
}
