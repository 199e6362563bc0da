use crate::utils::error::Result;
use crate::utils::validation::{fit_decimal, validate_max_chars};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

pub type CustomerId = i64;
pub type OrderId = i64;

/// 客戶名稱最大長度
pub const MAX_NAME_CHARS: usize = 100;
/// 金額欄位 decimal(8, 2)
pub const MONEY_PRECISION: u32 = 8;
pub const MONEY_SCALE: u32 = 2;

/// Normalizes an amount to the decimal(8, 2) money column.
pub fn money(field_name: &str, value: Decimal) -> Result<Decimal> {
    fit_decimal(field_name, value, MONEY_PRECISION, MONEY_SCALE)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub credit_limit: Decimal,
}

/// A validated customer row that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCustomer {
    name: String,
    credit_limit: Decimal,
}

impl NewCustomer {
    pub fn new(name: impl Into<String>, credit_limit: Decimal) -> Result<Self> {
        let name = name.into();
        validate_max_chars("Customer name", &name, MAX_NAME_CHARS)?;
        let credit_limit = money("CreditLimit", credit_limit)?;
        Ok(Self { name, credit_limit })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn credit_limit(&self) -> Decimal {
        self.credit_limit
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub order_date: NaiveDateTime,
    pub order_value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    customer_id: CustomerId,
    order_date: NaiveDateTime,
    order_value: Decimal,
}

impl NewOrder {
    pub fn new(customer_id: CustomerId, order_date: NaiveDateTime, order_value: Decimal) -> Result<Self> {
        let order_value = money("OrderValue", order_value)?;
        Ok(Self {
            customer_id,
            order_date,
            order_value,
        })
    }

    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    pub fn order_date(&self) -> NaiveDateTime {
        self.order_date
    }

    pub fn order_value(&self) -> Decimal {
        self.order_value
    }
}

/// 轉換階段的訂單列，客戶尚未解析為 ID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedOrder {
    pub customer_name: String,
    pub order_date: NaiveDateTime,
    pub order_value: Decimal,
}

/// Sum of order values for one customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTotal {
    pub customer_id: CustomerId,
    pub total: Decimal,
}

/// A customer whose order total is above the credit limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Overrun {
    pub customer_id: CustomerId,
    pub name: String,
    pub credit_limit: Decimal,
    pub total: Decimal,
}

impl Overrun {
    /// Limit minus total; negative for every reported customer.
    pub fn remaining(&self) -> Decimal {
        self.credit_limit - self.total
    }
}

impl fmt::Display for Overrun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.remaining())
    }
}

/// Raw file contents produced by the extract phase.
#[derive(Debug, Clone)]
pub struct ImportSource {
    pub customer_file: String,
    pub customer_text: String,
    pub order_file: String,
    pub order_text: String,
}

/// Output of the transform phase: parsed customers plus the order file,
/// which is only parsed once the customer batch has committed.
#[derive(Debug, Clone, Default)]
pub struct ImportBatch {
    pub customers: Vec<NewCustomer>,
    pub order_file: String,
    pub order_text: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub customers: usize,
    pub orders: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanSummary {
    pub orders: usize,
    pub customers: usize,
}
