//! SQLite implementation of the [`Repository`] port.
//!
//! Money columns hold hundredths as `INTEGER` so that `SUM` stays exact;
//! values come back as `Decimal` with scale 2.

use crate::config::connection::DataSource;
use crate::domain::model::{
    Customer, CustomerId, NewCustomer, NewOrder, Order, OrderTotal, MONEY_SCALE,
};
use crate::domain::ports::Repository;
use crate::utils::error::{OrderImportError, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;
use std::sync::{Mutex, MutexGuard, PoisonError};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS Customers (
    Id INTEGER PRIMARY KEY AUTOINCREMENT,
    Name TEXT NOT NULL CHECK (length(Name) <= 100),
    CreditLimit INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS Orders (
    Id INTEGER PRIMARY KEY AUTOINCREMENT,
    CustomerId INTEGER NOT NULL REFERENCES Customers (Id),
    OrderDate TEXT NOT NULL,
    OrderValue INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS IX_Orders_CustomerId ON Orders (CustomerId);
"#;

const CUSTOMER_COLUMNS: &str = "Id, Name, CreditLimit";

struct Inner {
    conn: Connection,
    // 目前開啟的 scope 層數
    depth: usize,
}

pub struct SqliteRepository {
    inner: Mutex<Inner>,
}

impl SqliteRepository {
    /// 開啟資料庫並確保 schema 存在
    pub fn open(source: &DataSource) -> Result<Self> {
        tracing::debug!("Opening SQLite store: {}", source);
        let conn = match source {
            DataSource::Memory => Connection::open_in_memory(),
            DataSource::File(path) => Connection::open(path),
        }
        .map_err(|e| OrderImportError::ConnectionError {
            target: source.to_string(),
            source: e,
        })?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::open(&DataSource::Memory)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", true)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            inner: Mutex::new(Inner { conn, depth: 0 }),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `f` inside a savepoint that is released on success and rolled
    /// back on error.
    fn batch<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let mut inner = self.lock();
        let sp = inner.conn.savepoint()?;
        let value = f(&*sp)?;
        sp.commit()?;
        Ok(value)
    }

    fn customer_from_row(row: &Row<'_>) -> rusqlite::Result<Customer> {
        Ok(Customer {
            id: row.get(0)?,
            name: row.get(1)?,
            credit_limit: from_hundredths(row.get(2)?),
        })
    }
}

fn to_hundredths(value: Decimal) -> Result<i64> {
    let mut scaled = value;
    scaled.rescale(MONEY_SCALE);
    i64::try_from(scaled.mantissa())
        .map_err(|_| OrderImportError::constraint(format!("amount {} is out of range", value)))
}

fn from_hundredths(value: i64) -> Decimal {
    Decimal::new(value, MONEY_SCALE)
}

impl Repository for SqliteRepository {
    fn insert_customers(&self, customers: &[NewCustomer]) -> Result<Vec<Customer>> {
        self.batch(|conn| {
            let mut stmt =
                conn.prepare("INSERT INTO Customers (Name, CreditLimit) VALUES (?1, ?2)")?;
            let mut inserted = Vec::with_capacity(customers.len());
            for customer in customers {
                stmt.execute(params![customer.name(), to_hundredths(customer.credit_limit())?])?;
                inserted.push(Customer {
                    id: conn.last_insert_rowid(),
                    name: customer.name().to_string(),
                    credit_limit: customer.credit_limit(),
                });
            }
            tracing::debug!("Inserted {} customers", inserted.len());
            Ok(inserted)
        })
    }

    fn insert_orders(&self, orders: &[NewOrder]) -> Result<Vec<Order>> {
        self.batch(|conn| {
            let mut stmt = conn.prepare(
                "INSERT INTO Orders (CustomerId, OrderDate, OrderValue) VALUES (?1, ?2, ?3)",
            )?;
            let mut inserted = Vec::with_capacity(orders.len());
            for order in orders {
                stmt.execute(params![
                    order.customer_id(),
                    order.order_date(),
                    to_hundredths(order.order_value())?
                ])?;
                inserted.push(Order {
                    id: conn.last_insert_rowid(),
                    customer_id: order.customer_id(),
                    order_date: order.order_date(),
                    order_value: order.order_value(),
                });
            }
            tracing::debug!("Inserted {} orders", inserted.len());
            Ok(inserted)
        })
    }

    fn delete_all_orders(&self) -> Result<usize> {
        self.batch(|conn| Ok(conn.execute("DELETE FROM Orders", [])?))
    }

    fn delete_all_customers(&self) -> Result<usize> {
        self.batch(|conn| Ok(conn.execute("DELETE FROM Customers", [])?))
    }

    fn find_customer_by_name(&self, name: &str) -> Result<Customer> {
        let inner = self.lock();
        let sql = format!(
            "SELECT {CUSTOMER_COLUMNS} FROM Customers WHERE Name = ?1 ORDER BY Id LIMIT 1"
        );
        inner
            .conn
            .query_row(&sql, [name], Self::customer_from_row)
            .optional()?
            .ok_or_else(|| OrderImportError::CustomerNotFound {
                name: name.to_string(),
            })
    }

    fn find_customer_by_id(&self, id: CustomerId) -> Result<Customer> {
        let inner = self.lock();
        let sql = format!("SELECT {CUSTOMER_COLUMNS} FROM Customers WHERE Id = ?1");
        inner
            .conn
            .query_row(&sql, [id], Self::customer_from_row)
            .optional()?
            .ok_or_else(|| OrderImportError::NotFound {
                entity: "Customer",
                key: id.to_string(),
            })
    }

    fn sum_order_values_by_customer(&self) -> Result<Vec<OrderTotal>> {
        let inner = self.lock();
        let mut stmt = inner.conn.prepare(
            "SELECT CustomerId, SUM(OrderValue) FROM Orders GROUP BY CustomerId ORDER BY CustomerId",
        )?;
        let totals = stmt
            .query_map([], |row| {
                Ok(OrderTotal {
                    customer_id: row.get(0)?,
                    total: from_hundredths(row.get(1)?),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(totals)
    }

    fn list_customers(&self) -> Result<Vec<Customer>> {
        let inner = self.lock();
        let sql = format!("SELECT {CUSTOMER_COLUMNS} FROM Customers ORDER BY Id");
        let mut stmt = inner.conn.prepare(&sql)?;
        let customers = stmt
            .query_map([], Self::customer_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(customers)
    }

    fn count_customers(&self) -> Result<usize> {
        let inner = self.lock();
        let count: i64 = inner
            .conn
            .query_row("SELECT COUNT(*) FROM Customers", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn count_orders(&self) -> Result<usize> {
        let inner = self.lock();
        let count: i64 = inner
            .conn
            .query_row("SELECT COUNT(*) FROM Orders", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn begin(&self) -> Result<()> {
        let mut inner = self.lock();
        let name = format!("scope_{}", inner.depth + 1);
        inner.conn.execute_batch(&format!("SAVEPOINT {name}"))?;
        inner.depth += 1;
        tracing::debug!("Opened {}", name);
        Ok(())
    }

    fn commit(&self) -> Result<()> {
        let mut inner = self.lock();
        if inner.depth == 0 {
            return Err(OrderImportError::ScopeError {
                message: "commit without an open scope".to_string(),
            });
        }
        let name = format!("scope_{}", inner.depth);
        inner.conn.execute_batch(&format!("RELEASE {name}"))?;
        inner.depth -= 1;
        tracing::debug!("Released {}", name);
        Ok(())
    }

    fn rollback(&self) -> Result<()> {
        let mut inner = self.lock();
        if inner.depth == 0 {
            return Err(OrderImportError::ScopeError {
                message: "rollback without an open scope".to_string(),
            });
        }
        let name = format!("scope_{}", inner.depth);
        inner
            .conn
            .execute_batch(&format!("ROLLBACK TO {name}; RELEASE {name}"))?;
        inner.depth -= 1;
        tracing::debug!("Rolled back {}", name);
        Ok(())
    }
}
