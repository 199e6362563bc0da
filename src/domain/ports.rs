use crate::domain::model::{
    Customer, CustomerId, ImportBatch, ImportSource, ImportSummary, NewCustomer, NewOrder, Order,
    OrderTotal,
};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn connection_string(&self) -> &str;
    fn atomic_full(&self) -> bool;
}

/// Data access for the Customers and Orders tables.
///
/// Every call is synchronous. Batch inserts commit once; `begin` opens a
/// scope that nests, so batches inside it only become durable when the
/// outermost scope commits.
pub trait Repository: Send + Sync {
    fn insert_customers(&self, customers: &[NewCustomer]) -> Result<Vec<Customer>>;
    fn insert_orders(&self, orders: &[NewOrder]) -> Result<Vec<Order>>;
    fn delete_all_orders(&self) -> Result<usize>;
    fn delete_all_customers(&self) -> Result<usize>;
    fn find_customer_by_name(&self, name: &str) -> Result<Customer>;
    fn find_customer_by_id(&self, id: CustomerId) -> Result<Customer>;
    /// Totals ordered by customer id.
    fn sum_order_values_by_customer(&self) -> Result<Vec<OrderTotal>>;
    /// All customers ordered by id.
    fn list_customers(&self) -> Result<Vec<Customer>>;
    fn count_customers(&self) -> Result<usize>;
    fn count_orders(&self) -> Result<usize>;

    fn begin(&self) -> Result<()>;
    fn commit(&self) -> Result<()>;
    fn rollback(&self) -> Result<()>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<ImportSource>;
    async fn transform(&self, source: ImportSource) -> Result<ImportBatch>;
    async fn load(&self, batch: ImportBatch) -> Result<ImportSummary>;
}
