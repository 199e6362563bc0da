use crate::core::parser::{decode, parse_customers, parse_orders};
use crate::core::{Pipeline, Repository, Storage};
use crate::domain::model::{
    CustomerId, ImportBatch, ImportSource, ImportSummary, NewOrder, StagedOrder,
};
use crate::utils::error::{OrderImportError, Result};
use std::collections::HashMap;

/// Import as extract (read both files) / transform (parse customers) / load
/// (customer batch, order parsing and name resolution, order batch).
pub struct ImportPipeline<'a, S: Storage, R: Repository> {
    storage: S,
    repository: &'a R,
    customer_file: String,
    order_file: String,
}

impl<'a, S: Storage, R: Repository> ImportPipeline<'a, S, R> {
    pub fn new(
        storage: S,
        repository: &'a R,
        customer_file: impl Into<String>,
        order_file: impl Into<String>,
    ) -> Self {
        Self {
            storage,
            repository,
            customer_file: customer_file.into(),
            order_file: order_file.into(),
        }
    }

    /// 客戶名稱 -> ID，同名時保留最小 ID
    fn customer_index(&self) -> Result<HashMap<String, CustomerId>> {
        let mut index = HashMap::new();
        for customer in self.repository.list_customers()? {
            index.entry(customer.name).or_insert(customer.id);
        }
        Ok(index)
    }

    fn resolve(
        index: &HashMap<String, CustomerId>,
        orders: Vec<StagedOrder>,
    ) -> Result<Vec<NewOrder>> {
        orders
            .into_iter()
            .map(|order| {
                let customer_id = index.get(&order.customer_name).copied().ok_or_else(|| {
                    OrderImportError::CustomerNotFound {
                        name: order.customer_name.clone(),
                    }
                })?;
                NewOrder::new(customer_id, order.order_date, order.order_value)
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl<'a, S: Storage, R: Repository> Pipeline for ImportPipeline<'a, S, R> {
    async fn extract(&self) -> Result<ImportSource> {
        tracing::debug!(
            "Reading customers from {} and orders from {}",
            self.customer_file,
            self.order_file
        );
        let customer_bytes = self.storage.read_file(&self.customer_file).await?;
        let order_bytes = self.storage.read_file(&self.order_file).await?;

        Ok(ImportSource {
            customer_text: decode(&self.customer_file, customer_bytes)?,
            customer_file: self.customer_file.clone(),
            order_text: decode(&self.order_file, order_bytes)?,
            order_file: self.order_file.clone(),
        })
    }

    async fn transform(&self, source: ImportSource) -> Result<ImportBatch> {
        let customers = parse_customers(&source.customer_file, &source.customer_text)?;
        Ok(ImportBatch {
            customers,
            order_file: source.order_file,
            order_text: source.order_text,
        })
    }

    async fn load(&self, batch: ImportBatch) -> Result<ImportSummary> {
        // 先提交客戶；訂單檔之後才解析，壞掉的訂單列不會撤銷已提交的客戶
        let customers = self.repository.insert_customers(&batch.customers)?;
        tracing::debug!("Committed {} customers", customers.len());

        let staged = parse_orders(&batch.order_file, &batch.order_text)?;
        let index = self.customer_index()?;
        let orders = Self::resolve(&index, staged)?;
        let orders = self.repository.insert_orders(&orders)?;
        tracing::debug!("Committed {} orders", orders.len());

        Ok(ImportSummary {
            customers: customers.len(),
            orders: orders.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::SqliteRepository;
    use crate::core::etl::EtlEngine;
    use rust_decimal_macros::dec;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        async fn with_file(self, path: &str, content: &str) -> Self {
            self.files
                .lock()
                .await
                .insert(path.to_string(), content.as_bytes().to_vec());
            self
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                OrderImportError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }
    }

    async fn storage(customers: &str, orders: &str) -> MockStorage {
        MockStorage::default()
            .with_file("customers.tsv", customers)
            .await
            .with_file("orders.tsv", orders)
            .await
    }

    #[tokio::test]
    async fn test_import_links_orders_to_customers() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        let storage = storage(
            "Name\tCreditLimit\nAlice\t100.00\nBob\t50\n",
            "Customer\tDate\tValue\nAlice\t2024-01-01\t60\nAlice\t2024-01-02\t90\nBob\t2024-01-03\t10\n",
        )
        .await;

        let pipeline = ImportPipeline::new(storage, &repo, "customers.tsv", "orders.tsv");
        let summary = EtlEngine::new(pipeline).run().await.unwrap();

        assert_eq!(summary, ImportSummary { customers: 2, orders: 3 });
        let totals = repo.sum_order_values_by_customer().unwrap();
        let alice = repo.find_customer_by_name("Alice").unwrap();
        assert_eq!(totals[0].customer_id, alice.id);
        assert_eq!(totals[0].total, dec!(150));
    }

    #[tokio::test]
    async fn test_unknown_customer_keeps_customers_drops_orders() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        let storage = storage(
            "Name\tCreditLimit\nAlice\t100\n",
            "Customer\tDate\tValue\nAlice\t2024-01-01\t10\nMallory\t2024-01-01\t10\n",
        )
        .await;

        let pipeline = ImportPipeline::new(storage, &repo, "customers.tsv", "orders.tsv");
        let err = EtlEngine::new(pipeline).run().await.unwrap_err();

        assert!(matches!(err, OrderImportError::CustomerNotFound { ref name } if name == "Mallory"));
        assert_eq!(repo.count_customers().unwrap(), 1);
        assert_eq!(repo.count_orders().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_malformed_order_line_keeps_customers() {
        for orders in [
            "Customer\tDate\tValue\nAlice\tnot-a-date\t10\n",
            "Customer\tDate\tValue\nAlice\t2024-01-01\tabc\n",
        ] {
            let repo = SqliteRepository::open_in_memory().unwrap();
            let storage = storage("Name\tCreditLimit\nAlice\t100\n", orders).await;

            let pipeline = ImportPipeline::new(storage, &repo, "customers.tsv", "orders.tsv");
            let err = EtlEngine::new(pipeline).run().await.unwrap_err();

            assert!(matches!(err, OrderImportError::ParseError { line: 2, .. }));
            assert_eq!(repo.count_customers().unwrap(), 1);
            assert_eq!(repo.count_orders().unwrap(), 0);
        }
    }

    #[tokio::test]
    async fn test_malformed_customer_line_writes_nothing() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        let storage = storage(
            "Name\tCreditLimit\nAlice\t100\nBob\tlots\n",
            "Customer\tDate\tValue\n",
        )
        .await;

        let pipeline = ImportPipeline::new(storage, &repo, "customers.tsv", "orders.tsv");
        let err = EtlEngine::new(pipeline).run().await.unwrap_err();

        assert!(matches!(err, OrderImportError::ParseError { line: 3, .. }));
        assert_eq!(repo.count_customers().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_orders_resolve_against_existing_customers() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        let first = storage("Name\tCreditLimit\nAlice\t100\n", "Customer\tDate\tValue\n").await;
        EtlEngine::new(ImportPipeline::new(first, &repo, "customers.tsv", "orders.tsv"))
            .run()
            .await
            .unwrap();

        // 第二次匯入：同名客戶重複，訂單歸給第一筆
        let second = storage(
            "Name\tCreditLimit\nAlice\t999\n",
            "Customer\tDate\tValue\nAlice\t2024-01-01\t10\n",
        )
        .await;
        let summary =
            EtlEngine::new(ImportPipeline::new(second, &repo, "customers.tsv", "orders.tsv"))
                .run()
                .await
                .unwrap();

        assert_eq!(summary, ImportSummary { customers: 1, orders: 1 });
        assert_eq!(repo.count_customers().unwrap(), 2);
        let first_alice = repo.list_customers().unwrap()[0].id;
        assert_eq!(
            repo.sum_order_values_by_customer().unwrap()[0].customer_id,
            first_alice
        );
    }

    #[tokio::test]
    async fn test_missing_input_file() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        let storage = MockStorage::default()
            .with_file("customers.tsv", "Name\tCreditLimit\n")
            .await;
        let pipeline = ImportPipeline::new(storage, &repo, "customers.tsv", "orders.tsv");
        assert!(matches!(
            pipeline.extract().await,
            Err(OrderImportError::IoError(_))
        ));
    }
}
