use crate::core::Repository;
use crate::domain::model::CleanSummary;
use crate::utils::error::Result;

/// Deletes every order, then every customer, and commits once.
pub fn clean<R: Repository>(repository: &R) -> Result<CleanSummary> {
    repository.begin()?;
    match delete_all(repository) {
        Ok(summary) => {
            repository.commit()?;
            tracing::info!(
                "🧹 Deleted {} orders and {} customers",
                summary.orders,
                summary.customers
            );
            Ok(summary)
        }
        Err(e) => {
            repository.rollback()?;
            Err(e)
        }
    }
}

fn delete_all<R: Repository>(repository: &R) -> Result<CleanSummary> {
    // 訂單先刪，避免違反外鍵
    let orders = repository.delete_all_orders()?;
    let customers = repository.delete_all_customers()?;
    Ok(CleanSummary { orders, customers })
}
