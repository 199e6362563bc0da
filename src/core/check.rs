use crate::core::Repository;
use crate::domain::model::Overrun;
use crate::utils::error::Result;
use std::io::Write;

/// Customers whose summed order value is strictly above the credit limit,
/// in customer id order.
pub fn find_overruns<R: Repository>(repository: &R) -> Result<Vec<Overrun>> {
    let totals = repository.sum_order_values_by_customer()?;
    tracing::debug!("Checking {} customers with orders", totals.len());

    let mut overruns = Vec::new();
    for total in totals {
        let customer = repository.find_customer_by_id(total.customer_id)?;
        if total.total > customer.credit_limit {
            overruns.push(Overrun {
                customer_id: customer.id,
                name: customer.name,
                credit_limit: customer.credit_limit,
                total: total.total,
            });
        }
    }
    Ok(overruns)
}

/// 輸出報告：每位超額客戶一行 `名稱: 額度-總額`
pub fn check<R: Repository, W: Write>(repository: &R, out: &mut W) -> Result<Vec<Overrun>> {
    let overruns = find_overruns(repository)?;
    for overrun in &overruns {
        writeln!(out, "{}", overrun)?;
    }
    out.flush()?;
    tracing::info!("🔍 {} customers over their credit limit", overruns.len());
    Ok(overruns)
}
