use crate::core::Pipeline;
use crate::domain::model::ImportSummary;
use crate::utils::error::Result;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<ImportSummary> {
        tracing::info!("Starting import...");

        // Extract
        tracing::info!("Reading input files...");
        let source = self.pipeline.extract().await?;
        tracing::debug!(
            "Read {} bytes from {}, {} bytes from {}",
            source.customer_text.len(),
            source.customer_file,
            source.order_text.len(),
            source.order_file
        );

        // Transform
        tracing::info!("Parsing rows...");
        let batch = self.pipeline.transform(source).await?;
        tracing::info!(
            "Parsed {} customers; orders from {} are parsed during load",
            batch.customers.len(),
            batch.order_file
        );

        // Load
        tracing::info!("Writing rows...");
        let summary = self.pipeline.load(batch).await?;
        tracing::info!(
            "✅ Imported {} customers and {} orders",
            summary.customers,
            summary.orders
        );

        Ok(summary)
    }
}
