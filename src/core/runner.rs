use crate::core::check::check;
use crate::core::clean::clean;
use crate::core::etl::EtlEngine;
use crate::core::import::ImportPipeline;
use crate::core::{ConfigProvider, Repository, Storage};
use crate::domain::model::{CleanSummary, ImportSummary, Overrun};
use crate::utils::error::Result;
use std::io::Write;

/// The operation selected on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::Subcommand))]
pub enum Mode {
    /// Insert customers and orders from two tab-separated files
    Import {
        customer_file: String,
        order_file: String,
    },
    /// Delete all orders and customers
    Clean,
    /// Print customers whose orders exceed their credit limit
    Check,
    /// Clean, import, then check
    Full {
        customer_file: String,
        order_file: String,
    },
}

impl Mode {
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Import { .. } => "import",
            Mode::Clean => "clean",
            Mode::Check => "check",
            Mode::Full { .. } => "full",
        }
    }
}

/// What a run did; unused steps stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub clean: Option<CleanSummary>,
    pub import: Option<ImportSummary>,
    pub overruns: Option<Vec<Overrun>>,
}

pub struct Runner<'a, S: Storage + Clone, R: Repository> {
    storage: S,
    repository: &'a R,
    atomic_full: bool,
}

impl<'a, S: Storage + Clone, R: Repository> Runner<'a, S, R> {
    pub fn new<C: ConfigProvider>(storage: S, repository: &'a R, config: &C) -> Self {
        Self {
            storage,
            repository,
            atomic_full: config.atomic_full(),
        }
    }

    pub async fn run<W: Write>(&self, mode: &Mode, out: &mut W) -> Result<RunReport> {
        tracing::info!("▶️ Running {}", mode.name());
        match mode {
            Mode::Import {
                customer_file,
                order_file,
            } => Ok(RunReport {
                import: Some(self.import(customer_file, order_file).await?),
                ..RunReport::default()
            }),
            Mode::Clean => Ok(RunReport {
                clean: Some(clean(self.repository)?),
                ..RunReport::default()
            }),
            Mode::Check => Ok(RunReport {
                overruns: Some(check(self.repository, out)?),
                ..RunReport::default()
            }),
            Mode::Full {
                customer_file,
                order_file,
            } if self.atomic_full => {
                self.repository.begin()?;
                match self.full(customer_file, order_file, out).await {
                    Ok(report) => {
                        self.repository.commit()?;
                        Ok(report)
                    }
                    Err(e) => {
                        tracing::warn!("Rolling back full run: {}", e);
                        if let Err(rollback_err) = self.repository.rollback() {
                            tracing::error!("Rollback failed: {}", rollback_err);
                        }
                        Err(e)
                    }
                }
            }
            Mode::Full {
                customer_file,
                order_file,
            } => self.full(customer_file, order_file, out).await,
        }
    }

    async fn import(&self, customer_file: &str, order_file: &str) -> Result<ImportSummary> {
        let pipeline = ImportPipeline::new(
            self.storage.clone(),
            self.repository,
            customer_file,
            order_file,
        );
        EtlEngine::new(pipeline).run().await
    }

    async fn full<W: Write>(
        &self,
        customer_file: &str,
        order_file: &str,
        out: &mut W,
    ) -> Result<RunReport> {
        let cleaned = clean(self.repository)?;
        let imported = self.import(customer_file, order_file).await?;
        let overruns = check(self.repository, out)?;
        Ok(RunReport {
            clean: Some(cleaned),
            import: Some(imported),
            overruns: Some(overruns),
        })
    }
}
