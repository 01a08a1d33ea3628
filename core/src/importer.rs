//! Connection wrapper running whole imports.

use crate::capabilities::BackendCapabilities;
use crate::error::Result;
use crate::executor::{BatchExecutor, Executor};
use crate::options::{ImportOptions, Model};
use crate::partition::PackingConfig;
use crate::reconcile::{BatchResult, ReconciliationMode, reconcile};
use crate::template::StatementTemplate;

/// A connected backend: the execution boundary plus its server probes.
pub trait Driver: Executor {
    /// Capability probe, run once when the driver is wrapped.
    fn capabilities(&mut self) -> Result<Box<dyn BackendCapabilities>>;

    /// Size-limit probe: the largest statement the server accepts, in bytes.
    /// Zero means unlimited.
    fn max_statement_bytes(&mut self) -> Result<usize>;
}

/// Owns a driver together with what was learned about its server.
///
/// The statement size limit is probed on first use and kept until [`reset`]
/// is called. A server-side change of the limit during the life of the
/// connection goes unnoticed until then.
///
/// [`reset`]: Importer::reset
#[derive(Debug)]
pub struct Importer<D> {
    driver: D,
    capabilities: Box<dyn BackendCapabilities>,
    max_statement_bytes: Option<usize>,
}

impl<D: Driver> Importer<D> {
    /// Wraps `driver`, probing its capabilities.
    pub fn new(mut driver: D) -> Result<Self> {
        let capabilities = driver.capabilities()?;
        Ok(Self::with_capabilities(driver, capabilities))
    }

    pub fn with_capabilities(driver: D, capabilities: Box<dyn BackendCapabilities>) -> Self {
        Self {
            driver,
            capabilities,
            max_statement_bytes: None,
        }
    }

    #[inline]
    pub fn driver(&self) -> &D {
        &self.driver
    }

    #[inline]
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    pub fn into_inner(self) -> D {
        self.driver
    }

    #[inline]
    pub fn capabilities(&self) -> &dyn BackendCapabilities {
        self.capabilities.as_ref()
    }

    /// Cached size limit, probing the server the first time.
    pub fn max_statement_bytes(&mut self) -> Result<usize> {
        match self.max_statement_bytes {
            Some(max) => Ok(max),
            None => {
                let max = self.driver.max_statement_bytes()?;
                self.max_statement_bytes = Some(max);
                Ok(max)
            }
        }
    }

    /// Forgets the cached size limit, e.g. after reconnecting.
    pub fn reset(&mut self) {
        self.max_statement_bytes = None;
    }

    /// `INSERT ... INTO <table> (<columns>) VALUES ` for `model`, quoted for
    /// this backend and carrying the `IGNORE` modifier when requested.
    pub fn insert_template<S: AsRef<str>>(
        &self,
        model: &Model,
        columns: &[S],
        options: &ImportOptions,
    ) -> Result<StatementTemplate> {
        let caps = self.capabilities();
        StatementTemplate::insert_into(
            &caps.quote_identifier(model.table()),
            columns.iter().map(|c| caps.quote_identifier(c.as_ref())),
            caps.insert_modifiers(options.ignore),
        )
    }

    /// Inserts every value set, splitting across statements when the server
    /// limit requires it, and reads back the requested columns.
    ///
    /// Either all values are committed or the error is returned and nothing
    /// from this batch persists.
    pub fn import<V: AsRef<str>>(
        &mut self,
        template: &StatementTemplate,
        values: &[V],
        options: &ImportOptions,
        model: Option<&Model>,
    ) -> Result<BatchResult> {
        if values.is_empty() {
            return Ok(BatchResult::default());
        }

        let request = options.returning_request(model)?;
        let supports_returning = self.capabilities.supports_returning();
        #[cfg(feature = "tracing")]
        if !request.is_empty() && !supports_returning {
            tracing::warn!(
                backend = %self.capabilities.backend(),
                version = %self.capabilities.server_version(),
                "returning requested but not supported; reporting insert ids only"
            );
        }

        let mut mode = ReconciliationMode::select(request, supports_returning);
        let clause = match &mode {
            ReconciliationMode::Columnar(request) => {
                Some(self.capabilities.returning_clause(&request.columns()))
            }
            ReconciliationMode::Generic => None,
        };

        let config = PackingConfig::new(template.reserved_bytes(), self.max_statement_bytes()?);
        let execution = BatchExecutor::new(template, config)
            .force_single(options.force_single_insert)
            .returning(clause.as_deref())
            .execute(&mut self.driver, values)?;

        if execution.split && mode.is_columnar() {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                statements = execution.statement_count,
                "batch was split; returning clause dropped"
            );
            mode = ReconciliationMode::Generic;
        }

        reconcile(&execution.results, &mode)
    }
}
