//! Twiddle-table cache shared by pipelines of the same domain size.

use hashbrown::HashMap;
use std::sync::Arc;

use crate::config::{Direction, PipelineConfig};
use crate::error::PipelineError;
use crate::pipeline::StreamingFft;
use crate::twiddle::TwiddleTable;

pub struct PipelinePlanner {
    cache: HashMap<usize, Arc<TwiddleTable>>,
}

impl Default for PipelinePlanner {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelinePlanner {
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
        }
    }

    /// Twiddle table for an `n`-point domain, built on first use.
    pub fn get_twiddles(&mut self, n: usize) -> Result<Arc<TwiddleTable>, PipelineError> {
        if let Some(table) = self.cache.get(&n) {
            return Ok(Arc::clone(table));
        }
        let table = Arc::new(TwiddleTable::build(n)?);
        log::debug!("planner: built {}-entry twiddle table for N={}", table.len(), n);
        self.cache.insert(n, Arc::clone(&table));
        Ok(table)
    }

    /// Build a pipeline for `config`, sharing the cached twiddle table.
    pub fn plan(&mut self, config: PipelineConfig) -> Result<StreamingFft, PipelineError> {
        config.validate()?;
        let twiddles = self.get_twiddles(config.domain_size)?;
        StreamingFft::with_twiddles(config, twiddles)
    }

    /// Build a pipeline with default staging for `n` points.
    pub fn plan_default(&mut self, n: usize, direction: Direction) -> Result<StreamingFft, PipelineError> {
        self.plan(PipelineConfig::new(n, direction))
    }

    /// Number of cached tables.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }
}
