//! Report generation port trait.

use crate::domain::backtest::Evaluation;
use crate::domain::enriched::EnrichedSeries;
use crate::domain::error::StratevalError;
use std::path::Path;

/// Port for writing evaluation results after the core has finished.
pub trait ReportPort {
    fn write(
        &self,
        evaluation: &Evaluation,
        series: &EnrichedSeries,
        output_dir: &Path,
    ) -> Result<(), StratevalError>;
}
