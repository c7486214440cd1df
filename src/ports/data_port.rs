//! Data access port trait.

use crate::domain::enriched::EnrichedSeries;
use crate::domain::error::StratevalError;

/// Source of an already-enriched price series.
pub trait DataPort {
    fn load_series(&self) -> Result<EnrichedSeries, StratevalError>;
}
