//! Incident Store Module
//!
//! The scoring engine reads indicators and incidents only through the
//! [`IncidentStore`] trait. Calls are blocking and made once per run.
//! [`SnapshotStore`] serves a JSON export loaded from disk.

pub mod query;
mod snapshot;

pub use query::IncidentQuery;
pub use snapshot::{Snapshot, SnapshotStore};

use crate::errors::KinshipResult;
use crate::models::{Indicator, IncidentRecord};
use chrono::{DateTime, Utc};

/// Backing store for indicators and incident metadata
pub trait IncidentStore {
    /// All indicators associated with an incident
    fn find_indicators(&self, incident_id: &str) -> KinshipResult<Vec<Indicator>>;

    /// Subset of `incident_ids` matching the query and created at or after
    /// `from_date`, in input order
    fn search_incident_ids(
        &self,
        incident_ids: &[String],
        query: Option<&IncidentQuery>,
        from_date: Option<DateTime<Utc>>,
    ) -> KinshipResult<Vec<String>>;

    /// Indicators among `indicator_ids` associated with at least one of
    /// `incident_ids`, at most `limit` of them
    fn find_mutual_indicators(
        &self,
        indicator_ids: &[String],
        incident_ids: &[String],
        limit: usize,
    ) -> KinshipResult<Vec<Indicator>>;

    /// Incident metadata for enrichment; unknown ids are skipped
    fn get_incidents(&self, incident_ids: &[String]) -> KinshipResult<Vec<IncidentRecord>>;
}
