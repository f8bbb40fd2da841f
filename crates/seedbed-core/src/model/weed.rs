use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::seed::{SeedContext, SeedOrigin};

/// Audit record for one item created under an enabled seed context
///
/// Append-only. Consumed by the weed operation to remove seeded items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weed {
    pub item_id: String,
    /// Model identifier of the importer that created the item
    pub importer_type: String,
    pub seed_origin: SeedOrigin,
    pub details: Option<String>,
    /// Submission time of the batch the item came from
    pub created_at: DateTime<Utc>,
}

impl Weed {
    /// Record for `item_id`, stamped from the batch's seed context
    pub fn record(
        item_id: impl Into<String>,
        importer_type: impl Into<String>,
        seed: &SeedContext,
    ) -> Self {
        Self {
            item_id: item_id.into(),
            importer_type: importer_type.into(),
            seed_origin: seed.origin(),
            details: seed.details().map(str::to_string),
            created_at: seed.submitted_at(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_copies_seed_context() {
        let seed = SeedContext::new(SeedOrigin::File, true).with_details("upload.json");
        let weed = Weed::record("42", "element.entry", &seed);

        assert_eq!(weed.item_id, "42");
        assert_eq!(weed.seed_origin, SeedOrigin::File);
        assert_eq!(weed.details.as_deref(), Some("upload.json"));
        assert_eq!(weed.created_at, seed.submitted_at());
    }
}
