use mvagrid_dataset::feature::Feature;
use serde::{Deserialize, Serialize};

/// Events of one sample file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventFile {
    /// Number of split ids events are spread over.
    pub n_splits: u32,
    pub events: Vec<EventRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    /// Identifier of the event within its file, defaults to its position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<u64>,
    pub channel: String,
    pub split_id: u32,
    pub features: Vec<Feature>,
}
