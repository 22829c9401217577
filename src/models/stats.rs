use serde::{Deserialize, Serialize};

/// Aggregate dashboard statistics from `/stats`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Stats {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub batches: u64,
    #[serde(rename = "dueToday", default)]
    pub due_today: u64,
    #[serde(rename = "remindersDue", default)]
    pub reminders_due: u64,
    #[serde(rename = "avgQuantity", default)]
    pub avg_quantity: f64,
    #[serde(rename = "topPlaces", default)]
    pub top_places: Vec<PlaceCount>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceCount {
    pub place: String,
    pub count: u64,
}
