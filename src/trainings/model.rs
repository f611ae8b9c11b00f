use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Publication state of a training.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TrainingStatus {
    /// Visible only to its author.
    #[default]
    Draft,
    /// Listed in the marketplace.
    Published,
    /// Withdrawn from the marketplace.
    Archived,
    /// A status this client does not know about.
    #[serde(other)]
    Unknown,
}

/// A training listed in the marketplace.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Training {
    /// Backend identifier.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Long-form description.
    pub description: Option<String>,
    /// Delivery format (e.g. "video", "presencial").
    pub format: Option<String>,
    /// Price in the marketplace currency. Zero means free.
    pub price: f64,
    /// Publication state.
    pub status: TrainingStatus,
    /// Creation time, when the backend reports it.
    pub created_at: Option<DateTime<Utc>>,
}

/// Fields for creating or replacing a training.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTraining {
    /// Display title.
    pub title: String,
    /// Long-form description.
    pub description: String,
    /// Delivery format.
    pub format: String,
    /// Price; zero means free.
    pub price: f64,
    /// Initial publication state.
    pub status: TrainingStatus,
}

/// The backend's acknowledgement of a created training.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingCreated {
    /// Confirmation text.
    pub message: String,
    /// Identifier assigned to the new training.
    #[serde(rename = "trainingId")]
    pub training_id: String,
}
