use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body of `POST /events`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    pub date: DateTime<Utc>,
    pub description: String,
}

/// Body of `POST /events/description`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DescriptionRequest {
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DescriptionResponse {
    pub description: String,
}
