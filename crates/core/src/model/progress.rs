use serde::{Deserialize, Serialize};

use crate::model::ids::MaterialId;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProgressStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

/// Progress of the current user on one material, upserted by material id.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressRecord {
    material_id: MaterialId,
    status: ProgressStatus,
    score: Option<f64>,
    completion_time_minutes: Option<u32>,
}

impl ProgressRecord {
    #[must_use]
    pub fn new(material_id: MaterialId, status: ProgressStatus) -> Self {
        Self {
            material_id,
            status,
            score: None,
            completion_time_minutes: None,
        }
    }

    #[must_use]
    pub fn completed(material_id: MaterialId) -> Self {
        Self::new(material_id, ProgressStatus::Completed)
    }

    #[must_use]
    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    #[must_use]
    pub fn with_completion_time(mut self, minutes: u32) -> Self {
        self.completion_time_minutes = Some(minutes);
        self
    }

    #[must_use]
    pub fn material_id(&self) -> MaterialId {
        self.material_id
    }

    #[must_use]
    pub fn status(&self) -> ProgressStatus {
        self.status
    }

    #[must_use]
    pub fn score(&self) -> Option<f64> {
        self.score
    }

    #[must_use]
    pub fn completion_time_minutes(&self) -> Option<u32> {
        self.completion_time_minutes
    }
}
