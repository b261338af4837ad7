use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::{CourseId, MaterialId};

/// Minimum number of characters a generation topic must have.
pub const MIN_TOPIC_CHARS: usize = 3;

/// Estimated study time used when the generator does not provide one.
pub const DEFAULT_ESTIMATED_MINUTES: u32 = 30;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationError {
    #[error("course is required")]
    MissingCourse,

    #[error("topic is required")]
    EmptyTopic,

    #[error("topic should be at least {min} characters")]
    TopicTooShort { min: usize },

    #[error("unknown difficulty level: {0}")]
    UnknownDifficulty(String),
}

//
// ─── ENUMS ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DifficultyLevel {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

impl DifficultyLevel {
    pub const ALL: [DifficultyLevel; 3] = [Self::Beginner, Self::Intermediate, Self::Advanced];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "BEGINNER",
            Self::Intermediate => "INTERMEDIATE",
            Self::Advanced => "ADVANCED",
        }
    }
}

impl fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DifficultyLevel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ValidationError::UnknownDifficulty(trimmed.to_owned()))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContentType {
    #[default]
    AiGenerated,
}

//
// ─── GENERATION REQUEST ────────────────────────────────────────────────────────
//

/// Raw generation form input, not yet validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationDraft {
    pub course_id: Option<CourseId>,
    pub topic: String,
    pub difficulty_level: String,
    pub preferences: String,
}

impl Default for GenerationDraft {
    fn default() -> Self {
        Self {
            course_id: None,
            topic: String::new(),
            difficulty_level: DifficultyLevel::default().as_str().to_owned(),
            preferences: String::new(),
        }
    }
}

impl GenerationDraft {
    #[must_use]
    pub fn new(course_id: CourseId, topic: impl Into<String>) -> Self {
        Self {
            course_id: Some(course_id),
            topic: topic.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_difficulty(mut self, level: impl Into<String>) -> Self {
        self.difficulty_level = level.into();
        self
    }

    #[must_use]
    pub fn with_preferences(mut self, preferences: impl Into<String>) -> Self {
        self.preferences = preferences.into();
        self
    }

    /// Validate the draft into an immutable request.
    ///
    /// The topic is trimmed before its length is checked.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for a missing course, a short topic, or an
    /// unknown difficulty level.
    pub fn validate(self) -> Result<GenerationRequest, ValidationError> {
        let course_id = self.course_id.ok_or(ValidationError::MissingCourse)?;

        let topic = self.topic.trim();
        if topic.is_empty() {
            return Err(ValidationError::EmptyTopic);
        }
        if topic.chars().count() < MIN_TOPIC_CHARS {
            return Err(ValidationError::TopicTooShort {
                min: MIN_TOPIC_CHARS,
            });
        }

        let difficulty_level = self.difficulty_level.parse::<DifficultyLevel>()?;

        Ok(GenerationRequest {
            course_id,
            topic: topic.to_owned(),
            difficulty_level,
            preferences: self.preferences.trim().to_owned(),
        })
    }
}

/// A validated request for AI-assisted material generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    course_id: CourseId,
    topic: String,
    difficulty_level: DifficultyLevel,
    #[serde(rename = "aiPreferences")]
    preferences: String,
}

impl GenerationRequest {
    #[must_use]
    pub fn course_id(&self) -> CourseId {
        self.course_id
    }

    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    #[must_use]
    pub fn difficulty_level(&self) -> DifficultyLevel {
        self.difficulty_level
    }

    #[must_use]
    pub fn preferences(&self) -> &str {
        &self.preferences
    }
}

//
// ─── MATERIALS ─────────────────────────────────────────────────────────────────
//

/// Material returned by the generation service, not yet persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedMaterial {
    #[serde(default)]
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub estimated_time_minutes: Option<u32>,
    #[serde(default, alias = "model")]
    pub model_used: Option<String>,
}

/// Payload sent to the content store when saving generated material.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMaterial {
    pub course_id: CourseId,
    pub title: String,
    pub content: String,
    pub content_type: ContentType,
    pub difficulty_level: DifficultyLevel,
    pub estimated_time_minutes: u32,
    pub ai_model_used: Option<String>,
}

impl NewMaterial {
    /// Combine generator output with the request it answered.
    ///
    /// An empty title falls back to the topic and a missing estimate to
    /// `DEFAULT_ESTIMATED_MINUTES`.
    #[must_use]
    pub fn from_generated(request: &GenerationRequest, generated: GeneratedMaterial) -> Self {
        let title = if generated.title.trim().is_empty() {
            request.topic().to_owned()
        } else {
            generated.title
        };

        Self {
            course_id: request.course_id(),
            title,
            content: generated.content,
            content_type: ContentType::AiGenerated,
            difficulty_level: request.difficulty_level(),
            estimated_time_minutes: generated
                .estimated_time_minutes
                .unwrap_or(DEFAULT_ESTIMATED_MINUTES),
            ai_model_used: generated.model_used,
        }
    }

    #[must_use]
    pub fn into_persisted(self, id: MaterialId) -> PersistedMaterial {
        PersistedMaterial {
            id,
            course_id: self.course_id,
            title: self.title,
            content: self.content,
            content_type: self.content_type,
            difficulty_level: self.difficulty_level,
            estimated_time_minutes: self.estimated_time_minutes,
            ai_model_used: self.ai_model_used,
        }
    }
}

/// Material owned by the content store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedMaterial {
    pub id: MaterialId,
    pub course_id: CourseId,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub content_type: ContentType,
    pub difficulty_level: DifficultyLevel,
    #[serde(default)]
    pub estimated_time_minutes: u32,
    #[serde(default)]
    pub ai_model_used: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generated(title: &str) -> GeneratedMaterial {
        GeneratedMaterial {
            title: title.to_owned(),
            content: "Body".to_owned(),
            estimated_time_minutes: None,
            model_used: Some("gpt-4o".to_owned()),
        }
    }

    #[test]
    fn short_topic_is_rejected() {
        let err = GenerationDraft::new(CourseId::new(1), "ab")
            .validate()
            .unwrap_err();
        assert_eq!(err, ValidationError::TopicTooShort { min: 3 });
        assert_eq!(err.to_string(), "topic should be at least 3 characters");
    }

    #[test]
    fn topic_is_trimmed_before_length_check() {
        let err = GenerationDraft::new(CourseId::new(1), "  ab  ")
            .validate()
            .unwrap_err();
        assert!(matches!(err, ValidationError::TopicTooShort { .. }));

        let request = GenerationDraft::new(CourseId::new(1), "  Ownership ")
            .validate()
            .unwrap();
        assert_eq!(request.topic(), "Ownership");
    }

    #[test]
    fn missing_course_is_rejected() {
        let draft = GenerationDraft {
            topic: "Borrowing".into(),
            ..GenerationDraft::default()
        };
        assert_eq!(draft.validate().unwrap_err(), ValidationError::MissingCourse);
    }

    #[test]
    fn blank_topic_is_required() {
        let err = GenerationDraft::new(CourseId::new(1), "   ")
            .validate()
            .unwrap_err();
        assert_eq!(err, ValidationError::EmptyTopic);
    }

    #[test]
    fn difficulty_defaults_to_intermediate_and_parses_case_insensitively() {
        let request = GenerationDraft::new(CourseId::new(1), "Lifetimes")
            .validate()
            .unwrap();
        assert_eq!(request.difficulty_level(), DifficultyLevel::Intermediate);

        let request = GenerationDraft::new(CourseId::new(1), "Lifetimes")
            .with_difficulty("advanced")
            .validate()
            .unwrap();
        assert_eq!(request.difficulty_level(), DifficultyLevel::Advanced);
    }

    #[test]
    fn unknown_difficulty_is_rejected() {
        let err = GenerationDraft::new(CourseId::new(1), "Lifetimes")
            .with_difficulty("EXPERT")
            .validate()
            .unwrap_err();
        assert_eq!(err, ValidationError::UnknownDifficulty("EXPERT".into()));
    }

    #[test]
    fn new_material_falls_back_to_topic_and_default_estimate() {
        let request = GenerationDraft::new(CourseId::new(9), "Traits")
            .with_difficulty("BEGINNER")
            .validate()
            .unwrap();
        let material = NewMaterial::from_generated(&request, generated(""));

        assert_eq!(material.title, "Traits");
        assert_eq!(material.estimated_time_minutes, DEFAULT_ESTIMATED_MINUTES);
        assert_eq!(material.content_type, ContentType::AiGenerated);
        assert_eq!(material.difficulty_level, DifficultyLevel::Beginner);
        assert_eq!(material.course_id, CourseId::new(9));
        assert_eq!(material.ai_model_used.as_deref(), Some("gpt-4o"));
    }

    #[test]
    fn new_material_keeps_generated_title() {
        let request = GenerationDraft::new(CourseId::new(9), "Traits")
            .validate()
            .unwrap();
        let material = NewMaterial::from_generated(&request, generated("Intro to Traits"));
        assert_eq!(material.title, "Intro to Traits");
    }
}
