use std::fmt;

use studyflow_core::model::{GeneratedMaterial, GenerationRequest, MaterialId, PersistedMaterial};
use thiserror::Error;

/// Discriminant of [`GenerationState`] for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenerationStep {
    Configuring,
    Generating,
    ReviewingAndSaving,
    Succeeded,
    Failed,
}

impl GenerationStep {
    /// Position in the three-step stepper; terminal states sit on the last step.
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::Configuring => 0,
            Self::Generating => 1,
            Self::ReviewingAndSaving | Self::Succeeded | Self::Failed => 2,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self.index() {
            0 => "Configure Settings",
            1 => "Generate with AI",
            _ => "Review & Save",
        }
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    #[must_use]
    pub fn is_in_flight(self) -> bool {
        matches!(self, Self::Generating | Self::ReviewingAndSaving)
    }
}

impl fmt::Display for GenerationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum GenerationState {
    #[default]
    Configuring,
    Generating {
        request: GenerationRequest,
    },
    ReviewingAndSaving {
        request: GenerationRequest,
        material: GeneratedMaterial,
    },
    Succeeded {
        material: PersistedMaterial,
    },
    Failed {
        request: GenerationRequest,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum GenerationEvent {
    Submitted(GenerationRequest),
    Generated(GeneratedMaterial),
    GenerationFailed,
    Saved(PersistedMaterial),
    SaveFailed(String),
}

impl GenerationEvent {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Submitted(_) => "Submitted",
            Self::Generated(_) => "Generated",
            Self::GenerationFailed => "GenerationFailed",
            Self::Saved(_) => "Saved",
            Self::SaveFailed(_) => "SaveFailed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot apply {event} while {from}")]
pub struct InvalidTransition {
    pub from: GenerationStep,
    pub event: &'static str,
}

impl GenerationState {
    #[must_use]
    pub fn step(&self) -> GenerationStep {
        match self {
            Self::Configuring => GenerationStep::Configuring,
            Self::Generating { .. } => GenerationStep::Generating,
            Self::ReviewingAndSaving { .. } => GenerationStep::ReviewingAndSaving,
            Self::Succeeded { .. } => GenerationStep::Succeeded,
            Self::Failed { .. } => GenerationStep::Failed,
        }
    }

    /// Id of the saved material once the workflow succeeded.
    #[must_use]
    pub fn navigation_target(&self) -> Option<MaterialId> {
        match self {
            Self::Succeeded { material } => Some(material.id),
            _ => None,
        }
    }

    /// Compute the next state for `event`.
    ///
    /// A new submission is accepted from `Configuring` and from either
    /// terminal state. A generation failure returns to `Configuring`; a save
    /// failure is terminal.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` when `event` is not valid in the current state.
    pub fn transition(&self, event: GenerationEvent) -> Result<Self, InvalidTransition> {
        use GenerationEvent as E;

        match (self, event) {
            (Self::Configuring | Self::Succeeded { .. } | Self::Failed { .. }, E::Submitted(request)) => {
                Ok(Self::Generating { request })
            }
            (Self::Generating { request }, E::Generated(material)) => Ok(Self::ReviewingAndSaving {
                request: request.clone(),
                material,
            }),
            (Self::Generating { .. }, E::GenerationFailed) => Ok(Self::Configuring),
            (Self::ReviewingAndSaving { .. }, E::Saved(material)) => Ok(Self::Succeeded { material }),
            (Self::ReviewingAndSaving { request, .. }, E::SaveFailed(reason)) => Ok(Self::Failed {
                request: request.clone(),
                reason,
            }),
            (state, event) => Err(InvalidTransition {
                from: state.step(),
                event: event.name(),
            }),
        }
    }
}
