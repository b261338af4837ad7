use remote::{DataAccess, InMemoryBackend};
use services::{GenerationStep, GenerationWorkflow};
use std::sync::Arc;
use studyflow_core::model::{ContentType, CourseId, DifficultyLevel, GenerationDraft};

#[tokio::test(start_paused = true)]
async fn generated_material_is_saved_after_review() {
    let backend = InMemoryBackend::new();
    let workflow = GenerationWorkflow::new(Arc::new(backend.clone()), Arc::new(backend.clone()));

    let save = workflow
        .submit(
            GenerationDraft::new(CourseId::new(2), "Error handling")
                .with_difficulty("ADVANCED")
                .with_preferences("focus on thiserror"),
        )
        .await
        .unwrap();
    assert!(save.material().content.contains("focus on thiserror"));

    let persisted = save.outcome().await.unwrap();

    assert_eq!(workflow.step().unwrap(), GenerationStep::Succeeded);
    assert_eq!(workflow.navigation_target().unwrap(), Some(persisted.id));

    let stored = backend.material(persisted.id).unwrap();
    assert_eq!(stored.content_type, ContentType::AiGenerated);
    assert_eq!(stored.difficulty_level, DifficultyLevel::Advanced);
    assert_eq!(stored.estimated_time_minutes, 30);
    assert_eq!(stored.ai_model_used.as_deref(), Some("in-memory"));
}

#[tokio::test(start_paused = true)]
async fn data_access_wires_in_memory_collaborators() {
    let access = DataAccess::in_memory();
    let workflow = GenerationWorkflow::new(access.generator, access.materials);

    let persisted = workflow
        .submit(GenerationDraft::new(CourseId::new(1), "Modules"))
        .await
        .unwrap()
        .outcome()
        .await
        .unwrap();

    assert_eq!(persisted.title, "Modules");
}
