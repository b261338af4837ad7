use std::collections::BTreeMap;
use std::env;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use studyflow_core::model::{
    Answer, AnswerId, AnswerSelection, GeneratedMaterial, GenerationRequest, MaterialId,
    NewMaterial, PersistedMaterial, ProgressRecord, ProgressStatus, Question, QuestionId, Quiz,
    QuizId,
};

use crate::repository::{
    MaterialGenerator, MaterialRepository, ProgressRepository, QuizRepository, RemoteError,
};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub base_url: String,
    /// Bearer token issued by the auth collaborator; sent as-is.
    pub token: Option<String>,
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ApiConfig {
    /// Read `STUDYFLOW_API_URL`, `STUDYFLOW_API_TOKEN` and
    /// `STUDYFLOW_API_TIMEOUT_SECS`, falling back to defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let base_url = env::var("STUDYFLOW_API_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.into());
        let token = env::var("STUDYFLOW_API_TOKEN")
            .ok()
            .filter(|token| !token.trim().is_empty());
        let timeout = env::var("STUDYFLOW_API_TIMEOUT_SECS")
            .ok()
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .map_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS), Duration::from_secs);
        Self {
            base_url,
            token,
            timeout,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// HTTP adapter for every collaborator of the content/assessment service.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: ApiConfig,
}

impl HttpClient {
    /// # Errors
    ///
    /// Returns `RemoteError::Connection` if the underlying client cannot be built.
    pub fn new(config: ApiConfig) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RemoteError::Connection(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, RemoteError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| RemoteError::Connection(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        warn!("remote call failed with status {status}: {message}");
        Err(status_error(status, message))
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, RemoteError> {
        let response = self.send(request).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| RemoteError::Serialization(e.to_string()))
    }
}

fn status_error(status: StatusCode, message: String) -> RemoteError {
    if status == StatusCode::NOT_FOUND {
        RemoteError::NotFound
    } else {
        RemoteError::Rejected {
            status: status.as_u16(),
            message,
        }
    }
}

#[async_trait]
impl MaterialGenerator for HttpClient {
    async fn generate_material(
        &self,
        request: &GenerationRequest,
    ) -> Result<GeneratedMaterial, RemoteError> {
        let url = self.config.url("ai/generate-material");
        debug!("POST {url} topic={:?}", request.topic());
        self.send_json(self.client.post(url).json(request)).await
    }
}

#[async_trait]
impl MaterialRepository for HttpClient {
    async fn persist_material(
        &self,
        material: &NewMaterial,
    ) -> Result<PersistedMaterial, RemoteError> {
        let url = self.config.url("materials");
        debug!("POST {url} course={}", material.course_id);
        self.send_json(self.client.post(url).json(material)).await
    }
}

#[async_trait]
impl QuizRepository for HttpClient {
    async fn fetch_quiz(&self, id: QuizId) -> Result<Quiz, RemoteError> {
        let url = self.config.url(&format!("quizzes/{id}"));
        debug!("GET {url}");
        let dto: QuizDto = self.send_json(self.client.get(url)).await?;
        Ok(dto.into_quiz())
    }

    async fn evaluate_quiz(
        &self,
        id: QuizId,
        answers: &AnswerSelection,
    ) -> Result<f64, RemoteError> {
        let url = self.config.url(&format!("quizzes/evaluate/{id}"));
        debug!("POST {url} answers={}", answers.len());
        self.send_json(self.client.post(url).json(&answers_body(answers)))
            .await
    }
}

#[async_trait]
impl ProgressRepository for HttpClient {
    async fn upsert_progress(&self, record: &ProgressRecord) -> Result<(), RemoteError> {
        let url = self.config.url(&format!("progress/{}", record.material_id()));
        debug!("PUT {url} status={:?}", record.status());
        self.send(self.client.put(url).json(&ProgressBody::from(record)))
            .await?;
        Ok(())
    }
}

//
// ─── WIRE FORMAT ───────────────────────────────────────────────────────────────
//

fn answers_body(answers: &AnswerSelection) -> BTreeMap<u64, u64> {
    answers
        .iter()
        .map(|(question, answer)| (question.value(), answer.value()))
        .collect()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuizDto {
    id: u64,
    #[serde(default)]
    title: String,
    material_id: u64,
    #[serde(default)]
    questions: Vec<QuestionDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuestionDto {
    id: u64,
    question_text: String,
    #[serde(default)]
    answers: Vec<AnswerDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnswerDto {
    id: u64,
    answer_text: String,
    #[serde(default)]
    correct: bool,
    #[serde(default)]
    explanation: Option<String>,
}

impl QuizDto {
    fn into_quiz(self) -> Quiz {
        let questions = self
            .questions
            .into_iter()
            .map(|q| {
                let answers = q
                    .answers
                    .into_iter()
                    .map(|a| {
                        let answer = Answer::new(AnswerId::new(a.id), a.answer_text);
                        if a.correct {
                            answer.correct(a.explanation)
                        } else {
                            answer
                        }
                    })
                    .collect();
                Question::new(QuestionId::new(q.id), q.question_text, answers)
            })
            .collect();
        Quiz::new(
            QuizId::new(self.id),
            self.title,
            MaterialId::new(self.material_id),
            questions,
        )
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProgressBody {
    status: ProgressStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    completion_time: Option<u32>,
}

impl From<&ProgressRecord> for ProgressBody {
    fn from(record: &ProgressRecord) -> Self {
        Self {
            status: record.status(),
            score: record.score(),
            completion_time: record.completion_time_minutes(),
        }
    }
}
