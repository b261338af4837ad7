#![forbid(unsafe_code)]

pub mod http;
pub mod repository;

pub use http::{ApiConfig, HttpClient};
pub use repository::{
    DataAccess, InMemoryBackend, MaterialGenerator, MaterialRepository, ProgressRepository,
    QuizRepository, RemoteError,
};
