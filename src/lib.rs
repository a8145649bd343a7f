//! `gymsense` is an async client for the GymSense pose-analysis service.
//!
//! An uploaded image and a fixed instruction are sent to a Gemini
//! `generateContent` endpoint. Failed attempts are retried with exponential
//! backoff up to a fixed budget:
//! - [`GymSenseClient::run_analysis`]
//! - [`GymSenseClient::generate`]
//! - [`retry_with_backoff`] for the bare retry loop

mod client;
mod error;
mod options;
mod request;
mod retry;
mod wire;

#[cfg(target_arch = "wasm32")]
mod wasm;

pub use client::{model_endpoint_url, GymSenseClient, DEFAULT_MODEL};
pub use error::{GymSenseError, TransientCallFailure};
pub use options::{ClientOptions, StatusPolicy};
pub use request::{AnalysisRequest, ImagePayload, DEFAULT_IMAGE_MIME, POSE_ANALYSIS_PROMPT};
pub use retry::{retry_with_backoff, Attempt, RetryError, RetryPolicy, MAX_BACKOFF_EXPONENT};

#[cfg(target_arch = "wasm32")]
pub use wasm::GymSenseAnalyzer;

pub type Result<T> = std::result::Result<T, GymSenseError>;
