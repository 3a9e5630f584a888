// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Diagrammr-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Diagrammr and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Contracts with the services around the editor: the model that drafts a diagram from a
//! transcript, and the backend that stores the result.
//!
//! Nothing here talks to the network. A concrete client implements [`CompletionClient`] and
//! [`RetryingGenerator`] turns it into a [`DiagramGenerator`] with the shared retry policy.

use std::error::Error;
use std::fmt::Write as _;
use std::time::Duration;

use crate::convert::PersistenceBatch;
use crate::model::{
    parse_ai_response, structured_output_schema, AiGeneratedDiagram, AiResponseError, DiagramId,
    UserId,
};

/// Attempts made before a generation failure is surfaced.
pub const MAX_ATTEMPTS: u32 = 3;

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

pub const SYSTEM_PROMPT: &str = "You turn technical conversation transcripts into flowchart \
diagrams for client presentations.

Rules:
- At most 25 elements; prefer fewer, meaningful ones.
- Element types: system (external services, APIs, infrastructure), process (business logic, \
transformations), decision (conditions, approval gates), data (stores, queues, files), \
user_action (manual steps).
- Connection types: data_flow, process_flow, dependency, trigger.
- Lay flows out left to right (x 100..1800) and use y (100..1800) for parallel branches.
- Connection indices refer to the elements array: 0..N-1, never the same index twice.
- highLevelDescription is for business stakeholders; technicalDescription is for developers.";

/// Wait before retrying after failed attempt `attempt` (1-based): one second per attempt.
pub fn backoff_for_attempt(attempt: u32) -> Duration {
    Duration::from_secs(u64::from(attempt))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub transcript: String,
    pub project_title: String,
    pub client_name: String,
    pub notes: Option<String>,
}

impl GenerationRequest {
    pub fn new(
        transcript: impl Into<String>,
        project_title: impl Into<String>,
        client_name: impl Into<String>,
    ) -> Self {
        Self {
            transcript: transcript.into(),
            project_title: project_title.into(),
            client_name: client_name.into(),
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// The user message sent alongside [`SYSTEM_PROMPT`].
    pub fn user_prompt(&self) -> String {
        let notes = self
            .notes
            .as_deref()
            .map(str::trim)
            .filter(|notes| !notes.is_empty())
            .unwrap_or("none");

        let mut prompt = String::new();
        let _ = writeln!(prompt, "Project: \"{}\"", self.project_title);
        let _ = writeln!(prompt, "Client: {}", self.client_name);
        let _ = writeln!(prompt, "Notes: {notes}");
        let _ = writeln!(prompt);
        let _ = writeln!(prompt, "Transcript:");
        let _ = writeln!(prompt, "{}", self.transcript.trim());
        let _ = writeln!(prompt);
        let _ = write!(
            prompt,
            "Extract the core technical workflow (8-20 elements) with its systems, data flows, \
             APIs and integrations, ready to present to {}.",
            self.client_name
        );
        prompt
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("OPENAI_API_KEY is not set")]
    MissingApiKey,
    #[error("model returned an empty response")]
    EmptyResponse,
    #[error(transparent)]
    InvalidResponse(#[from] AiResponseError),
    #[error("completion request failed: {0}")]
    Upstream(String),
    #[error("diagram generation failed after {attempts} attempts: {last_error}")]
    Exhausted {
        attempts: u32,
        #[source]
        last_error: Box<GenerateError>,
    },
}

impl GenerateError {
    /// Configuration problems are not fixed by trying again.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::MissingApiKey | Self::Exhausted { .. })
    }
}

/// Reads the provider key from the environment, rejecting blank values.
pub fn api_key_from_env() -> Result<String, GenerateError> {
    std::env::var(API_KEY_VAR)
        .ok()
        .filter(|key| !key.trim().is_empty())
        .ok_or(GenerateError::MissingApiKey)
}

/// Drafts a diagram from a transcript.
pub trait DiagramGenerator {
    fn generate(&self, request: &GenerationRequest) -> Result<AiGeneratedDiagram, GenerateError>;
}

/// One structured-output completion call to the model provider.
pub trait CompletionClient {
    /// Returns the raw JSON text of the reply, or `None` when the reply had no content.
    fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        schema: &serde_json::Value,
    ) -> Result<Option<String>, GenerateError>;
}

/// [`DiagramGenerator`] over a [`CompletionClient`] that validates every reply and retries
/// failed attempts with a linear backoff.
pub struct RetryingGenerator<C> {
    client: C,
    max_attempts: u32,
    sleep: fn(Duration),
}

impl<C: CompletionClient> RetryingGenerator<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            max_attempts: MAX_ATTEMPTS,
            sleep: std::thread::sleep,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Replaces the pause between attempts (tests pass a no-op).
    pub fn with_sleep(mut self, sleep: fn(Duration)) -> Self {
        self.sleep = sleep;
        self
    }

    fn attempt(
        &self,
        user_prompt: &str,
        schema: &serde_json::Value,
    ) -> Result<AiGeneratedDiagram, GenerateError> {
        let raw = self
            .client
            .complete(SYSTEM_PROMPT, user_prompt, schema)?
            .filter(|raw| !raw.trim().is_empty())
            .ok_or(GenerateError::EmptyResponse)?;
        Ok(parse_ai_response(&raw)?)
    }
}

impl<C: CompletionClient> DiagramGenerator for RetryingGenerator<C> {
    fn generate(&self, request: &GenerationRequest) -> Result<AiGeneratedDiagram, GenerateError> {
        let user_prompt = request.user_prompt();
        let schema = structured_output_schema();

        let mut attempt = 1;
        loop {
            tracing::debug!(attempt, max = self.max_attempts, "generating diagram");
            let err = match self.attempt(&user_prompt, &schema) {
                Ok(diagram) => {
                    tracing::info!(
                        attempt,
                        elements = diagram.elements.len(),
                        connections = diagram.connections.len(),
                        "diagram generated"
                    );
                    return Ok(diagram);
                }
                Err(err) if !err.is_retryable() => return Err(err),
                Err(err) => err,
            };

            tracing::warn!(attempt, error = %err, "generation attempt failed");
            if attempt >= self.max_attempts {
                return Err(GenerateError::Exhausted {
                    attempts: attempt,
                    last_error: Box::new(err),
                });
            }
            (self.sleep)(backoff_for_attempt(attempt));
            attempt += 1;
        }
    }
}

/// Backend that stores a diagram's rows for a user.
pub trait DiagramPersistence {
    fn save(
        &mut self,
        diagram_id: &DiagramId,
        user_id: &UserId,
        batch: &PersistenceBatch,
    ) -> Result<(), Box<dyn Error + Send + Sync>>;
}
