//! Rename plan requester.
//!
//! Sends the prompt to the completion service and turns the streamed answer
//! into a plan. Models that support schema-constrained output get the plan
//! schema attached to the request; older models are asked for JSONL and the
//! answer is parsed line by line. Either way the answer is echoed to stdout
//! while it streams.

use crate::core::prompt::Prompt;
use crate::core::stream::{ResponseMode, StreamAccumulator};
use crate::models::plan::RenamePlan;
use crate::services::openai::{ChatRequest, CompletionClient, Fragment};
use crate::Result;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::io::Write;

/// Models known to accept a JSON schema response format.
pub const STRUCTURED_MODELS: &[&str] = &[
    "gpt-4o",
    "gpt-4o-mini",
    "gpt-4o-2024-08-06",
    "gpt-4o-2024-11-20",
    "gpt-4o-mini-2024-07-18",
];

/// Fine-tuned model names look like `ft:<base>:<org>::<id>`.
const FINE_TUNE_PREFIX: &str = "ft:";

impl ResponseMode {
    /// Pick the response mode for a model name.
    pub fn for_model(model: &str) -> Self {
        let base = match model.strip_prefix(FINE_TUNE_PREFIX) {
            Some(rest) => rest.split(':').next().unwrap_or(rest),
            None => model,
        };
        if STRUCTURED_MODELS.contains(&base) {
            ResponseMode::Structured
        } else {
            ResponseMode::Freeform
        }
    }
}

/// Something that turns a prompt into a rename plan.
#[async_trait]
pub trait PlanRequester: Send + Sync {
    async fn request_plan(&self, prompt: &Prompt) -> Result<RenamePlan>;
}

/// `response_format` for the plan schema.
pub fn plan_response_format() -> Value {
    json!({
        "type": "json_schema",
        "json_schema": {
            "name": "Files",
            "strict": true,
            "schema": {
                "type": "object",
                "properties": {
                    "files": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "index": {"type": "integer"},
                                "name": {"type": "string"}
                            },
                            "required": ["index", "name"],
                            "additionalProperties": false
                        }
                    }
                },
                "required": ["files"],
                "additionalProperties": false
            }
        }
    })
}

/// Requester for models with schema-constrained output.
pub struct StructuredRequester {
    client: CompletionClient,
}

impl StructuredRequester {
    pub fn new(client: CompletionClient) -> Self {
        Self { client }
    }

    /// The plain system prompt with the plan schema attached.
    pub fn build_request(&self, prompt: &Prompt) -> ChatRequest {
        self.client.request(
            prompt.system.clone(),
            prompt.user.clone(),
            Some(plan_response_format()),
        )
    }
}

#[async_trait]
impl PlanRequester for StructuredRequester {
    async fn request_plan(&self, prompt: &Prompt) -> Result<RenamePlan> {
        let request = self.build_request(prompt);
        stream_into_plan(&self.client, &request, ResponseMode::Structured).await
    }
}

/// Requester for models that only produce free text.
pub struct FreeformRequester {
    client: CompletionClient,
}

impl FreeformRequester {
    pub fn new(client: CompletionClient) -> Self {
        Self { client }
    }

    /// The system prompt asks for JSONL; no response format is sent.
    pub fn build_request(&self, prompt: &Prompt) -> ChatRequest {
        self.client.request(
            prompt.system_with_format_instruction(),
            prompt.user.clone(),
            None,
        )
    }
}

#[async_trait]
impl PlanRequester for FreeformRequester {
    async fn request_plan(&self, prompt: &Prompt) -> Result<RenamePlan> {
        let request = self.build_request(prompt);
        stream_into_plan(&self.client, &request, ResponseMode::Freeform).await
    }
}

/// Build the requester matching the client's model.
pub fn requester_for(client: CompletionClient) -> Box<dyn PlanRequester> {
    match ResponseMode::for_model(client.model()) {
        ResponseMode::Structured => {
            tracing::debug!("Model {} supports structured output", client.model());
            Box::new(StructuredRequester::new(client))
        }
        ResponseMode::Freeform => {
            tracing::debug!("Model {} uses free-text output", client.model());
            Box::new(FreeformRequester::new(client))
        }
    }
}

async fn stream_into_plan(
    client: &CompletionClient,
    request: &ChatRequest,
    mode: ResponseMode,
) -> Result<RenamePlan> {
    let mut accumulator = StreamAccumulator::new(mode);
    let mut stdout = std::io::stdout();

    client
        .stream_chat(request, |fragment: Fragment| {
            if let Some(text) = accumulator.accept(fragment) {
                stdout.write_all(text.as_bytes())?;
                stdout.flush()?;
            }
            Ok(())
        })
        .await?;
    writeln!(stdout)?;

    accumulator.finish()
}
