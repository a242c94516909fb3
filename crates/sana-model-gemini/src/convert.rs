//! Converts between sana-model generic types and the Gemini wire format.

use sana_model::Error;
use sana_model::request::{CompletionRequest, Message};
use sana_model::response::{Completion, Usage};

use crate::types::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part,
};

pub fn to_generate_content(req: &CompletionRequest) -> GenerateContentRequest {
    // Gemini takes the system instruction separately from the turn list.
    // The last system message wins; user/assistant turns map to the
    // "user"/"model" roles the API expects.
    let mut system_instruction: Option<Content> = None;
    let mut contents: Vec<Content> = Vec::new();

    for msg in &req.messages {
        match msg {
            Message::System { text } => {
                system_instruction = Some(Content {
                    role: None,
                    parts: vec![Part { text: text.clone() }],
                });
            }
            Message::User { text } => {
                contents.push(Content {
                    role: Some("user".to_string()),
                    parts: vec![Part { text: text.clone() }],
                });
            }
            Message::Assistant { text } => {
                contents.push(Content {
                    role: Some("model".to_string()),
                    parts: vec![Part { text: text.clone() }],
                });
            }
        }
    }

    let options = &req.options;
    let generation_config = if options.temperature.is_some()
        || options.max_output_tokens.is_some()
        || options.top_p.is_some()
    {
        Some(GenerationConfig {
            temperature: options.temperature,
            max_output_tokens: options.max_output_tokens,
            top_p: options.top_p,
        })
    } else {
        None
    };

    GenerateContentRequest {
        system_instruction,
        contents,
        generation_config,
    }
}

pub fn from_response(resp: GenerateContentResponse) -> Result<Completion, Error> {
    if let Some(feedback) = &resp.prompt_feedback
        && let Some(reason) = &feedback.block_reason
    {
        return Err(Error::Api {
            code: "blocked".to_string(),
            message: format!("prompt blocked: {reason}"),
        });
    }

    let usage = resp.usage_metadata.map(|u| Usage {
        input_tokens: u.prompt_token_count,
        output_tokens: u.candidates_token_count,
    });

    let Some(candidate) = resp.candidates.into_iter().next() else {
        return Err(Error::EmptyResponse("no candidates".to_string()));
    };

    if let Some(reason) = candidate.finish_reason.as_deref()
        && reason == "SAFETY"
    {
        return Err(Error::EmptyResponse(format!(
            "candidate suppressed: {reason}"
        )));
    }

    let text: String = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .map(|part| part.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(Error::EmptyResponse("candidate has no text".to_string()));
    }

    Ok(Completion { text, usage })
}
