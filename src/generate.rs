//! Generation service boundary.
//!
//! The pipeline only depends on the [`Generator`] trait. [`GeminiClient`] is
//! the production implementation: a blocking HTTP client for the Gemini
//! `generateContent` endpoint that requests structured output carrying the
//! rewritten file and a short justification.

use crate::config::{API_KEY_ENV, Config};
use crate::error::{Error, Result};
use crate::model::ModelId;
use crate::recipe::Instruction;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::Read;
use std::time::Duration;
use tracing::{debug, instrument};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_RESPONSE_BYTES: usize = 16 * 1024 * 1024;
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Text returned by the generation service for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    /// New file body, written verbatim
    pub text: String,
    /// Model's short explanation of the change, when provided
    pub reason: Option<String>,
}

impl Generation {
    /// Creates a generation without a reason.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            reason: None,
        }
    }
}

/// A fallible, blocking text generation operation.
pub trait Generator {
    /// Sends `instruction` and returns the generated file body.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails for any reason.
    fn generate(&self, instruction: &Instruction) -> Result<Generation>;
}

impl<F> Generator for F
where
    F: Fn(&Instruction) -> Result<Generation>,
{
    fn generate(&self, instruction: &Instruction) -> Result<Generation> {
        self(instruction)
    }
}

/// Blocking client for the Gemini `generateContent` API.
pub struct GeminiClient {
    agent: ureq::Agent,
    api_key: String,
    base_url: String,
    model: ModelId,
    temperature: f32,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Creates a client for `model` using `api_key`.
    #[must_use]
    pub fn new(
        api_key: impl Into<String>,
        model: ModelId,
        base_url: impl Into<String>,
        temperature: f32,
    ) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(CONNECT_TIMEOUT)
            .build();

        Self {
            agent,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model,
            temperature,
        }
    }

    /// Creates a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingCredential`] if no API key is configured.
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config
            .api_key()
            .ok_or_else(|| Error::missing_credential(API_KEY_ENV))?;

        Ok(Self::new(
            api_key,
            config.model,
            config.api_base_url.clone(),
            config.temperature,
        ))
    }

    /// Returns the model this client calls.
    #[must_use]
    pub const fn model(&self) -> ModelId {
        self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url,
            self.model.id()
        )
    }

    fn request_body<'a>(&self, instruction: &'a Instruction) -> GenerateContentRequest<'a> {
        GenerateContentRequest {
            system_instruction: instruction.system().map(|text| ContentWire {
                role: None,
                parts: vec![PartWire { text }],
            }),
            contents: vec![ContentWire {
                role: Some("user"),
                parts: vec![PartWire {
                    text: instruction.user(),
                }],
            }],
            generation_config: GenerationConfigWire {
                temperature: self.temperature,
                response_mime_type: "application/json",
                response_schema: json!({
                    "type": "OBJECT",
                    "properties": {
                        "reason": { "type": "STRING" },
                        "enhancedFile": { "type": "STRING" }
                    },
                    "required": ["reason", "enhancedFile"],
                    "propertyOrdering": ["reason", "enhancedFile"]
                }),
            },
        }
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::generation(self.model.id(), message)
    }
}

impl Generator for GeminiClient {
    #[instrument(skip_all, fields(model = %self.model))]
    fn generate(&self, instruction: &Instruction) -> Result<Generation> {
        debug!("Sending {} instruction chars", instruction.char_count());

        let response = match self
            .agent
            .post(&self.endpoint())
            .set("Content-Type", "application/json")
            .set("x-goog-api-key", &self.api_key)
            .send_json(self.request_body(instruction))
        {
            Ok(response) => response,
            Err(ureq::Error::Status(code, response)) => {
                let body = read_body_limited(response, MAX_RESPONSE_BYTES).unwrap_or_else(|e| e);
                return Err(self.error(format!("HTTP {code}: {}", truncate(&body))));
            }
            Err(ureq::Error::Transport(err)) => {
                return Err(self.error(err.to_string()));
            }
        };

        let body = read_body_limited(response, MAX_RESPONSE_BYTES).map_err(|e| self.error(e))?;
        parse_generation(&body).map_err(|e| self.error(e))
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<ContentWire<'a>>,
    contents: Vec<ContentWire<'a>>,
    generation_config: GenerationConfigWire,
}

#[derive(Serialize)]
struct ContentWire<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<PartWire<'a>>,
}

#[derive(Serialize)]
struct PartWire<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfigWire {
    temperature: f32,
    response_mime_type: &'static str,
    response_schema: serde_json::Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<CandidateWire>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedbackWire>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CandidateWire {
    #[serde(default)]
    content: Option<CandidateContentWire>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContentWire {
    #[serde(default)]
    parts: Vec<CandidatePartWire>,
}

#[derive(Deserialize)]
struct CandidatePartWire {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedbackWire {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnhancedFileWire {
    #[serde(default)]
    reason: Option<String>,
    enhanced_file: String,
}

fn parse_generation(body: &str) -> std::result::Result<Generation, String> {
    let response: GenerateContentResponse =
        serde_json::from_str(body).map_err(|e| format!("Invalid response JSON: {e}"))?;

    if let Some(reason) = response
        .prompt_feedback
        .and_then(|feedback| feedback.block_reason)
    {
        return Err(format!("Prompt blocked: {reason}"));
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| "Response contained no candidates".to_string())?;

    let text: String = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    if text.is_empty() {
        let finish = candidate.finish_reason.as_deref().unwrap_or("unknown");
        return Err(format!("Candidate contained no text (finish reason: {finish})"));
    }

    let structured: EnhancedFileWire = serde_json::from_str(&text)
        .map_err(|e| format!("Structured output did not match schema: {e}"))?;

    Ok(Generation {
        text: structured.enhanced_file,
        reason: structured.reason.filter(|r| !r.trim().is_empty()),
    })
}

fn read_body_limited(response: ureq::Response, max_bytes: usize) -> std::result::Result<String, String> {
    let mut limited = response.into_reader().take(max_bytes as u64 + 1);
    let mut bytes = Vec::new();
    limited
        .read_to_end(&mut bytes)
        .map_err(|e| format!("Failed to read response: {e}"))?;
    if bytes.len() > max_bytes {
        return Err(format!("Response exceeded {max_bytes} bytes"));
    }
    String::from_utf8(bytes).map_err(|e| format!("Response was not UTF-8: {e}"))
}

fn truncate(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= MAX_ERROR_BODY_CHARS {
        return trimmed.to_string();
    }
    let mut short: String = trimmed.chars().take(MAX_ERROR_BODY_CHARS).collect();
    short.push('…');
    short
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::thread;

    /// Serves a single canned response and hands back the raw request.
    fn serve_once(response: String) -> (String, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let request = read_request(&mut stream);
                let _ = tx.send(request);
                let _ = stream.write_all(response.as_bytes());
            }
        });
        (format!("http://{addr}"), rx)
    }

    fn read_request(stream: &mut std::net::TcpStream) -> String {
        let mut data = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = stream.read(&mut buf).unwrap_or(0);
            if n == 0 {
                break;
            }
            data.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&data);
            if let Some(header_end) = text.find("\r\n\r\n") {
                let length = text[..header_end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if data.len() >= header_end + 4 + length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&data).into_owned()
    }

    fn http_ok(body: &str) -> String {
        format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        )
    }

    fn candidate_body(inner: &serde_json::Value) -> String {
        json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": inner.to_string() }] },
                "finishReason": "STOP"
            }]
        })
        .to_string()
    }

    fn pair() -> Instruction {
        Instruction::Pair {
            system: "rules".to_string(),
            user: "File: a.dto.ts".to_string(),
        }
    }

    #[test]
    fn test_generate_returns_enhanced_file() {
        let inner = json!({ "reason": "added UUID checks", "enhancedFile": "export class A {}\n" });
        let (url, requests) = serve_once(http_ok(&candidate_body(&inner)));

        let client = GeminiClient::new("test-key", ModelId::Gemini25Flash, url, 0.3);
        let generation = client.generate(&pair()).unwrap();

        assert_eq!(generation.text, "export class A {}\n");
        assert_eq!(generation.reason.as_deref(), Some("added UUID checks"));

        let request = requests.recv().unwrap();
        assert!(request.starts_with("POST /v1beta/models/gemini-2.5-flash:generateContent"));
        assert!(request.to_ascii_lowercase().contains("x-goog-api-key: test-key"));
        assert!(request.contains("\"systemInstruction\""));
        assert!(request.contains("\"enhancedFile\""));
    }

    #[test]
    fn test_combined_instruction_has_no_system_part() {
        let inner = json!({ "reason": "", "enhancedFile": "x" });
        let (url, requests) = serve_once(http_ok(&candidate_body(&inner)));

        let client = GeminiClient::new("k", ModelId::Gemini25Pro, url, 0.3);
        let generation = client
            .generate(&Instruction::Combined("everything".to_string()))
            .unwrap();

        assert_eq!(generation.text, "x");
        assert_eq!(generation.reason, None);

        let request = requests.recv().unwrap();
        assert!(request.contains("gemini-2.5-pro:generateContent"));
        assert!(!request.contains("systemInstruction"));
    }

    #[test]
    fn test_http_error_maps_to_generation_error() {
        let body = r#"{"error":{"code":429,"message":"quota exceeded"}}"#;
        let response = format!(
            "HTTP/1.1 429 Too Many Requests\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        );
        let (url, _requests) = serve_once(response);

        let client = GeminiClient::new("k", ModelId::Gemini25Flash, url, 0.3);
        let err = client.generate(&pair()).unwrap_err();

        assert!(matches!(err, Error::Generation { .. }));
        let message = err.to_string();
        assert!(message.contains("HTTP 429"));
        assert!(message.contains("quota exceeded"));
    }

    #[test]
    fn test_transport_error_maps_to_generation_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = GeminiClient::new("k", ModelId::Gemini25Flash, format!("http://{addr}"), 0.3);
        let err = client.generate(&pair()).unwrap_err();

        assert!(matches!(err, Error::Generation { .. }));
    }

    #[test]
    fn test_from_config_requires_api_key() {
        let temp = assert_fs::TempDir::new().unwrap();
        let config = Config::builder().root_dir(temp.path()).build().unwrap();

        let err = GeminiClient::from_config(&config).unwrap_err();
        assert!(err.is_missing_credential());
        assert!(err.to_string().contains(API_KEY_ENV));
    }

    #[test]
    fn test_parse_blocked_prompt() {
        let body = json!({ "promptFeedback": { "blockReason": "SAFETY" } }).to_string();
        let err = parse_generation(&body).unwrap_err();
        assert!(err.contains("SAFETY"));
    }

    #[test]
    fn test_parse_empty_candidate() {
        let body = json!({ "candidates": [{ "finishReason": "MAX_TOKENS" }] }).to_string();
        let err = parse_generation(&body).unwrap_err();
        assert!(err.contains("MAX_TOKENS"));
    }

    #[test]
    fn test_parse_unstructured_text_is_rejected() {
        let body = json!({
            "candidates": [{ "content": { "parts": [{ "text": "export class A {}" }] } }]
        })
        .to_string();
        let err = parse_generation(&body).unwrap_err();
        assert!(err.contains("schema"));
    }

    #[test]
    fn test_parse_joins_split_parts() {
        let body = json!({
            "candidates": [{ "content": { "parts": [
                { "text": "{\"reason\":\"r\"," },
                { "text": "\"enhancedFile\":\"body\"}" }
            ] } }]
        })
        .to_string();
        let generation = parse_generation(&body).unwrap();
        assert_eq!(generation.text, "body");
    }

    #[test]
    fn test_closure_generator() {
        let generator = |instruction: &Instruction| -> Result<Generation> {
            Ok(Generation::new(instruction.user().to_uppercase()))
        };
        let generation = generator.generate(&Instruction::Combined("abc".to_string())).unwrap();
        assert_eq!(generation.text, "ABC");
    }

    #[test]
    fn test_truncate_long_bodies() {
        let long = "x".repeat(MAX_ERROR_BODY_CHARS + 10);
        let short = truncate(&long);
        assert_eq!(short.chars().count(), MAX_ERROR_BODY_CHARS + 1);
        assert_eq!(truncate("  ok "), "ok");
    }
}
