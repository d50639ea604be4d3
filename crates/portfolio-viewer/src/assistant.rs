//! Project assistant: a chat about the open project, answered off the
//! render thread.
//!
//! Text generation sits behind [`TextGenerator`]. Requests go to a worker
//! thread over a channel; the frame loop polls for replies without blocking.
//! A failed generation becomes a reply message, nothing else sees it.

use anyhow::{bail, Context, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::Deserialize;
use serde_json::{json, Value};
use std::{thread, time::Duration};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Model,
}

impl Role {
    fn label(self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Model => "MODEL",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AssistantRequest {
    /// Free-text description of the project under discussion.
    pub context: String,
    /// Conversation so far, not including `query`.
    pub history: Vec<ChatMessage>,
    pub query: String,
}

/// Produces the assistant's answer to one request. Called on the worker
/// thread.
pub trait TextGenerator: Send + 'static {
    fn generate(&self, request: &AssistantRequest) -> Result<String>;
}

/// Composes the instruction block sent to a text generator.
pub fn build_prompt(request: &AssistantRequest) -> String {
    let history = request
        .history
        .iter()
        .map(|m| format!("{}: {}", m.role.label(), m.text))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are the architecture assistant of this portfolio.\n\
         You are discussing the project described as: \"{context}\".\n\
         \n\
         Style: futuristic, professional and concise, like a high-tech interface.\n\
         Answer questions about this project. Steer unrelated questions back to it.\n\
         \n\
         Conversation history:\n\
         {history}\n\
         \n\
         User question: {query}",
        context = request.context,
        history = history,
        query = request.query,
    )
}

/// Generator used when no API key is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineGenerator;

pub const OFFLINE_REPLY: &str =
    "Demo mode: assistant API key missing. Set PORTFOLIO_ASSISTANT_KEY or pass --assistant-key.";

impl TextGenerator for OfflineGenerator {
    fn generate(&self, request: &AssistantRequest) -> Result<String> {
        log::trace!("Offline assistant prompt:\n{}", build_prompt(request));
        Ok(OFFLINE_REPLY.to_string())
    }
}

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Posts a JSON body and returns the decoded JSON reply.
pub trait Transport: Send + 'static {
    fn post_json(&self, url: &str, api_key: &str, body: &Value) -> Result<Value>;
}

pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("building HTTP client")?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn post_json(&self, url: &str, api_key: &str, body: &Value) -> Result<Value> {
        let resp = self
            .client
            .post(url)
            .header("x-goog-api-key", api_key)
            .json(body)
            .send()
            .context("HTTP request failed")?;

        let status = resp.status();
        if !status.is_success() {
            bail!("HTTP error: {}", status);
        }
        resp.json().context("failed to read response")
    }
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}

#[derive(Debug, Default, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Default, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

/// Remote generator speaking the `generateContent` REST API.
pub struct RemoteGenerator<T = HttpTransport> {
    transport: T,
    url: String,
    api_key: String,
}

impl<T: Transport> RemoteGenerator<T> {
    pub fn new(transport: T, endpoint: &str, model: &str, api_key: impl Into<String>) -> Self {
        Self {
            transport,
            url: format!(
                "{}/models/{}:generateContent",
                endpoint.trim_end_matches('/'),
                model
            ),
            api_key: api_key.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl<T: Transport> TextGenerator for RemoteGenerator<T> {
    fn generate(&self, request: &AssistantRequest) -> Result<String> {
        let body = json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": build_prompt(request) }],
            }],
        });
        log::debug!("Assistant request to {}", self.url);

        let reply = self.transport.post_json(&self.url, &self.api_key, &body)?;
        let parsed: GenerateResponse =
            serde_json::from_value(reply).context("unexpected response shape")?;

        // Only the first candidate is shown; its parts form one answer.
        Ok(parsed
            .candidates
            .into_iter()
            .next()
            .map(|c| c.content.parts.into_iter().map(|p| p.text).collect::<String>())
            .unwrap_or_default())
    }
}

const FALLBACK_REPLY: &str = "Error: communication with the assistant was interrupted.";
const EMPTY_REPLY: &str = "Analyzing the schematic data... (no response generated)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantReply {
    pub ticket: u64,
    pub text: String,
}

struct Job {
    ticket: u64,
    request: AssistantRequest,
}

/// Owns the generator thread. Dropping the worker closes the job channel
/// and joins the thread.
pub struct AssistantWorker {
    jobs: Option<Sender<Job>>,
    replies: Receiver<AssistantReply>,
    handle: Option<thread::JoinHandle<()>>,
    next_ticket: u64,
}

impl AssistantWorker {
    pub fn spawn(generator: impl TextGenerator) -> Result<Self> {
        let (tx_jobs, rx_jobs) = unbounded::<Job>();
        let (tx_replies, rx_replies) = unbounded::<AssistantReply>();

        let handle = thread::Builder::new()
            .name("assistant".into())
            .spawn(move || {
                for job in rx_jobs.iter() {
                    let text = match generator.generate(&job.request) {
                        Ok(text) if text.trim().is_empty() => EMPTY_REPLY.to_string(),
                        Ok(text) => text,
                        Err(err) => {
                            log::error!("Assistant request {} failed: {:#}", job.ticket, err);
                            FALLBACK_REPLY.to_string()
                        }
                    };
                    let reply = AssistantReply {
                        ticket: job.ticket,
                        text,
                    };
                    if tx_replies.send(reply).is_err() {
                        break;
                    }
                }
                log::debug!("Assistant thread exiting");
            })?;

        Ok(Self {
            jobs: Some(tx_jobs),
            replies: rx_replies,
            handle: Some(handle),
            next_ticket: 1,
        })
    }

    /// Queues a request and returns its ticket.
    pub fn submit(&mut self, request: AssistantRequest) -> u64 {
        let ticket = self.next_ticket;
        self.next_ticket += 1;

        let sent = self
            .jobs
            .as_ref()
            .is_some_and(|tx| tx.send(Job { ticket, request }).is_ok());
        if !sent {
            log::warn!("Assistant thread is gone; request {} dropped", ticket);
        }
        ticket
    }

    /// Non-blocking; returns the next finished reply if there is one.
    pub fn poll(&self) -> Option<AssistantReply> {
        self.replies.try_recv().ok()
    }
}

impl Drop for AssistantWorker {
    fn drop(&mut self) {
        self.jobs = None;
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Assistant thread panicked");
            }
        }
    }
}

/// Conversation about one project.
#[derive(Debug, Clone)]
pub struct ChatSession {
    context: String,
    messages: Vec<ChatMessage>,
    pending: Option<u64>,
}

impl ChatSession {
    pub fn new(project_title: &str, context: &str) -> Self {
        let welcome = format!(
            "Hello. I am the assistant for {}. Ask me anything about the design \
             concepts or technical specifications.",
            project_title
        );
        Self {
            context: context.to_string(),
            messages: vec![ChatMessage::model(welcome)],
            pending: None,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_waiting(&self) -> bool {
        self.pending.is_some()
    }

    /// Sends `query` unless it is blank or a reply is still outstanding.
    pub fn send(&mut self, worker: &mut AssistantWorker, query: &str) -> bool {
        let query = query.trim();
        if query.is_empty() || self.is_waiting() {
            return false;
        }

        let request = AssistantRequest {
            context: self.context.clone(),
            history: self.messages.clone(),
            query: query.to_string(),
        };
        self.messages.push(ChatMessage::user(query));
        self.pending = Some(worker.submit(request));
        true
    }

    /// Accepts `reply` if it answers this session's outstanding request.
    pub fn receive(&mut self, reply: &AssistantReply) -> bool {
        if self.pending != Some(reply.ticket) {
            return false;
        }
        self.pending = None;
        self.messages.push(ChatMessage::model(reply.text.clone()));
        true
    }
}
