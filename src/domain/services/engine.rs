#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;

use std::collections::VecDeque;
use std::fmt;
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::task::Context;
use std::task::Poll;

use anyhow::bail;
use anyhow::Result;
use futures::stream::BoxStream;
use futures::Stream;
use futures::StreamExt;
use futures::TryStreamExt;
use serde_json::Value;
use tokio::io::AsyncBufRead;
use tokio::io::AsyncBufReadExt;
use tokio::io::Split;
use tokio::sync::mpsc;
use tokio_util::io::StreamReader;

use super::StreamDecoder;
use crate::domain::models::find_error;
use crate::domain::models::normalize_endpoint;
use crate::domain::models::ChatRequest;
use crate::domain::models::ConfigChange;
use crate::domain::models::ConfigMutation;
use crate::domain::models::EngineError;
use crate::domain::models::ErrorKind;
use crate::domain::models::Event;
use crate::domain::models::ExplainFraming;
use crate::domain::models::HistoryStore;
use crate::domain::models::Message;
use crate::domain::models::SessionConfig;
use crate::domain::models::SessionId;
use crate::domain::models::SlashCommand;
use crate::domain::models::VendorRef;
use crate::infrastructure::vendors::VendorManager;

type BodyLines = Split<Pin<Box<dyn AsyncBufRead + Send>>>;

struct EngineState {
    config: SessionConfig,
    vendor: VendorRef,
    history: HistoryStore,
    session_id: SessionId,
    explain_framing: ExplainFraming,
    in_flight: Option<u64>,
    next_exchange_id: u64,
}

// The lock is only ever taken inside these small synchronous helpers, never
// across an await point.
fn lock(state: &Mutex<EngineState>) -> MutexGuard<'_, EngineState> {
    return state.lock().unwrap_or_else(PoisonError::into_inner);
}

fn release(state: &Mutex<EngineState>, id: u64) {
    let mut state = lock(state);
    if state.in_flight == Some(id) {
        state.in_flight = None;
    }
}

/// What a front-end should do with a line of raw input after `submit`.
#[derive(Debug)]
pub enum Submission {
    Exchange(Exchange),
    Configured(ConfigChange),
    StartedOver,
    /// Commands the engine has no behaviour for, handed back to the caller.
    Command(SlashCommand),
}

/// A single conversation with one endpoint. Cloning hands out another handle
/// to the same session.
#[derive(Clone)]
pub struct SessionEngine {
    state: Arc<Mutex<EngineState>>,
    client: reqwest::Client,
}

impl SessionEngine {
    pub fn new(config: SessionConfig) -> SessionEngine {
        return SessionEngine::with_client(config, reqwest::Client::new());
    }

    pub fn with_client(config: SessionConfig, client: reqwest::Client) -> SessionEngine {
        let vendor = VendorManager::get(config.vendor());
        let state = EngineState {
            config,
            vendor,
            history: HistoryStore::default(),
            session_id: SessionId::generate(),
            explain_framing: ExplainFraming::default(),
            in_flight: None,
            next_exchange_id: 0,
        };

        return SessionEngine {
            state: Arc::new(Mutex::new(state)),
            client,
        };
    }

    pub fn config(&self) -> SessionConfig {
        return lock(&self.state).config.clone();
    }

    pub fn history(&self) -> Vec<Message> {
        return lock(&self.state).history.snapshot();
    }

    pub fn session_id(&self) -> SessionId {
        return lock(&self.state).session_id.clone();
    }

    pub fn is_busy(&self) -> bool {
        return lock(&self.state).in_flight.is_some();
    }

    /// Records the user message and prepares the exchange. Nothing goes over
    /// the wire until the returned stream is polled.
    pub fn send(&self, text: &str) -> Result<Exchange, EngineError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(EngineError::EmptyInput);
        }

        let (id, vendor, request) = {
            let mut state = lock(&self.state);
            if state.in_flight.is_some() {
                return Err(EngineError::Busy);
            }

            state.history.append(Message::user(text));
            let request = state.vendor.build_request(
                &state.config,
                &state.history.snapshot(),
                &state.session_id,
            )?;

            state.next_exchange_id += 1;
            let id = state.next_exchange_id;
            state.in_flight = Some(id);

            (id, state.vendor.clone(), request)
        };

        tracing::debug!(
            exchange = id,
            vendor = %vendor.name(),
            url = %request.url,
            "exchange started"
        );

        let exchange_state = ExchangeState {
            id,
            engine: self.state.clone(),
            client: self.client.clone(),
            request: Some(request),
            lines: None,
            decoder: StreamDecoder::new(vendor),
            queued: VecDeque::new(),
            finished: false,
        };

        let events = futures::stream::unfold(exchange_state, |mut state| {
            return async move {
                let event = state.next_event().await?;
                return Some((event, state));
            };
        });

        return Ok(Exchange {
            id,
            events: events.boxed(),
        });
    }

    pub fn explain(&self, text: &str) -> Result<Exchange, EngineError> {
        let framing = lock(&self.state).explain_framing.clone();
        return self.explain_with(text, &framing);
    }

    pub fn explain_with(&self, text: &str, framing: &ExplainFraming) -> Result<Exchange, EngineError> {
        if text.trim().is_empty() {
            return Err(EngineError::EmptyInput);
        }

        return self.send(&framing.frame(text));
    }

    pub fn set_explain_framing(&self, framing: ExplainFraming) {
        lock(&self.state).explain_framing = framing;
    }

    /// Clears the conversation and picks a new session id. A pending exchange
    /// is abandoned and commits nothing.
    pub fn start_over(&self) {
        let mut state = lock(&self.state);
        state.history.clear();
        state.session_id = SessionId::regenerate(&state.session_id);
        if let Some(id) = state.in_flight.take() {
            tracing::info!(exchange = id, "exchange abandoned");
        }

        tracing::info!(session_id = %state.session_id, "started over");
    }

    pub fn configure(&self, mutation: ConfigMutation) -> Result<ConfigChange, EngineError> {
        let mut state = lock(&self.state);
        let change = match mutation {
            ConfigMutation::SetEndpoint(host) => {
                let endpoint = normalize_endpoint(&host, state.config.vendor())?;
                ConfigChange::Endpoint(state.config.set_endpoint(&endpoint)?)
            }
            ConfigMutation::SetModel(model) => ConfigChange::Model(state.config.set_model(&model)?),
            ConfigMutation::SetVendor(vendor) => {
                let name = state.config.set_vendor(&vendor)?;
                state.vendor = VendorManager::get(name);
                ConfigChange::Vendor(name)
            }
            ConfigMutation::SetApiKey(api_key) => {
                state.config.set_api_key(&api_key)?;
                ConfigChange::ApiKey
            }
            ConfigMutation::SetTemperature(temperature) => {
                ConfigChange::Temperature(state.config.set_temperature(&temperature)?)
            }
        };

        tracing::info!(change = %change, "configuration changed");
        return Ok(change);
    }

    /// Routes one line of user input: slash commands are applied or handed
    /// back, anything else is sent as a chat message.
    pub fn submit(&self, input: &str) -> Result<Submission, EngineError> {
        let cmd = match SlashCommand::parse(input) {
            Some(cmd) => cmd,
            None => return Ok(Submission::Exchange(self.send(input)?)),
        };

        match cmd {
            SlashCommand::Configure(mutation) => {
                return Ok(Submission::Configured(self.configure(mutation)?));
            }
            SlashCommand::StartOver => {
                self.start_over();
                return Ok(Submission::StartedOver);
            }
            SlashCommand::Explain(text) if !text.is_empty() => {
                return Ok(Submission::Exchange(self.explain(&text)?));
            }
            SlashCommand::Unknown(verb) => return Err(EngineError::UnknownCommand(verb)),
            cmd => return Ok(Submission::Command(cmd)),
        }
    }
}

/// Events of one exchange, in arrival order. Dropping it cancels the exchange
/// and frees the engine for the next send.
pub struct Exchange {
    id: u64,
    events: BoxStream<'static, Event>,
}

impl fmt::Debug for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        return f.debug_struct("Exchange").field("id", &self.id).finish_non_exhaustive();
    }
}

impl Stream for Exchange {
    type Item = Event;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Event>> {
        return self.events.poll_next_unpin(cx);
    }
}

impl Exchange {
    /// Pushes every event into `tx` until the exchange ends.
    pub async fn forward(mut self, tx: mpsc::UnboundedSender<Event>) -> Result<()> {
        while let Some(event) = self.next().await {
            tx.send(event)?;
        }

        return Ok(());
    }

    /// Drives the exchange to completion and returns the assistant's reply.
    pub async fn collect_text(mut self) -> Result<String> {
        while let Some(event) = self.next().await {
            match event {
                Event::Completed(text) => return Ok(text),
                Event::SessionError(ErrorKind::DecodeWarning, detail) => {
                    tracing::debug!(detail, "ignoring decode warning");
                }
                Event::SessionError(kind, detail) => bail!("{kind}: {detail}"),
                Event::Fragment(_) => {}
            }
        }

        bail!("Exchange was abandoned before it completed");
    }
}

struct ExchangeState {
    id: u64,
    engine: Arc<Mutex<EngineState>>,
    client: reqwest::Client,
    request: Option<ChatRequest>,
    lines: Option<BodyLines>,
    decoder: StreamDecoder,
    queued: VecDeque<Event>,
    finished: bool,
}

impl Drop for ExchangeState {
    fn drop(&mut self) {
        release(&self.engine, self.id);
    }
}

impl ExchangeState {
    fn is_current(&self) -> bool {
        return lock(&self.engine).in_flight == Some(self.id);
    }

    async fn next_event(&mut self) -> Option<Event> {
        loop {
            if !self.is_current() {
                self.queued.clear();
                self.finished = true;
                return None;
            }

            if let Some(event) = self.queued.pop_front() {
                return Some(event);
            }

            if self.finished {
                return None;
            }

            if let Some(request) = self.request.take() {
                match connect(&self.client, request).await {
                    Ok(lines) => self.lines = Some(lines),
                    Err(detail) => return self.fail(detail),
                }
                continue;
            }

            let next_line = match self.lines.as_mut() {
                Some(lines) => lines.next_segment().await,
                None => Ok(None),
            };

            // A line that is not UTF-8 is skipped with a warning.
            match next_line {
                Ok(Some(bytes)) => match String::from_utf8(bytes) {
                    Ok(line) => {
                        if let Some(detail) = self.decode(&line) {
                            return self.fail(detail);
                        }
                    }
                    Err(err) => {
                        self.warn(format!("Skipped response line that is not valid UTF-8: {err}"));
                    }
                },
                Ok(None) => return self.complete(),
                Err(err) => return self.fail(err.to_string()),
            }
        }
    }

    fn warn(&mut self, detail: String) {
        tracing::warn!(exchange = self.id, detail, "decode warning");
        self.queued
            .push_back(Event::SessionError(ErrorKind::DecodeWarning, detail));
    }

    /// Queues the fragments of one line. Returns the server's error when the
    /// line reports one.
    fn decode(&mut self, line: &str) -> Option<String> {
        let decoded = match self.decoder.decode_line(line) {
            Ok(decoded) => decoded,
            Err(err) => {
                self.warn(err.to_string());
                return None;
            }
        };

        tracing::debug!(
            exchange = self.id,
            fragments = decoded.fragments.len(),
            session_id = ?decoded.session_id,
            "envelope"
        );

        if let Some(session_id) = decoded.session_id {
            let mut state = lock(&self.engine);
            if state.in_flight == Some(self.id) {
                state.session_id = SessionId::from(session_id);
            }
        }

        for fragment in decoded.fragments {
            self.queued.push_back(Event::Fragment(fragment));
        }

        return decoded.error;
    }

    fn complete(&mut self) -> Option<Event> {
        self.finished = true;

        let text = self.decoder.text().trim().to_string();
        let mut state = lock(&self.engine);
        if state.in_flight != Some(self.id) {
            return None;
        }

        // Empty replies stay out of history.
        if !text.is_empty() {
            state.history.append(Message::assistant(&text));
        }
        state.in_flight = None;
        tracing::debug!(exchange = self.id, chars = text.len(), "exchange completed");

        return Some(Event::Completed(text));
    }

    fn fail(&mut self, detail: String) -> Option<Event> {
        self.finished = true;

        let mut state = lock(&self.engine);
        if state.in_flight != Some(self.id) {
            return None;
        }
        state.in_flight = None;
        tracing::error!(exchange = self.id, detail, "endpoint unavailable");

        return Some(Event::SessionError(ErrorKind::Unavailable, detail));
    }
}

async fn connect(client: &reqwest::Client, request: ChatRequest) -> Result<BodyLines, String> {
    let mut builder = client.post(&request.url);
    for (name, value) in request.headers.iter() {
        builder = builder.header(name.as_str(), value.as_str());
    }

    let res = builder
        .body(request.body.to_string())
        .send()
        .await
        .map_err(|err| return err.to_string())?;

    let status = res.status();
    if !status.is_success() {
        let body = res.text().await.unwrap_or_default();
        return Err(error_detail(&body).unwrap_or_else(|| return status.to_string()));
    }

    let stream = res
        .bytes_stream()
        .map_err(|err| return io::Error::new(io::ErrorKind::Other, err));
    let reader: Pin<Box<dyn AsyncBufRead + Send>> = Box::pin(StreamReader::new(stream));

    return Ok(reader.split(b'\n'));
}

fn error_detail(body: &str) -> Option<String> {
    let value = serde_json::from_str::<Value>(body).ok()?;
    return find_error(&value);
}
