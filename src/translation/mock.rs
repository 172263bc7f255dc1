//! Test doubles for the provider seams.

use crate::translation::languages::LanguagePair;
use crate::translation::provider::TranslationProvider;
use crate::translation::surface::TranslatorSurface;
use crate::utils::{Result, TranslatorError};
use async_trait::async_trait;

type TranslateFn = Box<dyn Fn(&str, &LanguagePair) -> String + Send + Sync>;

/// `<en> text`, so a test can see which pair produced an output.
pub fn tag_with_target(text: &str, pair: &LanguagePair) -> String {
    format!("<{}> {}", pair.target.code, text.trim())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    Reconfigure(LanguagePair),
    Translate { text: String, pair: LanguagePair },
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fault {
    Empty,
    SessionError,
}

/// Scripted provider that records every call it receives.
pub struct MockProvider {
    active: LanguagePair,
    translate: TranslateFn,
    events: Vec<ProviderEvent>,
    translate_calls: usize,
    faults: Vec<(usize, Fault)>,
    drifts: Vec<(usize, LanguagePair)>,
}

impl MockProvider {
    pub fn new(active: LanguagePair) -> Self {
        Self {
            active,
            translate: Box::new(tag_with_target),
            events: Vec::new(),
            translate_calls: 0,
            faults: Vec::new(),
            drifts: Vec::new(),
        }
    }

    pub fn with_translation<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, &LanguagePair) -> String + Send + Sync + 'static,
    {
        self.translate = Box::new(f);
        self
    }

    /// The `call`-th translate call (1-based) returns an empty string.
    pub fn empty_on_call(mut self, call: usize) -> Self {
        self.faults.push((call, Fault::Empty));
        self
    }

    /// The `call`-th translate call (1-based) fails with a session error.
    pub fn fail_on_call(mut self, call: usize) -> Self {
        self.faults.push((call, Fault::SessionError));
        self
    }

    /// After the `call`-th translate call the session switches itself to `pair`.
    pub fn drift_after_call(mut self, call: usize, pair: LanguagePair) -> Self {
        self.drifts.push((call, pair));
        self
    }

    pub fn events(&self) -> &[ProviderEvent] {
        &self.events
    }

    pub fn translate_count(&self) -> usize {
        self.translate_calls
    }

    pub fn translated_texts(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                ProviderEvent::Translate { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl TranslationProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn active_pair(&mut self) -> Result<LanguagePair> {
        Ok(self.active)
    }

    async fn reconfigure(&mut self, pair: &LanguagePair) -> Result<()> {
        self.events.push(ProviderEvent::Reconfigure(*pair));
        self.active = *pair;
        Ok(())
    }

    async fn translate(&mut self, text: &str, pair: &LanguagePair) -> Result<String> {
        self.translate_calls += 1;
        let call = self.translate_calls;
        self.events.push(ProviderEvent::Translate {
            text: text.to_string(),
            pair: self.active,
        });

        if let Some(&(_, drifted)) = self.drifts.iter().find(|(at, _)| *at == call) {
            self.active = drifted;
        }

        match self.faults.iter().find(|(at, _)| *at == call).map(|(_, f)| *f) {
            Some(Fault::Empty) => Ok(String::new()),
            Some(Fault::SessionError) => Err(TranslatorError::ProviderSession(format!(
                "mock session failed on call {}",
                call
            ))),
            None => Ok((self.translate)(text, pair)),
        }
    }

    async fn shutdown(&mut self) -> Result<()> {
        self.events.push(ProviderEvent::Shutdown);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    LoadPair(LanguagePair),
    Clear,
    Submit(String),
}

/// In-memory translation surface whose output appears a few polls after a
/// submit, like a web page rendering a response.
pub struct MockSurface {
    pair: LanguagePair,
    translate: TranslateFn,
    output: String,
    pending: Option<(usize, String)>,
    output_delay: usize,
    sticky_output: bool,
    not_ready_polls: usize,
    not_ready_remaining: usize,
    ready_polls: usize,
    events: Vec<SurfaceEvent>,
    closed: bool,
}

impl MockSurface {
    pub fn new(pair: LanguagePair) -> Self {
        Self {
            pair,
            translate: Box::new(tag_with_target),
            output: String::new(),
            pending: None,
            output_delay: 0,
            sticky_output: false,
            not_ready_polls: 0,
            not_ready_remaining: 0,
            ready_polls: 0,
            events: Vec::new(),
            closed: false,
        }
    }

    pub fn with_translation<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, &LanguagePair) -> String + Send + Sync + 'static,
    {
        self.translate = Box::new(f);
        self
    }

    /// Output stays empty for this many reads after a submit.
    pub fn with_output_delay(mut self, reads: usize) -> Self {
        self.output_delay = reads;
        self
    }

    pub fn with_stale_output(mut self, output: &str) -> Self {
        self.output = output.to_string();
        self
    }

    /// Clearing the input leaves the output box untouched.
    pub fn with_sticky_output(mut self) -> Self {
        self.sticky_output = true;
        self
    }

    /// `is_ready` answers false this many times after each `load_pair`.
    pub fn with_not_ready_polls(mut self, polls: usize) -> Self {
        self.not_ready_polls = polls;
        self
    }

    /// Simulates the page switching its own languages.
    pub fn set_pair(&mut self, pair: LanguagePair) {
        self.pair = pair;
    }

    pub fn events(&self) -> &[SurfaceEvent] {
        &self.events
    }

    pub fn ready_polls(&self) -> usize {
        self.ready_polls
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

#[async_trait]
impl TranslatorSurface for MockSurface {
    async fn current_pair(&mut self) -> Result<LanguagePair> {
        Ok(self.pair)
    }

    async fn load_pair(&mut self, pair: &LanguagePair) -> Result<()> {
        self.events.push(SurfaceEvent::LoadPair(*pair));
        self.pair = *pair;
        self.not_ready_remaining = self.not_ready_polls;
        Ok(())
    }

    async fn is_ready(&mut self) -> Result<bool> {
        self.ready_polls += 1;
        if self.not_ready_remaining > 0 {
            self.not_ready_remaining -= 1;
            return Ok(false);
        }
        Ok(true)
    }

    async fn clear_input(&mut self) -> Result<()> {
        self.events.push(SurfaceEvent::Clear);
        self.pending = None;
        if !self.sticky_output {
            self.output.clear();
        }
        Ok(())
    }

    async fn submit(&mut self, text: &str) -> Result<()> {
        if self.closed {
            return Err(TranslatorError::ProviderSession("surface closed".to_string()));
        }
        self.events.push(SurfaceEvent::Submit(text.to_string()));
        let translated = (self.translate)(text, &self.pair);
        self.pending = Some((self.output_delay, translated));
        Ok(())
    }

    async fn read_output(&mut self) -> Result<String> {
        if let Some((remaining, translated)) = self.pending.take() {
            if remaining == 0 {
                self.output = translated;
            } else {
                self.pending = Some((remaining - 1, translated));
            }
        }
        Ok(self.output.clone())
    }

    async fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}
