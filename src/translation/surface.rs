use crate::translation::languages::LanguagePair;
use crate::translation::provider::TranslationProvider;
use crate::utils::{Result, SurfaceTimeouts, TranslatorError};
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::Instant;

/// An interactive translation surface: an input box, an output box that fills
/// in some time after text is submitted, and a language setting the surface may
/// change on its own. Browser pages and desktop translator windows look like this.
#[async_trait]
pub trait TranslatorSurface: Send {
    async fn current_pair(&mut self) -> Result<LanguagePair>;

    /// Points the surface at `pair`. It may not accept input until
    /// `is_ready` turns true.
    async fn load_pair(&mut self, pair: &LanguagePair) -> Result<()>;

    async fn is_ready(&mut self) -> Result<bool>;

    async fn clear_input(&mut self) -> Result<()>;

    async fn submit(&mut self, text: &str) -> Result<()>;

    async fn read_output(&mut self) -> Result<String>;

    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Drives a [`TranslatorSurface`] as a [`TranslationProvider`].
///
/// A translation is only accepted once the output box differs from what it
/// showed before the submit and is longer than `min_output_chars`; this keeps
/// a stale or half-rendered output from being read as the new result.
pub struct SurfaceProvider<S> {
    name: String,
    surface: S,
    timeouts: SurfaceTimeouts,
}

impl<S: TranslatorSurface> SurfaceProvider<S> {
    pub fn new(name: impl Into<String>, surface: S, timeouts: SurfaceTimeouts) -> Self {
        Self {
            name: name.into(),
            surface,
            timeouts,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn into_inner(self) -> S {
        self.surface
    }

    async fn wait_until_ready(&mut self) -> Result<()> {
        let limit = self.timeouts.ready;
        let deadline = Instant::now() + limit;

        while !self.surface.is_ready().await? {
            if Instant::now() >= deadline {
                return Err(TranslatorError::timeout("waiting for the input surface", limit));
            }
            tokio::time::sleep(self.timeouts.poll_interval).await;
        }

        Ok(())
    }

    async fn wait_for_output<F>(&mut self, stage: &str, limit: Duration, accept: F) -> Result<String>
    where
        F: Fn(&str) -> bool + Send,
    {
        let deadline = Instant::now() + limit;

        loop {
            let output = self.surface.read_output().await?;
            let output = output.trim();
            if accept(output) {
                return Ok(output.to_string());
            }
            if Instant::now() >= deadline {
                return Err(TranslatorError::timeout(stage, limit));
            }
            tokio::time::sleep(self.timeouts.poll_interval).await;
        }
    }
}

#[async_trait]
impl<S: TranslatorSurface> TranslationProvider for SurfaceProvider<S> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn active_pair(&mut self) -> Result<LanguagePair> {
        self.surface.current_pair().await
    }

    async fn reconfigure(&mut self, pair: &LanguagePair) -> Result<()> {
        self.surface.load_pair(pair).await?;
        self.wait_until_ready().await
    }

    async fn translate(&mut self, text: &str, _pair: &LanguagePair) -> Result<String> {
        let previous = self.surface.read_output().await?.trim().to_string();

        self.surface.clear_input().await?;
        self.wait_for_output(
            "waiting for the output to clear",
            self.timeouts.clear,
            |output| output.is_empty(),
        )
        .await?;

        self.surface.submit(text).await?;

        let min_chars = self.timeouts.min_output_chars;
        self.wait_for_output(
            "waiting for a fresh translation",
            self.timeouts.output,
            |output| output != previous && output.chars().count() > min_chars,
        )
        .await
    }

    async fn shutdown(&mut self) -> Result<()> {
        self.surface.close().await
    }
}
