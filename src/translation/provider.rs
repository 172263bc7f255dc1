use crate::translation::languages::LanguagePair;
use crate::utils::Result;
use async_trait::async_trait;

/// Anything that can translate a block of text for a language pair.
///
/// Besides `translate`, a provider exposes the language pair its session is
/// currently set to, and a way to force it back, so the pipeline can catch a
/// session that silently changed its own configuration between calls.
#[async_trait]
pub trait TranslationProvider: Send {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// The pair the provider session is configured for right now.
    async fn active_pair(&mut self) -> Result<LanguagePair>;

    /// Forces the session onto `pair` and returns once it accepts input again.
    async fn reconfigure(&mut self, pair: &LanguagePair) -> Result<()>;

    /// Translates `text`. An empty or whitespace-only return is treated by the
    /// caller as a failure.
    async fn translate(&mut self, text: &str, pair: &LanguagePair) -> Result<String>;

    /// Releases the session. Called once when a run ends, on success or failure.
    async fn shutdown(&mut self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl<P: TranslationProvider + ?Sized> TranslationProvider for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn active_pair(&mut self) -> Result<LanguagePair> {
        (**self).active_pair().await
    }

    async fn reconfigure(&mut self, pair: &LanguagePair) -> Result<()> {
        (**self).reconfigure(pair).await
    }

    async fn translate(&mut self, text: &str, pair: &LanguagePair) -> Result<String> {
        (**self).translate(text, pair).await
    }

    async fn shutdown(&mut self) -> Result<()> {
        (**self).shutdown().await
    }
}
