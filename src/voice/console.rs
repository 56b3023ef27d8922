//! Terminal stand-ins for the host speech primitives
//!
//! Lines typed on stdin are "recognized speech"; spoken utterances are
//! printed to stdout, paced roughly like real playback.

use std::io::Write;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Stdin};
use tokio::sync::Mutex;

use super::{Recognizer, SpeechRequest, Synthesizer, Voice};
use crate::error::{CaptureError, PlaybackError};

/// Reads one line per recognized utterance
pub struct ConsoleRecognizer<R> {
    reader: Mutex<R>,
    prompt: String,
}

impl ConsoleRecognizer<BufReader<Stdin>> {
    /// Recognizer reading from the process stdin
    #[must_use]
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

impl<R> ConsoleRecognizer<R> {
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            reader: Mutex::new(reader),
            prompt: "🎤 you> ".to_string(),
        }
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> Recognizer for ConsoleRecognizer<R> {
    async fn recognize(&self, _language: &str) -> Result<String, CaptureError> {
        {
            let mut out = std::io::stdout().lock();
            let _ = write!(out, "{}", self.prompt);
            let _ = out.flush();
        }

        let mut line = String::new();
        let read = self
            .reader
            .lock()
            .await
            .read_line(&mut line)
            .await
            .map_err(|e| CaptureError::Failed(e.to_string()))?;

        // End of input is the terminal equivalent of the microphone going away
        if read == 0 {
            return Err(CaptureError::Denied);
        }

        Ok(line)
    }
}

/// Prints utterances instead of playing audio
pub struct ConsoleSynthesizer<W> {
    writer: std::sync::Mutex<W>,
    word_pace: Duration,
}

impl ConsoleSynthesizer<std::io::Stdout> {
    /// Synthesizer printing to the process stdout
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(std::io::stdout()).word_pace(crate::config::DEFAULT_WORD_PACE)
    }
}

impl<W> ConsoleSynthesizer<W> {
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self {
            writer: std::sync::Mutex::new(writer),
            word_pace: Duration::ZERO,
        }
    }

    /// Time per spoken word at rate 1.0
    #[must_use]
    pub const fn word_pace(mut self, pace: Duration) -> Self {
        self.word_pace = pace;
        self
    }

    /// Consume the synthesizer and return its writer
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl<W: Write + Send> Synthesizer for ConsoleSynthesizer<W> {
    fn voices(&self) -> Vec<Voice> {
        vec![
            Voice::new("Genie", "en-US"),
            Voice::new("Genie (UK)", "en-GB"),
            Voice::new("Genie (Hindi)", "hi-IN"),
            Voice::new("Genie (Marathi)", "mr-IN"),
        ]
    }

    async fn play(&self, request: &SpeechRequest) -> Result<(), PlaybackError> {
        let voice = request.voice.as_ref().map_or("default", |v| v.name.as_str());
        {
            let mut out = self
                .writer
                .lock()
                .map_err(|e| PlaybackError::SynthesisFailed(e.to_string()))?;
            writeln!(out, "🧞 [{voice}] {}", request.text)
                .and_then(|()| out.flush())
                .map_err(|e| PlaybackError::SynthesisFailed(e.to_string()))?;
        }

        let words = u32::try_from(request.text.split_whitespace().count()).unwrap_or(u32::MAX);
        let duration = self.word_pace.saturating_mul(words).div_f32(request.rate.max(0.1));
        tokio::time::sleep(duration).await;
        Ok(())
    }
}
