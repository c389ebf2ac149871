//! Rate-limited FIFO queue in front of a [`Summarizer`].
//!
//! A single worker task owns the queue and runs one request at a time:
//!
//! - after a success it waits `min_gap` before the next request;
//! - on a rate limit with retries left it waits `2 * min_gap`, then puts the
//!   request at the back of the queue;
//! - on any other failure (or once retries run out) it reports the error to
//!   the caller and rests `failure_rest`.

use std::collections::VecDeque;
use std::time::Duration;

use feedlybd_core::AppConfig;
use tokio::sync::{mpsc, oneshot};

use crate::error::SummaryError;
use crate::summarizer::Summarizer;
use crate::timer::Timer;

/// Instruction sent when a request carries no prompt of its own.
pub const DEFAULT_PROMPT: &str = "নীচের খবরের একটি সঠিক ২-লাইনের বাংলা সারসংক্ষেপ লিখুন:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueConfig {
    pub min_gap: Duration,
    pub max_retries: u32,
    pub failure_rest: Duration,
    /// Input is cut to this many characters before it is sent.
    pub max_input_chars: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            min_gap: Duration::from_secs(5),
            max_retries: 1,
            failure_rest: Duration::from_secs(2),
            max_input_chars: 1_500,
        }
    }
}

impl QueueConfig {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            min_gap: Duration::from_millis(config.summary_min_gap_ms),
            max_retries: config.summary_max_retries,
            ..Self::default()
        }
    }

    /// Pause before a rate-limited request goes back into the queue.
    #[must_use]
    pub fn rate_limit_delay(&self) -> Duration {
        self.min_gap.saturating_mul(2)
    }
}

/// Text to summarize, with an optional prompt overriding [`DEFAULT_PROMPT`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRequest {
    pub text: String,
    pub prompt: Option<String>,
}

impl SummaryRequest {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            prompt: None,
        }
    }

    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }
}

struct Job {
    text: String,
    prompt: String,
    retries: u32,
    reply: oneshot::Sender<Result<String, SummaryError>>,
}

/// Handle to the queue worker. Cheap to clone; the worker stops once every
/// handle is dropped and the queue has drained.
#[derive(Debug, Clone)]
pub struct SummaryQueue {
    sender: mpsc::UnboundedSender<Job>,
}

impl SummaryQueue {
    /// Spawn the worker on the current tokio runtime.
    #[must_use]
    pub fn spawn<S, T>(summarizer: S, timer: T, config: QueueConfig) -> Self
    where
        S: Summarizer,
        T: Timer,
    {
        let (sender, receiver) = mpsc::unbounded_channel();
        let worker = Worker {
            summarizer,
            timer,
            config,
            receiver,
            pending: VecDeque::new(),
        };
        tokio::spawn(worker.run());
        Self { sender }
    }

    /// Queue `request` and wait for its summary.
    ///
    /// # Errors
    ///
    /// - [`SummaryError::RateLimited`]: still throttled after the allowed retries.
    /// - [`SummaryError::Failed`] / [`SummaryError::Http`]: the summarizer failed.
    /// - [`SummaryError::QueueClosed`]: the worker is gone.
    pub async fn enqueue(&self, request: SummaryRequest) -> Result<String, SummaryError> {
        let (reply, response) = oneshot::channel();
        let job = Job {
            text: request.text,
            prompt: request.prompt.unwrap_or_else(|| DEFAULT_PROMPT.to_string()),
            retries: 0,
            reply,
        };
        self.sender
            .send(job)
            .map_err(|_| SummaryError::QueueClosed)?;
        response.await.map_err(|_| SummaryError::QueueClosed)?
    }
}

struct Worker<S, T> {
    summarizer: S,
    timer: T,
    config: QueueConfig,
    receiver: mpsc::UnboundedReceiver<Job>,
    /// Jobs pulled off the channel ahead of time, in submission order.
    pending: VecDeque<Job>,
}

impl<S: Summarizer, T: Timer> Worker<S, T> {
    async fn run(mut self) {
        loop {
            let mut job = match self.pending.pop_front() {
                Some(job) => job,
                None => match self.receiver.recv().await {
                    Some(job) => job,
                    None => break,
                },
            };

            if job.reply.is_closed() {
                tracing::debug!("skipping summary request whose caller went away");
                continue;
            }

            let input = truncate_chars(&job.text, self.config.max_input_chars);
            match self.summarizer.summarize(input, &job.prompt).await {
                Ok(summary) => {
                    let _ = job.reply.send(Ok(summary));
                    self.timer.sleep(self.config.min_gap).await;
                }
                Err(e) if e.is_rate_limited() && job.retries < self.config.max_retries => {
                    job.retries += 1;
                    let delay = self.config.rate_limit_delay();
                    tracing::warn!(
                        attempt = job.retries,
                        max_retries = self.config.max_retries,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "summarizer rate limited; requeueing request"
                    );
                    self.timer.sleep(delay).await;
                    // Everything submitted so far stays ahead of the retry.
                    self.drain_incoming();
                    self.pending.push_back(job);
                }
                Err(e) => {
                    tracing::warn!(error = %e, retries = job.retries, "summary request failed");
                    let _ = job.reply.send(Err(e));
                    self.timer.sleep(self.config.failure_rest).await;
                }
            }
        }
        tracing::debug!("summary queue worker stopped");
    }

    fn drain_incoming(&mut self) {
        while let Ok(job) = self.receiver.try_recv() {
            self.pending.push_back(job);
        }
    }
}

/// Longest prefix of `text` with at most `max_chars` characters.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    text.char_indices()
        .nth(max_chars)
        .map_or(text, |(idx, _)| &text[..idx])
}

#[cfg(test)]
#[path = "queue_test.rs"]
mod tests;
