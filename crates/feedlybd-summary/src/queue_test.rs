use std::future::Future;
use std::sync::{Arc, Mutex};

use super::*;

/// Summarizer that replays scripted outcomes and records every call.
#[derive(Clone, Default)]
struct ScriptedSummarizer {
    outcomes: Arc<Mutex<VecDeque<Result<String, SummaryError>>>>,
    calls: Arc<Mutex<Vec<(String, String)>>>,
}

impl ScriptedSummarizer {
    fn new(outcomes: Vec<Result<String, SummaryError>>) -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(outcomes.into())),
            calls: Arc::default(),
        }
    }

    fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn texts(&self) -> Vec<String> {
        self.calls().into_iter().map(|(text, _)| text).collect()
    }
}

impl Summarizer for ScriptedSummarizer {
    fn summarize(
        &self,
        text: &str,
        prompt: &str,
    ) -> impl Future<Output = Result<String, SummaryError>> + Send {
        self.calls
            .lock()
            .expect("calls lock")
            .push((text.to_string(), prompt.to_string()));
        let outcome = self
            .outcomes
            .lock()
            .expect("outcomes lock")
            .pop_front()
            .unwrap_or_else(|| Ok(format!("summary of {text}")));
        std::future::ready(outcome)
    }
}

/// Timer that returns immediately and records requested delays.
#[derive(Clone, Default)]
struct RecordingTimer {
    sleeps: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingTimer {
    fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().expect("sleeps lock").clone()
    }
}

impl Timer for RecordingTimer {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        self.sleeps.lock().expect("sleeps lock").push(duration);
        std::future::ready(())
    }
}

fn secs(n: u64) -> Duration {
    Duration::from_secs(n)
}

fn queue(summarizer: &ScriptedSummarizer, timer: &RecordingTimer) -> SummaryQueue {
    SummaryQueue::spawn(summarizer.clone(), timer.clone(), QueueConfig::default())
}

#[tokio::test]
async fn success_waits_min_gap_and_uses_default_prompt() {
    let summarizer = ScriptedSummarizer::new(vec![Ok("দুই লাইন".to_string())]);
    let timer = RecordingTimer::default();
    let q = queue(&summarizer, &timer);

    let summary = q
        .enqueue(SummaryRequest::new("article body"))
        .await
        .expect("summary");
    assert_eq!(summary, "দুই লাইন");

    // Let the worker finish its post-success pause.
    tokio::task::yield_now().await;
    assert_eq!(
        summarizer.calls(),
        vec![("article body".to_string(), DEFAULT_PROMPT.to_string())]
    );
    assert_eq!(timer.sleeps(), vec![secs(5)]);
}

#[tokio::test]
async fn custom_prompt_is_forwarded() {
    let summarizer = ScriptedSummarizer::default();
    let timer = RecordingTimer::default();
    let q = queue(&summarizer, &timer);

    q.enqueue(SummaryRequest::new("body").with_prompt("Summarize in English:"))
        .await
        .expect("summary");
    assert_eq!(summarizer.calls()[0].1, "Summarize in English:");
}

#[tokio::test]
async fn long_input_is_truncated_by_characters() {
    let summarizer = ScriptedSummarizer::default();
    let timer = RecordingTimer::default();
    let q = queue(&summarizer, &timer);

    q.enqueue(SummaryRequest::new("খ".repeat(2_000)))
        .await
        .expect("summary");
    assert_eq!(summarizer.texts()[0].chars().count(), 1_500);
}

#[tokio::test]
async fn rate_limit_is_retried_once_after_doubled_gap() {
    let summarizer = ScriptedSummarizer::new(vec![
        Err(SummaryError::RateLimited),
        Ok("second try".to_string()),
    ]);
    let timer = RecordingTimer::default();
    let q = queue(&summarizer, &timer);

    let summary = q
        .enqueue(SummaryRequest::new("body"))
        .await
        .expect("summary after retry");
    assert_eq!(summary, "second try");

    tokio::task::yield_now().await;
    assert_eq!(summarizer.calls().len(), 2);
    assert_eq!(timer.sleeps(), vec![secs(10), secs(5)]);
}

#[tokio::test]
async fn repeated_rate_limit_is_reported_to_the_caller() {
    let summarizer = ScriptedSummarizer::new(vec![
        Err(SummaryError::RateLimited),
        Err(SummaryError::RateLimited),
    ]);
    let timer = RecordingTimer::default();
    let q = queue(&summarizer, &timer);

    let result = q.enqueue(SummaryRequest::new("body")).await;
    assert!(matches!(result, Err(SummaryError::RateLimited)));

    tokio::task::yield_now().await;
    assert_eq!(summarizer.calls().len(), 2);
    assert_eq!(timer.sleeps(), vec![secs(10), secs(2)]);
}

#[tokio::test]
async fn failure_rests_then_serves_the_next_request() {
    let summarizer = ScriptedSummarizer::new(vec![
        Err(SummaryError::Failed("model overloaded".to_string())),
        Ok("fine".to_string()),
    ]);
    let timer = RecordingTimer::default();
    let q = queue(&summarizer, &timer);

    let first = q.enqueue(SummaryRequest::new("a")).await;
    assert!(matches!(first, Err(SummaryError::Failed(ref m)) if m == "model overloaded"));

    let second = q.enqueue(SummaryRequest::new("b")).await.expect("summary");
    assert_eq!(second, "fine");

    tokio::task::yield_now().await;
    assert_eq!(timer.sleeps(), vec![secs(2), secs(5)]);
}

#[tokio::test]
async fn requests_are_served_in_submission_order() {
    let summarizer = ScriptedSummarizer::default();
    let timer = RecordingTimer::default();
    let q = queue(&summarizer, &timer);

    let (a, b, c) = tokio::join!(
        q.enqueue(SummaryRequest::new("a")),
        q.enqueue(SummaryRequest::new("b")),
        q.enqueue(SummaryRequest::new("c")),
    );
    assert_eq!(a.expect("a"), "summary of a");
    assert_eq!(b.expect("b"), "summary of b");
    assert_eq!(c.expect("c"), "summary of c");
    assert_eq!(summarizer.texts(), vec!["a", "b", "c"]);
}

#[tokio::test]
async fn rate_limited_request_moves_behind_waiting_requests() {
    let summarizer = ScriptedSummarizer::new(vec![
        Err(SummaryError::RateLimited),
        Ok("b done".to_string()),
        Ok("a done".to_string()),
    ]);
    let timer = RecordingTimer::default();
    let q = queue(&summarizer, &timer);

    let (a, b) = tokio::join!(
        q.enqueue(SummaryRequest::new("a")),
        q.enqueue(SummaryRequest::new("b")),
    );
    assert_eq!(a.expect("a"), "a done");
    assert_eq!(b.expect("b"), "b done");
    assert_eq!(summarizer.texts(), vec!["a", "b", "a"]);
}

#[tokio::test]
async fn abandoned_requests_are_skipped() {
    let summarizer = ScriptedSummarizer::default();
    let timer = RecordingTimer::default();
    let (sender, receiver) = mpsc::unbounded_channel();

    let (gone_reply, gone_response) = oneshot::channel();
    drop(gone_response);
    let (live_reply, live_response) = oneshot::channel();
    for (text, reply) in [("gone", gone_reply), ("live", live_reply)] {
        sender
            .send(Job {
                text: text.to_string(),
                prompt: DEFAULT_PROMPT.to_string(),
                retries: 0,
                reply,
            })
            .unwrap_or_else(|_| panic!("worker channel open"));
    }
    drop(sender);

    let worker = Worker {
        summarizer: summarizer.clone(),
        timer: timer.clone(),
        config: QueueConfig::default(),
        receiver,
        pending: VecDeque::new(),
    };
    worker.run().await;

    let live = live_response.await.expect("reply sent");
    assert_eq!(live.expect("summary"), "summary of live");
    assert_eq!(summarizer.texts(), vec!["live"]);
}

#[test]
fn truncate_chars_respects_boundaries() {
    assert_eq!(truncate_chars("abc", 5), "abc");
    assert_eq!(truncate_chars("abcdef", 3), "abc");
    assert_eq!(truncate_chars("খবর", 2), "খব");
    assert_eq!(truncate_chars("", 0), "");
}

#[test]
fn config_rate_limit_delay_doubles_gap() {
    let config = QueueConfig::default();
    assert_eq!(config.rate_limit_delay(), secs(10));
}
