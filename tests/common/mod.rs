//! Shared fakes for integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use sentence_flow::analysis::{
    AnalysisError, AnalysisResult, Analyzer, Clause, GrammarIssue, SentenceComponent,
};
use sentence_flow::controller::Controller;
use sentence_flow::storage::{KeyValueStore, MemoryStore, PersistenceError};
use tokio::sync::{Mutex, oneshot};

/// A small, realistic result with no grammar issues.
pub fn clean_result(sentence: &str) -> AnalysisResult {
    AnalysisResult {
        components: vec![SentenceComponent {
            part: "主语".to_string(),
            text: sentence.to_string(),
        }],
        clauses: vec![Clause {
            kind: "主句".to_string(),
            text: sentence.to_string(),
            explanation: "简单句".to_string(),
        }],
        grammar_check: vec![],
    }
}

pub fn result_with_issue() -> AnalysisResult {
    let mut result = clean_result("He go home.");
    result.grammar_check.push(GrammarIssue {
        original: "go".to_string(),
        correction: "goes".to_string(),
        explanation: "第三人称单数".to_string(),
    });
    result
}

/// Answers from a queue; once the queue is empty every call succeeds with
/// [`clean_result`] for the requested sentence.
#[derive(Debug, Default)]
pub struct ScriptedAnalyzer {
    responses: Mutex<VecDeque<Result<AnalysisResult, AnalysisError>>>,
    calls: AtomicUsize,
    sentences: Mutex<Vec<String>>,
}

impl ScriptedAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_responses(
        responses: impl IntoIterator<Item = Result<AnalysisResult, AnalysisError>>,
    ) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn sentences(&self) -> Vec<String> {
        self.sentences.lock().await.clone()
    }
}

#[async_trait]
impl Analyzer for ScriptedAnalyzer {
    async fn analyze(&self, sentence: &str) -> Result<AnalysisResult, AnalysisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.sentences.lock().await.push(sentence.to_string());
        match self.responses.lock().await.pop_front() {
            Some(r) => r,
            None => Ok(clean_result(sentence)),
        }
    }
}

/// Each call blocks until the test releases it through the matching sender.
#[derive(Debug, Default)]
pub struct GatedAnalyzer {
    gates: Mutex<VecDeque<oneshot::Receiver<Result<AnalysisResult, AnalysisError>>>>,
    calls: AtomicUsize,
}

impl GatedAnalyzer {
    /// Create an analyzer with `n` gates, returning their senders in call order.
    pub fn with_gates(
        n: usize,
    ) -> (
        Self,
        Vec<oneshot::Sender<Result<AnalysisResult, AnalysisError>>>,
    ) {
        let (senders, receivers): (Vec<_>, VecDeque<_>) =
            (0..n).map(|_| oneshot::channel()).unzip();
        (
            Self {
                gates: Mutex::new(receivers),
                calls: AtomicUsize::new(0),
            },
            senders,
        )
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Analyzer for GatedAnalyzer {
    async fn analyze(&self, _sentence: &str) -> Result<AnalysisResult, AnalysisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let gate = self
            .gates
            .lock()
            .await
            .pop_front()
            .expect("more analyze calls than gates");
        gate.await.expect("gate sender dropped")
    }
}

/// Panics on every call.
#[derive(Debug, Default)]
pub struct PanickingAnalyzer;

#[async_trait]
impl Analyzer for PanickingAnalyzer {
    async fn analyze(&self, _sentence: &str) -> Result<AnalysisResult, AnalysisError> {
        panic!("analyzer crashed");
    }
}

/// Store whose writes always fail.
#[derive(Debug, Default)]
pub struct ReadOnlyStore {
    inner: MemoryStore,
}

#[async_trait]
impl KeyValueStore for ReadOnlyStore {
    async fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, _value: &str) -> Result<(), PersistenceError> {
        Err(PersistenceError::Io {
            key: key.to_string(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
        })
    }

    async fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        Err(PersistenceError::Io {
            key: key.to_string(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
        })
    }
}

/// Controller over a fresh in-memory store.
pub async fn controller_with(analyzer: Arc<dyn Analyzer>) -> (Arc<Controller>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let controller = Controller::load(analyzer, store.clone()).await;
    (Arc::new(controller), store)
}
