//! Debounced place autocomplete.
//!
//! The controller owns the search box state: the raw input, the picked
//! suggestion and the option list shown under the box. Text changes
//! schedule a prediction request after a quiet period; each request runs
//! on its own task and hands its results back over a channel tagged with
//! the generation that issued it. Only the latest generation is applied.
//!
//! Scheduling spawns onto the current Tokio runtime, so the controller
//! must be driven from inside one.

use std::{sync::Arc, time::Duration};

use tokio::{sync::mpsc, task::JoinHandle};

use crate::{
    model::PlaceSuggestion,
    places::{PlacePredictor, PredictorContext},
};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(400);

/// What the search box currently shows.
///
/// With a selection and empty input, `options` always contains the
/// selection so it stays pickable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionState {
    pub selection: Option<PlaceSuggestion>,
    pub input: String,
    pub options: Vec<PlaceSuggestion>,
}

/// Results of one prediction request.
#[derive(Debug)]
pub struct PredictionBatch {
    generation: u64,
    input: String,
    results: Vec<PlaceSuggestion>,
}

#[derive(Debug)]
pub struct AutocompleteController {
    predictor: Arc<dyn PlacePredictor>,
    debounce: Duration,
    state: SelectionState,
    generation: u64,
    awaiting: bool,
    pending: Option<JoinHandle<()>>,
    tx: mpsc::UnboundedSender<PredictionBatch>,
    rx: mpsc::UnboundedReceiver<PredictionBatch>,
}

impl AutocompleteController {
    pub fn new(predictors: &PredictorContext) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        Self {
            predictor: predictors.predictor(),
            debounce: DEFAULT_DEBOUNCE,
            state: SelectionState::default(),
            generation: 0,
            awaiting: false,
            pending: None,
            tx,
            rx,
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn input(&self) -> &str {
        &self.state.input
    }

    pub fn selection(&self) -> Option<&PlaceSuggestion> {
        self.state.selection.as_ref()
    }

    pub fn options(&self) -> &[PlaceSuggestion] {
        &self.state.options
    }

    /// True while a scheduled request has not delivered yet.
    pub fn is_awaiting(&self) -> bool {
        self.awaiting
    }

    pub fn input_changed(&mut self, text: impl Into<String>) {
        self.state.input = text.into();
        self.refresh();
    }

    /// Pick a suggestion (or clear the pick with `None`).
    ///
    /// A new pick is put in front of the current options without
    /// removing an equal entry further down. Returns the pick so the
    /// caller can resolve it. Picking the current selection again is a
    /// no-op and returns `None`.
    pub fn select(&mut self, choice: Option<PlaceSuggestion>) -> Option<PlaceSuggestion> {
        if choice == self.state.selection {
            return None;
        }

        if let Some(picked) = &choice {
            let mut options = Vec::with_capacity(self.state.options.len() + 1);
            options.push(picked.clone());
            options.append(&mut self.state.options);
            self.state.options = options;
        }

        self.state.selection = choice.clone();
        self.refresh();

        choice
    }

    /// Wait for the outstanding request and apply it.
    ///
    /// Superseded batches are dropped while waiting. Returns `false` right
    /// away when nothing is outstanding.
    pub async fn next_batch(&mut self) -> bool {
        while self.awaiting {
            let Some(batch) = self.rx.recv().await else {
                return false;
            };

            if self.apply_batch(batch) {
                return true;
            }
        }

        false
    }

    /// Apply a batch if it belongs to the latest request.
    pub fn apply_batch(&mut self, batch: PredictionBatch) -> bool {
        if batch.generation != self.generation {
            tracing::debug!(
                input = %batch.input,
                generation = batch.generation,
                latest = self.generation,
                "discarding superseded predictions"
            );
            return false;
        }

        self.awaiting = false;
        self.pending = None;

        let mut options: Vec<PlaceSuggestion> = self.state.selection.iter().cloned().collect();
        options.extend(batch.results);
        self.state.options = options;

        true
    }

    fn refresh(&mut self) {
        self.cancel_pending();

        if self.state.input.is_empty() {
            self.state.options = self.state.selection.iter().cloned().collect();
            return;
        }

        self.schedule();
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
        self.generation += 1;
        self.awaiting = false;
    }

    fn schedule(&mut self) {
        let generation = self.generation;
        let input = self.state.input.clone();
        let predictor = Arc::clone(&self.predictor);
        let delay = self.debounce;
        let reply = BatchReply { tx: self.tx.clone(), generation, input, sent: false };

        self.awaiting = true;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            tracing::debug!(input = %reply.input, generation, "requesting place predictions");
            let results = predictor.predict(&reply.input).await;

            reply.send(results);
        }));
    }
}

/// Delivers a request's batch exactly once.
///
/// If the task ends without sending (the predictor panicked, or the task
/// was aborted), an empty batch goes out on drop so the controller never
/// waits on a request that will not answer. Aborted requests are already
/// superseded, so their empty batch is discarded.
struct BatchReply {
    tx: mpsc::UnboundedSender<PredictionBatch>,
    generation: u64,
    input: String,
    sent: bool,
}

impl BatchReply {
    fn send(mut self, results: Vec<PlaceSuggestion>) {
        self.deliver(results);
    }

    fn deliver(&mut self, results: Vec<PlaceSuggestion>) {
        self.sent = true;
        let batch =
            PredictionBatch { generation: self.generation, input: std::mem::take(&mut self.input), results };
        // The receiver lives in the controller; a failed send means it was dropped.
        let _ = self.tx.send(batch);
    }
}

impl Drop for BatchReply {
    fn drop(&mut self) {
        if !self.sent {
            self.deliver(Vec::new());
        }
    }
}

impl Drop for AutocompleteController {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}
