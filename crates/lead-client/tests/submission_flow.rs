use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use lead_client::controller::{
    CHALLENGE_ERROR, CONSENT_ERROR, FAILED_MESSAGE, QUEUED_MESSAGE, SENT_MESSAGE,
};
use lead_client::{
    Field, FormData, FormView, IgnoreReason, KeyValueStore, ManualClock, MemoryStore,
    PendingQueue, RelayTransport, STORAGE_KEY, StoreError, SubmissionController, SubmitOutcome,
    Tone, TransportError,
};
use lead_core::Submission;
use time::Duration;
use time::macros::datetime;

#[derive(Default)]
struct ScriptedTransport {
    replies: Mutex<VecDeque<bool>>,
    sent: Mutex<Vec<Submission>>,
}

impl ScriptedTransport {
    fn replying(replies: &[bool]) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.iter().copied().collect()),
            sent: Mutex::default(),
        })
    }

    fn calls(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl RelayTransport for ScriptedTransport {
    async fn submit(&self, submission: &Submission) -> Result<(), TransportError> {
        self.sent.lock().unwrap().push(submission.clone());
        match self.replies.lock().unwrap().pop_front() {
            Some(true) => Ok(()),
            _ => Err(TransportError::Status(503)),
        }
    }
}

/// Memory store that counts writes and can refuse them.
#[derive(Default)]
struct CountingStore {
    inner: MemoryStore,
    writes: AtomicUsize,
    read_only: bool,
}

impl KeyValueStore for CountingStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.read_only {
            return Err(StoreError::Unavailable("read-only".into()));
        }
        self.inner.set(key, value)
    }
}

#[derive(Debug, Default)]
struct RecordingView {
    message: Option<(String, Tone)>,
    focused: Vec<Field>,
    locked: bool,
    lock_count: usize,
    resets: usize,
    invalid: Vec<&'static str>,
}

impl FormView for RecordingView {
    fn set_message(&mut self, text: &str, tone: Tone) {
        self.message = Some((text.to_string(), tone));
    }

    fn focus(&mut self, field: Field) {
        self.focused.push(field);
    }

    fn lock_submit(&mut self) {
        self.locked = true;
        self.lock_count += 1;
    }

    fn unlock_submit(&mut self) {
        self.locked = false;
    }

    fn reset(&mut self) {
        self.resets += 1;
    }

    fn report_validity(&mut self, missing: &[&'static str]) {
        self.invalid = missing.to_vec();
    }
}

struct Harness {
    controller: SubmissionController<CountingStore, RecordingView>,
    transport: Arc<ScriptedTransport>,
    clock: Arc<ManualClock>,
}

fn harness(replies: &[bool], store: CountingStore) -> Harness {
    let clock = Arc::new(ManualClock::new(datetime!(2024-05-01 10:00:00 UTC)));
    let transport = ScriptedTransport::replying(replies);
    let queue = PendingQueue::new(store, clock.clone());
    let controller =
        SubmissionController::new(queue, transport.clone(), RecordingView::default(), clock.clone());
    Harness {
        controller,
        transport,
        clock,
    }
}

fn filled_form() -> FormData {
    FormData {
        name: "  Ivan ".into(),
        phone: "+7 999 123-45-67".into(),
        address: "Moscow".into(),
        honeypot: String::new(),
        challenge: " 4 ".into(),
        consent: true,
    }
}

impl Harness {
    fn start_filling(&mut self) {
        self.controller.on_focus(Field::Name);
        self.clock.advance(Duration::seconds(5));
    }

    fn writes(&self) -> usize {
        self.controller.queue().store().writes.load(Ordering::SeqCst)
    }

    fn message(&self) -> Option<(String, Tone)> {
        self.controller.view().message.clone()
    }
}

#[tokio::test]
async fn honeypot_submit_is_dropped_silently() {
    let mut h = harness(&[true], CountingStore::default());
    h.start_filling();
    let form = FormData {
        honeypot: "http://spam.example".into(),
        ..filled_form()
    };

    let outcome = h.controller.submit(&form).await;

    assert_eq!(outcome, SubmitOutcome::Ignored(IgnoreReason::Honeypot));
    assert_eq!(h.transport.calls(), 0);
    assert_eq!(h.message(), Some((String::new(), Tone::Neutral)));
    assert_eq!(h.controller.view().lock_count, 0);
}

#[tokio::test]
async fn submit_without_focus_is_dropped() {
    let mut h = harness(&[true], CountingStore::default());
    let outcome = h.controller.submit(&filled_form()).await;
    assert_eq!(outcome, SubmitOutcome::Ignored(IgnoreReason::NoInteraction));
    assert_eq!(h.transport.calls(), 0);
}

#[tokio::test]
async fn honeypot_focus_does_not_start_the_timer() {
    let mut h = harness(&[true], CountingStore::default());
    h.controller.on_focus(Field::Honeypot);
    assert!(h.controller.fill_started_at().is_none());
}

#[tokio::test]
async fn fast_fill_is_dropped() {
    let mut h = harness(&[true], CountingStore::default());
    h.controller.on_focus(Field::Phone);
    h.clock.advance(Duration::milliseconds(2999));

    let outcome = h.controller.submit(&filled_form()).await;

    assert_eq!(outcome, SubmitOutcome::Ignored(IgnoreReason::TooFast));
    assert_eq!(h.transport.calls(), 0);
}

#[tokio::test]
async fn timer_starts_on_first_focus_only() {
    let mut h = harness(&[true], CountingStore::default());
    h.controller.on_focus(Field::Name);
    let started = h.controller.fill_started_at();
    h.clock.advance(Duration::seconds(2));
    h.controller.on_focus(Field::Address);
    h.clock.advance(Duration::seconds(2));

    assert_eq!(h.controller.fill_started_at(), started);
    assert_eq!(h.controller.submit(&filled_form()).await, SubmitOutcome::Sent);
}

#[tokio::test]
async fn wrong_challenge_answer_is_reported_without_side_effects() {
    let mut h = harness(&[true], CountingStore::default());
    h.start_filling();
    let form = FormData {
        challenge: "5".into(),
        ..filled_form()
    };

    let outcome = h.controller.submit(&form).await;

    assert_eq!(outcome, SubmitOutcome::ChallengeFailed);
    assert_eq!(h.message(), Some((CHALLENGE_ERROR.to_string(), Tone::Error)));
    assert_eq!(h.controller.view().focused, vec![Field::Challenge]);
    assert_eq!(h.transport.calls(), 0);
    assert_eq!(h.writes(), 0);
}

#[tokio::test]
async fn missing_consent_is_reported() {
    let mut h = harness(&[true], CountingStore::default());
    h.start_filling();
    let form = FormData {
        consent: false,
        ..filled_form()
    };

    let outcome = h.controller.submit(&form).await;

    assert_eq!(outcome, SubmitOutcome::ConsentMissing);
    assert_eq!(h.message(), Some((CONSENT_ERROR.to_string(), Tone::Error)));
    assert_eq!(h.controller.view().focused, vec![Field::Consent]);
    assert_eq!(h.transport.calls(), 0);
}

#[tokio::test]
async fn blank_fields_fail_native_validation() {
    let mut h = harness(&[true], CountingStore::default());
    h.start_filling();
    let form = FormData {
        name: "   ".into(),
        address: String::new(),
        ..filled_form()
    };

    let outcome = h.controller.submit(&form).await;

    assert_eq!(outcome, SubmitOutcome::Invalid(vec!["name", "address"]));
    assert_eq!(h.controller.view().invalid, vec!["name", "address"]);
    assert_eq!(h.transport.calls(), 0);
}

#[tokio::test]
async fn successful_submit_resets_the_form() {
    let mut h = harness(&[true], CountingStore::default());
    h.start_filling();

    let outcome = h.controller.submit(&filled_form()).await;

    assert_eq!(outcome, SubmitOutcome::Sent);
    assert_eq!(h.message(), Some((SENT_MESSAGE.to_string(), Tone::Success)));
    let sent = h.transport.sent.lock().unwrap().clone();
    assert_eq!(
        sent,
        vec![Submission::new("Ivan", "+7 999 123-45-67", "Moscow")]
    );
    let view = h.controller.view();
    assert_eq!(view.resets, 1);
    assert_eq!(view.lock_count, 1);
    assert!(!view.locked);
    assert!(h.controller.fill_started_at().is_none());
    assert!(h.controller.queue().entries().is_empty());
}

#[tokio::test]
async fn unreachable_relay_queues_and_resets() {
    let mut h = harness(&[false], CountingStore::default());
    h.start_filling();

    let outcome = h.controller.submit(&filled_form()).await;

    assert_eq!(outcome, SubmitOutcome::Queued);
    assert_eq!(h.message(), Some((QUEUED_MESSAGE.to_string(), Tone::Success)));
    let entries = h.controller.queue().entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(
        entries[0].payload,
        Submission::new("Ivan", "+7 999 123-45-67", "Moscow")
    );
    assert_eq!(h.controller.view().resets, 1);
    assert!(!h.controller.view().locked);
    assert!(h.controller.fill_started_at().is_none());
}

#[tokio::test]
async fn failed_queue_write_keeps_the_form() {
    let store = CountingStore {
        read_only: true,
        ..CountingStore::default()
    };
    let mut h = harness(&[false], store);
    h.start_filling();

    let outcome = h.controller.submit(&filled_form()).await;

    assert_eq!(outcome, SubmitOutcome::Failed);
    assert_eq!(h.message(), Some((FAILED_MESSAGE.to_string(), Tone::Error)));
    assert_eq!(h.controller.view().resets, 0);
    assert!(!h.controller.view().locked);
    assert!(h.controller.fill_started_at().is_some());
    assert!(h.controller.queue().store().get(STORAGE_KEY).unwrap().is_none());
}

#[tokio::test]
async fn each_submit_clears_the_previous_message() {
    let mut h = harness(&[true], CountingStore::default());
    h.start_filling();
    let wrong = FormData {
        challenge: "3".into(),
        ..filled_form()
    };
    h.controller.submit(&wrong).await;
    assert_eq!(h.message().map(|(_, tone)| tone), Some(Tone::Error));

    h.controller.view_mut().message = None;
    let form = FormData {
        honeypot: "bot".into(),
        ..filled_form()
    };
    h.controller.submit(&form).await;
    assert_eq!(h.message(), Some((String::new(), Tone::Neutral)));
}
