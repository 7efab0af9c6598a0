//! Order form submission flow.
//!
//! A submit passes four anti-abuse gates before any network traffic: honeypot, dwell time,
//! anti-spam answer, consent. The first two drop the submit without telling the user; the last
//! two explain themselves and move focus to the offending control.

use std::sync::Arc;

use lead_core::{Submission, missing_fields};
use time::{Duration, OffsetDateTime};
use tracing::{debug, info};

use crate::clock::Clock;
use crate::queue::PendingQueue;
use crate::store::KeyValueStore;
use crate::transport::RelayTransport;

/// Minimum time between the first focus on a real field and submit.
pub const MIN_FILL_TIME: Duration = Duration::milliseconds(3000);
/// Expected answer to "2 + 2 = ?".
pub const CHALLENGE_ANSWER: &str = "4";

pub const CHALLENGE_ERROR: &str = "Неверный ответ на антиспам-вопрос. Попробуйте еще раз.";
pub const CONSENT_ERROR: &str = "Необходимо согласиться с политикой конфиденциальности.";
pub const SENT_MESSAGE: &str = "Заявка отправлена. Мы свяжемся с вами в ближайшее время.";
pub const QUEUED_MESSAGE: &str =
    "Связь временно недоступна. Заявка сохранена и будет отправлена автоматически.";
pub const FAILED_MESSAGE: &str =
    "Не удалось отправить заявку прямо сейчас. Попробуйте немного позже.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Phone,
    Address,
    /// Hidden `website` input only bots fill in.
    Honeypot,
    Challenge,
    Consent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Neutral,
    Success,
    Error,
}

/// Snapshot of the form controls at submit time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub honeypot: String,
    pub challenge: String,
    pub consent: bool,
}

impl FormData {
    pub fn submission(&self) -> Submission {
        Submission::new(&self.name, &self.phone, &self.address).trimmed()
    }
}

/// What the controller can do to the page.
pub trait FormView {
    fn set_message(&mut self, text: &str, tone: Tone);
    fn focus(&mut self, field: Field);
    fn lock_submit(&mut self);
    fn unlock_submit(&mut self);
    fn reset(&mut self);
    fn report_validity(&mut self, missing: &[&'static str]);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    Honeypot,
    NoInteraction,
    TooFast,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Ignored(IgnoreReason),
    ChallengeFailed,
    ConsentMissing,
    Invalid(Vec<&'static str>),
    Sent,
    Queued,
    Failed,
}

pub struct SubmissionController<S, V> {
    queue: PendingQueue<S>,
    transport: Arc<dyn RelayTransport>,
    view: V,
    clock: Arc<dyn Clock>,
    fill_started_at: Option<OffsetDateTime>,
}

impl<S, V> SubmissionController<S, V>
where
    S: KeyValueStore,
    V: FormView,
{
    pub fn new(
        queue: PendingQueue<S>,
        transport: Arc<dyn RelayTransport>,
        view: V,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            queue,
            transport,
            view,
            clock,
            fill_started_at: None,
        }
    }

    pub fn queue(&self) -> &PendingQueue<S> {
        &self.queue
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn fill_started_at(&self) -> Option<OffsetDateTime> {
        self.fill_started_at
    }

    /// Starts the dwell timer on the first focus into a real field.
    pub fn on_focus(&mut self, field: Field) {
        if self.fill_started_at.is_none() && field != Field::Honeypot {
            self.fill_started_at = Some(self.clock.now());
        }
    }

    pub async fn submit(&mut self, form: &FormData) -> SubmitOutcome {
        self.view.set_message("", Tone::Neutral);

        if let Some(outcome) = self.check_gates(form) {
            return outcome;
        }

        let submission = form.submission();
        let missing = missing_fields(&submission);
        if !missing.is_empty() {
            self.view.report_validity(&missing);
            return SubmitOutcome::Invalid(missing);
        }

        self.view.lock_submit();
        let delivery = self
            .queue
            .deliver(&submission, &self.transport)
            .await;

        let outcome = if delivery.ok {
            self.view.set_message(SENT_MESSAGE, Tone::Success);
            SubmitOutcome::Sent
        } else if delivery.queued {
            self.view.set_message(QUEUED_MESSAGE, Tone::Success);
            SubmitOutcome::Queued
        } else {
            self.view.set_message(FAILED_MESSAGE, Tone::Error);
            SubmitOutcome::Failed
        };

        if delivery.ok || delivery.queued {
            self.view.reset();
            self.fill_started_at = None;
        }
        self.view.unlock_submit();
        info!(outcome = ?outcome, "order form submitted");
        outcome
    }

    fn check_gates(&mut self, form: &FormData) -> Option<SubmitOutcome> {
        if !form.honeypot.trim().is_empty() {
            debug!("honeypot filled, dropping submit");
            return Some(SubmitOutcome::Ignored(IgnoreReason::Honeypot));
        }

        let Some(started) = self.fill_started_at else {
            debug!("submit without prior interaction, dropping");
            return Some(SubmitOutcome::Ignored(IgnoreReason::NoInteraction));
        };
        if self.clock.now() - started < MIN_FILL_TIME {
            debug!("form filled too quickly, dropping submit");
            return Some(SubmitOutcome::Ignored(IgnoreReason::TooFast));
        }

        if form.challenge.trim() != CHALLENGE_ANSWER {
            self.view.set_message(CHALLENGE_ERROR, Tone::Error);
            self.view.focus(Field::Challenge);
            return Some(SubmitOutcome::ChallengeFailed);
        }

        if !form.consent {
            self.view.set_message(CONSENT_ERROR, Tone::Error);
            self.view.focus(Field::Consent);
            return Some(SubmitOutcome::ConsentMissing);
        }

        None
    }
}
