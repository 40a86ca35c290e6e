//! Activity board controller: the view-state value, the events that change it,
//! and the requests those events ask the caller to perform.
//!
//! `ViewState::apply` is the only writer of board state. It never touches the
//! network; it returns `Effect`s, and the caller feeds each effect's completion
//! back in as another `Event`. Front ends may run effects concurrently, so every
//! effect carries a sequence token. Load completions older than the newest load
//! already applied are dropped, which keeps a slow stale `GET /activities` from
//! overwriting a fresher board. The message slot stays last-writer-wins.

use std::{collections::VecDeque, sync::Arc};

use shared::{domain::ActivitySet, protocol::ClientRequest};
use tracing::{debug, warn};

use crate::{
    view::{self, ActivityCard, RemovalTarget, SelectOption},
    ActivityApi, ClientError, MutationOutcome,
};

pub const LOADING_TEXT: &str = "Loading activities...";
pub const LOAD_FAILED_TEXT: &str = "Could not load activities.";
pub const SIGNUP_ACCEPTED_TEXT: &str = "Signed up successfully!";
pub const SIGNUP_REJECTED_TEXT: &str = "Unknown error";
pub const REMOVAL_ACCEPTED_TEXT: &str = "Participant removed";
pub const REMOVAL_REJECTED_TEXT: &str = "Failed to remove participant";
pub const NETWORK_ERROR_TEXT: &str = "Network error. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Loaded,
    LoadFailed,
    /// At least one signup or removal is outstanding; loads landing meanwhile
    /// do not leave this phase.
    Submitting,
    /// A mutation was rejected or never completed; nothing was reloaded.
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Ok,
    Err,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub tone: Tone,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardList {
    /// Nothing loaded yet.
    Pending,
    Cards(Vec<ActivityCard>),
    LoadFailed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignupForm {
    pub email: String,
    /// Selected option value; empty while the placeholder is selected.
    pub activity: String,
}

impl SignupForm {
    pub fn reset(&mut self) {
        self.email.clear();
        self.activity.clear();
    }
}

/// A request the caller must perform, tagged with its sequence token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Effect {
    pub seq: u64,
    pub request: ClientRequest,
}

#[derive(Debug)]
pub enum Event {
    LoadRequested,
    LoadCompleted {
        seq: u64,
        result: Result<ActivitySet, ClientError>,
    },
    EmailEdited(String),
    ActivitySelected(String),
    SignupSubmitted,
    SignupCompleted {
        seq: u64,
        result: Result<MutationOutcome, ClientError>,
    },
    RemovalRequested(RemovalTarget),
    RemovalConfirmed,
    RemovalDeclined,
    RemovalCompleted {
        seq: u64,
        result: Result<MutationOutcome, ClientError>,
    },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Self::LoadRequested => "load_requested",
            Self::LoadCompleted { .. } => "load_completed",
            Self::EmailEdited(_) => "email_edited",
            Self::ActivitySelected(_) => "activity_selected",
            Self::SignupSubmitted => "signup_submitted",
            Self::SignupCompleted { .. } => "signup_completed",
            Self::RemovalRequested(_) => "removal_requested",
            Self::RemovalConfirmed => "removal_confirmed",
            Self::RemovalDeclined => "removal_declined",
            Self::RemovalCompleted { .. } => "removal_completed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    phase: Phase,
    cards: CardList,
    options: Vec<SelectOption>,
    message: Option<StatusMessage>,
    pub form: SignupForm,
    pending_removal: Option<RemovalTarget>,
    next_seq: u64,
    applied_load_seq: u64,
    /// Signups and removals issued but not yet completed.
    mutations_in_flight: u32,
    /// Form reset owed to an accepted signup, due once this load lands.
    reset_form_at_load: Option<u64>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewState {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            cards: CardList::Pending,
            options: vec![SelectOption::placeholder()],
            message: None,
            form: SignupForm::default(),
            pending_removal: None,
            next_seq: 1,
            applied_load_seq: 0,
            mutations_in_flight: 0,
            reset_form_at_load: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn cards(&self) -> &CardList {
        &self.cards
    }

    pub fn options(&self) -> &[SelectOption] {
        &self.options
    }

    /// `None` while the message area has never been written.
    pub fn message(&self) -> Option<&StatusMessage> {
        self.message.as_ref()
    }

    /// Removal waiting for the user's confirmation.
    pub fn pending_removal(&self) -> Option<&RemovalTarget> {
        self.pending_removal.as_ref()
    }

    pub fn card(&self, name: &str) -> Option<&ActivityCard> {
        match &self.cards {
            CardList::Cards(cards) => cards.iter().find(|card| card.name == name),
            CardList::Pending | CardList::LoadFailed => None,
        }
    }

    /// Replaces the message slot. `set_message("", true)` clears it.
    pub fn set_message(&mut self, text: impl Into<String>, ok: bool) {
        self.message = Some(StatusMessage {
            text: text.into(),
            tone: if ok { Tone::Ok } else { Tone::Err },
        });
    }

    fn issue(&mut self, request: ClientRequest) -> Effect {
        let seq = self.next_seq;
        self.next_seq += 1;
        debug!(seq, request = request.name(), "issuing board request");
        Effect { seq, request }
    }

    /// Moves to `phase` unless a signup or removal is still outstanding, in
    /// which case the board stays `Submitting` until it completes.
    fn settle(&mut self, phase: Phase) {
        self.phase = if self.mutations_in_flight > 0 {
            Phase::Submitting
        } else {
            phase
        };
    }

    fn issue_mutation(&mut self, request: ClientRequest) -> Effect {
        self.mutations_in_flight += 1;
        self.phase = Phase::Submitting;
        self.issue(request)
    }

    fn issue_load(&mut self) -> Effect {
        self.settle(Phase::Loading);
        self.issue(ClientRequest::LoadActivities)
    }

    pub fn apply(&mut self, event: Event) -> Vec<Effect> {
        debug!(event = event.name(), phase = ?self.phase, "applying board event");
        match event {
            Event::LoadRequested => vec![self.issue_load()],
            Event::LoadCompleted { seq, result } => {
                self.apply_load(seq, result);
                Vec::new()
            }
            Event::EmailEdited(email) => {
                self.form.email = email;
                Vec::new()
            }
            Event::ActivitySelected(activity) => {
                self.form.activity = activity;
                Vec::new()
            }
            Event::SignupSubmitted => self.submit_signup().into_iter().collect(),
            Event::SignupCompleted { result, .. } => self.apply_mutation(
                result,
                SIGNUP_ACCEPTED_TEXT,
                SIGNUP_REJECTED_TEXT,
                true,
            ),
            Event::RemovalRequested(target) => {
                self.pending_removal = Some(target);
                Vec::new()
            }
            Event::RemovalDeclined => {
                self.pending_removal = None;
                Vec::new()
            }
            Event::RemovalConfirmed => match self.pending_removal.take() {
                Some(RemovalTarget { activity, email }) => {
                    vec![self.issue_mutation(ClientRequest::RemoveParticipant { activity, email })]
                }
                None => Vec::new(),
            },
            Event::RemovalCompleted { result, .. } => self.apply_mutation(
                result,
                REMOVAL_ACCEPTED_TEXT,
                REMOVAL_REJECTED_TEXT,
                false,
            ),
        }
    }

    fn apply_load(&mut self, seq: u64, result: Result<ActivitySet, ClientError>) {
        // The reset follows the reload whether or not the reload succeeded.
        if self.reset_form_at_load.is_some_and(|due| seq >= due) {
            self.reset_form_at_load = None;
            self.form.reset();
        }
        if seq <= self.applied_load_seq {
            debug!(
                seq,
                applied = self.applied_load_seq,
                "dropping stale activities load"
            );
            return;
        }
        self.applied_load_seq = seq;

        match result {
            Ok(activities) => {
                self.cards = CardList::Cards(view::render_cards(&activities));
                self.options = view::populate_select(&activities);
                // Repopulating the select falls back to its placeholder.
                self.form.activity.clear();
                self.settle(Phase::Loaded);
            }
            Err(err) => {
                warn!(seq, "failed to load activities: {err}");
                // Select options keep whatever the last good load produced.
                self.cards = CardList::LoadFailed;
                self.settle(Phase::LoadFailed);
            }
        }
    }

    fn submit_signup(&mut self) -> Option<Effect> {
        let email = self.form.email.trim();
        if email.is_empty() || self.form.activity.is_empty() {
            return None;
        }
        let request = ClientRequest::Signup {
            activity: self.form.activity.clone(),
            email: email.to_string(),
        };
        self.set_message("", true);
        Some(self.issue_mutation(request))
    }

    fn apply_mutation(
        &mut self,
        result: Result<MutationOutcome, ClientError>,
        accepted_text: &str,
        rejected_text: &str,
        reset_form: bool,
    ) -> Vec<Effect> {
        self.mutations_in_flight = self.mutations_in_flight.saturating_sub(1);
        match result {
            Ok(MutationOutcome::Accepted { message }) => {
                self.set_message(non_empty_or(message, accepted_text), true);
                let reload = self.issue_load();
                if reset_form {
                    self.reset_form_at_load = Some(reload.seq);
                }
                vec![reload]
            }
            Ok(MutationOutcome::Rejected(rejection)) => {
                self.set_message(non_empty_or(rejection.detail, rejected_text), false);
                self.settle(Phase::Failed);
                Vec::new()
            }
            Err(err) => {
                warn!("activity mutation did not complete: {err}");
                self.set_message(NETWORK_ERROR_TEXT, false);
                self.settle(Phase::Failed);
                Vec::new()
            }
        }
    }
}

fn non_empty_or(text: Option<String>, fallback: &str) -> String {
    text.filter(|text| !text.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

/// Performs one effect against `api` and returns its completion event.
pub async fn execute<A>(api: &A, effect: Effect) -> Event
where
    A: ActivityApi + ?Sized,
{
    let Effect { seq, request } = effect;
    match request {
        ClientRequest::LoadActivities => Event::LoadCompleted {
            seq,
            result: api.load_activities().await,
        },
        ClientRequest::Signup { activity, email } => Event::SignupCompleted {
            seq,
            result: api.signup(&activity, &email).await,
        },
        ClientRequest::RemoveParticipant { activity, email } => Event::RemovalCompleted {
            seq,
            result: api.remove_participant(&activity, &email).await,
        },
    }
}

/// Owns a `ViewState` and drives each event's effects to completion, one
/// request at a time.
pub struct BoardController<A: ActivityApi + ?Sized> {
    api: Arc<A>,
    state: ViewState,
}

impl<A: ActivityApi + ?Sized> BoardController<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            state: ViewState::new(),
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Applies `event` without running the effects it produces.
    pub fn dispatch(&mut self, event: Event) -> Vec<Effect> {
        self.state.apply(event)
    }

    pub async fn run(&mut self, event: Event) {
        let mut pending: VecDeque<Effect> = self.state.apply(event).into();
        while let Some(effect) = pending.pop_front() {
            let completion = execute(self.api.as_ref(), effect).await;
            pending.extend(self.state.apply(completion));
        }
    }

    pub async fn load(&mut self) {
        self.run(Event::LoadRequested).await;
    }

    pub async fn submit_signup(&mut self, activity: &str, email: &str) {
        self.state.apply(Event::ActivitySelected(activity.to_string()));
        self.state.apply(Event::EmailEdited(email.to_string()));
        self.run(Event::SignupSubmitted).await;
    }

    /// Opens the confirmation for `target` and resolves it with `confirm`.
    pub async fn remove_participant(
        &mut self,
        target: RemovalTarget,
        confirm: impl FnOnce(&RemovalTarget) -> bool,
    ) {
        self.state.apply(Event::RemovalRequested(target.clone()));
        let event = if confirm(&target) {
            Event::RemovalConfirmed
        } else {
            Event::RemovalDeclined
        };
        self.run(event).await;
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
