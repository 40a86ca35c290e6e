use super::*;
use std::sync::Mutex;

use async_trait::async_trait;
use shared::{
    domain::{Activity, ActivitySet},
    error::ApiRejection,
};

use crate::view::ParticipantsSection;

/// In-memory backend with the same rules as the real activities API.
struct TestActivityApi {
    activities: Mutex<ActivitySet>,
    calls: Mutex<Vec<ClientRequest>>,
    fail_loads: Mutex<bool>,
    offline: bool,
}

impl TestActivityApi {
    fn new(activities: ActivitySet) -> Self {
        Self {
            activities: Mutex::new(activities),
            calls: Mutex::new(Vec::new()),
            fail_loads: Mutex::new(false),
            offline: false,
        }
    }

    fn offline(activities: ActivitySet) -> Self {
        Self {
            offline: true,
            ..Self::new(activities)
        }
    }

    fn set_fail_loads(&self, fail: bool) {
        *self.fail_loads.lock().expect("lock") = fail;
    }

    fn calls(&self) -> Vec<ClientRequest> {
        self.calls.lock().expect("lock").clone()
    }

    fn record(&self, request: ClientRequest) {
        self.calls.lock().expect("lock").push(request);
    }
}

fn transport_error() -> ClientError {
    let err = reqwest::Client::new()
        .get("http://[::1")
        .build()
        .expect_err("unterminated host must not build");
    ClientError::Transport(err)
}

fn rejected(status: u16, detail: &str) -> MutationOutcome {
    MutationOutcome::Rejected(ApiRejection::new(status, Some(detail.to_string())))
}

#[async_trait]
impl ActivityApi for TestActivityApi {
    async fn load_activities(&self) -> Result<ActivitySet, ClientError> {
        self.record(ClientRequest::LoadActivities);
        if *self.fail_loads.lock().expect("lock") {
            return Err(ClientError::Status { status: 500 });
        }
        Ok(self.activities.lock().expect("lock").clone())
    }

    async fn signup(&self, activity: &str, email: &str) -> Result<MutationOutcome, ClientError> {
        self.record(ClientRequest::Signup {
            activity: activity.to_string(),
            email: email.to_string(),
        });
        if self.offline {
            return Err(transport_error());
        }
        let mut activities = self.activities.lock().expect("lock");
        let Some(current) = activities.get(activity).cloned() else {
            return Ok(rejected(404, "Activity not found"));
        };
        let mut updated = current;
        let roster = updated.participants.get_or_insert_with(Vec::new);
        if roster.iter().any(|existing| existing == email) {
            return Ok(rejected(400, "Student is already signed up"));
        }
        roster.push(email.to_string());
        activities.insert(activity, updated);
        Ok(MutationOutcome::Accepted {
            message: Some(format!("Signed up {email} for {activity}")),
        })
    }

    async fn remove_participant(
        &self,
        activity: &str,
        email: &str,
    ) -> Result<MutationOutcome, ClientError> {
        self.record(ClientRequest::RemoveParticipant {
            activity: activity.to_string(),
            email: email.to_string(),
        });
        if self.offline {
            return Err(transport_error());
        }
        let mut activities = self.activities.lock().expect("lock");
        let Some(mut updated) = activities.get(activity).cloned() else {
            return Ok(rejected(404, "Activity not found"));
        };
        let roster = updated.participants.get_or_insert_with(Vec::new);
        let before = roster.len();
        roster.retain(|existing| existing != email);
        if roster.len() == before {
            return Ok(rejected(400, "Student is not signed up for this activity"));
        }
        activities.insert(activity, updated);
        Ok(MutationOutcome::Accepted {
            message: Some(format!("Removed {email} from {activity}")),
        })
    }
}

fn sample_activities() -> ActivitySet {
    [
        (
            "Chess Club",
            Activity {
                description: Some("Learn strategies and compete in chess tournaments".to_string()),
                schedule: Some("Fridays, 3:30 PM - 5:00 PM".to_string()),
                max_participants: Some(12),
                participants: Some(vec!["michael@mergington.edu".to_string()]),
            },
        ),
        (
            "Programming Class",
            Activity {
                description: Some("Learn programming fundamentals".to_string()),
                schedule: None,
                max_participants: Some(20),
                participants: Some(Vec::new()),
            },
        ),
    ]
    .into_iter()
    .collect()
}

fn roster_of(state: &ViewState, name: &str) -> Vec<String> {
    match state.card(name).map(|card| &card.participants) {
        Some(ParticipantsSection::Rows(rows)) => rows.iter().map(|row| row.email.clone()).collect(),
        _ => Vec::new(),
    }
}

async fn loaded_controller(api: Arc<TestActivityApi>) -> BoardController<TestActivityApi> {
    let mut controller = BoardController::new(api);
    controller.load().await;
    assert_eq!(controller.state().phase(), Phase::Loaded);
    controller
}

#[test]
fn starts_idle_with_placeholder_select_and_hidden_message() {
    let state = ViewState::new();
    assert_eq!(state.phase(), Phase::Idle);
    assert_eq!(state.cards(), &CardList::Pending);
    assert_eq!(state.options(), &[SelectOption::placeholder()]);
    assert_eq!(state.message(), None);
}

#[tokio::test]
async fn load_renders_cards_and_select_options() {
    let api = Arc::new(TestActivityApi::new(sample_activities()));
    let controller = loaded_controller(api).await;
    let state = controller.state();

    let CardList::Cards(cards) = state.cards() else {
        panic!("expected cards, got {:?}", state.cards());
    };
    let names: Vec<&str> = cards.iter().map(|card| card.name.as_str()).collect();
    assert_eq!(names, vec!["Chess Club", "Programming Class"]);
    assert_eq!(cards[0].spots_left, Some(11));
    assert_eq!(cards[1].participants, ParticipantsSection::Empty);

    let values: Vec<&str> = state.options().iter().map(|o| o.value.as_str()).collect();
    assert_eq!(values, vec!["", "Chess Club", "Programming Class"]);
}

#[tokio::test]
async fn load_failure_shows_placeholder_and_keeps_select_options() {
    let api = Arc::new(TestActivityApi::new(sample_activities()));
    let mut controller = loaded_controller(api.clone()).await;
    let options_before = controller.state().options().to_vec();

    api.set_fail_loads(true);
    controller.load().await;

    let state = controller.state();
    assert_eq!(state.phase(), Phase::LoadFailed);
    assert_eq!(state.cards(), &CardList::LoadFailed);
    assert!(state.card("Chess Club").is_none());
    assert_eq!(state.options(), options_before.as_slice());

    api.set_fail_loads(false);
    controller.load().await;
    assert_eq!(controller.state().phase(), Phase::Loaded);
}

#[tokio::test]
async fn signup_success_reloads_and_resets_form() {
    let api = Arc::new(TestActivityApi::new(sample_activities()));
    let mut controller = loaded_controller(api.clone()).await;

    controller.submit_signup("Chess Club", "  a@b.com ").await;

    let state = controller.state();
    assert_eq!(state.phase(), Phase::Loaded);
    let roster = roster_of(state, "Chess Club");
    assert_eq!(roster.iter().filter(|email| *email == "a@b.com").count(), 1);
    assert_eq!(state.card("Chess Club").and_then(|c| c.spots_left), Some(10));
    assert_eq!(state.form, SignupForm::default());
    assert_eq!(
        state.message(),
        Some(&StatusMessage {
            text: "Signed up a@b.com for Chess Club".to_string(),
            tone: Tone::Ok,
        })
    );
    assert_eq!(
        api.calls(),
        vec![
            ClientRequest::LoadActivities,
            ClientRequest::Signup {
                activity: "Chess Club".to_string(),
                email: "a@b.com".to_string(),
            },
            ClientRequest::LoadActivities,
        ]
    );
}

#[tokio::test]
async fn duplicate_signup_shows_detail_and_keeps_form() {
    let api = Arc::new(TestActivityApi::new(sample_activities()));
    let mut controller = loaded_controller(api.clone()).await;

    controller
        .submit_signup("Chess Club", "michael@mergington.edu")
        .await;

    let state = controller.state();
    assert_eq!(state.phase(), Phase::Failed);
    assert_eq!(
        state.message(),
        Some(&StatusMessage {
            text: "Student is already signed up".to_string(),
            tone: Tone::Err,
        })
    );
    assert_eq!(state.form.email, "michael@mergington.edu");
    assert_eq!(state.form.activity, "Chess Club");
    // No reload after a rejection.
    assert_eq!(api.calls().len(), 2);
}

#[tokio::test]
async fn signup_network_failure_shows_generic_message() {
    let api = Arc::new(TestActivityApi::offline(sample_activities()));
    let mut controller = loaded_controller(api.clone()).await;

    controller.submit_signup("Chess Club", "a@b.com").await;

    let state = controller.state();
    assert_eq!(state.phase(), Phase::Failed);
    assert_eq!(state.message().map(|m| m.text.as_str()), Some(NETWORK_ERROR_TEXT));
    assert_eq!(state.message().map(|m| m.tone), Some(Tone::Err));
    assert_eq!(state.form.email, "a@b.com");
}

#[test]
fn signup_defaults_apply_when_server_sends_no_text() {
    let mut state = ViewState::new();
    let effects = state.apply(Event::SignupCompleted {
        seq: 1,
        result: Ok(MutationOutcome::Accepted { message: None }),
    });
    assert_eq!(state.message().map(|m| m.text.as_str()), Some(SIGNUP_ACCEPTED_TEXT));
    assert_eq!(effects.len(), 1);
    assert_eq!(effects[0].request, ClientRequest::LoadActivities);

    let effects = state.apply(Event::SignupCompleted {
        seq: 2,
        result: Ok(MutationOutcome::Rejected(ApiRejection::new(400, None))),
    });
    assert!(effects.is_empty());
    assert_eq!(state.message().map(|m| m.text.as_str()), Some(SIGNUP_REJECTED_TEXT));
    assert_eq!(state.message().map(|m| m.tone), Some(Tone::Err));
}

#[test]
fn incomplete_signup_form_is_a_no_op() {
    let mut state = ViewState::new();
    state.set_message("previous", false);

    state.apply(Event::ActivitySelected("Chess Club".to_string()));
    state.apply(Event::EmailEdited("   ".to_string()));
    let before = state.clone();
    assert!(state.apply(Event::SignupSubmitted).is_empty());
    assert_eq!(state, before);

    state.apply(Event::ActivitySelected(String::new()));
    state.apply(Event::EmailEdited("a@b.com".to_string()));
    let before = state.clone();
    assert!(state.apply(Event::SignupSubmitted).is_empty());
    assert_eq!(state, before);
    assert_eq!(state.message().map(|m| m.text.as_str()), Some("previous"));
}

#[test]
fn valid_submission_clears_message_before_request() {
    let mut state = ViewState::new();
    state.set_message("stale error", false);
    state.apply(Event::ActivitySelected("Chess Club".to_string()));
    state.apply(Event::EmailEdited(" a@b.com ".to_string()));

    let effects = state.apply(Event::SignupSubmitted);

    assert_eq!(state.phase(), Phase::Submitting);
    assert_eq!(
        state.message(),
        Some(&StatusMessage {
            text: String::new(),
            tone: Tone::Ok,
        })
    );
    assert_eq!(
        effects,
        vec![Effect {
            seq: 1,
            request: ClientRequest::Signup {
                activity: "Chess Club".to_string(),
                email: "a@b.com".to_string(),
            },
        }]
    );
}

#[tokio::test]
async fn confirmed_removal_reloads_and_frees_a_spot() {
    let api = Arc::new(TestActivityApi::new(sample_activities()));
    let mut controller = loaded_controller(api.clone()).await;
    controller.submit_signup("Chess Club", "a@b.com").await;
    assert_eq!(
        controller.state().card("Chess Club").and_then(|c| c.spots_left),
        Some(10)
    );

    let mut prompts = Vec::new();
    controller
        .remove_participant(RemovalTarget::new("Chess Club", "a@b.com"), |target| {
            prompts.push(target.confirmation_prompt());
            true
        })
        .await;

    let state = controller.state();
    assert_eq!(prompts, vec!["Remove a@b.com from Chess Club?".to_string()]);
    assert!(!roster_of(state, "Chess Club").contains(&"a@b.com".to_string()));
    assert_eq!(state.card("Chess Club").and_then(|c| c.spots_left), Some(11));
    assert_eq!(
        state.message().map(|m| m.text.as_str()),
        Some("Removed a@b.com from Chess Club")
    );
    assert_eq!(state.pending_removal(), None);
}

#[tokio::test]
async fn declined_removal_issues_no_request() {
    let api = Arc::new(TestActivityApi::new(sample_activities()));
    let mut controller = loaded_controller(api.clone()).await;
    let before = controller.state().clone();
    let calls_before = api.calls().len();

    controller
        .remove_participant(
            RemovalTarget::new("Chess Club", "michael@mergington.edu"),
            |_| false,
        )
        .await;

    assert_eq!(api.calls().len(), calls_before);
    assert_eq!(controller.state(), &before);
}

#[tokio::test]
async fn rejected_removal_keeps_board_without_reload() {
    let api = Arc::new(TestActivityApi::new(sample_activities()));
    let mut controller = loaded_controller(api.clone()).await;
    let cards_before = controller.state().cards().clone();

    controller
        .remove_participant(RemovalTarget::new("Chess Club", "ghost@b.com"), |_| true)
        .await;

    let state = controller.state();
    assert_eq!(state.phase(), Phase::Failed);
    assert_eq!(state.cards(), &cards_before);
    assert_eq!(
        state.message().map(|m| m.text.as_str()),
        Some("Student is not signed up for this activity")
    );
    assert_eq!(
        api.calls().last(),
        Some(&ClientRequest::RemoveParticipant {
            activity: "Chess Club".to_string(),
            email: "ghost@b.com".to_string(),
        })
    );
}

#[test]
fn removal_defaults_apply_when_server_sends_no_text() {
    let mut state = ViewState::new();
    state.apply(Event::RemovalCompleted {
        seq: 1,
        result: Ok(MutationOutcome::Rejected(ApiRejection::new(500, None))),
    });
    assert_eq!(state.message().map(|m| m.text.as_str()), Some(REMOVAL_REJECTED_TEXT));

    let effects = state.apply(Event::RemovalCompleted {
        seq: 2,
        result: Ok(MutationOutcome::Accepted {
            message: Some(String::new()),
        }),
    });
    assert_eq!(state.message().map(|m| m.text.as_str()), Some(REMOVAL_ACCEPTED_TEXT));
    assert_eq!(effects.len(), 1);
}

#[test]
fn removal_network_failure_shows_generic_message() {
    let mut state = ViewState::new();
    state.apply(Event::RemovalCompleted {
        seq: 1,
        result: Err(transport_error()),
    });
    assert_eq!(state.message().map(|m| m.text.as_str()), Some(NETWORK_ERROR_TEXT));
    assert_eq!(state.phase(), Phase::Failed);
}

#[test]
fn confirming_without_pending_removal_does_nothing() {
    let mut state = ViewState::new();
    let before = state.clone();
    assert!(state.apply(Event::RemovalConfirmed).is_empty());
    assert_eq!(state, before);
}

#[test]
fn stale_load_completion_is_dropped() {
    let mut state = ViewState::new();
    let first = state.apply(Event::LoadRequested).remove(0);
    let second = state.apply(Event::LoadRequested).remove(0);
    assert!(second.seq > first.seq);

    let fresh: ActivitySet = [("Fresh", Activity::default())].into_iter().collect();
    let stale: ActivitySet = [("Stale", Activity::default())].into_iter().collect();

    state.apply(Event::LoadCompleted {
        seq: second.seq,
        result: Ok(fresh),
    });
    state.apply(Event::LoadCompleted {
        seq: first.seq,
        result: Ok(stale),
    });
    assert!(state.card("Fresh").is_some());
    assert!(state.card("Stale").is_none());

    state.apply(Event::LoadCompleted {
        seq: first.seq,
        result: Err(ClientError::Status { status: 502 }),
    });
    assert_eq!(state.phase(), Phase::Loaded);
    assert!(state.card("Fresh").is_some());
}

#[test]
fn older_load_still_applies_when_nothing_newer_landed() {
    let mut state = ViewState::new();
    let first = state.apply(Event::LoadRequested).remove(0);
    let _second = state.apply(Event::LoadRequested).remove(0);

    let set: ActivitySet = [("Chess Club", Activity::default())].into_iter().collect();
    state.apply(Event::LoadCompleted {
        seq: first.seq,
        result: Ok(set),
    });
    assert_eq!(state.phase(), Phase::Loaded);
    assert!(state.card("Chess Club").is_some());
}

fn named(names: &[&str]) -> ActivitySet {
    names
        .iter()
        .map(|name| (*name, Activity::default()))
        .collect()
}

fn land_load(state: &mut ViewState, activities: ActivitySet) {
    let load = state.apply(Event::LoadRequested).remove(0);
    state.apply(Event::LoadCompleted {
        seq: load.seq,
        result: Ok(activities),
    });
}

#[test]
fn reload_returns_select_to_placeholder() {
    let mut state = ViewState::new();
    land_load(&mut state, named(&["Chess Club"]));
    state.apply(Event::ActivitySelected("Chess Club".to_string()));
    state.apply(Event::EmailEdited("a@b.com".to_string()));

    land_load(&mut state, named(&["Art"]));

    assert!(state.form.activity.is_empty());
    assert_eq!(state.form.email, "a@b.com");
    assert!(state.apply(Event::SignupSubmitted).is_empty());
    assert_eq!(state.phase(), Phase::Loaded);
}

#[test]
fn load_landing_mid_mutation_keeps_submitting() {
    let mut state = ViewState::new();
    let load = state.apply(Event::LoadRequested).remove(0);
    state.apply(Event::ActivitySelected("Art".to_string()));
    state.apply(Event::EmailEdited("a@b.com".to_string()));
    let signup = state.apply(Event::SignupSubmitted).remove(0);

    state.apply(Event::LoadCompleted {
        seq: load.seq,
        result: Ok(named(&["Art"])),
    });
    assert_eq!(state.phase(), Phase::Submitting);
    assert!(state.card("Art").is_some());

    let reload = state
        .apply(Event::SignupCompleted {
            seq: signup.seq,
            result: Ok(MutationOutcome::Accepted { message: None }),
        })
        .remove(0);
    assert_eq!(state.phase(), Phase::Loading);
    state.apply(Event::LoadCompleted {
        seq: reload.seq,
        result: Ok(named(&["Art"])),
    });
    assert_eq!(state.phase(), Phase::Loaded);
}

#[test]
fn rejected_mutation_while_another_is_outstanding_stays_submitting() {
    let mut state = ViewState::new();
    land_load(&mut state, named(&["Art"]));
    state.apply(Event::RemovalRequested(RemovalTarget::new("Art", "x@y.com")));
    let removal = state.apply(Event::RemovalConfirmed).remove(0);
    state.apply(Event::ActivitySelected("Art".to_string()));
    state.apply(Event::EmailEdited("a@b.com".to_string()));
    let _signup = state.apply(Event::SignupSubmitted).remove(0);

    state.apply(Event::RemovalCompleted {
        seq: removal.seq,
        result: Ok(rejected(400, "Student is not signed up for this activity")),
    });
    assert_eq!(state.phase(), Phase::Submitting);
}

#[test]
fn accepted_signup_resets_form_once_reload_lands() {
    let mut state = ViewState::new();
    land_load(&mut state, named(&["Art"]));
    state.apply(Event::ActivitySelected("Art".to_string()));
    state.apply(Event::EmailEdited("a@b.com".to_string()));
    let signup = state.apply(Event::SignupSubmitted).remove(0);

    let reload = state
        .apply(Event::SignupCompleted {
            seq: signup.seq,
            result: Ok(MutationOutcome::Accepted { message: None }),
        })
        .remove(0);
    assert_eq!(state.form.email, "a@b.com");
    assert_eq!(state.form.activity, "Art");

    state.apply(Event::LoadCompleted {
        seq: reload.seq,
        result: Err(ClientError::Status { status: 500 }),
    });
    assert_eq!(state.form, SignupForm::default());
    assert_eq!(state.phase(), Phase::LoadFailed);
}
