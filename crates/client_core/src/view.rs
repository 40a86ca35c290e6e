//! Projections of an activity set into the board's widgets: the card list and
//! the activity select. Both are rebuilt wholesale from the data on every call.

use shared::domain::{Activity, ActivitySet};

pub const SELECT_PLACEHOLDER: &str = "-- Select an activity --";
pub const PARTICIPANTS_TITLE: &str = "Participants";
pub const NO_PARTICIPANTS_TEXT: &str = "No participants yet";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn placeholder() -> Self {
        Self {
            value: String::new(),
            label: SELECT_PLACEHOLDER.to_string(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.value.is_empty()
    }
}

/// The (activity, email) pair a participant row's remove control acts on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RemovalTarget {
    pub activity: String,
    pub email: String,
}

impl RemovalTarget {
    pub fn new(activity: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            activity: activity.into(),
            email: email.into(),
        }
    }

    pub fn confirmation_prompt(&self) -> String {
        format!("Remove {} from {}?", self.email, self.activity)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantRow {
    pub email: String,
    /// Accessible label of the remove control.
    pub remove_label: String,
    /// Hover text of the remove control.
    pub remove_title: String,
    pub target: RemovalTarget,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParticipantsSection {
    Empty,
    Rows(Vec<ParticipantRow>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityCard {
    pub name: String,
    pub description: String,
    pub schedule_line: String,
    pub spots_left: Option<u64>,
    pub participants: ParticipantsSection,
}

impl ActivityCard {
    pub fn spots_badge(&self) -> Option<String> {
        self.spots_left.map(|spots| format!("{spots} spots left"))
    }
}

pub fn render_cards(activities: &ActivitySet) -> Vec<ActivityCard> {
    activities
        .iter()
        .map(|(name, activity)| render_card(name, activity))
        .collect()
}

fn render_card(name: &str, activity: &Activity) -> ActivityCard {
    let participants = match activity.roster() {
        [] => ParticipantsSection::Empty,
        roster => ParticipantsSection::Rows(
            roster
                .iter()
                .map(|email| ParticipantRow {
                    email: email.clone(),
                    remove_label: format!("Remove {email} from {name}"),
                    remove_title: format!("Remove {email}"),
                    target: RemovalTarget::new(name, email.as_str()),
                })
                .collect(),
        ),
    };

    ActivityCard {
        name: name.to_string(),
        description: activity.description_text().to_string(),
        schedule_line: format!("Schedule: {}", activity.schedule_label()),
        spots_left: activity.spots_left(),
        participants,
    }
}

pub fn populate_select(activities: &ActivitySet) -> Vec<SelectOption> {
    std::iter::once(SelectOption::placeholder())
        .chain(activities.names().map(|name| SelectOption {
            value: name.to_string(),
            label: name.to_string(),
        }))
        .collect()
}
