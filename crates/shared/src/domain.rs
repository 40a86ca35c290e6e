use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Schedule shown when an activity has none (or an empty one).
pub const SCHEDULE_FALLBACK: &str = "TBD";

/// One named offering as served by `GET /activities`.
///
/// Every field is optional on the wire, and none fails the whole activity set.
/// Text fields show any non-null scalar as text; a capacity that is not a
/// number or a roster that is not a list decodes as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub schedule: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_capacity",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_participants: Option<u64>,
    #[serde(
        default,
        deserialize_with = "lenient_roster",
        skip_serializing_if = "Option::is_none"
    )]
    pub participants: Option<Vec<String>>,
}

impl Activity {
    pub fn description_text(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }

    pub fn schedule_label(&self) -> &str {
        match self.schedule.as_deref() {
            Some(schedule) if !schedule.is_empty() => schedule,
            _ => SCHEDULE_FALLBACK,
        }
    }

    /// Signed-up emails in signup order; empty when the roster is absent.
    pub fn roster(&self) -> &[String] {
        self.participants.as_deref().unwrap_or_default()
    }

    /// Capacity minus roster size, floored at zero. `None` unless both the
    /// capacity and the roster are present.
    pub fn spots_left(&self) -> Option<u64> {
        let max = self.max_participants?;
        let participants = self.participants.as_ref()?;
        Some(max.saturating_sub(participants.len() as u64))
    }
}

/// Activity name -> activity, in the order the source listed them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivitySet(IndexMap<String, Activity>);

impl ActivitySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, activity: Activity) {
        self.0.insert(name.into(), activity);
    }

    pub fn get(&self, name: &str) -> Option<&Activity> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Activity)> {
        self.0.iter().map(|(name, activity)| (name.as_str(), activity))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<N: Into<String>> FromIterator<(N, Activity)> for ActivitySet {
    fn from_iter<T: IntoIterator<Item = (N, Activity)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, activity)| (name.into(), activity))
                .collect(),
        )
    }
}

/// Renders a loose JSON scalar the way a text node would show it.
pub(crate) fn value_to_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text),
        other => Some(other.to_string()),
    }
}

pub(crate) fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_to_text(Value::deserialize(deserializer)?))
}

fn lenient_capacity<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Number(number) = value else {
        return Ok(None);
    };
    if let Some(max) = number.as_u64() {
        return Ok(Some(max));
    }
    // Negative or fractional capacities still count as numeric.
    Ok(number
        .as_f64()
        .map(|max| if max > 0.0 { max.floor() as u64 } else { 0 }))
}

fn lenient_roster<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        // Every entry counts toward the roster size, `null` included.
        Value::Array(entries) => Some(
            entries
                .into_iter()
                .map(|entry| match entry {
                    Value::String(email) => email,
                    other => other.to_string(),
                })
                .collect(),
        ),
        _ => None,
    })
}
