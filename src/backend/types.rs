use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An email as returned by `GET /processed-emails`, with the todos and
/// events the backend extracted from it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Email {
    /// Older backends omit the id; `assign_missing_ids` fills it in.
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
    #[serde(default)]
    pub from_addr: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub preview: String,
    #[serde(default)]
    pub body_html: String,
    #[serde(default)]
    pub todos: Vec<Todo>,
    #[serde(default)]
    pub events: Vec<Event>,
}

impl Email {
    pub fn id(&self) -> &str {
        self.id.as_deref().unwrap_or_default()
    }

    pub fn display_subject(&self) -> &str {
        if self.subject.trim().is_empty() {
            "(no subject)"
        } else {
            &self.subject
        }
    }
}

/// Ids arrive as strings or integers depending on the backend version.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        match Option::<serde_json::Value>::deserialize(deserializer)? {
            Some(serde_json::Value::String(s)) => Some(s),
            Some(serde_json::Value::Number(n)) => Some(n.to_string()),
            _ => None,
        },
    )
}

/// Give every email without an id one derived from its position in the
/// response. Derived ids never collide with ids the backend sent.
pub fn assign_missing_ids(emails: &mut [Email]) {
    let mut taken: HashSet<String> = emails
        .iter()
        .filter_map(|e| e.id.clone())
        .filter(|id| !id.is_empty())
        .collect();

    for (index, email) in emails.iter_mut().enumerate() {
        if email.id.as_deref().is_none_or(str::is_empty) {
            let mut id = format!("#{}", index);
            while taken.contains(&id) {
                id.push('\'');
            }
            taken.insert(id.clone());
            email.id = Some(id);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub content: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub completion_deadline: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

/// Body of `GET /refresh-status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshStatus {
    pub status: BatchStatus,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub last_updated: Option<String>,
    #[serde(default)]
    pub count: u64,
}

/// The backend's self-reported state of its email processing job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BatchStatus {
    #[default]
    Idle,
    Fetching,
    Processing,
    Completed,
    Error,
    /// A state this client does not know about yet
    Unknown(String),
}

impl BatchStatus {
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "idle" => Self::Idle,
            "fetching" => Self::Fetching,
            "processing" => Self::Processing,
            "completed" => Self::Completed,
            "error" => Self::Error,
            _ => Self::Unknown(s.to_string()),
        }
    }

    /// The job has stopped, successfully or not.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Fetching | Self::Processing)
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Idle => "idle",
            Self::Fetching => "fetching",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Error => "error",
            Self::Unknown(s) => s,
        }
    }
}

impl<'de> Deserialize<'de> for BatchStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

impl Serialize for BatchStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.label())
    }
}

impl std::fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
