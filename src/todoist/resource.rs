use fake::Dummy;
use serde::{de, Deserialize, Deserializer, Serialize};

/// Defines project data structure.
///
#[derive(Clone, Debug, Dummy, PartialEq, Eq, Deserialize)]
pub struct Project {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub is_inbox_project: bool,
}

/// Defines due date data structure.
///
#[derive(Clone, Debug, Default, Dummy, PartialEq, Eq, Deserialize)]
pub struct Due {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub string: String,
    #[serde(default)]
    pub datetime: Option<String>,
    #[serde(default)]
    pub is_recurring: bool,
}

/// Defines task data structure as returned by `GET /tasks`.
///
#[derive(Clone, Debug, Dummy, PartialEq, Eq, Deserialize)]
pub struct ApiTask {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default = "default_priority")]
    pub priority: u8,
    #[serde(default, deserialize_with = "optional_id_string")]
    pub project_id: Option<String>,
    #[serde(default)]
    pub due: Option<Due>,
}

/// Body of task create and update requests.
///
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TaskPayload {
    pub content: String,
    pub priority: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_string: Option<String>,
}

fn default_priority() -> u8 {
    1
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(u64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> String {
        match raw {
            RawId::Text(text) => text,
            RawId::Number(number) => number.to_string(),
        }
    }
}

/// Ids have been both strings and integers across API versions.
fn id_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let id: String = RawId::deserialize(deserializer)?.into();
    if id.is_empty() {
        return Err(de::Error::custom("empty id"));
    }
    Ok(id)
}

fn optional_id_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(Option::<RawId>::deserialize(deserializer)?
        .map(String::from)
        .filter(|id| !id.is_empty()))
}
