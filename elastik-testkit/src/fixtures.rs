//! Fixed domain documents used across the test suites

use chrono::{DateTime, TimeZone, Utc};
use elastik::transport::InMemoryConnection;
use elastik::{ConnectionSettings, Document, ElasticClient, Id};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const DEFAULT_INDEX: &str = "default-index";
pub const PROJECT_INDEX: &str = "project";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateOfBeing {
    BellyUp,
    Stable,
    VeryActive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Developer {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl Document for Developer {
    const TYPE_NAME: &'static str = "Developer";

    fn id(&self) -> Option<Id> {
        Some(Id::from(self.id))
    }
}

impl Developer {
    pub fn instance() -> Self {
        Self::numbered(1)
    }

    pub fn numbered(id: i64) -> Self {
        Self {
            id,
            first_name: format!("Dev{}", id),
            last_name: "Tester".to_string(),
            email: format!("dev{}@example.com", id),
        }
    }

    pub fn developers() -> Vec<Self> {
        (1..=3).map(Self::numbered).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub name: String,
    pub description: Option<String>,
    pub state: StateOfBeing,
    pub start_date: DateTime<Utc>,
    pub last_activity: Option<DateTime<Utc>>,
    pub number_of_commits: u32,
    pub lead_developer: Developer,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Document for Project {
    const TYPE_NAME: &'static str = "Project";

    fn id(&self) -> Option<Id> {
        Some(Id::from(&self.name))
    }
}

impl Project {
    /// The project most url tests are written against
    pub fn instance() -> Self {
        Self::named("NEST", 42)
    }

    pub fn named(name: &str, number_of_commits: u32) -> Self {
        Self {
            name: name.to_string(),
            description: Some(format!("The {} project", name)),
            state: StateOfBeing::VeryActive,
            start_date: fixed_date(2015, 1, 1),
            last_activity: Some(fixed_date(2016, 6, 30)),
            number_of_commits,
            lead_developer: Developer::instance(),
            tags: vec!["search".to_string(), "client".to_string()],
        }
    }

    pub fn projects() -> Vec<Self> {
        vec![
            Self::instance(),
            Self::named("Elasticsearch.Net", 120),
            Self {
                state: StateOfBeing::BellyUp,
                last_activity: None,
                ..Self::named("Kibana", 7)
            },
        ]
    }
}

/// A commit, indexed as a child of its project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitActivity {
    pub id: String,
    pub project_name: String,
    pub committer: Developer,
    pub message: String,
    pub committed_on: DateTime<Utc>,
}

impl Document for CommitActivity {
    const TYPE_NAME: &'static str = "CommitActivity";

    fn id(&self) -> Option<Id> {
        Some(Id::from(&self.id))
    }
}

impl CommitActivity {
    pub fn instance() -> Self {
        Self::numbered(1)
    }

    pub fn numbered(n: u32) -> Self {
        Self {
            id: format!("commit-{}", n),
            project_name: Project::instance().name,
            committer: Developer::instance(),
            message: format!("fix #{}", n),
            committed_on: fixed_date(2016, 1, n.clamp(1, 28)),
        }
    }
}

fn fixed_date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::UNIX_EPOCH)
}

/// Settings the url and query tests share
pub fn connection_settings() -> ConnectionSettings {
    ConnectionSettings::default()
        .default_index(DEFAULT_INDEX)
        .default_mapping_for::<Project>(|m| m.index_name(PROJECT_INDEX))
        .default_mapping_for::<CommitActivity>(|m| m.index_name(PROJECT_INDEX).type_name("commits"))
        .disable_direct_streaming()
}

/// Client answering every call with `status` and `body`
pub fn in_memory_client(status: u16, body: impl Into<Vec<u8>>) -> ElasticClient {
    ElasticClient::with_connection(
        connection_settings(),
        Arc::new(InMemoryConnection::with_response(status, body)),
        Arc::new(elastik::transport::SystemClock),
    )
}
