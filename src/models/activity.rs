use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::gateway::{Embed, Entity, Query};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Entity for Activity {
    const TABLE: &'static str = "activities";
    const NAME: &'static str = "Activity";
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NewActivity {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserActivity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub activity_id: Uuid,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Entity for UserActivity {
    const TABLE: &'static str = "user_activities";
    const NAME: &'static str = "User activity";
}

/// Body of `POST /user-activities`; the user is the caller.
#[derive(Debug, Deserialize)]
pub struct NewUserActivity {
    pub activity_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct UserActivityInsert {
    pub user_id: Uuid,
    pub activity_id: Uuid,
}

/// A user activity with its activity nested under `activity`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserActivityWithActivity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub activity_id: Uuid,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub activity: Option<Activity>,
}

impl Entity for UserActivityWithActivity {
    const TABLE: &'static str = "user_activities";
    const NAME: &'static str = "User activity";

    fn query() -> Query {
        Query::table(Self::TABLE).embed(Embed::belongs_to("activities", "activity_id").alias("activity"))
    }
}
