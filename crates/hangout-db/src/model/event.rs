use diesel::{pg::Pg, prelude::*};

use crate::db::enums::EventPhase;
use crate::db::schema;

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable)]
#[diesel(table_name = schema::event)]
#[diesel(check_for_backend(Pg))]
pub struct EventRow {
    pub id: String,
    pub creator_id: String,
    pub group_id: String,
    pub channel_id: String,
    pub details: Option<serde_json::Value>,
    pub earliest_date: Option<chrono::DateTime<chrono::Utc>>,
    pub phase: EventPhase,
    pub vote_options: serde_json::Value,
    pub claimed_by: Option<String>,
    pub claim_expires_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = schema::event)]
pub struct NewEventRow<'a> {
    pub id: &'a str,
    pub creator_id: &'a str,
    pub group_id: &'a str,
    pub channel_id: &'a str,
    pub phase: EventPhase,
    pub vote_options: serde_json::Value,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Columns written when the creator populates an event.
#[derive(AsChangeset)]
#[diesel(table_name = schema::event)]
pub struct PopulateEventChangeset {
    pub details: Option<serde_json::Value>,
    pub earliest_date: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
