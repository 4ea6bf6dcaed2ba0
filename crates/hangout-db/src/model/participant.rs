use diesel::{pg::Pg, prelude::*};

use crate::db::schema;

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Insertable)]
#[diesel(table_name = schema::participant_availability)]
#[diesel(check_for_backend(Pg))]
pub struct AvailabilityRow {
    pub event_id: String,
    pub user_id: String,
    pub days: serde_json::Value,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Insertable)]
#[diesel(table_name = schema::participant_vote)]
#[diesel(check_for_backend(Pg))]
pub struct VoteRow {
    pub event_id: String,
    pub user_id: String,
    pub location_votes: Vec<i32>,
    pub time_votes: Vec<i32>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
