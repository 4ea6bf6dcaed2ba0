//! Database enum types with Diesel serialization.
//!
//! Each enum implements `ToSql` and `FromSql` against the `CHECK` constraint of its column.

use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::pg::{Pg, PgValue};
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use hangout_core::model::Phase;
use std::fmt;
use std::io::Write;

/// Lifecycle stage of an event.
///
/// Maps to `event.phase` CHECK constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
pub enum EventPhase {
    Scheduling,
    Voting,
    Finalized,
}

impl ToSql<Text, Pg> for EventPhase {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Pg> for EventPhase {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"scheduling" => Ok(Self::Scheduling),
            b"voting" => Ok(Self::Voting),
            b"finalized" => Ok(Self::Finalized),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

impl EventPhase {
    /// Returns the database string representation of this phase.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scheduling => "scheduling",
            Self::Voting => "voting",
            Self::Finalized => "finalized",
        }
    }
}

impl fmt::Display for EventPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Phase> for EventPhase {
    fn from(phase: Phase) -> Self {
        match phase {
            Phase::Scheduling => Self::Scheduling,
            Phase::Voting => Self::Voting,
            Phase::Finalized => Self::Finalized,
        }
    }
}

impl From<EventPhase> for Phase {
    fn from(phase: EventPhase) -> Self {
        match phase {
            EventPhase::Scheduling => Self::Scheduling,
            EventPhase::Voting => Self::Voting,
            EventPhase::Finalized => Self::Finalized,
        }
    }
}
