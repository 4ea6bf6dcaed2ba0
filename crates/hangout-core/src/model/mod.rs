//! Domain model shared by the store, the service layer and the HTTP layer.

pub mod availability;
pub mod event;
pub mod ids;
pub mod location;
pub mod phase;
pub mod voting;

pub use availability::{AvailabilityBlock, ClockTime, DayAvailability, UserAvailability};
pub use event::{Event, EventDetails};
pub use ids::{EventId, UserId};
pub use location::{Coordinates, UserLocation};
pub use phase::Phase;
pub use voting::{Attendee, Location, TimePair, TimeWindow, UserVotes, VoteOptions};
