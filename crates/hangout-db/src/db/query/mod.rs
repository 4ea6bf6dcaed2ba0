pub mod claim;
pub mod event;
pub mod participant;
