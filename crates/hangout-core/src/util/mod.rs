pub mod short_id;
