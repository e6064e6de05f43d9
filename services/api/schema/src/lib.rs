//! sea-orm entities for the api service.

pub mod events;
pub mod tickets;
pub mod transactions;
pub mod users;
