pub mod callback;
pub mod event;
pub mod payment;
pub mod ticket;
pub mod user;
