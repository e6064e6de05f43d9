//! Identity-provider integration surface: bearer-token validation and
//! webhook signature verification.

pub mod event;
pub mod token;
pub mod webhook;
