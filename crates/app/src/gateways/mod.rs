//! External Collaborators

pub mod notifications;
pub mod payments;
