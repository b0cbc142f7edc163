//! Collaborator seams.
//!
//! The analyzer only talks to the outside world through these traits, so
//! hosts can plug in any provider and tests can script the model.

pub mod vision;
