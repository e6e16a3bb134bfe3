//! Scenarios grouped by the part of the system they drive

mod factories;
mod scaffolding;
mod script_creation;
mod unnamed_constraints;
