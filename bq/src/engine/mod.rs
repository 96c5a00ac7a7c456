//! Progression state machine
//!
//! One command per invocation: load the record, perform at most one
//! transition, persist, report. States are "no record", "in progress" (index
//! below the registry length) and "completed" (index equal to it).

mod machine;
mod outcome;

pub use machine::{Engine, EnginePaths};
pub use outcome::{ListEntry, Outcome};
