//! CSXS command-line support
//!
//! Script loading and execution live here so they can be tested without
//! spawning the `csxs` binary.

pub mod script;

pub use script::{Holder, LedgerSummary, Script, ScriptError, Step, StepOutcome};
