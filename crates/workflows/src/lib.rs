//! Workflow rules and trigger matching.
//!
//! A rule is a named trigger attached to one bot. When an inbound event
//! satisfies the trigger, the session announces the rule by sending its
//! rendered description. Executing the rule's step chain is a separate
//! engine's job; this crate only decides *whether* a rule fires.

pub mod error;
pub mod rule;
pub mod trigger;

pub use {
    error::{Error, Result},
    rule::{Trigger, WorkflowRule, WorkflowStep},
    trigger::{TriggerEvent, fires},
};
