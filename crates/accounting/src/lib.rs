//! Accounting session lifecycle for the AAA gateway.
//!
//! [`AccountingService`] handles Start / Interim-Update / Stop from the
//! RADIUS tier, session termination and bulk recovery from the session
//! manager, and idle timeouts from the session table, keeping the flow
//! controller, session manager, directory and RADIUS server in step.

mod create;
mod lifecycle;
mod service;
mod teardown;

pub use service::{AccountingService, Backends};
pub use teardown::TeardownErrors;
