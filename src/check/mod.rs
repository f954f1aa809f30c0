//! Checking configured programs' web pages for newer versions
//!
//! The [`pipeline`] owns the run; everything it touches outside the catalog
//! goes through two host-supplied seams: the browser session
//! ([`driver::AutomationDriver`]) and the installed-environment view
//! ([`environment::EnvironmentProbe`]).
//!
//! # Modules
//!
//! - [`driver`]: The browser automation seam
//! - [`environment`]: Browser environment preconditions and user-agent cache
//! - [`error`]: Update-check failure taxonomy
//! - [`pipeline`]: The update-check run

pub mod driver;
pub mod environment;
pub mod error;
pub mod pipeline;
