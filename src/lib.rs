#![doc = "cms-provision: build-time provisioning for a headless CMS project."]

//! During a static-site build this crate ensures the remote CMS side of the
//! site exists and is current: exactly one project per (site, branch),
//! seeded from a local content pattern on first creation, with the schema
//! pushed when it changed and a read and a read/write API key in place.
//! Connection details are handed to the rest of the build as environment
//! variables.
//!
//! The whole workflow is idempotent through list-then-create checks against
//! the remote service; re-running it on every build creates nothing twice.

pub mod api;
pub mod archive;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod keys;
pub mod pattern;
pub mod project;
pub mod provision;
pub mod schema;
