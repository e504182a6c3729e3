//! shipreport-lib: Deployment package reporting
//!
//! This crate computes, without touching the live content store, what applying
//! a deployment package would do to each partition of that store:
//! - `package`: unpacks the manifest and per-item definitions from a package
//! - `manifest`: parses the declared entries and the delete policy
//! - `collision`: decides whether an existing item is overwritten or left alone
//! - `reconcile`: compares declared entries with the live tree, inferring deletions
//! - `report`: the engine entry point and the structured report it returns
//! - `security`: the capability boundary for installing packaged accounts

pub mod collision;
pub mod config;
pub mod consts;
pub mod ident;
pub mod manifest;
pub mod package;
pub mod platform;
pub mod reconcile;
pub mod report;
pub mod security;
pub mod store;
pub mod util;

pub use config::ReportConfig;
pub use report::{ChangeType, ErrorKind, PartitionReport, Report, ReportEngine, ReportEntry, ReportOptions};
pub use store::{ContentStore, JsonStore, LiveItem};
