//! Monitoring service for Yosemite entry-reservation announcements.
//!
//! Subscribers register an email address and a month. A background poll loop
//! periodically scans the park's reservation page for date ranges in that month
//! and emails the subscriber once matching dates appear.

pub mod checker;
pub mod config;
pub mod domain;
pub mod error;
pub mod markup;
pub mod masking;
pub mod monitor;
pub mod notifier;
pub mod store;
pub mod telemetry;
