//! Core of the job-board service: catalog search, application lifecycle
//! tracking, profile-driven recommendations, and funnel statistics.
//!
//! Persistence, identity, and time are collaborators behind traits
//! ([`jobs::JobStore`], [`applications::ApplicationRepository`],
//! [`users::UserDirectory`], [`clock::Clock`]); the HTTP routers translate
//! the typed results into transport responses and nothing else.

pub mod applications;
pub mod clock;
pub mod config;
pub mod error;
pub mod jobs;
pub mod recommend;
pub mod stats;
pub mod store;
pub mod telemetry;
pub mod users;
