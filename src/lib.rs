//! Agora: buyer/vendor messaging core for the agora marketplace backend.
//!
//! This crate owns the conversation threading and pagination engine that sits
//! behind the marketplace's buyer and vendor message endpoints. HTTP routing,
//! sessions, and account management live elsewhere and reach this crate only
//! through explicit parameters (the caller's internal key) and the identity
//! resolver port.
//!
//! # Architecture
//!
//! Agora follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (in-memory, `PostgreSQL`)
//!
//! # Modules
//!
//! - [`identity`]: Buyer/vendor identifiers and the identity resolver port
//! - [`messaging`]: Conversations, messages, unread state, and pagination
//! - [`config`]: Runtime configuration loaded from TOML and the environment
//! - [`db`]: Shared `PostgreSQL` connection pool plumbing
//! - [`telemetry`]: Structured logging initialisation

pub mod config;
pub mod db;
pub mod identity;
pub mod messaging;
pub mod telemetry;
