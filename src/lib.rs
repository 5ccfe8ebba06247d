//! Taskboard: task and project management backend core.
//!
//! This crate provides the domain model, persistence ports and domain
//! services behind a collaborative task board: tasks with members, threaded
//! comments, file attachments and an append-only activity log.
//!
//! # Architecture
//!
//! Taskboard follows hexagonal architecture principles:
//!
//! - **Domain**: Entities, value types and validation with no infrastructure
//! - **Ports**: The document store, repository and unit-of-work contracts
//! - **Adapters**: An in-memory document store and document-backed
//!   repositories generic over any store
//! - **Services**: Orchestration of validation, cascades and activity logging
//!
//! # Modules
//!
//! - [`services`]: Task, user, comment, attachment, member and activity services
//! - [`transfer`]: Serializable transfer objects for an API boundary
//! - [`app`]: Composition root building services over a shared store

pub mod adapters;
pub mod app;
pub mod config;
pub mod domain;
pub mod logging;
pub mod ports;
pub mod services;
pub mod transfer;

#[cfg(test)]
mod test_support;
