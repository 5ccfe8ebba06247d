//! Unit tests for the domain services.
//!
//! Most tests drive the services against the in-memory store through a
//! shared harness; `envelope_tests` uses a mocked store for failure paths.

mod attachment_service_tests;
mod task_service_tests;
