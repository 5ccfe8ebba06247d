//! Unit tests for the domain model.

mod record_tests;
