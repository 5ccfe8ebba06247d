//! Unit tests for the persistence adapters.
