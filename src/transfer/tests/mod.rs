//! Unit tests for transfer objects.
