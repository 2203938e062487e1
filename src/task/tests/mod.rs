//! Unit tests for the task domain and its adapters.
