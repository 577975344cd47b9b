//! Cross-module tests for `sempatch_core`.
