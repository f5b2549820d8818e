//! Cross-crate integration tests for the squelch workspace

#[cfg(test)]
mod pipeline_integration;
