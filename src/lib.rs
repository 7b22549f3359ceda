// src/lib.rs
// Iris - image context bridge between voice-agent platforms and vision LLMs

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod config;
pub mod correlation;
pub mod error;
pub mod llm;
pub mod storage;
pub mod voice;
pub mod web;

pub use error::{IrisError, Result};
