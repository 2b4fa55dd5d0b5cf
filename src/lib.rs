//! Mindkeep CLI - a memory-augmented learning assistant
//!
//! This crate provides the core functionality for the `mindkeep` tool.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface using clap
//! - [`model`] - Data types (Skill, LearningItem, Challenge, Fact, ...)
//! - [`storage`] - SQLite database layer
//! - [`scheduler`] - Spaced-repetition interval functions
//! - [`roadmap`] - Tolerant parser for AI-generated challenge roadmaps
//! - [`library`] - Built-in challenge templates
//! - [`llm`] - Completion service client (Anthropic)
//! - [`embeddings`] - Embedding provider + similarity search
//! - [`lifecycle`] - Chat transcript persistence and one-shot shutdown
//! - [`config`] - Configuration management
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod embeddings;
pub mod error;
pub mod explanations;
pub mod library;
pub mod lifecycle;
pub mod llm;
pub mod model;
pub mod roadmap;
pub mod scheduler;
pub mod storage;
pub mod validate;

pub use error::{Error, Result};
