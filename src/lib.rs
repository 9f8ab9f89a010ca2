//! # Agent Starter
//!
//! A starter template for a conversational agent backed by Gemini.
//!
//! This library provides:
//! - A settings loader merging environment secrets with `config/agent_config.yaml`
//! - Typed tools the model can call, with JSON schemas derived from Rust types
//! - A tool-calling agent loop over the Gemini REST API
//! - An HTTP API exposing health, invocation and A2A discovery routes
//!
//! ## Example
//!
//! ```rust,ignore
//! use agent_starter::{build_agent, tools::default_tools, Settings};
//!
//! let settings = Settings::load()?;
//! let agent = build_agent(&settings, default_tools());
//! let reply = agent.run("Plan a weekend in Lisbon").await?;
//! println!("{}", reply.text);
//! ```

pub mod agent;
pub mod api;
pub mod chat;
pub mod config;
pub mod llm;
pub mod logging;
pub mod tools;
pub mod validate;

pub use agent::{build_agent, build_agent_with_client, Agent};
pub use config::Settings;
