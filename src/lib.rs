//! kbharvest: literature observation harvesting for research resources.
//!
//! For each resource in a registry export, a retrieval-augmented agent is
//! asked, turn after turn within one session, for observations it can back
//! with a document from its knowledge base. Replies are parsed into
//! [`types::Observation`] rows until the agent signals it has nothing new or
//! the turn ceiling is reached, and each resource's rows land in one CSV file.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use kbharvest::prelude::*;
//! use kbharvest::provider::HttpAgentClient;
//!
//! # async fn example() -> kbharvest::error::Result<()> {
//! let config = HarvestConfig::load(None)?;
//! let client = Arc::new(HttpAgentClient::from_config(&config)?);
//! let invoker = AgentInvoker::from_config(client, &config)?;
//! let resource = Resource::new("a1", "HCT 116", "Cell Line").with_rrid("CVCL_0291");
//!
//! let report = ExtractionLoop::new(invoker).run(&resource).await?;
//! println!("{} observations after {} turns", report.observations.len(), report.turns);
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod agent_loop;
pub mod batch;
pub mod config;
pub mod error;
pub mod extract;
pub mod output;
pub mod prelude;
pub mod provider;
pub mod query;
pub mod registry;
pub mod retrieval;
pub mod stop;
pub mod types;
pub mod util;

#[cfg(feature = "cli")]
pub mod cli;
