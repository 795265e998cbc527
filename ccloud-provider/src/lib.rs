//! Confluent Cloud resource provider.
//!
//! Reconciles declared resources (environments, service accounts, Kafka
//! clusters, topics, ACLs and role bindings) against the Confluent Cloud
//! control plane. A planning engine decides what should change; this crate
//! carries out one lifecycle operation at a time through [`Provider::execute`].

pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod import_env;
pub mod kafka_rest;
pub mod provider;
pub mod resource;
pub mod timeouts;
pub mod translate;

pub use client::Client;
pub use config::ProviderConfig;
pub use credentials::Credentials;
pub use error::{Operation, ProviderError, Result};
pub use provider::{Diagnostic, OperationRequest, OperationResponse, Provider, Severity};
pub use resource::{Resource, StateRecord};
pub use timeouts::{ClusterType, timeout_for};
