//! Mystack Core - stack configuration types for the multi-tenant cluster controller
//!
//! This crate provides the foundational types shared by the other mystack crates:
//! - `StackConfig`: the typed stack description (apps, services, setup, volumes)
//! - `ConfigError`: parse/validation errors

pub mod config;
pub mod error;

pub use config::{
    EnvVar, ProbeConfig, QuantityPair, ResourcesConfig, SetupConfig, StackConfig, VolumeConfig,
    VolumeMountConfig, WorkloadConfig,
};
pub use error::{ConfigError, Result};
