//! aeroha - failover decision core for a two-node plus witness database cluster

pub mod cli;
pub mod config;
pub mod control;
pub mod failover;
pub mod observability;
