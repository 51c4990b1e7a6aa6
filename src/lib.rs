//! # meshtastic-send
//!
//! `meshtastic-send` is a one-shot command-line tool that encodes a short text
//! message into the Meshtastic protobuf envelope and publishes it over MQTT to
//! an internet-connected mesh gateway. One invocation produces exactly one
//! outbound message.
//!
//! ## Core Modules
//!
//! The library is structured into several modules, each with a distinct responsibility:
//!
//! - `cli`: Command-line argument surface, orchestration, and exit codes.
//! - `config`: Handles loading and merging layered configuration (file, environment, CLI).
//! - `mesh`: Node addressing, packet identifiers, the protobuf wire envelope, and topic strings.
//! - `transport`: The MQTT client used to deliver the encoded envelope to the broker.
//! - `utils`: Contains shared utilities, such as error handling and logging setup.

pub mod cli;
pub mod config;
pub mod mesh;
pub mod transport;
pub mod utils;
