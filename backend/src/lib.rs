//! Donation platform backend library.
//!
//! Hexagonal layout: [`domain`] holds entities, ports, and services;
//! [`inbound`] adapts HTTP onto the driving ports; [`outbound`] implements
//! the driven ports over Diesel and the payment gateway's REST API;
//! [`middleware`] carries the request-tracing layer shared by both.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Request-tracing middleware re-exported for server wiring.
pub use middleware::Trace;
