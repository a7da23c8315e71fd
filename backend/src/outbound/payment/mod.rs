//! Payment gateway adapters.

mod dto;
mod http_gateway;

pub use http_gateway::{GatewayCredentials, HttpPaymentGateway};
