//! End-to-end flows across the protocol components.

#[cfg(test)]
mod harness;

mod access_flows;
mod record_flows;
