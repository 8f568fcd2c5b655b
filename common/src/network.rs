//! Addressing of naming-service hosts.

pub mod address;
