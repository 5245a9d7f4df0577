//! Core library components.
//!
//! Reusable logic for the key lifecycle, the recipient policy, the encrypted
//! document, and configuration-value resolution.

pub mod constants;
pub mod context;
pub mod crypto;
pub mod document;
pub mod keystore;
pub mod policy;
pub mod resolver;
pub mod store;
