//! Bank-specific statement parsers, one module per vendor format.

pub mod account;
pub mod credit_card;
