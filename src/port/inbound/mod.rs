//! Inbound ports: use-cases exposed to driving adapters such as the CLI.

pub mod operator;

pub use operator::RegimeOperator;
