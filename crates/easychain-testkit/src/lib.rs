//! # easychain testkit
//!
//! Testing utilities for easychain.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Fixed inputs with expected SHA-256 digests
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: Deterministic chains for scenario tests
//!
//! ## Golden Vectors
//!
//! ```rust
//! use easychain_testkit::vectors::verify_all_vectors;
//!
//! for (name, ok, hex) in verify_all_vectors() {
//!     assert!(ok, "{name}: got {hex}");
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use easychain_testkit::generators::{message_from_params, MessageParams};
//!
//! proptest! {
//!     #[test]
//!     fn message_hash_is_deterministic(params: MessageParams) {
//!         let m1 = message_from_params(&params);
//!         let m2 = message_from_params(&params);
//!         prop_assert_eq!(m1.hash(), m2.hash());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use easychain_testkit::fixtures::example_chain;
//!
//! let chain = example_chain();
//! assert_eq!(chain.len(), 4);
//! assert!(chain.validate().is_ok());
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{example_chain, TestFixture, FROZEN};
pub use generators::{message_from_params, MessageParams};
pub use vectors::{all_vectors, message_from_vector, verify_all_vectors, MessageVector};
