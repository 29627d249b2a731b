//! optbyte-core - Boot option-byte correction protocol
//!
//! This crate implements the unlock/modify/program/relock sequence used to
//! clear the boot-select option bit on devices where boot source selection
//! must follow a physical pin instead of a persisted option bit. The
//! hardware registers are abstracted behind the [`store::OptionByteStore`]
//! trait so the protocol can be exercised against a simulated store.
//!
//! # Example
//!
//! ```ignore
//! use optbyte_core::{apply, MutatorOptions, Outcome};
//!
//! fn correct_boot_source<S: OptionByteStore>(store: &mut S) {
//!     match apply(store, &MutatorOptions::default()) {
//!         Ok(Outcome::Unchanged) => { /* already pin-controlled */ }
//!         Ok(Outcome::ResetRequested) => { /* device reset imminent */ }
//!         Err(e) => log::error!("option byte correction failed: {}", e),
//!     }
//! }
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

#[cfg(feature = "std")]
extern crate std;

pub mod error;
pub mod mutator;
pub mod register;
pub mod store;

pub use error::{Error, Result};
pub use mutator::{apply, MutatorOptions, Outcome};
pub use register::{OptionRegister, OptrFlags};
pub use store::{OptionByteStore, UnlockState};
