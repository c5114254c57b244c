//! FREE_RANDAO core.
//!
//! Two independent pieces that must agree bit for bit with the ledger
//! contracts: the seed-driven circle packing simulator (`circle`) and the
//! record signing and verification subsystem (`record`). Everything the
//! ledger provides is reached through the traits in `ledger`.

#![allow(clippy::module_inception)]
#![allow(clippy::too_many_arguments)]

pub mod circle;
pub mod config;
pub mod crypto;
pub mod ledger;
pub mod record;
pub mod utils;
