//! Epoch-keyed data model: the store, output transforms, and slip
//! representation conversions.
//!
//! - [`store`]: the epoch -> array container with its metadata side channel
//!   and file round trip.
//! - [`transform`]: composable site/channel filters over store output.
//! - [`slip`]: exact incremental <-> cumulative slip conversions.
//! - [`errors`]: the shared [`errors::EpochError`] type.
pub mod errors;
pub mod slip;
pub mod store;
pub mod transform;

pub use errors::{EpochError, EpochResult};
pub use store::{validate_epochs, EpochValueSource, EpochalStore, InfoValue};
pub use transform::{Component, FilteredSource, SiteFilter, CHANNELS_PER_SITE};
