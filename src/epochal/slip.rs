//! epochal::slip — conversions between incremental and cumulative slip.
//!
//! Purpose
//! -------
//! A slip history can be stored either as *incremental* slip (slip added
//! during the interval ending at each epoch) or as *cumulative* slip (the
//! running total since the reference epoch). The prefix sum
//! `cumulative[k] = sum(incremental[0..=k])` is the sole source of truth for
//! one representation from the other; both conversions here are exact prefix
//! sums / adjacent differences over the store's ordered epochs, so a round
//! trip reproduces the input to floating-point exactness.
//!
//! Conventions
//! -----------
//! - Epoch order is the store's own strictly increasing key order.
//! - Info side-channel entries are carried through unchanged.
use crate::epochal::errors::EpochResult;
use crate::epochal::store::EpochalStore;

/// Cumulative slip store from an incremental slip store (prefix sum).
pub fn cumulative_from_incremental(incremental: &EpochalStore) -> EpochResult<EpochalStore> {
    let mut out = EpochalStore::new();
    let mut running = None;
    for epoch in incremental.epochs() {
        let value = incremental.get_epoch_value(epoch)?;
        let total = match running.take() {
            None => value,
            Some(prev) => prev + &value,
        };
        out.set_epoch_value(epoch, total.clone())?;
        running = Some(total);
    }
    copy_info(incremental, &mut out);
    Ok(out)
}

/// Incremental slip store from a cumulative slip store (adjacent
/// differences; the first epoch's increment is the cumulative value itself).
pub fn incremental_from_cumulative(cumulative: &EpochalStore) -> EpochResult<EpochalStore> {
    let mut out = EpochalStore::new();
    let mut previous = None;
    for epoch in cumulative.epochs() {
        let value = cumulative.get_epoch_value(epoch)?;
        let increment = match &previous {
            None => value.clone(),
            Some(prev) => &value - prev,
        };
        out.set_epoch_value(epoch, increment)?;
        previous = Some(value);
    }
    copy_info(cumulative, &mut out);
    Ok(out)
}

fn copy_info(from: &EpochalStore, to: &mut EpochalStore) {
    for (name, value) in from.info_entries() {
        to.set_info(name, value.clone());
    }
}
