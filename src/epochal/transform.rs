//! epochal::transform — composable output transforms for epochal stores.
//!
//! Purpose
//! -------
//! Post-process store values without subclassing the store. The original
//! design expressed "filtered", "sites", and "displacement" data as an
//! inheritance chain over one container; here a store stays a store, and a
//! transform is a value that maps its output arrays. Transforms compose, and
//! anything downstream that consumes an [`EpochValueSource`] accepts a
//! transformed source transparently.
//!
//! Key behaviors
//! -------------
//! - [`SiteFilter`] selects the observation rows belonging to a subset of
//!   sites, three channels (east, north, up) per site.
//! - [`FilteredSource`] pairs a borrowed source with a filter and implements
//!   [`EpochValueSource`] itself.
//! - [`site_channel_index`] maps a (site, component) pair to its row index
//!   in the stacked per-epoch observation block.
//!
//! Invariants & assumptions
//! ------------------------
//! - Store rows are ordered site-major: rows `3i`, `3i + 1`, `3i + 2` are
//!   the east, north, and up channels of site `i` in the store's site list.
//! - Every site named in a filter must exist in the store's site list;
//!   construction fails otherwise, before any epoch is read.
use ndarray::{Array2, Axis};

use crate::epochal::errors::{EpochError, EpochResult};
use crate::epochal::store::{EpochValueSource, EpochalStore};

/// Channels stored per site, in order: east, north, up.
pub const CHANNELS_PER_SITE: usize = 3;

/// Displacement component of one site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    East,
    North,
    Up,
}

impl Component {
    fn offset(self) -> usize {
        match self {
            Component::East => 0,
            Component::North => 1,
            Component::Up => 2,
        }
    }
}

/// Row index of `(site, component)` within a per-epoch observation block
/// ordered by `sites`.
pub fn site_channel_index(
    sites: &[String], site: &str, component: Component, store_label: &str,
) -> EpochResult<usize> {
    let position = sites.iter().position(|s| s == site).ok_or_else(|| EpochError::UnknownSite {
        site: site.to_string(),
        store: store_label.to_string(),
    })?;
    Ok(CHANNELS_PER_SITE * position + component.offset())
}

/// Row selection keeping the channels of a site subset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteFilter {
    rows: Vec<usize>,
}

impl SiteFilter {
    /// Build a filter keeping `keep` (in the given order) out of `all_sites`.
    ///
    /// Errors
    /// ------
    /// - `EpochError::UnknownSite` if any kept site is absent from
    ///   `all_sites`; checked eagerly so a bad site list fails before any
    ///   epoch value is read.
    pub fn new(all_sites: &[String], keep: &[String], store_label: &str) -> EpochResult<Self> {
        let mut rows = Vec::with_capacity(CHANNELS_PER_SITE * keep.len());
        for site in keep {
            let base = site_channel_index(all_sites, site, Component::East, store_label)?;
            rows.extend([base, base + 1, base + 2]);
        }
        Ok(Self { rows })
    }

    /// Build a filter against a store's own `sites` info entry.
    pub fn from_store(store: &EpochalStore, keep: &[String]) -> EpochResult<Self> {
        let sites = store.sites()?.to_vec();
        Self::new(&sites, keep, &store.label())
    }

    /// Number of rows the filter keeps.
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Select the kept rows of `value`.
    pub fn apply(&self, value: &Array2<f64>) -> Array2<f64> {
        value.select(Axis(0), &self.rows)
    }
}

/// An [`EpochValueSource`] whose output rows are filtered to a site subset.
#[derive(Debug, Clone)]
pub struct FilteredSource<'a, S: EpochValueSource> {
    source: &'a S,
    filter: SiteFilter,
}

impl<'a, S: EpochValueSource> FilteredSource<'a, S> {
    pub fn new(source: &'a S, filter: SiteFilter) -> Self {
        Self { source, filter }
    }

    pub fn filter(&self) -> &SiteFilter {
        &self.filter
    }
}

impl<S: EpochValueSource> EpochValueSource for FilteredSource<'_, S> {
    fn value_at(&self, epoch: i64) -> EpochResult<Array2<f64>> {
        Ok(self.filter.apply(&self.source.value_at(epoch)?))
    }
}
