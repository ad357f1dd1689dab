//! Load-once catalogue service.
//!
//! [`Catalog`] wraps a [`CatalogSource`] and parses each dataset at most once.
//! Concurrent first callers block on the same load; once populated the
//! records are shared read-only through `Arc`s. A failed load is not cached,
//! so a later call retries against the source.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use log::{debug, info};
use once_cell::sync::OnceCell;

use crate::catalogs::{ConstellationLine, StarRecord};
use crate::data::CatalogSource;
use crate::{CatalogError, Result};

/// Cached catalogue of stars and constellation figures.
pub struct Catalog<S: CatalogSource> {
    source: S,
    stars: OnceCell<Arc<Vec<StarRecord>>>,
    lines: OnceCell<Arc<Vec<ConstellationLine>>>,
    /// Number of successful reads issued to the source
    loads: AtomicUsize,
}

impl<S: CatalogSource> Catalog<S> {
    /// Create an empty catalogue; nothing is read until first use
    pub fn new(source: S) -> Self {
        Self {
            source,
            stars: OnceCell::new(),
            lines: OnceCell::new(),
            loads: AtomicUsize::new(0),
        }
    }

    /// The backing source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// All star records, loading them on first call.
    ///
    /// Repeated calls return the same `Arc`.
    pub fn load_stars(&self) -> Result<Arc<Vec<StarRecord>>> {
        self.stars
            .get_or_try_init(|| {
                let stars = self.source.load_stars()?;
                self.loads.fetch_add(1, Ordering::SeqCst);
                info!(
                    "Loaded {} stars from {} catalogue",
                    stars.len(),
                    self.source.name()
                );
                Ok::<_, CatalogError>(Arc::new(stars))
            })
            .cloned()
    }

    /// All constellation figures, loading them on first call.
    pub fn load_constellation_lines(&self) -> Result<Arc<Vec<ConstellationLine>>> {
        self.lines
            .get_or_try_init(|| {
                let lines = self.source.load_constellation_lines()?;
                self.loads.fetch_add(1, Ordering::SeqCst);
                info!(
                    "Loaded {} constellation figures from {} catalogue",
                    lines.len(),
                    self.source.name()
                );
                Ok::<_, CatalogError>(Arc::new(lines))
            })
            .cloned()
    }

    /// Whether both datasets have been loaded
    pub fn is_loaded(&self) -> bool {
        self.stars.get().is_some() && self.lines.get().is_some()
    }

    /// Number of successful dataset reads performed so far
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    /// Drop cached data so the next call reads the source again
    pub fn invalidate(&mut self) {
        debug!("Invalidating {} catalogue cache", self.source.name());
        self.stars = OnceCell::new();
        self.lines = OnceCell::new();
    }
}
