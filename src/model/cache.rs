use std::collections::HashMap;
use std::sync::Arc;

use crate::dsp::curve::{build_curve, CurveParams, TransferCurve};
use crate::error::ConfigError;

/*
Shared Transfer-Curve Cache
===========================

Twenty-five amp models, most with two or three saturation stages, and many
of those stages configured identically — synthesizing a fresh 2048-point
table per stage wastes both build time and memory, and worse, invites the
"duplicate table" class of bug where two stages that should sound the same
drift apart after a partial edit.

Curve building is deterministic (equal params → bit-identical tables), so
the table is fully described by its parameters. The cache is keyed on
(params, resolution) and hands out `Arc<TransferCurve>`: stages share one
read-only allocation, and a table lives exactly as long as some stage
still holds it.

Build-time only. Stages grab their Arc while the model is constructed;
the realtime path only ever reads through an Arc it already owns.
*/

#[derive(PartialEq, Eq, Hash)]
struct CacheKey {
    params: CurveParams,
    resolution: usize,
}

/// Content-addressed store of synthesized curves.
#[derive(Default)]
pub struct CurveCache {
    entries: HashMap<CacheKey, Arc<TransferCurve>>,
}

impl CurveCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the curve for `params`, synthesizing it on first request.
    ///
    /// Invalid params return the synthesis error and leave the cache
    /// untouched.
    pub fn get_or_build(
        &mut self,
        params: &CurveParams,
        resolution: usize,
    ) -> Result<Arc<TransferCurve>, ConfigError> {
        let key = CacheKey {
            params: params.clone(),
            resolution,
        };

        if let Some(curve) = self.entries.get(&key) {
            return Ok(Arc::clone(curve));
        }

        log::debug!("curve cache miss: synthesizing {resolution}-point table");
        let curve = Arc::new(build_curve(params, resolution)?);
        self.entries.insert(key, Arc::clone(&curve));
        Ok(curve)
    }

    /// Number of distinct curves currently cached.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every cached table; outstanding `Arc`s keep theirs alive.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
