//! Edit limits and options, loaded once at startup.

pub mod store;

use std::collections::BTreeSet;
use std::path::Path;

use crate::core::error::Error;
use crate::core::types::Result;
pub use store::ConfigStore;

/// Smallest history size accepted from configuration
pub const MIN_HISTORY_SIZE: usize = 15;

/// Block ids refused in user supplied patterns unless configured otherwise
pub const DEFAULT_DISALLOWED_BLOCKS: &[u16] = &[
    6, 7, 14, 15, 16, 26, 27, 28, 29, 31, 32, 33, 34, 36, 37, 38, 39, 40, 46, 50, 51, 54, 55, 56,
    59, 69, 73, 75, 76, 77, 81, 83,
];

/// Recognised options. Integer limits use `-1` for unlimited.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditConfig {
    pub max_change_limit: i64,
    pub default_change_limit: i64,
    pub max_radius: i64,
    pub max_super_pickaxe_size: i64,
    pub max_brush_radius: i64,
    pub default_max_polygonal_points: i64,
    pub max_polygonal_points: i64,
    pub default_max_polyhedron_points: i64,
    pub max_polyhedron_points: i64,
    pub use_inventory: bool,
    pub no_double_slash: bool,
    pub history_size: usize,
    pub disallowed_blocks: BTreeSet<u16>,
    pub profile: bool,
    /// Worlds opened with this config are segmented into 16-high cubes
    pub cubic_chunks: bool,
}

impl Default for EditConfig {
    fn default() -> Self {
        Self {
            max_change_limit: -1,
            default_change_limit: -1,
            max_radius: -1,
            max_super_pickaxe_size: 5,
            max_brush_radius: 6,
            default_max_polygonal_points: -1,
            max_polygonal_points: 20,
            default_max_polyhedron_points: -1,
            max_polyhedron_points: 20,
            use_inventory: false,
            no_double_slash: false,
            history_size: MIN_HISTORY_SIZE,
            disallowed_blocks: DEFAULT_DISALLOWED_BLOCKS.iter().copied().collect(),
            profile: false,
            cubic_chunks: false,
        }
    }
}

/// `-1` (or any negative) means unlimited
fn limit(value: i64) -> Option<usize> {
    usize::try_from(value).ok()
}

/// Lower of a configured default and maximum, either of which may be unlimited
fn clamp_limit(default: i64, max: i64) -> Option<usize> {
    match (limit(default), limit(max)) {
        (Some(d), Some(m)) => Some(d.min(m)),
        (d, m) => d.or(m),
    }
}

impl EditConfig {
    /// Load from a JSON file and write the completed store back.
    ///
    /// A missing file yields the defaults. Failing to write back is logged only.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let mut store = ConfigStore::open(path.as_ref())?;
        let config = Self::from_store(&mut store);
        if let Err(e) = store.save() {
            log::warn!("Failed to write configuration to {}: {}", store.path().display(), e);
        }
        log::info!("Loaded configuration from {}", store.path().display());
        Ok(config)
    }

    /// Read every option, filling the store with defaults where needed
    pub fn from_store(store: &mut ConfigStore) -> Self {
        let d = Self::default();
        let default_disallowed: Vec<u16> = d.disallowed_blocks.iter().copied().collect();
        let history = store.get_int("history-size", d.history_size as i64);
        Self {
            profile: store.get_bool("profile", d.profile),
            disallowed_blocks: store.get_int_set("disallowed-blocks", &default_disallowed),
            default_change_limit: store.get_int("default-max-changed-blocks", d.default_change_limit),
            max_change_limit: store.get_int("max-changed-blocks", d.max_change_limit),
            default_max_polygonal_points: store
                .get_int("default-max-polygon-points", d.default_max_polygonal_points),
            max_polygonal_points: store.get_int("max-polygon-points", d.max_polygonal_points),
            default_max_polyhedron_points: store
                .get_int("default-max-polyhedron-points", d.default_max_polyhedron_points),
            max_polyhedron_points: store.get_int("max-polyhedron-points", d.max_polyhedron_points),
            max_radius: store.get_int("max-radius", d.max_radius),
            max_super_pickaxe_size: store.get_int("max-super-pickaxe-size", d.max_super_pickaxe_size),
            max_brush_radius: store.get_int("max-brush-radius", d.max_brush_radius),
            no_double_slash: store.get_bool("no-double-slash", d.no_double_slash),
            use_inventory: store.get_bool("use-inventory", d.use_inventory),
            history_size: usize::try_from(history).unwrap_or(0).max(MIN_HISTORY_SIZE),
            cubic_chunks: store.get_bool("cubic-chunks", d.cubic_chunks),
        }
    }

    /// Change limit for new sessions, capped by the maximum
    pub fn default_change_limit(&self) -> Option<usize> {
        clamp_limit(self.default_change_limit, self.max_change_limit)
    }

    pub fn max_change_limit(&self) -> Option<usize> {
        limit(self.max_change_limit)
    }

    /// Vertex limit for new polygon selections
    pub fn polygon_point_limit(&self) -> Option<usize> {
        clamp_limit(self.default_max_polygonal_points, self.max_polygonal_points)
    }

    /// Vertex limit for new polyhedron selections
    pub fn polyhedron_point_limit(&self) -> Option<usize> {
        clamp_limit(self.default_max_polyhedron_points, self.max_polyhedron_points)
    }

    /// Reject a requested change limit above the configured maximum
    pub fn check_change_limit(&self, requested: Option<usize>) -> Result<()> {
        let Some(max) = self.max_change_limit() else {
            return Ok(());
        };
        match requested {
            Some(value) if value <= max => Ok(()),
            _ => Err(Error::LimitExceeded {
                what: "change limit",
                value: requested.map_or(-1, |v| v as i64),
                max: max as i64,
            }),
        }
    }

    pub fn check_radius(&self, radius: f64) -> Result<()> {
        check_max("radius", radius, self.max_radius)
    }

    pub fn check_brush_radius(&self, radius: f64) -> Result<()> {
        check_max("brush radius", radius, self.max_brush_radius)
    }

    pub fn check_super_pickaxe_size(&self, range: u32) -> Result<()> {
        check_max("super pickaxe range", f64::from(range), self.max_super_pickaxe_size)
    }

    pub fn check_block_allowed(&self, id: u16) -> Result<()> {
        if self.disallowed_blocks.contains(&id) {
            return Err(Error::DisallowedBlock(id));
        }
        Ok(())
    }
}

fn check_max(what: &'static str, value: f64, max: i64) -> Result<()> {
    if max >= 0 && value > max as f64 {
        return Err(Error::LimitExceeded {
            what,
            value: value.ceil() as i64,
            max,
        });
    }
    Ok(())
}
