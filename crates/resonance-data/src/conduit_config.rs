//! Resolution of `conduit.*` files into a validated [`ConduitConfig`].

use std::path::Path;

use resonance_conduit::ConduitConfig;
use resonance_core::fixed::{Bps, f64_to_bps};

use crate::loader::{DataLoadError, deserialize_file};
use crate::schema::ConduitConfigData;

fn ratio(path: &Path, field: &'static str, value: f64) -> Result<Bps, DataLoadError> {
    f64_to_bps(value).ok_or_else(|| DataLoadError::BadRatio {
        file: path.to_path_buf(),
        field,
        value,
    })
}

/// Convert decimal ratios to basis points and validate every range.
/// `path` is only used for error messages.
pub fn resolve_conduit_config(
    data: &ConduitConfigData,
    path: &Path,
) -> Result<ConduitConfig, DataLoadError> {
    let config = ConduitConfig {
        base_transfer_rate: data.transfer_rate,
        refresh_interval: data.network_update_interval,
        connection_refresh_interval: data.connection_refresh_interval,
        max_network_size: data.max_network_size,
        distance_penalty: ratio(path, "distance_penalty", data.distance_penalty)?,
        min_multiplier: ratio(path, "min_multiplier", data.min_multiplier)?,
    };
    config.validate().map_err(|source| DataLoadError::Invalid {
        file: path.to_path_buf(),
        source,
    })?;
    Ok(config)
}

/// Read, resolve, and validate a conduit config file.
pub fn load_conduit_config(path: &Path) -> Result<ConduitConfig, DataLoadError> {
    let data: ConduitConfigData = deserialize_file(path)?;
    let config = resolve_conduit_config(&data, path)?;
    tracing::debug!(file = %path.display(), ?config, "conduit config loaded");
    Ok(config)
}
