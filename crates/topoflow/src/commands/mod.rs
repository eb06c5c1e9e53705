pub mod deploy;
pub mod synth;
pub mod validate;

use std::path::Path;
use topoflow::DeployError;
use topoflow_config::Settings;

/// Settings from `--config`, the environment or the usual locations
pub fn load_settings(explicit: Option<&Path>) -> Result<Settings, DeployError> {
    Ok(topoflow_config::load_settings(explicit)?)
}
