use hanabi_bot::{HatFeatures, Table};
use thiserror::Error;

use crate::config::{AgentConfig, AgentKind};

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("invalid hat parameter for agent '{name}': {message}")]
    InvalidHatParam { name: String, message: String },
}

/// A validated agent, ready to seat a table for every game.
pub(super) struct AgentBlueprint {
    pub(super) name: String,
    implementation: AgentImplementation,
}

enum AgentImplementation {
    Hat(HatFeatures),
}

impl AgentBlueprint {
    pub(super) fn from_configs(
        configs: &[AgentConfig],
        defaults: HatFeatures,
    ) -> Result<Vec<Self>, AgentError> {
        configs
            .iter()
            .map(|config| Self::from_config(config, defaults))
            .collect()
    }

    fn from_config(config: &AgentConfig, defaults: HatFeatures) -> Result<Self, AgentError> {
        let implementation = match config.kind {
            AgentKind::Hat => {
                AgentImplementation::Hat(hat_features(&config.name, &config.params, defaults)?)
            }
        };

        Ok(Self {
            name: config.name.clone(),
            implementation,
        })
    }

    pub(super) fn spawn_table(&self, players: usize) -> Table {
        match &self.implementation {
            AgentImplementation::Hat(features) => Table::hat(players, *features),
        }
    }
}

/// Params override the environment-derived defaults key by key.
fn hat_features(
    name: &str,
    params: &serde_yaml::Value,
    defaults: HatFeatures,
) -> Result<HatFeatures, AgentError> {
    if params.is_null() {
        return Ok(defaults);
    }

    let mapping = params
        .as_mapping()
        .ok_or_else(|| AgentError::InvalidHatParam {
            name: name.to_string(),
            message: "expected mapping for hat params".to_string(),
        })?;

    let mut features = defaults;
    for (key, value) in mapping {
        let Some(key) = key.as_str() else {
            continue;
        };
        let flag = || {
            value.as_bool().ok_or_else(|| AgentError::InvalidHatParam {
                name: name.to_string(),
                message: format!("{key} must be a boolean"),
            })
        };
        match key {
            "modified_action" => features = features.with_modified_action(flag()?),
            "verbose" => features = features.with_verbose(flag()?),
            _ => {}
        }
    }

    Ok(features)
}
