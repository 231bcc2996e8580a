//! Game states, features and labels for action-value models

pub mod features;
pub mod gamestates;
pub mod labels;

use crate::config::VaepConfig;
use crate::error::ArpadlError;
use crate::schema::Action;
use polars::prelude::*;
use tracing::info;

/// Feature table of a canonical log: game states of `nb_prev_actions`,
/// oriented to the focal team, through every default transformer.
pub fn features_for(actions: &[Action], config: &VaepConfig) -> Result<DataFrame, ArpadlError> {
    let states = gamestates::gamestates(actions, config.nb_prev_actions)?;
    let states = gamestates::play_left_to_right(&states);
    let df = features::compute_features(&states, &features::default_transformers())?;
    info!("Computed {} feature columns for {} actions", df.width(), df.height());
    Ok(df)
}

/// Label table of a canonical log over a horizon of `nr_actions`.
pub fn labels_for(actions: &[Action], config: &VaepConfig) -> Result<DataFrame, ArpadlError> {
    let mut columns = labels::scores(actions, config.nr_actions)?.get_columns().to_vec();
    columns.extend_from_slice(labels::concedes(actions, config.nr_actions)?.get_columns());
    columns.extend_from_slice(labels::goal_from_shot(actions)?.get_columns());
    Ok(DataFrame::new(columns)?)
}
