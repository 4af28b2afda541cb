//! Incremental "show more" loading.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::SourceError;
use crate::models::config::{LayoutConfig, LoadConfig};
use crate::source::{collapse_whitespace, IncrementalSource};

use super::count_structural_units;

/// What the load loop did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOutcome {
    /// Successful control activations.
    pub activations: u32,
    /// Structural units present when the loop ended.
    pub units: usize,
}

/// Index (within `control_selector` matches) of the first visible, enabled
/// control whose text is in the load-more vocabulary.
fn find_control<S: IncrementalSource>(
    source: &S,
    load: &LoadConfig,
) -> Result<Option<usize>, SourceError> {
    let controls = source.query(&load.control_selector)?;
    Ok(controls.iter().position(|control| {
        if !control.is_visible() || !control.is_enabled() {
            return false;
        }
        let text = collapse_whitespace(control.text()).to_lowercase();
        load.control_vocabulary
            .iter()
            .any(|phrase| text.contains(phrase.as_str()))
    }))
}

/// Activate the load-more control until it stops producing rows.
///
/// Ends when no control is left, when the attempt ceiling is reached, or the
/// first time an activation yields no growth within the growth timeout.
pub async fn load_all<S: IncrementalSource>(
    source: &S,
    load: &LoadConfig,
    layout: &LayoutConfig,
) -> Result<LoadOutcome, SourceError> {
    let interval = load.poll_interval().max(Duration::from_millis(1));
    let timeout = load.growth_timeout();

    let mut outcome = LoadOutcome {
        activations: 0,
        units: count_structural_units(source, layout)?,
    };
    let mut total_load_time = Duration::ZERO;

    for attempt in 1..=load.max_attempts {
        let Some(index) = find_control(source, load)? else {
            debug!("No load-more control left");
            break;
        };

        let before = count_structural_units(source, layout)?;
        match source.trigger(&load.control_selector, index).await {
            Ok(true) => outcome.activations += 1,
            Ok(false) => {
                debug!("Source cannot load more rows");
                break;
            }
            Err(e) => {
                warn!("Load-more activation failed: {}", e);
                break;
            }
        }

        let mut waited = Duration::ZERO;
        let mut after = before;
        while waited < timeout {
            source.wait(interval).await;
            waited += interval;
            after = count_structural_units(source, layout)?;
            if after > before {
                break;
            }
        }
        outcome.units = after;

        if after <= before {
            info!(
                "No new rows after {:?}; loading finished after {} activations",
                timeout, outcome.activations
            );
            break;
        }

        total_load_time += waited;
        debug!(
            "Attempt {}: {} -> {} units in {:?} (avg {:?})",
            attempt,
            before,
            after,
            waited,
            total_load_time / outcome.activations
        );
    }

    Ok(outcome)
}
