use super::{MalformedReason, ReplayError};
use crate::state::{SlotAction, SlotConfig, SlotId, Tick};

/// Checks that `configs` is a log the action log could have produced.
///
/// Ticks must be non-decreasing, the first entry must be an Enter, and
/// Enter/Leave must alternate with Equip and Drink only while occupied. An
/// empty log is valid.
pub fn validate_configs(slot: SlotId, configs: &[SlotConfig]) -> Result<(), ReplayError> {
    let mut occupied = false;
    let mut last: Option<Tick> = None;

    for (index, config) in configs.iter().enumerate() {
        if last.is_some_and(|last| config.tick < last) {
            return Err(ReplayError::malformed(
                slot,
                index,
                MalformedReason::DecreasingTick,
            ));
        }
        last = Some(config.tick);

        match config.action {
            SlotAction::Enter { .. } if occupied => {
                return Err(ReplayError::malformed(
                    slot,
                    index,
                    MalformedReason::EnterWhileOccupied,
                ));
            }
            SlotAction::Enter { .. } => occupied = true,
            _ if !occupied => {
                let reason = if index == 0 {
                    MalformedReason::FirstNotEnter
                } else {
                    MalformedReason::ActionWhileVacant
                };
                return Err(ReplayError::malformed(slot, index, reason));
            }
            SlotAction::Leave => occupied = false,
            SlotAction::Equip { .. } | SlotAction::Drink { .. } => {}
        }
    }
    Ok(())
}
