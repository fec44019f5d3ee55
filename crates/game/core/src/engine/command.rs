use crate::session::{DrinkAction, EquipAction, JoinAction, LeaveAction};
use crate::state::{SeekerId, SlotId};

/// Every command a caller can submit against a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum SessionCommand {
    Join(JoinAction),
    Leave(LeaveAction),
    Equip(EquipAction),
    Drink(DrinkAction),
}

impl SessionCommand {
    pub fn seeker(&self) -> SeekerId {
        match self {
            Self::Join(action) => action.seeker,
            Self::Leave(action) => action.seeker,
            Self::Equip(action) => action.seeker,
            Self::Drink(action) => action.seeker,
        }
    }

    pub fn slot(&self) -> SlotId {
        match self {
            Self::Join(action) => action.slot,
            Self::Leave(action) => action.slot,
            Self::Equip(action) => action.slot,
            Self::Drink(action) => action.slot,
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}
