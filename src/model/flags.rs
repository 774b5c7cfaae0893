//! Bit assignments and the remap tables migrations apply to them.
//!
//! Each table is literal data: a list of `(legacy bit, new bit)` pairs. Bits
//! that don't appear in a table translate to 0.

/// One legacy bit and the bit it becomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitMove {
    pub from: i64,
    pub to: i64,
}

#[derive(Debug, Clone, Copy)]
pub struct BitTable(&'static [BitMove]);

impl BitTable {
    pub const fn new(moves: &'static [BitMove]) -> Self {
        Self(moves)
    }

    /// The new-side bits for every table entry whose legacy bit is set in `flags`.
    pub fn translate(&self, flags: i64) -> i64 {
        self.0
            .iter()
            .filter(|m| flags & m.from != 0)
            .fold(0, |acc, m| acc | m.to)
    }

    /// `flags` with every legacy bit of the table cleared.
    pub fn strip(&self, flags: i64) -> i64 {
        self.0.iter().fold(flags, |acc, m| acc & !m.from)
    }

    pub fn moves(&self) -> &'static [BitMove] {
        self.0
    }
}

/// Version 1: a single flags column shared by the trigger and the action.
pub mod v1 {
    pub const FLAG_LONG_PRESS: i64 = 1;
    pub const FLAG_SHOW_VOLUME_UI: i64 = 2;
    pub const FLAG_VIBRATE: i64 = 4;
}

/// Versions 2–5: the `flags` column of a keymap.
pub mod keymap {
    pub const FLAG_VIBRATE: i64 = 1;
    pub const FLAG_SHOW_PERFORMING_ACTION_TOAST: i64 = 2;
    pub const FLAG_LONG_PRESS_DOUBLE_VIBRATION: i64 = 4;
    pub const FLAG_SCREEN_OFF_TRIGGERS: i64 = 8;
    pub const FLAG_REPEAT_ACTIONS: i64 = 16;
    pub const FLAG_DONT_OVERRIDE_DEFAULT_ACTION: i64 = 32;
}

/// Versions 6–10: `trigger.flags`.
pub mod trigger {
    pub const FLAG_VIBRATE: i64 = 1;
    pub const FLAG_LONG_PRESS_DOUBLE_VIBRATION: i64 = 4;
    pub const FLAG_SCREEN_OFF_TRIGGERS: i64 = 8;
    /// From version 10.
    pub const FLAG_SHOW_TOAST: i64 = 16;
    /// Until version 7, when it moves to the keys.
    pub const FLAG_DONT_OVERRIDE_DEFAULT_ACTION: i64 = 32;
}

/// Versions 7–10: `trigger.keys[].flags`.
pub mod trigger_key {
    pub const FLAG_DO_NOT_CONSUME_KEY_EVENT: i64 = 1;
}

/// Versions 2–10: `action_list[].flags`.
pub mod action {
    pub const FLAG_SHOW_VOLUME_UI: i64 = 1;
    /// Versions 5–9.
    pub const FLAG_SHOW_PERFORMING_ACTION_TOAST: i64 = 2;
    pub const FLAG_REPEAT: i64 = 4;
}

/// 1→2: what survives of the v1 flags on the keymap.
pub const V1_TO_KEYMAP: BitTable = BitTable::new(&[BitMove {
    from: v1::FLAG_VIBRATE,
    to: keymap::FLAG_VIBRATE,
}]);

/// 1→2: what survives of the v1 flags on the action.
pub const V1_TO_ACTION: BitTable = BitTable::new(&[BitMove {
    from: v1::FLAG_SHOW_VOLUME_UI,
    to: action::FLAG_SHOW_VOLUME_UI,
}]);

/// 4→5: keymap bits fanned out to every action.
pub const KEYMAP_TO_ACTION: BitTable = BitTable::new(&[
    BitMove {
        from: keymap::FLAG_SHOW_PERFORMING_ACTION_TOAST,
        to: action::FLAG_SHOW_PERFORMING_ACTION_TOAST,
    },
    BitMove {
        from: keymap::FLAG_REPEAT_ACTIONS,
        to: action::FLAG_REPEAT,
    },
]);

/// 6→7: trigger bits fanned out to every key.
pub const TRIGGER_TO_KEY: BitTable = BitTable::new(&[BitMove {
    from: trigger::FLAG_DONT_OVERRIDE_DEFAULT_ACTION,
    to: trigger_key::FLAG_DO_NOT_CONSUME_KEY_EVENT,
}]);

/// 9→10: action bits gathered onto the trigger.
pub const ACTION_TO_TRIGGER: BitTable = BitTable::new(&[BitMove {
    from: action::FLAG_SHOW_PERFORMING_ACTION_TOAST,
    to: trigger::FLAG_SHOW_TOAST,
}]);

pub fn has_flag(flags: i64, flag: i64) -> bool {
    flags & flag == flag
}
