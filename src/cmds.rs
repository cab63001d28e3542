use serde::Deserialize;

use crate::dialog::Navigation;

/// Actions a key can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cmd {
    OpenDialog,
    Exit,
    NextDay,
    PrevDay,
    NextWeek,
    PrevWeek,
    NextMonth,
    PrevMonth,
    NextYear,
    PrevYear,
    Today,
    ToggleYearView,
    Confirm,
    Cancel,
    CommandMode,
}

impl Cmd {
    /// The cursor movement this command stands for in the month view.
    pub fn navigation(&self) -> Option<Navigation> {
        match self {
            Cmd::NextDay => Some(Navigation::Days(1)),
            Cmd::PrevDay => Some(Navigation::Days(-1)),
            Cmd::NextWeek => Some(Navigation::Weeks(1)),
            Cmd::PrevWeek => Some(Navigation::Weeks(-1)),
            Cmd::NextMonth => Some(Navigation::Months(1)),
            Cmd::PrevMonth => Some(Navigation::Months(-1)),
            Cmd::NextYear => Some(Navigation::Years(1)),
            Cmd::PrevYear => Some(Navigation::Years(-1)),
            _ => None,
        }
    }
}
