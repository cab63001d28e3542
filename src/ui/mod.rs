pub mod app;
pub mod command;
mod context;
mod dialog_window;
mod month_pane;
mod toast;
mod year_pane;

pub use app::{App, TerminalSurface};
pub use context::{Context, Mode, Theme};
pub use dialog_window::DialogWindow;
pub use month_pane::MonthPane;
pub use toast::{Toast, ToastKind};
pub use year_pane::YearPane;
