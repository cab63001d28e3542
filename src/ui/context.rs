use unsegen::base::style::*;
use unsegen::widget::builtin::PromptLine;

use super::Toast;
use crate::date::CalendarDate;
use crate::dialog::SelectionResult;
use crate::registry::DialogRegistry;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Command,
}

#[derive(Clone, Debug)]
pub struct Theme {
    pub dialog_style: StyleModifier,
    pub title_style: StyleModifier,
    pub header_style: StyleModifier,
    pub month_header_style: StyleModifier,
    pub weekday_style: StyleModifier,
    pub day_style: StyleModifier,
    pub focus_day_style: StyleModifier,
    pub focus_day_char: Option<char>,
    pub today_day_style: StyleModifier,
    pub today_day_char: Option<char>,
    pub highlight_day_style: StyleModifier,
    pub disabled_day_style: StyleModifier,
    pub button_style: StyleModifier,
    pub toast_style: StyleModifier,
    pub error_toast_style: StyleModifier,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            dialog_style: StyleModifier::new().bg_color(Color::Black).fg_color(Color::White),
            title_style: StyleModifier::new().bold(true),
            header_style: StyleModifier::new().fg_color(Color::LightCyan),
            month_header_style: StyleModifier::new().fg_color(Color::Yellow),
            weekday_style: StyleModifier::new().fg_color(Color::Yellow),
            day_style: StyleModifier::new(),
            focus_day_style: StyleModifier::new().bg_color(Color::Blue),
            focus_day_char: None,
            today_day_style: StyleModifier::new().italic(true),
            today_day_char: Some('*'),
            highlight_day_style: StyleModifier::new().fg_color(Color::LightGreen),
            disabled_day_style: StyleModifier::new().fg_color(Color::LightBlack),
            button_style: StyleModifier::new().fg_color(Color::LightCyan).bold(true),
            toast_style: StyleModifier::new().invert(true),
            error_toast_style: StyleModifier::new().fg_color(Color::LightRed),
        }
    }
}

pub struct Context {
    pub mode: Mode,
    pub theme: Theme,
    pub command_line: PromptLine,
    pub dialogs: DialogRegistry,
    pub toast: Option<Toast>,
    pub last_result: Option<SelectionResult>,
    today: CalendarDate,
}

impl Default for Context {
    fn default() -> Self {
        Context {
            mode: Mode::Normal,
            theme: Theme::default(),
            command_line: PromptLine::with_prompt(":".to_owned()),
            dialogs: DialogRegistry::new(),
            toast: None,
            last_result: None,
            today: CalendarDate::today(),
        }
    }
}

impl Context {
    pub fn today(&self) -> CalendarDate {
        self.today
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn update(&mut self) {
        self.today = CalendarDate::today();

        if self.toast.as_ref().map_or(false, Toast::is_expired) {
            self.toast = None;
        }
    }
}
