use std::fmt::Display;

use chrono::Weekday;
use unsegen::base::*;
use unsegen::widget::*;

use super::Theme;
use crate::date::{CalendarDate, DAYS_PER_WEEK};
use crate::dialog::DialogSession;

pub struct DayCell<'a> {
    day_num: u32,
    selected: bool,
    is_today: bool,
    theme: &'a Theme,
}

impl<'a> DayCell<'a> {
    pub const CELL_WIDTH: usize = 4;

    fn new(day_num: u32, theme: &'a Theme) -> Self {
        DayCell {
            day_num,
            selected: false,
            is_today: false,
            theme,
        }
    }

    fn select(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    fn today(mut self, is_today: bool) -> Self {
        self.is_today = is_today;
        self
    }
}

impl Display for DayCell<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let arg_today = if self.is_today {
            self.theme.today_day_char.unwrap_or(' ')
        } else {
            ' '
        };

        let arg_focus = if self.selected {
            self.theme.focus_day_char.unwrap_or(' ')
        } else {
            ' '
        };

        write!(f, "{}{}{:>2}", arg_today, arg_focus, self.day_num)
    }
}

/// Weekday header followed by the day grid of the month the session's
/// cursor is in.
pub struct MonthPane<'a> {
    session: &'a DialogSession,
    theme: &'a Theme,
    today: CalendarDate,
}

impl<'a> MonthPane<'a> {
    pub const COLUMNS: usize = DAYS_PER_WEEK as usize;
    pub const ROWS: usize = 6;
    pub const HEADER_ROWS: usize = 1;

    pub fn new(session: &'a DialogSession, theme: &'a Theme, today: CalendarDate) -> Self {
        MonthPane {
            session,
            theme,
            today,
        }
    }

    /// Column headers starting at `first`.
    pub fn header(first: Weekday) -> Vec<Weekday> {
        std::iter::successors(Some(first), |wd| Some(wd.succ()))
            .take(Self::COLUMNS)
            .collect()
    }

    fn day_style(&self, date: CalendarDate) -> StyleModifier {
        if date == self.session.cursor() {
            self.theme.focus_day_style
        } else if !self.session.is_selectable(&date) {
            self.theme.disabled_day_style
        } else if date == self.today {
            self.theme.today_day_style
        } else if self.session.is_highlighted(&date) {
            self.theme.highlight_day_style
        } else {
            self.theme.day_style
        }
    }
}

impl Widget for MonthPane<'_> {
    fn space_demand(&self) -> Demand2D {
        Demand2D {
            width: ColDemand::exact(Self::COLUMNS * DayCell::CELL_WIDTH),
            height: RowDemand::exact(Self::HEADER_ROWS + Self::ROWS),
        }
    }

    fn draw(&self, mut window: Window, _hints: RenderingHints) {
        let theme = self.theme;
        let month = self.session.displayed_month();
        let first_day = self.session.options().first_day_of_week;

        let mut cursor = Cursor::new(&mut window);
        cursor.set_style_modifier(theme.dialog_style);
        cursor.apply_style_modifier(theme.weekday_style);

        for wd in Self::header(first_day) {
            cursor.write(&format!(
                "{:>width$}",
                wd.to_string(),
                width = DayCell::CELL_WIDTH
            ));
        }
        cursor.set_style_modifier(theme.dialog_style);
        cursor.fill_and_wrap_line();

        let offset = month.leading_days(first_day) as usize;
        cursor.write(&" ".repeat(offset * DayCell::CELL_WIDTH));

        for (idx, day) in (1..=month.num_days()).enumerate() {
            let date = match CalendarDate::new(month.year(), month.month(), day) {
                Ok(date) => date,
                Err(_) => continue,
            };
            let cell = DayCell::new(day, theme)
                .select(date == self.session.cursor())
                .today(date == self.today);

            cursor.set_style_modifier(theme.dialog_style);
            cursor.apply_style_modifier(self.day_style(date));
            cursor.write(&cell.to_string());

            if (offset + idx + 1) % Self::COLUMNS == 0 {
                cursor.set_style_modifier(theme.dialog_style);
                cursor.fill_and_wrap_line();
            }
        }
        if (offset + month.num_days() as usize) % Self::COLUMNS != 0 {
            cursor.set_style_modifier(theme.dialog_style);
            cursor.fill_and_wrap_line();
        }
    }
}
