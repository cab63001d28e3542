use unsegen::base::*;
use unsegen::widget::*;

use super::month_pane::{DayCell, MonthPane};
use super::Theme;
use crate::dialog::DialogSession;

/// Scrolling list of the selectable years, centered on the cursor's year.
pub struct YearPane<'a> {
    session: &'a DialogSession,
    theme: &'a Theme,
}

impl<'a> YearPane<'a> {
    pub const ROWS: usize = MonthPane::HEADER_ROWS + MonthPane::ROWS;

    pub fn new(session: &'a DialogSession, theme: &'a Theme) -> Self {
        YearPane { session, theme }
    }

    /// The years visible when the cursor is in `year`.
    pub fn visible_years(year: i32, min_year: i32, max_year: i32) -> std::ops::RangeInclusive<i32> {
        let half = (Self::ROWS / 2) as i32;
        let last_start = max_year.saturating_sub(Self::ROWS as i32 - 1).max(min_year);
        let start = year.saturating_sub(half).max(min_year).min(last_start);
        let end = start.saturating_add(Self::ROWS as i32 - 1).min(max_year);
        start..=end
    }
}

impl Widget for YearPane<'_> {
    fn space_demand(&self) -> Demand2D {
        Demand2D {
            width: ColDemand::exact(MonthPane::COLUMNS * DayCell::CELL_WIDTH),
            height: RowDemand::exact(Self::ROWS),
        }
    }

    fn draw(&self, mut window: Window, _hints: RenderingHints) {
        let width = window.get_width().raw_value() as usize;
        let selected = self.session.cursor().year();

        let mut cursor = Cursor::new(&mut window);
        for year in Self::visible_years(selected, self.session.min_year(), self.session.max_year()) {
            cursor.set_style_modifier(self.theme.dialog_style);
            if year == selected {
                cursor.apply_style_modifier(self.theme.focus_day_style);
            }
            cursor.write(&format!("{:^width$}", year, width = width));
            cursor.set_style_modifier(self.theme.dialog_style);
            cursor.fill_and_wrap_line();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centers_on_the_cursor_year() {
        assert_eq!(YearPane::visible_years(2017, 1900, 2100), 2014..=2020);
    }

    #[test]
    fn stays_within_the_year_range() {
        assert_eq!(YearPane::visible_years(1901, 1900, 2100), 1900..=1906);
        assert_eq!(YearPane::visible_years(2100, 1900, 2100), 2094..=2100);
        assert_eq!(YearPane::visible_years(2020, 2019, 2021), 2019..=2021);
    }
}
