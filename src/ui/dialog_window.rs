use unsegen::base::*;
use unsegen::widget::*;

use super::month_pane::MonthPane;
use super::year_pane::YearPane;
use super::Theme;
use crate::date::CalendarDate;
use crate::dialog::{DialogSession, PickerView, MIN_COLUMNS, MIN_ROWS};

/// The framed date selection dialog.
///
/// Rows from top to bottom: padding, title, selected date, separator,
/// month caption, pane (weekday header and day grid, or year list),
/// separator, buttons, padding.
pub struct DialogWindow<'a> {
    session: &'a DialogSession,
    theme: &'a Theme,
    today: CalendarDate,
}

const PADDING: usize = 1;
const PANE_ROW: usize = 5;
const PANE_ROWS: usize = MonthPane::HEADER_ROWS + MonthPane::ROWS;

impl<'a> DialogWindow<'a> {
    pub fn new(session: &'a DialogSession, theme: &'a Theme, today: CalendarDate) -> Self {
        DialogWindow {
            session,
            theme,
            today,
        }
    }

    /// "2017  Mon, Dec 4"
    pub fn date_caption(&self) -> String {
        let cursor = self.session.cursor();
        format!(
            "{}  {}, {} {}",
            cursor.year(),
            cursor.weekday(),
            &cursor.month_name()[..3],
            cursor.day()
        )
    }

    pub fn month_caption(&self) -> String {
        match self.session.view() {
            PickerView::MonthAndDay => {
                let month = self.session.displayed_month();
                format!("< {} {} >", month.name(), month.year())
            }
            PickerView::Year => "Select year".to_owned(),
        }
    }

    pub fn buttons(&self) -> String {
        let options = self.session.options();
        format!("[{}]  [{}]", options.cancel_text, options.ok_text)
    }

    fn line(&self, cursor: &mut Cursor, text: &str, style: StyleModifier, inner_width: usize) {
        cursor.set_style_modifier(self.theme.dialog_style);
        cursor.write(&" ".repeat(PADDING));
        cursor.apply_style_modifier(style);
        cursor.write(&format!("{:^width$}", text, width = inner_width));
        cursor.set_style_modifier(self.theme.dialog_style);
        cursor.fill_and_wrap_line();
    }

    fn blank(&self, cursor: &mut Cursor) {
        cursor.set_style_modifier(self.theme.dialog_style);
        cursor.fill_and_wrap_line();
    }
}

impl Widget for DialogWindow<'_> {
    fn space_demand(&self) -> Demand2D {
        Demand2D {
            width: ColDemand::exact(MIN_COLUMNS),
            height: RowDemand::exact(MIN_ROWS),
        }
    }

    fn draw(&self, mut window: Window, hints: RenderingHints) {
        let width = window.get_width().raw_value().max(0) as usize;
        let inner_width = width.saturating_sub(2 * PADDING);
        let separator = "─".repeat(inner_width);

        {
            let mut cursor = Cursor::new(&mut window);
            self.blank(&mut cursor);
            self.line(&mut cursor, &self.session.title(), self.theme.title_style, inner_width);
            self.line(&mut cursor, &self.date_caption(), self.theme.header_style, inner_width);
            self.line(&mut cursor, &separator, StyleModifier::new(), inner_width);
            self.line(
                &mut cursor,
                &self.month_caption(),
                self.theme.month_header_style,
                inner_width,
            );
            for _ in 0..PANE_ROWS {
                self.blank(&mut cursor);
            }
            self.line(&mut cursor, &separator, StyleModifier::new(), inner_width);

            cursor.set_style_modifier(self.theme.dialog_style);
            let buttons = self.buttons();
            cursor.write(&format!(
                "{:>width$}",
                "",
                width = (width.saturating_sub(buttons.chars().count() + PADDING))
            ));
            cursor.apply_style_modifier(self.theme.button_style);
            cursor.write(&buttons);
            cursor.set_style_modifier(self.theme.dialog_style);
            cursor.fill_and_wrap_line();
            self.blank(&mut cursor);
        }

        let pane_window = window.create_subwindow(
            ColIndex::new(PADDING as i32)..ColIndex::new((PADDING + inner_width) as i32),
            RowIndex::new(PANE_ROW as i32)..RowIndex::new((PANE_ROW + PANE_ROWS) as i32),
        );
        match self.session.view() {
            PickerView::MonthAndDay => {
                MonthPane::new(self.session, self.theme, self.today).draw(pane_window, hints)
            }
            PickerView::Year => YearPane::new(self.session, self.theme).draw(pane_window, hints),
        }
    }
}

/// Places a `MIN_COLUMNS`x`MIN_ROWS` dialog in the middle of `window`.
pub fn centered<'w>(window: &'w mut Window) -> Window<'w> {
    let width = window.get_width().raw_value().max(0) as usize;
    let height = window.get_height().raw_value().max(0) as usize;
    let x = width.saturating_sub(MIN_COLUMNS) / 2;
    let y = height.saturating_sub(MIN_ROWS) / 2;

    window.create_subwindow(
        ColIndex::new(x as i32)..ColIndex::new((x + MIN_COLUMNS).min(width) as i32),
        RowIndex::new(y as i32)..RowIndex::new((y + MIN_ROWS).min(height) as i32),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialog::{DateSelectionDialog, DialogOptions};

    #[test]
    fn captions_follow_the_cursor() {
        let theme = Theme::default();
        let mut session = DateSelectionDialog::default()
            .open(&(80usize, 24usize), 2017, 11, 4, |_| {})
            .unwrap();
        let today = CalendarDate::new(2017, 11, 4).unwrap();

        {
            let window = DialogWindow::new(&session, &theme, today);
            assert_eq!(window.date_caption(), "2017  Mon, Dec 4");
            assert_eq!(window.month_caption(), "< December 2017 >");
            assert_eq!(window.buttons(), "[Cancel]  [OK]");
        }

        session.toggle_view().unwrap();
        let window = DialogWindow::new(&session, &theme, today);
        assert_eq!(window.month_caption(), "Select year");
    }

    #[test]
    fn buttons_use_configured_labels() {
        let theme = Theme::default();
        let options = DialogOptions {
            ok_text: "Done".to_owned(),
            cancel_text: "Back".to_owned(),
            ..DialogOptions::default()
        };
        let session = DateSelectionDialog::new(options)
            .open(&(80usize, 24usize), 2020, 11, 25, |_| {})
            .unwrap();
        let today = CalendarDate::new(2020, 11, 25).unwrap();

        assert_eq!(
            DialogWindow::new(&session, &theme, today).buttons(),
            "[Back]  [Done]"
        );
    }
}
