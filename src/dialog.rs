//! The date selection dialog and the session state of one presentation.
//!
//! A [`DialogSession`] is either open, holding the cursor the user moves
//! around, or closed with a [`SelectionResult`]. Closing invokes the result
//! callback handed to [`DateSelectionDialog::open`]; that happens exactly
//! once per session, dropping an open session counts as cancelling it.

use chrono::Weekday;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::mpsc;

use crate::date::{CalendarDate, MonthIndex, RawDate};
use crate::error::{Error, ErrorKind, Result};
use crate::limiter::{DateRangeLimiter, DefaultDateRangeLimiter};

/// Columns a surface needs to display a dialog.
pub const MIN_COLUMNS: usize = 30;
/// Rows a surface needs to display a dialog.
pub const MIN_ROWS: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionResult {
    Selected(CalendarDate),
    Cancelled,
}

impl SelectionResult {
    pub fn date(&self) -> Option<CalendarDate> {
        match self {
            SelectionResult::Selected(date) => Some(*date),
            SelectionResult::Cancelled => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Open(CalendarDate),
    Closed(SelectionResult),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerView {
    MonthAndDay,
    Year,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Days(i64),
    Weeks(i64),
    Months(i32),
    Years(i32),
}

/// Anything a dialog can be displayed on.
pub trait Surface {
    /// Available `(columns, rows)`.
    fn size(&self) -> (usize, usize);
}

impl Surface for (usize, usize) {
    fn size(&self) -> (usize, usize) {
        *self
    }
}

pub type ResultCallback = Box<dyn FnOnce(SelectionResult)>;

pub struct DialogOptions {
    pub title: Option<String>,
    pub ok_text: String,
    pub cancel_text: String,
    pub first_day_of_week: Weekday,
    pub auto_dismiss: bool,
    pub show_year_picker_first: bool,
    pub highlighted_days: BTreeSet<CalendarDate>,
    pub limiter: Box<dyn DateRangeLimiter>,
}

impl Default for DialogOptions {
    fn default() -> Self {
        DialogOptions {
            title: None,
            ok_text: "OK".to_owned(),
            cancel_text: "Cancel".to_owned(),
            first_day_of_week: Weekday::Mon,
            auto_dismiss: false,
            show_year_picker_first: false,
            highlighted_days: BTreeSet::new(),
            limiter: Box::new(DefaultDateRangeLimiter::default()),
        }
    }
}

impl fmt::Debug for DialogOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialogOptions")
            .field("title", &self.title)
            .field("ok_text", &self.ok_text)
            .field("cancel_text", &self.cancel_text)
            .field("first_day_of_week", &self.first_day_of_week)
            .field("auto_dismiss", &self.auto_dismiss)
            .field("show_year_picker_first", &self.show_year_picker_first)
            .field("highlighted_days", &self.highlighted_days)
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct DateSelectionDialog {
    options: DialogOptions,
}

impl DateSelectionDialog {
    pub fn new(options: DialogOptions) -> Self {
        DateSelectionDialog { options }
    }

    /// Validates `(year, month, day)` (0-based month) and opens a session on
    /// it. Nothing is shown and `on_result` is never called if this fails.
    pub fn open<S, F>(
        self,
        surface: &S,
        year: i32,
        month: u32,
        day: u32,
        on_result: F,
    ) -> Result<DialogSession>
    where
        S: Surface + ?Sized,
        F: FnOnce(SelectionResult) + 'static,
    {
        let initial = RawDate::new(year, month, day).to_date()?;
        self.open_date(surface, initial, on_result)
    }

    pub fn open_date<S, F>(
        self,
        surface: &S,
        initial: CalendarDate,
        on_result: F,
    ) -> Result<DialogSession>
    where
        S: Surface + ?Sized,
        F: FnOnce(SelectionResult) + 'static,
    {
        let (columns, rows) = surface.size();
        if columns < MIN_COLUMNS || rows < MIN_ROWS {
            return Err(Error::new(
                ErrorKind::RenderFailure,
                &format!(
                    "{}x{} cells available, {}x{} required",
                    columns, rows, MIN_COLUMNS, MIN_ROWS
                ),
            ));
        }

        let cursor = self.options.limiter.set_to_nearest_date(initial);
        if cursor != initial {
            log::debug!("Initial date {} not selectable, starting at {}", initial, cursor);
        }

        let view = if self.options.show_year_picker_first {
            PickerView::Year
        } else {
            PickerView::MonthAndDay
        };

        log::debug!("Opening date selection dialog at {}", cursor);

        Ok(DialogSession {
            initial,
            cursor,
            view,
            closed: None,
            options: self.options,
            on_result: Some(Box::new(on_result)),
        })
    }

    /// Like [`open`](Self::open), but delivers the result through a channel.
    pub fn open_with_channel<S: Surface + ?Sized>(
        self,
        surface: &S,
        year: i32,
        month: u32,
        day: u32,
    ) -> Result<(DialogSession, mpsc::Receiver<SelectionResult>)> {
        let (tx, rx) = mpsc::channel();
        let session = self.open(surface, year, month, day, move |result| {
            if tx.send(result).is_err() {
                log::warn!("Receiver of dialog result is gone");
            }
        })?;
        Ok((session, rx))
    }
}

pub struct DialogSession {
    initial: CalendarDate,
    cursor: CalendarDate,
    view: PickerView,
    closed: Option<SelectionResult>,
    options: DialogOptions,
    on_result: Option<ResultCallback>,
}

impl DialogSession {
    pub fn initial(&self) -> CalendarDate {
        self.initial
    }

    pub fn cursor(&self) -> CalendarDate {
        self.cursor
    }

    pub fn view(&self) -> PickerView {
        self.view
    }

    pub fn options(&self) -> &DialogOptions {
        &self.options
    }

    pub fn state(&self) -> SessionState {
        match self.closed {
            Some(result) => SessionState::Closed(result),
            None => SessionState::Open(self.cursor),
        }
    }

    pub fn is_open(&self) -> bool {
        self.closed.is_none()
    }

    /// The configured title or the cursor's weekday in upper case.
    pub fn title(&self) -> String {
        match &self.options.title {
            Some(title) => title.to_uppercase(),
            None => weekday_name(self.cursor.weekday()).to_uppercase(),
        }
    }

    pub fn displayed_month(&self) -> MonthIndex {
        MonthIndex::of(&self.cursor)
    }

    pub fn is_selectable(&self, date: &CalendarDate) -> bool {
        !self.options.limiter.is_out_of_range(date)
    }

    pub fn is_highlighted(&self, date: &CalendarDate) -> bool {
        self.options.highlighted_days.contains(date)
    }

    pub fn min_year(&self) -> i32 {
        self.options.limiter.min_year()
    }

    pub fn max_year(&self) -> i32 {
        self.options.limiter.max_year()
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_open() {
            Ok(())
        } else {
            Err(ErrorKind::SessionClosed.into())
        }
    }

    fn move_cursor(&mut self, target: Option<CalendarDate>) {
        match target {
            Some(date) => {
                self.cursor = self.options.limiter.set_to_nearest_date(date);
                log::trace!("Cursor moved to {}", self.cursor);
            }
            None => log::debug!("Cursor cannot move beyond {}", self.cursor),
        }
    }

    /// Day and week steps onto an unselectable date keep going in the
    /// direction of travel.
    fn step_cursor(&mut self, days: Option<i64>) {
        let target = days.and_then(|days| Some((days, self.cursor.add_days(days)?)));
        match target {
            Some((days, date)) => {
                self.cursor = self.options.limiter.set_to_next_date(date, days >= 0);
                log::trace!("Cursor moved to {}", self.cursor);
            }
            None => log::debug!("Cursor cannot move beyond {}", self.cursor),
        }
    }

    pub fn navigate(&mut self, navigation: Navigation) -> Result<()> {
        self.ensure_open()?;

        match navigation {
            Navigation::Days(days) => self.step_cursor(Some(days)),
            Navigation::Weeks(weeks) => self.step_cursor(weeks.checked_mul(7)),
            Navigation::Months(months) => self.move_cursor(self.cursor.add_months(months)),
            Navigation::Years(years) => self.move_cursor(self.cursor.add_years(years)),
        }
        Ok(())
    }

    pub fn go_to(&mut self, date: CalendarDate) -> Result<()> {
        self.ensure_open()?;
        self.move_cursor(Some(date));
        Ok(())
    }

    pub fn today(&mut self) -> Result<()> {
        self.go_to(CalendarDate::today())
    }

    /// Picks `day` of the displayed month. Confirms right away if the dialog
    /// dismisses automatically.
    pub fn select_day(&mut self, day: u32) -> Result<()> {
        self.ensure_open()?;

        let date = self.cursor.with_day(day)?;
        if !self.is_selectable(&date) {
            return Err(Error::new(
                ErrorKind::OutOfRange,
                &format!("{} cannot be selected", date),
            ));
        }
        self.cursor = date;

        if self.options.auto_dismiss {
            self.confirm()?;
        }
        Ok(())
    }

    pub fn select_month(&mut self, month: u32) -> Result<()> {
        self.ensure_open()?;

        let target = self.cursor.with_month(month).ok_or_else(|| {
            Error::new(
                ErrorKind::InvalidDate,
                &format!("month index {} is not within 0..=11", month),
            )
        })?;
        self.move_cursor(Some(target));
        Ok(())
    }

    /// Moves the cursor into `year` and returns to the month view.
    pub fn select_year(&mut self, year: i32) -> Result<()> {
        self.ensure_open()?;

        if year < self.min_year() || year > self.max_year() {
            return Err(Error::new(
                ErrorKind::OutOfRange,
                &format!(
                    "year {} is not within {}..={}",
                    year,
                    self.min_year(),
                    self.max_year()
                ),
            ));
        }
        self.move_cursor(self.cursor.with_year(year));
        self.view = PickerView::MonthAndDay;
        Ok(())
    }

    pub fn set_view(&mut self, view: PickerView) -> Result<()> {
        self.ensure_open()?;
        self.view = view;
        Ok(())
    }

    pub fn toggle_view(&mut self) -> Result<()> {
        let view = match self.view {
            PickerView::MonthAndDay => PickerView::Year,
            PickerView::Year => PickerView::MonthAndDay,
        };
        self.set_view(view)
    }

    pub fn confirm(&mut self) -> Result<SelectionResult> {
        self.ensure_open()?;
        Ok(self.finish(SelectionResult::Selected(self.cursor)))
    }

    pub fn cancel(&mut self) -> Result<SelectionResult> {
        self.ensure_open()?;
        Ok(self.finish(SelectionResult::Cancelled))
    }

    fn finish(&mut self, result: SelectionResult) -> SelectionResult {
        self.closed = Some(result);
        log::debug!("Date selection dialog closed with {:?}", result);

        if let Some(on_result) = self.on_result.take() {
            on_result(result);
        }
        result
    }
}

impl Drop for DialogSession {
    fn drop(&mut self) {
        if self.is_open() {
            log::debug!("Dialog dropped while open");
            self.finish(SelectionResult::Cancelled);
        }
    }
}

pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    const SCREEN: (usize, usize) = (80, 24);

    fn date(year: i32, month: u32, day: u32) -> CalendarDate {
        CalendarDate::new(year, month, day).unwrap()
    }

    type Results = Rc<RefCell<Vec<SelectionResult>>>;

    fn recorder() -> (Results, impl FnOnce(SelectionResult) + 'static) {
        let results: Results = Rc::new(RefCell::new(Vec::new()));
        let sink = results.clone();
        (results, move |result| sink.borrow_mut().push(result))
    }

    fn open(year: i32, month: u32, day: u32) -> (DialogSession, Results) {
        let (results, cb) = recorder();
        let session = DateSelectionDialog::default()
            .open(&SCREEN, year, month, day, cb)
            .unwrap();
        (session, results)
    }

    #[test]
    fn cursor_starts_at_initial_date() {
        for &(y, m, d) in &[(2017, 11, 4), (2020, 1, 29), (1, 0, 1), (9999, 11, 31)] {
            let (session, results) = open(y, m, d);
            assert_eq!(session.state(), SessionState::Open(date(y, m, d)));
            assert_eq!(session.initial(), date(y, m, d));
            assert_eq!(session.cursor(), date(y, m, d));
            assert_eq!(session.view(), PickerView::MonthAndDay);
            assert!(results.borrow().is_empty());
        }
    }

    #[test]
    fn invalid_initial_date_never_calls_back() {
        let (results, cb) = recorder();
        let err = DateSelectionDialog::default()
            .open(&SCREEN, 2017, 1, 30, cb)
            .err()
            .unwrap();
        assert!(err.is_invalid_date());

        let (results_month, cb) = recorder();
        let err = DateSelectionDialog::default()
            .open(&SCREEN, 2017, 12, 1, cb)
            .err()
            .unwrap();
        assert!(err.is_invalid_date());

        assert!(results.borrow().is_empty());
        assert!(results_month.borrow().is_empty());
    }

    #[test]
    fn too_small_surface_is_a_render_failure() {
        let (results, cb) = recorder();
        let err = DateSelectionDialog::default()
            .open(&(MIN_COLUMNS - 1, MIN_ROWS), 2017, 11, 4, cb)
            .err()
            .unwrap();
        assert!(matches!(err.kind, ErrorKind::RenderFailure));
        assert!(results.borrow().is_empty());
    }

    #[test]
    fn navigate_then_confirm() {
        let (mut session, results) = open(2017, 11, 4);

        session.navigate(Navigation::Days(11)).unwrap();
        assert_eq!(session.cursor(), date(2017, 11, 15));

        assert_eq!(
            session.confirm().unwrap(),
            SelectionResult::Selected(date(2017, 11, 15))
        );
        assert_eq!(
            *results.borrow(),
            vec![SelectionResult::Selected(date(2017, 11, 15))]
        );
        assert_eq!(
            session.state(),
            SessionState::Closed(SelectionResult::Selected(date(2017, 11, 15)))
        );
    }

    #[test]
    fn confirm_after_moving_across_years() {
        let (mut session, results) = open(2017, 11, 4);

        session.navigate(Navigation::Years(3)).unwrap();
        session.navigate(Navigation::Weeks(3)).unwrap();
        session.navigate(Navigation::Months(-1)).unwrap();
        session.navigate(Navigation::Months(1)).unwrap();
        assert_eq!(session.cursor(), date(2020, 11, 25));

        session.confirm().unwrap();
        assert_eq!(
            *results.borrow(),
            vec![SelectionResult::Selected(date(2020, 11, 25))]
        );
    }

    #[test]
    fn cancel_discards_the_cursor() {
        let (mut session, results) = open(2017, 11, 4);
        session.navigate(Navigation::Months(5)).unwrap();
        session.navigate(Navigation::Days(-3)).unwrap();

        assert_eq!(session.cancel().unwrap(), SelectionResult::Cancelled);
        assert_eq!(*results.borrow(), vec![SelectionResult::Cancelled]);
    }

    #[test]
    fn result_is_delivered_exactly_once() {
        let (mut session, results) = open(2017, 11, 4);
        for _ in 0..50 {
            session.navigate(Navigation::Days(1)).unwrap();
        }
        session.confirm().unwrap();

        assert!(matches!(
            session.confirm().unwrap_err().kind,
            ErrorKind::SessionClosed
        ));
        assert!(matches!(
            session.cancel().unwrap_err().kind,
            ErrorKind::SessionClosed
        ));
        assert!(session.navigate(Navigation::Days(1)).is_err());
        drop(session);

        assert_eq!(results.borrow().len(), 1);
    }

    #[test]
    fn dropping_an_open_session_cancels_it() {
        let (session, results) = open(2017, 11, 4);
        drop(session);
        assert_eq!(*results.borrow(), vec![SelectionResult::Cancelled]);
    }

    #[test]
    fn channel_receives_one_result() {
        let (mut session, rx) = DateSelectionDialog::default()
            .open_with_channel(&SCREEN, 2017, 11, 4)
            .unwrap();
        session.select_day(15).unwrap();
        session.confirm().unwrap();
        drop(session);

        assert_eq!(
            rx.try_recv().unwrap(),
            SelectionResult::Selected(date(2017, 11, 15))
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn month_and_year_moves_clamp_the_day() {
        let (mut session, _) = open(2017, 2, 31);
        session.navigate(Navigation::Months(1)).unwrap();
        assert_eq!(session.cursor(), date(2017, 3, 30));

        let (mut session, _) = open(2012, 1, 29);
        session.select_year(2013).unwrap();
        assert_eq!(session.cursor(), date(2013, 1, 28));
        assert_eq!(session.view(), PickerView::MonthAndDay);

        session.select_month(0).unwrap();
        assert_eq!(session.cursor(), date(2013, 0, 28));
        assert!(session.select_month(12).unwrap_err().is_invalid_date());
    }

    #[test]
    fn select_day_respects_limiter_and_auto_dismiss() {
        let limiter = DefaultDateRangeLimiter::default()
            .with_disabled_days(vec![date(2017, 11, 24), date(2017, 11, 25)]);
        let options = DialogOptions {
            auto_dismiss: true,
            limiter: Box::new(limiter),
            ..DialogOptions::default()
        };
        let (results, cb) = recorder();
        let mut session = DateSelectionDialog::new(options)
            .open(&SCREEN, 2017, 11, 4, cb)
            .unwrap();

        assert!(matches!(
            session.select_day(25).unwrap_err().kind,
            ErrorKind::OutOfRange
        ));
        assert!(session.select_day(32).unwrap_err().is_invalid_date());
        assert!(session.is_open());

        session.select_day(26).unwrap();
        assert!(!session.is_open());
        assert_eq!(
            *results.borrow(),
            vec![SelectionResult::Selected(date(2017, 11, 26))]
        );
    }

    #[test]
    fn limiter_moves_cursor_to_nearest_date() {
        let limiter = DefaultDateRangeLimiter::default()
            .with_year_range(2000, 2020)
            .unwrap();
        let options = DialogOptions {
            limiter: Box::new(limiter),
            show_year_picker_first: true,
            ..DialogOptions::default()
        };
        let (_, cb) = recorder();
        let mut session = DateSelectionDialog::new(options)
            .open(&SCREEN, 2030, 5, 5, cb)
            .unwrap();

        assert_eq!(session.initial(), date(2030, 5, 5));
        assert_eq!(session.cursor(), date(2020, 11, 31));
        assert_eq!(session.view(), PickerView::Year);

        session.navigate(Navigation::Years(1)).unwrap();
        assert_eq!(session.cursor(), date(2020, 11, 31));
        assert!(matches!(
            session.select_year(2021).unwrap_err().kind,
            ErrorKind::OutOfRange
        ));
    }

    #[test]
    fn day_steps_pass_disabled_days() {
        let limiter =
            DefaultDateRangeLimiter::default().with_disabled_days(vec![date(2017, 11, 14)]);
        let options = DialogOptions {
            limiter: Box::new(limiter),
            ..DialogOptions::default()
        };
        let (_, cb) = recorder();
        let mut session = DateSelectionDialog::new(options)
            .open(&SCREEN, 2017, 11, 13, cb)
            .unwrap();

        session.navigate(Navigation::Days(1)).unwrap();
        assert_eq!(session.cursor(), date(2017, 11, 15));
        session.navigate(Navigation::Days(-1)).unwrap();
        assert_eq!(session.cursor(), date(2017, 11, 13));

        session.navigate(Navigation::Weeks(1)).unwrap();
        assert_eq!(session.cursor(), date(2017, 11, 20));
    }

    #[test]
    fn oversized_moves_leave_the_cursor() {
        let (mut session, _) = open(2017, 11, 4);

        session.navigate(Navigation::Days(i64::MAX)).unwrap();
        session.navigate(Navigation::Days(i64::MIN)).unwrap();
        session.navigate(Navigation::Weeks(i64::MAX / 7)).unwrap();
        session.navigate(Navigation::Years(i32::MAX)).unwrap();
        assert_eq!(session.cursor(), date(2017, 11, 4));
    }

    #[test]
    fn disjoint_year_range_and_min_date_are_rejected() {
        let err = DefaultDateRangeLimiter::default()
            .with_year_range(2000, 2010)
            .and_then(|limiter| limiter.with_min_date(date(2015, 0, 1)))
            .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidRange));
    }

    #[test]
    fn title_defaults_to_weekday() {
        let (mut session, _) = open(2017, 11, 4);
        assert_eq!(session.title(), "MONDAY");
        session.toggle_view().unwrap();
        assert_eq!(session.view(), PickerView::Year);

        let options = DialogOptions {
            title: Some("Departure".to_owned()),
            ..DialogOptions::default()
        };
        let (_, cb) = recorder();
        let session = DateSelectionDialog::new(options)
            .open(&SCREEN, 2017, 11, 4, cb)
            .unwrap();
        assert_eq!(session.title(), "DEPARTURE");
    }
}
