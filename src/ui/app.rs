use std::sync::mpsc;

use crate::cmds::Cmd;
use crate::config::Config;
use crate::date::RawDate;
use crate::dialog::{
    DateSelectionDialog, DialogSession, Navigation, PickerView, SelectionResult, Surface,
};
use crate::error::{Error, Result};
use crate::events::{Dispatcher, Event};

use super::command::CommandParser;
use super::dialog_window::{centered, DialogWindow};
use super::{Context, Mode, Toast};

use unsegen::base::*;
use unsegen::input::{EditBehavior, Event as InputEvent, Input, Key, ScrollBehavior};
use unsegen::widget::*;

/// Tag of the dialog the host opens.
pub const DIALOG_TAG: &str = "date_picker";

/// Rows at the bottom of the screen not available to dialogs.
const BOTTOM_BAR_ROWS: usize = 1;

/// The terminal minus the bottom bar.
pub struct TerminalSurface;

impl Surface for TerminalSurface {
    fn size(&self) -> (usize, usize) {
        match termion::terminal_size() {
            Ok((columns, rows)) => (
                columns as usize,
                (rows as usize).saturating_sub(BOTTOM_BAR_ROWS),
            ),
            Err(err) => {
                log::warn!("Could not determine terminal size: {}", err);
                (0, 0)
            }
        }
    }
}

pub struct App<'a> {
    config: &'a Config,
    context: Context,
    event_sink: mpsc::Sender<Event>,
    initial: Option<RawDate>,
    pick_once: bool,
    picked: Option<SelectionResult>,
    quit: bool,
}

impl<'a> App<'a> {
    pub fn new(config: &'a Config, event_sink: mpsc::Sender<Event>) -> App<'a> {
        App {
            config,
            context: Context::default(),
            event_sink,
            initial: None,
            pick_once: false,
            picked: None,
            quit: false,
        }
    }

    /// Opens dialogs on `date` instead of the configured initial date.
    pub fn with_initial_date(mut self, date: RawDate) -> Self {
        self.initial = Some(date);
        self
    }

    /// Opens the dialog right away and quits once it is closed.
    pub fn pick_once(mut self) -> Self {
        self.pick_once = true;
        self
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    pub fn picked(&self) -> Option<SelectionResult> {
        self.picked
    }

    fn initial_date(&self) -> RawDate {
        self.initial
            .or(self.config.dialog.initial)
            .unwrap_or_else(|| RawDate::from(self.context.today()))
    }

    pub fn open_dialog<S: Surface + ?Sized>(&mut self, surface: &S) -> Result<()> {
        let options = self.config.dialog.to_options()?;
        let date = self.initial_date();

        let sink = self.event_sink.clone();
        let session = DateSelectionDialog::new(options).open(
            surface,
            date.year,
            date.month,
            date.day,
            move |result| {
                if sink.send(Event::DialogResult(DIALOG_TAG.to_owned(), result)).is_err() {
                    log::warn!("Dialog result {:?} could not be delivered", result);
                }
            },
        )?;

        self.context.dialogs.show(DIALOG_TAG, session)
    }

    fn report_error(&mut self, error: &Error) {
        log::warn!("{}", error);
        self.context.toast = Some(Toast::error(
            error.to_string(),
            self.config.toast_duration,
        ));
    }

    pub fn handle_key<S: Surface + ?Sized>(&mut self, key: Key, surface: &S) {
        if self.context.dialogs.has_focus() {
            self.handle_dialog_key(key);
        } else {
            self.handle_host_key(key, surface);
        }
    }

    fn handle_host_key<S: Surface + ?Sized>(&mut self, key: Key, surface: &S) {
        match self.config.host_keys.get(&key) {
            Some(Cmd::OpenDialog) => {
                if let Err(err) = self.open_dialog(surface) {
                    self.report_error(&err);
                }
            }
            Some(Cmd::Exit) => self.quit = true,
            Some(cmd) => log::debug!("{:?} has no effect without an open dialog", cmd),
            None => {}
        }
    }

    fn handle_dialog_key(&mut self, key: Key) {
        let cmd = match self.config.dialog_keys.get(&key) {
            Some(cmd) => *cmd,
            None => return,
        };

        if cmd == Cmd::CommandMode {
            self.context.mode = Mode::Command;
            return;
        }

        let result = match self.context.dialogs.focused_mut() {
            Some(session) => apply_cmd(session, cmd),
            None => return,
        };
        if let Err(err) = result {
            self.report_error(&err);
        }
        self.context.dialogs.reap();
    }

    fn handle_input<S: Surface + ?Sized>(&mut self, input: Input, surface: &S) {
        match self.context.mode {
            Mode::Command => {
                if input.matches(Key::Esc) {
                    self.context.command_line.finish_line();
                    self.context.mode = Mode::Normal;
                    return;
                }

                input
                    .chain(CommandParser::new(&mut self.context, self.config))
                    .chain(
                        EditBehavior::new(&mut self.context.command_line)
                            .delete_forwards_on(Key::Delete)
                            .delete_backwards_on(Key::Backspace)
                            .left_on(Key::Left)
                            .right_on(Key::Right),
                    )
                    .chain(
                        ScrollBehavior::new(&mut self.context.command_line)
                            .backwards_on(Key::Up)
                            .forwards_on(Key::Down),
                    )
                    .finish();
            }
            Mode::Normal => {
                if let InputEvent::Key(key) = input.event {
                    self.handle_key(key, surface);
                }
            }
        }
    }

    fn on_dialog_result(&mut self, tag: &str, result: SelectionResult) {
        log::info!("Dialog '{}' closed with {:?}", tag, result);

        let message = match result {
            SelectionResult::Selected(date) => format!(
                "year {} month {} day {}",
                date.year(),
                date.month(),
                date.day()
            ),
            SelectionResult::Cancelled => "No date selected".to_owned(),
        };
        self.context.toast = Some(Toast::info(message, self.config.toast_duration));
        self.context.last_result = Some(result);

        if self.pick_once {
            self.picked = Some(result);
            self.quit = true;
        }
    }

    pub fn handle_event<S: Surface + ?Sized>(&mut self, event: Event, surface: &S) {
        match event {
            Event::Update => self.context.update(),
            Event::Resize => log::debug!("Terminal resized"),
            Event::Input(input) => self.handle_input(input, surface),
            Event::DialogResult(tag, result) => self.on_dialog_result(&tag, result),
        }
    }

    fn bottom_bar<'w>(&'w self) -> impl Widget + 'w {
        BottomBar {
            context: &self.context,
        }
    }

    fn as_widget<'w>(&'w self) -> impl Widget + 'w
    where
        'a: 'w,
    {
        VLayout::new()
            .widget(HostScreen {
                context: &self.context,
                config: self.config,
            })
            .widget(self.bottom_bar())
    }

    fn draw(&self, term: &mut Terminal) {
        {
            let root = term.create_root_window();
            self.as_widget().draw(root, RenderingHints::new());
        }

        if let Some(session) = self.context.dialogs.focused() {
            let mut root = term.create_root_window();
            let dialog_area = centered(&mut root);
            DialogWindow::new(session, &self.context.theme, self.context.today())
                .draw(dialog_area, RenderingHints::new());
        }

        term.present();
    }

    pub fn run(
        &mut self,
        dispatcher: Dispatcher,
        mut term: Terminal,
    ) -> std::result::Result<(), Box<dyn std::error::Error>> {
        let surface = TerminalSurface;

        if self.pick_once {
            self.open_dialog(&surface)?;
        }
        self.draw(&mut term);

        while !self.quit {
            match dispatcher.next() {
                Ok(event) => self.handle_event(event, &surface),
                Err(_) => break,
            }
            self.draw(&mut term);
        }

        Ok(())
    }
}

/// Applies a dialog key binding to `session`. In the year view every
/// movement changes the year.
pub fn apply_cmd(session: &mut DialogSession, cmd: Cmd) -> Result<()> {
    match cmd {
        Cmd::Confirm => match session.view() {
            PickerView::MonthAndDay => session.confirm().map(|_| ()),
            PickerView::Year => {
                let year = session.cursor().year();
                session.select_year(year)
            }
        },
        Cmd::Cancel => session.cancel().map(|_| ()),
        Cmd::Today => session.today(),
        Cmd::ToggleYearView => session.toggle_view(),
        cmd => match (cmd.navigation(), session.view()) {
            (Some(navigation), PickerView::MonthAndDay) => session.navigate(navigation),
            (Some(navigation), PickerView::Year) => session.navigate(year_step(navigation)),
            (None, _) => {
                log::debug!("{:?} has no effect inside a dialog", cmd);
                Ok(())
            }
        },
    }
}

fn year_step(navigation: Navigation) -> Navigation {
    match navigation {
        Navigation::Days(n) | Navigation::Weeks(n) => Navigation::Years(n.signum() as i32),
        Navigation::Months(n) | Navigation::Years(n) => Navigation::Years(n.signum() * 10),
    }
}

struct HostScreen<'a> {
    context: &'a Context,
    config: &'a Config,
}

impl Widget for HostScreen<'_> {
    fn space_demand(&self) -> Demand2D {
        Demand2D {
            width: ColDemand::at_least(0),
            height: RowDemand::at_least(1),
        }
    }

    fn draw(&self, mut window: Window, _hints: RenderingHints) {
        let open_keys = key_names(self.config, Cmd::OpenDialog);
        let exit_keys = key_names(self.config, Cmd::Exit);

        let mut cursor = Cursor::new(&mut window);
        cursor.set_style_modifier(self.context.theme.title_style);
        cursor.write(" calpick");
        cursor.fill_and_wrap_line();
        cursor.set_style_modifier(StyleModifier::new());
        cursor.fill_and_wrap_line();
        cursor.write(" ");
        cursor.set_style_modifier(self.context.theme.button_style);
        cursor.write("[ Pick a date ]");
        cursor.set_style_modifier(StyleModifier::new());
        cursor.fill_and_wrap_line();
        cursor.fill_and_wrap_line();
        cursor.write(&format!(" {} to pick, {} to quit", open_keys, exit_keys));
        cursor.fill_and_wrap_line();

        if let Some(result) = self.context.last_result {
            cursor.fill_and_wrap_line();
            match result.date() {
                Some(date) => cursor.write(&format!(" Last pick: {}", date)),
                None => cursor.write(" Last pick: cancelled"),
            }
        }
    }
}

fn key_names(config: &Config, cmd: Cmd) -> String {
    let mut names: Vec<String> = config
        .host_keys
        .iter()
        .filter(|(_, c)| **c == cmd)
        .map(|(key, _)| match key {
            Key::Char('\n') => "<Enter>".to_owned(),
            Key::Char(' ') => "<Space>".to_owned(),
            Key::Char(c) => c.to_string(),
            other => format!("{:?}", other),
        })
        .collect();
    names.sort();
    names.join("/")
}

struct BottomBar<'a> {
    context: &'a Context,
}

impl Widget for BottomBar<'_> {
    fn space_demand(&self) -> Demand2D {
        Demand2D {
            width: ColDemand::at_least(0),
            height: RowDemand::exact(BOTTOM_BAR_ROWS),
        }
    }

    fn draw(&self, window: Window, hints: RenderingHints) {
        match (self.context.mode, &self.context.toast) {
            (Mode::Command, _) => self.context.command_line.as_widget().draw(window, hints),
            (Mode::Normal, Some(toast)) => toast.as_widget(&self.context.theme).draw(window, hints),
            (Mode::Normal, None) => {}
        }
    }
}
