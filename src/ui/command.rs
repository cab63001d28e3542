use std::convert::TryFrom;
use std::str::FromStr;

use chrono::Month;
use unsegen::input::{Behavior, Event, Input, Key};

use nom::{
    character::complete::*,
    combinator::*,
    error::{ErrorKind as NomErrorKind, ParseError},
    sequence::{preceded, tuple},
    Err, IResult,
};

use super::context::{Context, Mode};
use super::Toast;
use crate::config::Config;
use crate::date::{CalendarDate, MONTHS_PER_YEAR};
use crate::dialog::{DialogSession, Navigation};
use crate::error::{Error, ErrorKind, Result};

/// Executes `:` command lines against the focused dialog.
pub struct CommandParser<'a> {
    context: &'a mut Context,
    config: &'a Config,
}

type Command = (&'static str, Action);

fn match_action(commands: &'static [Command]) -> impl Fn(&str) -> IResult<&str, &'static Command> {
    move |input| {
        if let Some(command) = commands.iter().find(|(name, _)| *name == input) {
            Ok(("", command))
        } else {
            Err(Err::Failure(ParseError::from_error_kind(
                input,
                NomErrorKind::Tag,
            )))
        }
    }
}

/// `[count]name [argument]`
fn parse_command(input: &str) -> IResult<&str, (Option<u32>, &'static Command, Option<&str>)> {
    all_consuming(tuple((
        opt(map_res(digit1, u32::from_str)),
        map_parser(alpha1, match_action(COMMANDS)),
        opt(preceded(space1, rest)),
    )))(input)
}

impl<'a> CommandParser<'a> {
    pub fn new(context: &'a mut Context, config: &'a Config) -> Self {
        CommandParser { context, config }
    }

    pub fn run_command(&mut self, line: &str) -> Result<()> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(());
        }

        let (_, (count, (name, action), arg)) = parse_command(line).map_err(|_| {
            Error::new(
                ErrorKind::CommandParse,
                &format!("unknown command '{}'", line),
            )
        })?;

        let session = self.context.dialogs.focused_mut().ok_or_else(|| {
            Error::new(ErrorKind::SessionClosed, "no date selection dialog is open")
        })?;

        log::debug!("Running command '{}'", line);
        let result = match (action, count, arg) {
            (Action::Repeatable(a), count, None) => a(session, count.unwrap_or(1)),
            (Action::Arg(a), None, Some(arg)) => a(session, arg.trim()),
            (Action::NoArg(a), None, None) => a(session),
            _ => Err(Error::new(
                ErrorKind::CommandParse,
                &format!("wrong usage of '{}'", name),
            )),
        };

        self.context.dialogs.reap();
        result
    }

    fn report_error(&mut self, error: Error) {
        log::warn!("{}", error);
        self.context.toast = Some(Toast::error(
            error.to_string(),
            self.config.toast_duration,
        ));
    }
}

impl Behavior for CommandParser<'_> {
    fn input(mut self, input: Input) -> Option<Input> {
        if let Event::Key(Key::Char('\n')) = input.event {
            let line = self.context.command_line.finish_line().to_owned();
            self.context.mode = Mode::Normal;
            if let Err(e) = self.run_command(&line) {
                self.report_error(e);
            }
            None
        } else {
            Some(input)
        }
    }
}

pub type ActionResult = Result<()>;

pub enum Action {
    Arg(fn(&mut DialogSession, &str) -> ActionResult),
    NoArg(fn(&mut DialogSession) -> ActionResult),
    Repeatable(fn(&mut DialogSession, u32) -> ActionResult),
}

fn count(n: u32) -> Result<i32> {
    i32::try_from(n)
        .map_err(|_| Error::new(ErrorKind::OutOfRange, &format!("count {} is too large", n)))
}

fn parse_year(arg: &str) -> Result<i32> {
    i32::from_str(arg)
        .map_err(|_| Error::new(ErrorKind::CommandParse, &format!("'{}' is not a year", arg)))
}

/// Month names or their 1-based number, as in `month dec` or `month 12`.
fn parse_month(arg: &str) -> Result<u32> {
    let number = match u32::from_str(arg) {
        Ok(n) => n,
        Err(_) => Month::from_str(arg)
            .map_err(|_| Error::new(ErrorKind::CommandParse, &format!("'{}' is not a month", arg)))?
            .number_from_month(),
    };

    if number == 0 || number > MONTHS_PER_YEAR {
        return Err(Error::new(
            ErrorKind::InvalidDate,
            &format!("there is no month {}", number),
        ));
    }
    Ok(number - 1)
}

fn parse_day(arg: &str) -> Result<u32> {
    u32::from_str(arg)
        .map_err(|_| Error::new(ErrorKind::CommandParse, &format!("'{}' is not a day", arg)))
}

const COMMANDS: &[Command] = &[
    (
        "gd",
        Action::Repeatable(|s, n| s.navigate(Navigation::Days(n as i64))),
    ),
    (
        "gD",
        Action::Repeatable(|s, n| s.navigate(Navigation::Days(-(n as i64)))),
    ),
    (
        "gw",
        Action::Repeatable(|s, n| s.navigate(Navigation::Weeks(n as i64))),
    ),
    (
        "gW",
        Action::Repeatable(|s, n| s.navigate(Navigation::Weeks(-(n as i64)))),
    ),
    (
        "gm",
        Action::Repeatable(|s, n| s.navigate(Navigation::Months(count(n)?))),
    ),
    (
        "gM",
        Action::Repeatable(|s, n| s.navigate(Navigation::Months(-count(n)?))),
    ),
    (
        "gy",
        Action::Repeatable(|s, n| s.navigate(Navigation::Years(count(n)?))),
    ),
    (
        "gY",
        Action::Repeatable(|s, n| s.navigate(Navigation::Years(-count(n)?))),
    ),
    (
        "goto",
        Action::Arg(|s, arg| s.go_to(CalendarDate::from_str(arg)?)),
    ),
    ("year", Action::Arg(|s, arg| s.select_year(parse_year(arg)?))),
    (
        "month",
        Action::Arg(|s, arg| s.select_month(parse_month(arg)?)),
    ),
    ("day", Action::Arg(|s, arg| s.select_day(parse_day(arg)?))),
    ("view", Action::NoArg(|s| s.toggle_view())),
    ("today", Action::NoArg(|s| s.today())),
    ("ok", Action::NoArg(|s| s.confirm().map(|_| ()))),
    ("cancel", Action::NoArg(|s| s.cancel().map(|_| ()))),
];
