extern crate calpick as lib;

use flexi_logger::{FileSpec, Logger};
use lib::date::RawDate;
use lib::dialog::SelectionResult;
use lib::events::Dispatcher;
use lib::ui::app::App;
use nix::sys::{signal, termios};
use std::io::stdout;
use std::path::PathBuf;
use structopt::StructOpt;
use unsegen::base::Terminal;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "cpk",
    author = "Julian Bigge <j.reedts@gmail.com>",
    about = "Calpick - pick a date in the terminal."
)]
pub struct Args {
    #[structopt(
        name = "CONFIG",
        short = "c",
        long = "config",
        help = "path to config file",
        parse(from_os_str)
    )]
    pub configfile: Option<PathBuf>,

    #[structopt(
        short = "d",
        long = "date",
        help = "initial date as YYYY-MM-DD instead of today"
    )]
    pub date: Option<RawDate>,

    #[structopt(
        short = "p",
        long = "pick",
        help = "open the dialog right away and print the picked date"
    )]
    pub pick: bool,

    #[structopt(long = "log-file", help = "path to log file", parse(from_os_str))]
    pub log_file: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::from_args();

    const DEFAULT_LOG_LEVEL: &str = if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    };

    let mut logger = Logger::try_with_env_or_str(DEFAULT_LOG_LEVEL)?;

    if let Some(log_file) = args.log_file {
        logger = logger
            .log_to_file(FileSpec::try_from(log_file)?)
            .print_message();
    }

    logger.start()?;

    const STDOUT: std::os::unix::io::RawFd = 0;
    let orig_attr = std::sync::Mutex::new(termios::tcgetattr(STDOUT)?);

    std::panic::set_hook(Box::new(move |info| {
        // Switch to main terminal screen
        println!("{}{}", termion::screen::ToMainScreen, termion::cursor::Show);

        if let Ok(attr) = orig_attr.lock() {
            let _ = termios::tcsetattr(STDOUT, termios::SetArg::TCSANOW, &attr);
        }

        println!("Calpick ran into a fatal error!");
        println!(
            "Consider filing an issue with a log file and the backtrace below at {}",
            env!("CARGO_PKG_REPOSITORY")
        );

        println!("{}", info);
        println!("{:?}", backtrace::Backtrace::new());
    }));

    let mut signals_to_wait = signal::SigSet::empty();
    signals_to_wait.add(signal::SIGWINCH);

    let config = lib::config::load_suitable_config(args.configfile.as_deref())?;

    let dispatcher = Dispatcher::from_config(&config, signals_to_wait);

    let picked = {
        // Setup unsegen terminal
        let stdout = stdout();
        let term = Terminal::new(stdout.lock())?;

        let mut app = App::new(&config, dispatcher.event_sink().clone());
        if let Some(date) = args.date {
            app = app.with_initial_date(date);
        }
        if args.pick {
            app = app.pick_once();
        }

        app.run(dispatcher, term)?;
        app.picked()
    };

    if args.pick {
        match picked {
            Some(SelectionResult::Selected(date)) => println!("{}", date),
            _ => std::process::exit(1),
        }
    }

    Ok(())
}
