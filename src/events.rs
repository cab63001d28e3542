use std::io;
use std::sync::mpsc;
use std::thread;

use nix::sys::signal::SigSet;
use unsegen::input::Input;

use crate::config::Config;
use crate::dialog::SelectionResult;

pub enum Event {
    Input(Input),
    Update,
    Resize,
    DialogResult(String, SelectionResult),
}

pub struct Dispatcher {
    rx: mpsc::Receiver<Event>,
    tx: mpsc::Sender<Event>,
    _input_handle: thread::JoinHandle<()>,
    _update_handle: thread::JoinHandle<()>,
    _signal_handle: Option<thread::JoinHandle<()>>,
}

impl Dispatcher {
    /// Spawns the input and tick threads. `signals` are blocked for the
    /// calling thread (and all threads it spawns afterwards) and reported as
    /// [`Event::Resize`].
    pub fn from_config(config: &Config, signals: SigSet) -> Dispatcher {
        let tick_rate = config.tick_rate;
        let (tx, rx) = mpsc::channel();

        let signal_handle = match signals.thread_block() {
            Ok(()) => {
                let tx = tx.clone();
                Some(thread::spawn(move || loop {
                    match signals.wait() {
                        Ok(signal) => {
                            log::debug!("Received {:?}", signal);
                            if tx.send(Event::Resize).is_err() {
                                return;
                            }
                        }
                        Err(err) => {
                            log::error!("Waiting for signals failed: {}", err);
                            return;
                        }
                    }
                }))
            }
            Err(err) => {
                log::warn!("Could not block signals, resizing is not detected: {}", err);
                None
            }
        };

        let input_handle = {
            let tx = tx.clone();
            thread::spawn(move || {
                let stdin = io::stdin();
                let stdin = stdin.lock();
                for evt in Input::read_all(stdin) {
                    match evt {
                        Ok(input) => {
                            if tx.send(Event::Input(input)).is_err() {
                                return;
                            }
                        }
                        Err(err) => log::warn!("Could not read input: {}", err),
                    }
                }
            })
        };

        let update_handle = {
            let tx = tx.clone();
            thread::spawn(move || loop {
                if tx.send(Event::Update).is_err() {
                    return;
                }
                thread::sleep(tick_rate);
            })
        };

        Dispatcher {
            rx,
            tx,
            _input_handle: input_handle,
            _update_handle: update_handle,
            _signal_handle: signal_handle,
        }
    }

    pub fn next(&self) -> Result<Event, mpsc::RecvError> {
        self.rx.recv()
    }

    pub fn event_sink(&self) -> &mpsc::Sender<Event> {
        &self.tx
    }
}
