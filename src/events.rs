use std::io;
use std::sync::mpsc;
use std::thread;

use unsegen::input::Input;

use crate::config::Config;

pub enum Event {
    Input(Input),
    Update,
}

/// Forwards terminal input and timer ticks to the UI thread.
pub struct Dispatcher {
    rx: mpsc::Receiver<Event>,
    _input_handle: thread::JoinHandle<()>,
    _update_handle: thread::JoinHandle<()>,
}

impl Default for Dispatcher {
    fn default() -> Dispatcher {
        Dispatcher::from_config(&Config::default())
    }
}

impl Dispatcher {
    pub fn from_config(config: &Config) -> Dispatcher {
        let tick_rate = config.tick_rate();
        let (tx, rx) = mpsc::channel();
        let input_handle = {
            let tx = tx.clone();
            thread::spawn(move || {
                let stdin = io::stdin();
                let stdin = stdin.lock();
                for input in Input::read_all(stdin).flatten() {
                    if tx.send(Event::Input(input)).is_err() {
                        return;
                    }
                }
            })
        };
        let update_handle = {
            thread::spawn(move || loop {
                if tx.send(Event::Update).is_err() {
                    return;
                }
                thread::sleep(tick_rate);
            })
        };
        Dispatcher {
            rx,
            _input_handle: input_handle,
            _update_handle: update_handle,
        }
    }

    pub fn next(&self) -> Result<Event, mpsc::RecvError> {
        self.rx.recv()
    }
}
