mod commands;
mod config;
mod ui;

use std::fs;
use std::io::BufRead;
use std::path::Path;
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use timer_core::{Timer, TimerEvent, TimerState, TimerStatus};
use tracing_subscriber::EnvFilter;

use crate::commands::Command;
use crate::config::Args;

const APP_NAME: &str = "splitwatch";

/// Messages for the main loop. Only the main thread touches the timer.
#[derive(Debug)]
enum AppMsg {
    Line(String),
    Eof,
}

#[derive(PartialEq)]
enum Flow {
    Continue,
    Quit,
}

struct StopwatchApp {
    timer: Timer,
    last_drawn: Option<String>,
}

impl StopwatchApp {
    fn new(timer: Timer) -> Self {
        Self {
            timer,
            last_drawn: None,
        }
    }

    /// Redraw the live line, skipping frames where the text did not change.
    fn redraw(&mut self) {
        let line = ui::live_line(self.timer.state());
        if self.last_drawn.as_deref() == Some(line.as_str()) {
            return;
        }
        if let Err(e) = ui::draw_live(self.timer.state()) {
            log::error!("can't draw: {}", e);
        }
        self.last_drawn = Some(line);
    }

    fn finish_line(&mut self) {
        if self.last_drawn.take().is_some() {
            println!();
        }
    }

    fn handle_pump(&mut self) {
        if self.timer.poll() {
            self.redraw();
        }
    }

    fn handle_command(&mut self, cmd: Command) -> Flow {
        let result = match cmd {
            Command::Start(label) => self.timer.start(label.as_deref()),
            Command::Stop => self.timer.stop(),
            Command::Pause => self.timer.pause(),
            Command::Resume(label) => self.timer.resume(label.as_deref()),
            Command::Toggle(label) => self.timer.toggle(label.as_deref()),
            Command::Lap => self.timer.lap(),
            Command::Reset => self.timer.reset(),
            Command::Status => {
                self.finish_line();
                print!("{}", ui::status_report(self.timer.state(), self.timer.show_ms()));
                return Flow::Continue;
            }
            Command::Export(path) => {
                self.finish_line();
                match export_state(&self.timer.save(), &path) {
                    Ok(()) => println!("saved to {}", path.display()),
                    Err(e) => eprintln!("{:#}", e),
                }
                return Flow::Continue;
            }
            Command::Import(path) => {
                self.finish_line();
                match import_state(&path) {
                    Ok(state) => self.timer.load(state),
                    Err(e) => {
                        eprintln!("{:#}", e);
                        return Flow::Continue;
                    }
                }
            }
            Command::Help => {
                self.finish_line();
                println!("{}", ui::help_text());
                return Flow::Continue;
            }
            Command::Quit => return Flow::Quit,
        };

        // Either the durable copy failed after the state changed, or an
        // import was refused and the state is untouched.
        if let Err(e) = result {
            log::error!("{}", e);
        }
        self.last_drawn = None;
        self.redraw();
        if self.timer.status() != TimerStatus::Ongoing {
            self.finish_line();
        }
        Flow::Continue
    }
}

fn export_state(state: &TimerState, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(state)?;
    fs::write(path, json).with_context(|| format!("can't write {}", path.display()))
}

fn import_state(path: &Path) -> Result<TimerState> {
    let text = fs::read_to_string(path).with_context(|| format!("can't read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("{} is not a saved timer", path.display()))
}

fn input_thread(tx: Sender<AppMsg>) {
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        match line {
            Ok(line) => {
                if tx.send(AppMsg::Line(line)).is_err() {
                    return;
                }
            }
            Err(e) => {
                log::error!("stdin: {}", e);
                break;
            }
        }
    }
    tx.send(AppMsg::Eof).ok();
}

/// Wait for input, but no longer than the next tick is due.
fn next_message(app: &StopwatchApp, rx: &Receiver<AppMsg>) -> Option<Option<AppMsg>> {
    match app.timer.next_tick_in() {
        Some(ms) => match rx.recv_timeout(Duration::from_millis(ms)) {
            Ok(msg) => Some(Some(msg)),
            Err(RecvTimeoutError::Timeout) => Some(None),
            Err(RecvTimeoutError::Disconnected) => None,
        },
        None => rx.recv().ok().map(Some),
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    let opts = config::load_options(&args)?;
    if let Some(warning) = config::persistence_warning(&opts) {
        log::warn!("{}", warning);
    }
    log::info!("{} starting, update interval {} ms", APP_NAME, opts.update_interval_ms);
    let timer = Timer::system(opts).context("can't create timer")?;

    let mut app = StopwatchApp::new(timer);
    for event in TimerEvent::ALL {
        app.timer.on(event, Rc::new(move || log::debug!("event: {}", event)));
    }

    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || input_thread(tx));

    println!("{}", ui::help_text());
    app.redraw();
    if app.timer.status() != TimerStatus::Ongoing {
        app.finish_line();
    }

    while let Some(msg) = next_message(&app, &rx) {
        match msg {
            None => app.handle_pump(),
            Some(AppMsg::Line(line)) => match commands::parse(&line) {
                Ok(cmd) => {
                    if app.handle_command(cmd) == Flow::Quit {
                        break;
                    }
                }
                Err(e) => {
                    app.finish_line();
                    eprintln!("{} (try 'help')", e);
                }
            },
            Some(AppMsg::Eof) => break,
        }
    }

    app.finish_line();
    log::info!("{} exiting", APP_NAME);
    Ok(())
}
