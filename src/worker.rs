use std::io::{IsTerminal, Write};
use std::time::Duration;
use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::terminal::{Clear, ClearType};
use log::{info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tokio::time::{self, MissedTickBehavior};
use crate::config::Config;
use crate::document::SharedDocument;
use crate::errors::{DocumentError, WorkerError};
use crate::initialization::Mgr;

/// What a line read from stdin asks for
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Quit,
    Show(String),
    Nothing,
}

/// Starts the dashboard and redraws it until stdin asks to quit or Ctrl-C is pressed.
/// Any other line on stdin is taken as the name of a page to switch to.
///
/// # Arguments
///
/// * 'config' - the loaded configuration
/// * 'mgr' - the initialized dashboard
pub async fn run(config: &Config, mut mgr: Mgr) -> Result<(), WorkerError> {
    mgr.dashboard.start()?;
    let document = mgr.dashboard.document();

    let mut screen = time::interval(Duration::from_millis(config.polling.render_interval_ms));
    screen.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    let shutdown = signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = screen.tick() => {
                print_screen(&document)?;
            }
            line = lines.next_line(), if stdin_open => {
                match line? {
                    Some(line) => match parse_command(&line) {
                        Command::Quit => break,
                        Command::Show(page) => {
                            if !mgr.dashboard.show_page(&page)? {
                                warn!("unknown page '{}'", page);
                            }
                            print_screen(&document)?;
                        },
                        Command::Nothing => {},
                    },
                    None => stdin_open = false,
                }
            }
            _ = &mut shutdown => {
                info!("shutdown requested");
                break;
            }
        }
    }

    mgr.dashboard.stop();

    Ok(())
}

fn parse_command(line: &str) -> Command {
    match line.trim() {
        "" => Command::Nothing,
        "q" | "quit" => Command::Quit,
        page => Command::Show(page.to_string()),
    }
}

/// Prints the visible part of the document. On a terminal the screen is cleared first
/// and colors are shown, piped output gets plain text only.
///
/// # Arguments
///
/// * 'document' - the document to print
fn print_screen(document: &SharedDocument) -> Result<(), WorkerError> {
    let mut stdout = std::io::stdout().lock();
    let terminal = stdout.is_terminal();
    let screen = document.lock().map_err(DocumentError::from)?.render(terminal);

    if terminal {
        execute!(stdout, Clear(ClearType::All), MoveTo(0, 0))?;
    }
    write!(stdout, "{}", screen)?;
    stdout.flush()?;

    Ok(())
}
