use super::App;

use crossterm::event::EventStream;
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{Result, Stdout};
use std::{panic, time::Duration};
use tokio::time::{Instant, MissedTickBehavior};

/// Animation frame interval
const FRAME_INTERVAL: Duration = Duration::from_millis(33);

pub async fn run(app: &mut App) -> Result<()> {
    crossterm::terminal::enable_raw_mode()?;
    crossterm::execute!(std::io::stdout(), crossterm::terminal::EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(std::io::stdout());
    let mut terminal = Terminal::new(backend)?;

    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        restore_terminal();
        original_hook(panic_info);
    }));

    let result = drive(app, &mut terminal).await;

    let _ = terminal.show_cursor();
    restore_terminal();
    result
}

async fn drive(app: &mut App, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    terminal.clear()?;

    let mut events = EventStream::new();
    let mut frames = tokio::time::interval(FRAME_INTERVAL);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last_frame = Instant::now();

    loop {
        if app.take_dirty() {
            terminal.draw(|frame| app.render(frame))?;
        }
        if app.should_exit() {
            return Ok(());
        }

        tokio::select! {
            maybe_event = events.next() => match maybe_event {
                Some(Ok(event)) => app.handle_event(event),
                Some(Err(err)) => return Err(err),
                None => return Ok(()),
            },
            update = app.session_mut().next_update() => app.handle_update(update),
            _ = frames.tick() => {
                let now = Instant::now();
                app.tick(now - last_frame);
                last_frame = now;
            }
        }
    }
}

fn restore_terminal() {
    let _ = crossterm::terminal::disable_raw_mode();
    let _ = crossterm::execute!(std::io::stdout(), crossterm::terminal::LeaveAlternateScreen);
}
