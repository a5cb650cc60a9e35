use std::{
    error::Error,
    io::{self, Stdout},
    path::Path,
    time::Duration,
};

use anyhow::{Context, Result};
use bleemit_advertise::{AdvertiseMode, Advertiser, AdvertiserEvent};
use bleemit_domain::session::{Effect, Session, SessionEvent};
use bleemit_power::{PowerEvent, PowerMonitor, signal::SignalPowerMonitor};
use bleemit_settings::{
    Settings, SettingsStore, json::JsonSettingsStore, noop::NoopSettingsStore,
};
use chrono::{DateTime, Utc};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    widgets::{Block, Borders, Clear},
};
use ratatui::{
    prelude::*,
    widgets::{Cell, Paragraph, Row, Table},
};
use tokio::sync::mpsc;

mod clipboard;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// path to JSON file to persist beacon preferences to
    #[arg(short, long, default_value = "bleemit-settings.json")]
    settings: String,

    /// skip reading and writing preferences
    #[arg(long)]
    no_settings: bool,

    /// advertise mode: local or sim
    #[arg(short, long, default_value = "local")]
    mode: AdvertiseMode,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let mut store = store(&args);
    let saved = store.load().await?;
    let mut terminal = setup_terminal().context("setup failed")?;
    let outcome = run(&mut terminal, args.mode, saved).await;
    restore_terminal(&mut terminal).context("restore terminal failed")?;
    let session = outcome?;
    store
        .save(&Settings {
            identifier: Some(session.identifier.clone()),
            major: session.major,
            minor: session.minor,
            measured_power: session.measured_power,
        })
        .await?;
    Ok(())
}

fn store(args: &Args) -> Box<dyn SettingsStore> {
    if args.no_settings {
        Box::<NoopSettingsStore>::default()
    } else {
        Box::new(JsonSettingsStore::new(Path::new(&args.settings)))
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    let mut stdout = io::stdout();
    enable_raw_mode().context("failed to enable raw mode")?;
    execute!(stdout, EnterAlternateScreen).context("unable to enter alternate screen")?;
    Terminal::new(CrosstermBackend::new(stdout)).context("creating terminal failed")
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("unable to switch to main screen")?;
    terminal.show_cursor().context("unable to show cursor")
}

async fn run(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    mode: AdvertiseMode,
    saved: Settings,
) -> Result<Session, Box<dyn Error>> {
    let (mut advertiser, mut adv_events) = mode.create_advertiser().await?;
    let mut power_events = power_events();
    let mut session = Session::restored(
        saved.identifier,
        saved.major,
        saved.minor,
        saved.measured_power,
    );
    let start = Utc::now();
    let mut editing = false;

    loop {
        terminal.draw(|f| draw(f, &session, editing, start))?;

        while let Ok(event) = adv_events.try_recv() {
            let event = match event {
                AdvertiserEvent::Radio(state) => SessionEvent::RadioChanged(state),
                AdvertiserEvent::AdvertisingStarted => SessionEvent::AdvertisingStarted,
                AdvertiserEvent::AdvertisingStopped => SessionEvent::AdvertisingStopped,
            };
            perform(&mut session, event, advertiser.as_mut()).await;
        }
        while let Ok(event) = power_events.try_recv() {
            let event = match event {
                PowerEvent::Sleep => SessionEvent::Slept,
                PowerEvent::Wake => SessionEvent::Woke,
            };
            perform(&mut session, event, advertiser.as_mut()).await;
        }

        match next_key()? {
            Some(key) if editing => match key {
                KeyCode::Enter | KeyCode::Esc => editing = false,
                KeyCode::Backspace => {
                    let mut label = session.label.clone();
                    label.pop();
                    perform(&mut session, SessionEvent::LabelEdited(label), advertiser.as_mut())
                        .await;
                }
                KeyCode::Char(c) => {
                    let mut label = session.label.clone();
                    label.push(c);
                    perform(&mut session, SessionEvent::LabelEdited(label), advertiser.as_mut())
                        .await;
                }
                _ => {}
            },
            Some(key) => match key {
                KeyCode::Char('q') => break,
                KeyCode::Enter => {
                    perform(&mut session, SessionEvent::StartStopRequested, advertiser.as_mut())
                        .await;
                }
                KeyCode::Char('e') => editing = true,
                KeyCode::Char('r') => {
                    perform(&mut session, SessionEvent::RegenerateRequested, advertiser.as_mut())
                        .await;
                }
                KeyCode::Char('c') => {
                    session.status = match clipboard::copy(&session.identifier) {
                        Ok(()) => "Identifier copied to the clipboard".to_string(),
                        Err(err) => format!("Copy failed: {err}"),
                    };
                }
                KeyCode::Char('g') => {
                    let event = if session.showing_qr {
                        SessionEvent::QrDismissed
                    } else {
                        SessionEvent::QrRequested
                    };
                    perform(&mut session, event, advertiser.as_mut()).await;
                }
                KeyCode::Char('d') | KeyCode::Esc => {
                    if session.alert.is_some() {
                        perform(&mut session, SessionEvent::AlertDismissed, advertiser.as_mut())
                            .await;
                    } else if session.showing_qr {
                        perform(&mut session, SessionEvent::QrDismissed, advertiser.as_mut())
                            .await;
                    }
                }
                _ => {}
            },
            None => {}
        }
    }

    // leave the radio quiet on the way out
    if advertiser.is_advertising() {
        let _ = advertiser.stop_advertising().await;
    }
    Ok(session)
}

/// Apply a session event, then hand the resulting effects to the advertiser.
/// Capability failures become status text, never exits.
async fn perform(session: &mut Session, event: SessionEvent, advertiser: &mut dyn Advertiser) {
    for effect in session.apply(event) {
        let result = match effect {
            Effect::StartAdvertising(region) => advertiser.start_advertising(&region).await,
            Effect::StopAdvertising => advertiser.stop_advertising().await,
        };
        if let Err(err) = result {
            session.status = format!("Advertising request failed: {err}");
        }
    }
}

/// Sleep/wake notifications forwarded into a channel the draw loop can
/// drain without blocking.
fn power_events() -> mpsc::Receiver<PowerEvent> {
    let (tx, rx) = mpsc::channel(4);
    if let Ok(mut monitor) = SignalPowerMonitor::new() {
        tokio::spawn(async move {
            while let Some(event) = monitor.next_event().await {
                if tx.send(event).await.is_err() {
                    break;
                }
            }
        });
    }
    rx
}

fn next_key() -> Result<Option<KeyCode>> {
    if event::poll(Duration::from_millis(250)).context("event poll failed")?
        && let Event::Key(key) = event::read().context("event read failed")?
    {
        return Ok(Some(key.code));
    }
    Ok(None)
}

fn draw(frame: &mut Frame, session: &Session, editing: bool, start: DateTime<Utc>) {
    use humantime::format_duration;

    let main_layout = layout(frame);
    let now = Utc::now();
    let runtime = format_duration(Duration::from_secs(
        (now - start).num_seconds().max(0) as u64,
    ));
    let footer = Paragraph::new(format!(
        "{}\nRun time: {runtime} | enter start/stop, e edit label, r regenerate, c copy, g qr, q quit",
        session.status
    ))
    .block(Block::default().title("Status").borders(Borders::ALL));
    let fields = table(field_rows(session, editing), "Beacon");
    frame.render_widget(footer, main_layout[0]);
    frame.render_widget(fields, main_layout[1]);

    if session.showing_qr
        && let Some(qr) = &session.qr
    {
        draw_qr_overlay(frame, qr);
    }
    if let Some(alert) = &session.alert {
        draw_alert(frame, &alert.to_string());
    }
}

fn field_rows<'a>(session: &Session, editing: bool) -> Vec<Row<'a>> {
    let (state, state_style) = if session.is_advertising() {
        ("Advertising", Style::default().fg(Color::Green))
    } else {
        ("Idle", Style::default())
    };
    let label = if editing {
        format!("{}\u{258c}", session.label)
    } else {
        session.label.clone()
    };
    vec![
        Row::new(vec![
            Cell::from("State"),
            Cell::from(state).style(state_style),
        ]),
        Row::new(vec![
            Cell::from("Identifier"),
            Cell::from(session.identifier.clone()),
        ]),
        Row::new(vec![Cell::from("Label"), Cell::from(label)]),
        Row::new(vec![
            Cell::from("Major"),
            Cell::from(session.major.to_string()),
        ]),
        Row::new(vec![
            Cell::from("Minor"),
            Cell::from(session.minor.to_string()),
        ]),
        Row::new(vec![
            Cell::from("Measured power"),
            Cell::from(format!("{} dBm", session.measured_power)),
        ]),
    ]
}

fn table<'a>(rows: Vec<Row<'a>>, title: &'a str) -> Table<'a> {
    Table::new(rows, &[Constraint::Length(16), Constraint::Min(40)])
        .block(Block::default().title(title).borders(Borders::ALL))
        .header(Row::new(vec!["Field", "Value"]).style(Style::default().fg(Color::Yellow)))
}

fn layout(frame: &mut Frame) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Length(4), Constraint::Min(8)].as_ref())
        .split(frame.area())
}

fn draw_qr_overlay(frame: &mut Frame, qr: &str) {
    let width = qr
        .lines()
        .map(|line| line.chars().count())
        .max()
        .unwrap_or(0) as u16
        + 2;
    let height = qr.lines().count() as u16 + 2;
    let area = centered_rect(width, height, frame.area());
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(qr.to_string())
            .block(Block::default().title("Scan me (g to close)").borders(Borders::ALL)),
        area,
    );
}

fn draw_alert(frame: &mut Frame, message: &str) {
    let area = centered_rect(48, 5, frame.area());
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(format!("{message}\n\npress d to dismiss"))
            .style(Style::default().fg(Color::Red))
            .block(Block::default().title("Cannot start").borders(Borders::ALL)),
        area,
    );
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
