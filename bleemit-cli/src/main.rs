use std::{error::Error, path::Path, time::Duration};

use bleemit_advertise::{AdvertiseMode, Advertiser, AdvertiserEvent};
use bleemit_domain::identity::ProximityId;
use bleemit_domain::qr;
use bleemit_domain::session::{Effect, Session, SessionEvent};
use bleemit_power::{PowerEvent, PowerMonitor, signal::SignalPowerMonitor};
use bleemit_settings::{
    Settings, SettingsStore, json::JsonSettingsStore, noop::NoopSettingsStore,
};
use chrono::Utc;
use clap::Parser;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// proximity identifier to advertise; defaults to the saved one
    #[arg(short, long)]
    uuid: Option<String>,

    /// beacon label, also the second field of the QR payload
    #[arg(short, long)]
    label: Option<String>,

    /// major sub-identifier of the advertised region
    #[arg(long)]
    major: Option<u16>,

    /// minor sub-identifier of the advertised region
    #[arg(long)]
    minor: Option<u16>,

    /// measured power byte embedded in the advertised frame
    #[arg(long)]
    power: Option<i8>,

    /// advertise mode: local or sim
    #[arg(short, long, default_value = "local")]
    mode: AdvertiseMode,

    /// path to JSON file to persist beacon preferences to
    #[arg(short, long, default_value = "bleemit-settings.json")]
    settings: String,

    /// skip reading and writing preferences
    #[arg(long)]
    no_settings: bool,

    /// print the identity payload as a QR code before advertising
    #[arg(long)]
    qr: bool,

    /// write the identity payload as an SVG QR code to this path
    #[arg(long)]
    qr_svg: Option<String>,

    /// print a freshly generated identifier and exit
    #[arg(long)]
    generate: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing subscriber with env filter support (RUST_LOG)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    if args.generate {
        println!("{}", ProximityId::generate());
        return Ok(());
    }

    let mut store = store(&args);
    let saved = store.load().await?;
    let mut session = Session::restored(
        saved.identifier,
        saved.major,
        saved.minor,
        saved.measured_power,
    );
    merge_args(&mut session, &args);

    let payload = qr::payload(&session.identifier, &session.label);
    if args.qr {
        match qr::render_unicode(&payload) {
            Some(code) => println!("{code}"),
            None => error!("payload cannot be encoded as a QR code"),
        }
    }
    if let Some(path) = &args.qr_svg {
        match qr::render_svg(&payload) {
            Some(svg) => {
                std::fs::write(path, svg)?;
                info!("wrote QR code to {path}");
            }
            None => error!("payload cannot be encoded as a QR code"),
        }
    }

    run(&mut session, args.mode).await?;

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

fn merge_args(session: &mut Session, args: &Args) {
    if let Some(uuid) = &args.uuid {
        session.identifier = uuid.clone();
    }
    if let Some(label) = &args.label {
        session.apply(SessionEvent::LabelEdited(label.clone()));
    }
    if let Some(major) = args.major {
        session.apply(SessionEvent::MajorChanged(major));
    }
    if let Some(minor) = args.minor {
        session.apply(SessionEvent::MinorChanged(minor));
    }
    if let Some(power) = args.power {
        session.apply(SessionEvent::PowerChanged(power));
    }
}

async fn run(session: &mut Session, mode: AdvertiseMode) -> Result<(), Box<dyn Error>> {
    let (mut advertiser, mut adv_events) = mode.create_advertiser().await?;
    let mut power = SignalPowerMonitor::new()?;
    let start = Utc::now();

    perform(session, SessionEvent::StartStopRequested, advertiser.as_mut()).await;
    if let Some(alert) = &session.alert {
        return Err(alert.to_string().into());
    }

    loop {
        tokio::select! {
            event = adv_events.recv() => match event {
                Some(AdvertiserEvent::Radio(state)) => {
                    perform(session, SessionEvent::RadioChanged(state), advertiser.as_mut()).await;
                    info!("{}", session.status);
                }
                Some(AdvertiserEvent::AdvertisingStarted) => {
                    perform(session, SessionEvent::AdvertisingStarted, advertiser.as_mut()).await;
                    info!(
                        "advertising {} ({}) major={} minor={}",
                        session.identifier, session.label, session.major, session.minor
                    );
                }
                Some(AdvertiserEvent::AdvertisingStopped) => {
                    perform(session, SessionEvent::AdvertisingStopped, advertiser.as_mut()).await;
                    info!("advertising stopped");
                }
                None => break,
            },
            event = power.next_event() => match event {
                Some(PowerEvent::Sleep) => {
                    perform(session, SessionEvent::Slept, advertiser.as_mut()).await;
                    info!("system sleeping, advertising paused");
                }
                Some(PowerEvent::Wake) => {
                    perform(session, SessionEvent::Woke, advertiser.as_mut()).await;
                    info!("system awake, advertising resumed");
                }
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                break;
            }
        }
    }

    if advertiser.is_advertising() {
        advertiser.stop_advertising().await?;
    }
    let runtime = humantime::format_duration(Duration::from_secs(
        (Utc::now() - start).num_seconds().max(0) as u64,
    ));
    info!("session ran for {runtime}");
    Ok(())
}

/// Apply a session event, then hand the resulting effects to the advertiser.
async fn perform(session: &mut Session, event: SessionEvent, advertiser: &mut dyn Advertiser) {
    for effect in session.apply(event) {
        let result = match effect {
            Effect::StartAdvertising(region) => advertiser.start_advertising(&region).await,
            Effect::StopAdvertising => advertiser.stop_advertising().await,
        };
        if let Err(err) = result {
            error!("advertising request failed: {err}");
            session.status = format!("Advertising request failed: {err}");
        }
    }
}
