use thiserror::Error;

use crate::identity::{ParseIdError, ProximityId};
use crate::label::{self, LabelError};
use crate::qr;
use crate::radio::RadioState;
use crate::region::{BeaconRegion, DEFAULT_MEASURED_POWER};

/// Advisory shown as a dismissible alert. Blocks the start action, never
/// fatal.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Advisory {
    #[error(transparent)]
    Label(#[from] LabelError),
    #[error(transparent)]
    Identifier(#[from] ParseIdError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Advertising,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The single start/stop action of the screen.
    StartStopRequested,
    /// The advertiser's asynchronous start confirmation.
    AdvertisingStarted,
    AdvertisingStopped,
    RadioChanged(RadioState),
    Slept,
    Woke,
    RegenerateRequested,
    LabelEdited(String),
    MajorChanged(u16),
    MinorChanged(u16),
    PowerChanged(i8),
    QrRequested,
    QrDismissed,
    AlertDismissed,
}

/// Work the session owner must hand to the advertiser capability.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    StartAdvertising(BeaconRegion),
    StopAdvertising,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub identifier: String,
    pub label: String,
    pub major: u16,
    pub minor: u16,
    pub measured_power: i8,
    pub phase: Phase,
    pub status: String,
    pub alert: Option<Advisory>,
    /// Rendered QR text for the current payload, if the last encode succeeded.
    pub qr: Option<String>,
    pub showing_qr: bool,
    advertise_before_sleep: bool,
}

impl Default for Session {
    fn default() -> Session {
        Session::restored(None, 0, 0, DEFAULT_MEASURED_POWER)
    }
}

impl Session {
    /// Session from persisted preferences; a missing identifier gets a
    /// freshly generated one.
    pub fn restored(
        identifier: Option<String>,
        major: u16,
        minor: u16,
        measured_power: i8,
    ) -> Session {
        Session {
            identifier: identifier.unwrap_or_else(|| ProximityId::generate().to_string()),
            label: String::new(),
            major,
            minor,
            measured_power,
            phase: Phase::Idle,
            status: String::new(),
            alert: None,
            qr: None,
            showing_qr: false,
            advertise_before_sleep: false,
        }
    }

    pub fn is_advertising(&self) -> bool {
        self.phase == Phase::Advertising
    }

    /// Apply one event and return the effects the owner must perform.
    /// Transitions never touch the advertiser themselves.
    pub fn apply(&mut self, event: SessionEvent) -> Vec<Effect> {
        match event {
            SessionEvent::StartStopRequested => self.start_stop(),
            SessionEvent::AdvertisingStarted => {
                self.phase = Phase::Advertising;
                vec![]
            }
            SessionEvent::AdvertisingStopped => {
                self.phase = Phase::Idle;
                vec![]
            }
            SessionEvent::RadioChanged(state) => self.radio_changed(state),
            SessionEvent::Slept => self.slept(),
            SessionEvent::Woke => self.woke(),
            SessionEvent::RegenerateRequested => {
                self.identifier = ProximityId::generate().to_string();
                vec![]
            }
            SessionEvent::LabelEdited(label) => {
                self.label = label;
                vec![]
            }
            SessionEvent::MajorChanged(major) => {
                self.major = major;
                vec![]
            }
            SessionEvent::MinorChanged(minor) => {
                self.minor = minor;
                vec![]
            }
            SessionEvent::PowerChanged(power) => {
                self.measured_power = power;
                vec![]
            }
            SessionEvent::QrRequested => {
                self.qr = qr::render_unicode(&qr::payload(&self.identifier, &self.label));
                self.showing_qr = self.qr.is_some();
                vec![]
            }
            SessionEvent::QrDismissed => {
                self.showing_qr = false;
                vec![]
            }
            SessionEvent::AlertDismissed => {
                self.alert = None;
                vec![]
            }
        }
    }

    fn start_stop(&mut self) -> Vec<Effect> {
        match self.phase {
            Phase::Advertising => {
                // Stopping always succeeds and takes effect immediately.
                self.phase = Phase::Idle;
                vec![Effect::StopAdvertising]
            }
            Phase::Idle => self.request_start(),
        }
    }

    /// Idle -> Advertising edge. The phase only changes once the advertiser
    /// confirms via `AdvertisingStarted`.
    fn request_start(&mut self) -> Vec<Effect> {
        if let Err(err) = label::validate(&self.label) {
            return self.advise(err.into());
        }
        match self.identifier.parse::<ProximityId>() {
            Ok(id) => vec![Effect::StartAdvertising(BeaconRegion::new(
                id,
                self.major,
                self.minor,
                self.measured_power,
            ))],
            Err(err) => self.advise(err.into()),
        }
    }

    fn advise(&mut self, advisory: Advisory) -> Vec<Effect> {
        self.status = advisory.to_string();
        self.alert = Some(advisory);
        vec![]
    }

    fn radio_changed(&mut self, state: RadioState) -> Vec<Effect> {
        self.status = state.status_text().to_string();
        if state.interrupts_advertising() && self.phase == Phase::Advertising {
            self.phase = Phase::Idle;
            vec![Effect::StopAdvertising]
        } else {
            vec![]
        }
    }

    fn slept(&mut self) -> Vec<Effect> {
        if self.phase == Phase::Advertising {
            self.advertise_before_sleep = true;
            self.phase = Phase::Idle;
            vec![Effect::StopAdvertising]
        } else {
            vec![]
        }
    }

    fn woke(&mut self) -> Vec<Effect> {
        if self.advertise_before_sleep {
            self.advertise_before_sleep = false;
            self.request_start()
        } else {
            vec![]
        }
    }
}

#[cfg(test)]
mod test {
    use super::{Advisory, Effect, Phase, Session, SessionEvent};
    use crate::label::LabelError;
    use crate::radio::RadioState;

    const IDENTIFIER: &str = "a0b1c3d2-af1c-a4b6-d0c4-000000000000";

    fn ready_session() -> Session {
        let mut session = Session::default();
        session.identifier = IDENTIFIER.to_string();
        session.apply(SessionEvent::LabelEdited("Lobby".to_string()));
        session
    }

    fn advertising_session() -> Session {
        let mut session = ready_session();
        let effects = session.apply(SessionEvent::StartStopRequested);
        assert_eq!(effects.len(), 1);
        session.apply(SessionEvent::AdvertisingStarted);
        session
    }

    #[test]
    fn empty_label_blocks_start() {
        let mut session = ready_session();
        session.apply(SessionEvent::LabelEdited(String::new()));
        let effects = session.apply(SessionEvent::StartStopRequested);
        assert!(effects.is_empty());
        assert_eq!(session.phase, Phase::Idle);
        assert_eq!(session.alert, Some(Advisory::Label(LabelError::Empty)));
    }

    #[test]
    fn separator_in_label_blocks_start() {
        let mut session = ready_session();
        session.apply(SessionEvent::LabelEdited("Lobby;".to_string()));
        let effects = session.apply(SessionEvent::StartStopRequested);
        assert!(effects.is_empty());
        assert_eq!(session.phase, Phase::Idle);
        assert_eq!(
            session.alert,
            Some(Advisory::Label(LabelError::ContainsSeparator))
        );
    }

    #[test]
    fn malformed_identifier_blocks_start() {
        let mut session = ready_session();
        session.identifier = "not-a-uuid".to_string();
        let effects = session.apply(SessionEvent::StartStopRequested);
        assert!(effects.is_empty());
        assert_eq!(session.phase, Phase::Idle);
        assert!(matches!(session.alert, Some(Advisory::Identifier(_))));
    }

    #[test]
    fn valid_start_emits_effect_but_waits_for_confirmation() {
        let mut session = ready_session();
        let effects = session.apply(SessionEvent::StartStopRequested);
        assert!(matches!(&effects[..], [Effect::StartAdvertising(region)]
            if region.id.to_string() == IDENTIFIER));
        assert_eq!(session.phase, Phase::Idle);

        session.apply(SessionEvent::AdvertisingStarted);
        assert_eq!(session.phase, Phase::Advertising);
    }

    #[test]
    fn region_carries_session_parameters() {
        let mut session = ready_session();
        session.apply(SessionEvent::MajorChanged(7));
        session.apply(SessionEvent::MinorChanged(9));
        session.apply(SessionEvent::PowerChanged(-40));
        let effects = session.apply(SessionEvent::StartStopRequested);
        match &effects[..] {
            [Effect::StartAdvertising(region)] => {
                assert_eq!(region.major, 7);
                assert_eq!(region.minor, 9);
                assert_eq!(region.measured_power, -40);
            }
            other => panic!("unexpected effects: {other:?}"),
        }
    }

    #[test]
    fn stop_always_returns_to_idle() {
        let mut session = advertising_session();
        let effects = session.apply(SessionEvent::StartStopRequested);
        assert_eq!(effects, vec![Effect::StopAdvertising]);
        assert_eq!(session.phase, Phase::Idle);
    }

    #[test]
    fn sleep_while_advertising_stops_and_wake_restarts() {
        let mut session = advertising_session();

        let effects = session.apply(SessionEvent::Slept);
        assert_eq!(effects, vec![Effect::StopAdvertising]);
        assert_eq!(session.phase, Phase::Idle);

        let effects = session.apply(SessionEvent::Woke);
        assert!(matches!(&effects[..], [Effect::StartAdvertising(_)]));
        session.apply(SessionEvent::AdvertisingStarted);
        assert_eq!(session.phase, Phase::Advertising);
    }

    #[test]
    fn sleep_while_idle_is_inert_on_wake() {
        let mut session = ready_session();
        assert!(session.apply(SessionEvent::Slept).is_empty());
        assert!(session.apply(SessionEvent::Woke).is_empty());
        assert_eq!(session.phase, Phase::Idle);
    }

    #[test]
    fn wake_memory_is_consumed_by_one_restart() {
        let mut session = advertising_session();
        session.apply(SessionEvent::Slept);
        assert!(!session.apply(SessionEvent::Woke).is_empty());
        assert!(session.apply(SessionEvent::Woke).is_empty());
    }

    #[test]
    fn radio_interruption_drops_an_active_session() {
        let mut session = advertising_session();
        let effects = session.apply(SessionEvent::RadioChanged(RadioState::PoweredOff));
        assert_eq!(effects, vec![Effect::StopAdvertising]);
        assert_eq!(session.phase, Phase::Idle);
        assert_eq!(session.status, RadioState::PoweredOff.status_text());
    }

    #[test]
    fn radio_updates_set_status_without_touching_idle_sessions() {
        let mut session = ready_session();
        let effects = session.apply(SessionEvent::RadioChanged(RadioState::PoweredOn));
        assert!(effects.is_empty());
        assert_eq!(session.status, RadioState::PoweredOn.status_text());
    }

    #[test]
    fn regenerate_replaces_identifier_with_a_branded_one() {
        let mut session = ready_session();
        session.apply(SessionEvent::RegenerateRequested);
        assert_ne!(session.identifier, IDENTIFIER);
        assert!(session.identifier.starts_with("a0b1c3d2-af1c-a4b6-d0c4-"));
    }

    #[test]
    fn qr_request_renders_and_shows_the_payload() {
        let mut session = ready_session();
        session.apply(SessionEvent::QrRequested);
        assert!(session.qr.is_some());
        assert!(session.showing_qr);

        session.apply(SessionEvent::QrDismissed);
        assert!(!session.showing_qr);
    }

    #[test]
    fn failed_qr_encode_clears_a_previously_shown_code() {
        let mut session = ready_session();
        session.apply(SessionEvent::QrRequested);
        assert!(session.qr.is_some());

        session.apply(SessionEvent::LabelEdited("x".repeat(4096)));
        session.apply(SessionEvent::QrRequested);
        assert!(session.qr.is_none());
        assert!(!session.showing_qr);
    }

    #[test]
    fn alert_is_dismissible() {
        let mut session = ready_session();
        session.apply(SessionEvent::LabelEdited(String::new()));
        session.apply(SessionEvent::StartStopRequested);
        assert!(session.alert.is_some());

        session.apply(SessionEvent::AlertDismissed);
        assert!(session.alert.is_none());
    }

    #[test]
    fn restored_session_without_identifier_generates_one() {
        let session = Session::restored(None, 0, 0, -59);
        assert!(session.identifier.starts_with("a0b1c3d2-af1c-a4b6-d0c4-"));
    }

    #[test]
    fn restored_session_keeps_persisted_identifier() {
        let session = Session::restored(Some(IDENTIFIER.to_string()), 1, 2, -40);
        assert_eq!(session.identifier, IDENTIFIER);
        assert_eq!((session.major, session.minor, session.measured_power), (1, 2, -40));
    }
}
