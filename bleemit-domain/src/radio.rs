/// Peripheral-radio availability as reported by the advertiser capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioState {
    Unknown,
    Resetting,
    Unsupported,
    Unauthorized,
    PoweredOff,
    PoweredOn,
}

impl RadioState {
    /// User-facing status line for this state.
    pub fn status_text(&self) -> &'static str {
        match self {
            RadioState::Unknown => "The Bluetooth radio state is not yet known",
            RadioState::Resetting => "The connection to the Bluetooth service was momentarily lost",
            RadioState::Unsupported => "This platform does not support the Bluetooth peripheral role",
            RadioState::Unauthorized => "Not authorized to use the Bluetooth peripheral role",
            RadioState::PoweredOff => "Bluetooth is currently powered off",
            RadioState::PoweredOn => "Bluetooth is powered on and available to use",
        }
    }

    /// Whether an active advertisement survives this state. `Unknown` does
    /// not interrupt: an update is imminent.
    pub fn interrupts_advertising(&self) -> bool {
        !matches!(self, RadioState::PoweredOn | RadioState::Unknown)
    }
}
