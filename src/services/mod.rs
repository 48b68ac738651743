pub mod pairing;
pub mod registration;

pub use pairing::{MatchOutcome, PairingRound, PairingService, RoundSummary};
pub use registration::{JoinOutcome, RegistrationService};
