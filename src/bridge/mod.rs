// Bridge module - Phase transition state machine and volume ramps

pub mod fade;
pub mod orchestrator;
pub mod session;

pub use fade::LinearFade;
pub use orchestrator::{BridgeConfig, BridgeOrchestrator};
pub use session::{BridgePhase, BridgeSession, PhasePlan};
