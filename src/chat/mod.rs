pub mod dispatch;
pub mod presence;
pub mod session;
pub mod typing;

pub use dispatch::{MessageDispatch, PendingSend, Phase, SendOutcome};
pub use presence::PresenceAnnouncer;
pub use session::{ChatSession, Command};
