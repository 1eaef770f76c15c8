pub mod fleet;
pub mod generation;
pub mod history;
pub mod indicator;
pub mod optimization;
pub mod poller;
pub mod shell;

pub use self::indicator::{ConnectionIndicator, LiveStatus};
pub use self::poller::{PollerHandle, StatusPoller};
pub use self::shell::{Notice, NoticeLevel, Shell, Tab};
