mod connection;
mod controller;
mod diagnostics;
mod record;
mod records;
mod session;
mod settings;

pub use connection::{ConnectionInfo, ConnectionKind, Connector, LocalOnly, parse_timeout};
pub use controller::{
    AptController, BrewController, Controller, LifecycleOutcome, ScriptController, StateChange,
};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use record::Record;
pub use records::{AptRecord, BrewRecord, ScriptRecord, Secrets};
pub use session::Session;
pub use settings::ControllerSettings;
