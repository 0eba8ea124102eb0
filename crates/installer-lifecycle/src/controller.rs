use std::marker::PhantomData;

use installer_apt::AptInstaller;
use installer_brew::BrewInstaller;
use installer_core::{FromTarget, Installer, absent_as_none};
use installer_exec::Context;
use installer_script::ScriptInstaller;
use log::{debug, info, warn};

use crate::diagnostics::{Diagnostic, Diagnostics, Severity};
use crate::{AptRecord, BrewRecord, ControllerSettings, Connector, Record, ScriptRecord, Session};

/// What the front-end should do with its stored record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateChange<R> {
    Write(R),
    Remove,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleOutcome<R> {
    pub change: StateChange<R>,
    pub diagnostics: Diagnostics,
}

impl<R> LifecycleOutcome<R> {
    #[must_use]
    pub fn has_error(&self) -> bool {
        self.diagnostics.has_error()
    }
}

enum Probe {
    Present,
    Absent,
    Failed,
}

/// Drives one record through create, read, update or delete against the
/// target named by its connection info.
pub struct Controller<R, I, C> {
    connector: C,
    settings: ControllerSettings,
    _marker: PhantomData<fn(R) -> I>,
}

pub type AptController<C> = Controller<AptRecord, AptInstaller, C>;
pub type BrewController<C> = Controller<BrewRecord, BrewInstaller, C>;
pub type ScriptController<C> = Controller<ScriptRecord, ScriptInstaller, C>;

impl<R, I, C> Controller<R, I, C>
where
    R: Record,
    I: Installer<R> + FromTarget,
    C: Connector,
{
    pub fn new(connector: C, settings: ControllerSettings) -> Self {
        Self {
            connector,
            settings,
            _marker: PhantomData,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    /// Install the record, then report what is actually on the target.
    /// The target is probed even when the install failed, so a partial
    /// install is still recorded.
    pub async fn create(&self, ctx: &Context, mut record: R) -> LifecycleOutcome<R> {
        let mut diagnostics = Diagnostics::new();
        let Some(session) = self.prepare(ctx, &mut record, &mut diagnostics).await else {
            return LifecycleOutcome {
                change: StateChange::Unchanged,
                diagnostics,
            };
        };
        let installer = I::from_target(session.target());

        let install_ctx = ctx.with_timeout(self.settings.install_timeout());
        let installed = match installer.install(&install_ctx, &record).await {
            Ok(()) => true,
            Err(err) => {
                warn!("Install failed: {err}");
                diagnostics.push_error(&err);
                false
            }
        };

        let change = match self.probe(ctx, &installer, &mut record, &mut diagnostics).await {
            Probe::Present => {
                info!("Created {} record", installer.kind());
                StateChange::Write(record)
            }
            Probe::Absent if installed => {
                diagnostics.push(Diagnostic::warning(
                    "Installed program not found",
                    "The install command succeeded but the program could not be found afterwards.",
                ));
                StateChange::Remove
            }
            Probe::Absent | Probe::Failed => StateChange::Unchanged,
        };

        Self::finish(session, change, diagnostics).await
    }

    /// Refresh the record from the target. An absent program removes the
    /// record without an error.
    pub async fn read(&self, ctx: &Context, mut record: R) -> LifecycleOutcome<R> {
        let mut diagnostics = Diagnostics::new();
        let Some(session) = self.prepare(ctx, &mut record, &mut diagnostics).await else {
            return LifecycleOutcome {
                change: StateChange::Unchanged,
                diagnostics,
            };
        };
        let installer = I::from_target(session.target());

        let change = match self.probe(ctx, &installer, &mut record, &mut diagnostics).await {
            Probe::Present => StateChange::Write(record),
            Probe::Absent => {
                debug!("Program is gone, removing the record");
                StateChange::Remove
            }
            Probe::Failed => StateChange::Unchanged,
        };

        Self::finish(session, change, diagnostics).await
    }

    /// Nothing about an installed program can be changed in place, so an
    /// update refreshes the record like [`Controller::read`].
    pub async fn update(&self, ctx: &Context, record: R) -> LifecycleOutcome<R> {
        self.read(ctx, record).await
    }

    /// Remove the program. The record is dropped even if the uninstall
    /// failed; the failure is reported as a diagnostic.
    pub async fn delete(&self, ctx: &Context, mut record: R) -> LifecycleOutcome<R> {
        let mut diagnostics = Diagnostics::new();
        let Some(session) = self.prepare(ctx, &mut record, &mut diagnostics).await else {
            return LifecycleOutcome {
                change: StateChange::Unchanged,
                diagnostics,
            };
        };
        let installer = I::from_target(session.target());

        let uninstall_ctx = ctx.with_timeout(self.settings.uninstall_timeout());
        match installer.uninstall(&uninstall_ctx, &record).await {
            Ok(true) => info!("Removed {} record", installer.kind()),
            Ok(false) => debug!("Nothing to remove"),
            Err(err) => {
                warn!("Uninstall failed: {err}");
                diagnostics.push_error(&err);
            }
        }

        Self::finish(session, StateChange::Remove, diagnostics).await
    }

    async fn prepare(
        &self,
        ctx: &Context,
        record: &mut R,
        diagnostics: &mut Diagnostics,
    ) -> Option<Session> {
        match record.initialize() {
            Ok(true) => {}
            Ok(false) => {
                diagnostics.push(Diagnostic::error(
                    "Missing required attributes",
                    "The record does not name anything to manage.",
                ));
                return None;
            }
            Err(err) => {
                diagnostics.push_error(&err);
                return None;
            }
        }

        match Session::open(ctx, &self.connector, record.remote_connection_info()).await {
            Ok(session) => Some(session),
            Err(err) => {
                diagnostics.push_error(&err);
                None
            }
        }
    }

    async fn probe(
        &self,
        ctx: &Context,
        installer: &I,
        record: &mut R,
        diagnostics: &mut Diagnostics,
    ) -> Probe {
        let read_ctx = ctx.with_timeout(self.settings.read_timeout());
        match absent_as_none(installer.find_installed(&read_ctx, record).await) {
            Ok(Some(info)) => {
                debug!("Found {}", info.id());
                record.copy_from_installed(&info);
                Probe::Present
            }
            Ok(None) => Probe::Absent,
            Err(err) => {
                diagnostics.push_error(&err);
                Probe::Failed
            }
        }
    }

    /// Close the session without letting a disconnect failure hide the
    /// operation's own outcome.
    async fn finish(
        session: Session,
        change: StateChange<R>,
        mut diagnostics: Diagnostics,
    ) -> LifecycleOutcome<R> {
        if let Err(err) = session.close().await {
            let severity = match change {
                StateChange::Unchanged if !diagnostics.has_error() => Severity::Error,
                _ => Severity::Warning,
            };
            diagnostics.push(Diagnostic::from_error(severity, &err));
        }
        LifecycleOutcome {
            change,
            diagnostics,
        }
    }
}
