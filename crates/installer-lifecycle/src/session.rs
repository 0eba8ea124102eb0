use std::sync::Arc;
use std::time::Duration;

use installer_core::InstallerError;
use installer_exec::{Communicator, Context, ExecError, Target};
use log::{debug, info, warn};

use crate::{ConnectionInfo, Connector};

/// The target of one lifecycle operation. Remote sessions connect once when
/// opened and must be closed by the operation that opened them.
pub struct Session {
    remote: Option<(String, Arc<dyn Communicator>)>,
    closed: bool,
}

impl Session {
    #[must_use]
    pub fn local() -> Self {
        Self {
            remote: None,
            closed: false,
        }
    }

    /// Connect to the record's remote host, or stay local when it has none.
    /// The connect is bounded by both `ctx` and the connection's own
    /// timeout.
    ///
    /// # Errors
    /// Returns [`ExecError::Session`] when no communicator can be built or
    /// the connect fails, and a parse error for a malformed timeout.
    pub async fn open<C>(
        ctx: &Context,
        connector: &C,
        info: Option<&ConnectionInfo>,
    ) -> Result<Self, InstallerError>
    where
        C: Connector + ?Sized,
    {
        let Some(info) = info.filter(|info| info.is_remote()) else {
            return Ok(Self::local());
        };

        let name = info.connection_name();
        let (port, timeout) = info.port_and_timeout()?;
        let communicator = connector
            .communicator(info)
            .map_err(|err| ExecError::session("setup", &err))?;

        info!("Connecting to {name} over {} (port {port})", info.kind);
        let connect_ctx = ctx.with_timeout(timeout);
        let connected = connect_ctx
            .run(&format!("connect to {name}"), async {
                communicator
                    .connect()
                    .await
                    .map_err(|err| ExecError::session("connect", &err))
            })
            .await;
        if let Err(err) = connected {
            if matches!(err, ExecError::Cancelled { .. } | ExecError::TimedOut { .. }) {
                abandon(&name, communicator.as_ref(), timeout).await;
            }
            return Err(err.into());
        }
        debug!("Connected to {name}");

        Ok(Self {
            remote: Some((name, communicator)),
            closed: false,
        })
    }

    #[must_use]
    pub fn target(&self) -> Target {
        match &self.remote {
            Some((_, communicator)) => Target::Remote(Arc::clone(communicator)),
            None => Target::Local,
        }
    }

    #[must_use]
    pub fn is_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Disconnect a remote session. Local sessions close trivially.
    ///
    /// # Errors
    /// Returns [`ExecError::Session`] when the disconnect fails.
    pub async fn close(mut self) -> Result<(), InstallerError> {
        self.closed = true;
        let Some((name, communicator)) = self.remote.take() else {
            return Ok(());
        };

        match communicator.disconnect().await {
            Ok(()) => {
                debug!("Disconnected from {name}");
                Ok(())
            }
            Err(err) => {
                warn!("Failed to disconnect from {name}: {err}");
                Err(ExecError::session("disconnect", &err).into())
            }
        }
    }
}

/// Tear down a connect that was interrupted part way. The caller's context
/// may already be cancelled, so this runs under its own deadline.
async fn abandon(name: &str, communicator: &dyn Communicator, timeout: Duration) {
    let cleanup = Context::background().with_timeout(timeout);
    let result = cleanup
        .run(&format!("disconnect from {name}"), async {
            communicator
                .disconnect()
                .await
                .map_err(|err| ExecError::session("disconnect", &err))
        })
        .await;
    match result {
        Ok(()) => debug!("Dropped half-open connection to {name}"),
        Err(err) => debug!("Could not drop half-open connection to {name}: {err}"),
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some((name, _)) = &self.remote
            && !self.closed
        {
            warn!("Session to {name} dropped without disconnecting");
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("remote", &self.remote.as_ref().map(|(name, _)| name))
            .field("closed", &self.closed)
            .finish()
    }
}
