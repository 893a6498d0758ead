//! Server administration: state, reload, version.

use crate::client::Client;
use crate::error::{Error, Result};
use crate::operation::{Operation, names};
use crate::operations::Operations;
use model::{Address, ManagementVersion};
use std::thread;
use std::time::{Duration, Instant};

/// Server state reported when the server is up and in sync with its config.
const STATE_RUNNING: &str = "running";
/// Server state reported when a change only takes effect after a reload.
const STATE_RELOAD_REQUIRED: &str = "reload-required";
/// Server state reported when a change needs a full restart.
const STATE_RESTART_REQUIRED: &str = "restart-required";

/// Default time to wait for a reload to finish.
const DEFAULT_RELOAD_TIMEOUT: Duration = Duration::from_secs(60);
/// Delay between server state polls.
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Reload handling for a standalone server.
pub struct Administration<'a> {
    ops: Operations<'a>,
    timeout: Duration,
}

impl<'a> Administration<'a> {
    /// Administration over `client` with the default reload timeout.
    pub fn new(client: &'a dyn Client) -> Self {
        Self {
            ops: Operations::new(client),
            timeout: DEFAULT_RELOAD_TIMEOUT,
        }
    }

    /// Wait at most `timeout` for a reload to finish.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The `server-state` root attribute, e.g. `running`.
    pub fn server_state(&self) -> Result<String> {
        let result = self.ops.read_attribute(&Address::root(), "server-state")?;
        result.assert_success()?;
        result
            .string_value()
            .ok_or_else(|| Error::InvalidResponse("server-state is undefined".into()))
    }

    /// Whether pending changes need a reload.
    pub fn is_reload_required(&self) -> Result<bool> {
        Ok(self.server_state()? == STATE_RELOAD_REQUIRED)
    }

    /// Whether pending changes need a full restart.
    pub fn is_restart_required(&self) -> Result<bool> {
        Ok(self.server_state()? == STATE_RESTART_REQUIRED)
    }

    /// Reload the server and wait until it is running again.
    pub fn reload(&self) -> Result<()> {
        log::info!("reloading {}", self.ops.client().describe());
        // The connection may drop while the server goes down.
        match self.ops.execute(&Operation::new(names::RELOAD, Address::root())) {
            Ok(result) => {
                result.assert_success()?;
            }
            Err(err) => log::debug!("reload request interrupted: {err}"),
        }
        self.wait_until_running()
    }

    /// Reload only if the server asks for it. Returns whether it reloaded.
    pub fn reload_if_required(&self) -> Result<bool> {
        if !self.is_reload_required()? {
            log::debug!("no reload required");
            return Ok(false);
        }
        self.reload()?;
        Ok(true)
    }

    fn wait_until_running(&self) -> Result<()> {
        let deadline = Instant::now() + self.timeout;
        loop {
            match self.server_state() {
                Ok(state) if state == STATE_RUNNING => return Ok(()),
                Ok(state) => log::trace!("server state: {state}"),
                Err(err) => log::trace!("server not reachable yet: {err}"),
            }
            if Instant::now() >= deadline {
                return Err(Error::Timeout(format!(
                    "server did not return to '{STATE_RUNNING}' within {}s",
                    self.timeout.as_secs()
                )));
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

/// Read the management version a server reports.
///
/// Missing micro versions, as reported by old servers, default to 0.
pub fn read_version(client: &dyn Client) -> Result<ManagementVersion> {
    let ops = Operations::new(client);
    let root = Address::root();

    let part = |name: &str, required: bool| -> Result<u32> {
        let result = ops.read_attribute(&root, name)?;
        result.assert_success()?;
        match result.int_value() {
            Some(value) => u32::try_from(value)
                .map_err(|_| Error::InvalidResponse(format!("{name} out of range: {value}"))),
            None if required => Err(Error::InvalidResponse(format!("{name} is undefined"))),
            None => Ok(0),
        }
    };

    let version = ManagementVersion::new(
        part("management-major-version", true)?,
        part("management-minor-version", true)?,
        part("management-micro-version", false)?,
    );
    log::debug!("{} reports management version {version}", client.describe());
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockClient;
    use model::Values;

    #[test]
    fn test_read_version() {
        let client = MockClient::new(ManagementVersion::VERSION_1_7_0);
        assert_eq!(read_version(&client).unwrap(), ManagementVersion::VERSION_1_7_0);
    }

    #[test]
    fn test_read_version_without_micro() {
        let client = MockClient::new(ManagementVersion::VERSION_1_0_0).with_resource(
            Address::root(),
            Values::empty()
                .and("management-major-version", 1)
                .and("management-minor-version", 4),
        );
        assert_eq!(
            read_version(&client).unwrap(),
            ManagementVersion::new(1, 4, 0)
        );
    }

    #[test]
    fn test_reload_if_required() {
        let client = MockClient::standalone(ManagementVersion::VERSION_2_1_0);
        let admin = Administration::new(&client).with_timeout(Duration::from_secs(1));

        assert!(!admin.reload_if_required().unwrap());

        client.set_server_state(STATE_RELOAD_REQUIRED);
        assert!(admin.is_reload_required().unwrap());
        assert!(admin.reload_if_required().unwrap());
        assert_eq!(admin.server_state().unwrap(), STATE_RUNNING);
    }

    #[test]
    fn test_restart_required() {
        let client = MockClient::standalone(ManagementVersion::VERSION_2_1_0);
        client.set_server_state(STATE_RESTART_REQUIRED);
        let admin = Administration::new(&client);
        assert!(admin.is_restart_required().unwrap());
        assert!(!admin.is_reload_required().unwrap());
    }
}
