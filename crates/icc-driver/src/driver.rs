//! Verb-level API over a [`CommandChannel`].
//!
//! [`IccDriver`] turns each verb into its command line, runs it, and tracks
//! which station is open. It does not check whether a verb is valid in the
//! current state: the driver rejects out-of-order verbs itself and that
//! rejection is returned as a failure [`IccResult`].

use tracing::{debug, info, warn};

use crate::client::CommandChannel;
use crate::command::{Command, ParameterSet, TimeoutSetting, Verb, validate_user_id};
use crate::config::DriverConfig;
use crate::error::DriverError;
use crate::result::IccResult;
use crate::session::Session;
use crate::token::SecurityLevel;

/// Log target for verb dispatch.
pub(crate) const DRIVER_TARGET: &str = "icc_driver::driver";

/// A driver session addressed through its verbs.
///
/// Call [`IccDriver::shutdown`] when finished. A driver dropped without it
/// still closes the open station and sends `EXIT`, logging rather than
/// returning any failure, before the channel releases the process.
pub struct IccDriver<C: CommandChannel = Session> {
    channel: C,
    user_id: String,
    station: Option<String>,
    exited: bool,
    released: bool,
}

impl IccDriver<Session> {
    /// Spawns a driver process described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::BinaryNotFound`] or
    /// [`DriverError::SpawnFailed`] when the process cannot be started.
    pub fn spawn(config: &DriverConfig) -> Result<Self, DriverError> {
        let session = Session::spawn(config)?;
        Ok(Self::new(session, config.user_id.clone()))
    }

    /// Operating system id of the driver process.
    #[must_use]
    pub fn pid(&self) -> u32 {
        self.channel.pid()
    }
}

impl<C: CommandChannel> IccDriver<C> {
    /// Wraps an existing channel. `user_id` is reported by [`IccDriver::open`]
    /// and [`IccDriver::override_lock`].
    #[must_use]
    pub fn new(channel: C, user_id: impl Into<String>) -> Self {
        Self {
            channel,
            user_id: user_id.into(),
            station: None,
            exited: false,
            released: false,
        }
    }

    /// Letterbug of the open station, if any.
    #[must_use]
    pub fn station(&self) -> Option<&str> {
        self.station.as_deref()
    }

    /// User id reported to the driver by default.
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// The underlying channel.
    #[must_use]
    pub const fn channel(&self) -> &C {
        &self.channel
    }

    /// Opens `station` with the configured user id.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError`] for transport, framing or argument faults.
    pub fn open(&mut self, station: &str, level: SecurityLevel) -> Result<IccResult, DriverError> {
        let user_id = self.user_id.clone();
        self.open_as(station, level, &user_id)
    }

    /// Opens `station`, reporting `user_id` to the System Manager.
    ///
    /// On success the station becomes the scope for station-bound verbs.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::InvalidArgument`] when `user_id` exceeds the
    /// driver's limit, and other [`DriverError`]s for stream faults.
    pub fn open_as(
        &mut self,
        station: &str,
        level: SecurityLevel,
        user_id: &str,
    ) -> Result<IccResult, DriverError> {
        validate_user_id(user_id)?;
        let command = Command::new(Verb::Open)
            .arg(station)
            .arg(level.as_str())
            .arg(user_id);
        let result = self.run(&command)?;
        if result.is_success() {
            info!(target: DRIVER_TARGET, station, level = %level, "station opened");
            self.station = Some(station.to_owned());
        }
        Ok(result)
    }

    /// Closes the open station.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError`] for transport or framing faults.
    pub fn close(&mut self) -> Result<IccResult, DriverError> {
        let result = self.run(&Command::new(Verb::Close))?;
        if result.is_success() {
            if let Some(station) = self.station.take() {
                info!(target: DRIVER_TARGET, station, "station closed");
            }
        }
        Ok(result)
    }

    /// Ends the protocol session. The process is released when the driver
    /// is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError`] for transport or framing faults.
    pub fn exit(&mut self) -> Result<IccResult, DriverError> {
        let result = self.run(&Command::new(Verb::Exit))?;
        if result.is_success() {
            self.exited = true;
        }
        Ok(result)
    }

    /// Clears the checkpoint or volume lock on `cp_name`.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError`] for transport, framing or argument faults.
    pub fn override_lock(&mut self, cp_name: &str) -> Result<IccResult, DriverError> {
        let user_id = self.user_id.clone();
        self.override_lock_as(cp_name, &user_id)
    }

    /// Clears the lock on `cp_name`, reporting `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::InvalidArgument`] when `user_id` exceeds the
    /// driver's limit, and other [`DriverError`]s for stream faults.
    pub fn override_lock_as(
        &mut self,
        cp_name: &str,
        user_id: &str,
    ) -> Result<IccResult, DriverError> {
        validate_user_id(user_id)?;
        self.run(&Command::new(Verb::Override).arg(cp_name).arg(user_id))
    }

    /// Reads parameters of the compounds or blocks matching `spec`.
    ///
    /// `spec` takes the driver's `COMPOUND[:BLOCK]` form with `?` and `*`
    /// wildcards, e.g. `CPD:` for compound parameters or `CPD:*` for every
    /// block in `CPD`.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError`] for transport, framing or argument faults.
    pub fn get(&mut self, spec: &str, set: ParameterSet) -> Result<IccResult, DriverError> {
        let command = Command::new(Verb::Get).arg(spec).arg(set.as_str());
        let command = match set {
            ParameterSet::Subset(parameters) => command.payload(parameters),
            ParameterSet::All | ParameterSet::Std => command,
        };
        self.run(&command)
    }

    /// Lists the compounds of the open station, or the blocks of `compound`,
    /// in processing order.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError`] for transport, framing or argument faults.
    pub fn get_order(&mut self, compound: Option<&str>) -> Result<IccResult, DriverError> {
        self.run(&Command::new(Verb::GetOrder).arg_opt(compound))
    }

    /// Asks the driver to write sequence code files for `spec` next to
    /// `base_path`. The driver picks the extensions from the block kind.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError`] for transport, framing or argument faults.
    pub fn get_seq(&mut self, spec: &str, base_path: &str) -> Result<IccResult, DriverError> {
        self.run(&Command::new(Verb::GetSeq).arg(spec).arg(base_path))
    }

    /// Describes the parameters, types and defaults of `block_type`.
    /// Pass [`COMPOUND_TYPE`](crate::COMPOUND_TYPE) for compounds.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError`] for transport, framing or argument faults.
    pub fn get_def(&mut self, block_type: &str) -> Result<IccResult, DriverError> {
        self.run(&Command::new(Verb::GetDef).arg(block_type))
    }

    /// Runs `LIST` with the given switch.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError`] for transport, framing or argument faults.
    pub fn list(&mut self, switch: &str) -> Result<IccResult, DriverError> {
        self.run(&Command::new(Verb::List).arg(switch))
    }

    /// Uploads settable parameters from the open station into the workfile,
    /// either everything or the parts matching `spec`.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError`] for transport, framing or argument faults.
    pub fn upload(&mut self, spec: Option<&str>) -> Result<IccResult, DriverError> {
        self.run(&Command::new(Verb::Upload).arg_opt(spec))
    }

    /// Checkpoints the open station.
    ///
    /// `delay` is passed through when given: 0 returns immediately, a
    /// positive value waits that many seconds, a negative value uses the
    /// driver's default.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError`] for transport or framing faults.
    pub fn checkpoint(&mut self, delay: Option<i32>) -> Result<IccResult, DriverError> {
        self.run(&Command::new(Verb::Checkpoint).arg_opt(delay.map(|value| value.to_string())))
    }

    /// Saves `compound` and its blocks under `path/save_name`.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError`] for transport, framing or argument faults.
    pub fn save(
        &mut self,
        compound: &str,
        path: &str,
        save_name: &str,
    ) -> Result<IccResult, DriverError> {
        self.run(
            &Command::new(Verb::Save)
                .arg(compound)
                .arg(path)
                .arg(save_name),
        )
    }

    /// Sets how long the driver waits for input before exiting.
    ///
    /// This bounds the driver's wait, not this client's wait for output.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError`] for transport or framing faults.
    pub fn timeout(&mut self, setting: TimeoutSetting) -> Result<IccResult, DriverError> {
        self.run(&Command::new(Verb::Timeout).arg(setting.value().to_string()))
    }

    /// Reinitialisation deletes a station database and stays disabled until
    /// an authorisation mechanism exists. Nothing is sent to the driver.
    ///
    /// # Errors
    ///
    /// Always returns [`DriverError::NotPermitted`].
    pub fn initialize(&mut self, cp_name: Option<&str>) -> Result<IccResult, DriverError> {
        warn!(
            target: DRIVER_TARGET,
            cp_name = cp_name.unwrap_or_default(),
            "refusing INITIALIZE"
        );
        Err(DriverError::NotPermitted {
            operation: Verb::Initialize.as_str(),
        })
    }

    /// Closes any open station and exits the driver.
    ///
    /// Returns the `EXIT` result, or `None` when the session had already
    /// exited or its process is gone.
    ///
    /// # Errors
    ///
    /// Returns the error from `EXIT`. A failed `CLOSE` is logged and does
    /// not prevent `EXIT`.
    pub fn shutdown(mut self) -> Result<Option<IccResult>, DriverError> {
        self.release()
    }

    fn run(&mut self, command: &Command) -> Result<IccResult, DriverError> {
        self.channel.execute(command)
    }

    fn release(&mut self) -> Result<Option<IccResult>, DriverError> {
        if self.released {
            return Ok(None);
        }
        self.released = true;

        if self.exited || !self.channel.is_running() {
            debug!(
                target: DRIVER_TARGET,
                exited = self.exited,
                "skipping shutdown exchange"
            );
            return Ok(None);
        }

        if self.station.is_some() {
            match self.close() {
                Ok(result) if !result.is_success() => warn!(
                    target: DRIVER_TARGET,
                    status_line = result.message(),
                    "CLOSE failed during shutdown"
                ),
                Ok(_) => {}
                Err(error) => warn!(
                    target: DRIVER_TARGET,
                    error = %error,
                    "CLOSE failed during shutdown"
                ),
            }
        }

        self.exit().map(Some)
    }
}

impl<C: CommandChannel> Drop for IccDriver<C> {
    fn drop(&mut self) {
        match self.release() {
            Ok(Some(result)) if !result.is_success() => warn!(
                target: DRIVER_TARGET,
                status_line = result.message(),
                "EXIT failed while dropping driver"
            ),
            Ok(_) => {}
            Err(error) => warn!(
                target: DRIVER_TARGET,
                error = %error,
                "EXIT failed while dropping driver"
            ),
        }
    }
}

impl<C: CommandChannel + std::fmt::Debug> std::fmt::Debug for IccDriver<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IccDriver")
            .field("channel", &self.channel)
            .field("station", &self.station)
            .field("exited", &self.exited)
            .finish_non_exhaustive()
    }
}

/// Runs `body` against a freshly spawned driver and shuts it down on every
/// return path.
///
/// A shutdown failure after `body` succeeded is logged; the process is
/// still released when the driver is dropped.
///
/// # Errors
///
/// Returns spawn failures and any error produced by `body`.
pub fn with_driver<T, F>(config: &DriverConfig, body: F) -> Result<T, DriverError>
where
    F: FnOnce(&mut IccDriver) -> Result<T, DriverError>,
{
    let mut driver = IccDriver::spawn(config)?;
    let outcome = body(&mut driver);
    if let Err(error) = driver.shutdown() {
        warn!(
            target: DRIVER_TARGET,
            error = %error,
            "driver shutdown failed"
        );
    }
    outcome
}
