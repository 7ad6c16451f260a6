use log::{debug, error, info, warn};
use std::time::Duration;

use super::command_runner::{CommandOutput, CommandRunner};
use super::egress::AddressLookup;
use super::identity::{parse_identity_list, Identity};
use crate::configuration::RotationConfig;
use crate::error_handling::types::RotationError;

/// Maximum characters of raw listing output echoed to the log.
const LISTING_LOG_PREVIEW: usize = 200;

/// Switches the machine-wide network identity through an external control program.
///
/// Exactly one identity is active at a time. [`IdentityRotator::activate`] always
/// disconnects before connecting, and [`IdentityRotator::deactivate`] is safe to call
/// with nothing active. Command failures are logged and reported as `false` or an
/// empty list; they never surface as errors.
pub struct IdentityRotator<R: CommandRunner, A: AddressLookup> {
    runner: R,
    lookup: A,
    config: RotationConfig,
    active: Option<Identity>,
}

impl<R: CommandRunner, A: AddressLookup> IdentityRotator<R, A> {
    pub fn new(runner: R, lookup: A, config: RotationConfig) -> Self {
        Self {
            runner,
            lookup,
            config,
            active: None,
        }
    }

    /// Asks the identity source for every available identity.
    ///
    /// Any failure (spawn error, timeout, non-zero exit) yields an empty list.
    pub async fn list_identities(&self) -> Vec<Identity> {
        info!("Listing available identities via `{}`", self.config.program);
        let output = match self
            .run_action(&self.config.list_args, self.config.list_timeout_secs)
            .await
        {
            Ok(output) => output,
            Err(e) => {
                error!("Could not list identities: {}", e);
                return Vec::new();
            }
        };

        let preview: String = output.stdout.trim().chars().take(LISTING_LOG_PREVIEW).collect();
        debug!("Identity source output: {}", preview);

        let identities = parse_identity_list(&output.stdout, &self.config.excluded_tokens);
        info!("Found {} available identities", identities.len());
        identities
    }

    /// Disconnects, then connects to `identity` and waits for the link to settle.
    pub async fn activate(&mut self, identity: &Identity) -> bool {
        info!("Activating identity {}", identity);

        if let Err(e) = self
            .run_action(&self.config.disconnect_args, self.config.disconnect_timeout_secs)
            .await
        {
            debug!("Pre-connect disconnect reported: {}", e);
        }
        self.active = None;
        tokio::time::sleep(Duration::from_secs(self.config.pre_connect_delay_secs)).await;

        let mut args = self.config.connect_args.clone();
        args.push(identity.as_str().to_string());
        match self.run_action(&args, self.config.connect_timeout_secs).await {
            Ok(_) => {
                info!("Connected to {}", identity);
                self.active = Some(identity.clone());
                tokio::time::sleep(Duration::from_secs(self.config.stabilization_secs)).await;
                if self.config.verify_status {
                    self.log_status().await;
                }
                true
            }
            Err(e) => {
                error!("Failed to activate {}: {}", identity, e);
                false
            }
        }
    }

    /// Drops whatever identity is active. Safe to call when none is.
    pub async fn deactivate(&mut self) -> bool {
        match &self.active {
            Some(identity) => info!("Deactivating identity {}", identity),
            None => debug!("Deactivating (no identity recorded as active)"),
        }

        let outcome = self
            .run_action(&self.config.disconnect_args, self.config.disconnect_timeout_secs)
            .await;
        self.active = None;
        match outcome {
            Ok(_) => {
                tokio::time::sleep(Duration::from_secs(self.config.post_disconnect_delay_secs)).await;
                true
            }
            Err(e) => {
                warn!("Disconnect failed: {}", e);
                false
            }
        }
    }

    pub async fn current_address(&self) -> String {
        self.lookup.current_address().await
    }

    pub fn active(&self) -> Option<&Identity> {
        self.active.as_ref()
    }

    async fn log_status(&self) {
        match self
            .run_action(&self.config.status_args, self.config.disconnect_timeout_secs)
            .await
        {
            Ok(output) => info!("Connection status: {}", output.stdout.trim()),
            Err(e) => debug!("Status check failed: {}", e),
        }
    }

    async fn run_action(&self, args: &[String], timeout_secs: u64) -> Result<CommandOutput, RotationError> {
        self.runner
            .run(&self.config.program, args, Duration::from_secs(timeout_secs))
            .await
            .and_then(CommandOutput::into_success)
    }
}
