/*
 * SPDX-FileCopyrightText: Copyright (c) 2025 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
 * SPDX-License-Identifier: LicenseRef-NvidiaProprietary
 *
 * NVIDIA CORPORATION, its affiliates and licensors retain all intellectual
 * property and proprietary rights in and to this material, related
 * documentation and any modifications thereto. Any use, reproduction,
 * disclosure or distribution of this material and related documentation
 * without an express license agreement from NVIDIA CORPORATION or
 * its affiliates is strictly prohibited.
 */

// src/client.rs
// The registration engine: a single-session state machine advanced by
// the host calling `do_work`.

use std::time::Duration;

use dps_hsm::{AuthProvider, HsmType};
use tokio::sync::mpsc;

use crate::clock::unix_now;
use crate::sas::{MAX_CHALLENGES_PER_ATTEMPT, respond_to_challenge, token_scope};
use crate::{
    ClientOption, Config, Credential, ErrorReason, EventSender, Exchange, MonotonicClock,
    ParseError, ProvisioningError, RegistrationResponse, TickCounter, Transport, TransportEvent,
    TransportProvider, TransportResult, TransportStatus, parse_registration_response,
};

/// Where the current registration attempt stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum RegistrationState {
    Ready,
    RegisterSend,
    RegisterSent,
    StatusSend,
    StatusSent,
    Error,
}

/// Progress notifications delivered to the optional status callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
pub enum RegistrationStatus {
    Connected,
    Registering,
    Assigning,
}

/// The hub a device has been assigned to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceAssignment {
    pub iothub_uri: String,
    pub device_id: String,
}

/// Invoked exactly once when a registration attempt ends.
pub type CompletionCallback = Box<dyn FnOnce(Result<DeviceAssignment, ErrorReason>) + Send>;
pub type StatusCallback = Box<dyn FnMut(RegistrationStatus) + Send>;

pub fn version_string() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

// The parts of a session a transport may reach into while it works:
// challenge answering needs the auth provider, parsing needs the HSM type.
struct Session<A> {
    auth: A,
    hsm_type: HsmType,
    scope_id: String,
    sas_token_lifetime: Duration,
    registration_id: Option<String>,
    credential: Option<Credential>,
    auth_attempts_made: u32,
}

impl<A: AuthProvider> Exchange for Session<A> {
    fn challenge(&mut self, nonce: &[u8], key_name: &str) -> Option<String> {
        if self.auth_attempts_made >= MAX_CHALLENGES_PER_ATTEMPT {
            tracing::warn!(
                attempts = self.auth_attempts_made,
                "Too many challenges in one registration attempt, refusing to sign"
            );
            return None;
        }
        self.auth_attempts_made += 1;

        let Some(registration_id) = self.registration_id.as_deref() else {
            tracing::error!("Challenge received without a registration id");
            return None;
        };
        let scope = token_scope(&self.scope_id, registration_id);
        let expiry = unix_now() + self.sas_token_lifetime.as_secs();

        let token = respond_to_challenge(&mut self.auth, nonce, key_name, &scope, expiry)?;
        if let Some(credential) = self.credential.as_mut() {
            credential.record_session_key(nonce);
        }
        Some(token)
    }

    fn parse_reply(&self, body: &str) -> Result<RegistrationResponse, ParseError> {
        parse_registration_response(body, self.hsm_type)
    }
}

/// Registers one device identity with the provisioning service.
///
/// Nothing happens on the network until [`ProvisioningClient::register`] is
/// called, and after that only inside [`ProvisioningClient::do_work`]. The
/// outcome of each attempt is delivered once through the completion
/// callback, after which the client is `Ready` for another attempt.
pub struct ProvisioningClient<T: Transport, A: AuthProvider> {
    config: Config,
    transport: T,
    transport_open: bool,
    session: Session<A>,
    clock: Box<dyn TickCounter>,
    events: Option<mpsc::UnboundedReceiver<TransportEvent>>,
    state: RegistrationState,
    user_supplied_id: bool,
    is_connected: bool,
    timeout_value: u64,
    status_throttle: Option<u64>,
    error_reason: Option<ErrorReason>,
    on_complete: Option<CompletionCallback>,
    on_status: Option<StatusCallback>,
}

impl<T: Transport, A: AuthProvider> ProvisioningClient<T, A> {
    pub fn create<P>(config: Config, provider: &P, auth: A) -> Result<Self, ProvisioningError>
    where
        P: TransportProvider<Transport = T>,
    {
        config.validate()?;
        let hsm_type = auth.hsm_type();
        let transport = provider.create(
            &config.global_endpoint,
            hsm_type,
            &config.scope_id,
            &config.api_version,
        )?;
        tracing::info!(
            protocol = %provider.protocol(),
            hsm_type = %hsm_type,
            scope_id = %config.scope_id,
            "Created provisioning client"
        );

        Ok(ProvisioningClient {
            session: Session {
                auth,
                hsm_type,
                scope_id: config.scope_id.clone(),
                sas_token_lifetime: config.sas_token_lifetime,
                registration_id: None,
                credential: None,
                auth_attempts_made: 0,
            },
            config,
            transport,
            transport_open: false,
            clock: Box::new(MonotonicClock::new()),
            events: None,
            state: RegistrationState::Ready,
            user_supplied_id: false,
            is_connected: false,
            timeout_value: 0,
            status_throttle: None,
            error_reason: None,
            on_complete: None,
            on_status: None,
        })
    }

    /// Replaces the tick source used for timeouts and status throttling.
    pub fn with_clock(mut self, clock: impl TickCounter + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Starts a registration attempt. Failures here are returned directly
    /// and leave the client `Ready`; the completion callback is only kept
    /// once the transport has been opened.
    pub fn register(
        &mut self,
        on_complete: CompletionCallback,
        on_status: Option<StatusCallback>,
    ) -> Result<(), ProvisioningError> {
        if self.state != RegistrationState::Ready {
            tracing::error!(state = %self.state, "Registration already in progress");
            return Err(ProvisioningError::InvalidState(self.state));
        }

        if let Err(e) = self.open_session() {
            tracing::error!(error = %e, "Failed to start registration");
            if !self.user_supplied_id {
                self.session.registration_id = None;
            }
            self.session.credential = None;
            self.events = None;
            return Err(e);
        }

        self.on_complete = Some(on_complete);
        self.on_status = on_status;
        self.timeout_value = self.clock.now_ms();
        self.state = RegistrationState::RegisterSend;
        tracing::info!(
            registration_id = self.session.registration_id.as_deref().unwrap_or_default(),
            "Registration started"
        );
        Ok(())
    }

    fn open_session(&mut self) -> Result<(), ProvisioningError> {
        let registration_id = match &self.session.registration_id {
            Some(id) => id.clone(),
            None => {
                let id = self.session.auth.registration_id()?;
                self.session.registration_id = Some(id.clone());
                id
            }
        };

        let credential = Credential::gather(&mut self.session.auth)?;
        if let Credential::X509 {
            certificate,
            private_key,
        } = &credential
        {
            self.transport.set_x509_cert(certificate, private_key)?;
        }

        let (tx, rx) = mpsc::unbounded_channel();
        self.transport
            .open(&registration_id, credential.tpm_keys(), EventSender::new(tx))?;
        self.transport_open = true;
        self.events = Some(rx);
        self.session.credential = Some(credential);
        Ok(())
    }

    /// Advances the session by one tick: pumps the transport, applies
    /// whatever it reported, then runs the state machine.
    pub fn do_work(&mut self) {
        self.transport.do_work(&mut self.session);
        self.drain_events();

        if self.is_connected || self.state == RegistrationState::Error {
            self.step();
        } else if self.state != RegistrationState::Ready && self.timed_out() {
            tracing::error!(state = %self.state, "Timed out connecting to the provisioning service");
            self.fail(ErrorReason::Timeout);
        }
    }

    fn step(&mut self) {
        match self.state {
            RegistrationState::Ready => {}
            RegistrationState::RegisterSend => match self.transport.register() {
                Ok(()) => {
                    self.timeout_value = self.clock.now_ms();
                    self.set_state(RegistrationState::RegisterSent);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to send registration request");
                    self.fail(ErrorReason::ParsingError);
                }
            },
            RegistrationState::StatusSend => {
                let now = self.clock.now_ms();
                let poll_due = match self.status_throttle {
                    None => true,
                    Some(last) => {
                        now.saturating_sub(last) / 1000 > self.config.status_poll_interval.as_secs()
                    }
                };
                if poll_due {
                    match self.transport.get_operation_status() {
                        Ok(()) => {
                            self.timeout_value = now;
                            self.set_state(RegistrationState::StatusSent);
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "Failed to send operation status request");
                            self.fail(ErrorReason::ParsingError);
                        }
                    }
                    self.status_throttle = Some(now);
                }
            }
            RegistrationState::RegisterSent | RegistrationState::StatusSent => {
                if self.timed_out() {
                    tracing::error!(state = %self.state, "Timed out waiting for the provisioning service");
                    self.fail(ErrorReason::Timeout);
                }
            }
            RegistrationState::Error => {
                let reason = self.error_reason.unwrap_or(ErrorReason::TransportError);
                tracing::warn!(%reason, "Registration failed");
                self.finish(Err(reason));
            }
        }
    }

    fn timed_out(&self) -> bool {
        let elapsed = self.clock.now_ms().saturating_sub(self.timeout_value) / 1000;
        elapsed > self.config.registration_timeout.as_secs()
    }

    fn drain_events(&mut self) {
        let Some(events) = self.events.as_mut() else {
            return;
        };
        let mut pending = Vec::new();
        while let Ok(event) = events.try_recv() {
            pending.push(event);
        }
        for event in pending {
            match event {
                TransportEvent::Status(status) => self.on_transport_status(status),
                TransportEvent::Data(result) => self.on_transport_data(result),
            }
        }
    }

    fn on_transport_status(&mut self, status: TransportStatus) {
        // a pending failure is reported before anything else happens
        if matches!(self.state, RegistrationState::Ready | RegistrationState::Error) {
            tracing::debug!(%status, state = %self.state, "Ignoring transport status");
            return;
        }
        match status {
            TransportStatus::Connected => {
                self.is_connected = true;
                self.notify(RegistrationStatus::Connected);
            }
            TransportStatus::Authenticated => {
                self.set_state(RegistrationState::StatusSend);
            }
            TransportStatus::Unassigned => {
                self.set_state(RegistrationState::StatusSend);
                self.notify(RegistrationStatus::Registering);
            }
            TransportStatus::Assigning => {
                self.set_state(RegistrationState::StatusSend);
                self.notify(RegistrationStatus::Assigning);
            }
            TransportStatus::Assigned | TransportStatus::Blacklisted | TransportStatus::Error => {
                tracing::debug!(%status, "Transport status");
            }
        }
    }

    fn on_transport_data(&mut self, result: TransportResult) {
        if matches!(self.state, RegistrationState::Ready | RegistrationState::Error) {
            tracing::debug!(?result, state = %self.state, "Ignoring transport result");
            return;
        }
        match result {
            TransportResult::Ok {
                assigned_hub,
                device_id,
                iothub_key,
            } => {
                if self.session.hsm_type == HsmType::Tpm {
                    let Some(key) = iothub_key else {
                        tracing::error!("Assignment is missing the hub key");
                        self.fail(ErrorReason::ParsingError);
                        return;
                    };
                    if let Err(e) = self.session.auth.import_key(&key) {
                        tracing::error!(error = %e, "Failed to import the hub key");
                        self.fail(ErrorReason::KeyError);
                        return;
                    }
                }
                tracing::info!(iothub_uri = %assigned_hub, %device_id, "Device assigned");
                self.finish(Ok(DeviceAssignment {
                    iothub_uri: assigned_hub,
                    device_id,
                }));
            }
            TransportResult::Unauthorized => {
                tracing::error!("Provisioning service rejected the device credentials");
                self.fail(ErrorReason::DeviceAuthError);
            }
            TransportResult::Blacklisted => {
                tracing::error!("Device enrollment is disabled");
                self.fail(ErrorReason::Disabled);
            }
            TransportResult::Error(message) => {
                tracing::error!(error = %message, "Failure retrieving data from the provisioning service");
                self.fail(ErrorReason::TransportError);
            }
        }
    }

    fn notify(&mut self, status: RegistrationStatus) {
        if let Some(on_status) = self.on_status.as_mut() {
            on_status(status);
        }
    }

    fn set_state(&mut self, state: RegistrationState) {
        tracing::debug!(from = %self.state, to = %state, "Registration state change");
        self.state = state;
    }

    fn fail(&mut self, reason: ErrorReason) {
        self.error_reason = Some(reason);
        self.set_state(RegistrationState::Error);
    }

    // Ends the attempt: the callback fires once, then everything per-attempt
    // is cleared.
    fn finish(&mut self, outcome: Result<DeviceAssignment, ErrorReason>) {
        let on_complete = self.on_complete.take();
        self.reset();
        if let Some(on_complete) = on_complete {
            on_complete(outcome);
        }
    }

    fn reset(&mut self) {
        self.close_transport();
        self.events = None;
        self.on_status = None;
        self.is_connected = false;
        self.status_throttle = None;
        self.error_reason = None;
        self.session.auth_attempts_made = 0;
        self.session.credential = None;
        if !self.user_supplied_id {
            self.session.registration_id = None;
        }
        self.state = RegistrationState::Ready;
    }

    fn close_transport(&mut self) {
        if !self.transport_open {
            return;
        }
        self.transport_open = false;
        if let Err(e) = self.transport.close() {
            tracing::warn!(error = %e, "Failed to close transport");
        }
    }

    pub fn set_option(&mut self, option: ClientOption) -> Result<(), ProvisioningError> {
        tracing::debug!(option = option.name(), "Setting client option");
        match option {
            ClientOption::TrustedCert(certificate) => {
                self.transport.set_trusted_cert(&certificate)?;
            }
            ClientOption::LogTrace(enabled) => {
                self.transport.set_trace(enabled)?;
            }
            ClientOption::HttpProxy(proxy) => {
                self.transport.set_proxy(&proxy)?;
            }
            ClientOption::RegistrationId(registration_id) => {
                if self.state != RegistrationState::Ready {
                    return Err(ProvisioningError::InvalidState(self.state));
                }
                if registration_id.is_empty() {
                    return Err(ProvisioningError::InvalidArgument(
                        "registration id must not be empty".to_string(),
                    ));
                }
                self.session.auth.set_registration_id(&registration_id)?;
                self.session.registration_id = Some(registration_id);
                self.user_supplied_id = true;
            }
            ClientOption::Other { name } => {
                tracing::debug!(%name, "Ignoring unknown option");
            }
        }
        Ok(())
    }

    pub fn state(&self) -> RegistrationState {
        self.state
    }

    pub fn registration_id(&self) -> Option<&str> {
        self.session.registration_id.as_deref()
    }

    /// Closes the transport and releases the session.
    pub fn destroy(mut self) {
        self.close_transport();
    }
}

impl<T: Transport, A: AuthProvider> Drop for ProvisioningClient<T, A> {
    fn drop(&mut self) {
        self.close_transport();
    }
}
