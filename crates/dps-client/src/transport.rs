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

// src/transport.rs
// The seam between the registration engine and a wire protocol.
//
// A transport is driven entirely from `ProvisioningClient::do_work`. It
// reports progress back through an `EventSender` handed to it on `open`,
// and while its own work loop runs it borrows an `Exchange` that answers
// service challenges and interprets reply bodies.

use dps_hsm::HsmType;
use tokio::sync::mpsc;

use crate::{HttpProxyOptions, ParseError, RegistrationResponse, TransportError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum Protocol {
    Http,
    Mqtt,
    Amqp,
    AmqpWebSockets,
}

/// Connection and registration progress reported by a transport.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
pub enum TransportStatus {
    Connected,
    Authenticated,
    Unassigned,
    Assigning,
    Assigned,
    Blacklisted,
    Error,
}

/// Terminal outcome of a register / operation status exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportResult {
    Ok {
        assigned_hub: String,
        device_id: String,
        // symmetric key for TPM devices, None for X509
        iothub_key: Option<Vec<u8>>,
    },
    Unauthorized,
    Blacklisted,
    Error(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportEvent {
    Status(TransportStatus),
    Data(TransportResult),
}

/// Handle a transport uses to report back to the client that opened it.
#[derive(Clone, Debug)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<TransportEvent>,
}

impl EventSender {
    pub(crate) fn new(tx: mpsc::UnboundedSender<TransportEvent>) -> EventSender {
        EventSender { tx }
    }

    pub fn status(&self, status: TransportStatus) {
        self.send(TransportEvent::Status(status));
    }

    pub fn data(&self, result: TransportResult) {
        self.send(TransportEvent::Data(result));
    }

    fn send(&self, event: TransportEvent) {
        if let Err(e) = self.tx.send(event) {
            tracing::debug!(event = ?e.0, "Provisioning client is gone, dropping transport event");
        }
    }
}

/// Services the client lends to a transport while its work loop runs.
pub trait Exchange {
    /// Answers a service challenge: `nonce` is the key delivered by the
    /// service, `key_name` the name the token must carry. Returns the SAS
    /// token to present, or None if one can't be produced; the transport
    /// should treat that as a failed submit of the in-flight call.
    fn challenge(&mut self, nonce: &[u8], key_name: &str) -> Option<String>;

    /// Interprets a register / operation status reply body.
    fn parse_reply(&self, body: &str) -> Result<RegistrationResponse, ParseError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TpmKeys<'a> {
    pub endorsement_key: &'a [u8],
    pub storage_root_key: &'a [u8],
}

/// A single connection to the provisioning service over one wire protocol.
///
/// Submitting calls (`register`, `get_operation_status`) must not block:
/// the request is queued and progressed by `do_work`, with the result
/// reported through the `EventSender` given to `open`.
pub trait Transport: Send {
    fn open(
        &mut self,
        registration_id: &str,
        tpm_keys: Option<TpmKeys<'_>>,
        events: EventSender,
    ) -> Result<(), TransportError>;

    fn close(&mut self) -> Result<(), TransportError>;

    fn register(&mut self) -> Result<(), TransportError>;

    fn get_operation_status(&mut self) -> Result<(), TransportError>;

    fn do_work(&mut self, exchange: &mut dyn Exchange);

    fn set_trace(&mut self, enabled: bool) -> Result<(), TransportError>;

    fn set_x509_cert(&mut self, certificate: &str, private_key: &str)
    -> Result<(), TransportError>;

    fn set_trusted_cert(&mut self, certificate: &str) -> Result<(), TransportError>;

    fn set_proxy(&mut self, proxy: &HttpProxyOptions) -> Result<(), TransportError>;
}

/// Creates transports for one wire protocol.
pub trait TransportProvider {
    type Transport: Transport;

    fn protocol(&self) -> Protocol;

    fn create(
        &self,
        uri: &str,
        hsm_type: HsmType,
        scope_id: &str,
        api_version: &str,
    ) -> Result<Self::Transport, TransportError>;
}
