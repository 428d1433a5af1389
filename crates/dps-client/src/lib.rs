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

// src/lib.rs
// Device provisioning client: registers a device identity with the
// provisioning service and resolves the hub it has been assigned to.
//
// The host drives everything through `ProvisioningClient::do_work`; the
// client owns no threads and never blocks on the network itself.

mod client;
mod clock;
mod config;
mod credential;
mod error;
mod options;
mod parser;
mod retry;
mod sas;
mod transport;

pub use client::{
    CompletionCallback, DeviceAssignment, ProvisioningClient, RegistrationState,
    RegistrationStatus, StatusCallback, version_string,
};
pub use clock::{MonotonicClock, TickCounter};
pub use config::{
    Config, DEFAULT_API_VERSION, DEFAULT_GLOBAL_ENDPOINT, DEFAULT_REGISTRATION_TIMEOUT,
    DEFAULT_SAS_TOKEN_LIFETIME, DEFAULT_STATUS_POLL_INTERVAL,
};
pub use credential::Credential;
// re-exported so hosts only need a single dependency
pub use dps_hsm::{AuthError, AuthProvider, EmulatedTpm, HsmType, X509Identity};
pub use error::{ErrorReason, ParseError, ProvisioningError, TransportError};
pub use options::{
    ClientOption, HttpProxyOptions, OPTION_HTTP_PROXY, OPTION_LOG_TRACE, OPTION_REGISTRATION_ID,
    OPTION_TRUSTED_CERT,
};
pub use parser::{RegistrationResponse, parse_registration_response};
pub use retry::{DEFAULT_RETRY_AFTER, parse_retry_after};
pub use sas::{MAX_CHALLENGES_PER_ATTEMPT, respond_to_challenge, token_scope};
pub use transport::{
    EventSender, Exchange, Protocol, TpmKeys, Transport, TransportEvent, TransportProvider,
    TransportResult, TransportStatus,
};
