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

use dps_hsm::AuthError;

use crate::RegistrationState;

/// Failures returned synchronously by the client's own calls.
///
/// These never produce a later completion callback: when `register` fails
/// the session is left exactly as it was.
#[derive(Debug, thiserror::Error)]
pub enum ProvisioningError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Operation is not allowed while the client is in state {0}")]
    InvalidState(RegistrationState),
    #[error("Auth provider error: {0}")]
    Auth(#[from] AuthError),
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("Transport is not open")]
    NotOpen,
    #[error("Transport rejected the request: {0}")]
    Rejected(String),
    #[error("Transport does not support {0}")]
    Unsupported(&'static str),
    #[error("Error talking to the provisioning service: {0}")]
    Communication(String),
}

/// Failures interpreting a registration reply body.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Error deserializing registration reply: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Registration reply is not a JSON object")]
    NotAnObject,
    #[error("Registration reply is missing {0}")]
    MissingField(&'static str),
    #[error("Field {field} is not valid base64: {source}")]
    InvalidBase64 {
        field: &'static str,
        #[source]
        source: base64::DecodeError,
    },
}

/// Why an in-progress registration ended without an assignment.
///
/// Delivered exactly once through the completion callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum ErrorReason {
    InvalidArgument,
    DeviceAuthError,
    // the service reported the enrollment as disabled / blacklisted
    Disabled,
    KeyError,
    ParsingError,
    TransportError,
    Timeout,
}

impl ErrorReason {
    /// Whether starting a fresh registration may succeed without operator
    /// intervention.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorReason::TransportError | ErrorReason::Timeout | ErrorReason::ParsingError
        )
    }
}
