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

// src/parser.rs
// Interprets register / operation status reply bodies from the service.

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use dps_hsm::HsmType;
use serde_json::Value;

use crate::ParseError;

/// A fully interpreted reply. Every required field of the variant is
/// present; a reply that can't be completed is a [`ParseError`] instead.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegistrationResponse {
    /// The service is challenging the device: sign a token with `auth_key`.
    Unassigned { auth_key: Vec<u8>, key_name: String },
    Assigning {
        operation_id: String,
    },
    Assigned {
        iothub_uri: String,
        device_id: String,
        // only delivered to TPM devices
        auth_key: Option<Vec<u8>>,
    },
    Blacklisted,
    Error {
        status: String,
        error_code: Option<String>,
        error_message: Option<String>,
    },
}

/// Interprets a reply body. Only the fields the reported status needs are
/// read; anything else in the body is ignored whatever its shape.
pub fn parse_registration_response(
    body: &str,
    hsm_type: HsmType,
) -> Result<RegistrationResponse, ParseError> {
    let reply: Value = serde_json::from_str(body)?;
    if !reply.is_object() {
        return Err(ParseError::NotAnObject);
    }

    let status = match reply.get("status") {
        None | Some(Value::Null) => "unassigned".to_string(),
        Some(other) => text(other),
    };

    match status.as_str() {
        "unassigned" => {
            let auth_key = decode_field(
                "authenticationKey",
                required(&reply, "/authenticationKey", "authenticationKey")?,
            )?;
            let key_name = required(&reply, "/keyName", "keyName")?;
            Ok(RegistrationResponse::Unassigned { auth_key, key_name })
        }
        "assigning" => Ok(RegistrationResponse::Assigning {
            operation_id: required(&reply, "/operationId", "operationId")?,
        }),
        "assigned" => {
            if !reply.get("registrationState").is_some_and(Value::is_object) {
                return Err(ParseError::MissingField("registrationState"));
            }
            let iothub_uri = required(
                &reply,
                "/registrationState/assignedHub",
                "registrationState.assignedHub",
            )?;
            let device_id = required(
                &reply,
                "/registrationState/deviceId",
                "registrationState.deviceId",
            )?;
            let auth_key = match hsm_type {
                HsmType::Tpm => {
                    let key = required(
                        &reply,
                        "/registrationState/tpm/authenticationKey",
                        "registrationState.tpm.authenticationKey",
                    )?;
                    Some(decode_field("registrationState.tpm.authenticationKey", key)?)
                }
                HsmType::X509 => None,
            };
            Ok(RegistrationResponse::Assigned {
                iothub_uri,
                device_id,
                auth_key,
            })
        }
        "disabled" | "blacklisted" => Ok(RegistrationResponse::Blacklisted),
        _ => {
            tracing::debug!(%status, body, "Registration reply reported a failure");
            Ok(RegistrationResponse::Error {
                status,
                error_code: reply.pointer("/registrationState/errorCode").map(text),
                error_message: reply.pointer("/registrationState/errorMessage").map(text),
            })
        }
    }
}

// Empty or non-string values count as missing.
fn required(reply: &Value, pointer: &str, field: &'static str) -> Result<String, ParseError> {
    reply
        .pointer(pointer)
        .and_then(Value::as_str)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or(ParseError::MissingField(field))
}

// Strings as-is, anything else as its JSON text.
fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn decode_field(field: &'static str, value: String) -> Result<Vec<u8>, ParseError> {
    BASE64_STANDARD
        .decode(value)
        .map_err(|source| ParseError::InvalidBase64 { field, source })
}
