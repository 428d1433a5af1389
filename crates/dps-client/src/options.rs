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

use serde::{Deserialize, Serialize};

pub const OPTION_TRUSTED_CERT: &str = "TrustedCerts";
pub const OPTION_LOG_TRACE: &str = "logtrace";
pub const OPTION_HTTP_PROXY: &str = "proxy_data";
pub const OPTION_REGISTRATION_ID: &str = "registration_id";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpProxyOptions {
    pub host_address: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Options accepted by [`crate::ProvisioningClient::set_option`].
///
/// Anything the client doesn't know about is carried as `Other` and
/// accepted without effect, so hosts can pass options meant for newer
/// clients without failing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClientOption {
    // PEM bundle of CA certificates the transport should trust
    TrustedCert(String),
    LogTrace(bool),
    HttpProxy(HttpProxyOptions),
    // only settable before a registration starts
    RegistrationId(String),
    Other { name: String },
}

impl ClientOption {
    pub fn name(&self) -> &str {
        match self {
            ClientOption::TrustedCert(_) => OPTION_TRUSTED_CERT,
            ClientOption::LogTrace(_) => OPTION_LOG_TRACE,
            ClientOption::HttpProxy(_) => OPTION_HTTP_PROXY,
            ClientOption::RegistrationId(_) => OPTION_REGISTRATION_ID,
            ClientOption::Other { name } => name,
        }
    }
}
