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

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ProvisioningError;

pub const DEFAULT_GLOBAL_ENDPOINT: &str = "global.azure-devices-provisioning.net";
pub const DEFAULT_API_VERSION: &str = "2017-11-15";
// how long to wait for the transport to connect, or for a reply to a
// register / status call, before giving up on the attempt
pub const DEFAULT_REGISTRATION_TIMEOUT: Duration = Duration::from_secs(60);
// minimum spacing between two operation status polls
pub const DEFAULT_STATUS_POLL_INTERVAL: Duration = Duration::from_secs(2);
pub const DEFAULT_SAS_TOKEN_LIFETIME: Duration = Duration::from_secs(3600);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub global_endpoint: String,
    pub scope_id: String,
    pub api_version: String,
    #[serde(with = "humantime_serde")]
    pub registration_timeout: Duration,
    #[serde(with = "humantime_serde")]
    pub status_poll_interval: Duration,
    #[serde(with = "humantime_serde")]
    pub sas_token_lifetime: Duration,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            global_endpoint: DEFAULT_GLOBAL_ENDPOINT.to_string(),
            scope_id: Default::default(),
            api_version: DEFAULT_API_VERSION.to_string(),
            registration_timeout: DEFAULT_REGISTRATION_TIMEOUT,
            status_poll_interval: DEFAULT_STATUS_POLL_INTERVAL,
            sas_token_lifetime: DEFAULT_SAS_TOKEN_LIFETIME,
        }
    }
}

impl Config {
    pub fn new(global_endpoint: impl Into<String>, scope_id: impl Into<String>) -> Config {
        Config {
            global_endpoint: global_endpoint.into(),
            scope_id: scope_id.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ProvisioningError> {
        if self.global_endpoint.trim().is_empty() {
            return Err(ProvisioningError::InvalidArgument(
                "global_endpoint must be set".to_string(),
            ));
        }
        if self.scope_id.trim().is_empty() {
            return Err(ProvisioningError::InvalidArgument(
                "scope_id must be set".to_string(),
            ));
        }
        if self.api_version.trim().is_empty() {
            return Err(ProvisioningError::InvalidArgument(
                "api_version must be set".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_service_contract() {
        let config = Config::default();
        assert_eq!(config.registration_timeout, Duration::from_secs(60));
        assert_eq!(config.status_poll_interval, Duration::from_secs(2));
        assert_eq!(config.sas_token_lifetime, Duration::from_secs(3600));
        assert_eq!(config.global_endpoint, DEFAULT_GLOBAL_ENDPOINT);
    }

    #[test]
    fn partial_config_fills_in_defaults() {
        let config: Config = serde_json::from_str(
            r#"{"scope_id": "0ne00000001", "registration_timeout": "90s"}"#,
        )
        .unwrap();

        assert_eq!(config.scope_id, "0ne00000001");
        assert_eq!(config.registration_timeout, Duration::from_secs(90));
        assert_eq!(config.status_poll_interval, DEFAULT_STATUS_POLL_INTERVAL);
        assert_eq!(config.api_version, DEFAULT_API_VERSION);
        config.validate().unwrap();
    }

    #[test]
    fn missing_scope_is_rejected() {
        let err = Config::default().validate().unwrap_err();
        assert!(matches!(err, ProvisioningError::InvalidArgument(_)));

        let err = Config::new(" ", "scope").validate().unwrap_err();
        assert!(matches!(err, ProvisioningError::InvalidArgument(_)));
    }
}
