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

use std::fmt;

use dps_hsm::{AuthError, AuthProvider, HsmType};

use crate::TpmKeys;

/// Identity material gathered from the auth provider when a registration
/// starts. The variant follows the provider's [`HsmType`].
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    Tpm {
        endorsement_key: Vec<u8>,
        storage_root_key: Vec<u8>,
        // symmetric key installed by the last answered challenge
        imported_session_key: Option<Vec<u8>>,
    },
    X509 {
        certificate: String,
        private_key: String,
    },
}

impl Credential {
    pub fn gather<A: AuthProvider + ?Sized>(auth: &mut A) -> Result<Credential, AuthError> {
        match auth.hsm_type() {
            HsmType::Tpm => Ok(Credential::Tpm {
                endorsement_key: auth.endorsement_key()?,
                storage_root_key: auth.storage_root_key()?,
                imported_session_key: None,
            }),
            HsmType::X509 => Ok(Credential::X509 {
                certificate: auth.certificate()?,
                private_key: auth.alias_key()?,
            }),
        }
    }

    pub fn tpm_keys(&self) -> Option<TpmKeys<'_>> {
        match self {
            Credential::Tpm {
                endorsement_key,
                storage_root_key,
                ..
            } => Some(TpmKeys {
                endorsement_key,
                storage_root_key,
            }),
            Credential::X509 { .. } => None,
        }
    }

    pub(crate) fn record_session_key(&mut self, key: &[u8]) {
        if let Credential::Tpm {
            imported_session_key,
            ..
        } = self
        {
            *imported_session_key = Some(key.to_vec());
        }
    }
}

// Key material stays out of logs.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::Tpm {
                endorsement_key,
                storage_root_key,
                imported_session_key,
            } => f
                .debug_struct("Tpm")
                .field("endorsement_key_len", &endorsement_key.len())
                .field("storage_root_key_len", &storage_root_key.len())
                .field("has_session_key", &imported_session_key.is_some())
                .finish(),
            Credential::X509 { certificate, .. } => f
                .debug_struct("X509")
                .field("certificate", certificate)
                .field("private_key", &"<redacted>")
                .finish(),
        }
    }
}
