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

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use data_encoding::BASE32_NOPAD;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::{AuthError, AuthProvider, HsmType};

type HmacSha256 = Hmac<Sha256>;

/// A software stand-in for a TPM identity.
///
/// It carries the endorsement and storage root key blobs a real TPM would
/// report, and keeps imported symmetric keys in memory instead of sealing
/// them. Useful for development devices and for exercising the TPM
/// provisioning flow without hardware.
#[derive(Debug)]
pub struct EmulatedTpm {
    endorsement_key: Vec<u8>,
    storage_root_key: Vec<u8>,
    registration_id: Option<String>,
    signing_key: Option<Vec<u8>>,
}

impl EmulatedTpm {
    pub fn new(endorsement_key: impl Into<Vec<u8>>, storage_root_key: impl Into<Vec<u8>>) -> Self {
        EmulatedTpm {
            endorsement_key: endorsement_key.into(),
            storage_root_key: storage_root_key.into(),
            registration_id: None,
            signing_key: None,
        }
    }

    pub fn has_signing_key(&self) -> bool {
        self.signing_key.is_some()
    }
}

// The service identifies TPM devices by the unpadded, lowercase base32
// encoding of the SHA-256 digest of their endorsement key.
fn derive_registration_id(endorsement_key: &[u8]) -> String {
    BASE32_NOPAD
        .encode(&Sha256::digest(endorsement_key))
        .to_lowercase()
}

impl AuthProvider for EmulatedTpm {
    fn hsm_type(&self) -> HsmType {
        HsmType::Tpm
    }

    fn registration_id(&mut self) -> Result<String, AuthError> {
        if let Some(registration_id) = &self.registration_id {
            return Ok(registration_id.clone());
        }
        if self.endorsement_key.is_empty() {
            return Err(AuthError::RegistrationId(
                "endorsement key is empty".to_string(),
            ));
        }
        Ok(derive_registration_id(&self.endorsement_key))
    }

    fn set_registration_id(&mut self, registration_id: &str) -> Result<(), AuthError> {
        if registration_id.is_empty() {
            return Err(AuthError::RegistrationId(
                "registration id cannot be empty".to_string(),
            ));
        }
        self.registration_id = Some(registration_id.to_string());
        Ok(())
    }

    fn import_key(&mut self, key: &[u8]) -> Result<(), AuthError> {
        if key.is_empty() {
            return Err(AuthError::InvalidKey("imported key is empty".to_string()));
        }
        tracing::debug!(key_len = key.len(), "Imported symmetric key");
        self.signing_key = Some(key.to_vec());
        Ok(())
    }

    fn construct_sas_token(
        &mut self,
        token_scope: &str,
        key_name: &str,
        expiry: u64,
    ) -> Result<String, AuthError> {
        let key = self.signing_key.as_ref().ok_or(AuthError::NoSigningKey)?;

        let mut mac = HmacSha256::new_from_slice(key)
            .map_err(|e| AuthError::Signing(format!("Error creating HMAC: {}", e)))?;
        mac.update(format!("{}\n{}", token_scope, expiry).as_bytes());
        let signature = BASE64.encode(mac.finalize().into_bytes());

        Ok(format!(
            "SharedAccessSignature sr={}&sig={}&se={}&skn={}",
            token_scope,
            urlencoding::encode(&signature),
            expiry,
            key_name
        ))
    }

    fn endorsement_key(&mut self) -> Result<Vec<u8>, AuthError> {
        if self.endorsement_key.is_empty() {
            return Err(AuthError::InvalidKey("endorsement key is empty".to_string()));
        }
        Ok(self.endorsement_key.clone())
    }

    fn storage_root_key(&mut self) -> Result<Vec<u8>, AuthError> {
        if self.storage_root_key.is_empty() {
            return Err(AuthError::InvalidKey(
                "storage root key is empty".to_string(),
            ));
        }
        Ok(self.storage_root_key.clone())
    }

    fn certificate(&mut self) -> Result<String, AuthError> {
        Err(AuthError::unsupported("certificate", HsmType::Tpm))
    }

    fn alias_key(&mut self) -> Result<String, AuthError> {
        Err(AuthError::unsupported("alias_key", HsmType::Tpm))
    }
}
