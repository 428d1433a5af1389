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

use mockall::automock;

use crate::AuthError;

/// The kind of hardware (or emulated) identity backing a device.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum HsmType {
    #[strum(serialize = "TPM")]
    Tpm,
    #[strum(serialize = "X509")]
    X509,
}

/// Key operations the provisioning client needs from the device identity.
///
/// A provider is either TPM-shaped (endorsement and storage root keys,
/// symmetric key import and SAS signing) or X509-shaped (certificate and
/// private key). Operations that don't apply to the provider's
/// [`HsmType`] return [`AuthError::Unsupported`].
#[automock]
pub trait AuthProvider: Send {
    fn hsm_type(&self) -> HsmType;

    /// Returns the registration id, derived from the identity unless one has
    /// been set explicitly.
    fn registration_id(&mut self) -> Result<String, AuthError>;

    fn set_registration_id(&mut self, registration_id: &str) -> Result<(), AuthError>;

    // import_key installs a symmetric key delivered by the service; later
    // SAS tokens are signed with it
    fn import_key(&mut self, key: &[u8]) -> Result<(), AuthError>;

    /// Builds a `SharedAccessSignature` token over an already URL-encoded
    /// scope, valid until `expiry` (Unix seconds).
    fn construct_sas_token(
        &mut self,
        token_scope: &str,
        key_name: &str,
        expiry: u64,
    ) -> Result<String, AuthError>;

    fn endorsement_key(&mut self) -> Result<Vec<u8>, AuthError>;
    fn storage_root_key(&mut self) -> Result<Vec<u8>, AuthError>;

    fn certificate(&mut self) -> Result<String, AuthError>;
    fn alias_key(&mut self) -> Result<String, AuthError>;
}
