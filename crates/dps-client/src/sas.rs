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

// src/sas.rs
// Answers service challenges with a shared access signature.

use dps_hsm::AuthProvider;

/// Challenges answered per registration attempt before the client stops
/// signing.
pub const MAX_CHALLENGES_PER_ATTEMPT: u32 = 3;

/// URL-encoded `{scope_id}/registrations/{registration_id}`.
pub fn token_scope(scope_id: &str, registration_id: &str) -> String {
    urlencoding::encode(&format!("{scope_id}/registrations/{registration_id}")).into_owned()
}

/// Installs `nonce` as the signing key and returns a token for `scope`
/// valid until `expiry` (Unix seconds). None if the provider refuses either
/// step.
pub fn respond_to_challenge<A: AuthProvider + ?Sized>(
    auth: &mut A,
    nonce: &[u8],
    key_name: &str,
    scope: &str,
    expiry: u64,
) -> Option<String> {
    if let Err(e) = auth.import_key(nonce) {
        tracing::error!(error = %e, "Failed to import challenge key");
        return None;
    }
    match auth.construct_sas_token(scope, key_name, expiry) {
        Ok(token) => Some(token),
        Err(e) => {
            tracing::error!(error = %e, "Failed to construct SAS token");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use dps_hsm::{AuthError, EmulatedTpm, MockAuthProvider};
    use mockall::predicate::eq;

    use super::*;

    #[test]
    fn scope_is_encoded() {
        assert_eq!(
            token_scope("0ne00000001", "device-1"),
            "0ne00000001%2Fregistrations%2Fdevice-1"
        );
    }

    #[test]
    fn scope_is_deterministic() {
        assert_eq!(
            token_scope("0ne00000001", "device 1"),
            token_scope("0ne00000001", "device 1")
        );
    }

    #[test]
    fn imports_nonce_before_signing() {
        let mut auth = MockAuthProvider::new();
        let mut seq = mockall::Sequence::new();
        auth.expect_import_key()
            .with(eq(b"nonce".to_vec()))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        auth.expect_construct_sas_token()
            .with(eq("scope"), eq("registration"), eq(1_700_003_600u64))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok("SharedAccessSignature token".to_string()));

        let token = respond_to_challenge(&mut auth, b"nonce", "registration", "scope", 1_700_003_600);
        assert_eq!(token.as_deref(), Some("SharedAccessSignature token"));
    }

    #[test]
    fn import_failure_skips_signing() {
        let mut auth = MockAuthProvider::new();
        auth.expect_import_key()
            .returning(|_| Err(AuthError::InvalidKey("empty key".to_string())));
        auth.expect_construct_sas_token().never();

        assert!(respond_to_challenge(&mut auth, b"", "registration", "scope", 0).is_none());
    }

    #[test]
    fn signing_failure() {
        let mut auth = MockAuthProvider::new();
        auth.expect_import_key().returning(|_| Ok(()));
        auth.expect_construct_sas_token()
            .returning(|_, _, _| Err(AuthError::NoSigningKey));

        assert!(respond_to_challenge(&mut auth, b"nonce", "registration", "scope", 0).is_none());
    }

    #[test]
    fn emulated_tpm_token() {
        let mut tpm = EmulatedTpm::new(b"ek".to_vec(), b"srk".to_vec());
        let scope = token_scope("0ne00000001", "device-1");
        let token = respond_to_challenge(&mut tpm, b"nonce", "registration", &scope, 1_700_003_600)
            .unwrap();

        assert!(token.starts_with("SharedAccessSignature sr=0ne00000001%2Fregistrations%2Fdevice-1&sig="));
        assert!(token.ends_with("&se=1700003600&skn=registration"));
        assert!(tpm.has_signing_key());
    }
}
