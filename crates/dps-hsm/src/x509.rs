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

use x509_parser::pem::parse_x509_pem;

use crate::{AuthError, AuthProvider, HsmType};

/// An X509 device identity: a PEM certificate chain and its private key.
///
/// The registration id defaults to the subject common name of the leaf
/// certificate (the first PEM block).
#[derive(Clone, Debug)]
pub struct X509Identity {
    certificate: String,
    private_key: String,
    registration_id: Option<String>,
}

impl X509Identity {
    pub fn new(certificate: impl Into<String>, private_key: impl Into<String>) -> Self {
        X509Identity {
            certificate: certificate.into(),
            private_key: private_key.into(),
            registration_id: None,
        }
    }

    pub fn from_files(
        certificate_path: impl AsRef<std::path::Path>,
        private_key_path: impl AsRef<std::path::Path>,
    ) -> Result<Self, AuthError> {
        let certificate = std::fs::read_to_string(certificate_path.as_ref()).map_err(|e| {
            AuthError::Certificate(format!(
                "Error reading {}: {}",
                certificate_path.as_ref().display(),
                e
            ))
        })?;
        let private_key = std::fs::read_to_string(private_key_path.as_ref()).map_err(|e| {
            AuthError::Certificate(format!(
                "Error reading {}: {}",
                private_key_path.as_ref().display(),
                e
            ))
        })?;
        Ok(X509Identity::new(certificate, private_key))
    }
}

fn common_name(certificate_pem: &str) -> Result<String, AuthError> {
    let (_, pem) = parse_x509_pem(certificate_pem.as_bytes())
        .map_err(|e| AuthError::Certificate(format!("Error decoding PEM: {}", e)))?;
    let cert = pem
        .parse_x509()
        .map_err(|e| AuthError::Certificate(format!("Error parsing certificate: {}", e)))?;

    let cn = cert
        .subject()
        .iter_common_name()
        .next()
        .ok_or_else(|| AuthError::RegistrationId("certificate has no common name".to_string()))?;

    cn.as_str()
        .map(str::to_string)
        .map_err(|e| AuthError::RegistrationId(format!("Error reading common name: {}", e)))
}

impl AuthProvider for X509Identity {
    fn hsm_type(&self) -> HsmType {
        HsmType::X509
    }

    fn registration_id(&mut self) -> Result<String, AuthError> {
        match &self.registration_id {
            Some(registration_id) => Ok(registration_id.clone()),
            None => common_name(&self.certificate),
        }
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

    fn import_key(&mut self, _key: &[u8]) -> Result<(), AuthError> {
        Err(AuthError::unsupported("import_key", HsmType::X509))
    }

    fn construct_sas_token(
        &mut self,
        _token_scope: &str,
        _key_name: &str,
        _expiry: u64,
    ) -> Result<String, AuthError> {
        Err(AuthError::unsupported("construct_sas_token", HsmType::X509))
    }

    fn endorsement_key(&mut self) -> Result<Vec<u8>, AuthError> {
        Err(AuthError::unsupported("endorsement_key", HsmType::X509))
    }

    fn storage_root_key(&mut self) -> Result<Vec<u8>, AuthError> {
        Err(AuthError::unsupported("storage_root_key", HsmType::X509))
    }

    fn certificate(&mut self) -> Result<String, AuthError> {
        if self.certificate.trim().is_empty() {
            return Err(AuthError::Certificate("certificate is empty".to_string()));
        }
        Ok(self.certificate.clone())
    }

    fn alias_key(&mut self) -> Result<String, AuthError> {
        if self.private_key.trim().is_empty() {
            return Err(AuthError::Certificate("private key is empty".to_string()));
        }
        Ok(self.private_key.clone())
    }
}

#[cfg(test)]
mod tests {
    use rcgen::{CertificateParams, DistinguishedName, DnType, KeyPair};

    use super::*;

    fn self_signed(common_name: &str) -> (String, String) {
        let mut params = CertificateParams::new(Vec::<String>::new()).unwrap();
        let mut dn = DistinguishedName::new();
        dn.push(DnType::CommonName, common_name);
        params.distinguished_name = dn;
        let key_pair = KeyPair::generate().unwrap();
        let cert = params.self_signed(&key_pair).unwrap();
        (cert.pem(), key_pair.serialize_pem())
    }

    #[test]
    fn registration_id_comes_from_common_name() {
        let (cert, key) = self_signed("factory-device-42");
        let mut identity = X509Identity::new(cert.clone(), key.clone());

        assert_eq!(identity.hsm_type(), HsmType::X509);
        assert_eq!(identity.registration_id().unwrap(), "factory-device-42");
        assert_eq!(identity.certificate().unwrap(), cert);
        assert_eq!(identity.alias_key().unwrap(), key);
    }

    #[test]
    fn explicit_registration_id_overrides_common_name() {
        let (cert, key) = self_signed("factory-device-42");
        let mut identity = X509Identity::new(cert, key);
        identity.set_registration_id("renamed").unwrap();
        assert_eq!(identity.registration_id().unwrap(), "renamed");
    }

    #[test]
    fn garbage_certificate_has_no_registration_id() {
        let mut identity = X509Identity::new("not a pem", "not a key");
        assert!(matches!(
            identity.registration_id(),
            Err(AuthError::Certificate(_))
        ));
    }

    #[test]
    fn empty_material_is_reported() {
        let mut identity = X509Identity::new("", "");
        assert!(identity.certificate().is_err());
        assert!(identity.alias_key().is_err());
    }

    #[test]
    fn tpm_operations_are_rejected() {
        let (cert, key) = self_signed("dev");
        let mut identity = X509Identity::new(cert, key);
        assert!(identity.import_key(b"key").is_err());
        assert!(identity.endorsement_key().is_err());
        assert!(identity.storage_root_key().is_err());
        assert!(matches!(
            identity.construct_sas_token("scope", "registration", 0),
            Err(AuthError::Unsupported {
                hsm_type: HsmType::X509,
                ..
            })
        ));
    }
}
