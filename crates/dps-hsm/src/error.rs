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

use crate::HsmType;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Operation {operation} is not supported by a {hsm_type} identity")]
    Unsupported {
        operation: &'static str,
        hsm_type: HsmType,
    },
    #[error("No signing key has been imported")]
    NoSigningKey,
    #[error("Invalid key material: {0}")]
    InvalidKey(String),
    #[error("Registration id is unavailable: {0}")]
    RegistrationId(String),
    #[error("Error reading certificate: {0}")]
    Certificate(String),
    #[error("Error signing data: {0}")]
    Signing(String),
}

impl AuthError {
    pub(crate) fn unsupported(operation: &'static str, hsm_type: HsmType) -> AuthError {
        AuthError::Unsupported {
            operation,
            hsm_type,
        }
    }
}
