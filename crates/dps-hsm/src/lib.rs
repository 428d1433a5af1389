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

// src/lib.rs
// Device identity providers used by the provisioning client. The client
// only ever talks to an `AuthProvider`; the types here are the software
// identities shipped alongside it.

mod error;
mod provider;
mod tpm;
mod x509;

pub use error::AuthError;
pub use provider::{AuthProvider, HsmType, MockAuthProvider};
pub use tpm::EmulatedTpm;
pub use x509::X509Identity;
