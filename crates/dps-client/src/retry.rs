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

/// Poll interval used when the service doesn't send a usable Retry-After.
pub const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(2);

/// Interprets a Retry-After header value given in seconds. Anything that
/// doesn't start with an ASCII digit (HTTP dates included) falls back to
/// [`DEFAULT_RETRY_AFTER`].
pub fn parse_retry_after(value: &str) -> Duration {
    let digits: &str = {
        let end = value
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(value.len());
        &value[..end]
    };
    if digits.is_empty() {
        return DEFAULT_RETRY_AFTER;
    }
    match digits.parse::<u64>() {
        Ok(secs) => Duration::from_secs(secs),
        Err(e) => {
            tracing::debug!(value, error = %e, "Unusable Retry-After value");
            DEFAULT_RETRY_AFTER
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_values() {
        assert_eq!(parse_retry_after("7"), Duration::from_secs(7));
        assert_eq!(parse_retry_after("0"), Duration::ZERO);
        assert_eq!(parse_retry_after("30; extra"), Duration::from_secs(30));
    }

    #[test]
    fn non_numeric_values_use_default() {
        assert_eq!(parse_retry_after("abc"), DEFAULT_RETRY_AFTER);
        assert_eq!(parse_retry_after(""), DEFAULT_RETRY_AFTER);
        assert_eq!(parse_retry_after(" 5"), DEFAULT_RETRY_AFTER);
        assert_eq!(
            parse_retry_after("Wed, 21 Oct 2015 07:28:00 GMT"),
            DEFAULT_RETRY_AFTER
        );
    }

    #[test]
    fn overflow_uses_default() {
        assert_eq!(
            parse_retry_after("999999999999999999999999"),
            DEFAULT_RETRY_AFTER
        );
    }
}
