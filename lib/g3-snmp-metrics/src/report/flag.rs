/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use crate::ReportError;

/// Get the bit at the 1-based `placement` in a string of '0' and '1' chars.
pub(super) fn flag_stream_value(placement: u32, value: &str) -> Result<f64, ReportError> {
    let flag = (placement as usize)
        .checked_sub(1)
        .and_then(|i| value.as_bytes().get(i));
    match flag {
        Some(b'1') => Ok(1.0),
        Some(_) => Ok(0.0),
        None => Err(ReportError::FlagStreamIndex {
            placement,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placement() {
        assert_eq!(flag_stream_value(1, "0110").unwrap(), 0.0);
        assert_eq!(flag_stream_value(2, "0110").unwrap(), 1.0);
        assert_eq!(flag_stream_value(3, "0110").unwrap(), 1.0);
        assert_eq!(flag_stream_value(4, "0110").unwrap(), 0.0);
        assert_eq!(flag_stream_value(1, "x").unwrap(), 0.0);
    }

    #[test]
    fn out_of_range() {
        assert!(flag_stream_value(5, "0110").is_err());
        assert!(flag_stream_value(0, "0110").is_err());
        assert!(flag_stream_value(1, "").is_err());
    }
}
