//! Size guards: the cheapest checks in the chain — reject before any
//! expensive work happens.

/// `Ok(())` if `declared_len` is within `max`, else the 413 case.
pub fn check_body_size(declared_len: usize, max: usize) -> Result<(), ()> {
    if declared_len > max {
        Err(())
    } else {
        Ok(())
    }
}

/// `Ok(())` if the sum of header line bytes (`"name: value\r\n"` per
/// header) is within `max`, else the 431 case.
pub fn check_header_bytes(headers: &hyper::HeaderMap, max: usize) -> Result<(), ()> {
    let total: usize = headers
        .iter()
        .map(|(name, value)| name.as_str().len() + value.len() + 4)
        .sum();
    if total > max {
        Err(())
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_within_limit_passes() {
        assert!(check_body_size(100, 1000).is_ok());
    }

    #[test]
    fn body_exceeding_limit_fails() {
        assert!(check_body_size(1001, 1000).is_err());
    }

    #[test]
    fn body_at_exact_limit_passes() {
        assert!(check_body_size(1000, 1000).is_ok());
    }

    #[test]
    fn headers_within_limit_pass() {
        let mut headers = hyper::HeaderMap::new();
        headers.insert("x-a", "short".parse().unwrap());
        assert!(check_header_bytes(&headers, 8192).is_ok());
    }

    #[test]
    fn headers_exceeding_limit_fail() {
        let mut headers = hyper::HeaderMap::new();
        let huge = "x".repeat(9000);
        headers.insert("x-a", huge.parse().unwrap());
        assert!(check_header_bytes(&headers, 8192).is_err());
    }
}
