pub use alloy::primitives::Address;

use crate::error::DeployError;

/// Parse an account address from config or the command line.
///
/// The `0x` prefix is optional. All-lowercase and all-uppercase input is
/// taken as-is; mixed case must be a valid EIP-55 checksum.
pub fn parse_address(s: &str) -> Result<Address, DeployError> {
    let trimmed = s.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    let mixed_case = digits.chars().any(|c| c.is_ascii_uppercase())
        && digits.chars().any(|c| c.is_ascii_lowercase());

    let parsed = if mixed_case {
        Address::parse_checksummed(format!("0x{digits}"), None).map_err(|e| e.to_string())
    } else {
        digits.parse::<Address>().map_err(|e| e.to_string())
    };
    parsed.map_err(|e| DeployError::InvalidAddress(format!("{s}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    #[test]
    fn accepts_valid_checksum() {
        let addr = parse_address("0x13c671CD13C3b645A91b5a7dcbf58C10F4E4Fe6e").unwrap();
        assert_eq!(addr, address!("13c671cd13c3b645a91b5a7dcbf58c10f4e4fe6e"));
        assert_eq!(addr.to_string(), "0x13c671CD13C3b645A91b5a7dcbf58C10F4E4Fe6e");
    }

    #[test]
    fn accepts_single_case_without_prefix() {
        let lower = parse_address("7dbcb75a8bc11420d4974af2c575d4d7cafde87c").unwrap();
        let upper = parse_address("0x7DBCB75A8BC11420D4974AF2C575D4D7CAFDE87C").unwrap();
        assert_eq!(lower, upper);
        assert_eq!(lower.to_string(), "0x7dBcb75a8Bc11420d4974AF2C575D4d7cAFdE87C");
    }

    #[test]
    fn rejects_bad_checksum() {
        // Last letter's case flipped.
        let err = parse_address("0x13c671CD13C3b645A91b5a7dcbf58C10F4E4FE6e").unwrap_err();
        assert!(matches!(err, DeployError::InvalidAddress(_)));
    }

    #[test]
    fn rejects_wrong_length_and_non_hex() {
        assert!(parse_address("0x1234").is_err());
        assert!(parse_address("0xzzc671cd13c3b645a91b5a7dcbf58c10f4e4fe6e").is_err());
        assert!(parse_address("").is_err());
    }
}
