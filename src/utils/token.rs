//! Conversions between whole token units and raw on-chain amounts.

/// Converts a whole-unit amount to raw units for a mint with `decimals`.
///
/// Returns `None` when the result does not fit in a `u64`.
///
/// # Example
/// ```
/// use persona_mint::utils::to_raw_token_amount;
///
/// assert_eq!(to_raw_token_amount(50, 6), Some(50_000_000));
/// assert_eq!(to_raw_token_amount(u64::MAX, 1), None);
/// ```
pub fn to_raw_token_amount(whole_units: u64, decimals: u8) -> Option<u64> {
    10u64
        .checked_pow(u32::from(decimals))
        .and_then(|scale| whole_units.checked_mul(scale))
}

/// Formats a raw amount with `decimals` fractional digits, for logs.
pub fn format_token_amount(amount: u64, decimals: u8) -> String {
    if decimals == 0 {
        return amount.to_string();
    }
    let digits = format!("{:0>width$}", amount, width = usize::from(decimals) + 1);
    let (whole, fraction) = digits.split_at(digits.len() - usize::from(decimals));
    format!("{whole}.{fraction}")
}
