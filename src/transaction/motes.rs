//! Motes → CSPR display conversion (exact decimal shift, no floating point)

use super::TransactionError;

/// 1 CSPR = 10^9 motes
pub const CSPR_DECIMALS: usize = 9;

pub const CSPR_SYMBOL: &str = "CSPR";

/// Convert an integer motes string into `"<amount> CSPR"`
pub fn try_motes_to_cspr(motes: &str) -> Result<String, TransactionError> {
    let digits = motes.trim();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TransactionError::InvalidAmount(motes.to_string()));
    }

    let digits = digits.trim_start_matches('0');
    let padded = format!("{:0>width$}", digits, width = CSPR_DECIMALS + 1);
    let (integer, fractional) = padded.split_at(padded.len() - CSPR_DECIMALS);
    let fractional = fractional.trim_end_matches('0');

    if fractional.is_empty() {
        Ok(format!("{} {}", integer, CSPR_SYMBOL))
    } else {
        Ok(format!("{}.{} {}", integer, fractional, CSPR_SYMBOL))
    }
}

/// Display conversion that never fails: malformed input renders as `"0"`
pub fn motes_to_cspr(motes: &str) -> String {
    match try_motes_to_cspr(motes) {
        Ok(display) => display,
        Err(e) => {
            crate::log_warn!("motes", "Could not convert motes amount", input = motes, error = e);
            "0".to_string()
        }
    }
}
