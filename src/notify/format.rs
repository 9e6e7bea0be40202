use alloy::primitives::{Address, U256};

/// Render a smallest-unit amount as a fixed-point decimal with exactly
/// `places` fractional digits, rounding half up.
pub fn format_native(value: U256, native_decimals: u8, places: usize) -> String {
    let native = native_decimals as usize;
    let one = pow10(native);

    let (whole, frac) = if places >= native {
        let frac = (value % one) * pow10(places - native);
        (value / one, frac)
    } else {
        let step = pow10(native - places);
        let rounded = (value + step / U256::from(2u64)) / step;
        let scale = pow10(places);
        (rounded / scale, rounded % scale)
    };

    if places == 0 {
        return whole.to_string();
    }
    format!("{}.{:0>width$}", whole, frac.to_string(), width = places)
}

fn pow10(exp: usize) -> U256 {
    U256::from(10u64).pow(U256::from(exp))
}

/// The one-line report sent after a successful funding.
pub fn funding_summary(
    to: Address,
    amount: U256,
    native_decimals: u8,
    places: usize,
    symbol: &str,
) -> String {
    format!(
        "Funded - To: {} Value: {} {}",
        to,
        format_native(amount, native_decimals, places),
        symbol
    )
}
