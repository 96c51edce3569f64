//! Row to edge conversion.

use shared_types::{strip_hex_prefix, CapacityEdge, U256};

use crate::error::CapacityGraphError;

/// Parse a capacity column.
///
/// Decimal values are truncated at the decimal point, so `"1000.999"` is
/// `1000`. Anything that is not an unsigned integer below 2^256 after
/// truncation is a data integrity error.
pub fn parse_capacity(raw: &str) -> Result<U256, CapacityGraphError> {
    let integral = raw.split_once('.').map_or(raw, |(integral, _)| integral);
    if integral.is_empty() {
        return Err(CapacityGraphError::DataIntegrity(format!(
            "Couldn't parse string '{raw}' as an integer capacity"
        )));
    }
    U256::from_dec_str(integral).map_err(|_| {
        CapacityGraphError::DataIntegrity(format!(
            "Couldn't parse string '{raw}' as an unsigned 256-bit capacity"
        ))
    })
}

/// Drop the `0x` prefix of an account identifier.
pub fn normalize_identifier(raw: &str) -> Result<String, CapacityGraphError> {
    strip_hex_prefix(raw)
        .map(str::to_owned)
        .map_err(|e| CapacityGraphError::DataIntegrity(e.to_string()))
}

/// Build an edge from the four text columns of a change row.
pub fn edge_from_columns(
    sender: &str,
    receiver: &str,
    token_owner: &str,
    capacity: &str,
) -> Result<CapacityEdge, CapacityGraphError> {
    Ok(CapacityEdge {
        sender: normalize_identifier(sender)?,
        receiver: normalize_identifier(receiver)?,
        token_owner: normalize_identifier(token_owner)?,
        capacity: parse_capacity(capacity)?,
    })
}
