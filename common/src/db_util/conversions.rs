//! Safe-ish conversions between rust and sql types.

pub fn i32_to_u32(i: i32) -> Result<u32, String> {
    u32::try_from(i).map_err(|_| format!("i32 value {i} is negative and cannot be converted to u32"))
}
pub fn u32_to_i32(i: u32) -> Result<i32, String> {
    i32::try_from(i).map_err(|_| format!("u32 value {i} exceeds i32::MAX and cannot be converted to i32"))
}

pub fn i16_to_u8(i: i16) -> Result<u8, String> {
    u8::try_from(i).map_err(|_| format!("i16 value {i} is out of range for u8"))
}
pub fn u8_to_i16(i: u8) -> i16 {
    i16::from(i)
}

pub fn slot_from_index(index: usize) -> Result<i16, String> {
    i16::try_from(index + 1).map_err(|_| format!("fixture index {index} is out of range for a slot"))
}
