//! Process exit codes. Scripts rely on these values.

pub const SUCCESS: i32 = 0;
pub const PARSE_FAILED: i32 = 1; // At least one report could not be parsed
pub const INTERNAL_ERROR: i32 = 2; // Bad config or arguments the parser never saw
