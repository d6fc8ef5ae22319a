//! Process exit codes for the `errgrade` binary.

pub const PASS: u8 = 0;
pub const FAIL: u8 = 1; // Output scored as a failure (or any suite case failed)
pub const ERROR: u8 = 2; // Unparseable output, errored case, or config/IO error
