//! Standard exit codes (BSD sysexits.h compatible)

/// Successful termination
pub const OK: i32 = 0;

/// Command reported a failure (default code)
pub const FAILURE: i32 = 1;

/// Command line usage error
pub const USAGE: i32 = 64;

/// Internal software error (unexpected runtime error in a command)
pub const SOFTWARE: i32 = 70;

/// Configuration error (application failed to start)
pub const CONFIG: i32 = 78;

/// Command name not registered
pub const UNKNOWN_COMMAND: i32 = 127;

/// Codes the host reports on its own behalf.
const RESERVED: [i32; 5] = [OK, USAGE, SOFTWARE, CONFIG, UNKNOWN_COMMAND];

/// Exit code for a command-reported failure.
///
/// Anything a process cannot carry (outside `1..=255`) or that the host
/// reserves for its own failure classes becomes [`FAILURE`].
pub fn command_failure(code: i32) -> i32 {
    if (1..=255).contains(&code) && !RESERVED.contains(&code) {
        code
    } else {
        FAILURE
    }
}
