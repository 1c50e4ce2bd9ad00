//! Exit status for vizaskctl

use crate::controller::CycleError;
use crate::gateway::GatewayError;
use vizask_shared::HostError;

/// Exit code for success
pub const EXIT_SUCCESS: i32 = 0;

/// Exit code for general errors
pub const EXIT_GENERAL_ERROR: i32 = 1;

/// Exit code for invalid input (empty question, unknown view)
pub const EXIT_USAGE: i32 = 64;

/// Exit code when the backend answers with something that is not JSON
pub const EXIT_INVALID_RESPONSE: i32 = 65;

/// Exit code when the backend cannot be reached
pub const EXIT_BACKEND_UNAVAILABLE: i32 = 70;

pub fn exit_code_for(err: &CycleError) -> i32 {
    match err {
        CycleError::Build(_) => EXIT_USAGE,
        CycleError::Host(HostError::ViewNotFound(_)) => EXIT_USAGE,
        CycleError::Host(HostError::Unavailable(_)) => EXIT_GENERAL_ERROR,
        CycleError::Gateway(GatewayError::Transport(_)) => EXIT_BACKEND_UNAVAILABLE,
        CycleError::Gateway(GatewayError::MalformedResponse(_)) => EXIT_INVALID_RESPONSE,
        CycleError::Gateway(GatewayError::Backend(_)) => EXIT_GENERAL_ERROR,
    }
}
