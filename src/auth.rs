//! OAuth 1.0a credential models and the verifier hand-off state machine.

pub mod credentials;
pub mod verifier;

pub use credentials::*;
pub use verifier::*;
