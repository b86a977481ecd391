mod error;
mod functions;
mod initiator;
mod reconciler;
mod types;

pub use error::{FlowError, Result};
pub use functions::{
    choose_return_target, is_local_redirect, parse_redirect_data, MAX_RETURN_TARGET_LEN,
};
pub use initiator::RedirectInitiator;
pub use reconciler::CallbackReconciler;
pub use types::{CallbackRequest, CallbackResult, Initiation, LoginRequest};
