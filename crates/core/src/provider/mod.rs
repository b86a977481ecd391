mod error;
mod functions;
mod registry;
mod resolver;
mod traits;
mod types;

pub use error::{ProviderError, ResolveError, Result};
pub use functions::{denial_from, normalize_key};
pub use registry::ProviderCatalog;
pub use resolver::{ProviderResolver, ResolvedProvider};
pub use traits::{ProviderClient, ProviderRegistry};
pub use types::{AuthenticatedIdentity, CallbackParams, Identifier, ProviderSettings};
