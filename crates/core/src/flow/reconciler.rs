use std::sync::Arc;

use crate::csrf::TokenCodec;
use crate::provider::{ProviderResolver, ResolveError, ResolvedProvider};

use super::{parse_redirect_data, CallbackRequest, CallbackResult, FlowError, Result};

/// Validates the return trip from the provider.
///
/// Missing state and anti-forgery failures are fatal and stop before the
/// provider is contacted. Identity exchange failures are captured in the
/// returned `CallbackResult`.
#[derive(Clone)]
pub struct CallbackReconciler {
    resolver: ProviderResolver,
    codec: Arc<dyn TokenCodec>,
}

impl CallbackReconciler {
    pub fn new(resolver: ProviderResolver, codec: Arc<dyn TokenCodec>) -> Self {
        Self { resolver, codec }
    }

    /// Reconcile the kept and received token halves, then exchange the
    /// callback parameters for an identity.
    ///
    /// The caller clears the kept half from the trusted store afterwards,
    /// whatever the outcome.
    ///
    /// # Errors
    ///
    /// - `Resolve(_)` for a blank or unknown provider key
    /// - `MissingState` when the provider did not echo `state`
    /// - `CsrfValidationFailed` when the halves do not form a minted pair
    /// - `InvalidRedirectData` when the recovered post-login target is not a URI
    #[tracing::instrument(name = "reconcile_callback", skip_all, fields(provider = %request.provider_key))]
    pub async fn reconcile(&self, request: &CallbackRequest) -> Result<CallbackResult> {
        if request.provider_key.trim().is_empty() {
            return Err(ResolveError::MissingProviderKey.into());
        }

        let ResolvedProvider {
            mut settings,
            client,
        } = self.resolver.resolve(
            &request.provider_key,
            &request.current_url,
            &request.callback_url,
            None,
        )?;

        let received = request
            .received_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                tracing::warn!("callback without state parameter");
                FlowError::MissingState
            })?;

        let extra = self
            .codec
            .validate_token(request.kept_token.as_deref(), received)
            .map_err(|e| {
                tracing::warn!(error = %e, "anti-forgery validation failed");
                FlowError::CsrfValidationFailed(e)
            })?;
        settings.state = Some(received.to_string());

        let (identity, failure) = match client.exchange(&settings, &request.params).await {
            Ok(identity) => {
                tracing::debug!(subject = %identity.subject, "identity fetched");
                (Some(identity), None)
            }
            Err(e) => {
                tracing::info!(error = %e, "identity exchange failed");
                (None, Some(e))
            }
        };

        let redirect_url = extra
            .as_deref()
            .map(|data| parse_redirect_data(data, &request.current_url))
            .transpose()?;

        Ok(CallbackResult {
            provider_key: settings.provider_key,
            identity,
            failure,
            redirect_url,
        })
    }
}
