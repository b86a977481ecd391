//! Test doubles shared by the unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use url::Url;

use crate::provider::{
    denial_from, AuthenticatedIdentity, CallbackParams, ProviderClient, ProviderError,
    ProviderSettings, Result,
};

/// Provider client that records how often it is called.
pub struct StubProvider {
    key: String,
    name: String,
    identifiers: bool,
    exchange_failure: Option<ProviderError>,
    authorize_calls: AtomicUsize,
    exchange_calls: AtomicUsize,
}

impl StubProvider {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            name: key.to_string(),
            identifiers: false,
            exchange_failure: None,
            authorize_calls: AtomicUsize::new(0),
            exchange_calls: AtomicUsize::new(0),
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_identifiers(mut self) -> Self {
        self.identifiers = true;
        self
    }

    pub fn failing_exchange(mut self, error: ProviderError) -> Self {
        self.exchange_failure = Some(error);
        self
    }

    pub fn authorize_calls(&self) -> usize {
        self.authorize_calls.load(Ordering::SeqCst)
    }

    pub fn exchange_calls(&self) -> usize {
        self.exchange_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProviderClient for StubProvider {
    fn key(&self) -> &str {
        &self.key
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn accepts_identifier(&self) -> bool {
        self.identifiers
    }

    async fn authorization_url(&self, settings: &ProviderSettings) -> Result<Url> {
        self.authorize_calls.fetch_add(1, Ordering::SeqCst);

        let state = settings
            .state
            .as_deref()
            .ok_or_else(|| ProviderError::Configuration("state not set".to_string()))?;

        let mut url = Url::parse(&format!("https://{}.idp.example/authorize", self.key))
            .map_err(|e| ProviderError::Configuration(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("state", state)
            .append_pair("redirect_uri", settings.callback_uri.as_str());
        if let Some(identifier) = &settings.identifier {
            url.query_pairs_mut()
                .append_pair("identifier", identifier.as_str());
        }

        Ok(url)
    }

    async fn exchange(
        &self,
        settings: &ProviderSettings,
        params: &CallbackParams,
    ) -> Result<AuthenticatedIdentity> {
        self.exchange_calls.fetch_add(1, Ordering::SeqCst);

        // Real clients bind the token exchange to the validated state.
        if settings.state.as_deref() != params.state() {
            return Err(ProviderError::Configuration(
                "state not carried to exchange".to_string(),
            ));
        }

        if let Some(denied) = denial_from(params) {
            return Err(denied);
        }
        if let Some(failure) = &self.exchange_failure {
            return Err(failure.clone());
        }

        let code = params.code().ok_or(ProviderError::MissingCode)?;
        Ok(AuthenticatedIdentity::new(&self.key, format!("subject-{code}"))
            .with_email("alice@example.com"))
    }
}

/// Initiator and reconciler sharing one codec and a catalog holding `stub`.
pub fn flow_fixture(
    stub: StubProvider,
) -> (
    std::sync::Arc<StubProvider>,
    crate::flow::RedirectInitiator,
    crate::flow::CallbackReconciler,
) {
    use std::sync::Arc;

    use crate::csrf::HmacTokenCodec;
    use crate::flow::{CallbackReconciler, RedirectInitiator};
    use crate::provider::{ProviderCatalog, ProviderResolver};

    let stub = Arc::new(stub);
    let catalog = ProviderCatalog::new().with(stub.clone());
    let resolver = ProviderResolver::new(Arc::new(catalog));
    let codec = Arc::new(HmacTokenCodec::new(&[42u8; 32]).unwrap());

    (
        stub,
        RedirectInitiator::new(resolver.clone(), codec.clone()),
        CallbackReconciler::new(resolver, codec),
    )
}

/// First value of query parameter `name`.
pub fn query_value(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned())
}
