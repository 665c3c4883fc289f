//! Fingerprint to bound-source routing table.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use sources::{Endpoint, Fingerprint, Source, SourceKind, TokenVerifier};
use tracing::{info, warn};

/// Immutable mapping from route fingerprint to the source bound to it.
///
/// Key loading and source-name validation happen before this is built, so
/// building cannot fail. Two endpoints with the same secret and registry
/// host derive the same fingerprint; the first one keeps the route and the
/// collision is logged.
#[derive(Debug, Default)]
pub struct EndpointRegistry {
    routes: HashMap<Fingerprint, Source>,
}

impl EndpointRegistry {
    /// Binds every endpoint and indexes it by fingerprint.
    ///
    /// `verifier` is shared by all Google Container Registry endpoints.
    pub fn build(
        endpoints: impl IntoIterator<Item = Endpoint>,
        verifier: Arc<dyn TokenVerifier>,
    ) -> Self {
        let mut routes: HashMap<Fingerprint, Source> = HashMap::new();

        for endpoint in endpoints {
            let fingerprint = endpoint.fingerprint();
            let kind = endpoint.kind;
            match routes.entry(fingerprint) {
                Entry::Occupied(existing) => {
                    warn!(
                        fingerprint = %existing.key(),
                        kept = %existing.get().kind(),
                        dropped = %kind,
                        "Endpoints share a fingerprint; keeping the first"
                    );
                }
                Entry::Vacant(slot) => {
                    info!(
                        source = %kind,
                        route = %format_args!("/hook/{}", slot.key()),
                        "Endpoint registered"
                    );
                    slot.insert(Source::bind(endpoint, Arc::clone(&verifier)));
                }
            }
        }

        Self { routes }
    }

    /// Returns the source bound to `fingerprint`.
    pub fn lookup(&self, fingerprint: &Fingerprint) -> Option<&Source> {
        self.routes.get(fingerprint)
    }

    /// Iterates over registered routes and their providers.
    pub fn routes(&self) -> impl Iterator<Item = (&Fingerprint, SourceKind)> {
        self.routes.iter().map(|(fp, source)| (fp, source.kind()))
    }

    /// Number of registered routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns `true` if no routes are registered.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
