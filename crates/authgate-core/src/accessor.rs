// Identity accessor: read the gate's result back out of the request context

use std::sync::Arc;

use http::Extensions;

use crate::api_key::ApiKeyRecord;
use crate::identity::ResolvedIdentity;

/// Identity attached by the gate, if the request was authenticated
pub fn current_identity(extensions: &Extensions) -> Option<&ResolvedIdentity> {
    extensions.get::<ResolvedIdentity>()
}

/// API-key record of the current request.
///
/// Prefers the record carried by the resolved identity, then a record attached
/// directly to the context. Absent for bearer-token and unauthenticated requests.
pub fn current_api_key(extensions: &Extensions) -> Option<Arc<ApiKeyRecord>> {
    current_identity(extensions)
        .and_then(|identity| identity.api_key().cloned())
        .or_else(|| extensions.get::<Arc<ApiKeyRecord>>().cloned())
}
