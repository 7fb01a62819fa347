//! Assemble storage clients and the upload chain from configuration.

use std::sync::Arc;

use legajo_core::Config;

use crate::client::ObjectClient;
use crate::rest::RestObjectClient;
use crate::sdk::SdkObjectClient;
use crate::strategy::UploadChain;
use crate::traits::{Authority, Storage, StorageResult};
use crate::ChainedStorage;

/// Build the full storage stack: SDK + REST clients under service authority,
/// optional caller-authority clients from the invoking user's session token,
/// all wired into the standard strategy chain.
pub fn create_storage(
    config: &Config,
    caller_session_token: Option<&str>,
) -> StorageResult<Arc<dyn Storage>> {
    let service_sdk: Arc<dyn ObjectClient> = Arc::new(SdkObjectClient::service(
        config.storage_bucket.clone(),
        config.storage_region.clone(),
        config.storage_endpoint.clone(),
    )?);

    let rest_endpoint = config.storage_endpoint.clone().unwrap_or_else(|| {
        format!(
            "https://{}.s3.{}.amazonaws.com",
            config.storage_bucket, config.storage_region
        )
    });

    let service_rest: Arc<dyn ObjectClient> = Arc::new(RestObjectClient::new(
        rest_endpoint.clone(),
        config.storage_bucket.clone(),
        config.storage_service_token.clone(),
        Authority::Service,
    ));

    let (caller_sdk, caller_rest) = match caller_session_token {
        Some(token) => {
            let sdk: Arc<dyn ObjectClient> = Arc::new(SdkObjectClient::caller(
                config.storage_bucket.clone(),
                config.storage_region.clone(),
                config.storage_endpoint.clone(),
                token.to_string(),
            )?);
            let rest: Arc<dyn ObjectClient> = Arc::new(RestObjectClient::new(
                rest_endpoint,
                config.storage_bucket.clone(),
                Some(token.to_string()),
                Authority::Caller,
            ));
            (Some(sdk), Some(rest))
        }
        None => (None, None),
    };

    let chain = UploadChain::standard(service_sdk.clone(), service_rest, caller_sdk, caller_rest);

    Ok(Arc::new(ChainedStorage::new(chain, service_sdk)))
}
