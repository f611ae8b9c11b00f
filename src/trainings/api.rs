use serde_json::Value;

use crate::core::{ApiClient, ApiError, ApiRequest, CachePolicy, RetryConfig};
use crate::trainings::{
    model::{NewTraining, Training, TrainingCreated},
    wire::{TrainingList, TrainingNode, TrainingPayload},
};

pub(super) const BASE_PATH: &str = "/treinamentos";

pub(super) struct CallOptions<'a> {
    pub(super) token: Option<&'a str>,
    pub(super) cache: Option<&'a CachePolicy>,
    pub(super) retry_override: Option<&'a RetryConfig>,
}

impl CallOptions<'_> {
    fn apply(&self, mut req: ApiRequest) -> ApiRequest {
        req = req
            .bearer_opt(self.token)
            .retry_policy(self.retry_override.cloned());
        if let Some(policy) = self.cache {
            req = req.cache(policy.clone());
        }
        req
    }
}

pub(super) async fn list(client: &ApiClient, opts: &CallOptions<'_>) -> Result<Vec<Training>, ApiError> {
    let list: TrainingList = client.request(opts.apply(ApiRequest::get(BASE_PATH))).await?;
    Ok(list.into_nodes().into_iter().map(Training::from).collect())
}

pub(super) async fn get(
    client: &ApiClient,
    id: &str,
    opts: &CallOptions<'_>,
) -> Result<Training, ApiError> {
    let node: TrainingNode = client
        .request(opts.apply(ApiRequest::get(format!("{BASE_PATH}/{id}"))))
        .await?;
    Ok(node.into())
}

pub(super) async fn create(
    client: &ApiClient,
    training: &NewTraining,
    opts: &CallOptions<'_>,
) -> Result<TrainingCreated, ApiError> {
    let req = ApiRequest::post(BASE_PATH).json(&TrainingPayload::from(training))?;
    let created = client.request(opts.apply(req)).await?;
    client.clear_cache(Some(BASE_PATH)).await;
    Ok(created)
}

pub(super) async fn update(
    client: &ApiClient,
    id: &str,
    training: &NewTraining,
    opts: &CallOptions<'_>,
) -> Result<(), ApiError> {
    let req = ApiRequest::put(format!("{BASE_PATH}/{id}")).json(&TrainingPayload::from(training))?;
    let _: Value = client.request_value(opts.apply(req)).await?;
    client.clear_cache(Some(BASE_PATH)).await;
    Ok(())
}

pub(super) async fn delete(client: &ApiClient, id: &str, opts: &CallOptions<'_>) -> Result<(), ApiError> {
    let _: Value = client
        .request_value(opts.apply(ApiRequest::delete(format!("{BASE_PATH}/{id}"))))
        .await?;
    client.clear_cache(Some(BASE_PATH)).await;
    Ok(())
}
