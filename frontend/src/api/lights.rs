use lightmapper_types::api::{AreaInfo, AreaListResponse, LightListResponse};
use lightmapper_types::LightState;

use super::*;

impl ApiClient {
    /// List all light entities with their current states.
    pub async fn list_lights(&self) -> ApiResult<Vec<LightState>> {
        let url = format!("{}/lights", self.base_url);
        tracing::info!("Fetching lights from: {}", url);

        let response = self
            .with_auth(self.client.get(&url))
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Network error fetching lights: {}", e);
                ApiError::Network(e.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            tracing::error!("HTTP error {}: {}", status, text);
            return Err(ApiError::Http(status, text));
        }

        let list: LightListResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse light list response: {}", e);
            ApiError::Decode(e.to_string())
        })?;

        tracing::info!("Successfully loaded {} lights", list.lights.len());
        Ok(list.lights)
    }

    /// List areas for grouping entities.
    pub async fn list_areas(&self) -> ApiResult<Vec<AreaInfo>> {
        let url = format!("{}/areas", self.base_url);

        let response = self
            .with_auth(self.client.get(&url))
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            return Err(ApiError::Http(status, text));
        }

        let list: AreaListResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;

        Ok(list.areas)
    }
}
