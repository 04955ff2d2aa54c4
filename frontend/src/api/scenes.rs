use lightmapper_types::api::{CreateSceneRequest, SceneListResponse, SceneResponse};
use lightmapper_types::{Scene, SceneId};

use super::*;

impl ApiClient {
    /// List all persisted scenes.
    pub async fn list_scenes(&self) -> ApiResult<Vec<Scene>> {
        let url = format!("{}/scenes", self.base_url);
        tracing::info!("Fetching scenes from: {}", url);

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

        let list: SceneListResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;

        tracing::info!("Successfully loaded {} scenes", list.scenes.len());
        Ok(list.scenes)
    }

    /// Create a new scene. The backend assigns the id.
    pub async fn create_scene(&self, scene: &Scene) -> ApiResult<Scene> {
        let url = format!("{}/scenes", self.base_url);
        tracing::info!("Creating scene '{}' via POST {}", scene.name, url);

        let request = CreateSceneRequest {
            name: scene.name.clone(),
            lights: scene.lights.clone(),
        };

        let response = self
            .with_auth(self.client.post(&url).json(&request))
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Network request failed: {}", e);
                ApiError::Network(e.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            tracing::error!("HTTP error {}: {}", status, text);
            return Err(ApiError::Http(status, text));
        }

        let scene_response: SceneResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;

        Ok(scene_response.scene)
    }

    /// Update an existing scene, replacing its light rows.
    pub async fn update_scene(&self, id: SceneId, scene: &Scene) -> ApiResult<Scene> {
        let url = format!("{}/scenes/{}", self.base_url, id);
        tracing::info!(
            "Updating scene {} ('{}', {} lights)",
            id,
            scene.name,
            scene.lights.len()
        );

        let response = self
            .with_auth(self.client.post(&url).json(scene))
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            return Err(ApiError::Http(status, text));
        }

        let scene_response: SceneResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;

        Ok(scene_response.scene)
    }

    /// Delete a scene and its light rows. Deleting a scene that no
    /// longer exists is treated as success.
    pub async fn delete_scene(&self, id: SceneId) -> ApiResult<()> {
        let url = format!("{}/scenes/{}", self.base_url, id);
        let response = self
            .with_auth(self.client.delete(&url))
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if response.status().as_u16() == 404 {
            tracing::warn!("Scene {} already gone", id);
            return Ok(());
        }

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            return Err(ApiError::Http(status, text));
        }

        Ok(())
    }
}
