use lightmapper_types::api::{LayoutResponse, SaveLayoutRequest};
use lightmapper_types::{FloorplanLayout, LayerId};

use super::*;

/// Per-layer z-order operations persisted by the backend. The POSTs
/// are idempotent and keyed by layer id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZOrderOp {
    BringToFront,
    SendToBack,
    BringForward,
    SendBackward,
}

impl ZOrderOp {
    fn path_segment(&self) -> &'static str {
        match self {
            ZOrderOp::BringToFront => "bring-to-front",
            ZOrderOp::SendToBack => "send-to-back",
            ZOrderOp::BringForward => "bring-forward",
            ZOrderOp::SendBackward => "send-backward",
        }
    }
}

impl ApiClient {
    /// Fetch the saved floorplan layout. `Ok(None)` when nothing has
    /// been saved yet.
    pub async fn get_layout(&self) -> ApiResult<Option<FloorplanLayout>> {
        let url = format!("{}/layout", self.base_url);
        tracing::info!("Fetching layout from: {}", url);

        let response = self
            .with_auth(self.client.get(&url))
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if response.status().as_u16() == 404 {
            return Ok(None);
        }

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            return Err(ApiError::Http(status, text));
        }

        let layout_response: LayoutResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;

        Ok(Some(layout_response.layout))
    }

    /// Persist the floorplan layout blob.
    pub async fn save_layout(&self, layout: &FloorplanLayout) -> ApiResult<()> {
        let url = format!("{}/layout", self.base_url);
        tracing::info!(
            "Saving layout ({} objects) via POST {}",
            layout.objects.len(),
            url
        );

        let request = SaveLayoutRequest {
            layout: layout.clone(),
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

        Ok(())
    }

    /// Persist a z-order change for one layer.
    pub async fn layer_z_order(&self, layer_id: LayerId, op: ZOrderOp) -> ApiResult<()> {
        let url = format!(
            "{}/layers/{}/{}",
            self.base_url,
            layer_id,
            op.path_segment()
        );

        let response = self
            .with_auth(self.client.post(&url))
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            return Err(ApiError::Http(status, text));
        }

        Ok(())
    }
}
