use lightmapper_types::api::AccessTokenResponse;

use super::*;

impl ApiClient {
    /// Fetch a fresh access token for the realtime connection. Called
    /// once per connection attempt; tokens are never cached or
    /// hard-coded in the client.
    pub async fn fetch_access_token(&self) -> ApiResult<String> {
        let url = format!("{}/auth/token", self.base_url);

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

        let token: AccessTokenResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;

        Ok(token.access_token)
    }
}
