use super::*;

impl StackClient {
    /// Turns a non-success response into an error, preferring the backend's
    /// JSON `message` body over the bare status line.
    pub(super) async fn ensure_ok(
        &self,
        resp: reqwest::Response,
        label: &str,
    ) -> Result<reqwest::Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        if status == reqwest::StatusCode::UNAUTHORIZED {
            anyhow::bail!("unauthorized (token invalid or expired; check --token)");
        }
        if status == reqwest::StatusCode::FORBIDDEN {
            anyhow::bail!("forbidden (insufficient permissions for this stack)");
        }

        let body = resp.text().await.unwrap_or_default();
        if let Ok(api_err) = serde_json::from_str::<ApiError>(&body)
            && !api_err.message.is_empty()
        {
            anyhow::bail!("{}: {}", label, api_err.message);
        }
        anyhow::bail!("{} status {}", label, status);
    }

    pub(super) fn auth(&self) -> String {
        format!("Bearer {}", self.remote.token)
    }

    pub(super) fn url(&self, path: &str) -> String {
        format!("{}{}", self.remote.base_url, path)
    }
}
