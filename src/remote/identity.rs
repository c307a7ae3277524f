//! Identity resolution for the acting user.

use super::*;

impl StackClient {
    pub async fn whoami(&self) -> Result<WhoAmI> {
        let resp = self
            .client
            .get(self.url("/whoami"))
            .header(reqwest::header::AUTHORIZATION, self.auth())
            .send()
            .await
            .context("whoami")?;
        let w: WhoAmI = self
            .ensure_ok(resp, "whoami")
            .await?
            .json()
            .await
            .context("parse whoami")?;
        Ok(w)
    }
}
