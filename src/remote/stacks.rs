//! Stack CRUD operations against the remote stacks endpoint.

use super::*;

// TODO: drop the fixed page size once the backend grows paging cursors.
const LIST_PAGE_SIZE: u32 = 50;

impl StackClient {
    /// Lists stacks, bounded to one fixed-size page. Sends `If-None-Match`
    /// when the caller holds an ETag from a previous listing; a 304 comes
    /// back as `StackListResponse::NotModified`, not as an error.
    pub async fn list_stacks(&self, cached_etag: Option<&str>) -> Result<StackListResponse> {
        let mut req = self
            .client
            .get(self.url(&format!("/list-stacks?maxItems={}", LIST_PAGE_SIZE)))
            .header(reqwest::header::AUTHORIZATION, self.auth());
        if let Some(tag) = cached_etag {
            req = req.header(reqwest::header::IF_NONE_MATCH, tag);
        }
        let resp = req.send().await.context("list stacks")?;

        if resp.status() == reqwest::StatusCode::NOT_MODIFIED {
            log::debug!("list stacks: not modified");
            return Ok(StackListResponse::NotModified);
        }

        let resp = self.ensure_ok(resp, "list stacks").await?;
        let etag = resp
            .headers()
            .get(reqwest::header::ETAG)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let stacks: Vec<Stack> = resp.json().await.context("parse stacks")?;
        log::debug!("list stacks: {} entries", stacks.len());
        Ok(StackListResponse::Updated { stacks, etag })
    }

    pub async fn get_stack(&self, stack_id: &str) -> Result<Stack> {
        let resp = self
            .client
            .get(self.url(&format!("/stacks/{}", stack_id)))
            .header(reqwest::header::AUTHORIZATION, self.auth())
            .send()
            .await
            .context("get stack")?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            anyhow::bail!("stack {} not found", stack_id);
        }

        let stack: Stack = self
            .ensure_ok(resp, "get stack")
            .await?
            .json()
            .await
            .context("parse stack")?;
        Ok(stack)
    }

    pub async fn create_stack(&self, stack: &Stack) -> Result<Stack> {
        let resp = self
            .client
            .post(self.url("/stacks"))
            .header(reqwest::header::AUTHORIZATION, self.auth())
            .json(stack)
            .send()
            .await
            .context("create stack request")?;

        let created: Stack = self
            .ensure_ok(resp, "create stack")
            .await?
            .json()
            .await
            .context("parse created stack")?;
        log::debug!("created stack {:?}", created.id);
        Ok(created)
    }

    pub async fn update_stack(&self, stack_id: &str, stack: &Stack) -> Result<Stack> {
        let resp = self
            .client
            .put(self.url(&format!("/stacks/{}", stack_id)))
            .header(reqwest::header::AUTHORIZATION, self.auth())
            .json(stack)
            .send()
            .await
            .context("update stack request")?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            anyhow::bail!("stack {} not found", stack_id);
        }

        let updated: Stack = self
            .ensure_ok(resp, "update stack")
            .await?
            .json()
            .await
            .context("parse updated stack")?;
        Ok(updated)
    }

    pub async fn delete_stack(&self, stack_id: &str) -> Result<()> {
        let resp = self
            .client
            .delete(self.url(&format!("/stacks/{}", stack_id)))
            .header(reqwest::header::AUTHORIZATION, self.auth())
            .send()
            .await
            .context("delete stack request")?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            anyhow::bail!("stack {} not found", stack_id);
        }

        let _ = self.ensure_ok(resp, "delete stack").await?;
        log::debug!("deleted stack {}", stack_id);
        Ok(())
    }
}
