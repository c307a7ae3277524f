//! Cached view of the remote stack collection.
//!
//! The repository is the single owner of the client-side stack cache and the
//! single point of contact with the stacks endpoint. A successful fetch swaps
//! the whole collection (ordered list, id index, name registry) in one go;
//! writes never patch the cache, so observing a write requires a re-fetch.

use std::collections::{HashMap, HashSet};

use anyhow::Result;

use crate::model::{Environment, MachineConfig, Recipe, Stack, WorkspaceConfig};
use crate::remote::{StackClient, StackListResponse};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The collection was replaced from a fresh listing.
    Updated,
    /// The backend confirmed the cached collection is still current.
    NotModified,
}

pub struct StackRepository {
    client: StackClient,
    ordered: Vec<Stack>,
    by_id: HashMap<String, usize>,
    used_names: HashSet<String>,
    etag: Option<String>,
}

impl StackRepository {
    pub fn new(client: StackClient) -> Self {
        Self {
            client,
            ordered: Vec::new(),
            by_id: HashMap::new(),
            used_names: HashSet::new(),
            etag: None,
        }
    }

    pub fn client(&self) -> &StackClient {
        &self.client
    }

    /// Re-synchronizes the cache with the backend. On any failure the cache
    /// is left exactly as it was.
    pub async fn fetch_stacks(&mut self) -> Result<FetchOutcome> {
        match self.client.list_stacks(self.etag.as_deref()).await? {
            StackListResponse::Updated { stacks, etag } => {
                self.etag = etag;
                self.replace_collection(stacks);
                Ok(FetchOutcome::Updated)
            }
            StackListResponse::NotModified => Ok(FetchOutcome::NotModified),
        }
    }

    /// Last committed snapshot, in server order. Never triggers a fetch.
    pub fn list(&self) -> &[Stack] {
        &self.ordered
    }

    pub fn get_by_id(&self, stack_id: &str) -> Option<&Stack> {
        self.by_id.get(stack_id).map(|i| &self.ordered[*i])
    }

    pub fn is_unique_name(&self, name: &str) -> bool {
        !self.used_names.contains(name)
    }

    /// Single-stack read, straight through to the backend.
    pub async fn fetch_stack(&self, stack_id: &str) -> Result<Stack> {
        self.client.get_stack(stack_id).await
    }

    /// Creates a stack. The cache is not updated; re-fetch to observe it.
    pub async fn create_stack(&self, stack: &Stack) -> Result<Stack> {
        self.client.create_stack(stack).await
    }

    /// Updates a stack. Same no-cache-update contract as `create_stack`.
    pub async fn update_stack(&self, stack_id: &str, stack: &Stack) -> Result<Stack> {
        self.client.update_stack(stack_id, stack).await
    }

    /// Deletes a stack. Same no-cache-update contract as `create_stack`.
    pub async fn delete_stack(&self, stack_id: &str) -> Result<()> {
        self.client.delete_stack(stack_id).await
    }

    /// Default-populated draft with a name suffixed until it misses the name
    /// registry. Pure local generation; nothing is sent anywhere.
    pub fn stack_template(&self) -> Result<Stack> {
        let mut name;
        loop {
            name = format!("New Stack-{}", random_suffix()?);
            if self.is_unique_name(&name) {
                break;
            }
        }

        let mut machines = HashMap::new();
        machines.insert(
            "dev-machine".to_string(),
            MachineConfig {
                agents: vec![
                    "terminal".to_string(),
                    "exec".to_string(),
                    "ssh".to_string(),
                ],
                servers: HashMap::new(),
                attributes: HashMap::from([(
                    "memory_limit_bytes".to_string(),
                    "2147483648".to_string(),
                )]),
            },
        );
        let mut environments = HashMap::new();
        environments.insert(
            "default".to_string(),
            Environment {
                machines,
                recipe: Recipe {
                    content: "services:\n dev-machine:\n  image: library/ubuntu_jdk8\n"
                        .to_string(),
                    content_type: "application/x-yaml".to_string(),
                    kind: "compose".to_string(),
                },
            },
        );

        Ok(Stack {
            id: None,
            name,
            description: "New Java Stack".to_string(),
            scope: "general".to_string(),
            tags: vec!["Java 1.8".to_string()],
            creator: None,
            components: Vec::new(),
            workspace_config: Some(WorkspaceConfig {
                name: "default".to_string(),
                description: None,
                default_env: "default".to_string(),
                environments,
                projects: Vec::new(),
                commands: Vec::new(),
            }),
            links: None,
        })
    }

    /// Derives a free name from `base`: one random suffix attempt, then an
    /// integer counter appended to the suffixed candidate. Best-effort only;
    /// the backend remains the final arbiter of uniqueness.
    pub fn generate_stack_name(&self, base: &str) -> Result<String> {
        let candidate = format!("{}-{}", base, random_suffix()?);
        Ok(self.disambiguate(candidate))
    }

    fn disambiguate(&self, candidate: String) -> String {
        if !self.used_names.contains(&candidate) {
            return candidate;
        }
        let mut counter = 1u32;
        loop {
            let next = format!("{}{}", candidate, counter);
            if !self.used_names.contains(&next) {
                return next;
            }
            counter += 1;
        }
    }

    pub(crate) fn replace_collection(&mut self, stacks: Vec<Stack>) {
        let mut by_id = HashMap::with_capacity(stacks.len());
        let mut used_names = HashSet::with_capacity(stacks.len());
        for (i, stack) in stacks.iter().enumerate() {
            if let Some(id) = &stack.id {
                by_id.insert(id.clone(), i);
            }
            used_names.insert(stack.name.clone());
        }
        self.by_id = by_id;
        self.used_names = used_names;
        self.ordered = stacks;
    }
}

/// Four lowercase base-36 digits of entropy, zero-padded.
fn random_suffix() -> Result<String> {
    let mut bytes = [0u8; 4];
    getrandom::getrandom(&mut bytes).map_err(|e| anyhow::anyhow!("getrandom: {:?}", e))?;

    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut value = u32::from_le_bytes(bytes) % 36u32.pow(4);
    let mut out = [0u8; 4];
    for slot in out.iter_mut().rev() {
        *slot = DIGITS[(value % 36) as usize];
        value /= 36;
    }
    Ok(String::from_utf8_lossy(&out).into_owned())
}
