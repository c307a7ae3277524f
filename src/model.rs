use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A named development-environment template as the stacks API serves it.
///
/// `id`, `creator`, and `links` are assigned by the backend; drafts built
/// locally leave them unset, and serialization skips them so a create payload
/// never carries backend-owned keys.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stack {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub scope: String,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<StackComponent>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_config: Option<WorkspaceConfig>,

    // Opaque hypermedia block; passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<serde_json::Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StackComponent {
    pub name: String,
    pub version: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub default_env: String,
    pub environments: HashMap<String, Environment>,

    #[serde(default)]
    pub projects: Vec<serde_json::Value>,

    #[serde(default)]
    pub commands: Vec<serde_json::Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    pub machines: HashMap<String, MachineConfig>,
    pub recipe: Recipe,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MachineConfig {
    #[serde(default)]
    pub agents: Vec<String>,

    #[serde(default)]
    pub servers: HashMap<String, serde_json::Value>,

    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub content: String,
    pub content_type: String,

    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub base_url: String,
    pub token: String,
}
