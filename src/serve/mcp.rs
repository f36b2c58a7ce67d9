use super::render_prompt;
use crate::error::SopError;
use crate::resolve::Registry;
use rmcp::model::{
    GetPromptRequestParam, GetPromptResult, Implementation, ListPromptsResult,
    PaginatedRequestParam, Prompt, PromptArgument, PromptMessage, PromptMessageRole,
    ServerCapabilities, ServerInfo,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData as McpError, RoleServer, ServiceExt};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

pub const SERVER_NAME: &str = "agent-sop-prompt-server";
pub const USER_INPUT_ARGUMENT: &str = "user_input";

/// Serves one prompt per registry entry. The registry is fixed for the server's lifetime.
#[derive(Debug, Clone)]
pub struct SopPromptServer {
    registry: Arc<Registry>,
}

impl SopPromptServer {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    pub fn prompts(&self) -> Vec<Prompt> {
        self.registry
            .all()
            .iter()
            .map(|doc| {
                Prompt::new(
                    doc.name.clone(),
                    Some(
                        doc.description
                            .clone()
                            .unwrap_or_else(|| format!("Agent SOP: {}", doc.name)),
                    ),
                    Some(vec![PromptArgument {
                        name: USER_INPUT_ARGUMENT.to_string(),
                        title: None,
                        description: Some("Input for the SOP run".to_string()),
                        required: Some(false),
                    }]),
                )
            })
            .collect()
    }

    /// Render the named prompt; `None` when the name is not registered.
    pub fn render(&self, name: &str, user_input: &str) -> Option<String> {
        self.registry
            .get(name)
            .map(|doc| render_prompt(&doc.name, &doc.content, user_input))
    }
}

impl rmcp::ServerHandler for SopPromptServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(format!(
                "Agent SOP prompt server. {} SOPs are available as prompts.",
                self.registry.len()
            )),
            capabilities: ServerCapabilities::builder().enable_prompts().build(),
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    async fn list_prompts(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListPromptsResult, McpError> {
        Ok(ListPromptsResult {
            next_cursor: None,
            prompts: self.prompts(),
        })
    }

    async fn get_prompt(
        &self,
        request: GetPromptRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<GetPromptResult, McpError> {
        let user_input = request
            .arguments
            .as_ref()
            .and_then(|args| args.get(USER_INPUT_ARGUMENT))
            .and_then(|value| value.as_str())
            .unwrap_or_default();
        debug!(prompt = %request.name, "Prompt requested");

        let text = self.render(&request.name, user_input).ok_or_else(|| {
            McpError::invalid_params(format!("Unknown prompt: {}", request.name), None)
        })?;
        let description = self
            .registry
            .get(&request.name)
            .and_then(|doc| doc.description.clone());

        Ok(GetPromptResult {
            description,
            messages: vec![PromptMessage::new_text(PromptMessageRole::User, text)],
        })
    }
}

/// Serve prompts over stdin/stdout until the client disconnects or `cancel` fires.
pub async fn serve_stdio(registry: Registry, cancel: CancellationToken) -> Result<(), SopError> {
    info!(prompts = registry.len(), "Starting prompt server on stdio");
    let server = SopPromptServer::new(Arc::new(registry));
    let service = server
        .serve_with_ct(rmcp::transport::stdio(), cancel.child_token())
        .await
        .map_err(|e| SopError::ServeError(e.to_string()))?;
    let reason = service
        .waiting()
        .await
        .map_err(|e| SopError::ServeError(e.to_string()))?;
    info!(reason = ?reason, "Prompt server stopped");
    Ok(())
}
