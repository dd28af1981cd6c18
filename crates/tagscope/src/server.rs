//! MCP (Model Context Protocol) server implementation.
//!
//! Exposes phrase extraction and dataset scanning over stdio so assistants
//! can inspect caption datasets without shelling out to the CLI.
//!
//! Each `#[tool]` method is a thin wrapper: it validates parameters, calls
//! into `tagscope_core`, and serializes the result as JSON text content.

use camino::Utf8PathBuf;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo};
use rmcp::schemars;
use rmcp::{ErrorData as McpError, ServerHandler, tool, tool_handler, tool_router};
use serde::Serialize;

use tagscope_core::dataset::{DatasetItem, DatasetSummary};
use tagscope_core::{Config, Dataset, PhraseOptions, PhraseRecord, TextDocument, segment};

/// Parameters for the `get_info` tool.
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct GetInfoParams {
    /// Output format: "text" or "json"
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_format() -> String {
    "text".to_string()
}

/// Phrase bounds shared by the extraction tools. Unset fields use the
/// server's configured defaults.
#[derive(Debug, Default, serde::Deserialize, schemars::JsonSchema)]
pub struct PhraseParams {
    /// Shortest phrase, in characters.
    pub min_len: Option<usize>,
    /// Longest phrase, in characters.
    pub max_len: Option<usize>,
    /// Captions a phrase must appear in.
    pub min_documents: Option<usize>,
    /// Maximum phrases returned.
    pub limit: Option<usize>,
}

/// Parameters for the `common_phrases` tool.
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct CommonPhrasesParams {
    /// Caption texts, one per document.
    pub documents: Vec<String>,
    /// Extraction bounds.
    #[serde(flatten)]
    pub options: PhraseParams,
}

/// Parameters for the `segment_text` tool.
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct SegmentTextParams {
    /// Caption text to segment.
    pub text: String,
    /// Shortest substring, in characters (default 2).
    pub min_len: Option<usize>,
    /// Longest substring, in characters (default 15).
    pub max_len: Option<usize>,
}

/// Parameters for the `scan_dataset` tool.
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct ScanDatasetParams {
    /// Dataset directory.
    pub path: String,
    /// Include every item with its tags in the response.
    #[serde(default)]
    pub include_items: bool,
    /// Extraction bounds.
    #[serde(flatten)]
    pub options: PhraseParams,
}

#[derive(Serialize)]
struct ScanReport<'a> {
    summary: DatasetSummary,
    phrases: Vec<PhraseRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    items: Option<&'a [DatasetItem]>,
}

/// MCP server exposing phrase extraction to AI assistants.
#[derive(Clone)]
pub struct ProjectServer {
    config: Config,
    tool_router: rmcp::handler::server::router::tool::ToolRouter<Self>,
}

impl Default for ProjectServer {
    fn default() -> Self {
        Self::new()
    }
}

fn internal(err: impl std::fmt::Display) -> McpError {
    McpError::internal_error(err.to_string(), None)
}

fn to_json<T: Serialize>(value: &T) -> Result<String, McpError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("serialization error: {e}"), None))
}

#[tool_router]
impl ProjectServer {
    /// Create a server using default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create a server whose tools fall back to `config` for unset options.
    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            tool_router: Self::tool_router(),
        }
    }

    fn phrase_options(&self, params: &PhraseParams) -> PhraseOptions {
        let base = self.config.phrase_options();
        PhraseOptions {
            min_len: params.min_len.unwrap_or(base.min_len),
            max_len: params.max_len.unwrap_or(base.max_len),
            min_documents: params.min_documents.unwrap_or(base.min_documents),
            limit: params.limit.unwrap_or(base.limit),
        }
    }

    /// Get project information.
    #[tool(description = "Get project name, version, and description")]
    #[tracing::instrument(skip(self), fields(otel.kind = "server"))]
    fn get_info(
        &self,
        Parameters(params): Parameters<GetInfoParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::debug!(tool = "get_info", format = %params.format, "executing MCP tool");

        let text = if params.format == "json" {
            to_json(&serde_json::json!({
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
                "description": env!("CARGO_PKG_DESCRIPTION"),
            }))?
        } else {
            format!(
                "{} v{}\n{}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION"),
                env!("CARGO_PKG_DESCRIPTION"),
            )
        };

        tracing::info!(tool = "get_info", "MCP tool completed");
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    /// Rank phrases shared across the given captions.
    #[tool(
        description = "Find phrases that appear in at least min_documents of the given captions. Returns [{tag, count}] sorted by count."
    )]
    #[tracing::instrument(skip(self, params), fields(otel.kind = "server", documents = params.documents.len()))]
    fn common_phrases(
        &self,
        Parameters(params): Parameters<CommonPhrasesParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::debug!(tool = "common_phrases", "executing MCP tool");

        let options = self.phrase_options(&params.options);
        let documents: Vec<TextDocument> = params
            .documents
            .into_iter()
            .enumerate()
            .map(|(i, text)| TextDocument::new(i.to_string(), text))
            .collect();
        let phrases = tagscope_core::extract_common_phrases(&documents, &options)
            .map_err(|e| McpError::invalid_params(e.to_string(), None))?;

        tracing::info!(
            tool = "common_phrases",
            phrases = phrases.len(),
            "MCP tool completed"
        );
        Ok(CallToolResult::success(vec![Content::text(to_json(
            &phrases,
        )?)]))
    }

    /// Enumerate the candidate substrings of one caption.
    #[tool(
        description = "List the distinct substrings of a caption that phrase extraction considers, sorted."
    )]
    #[tracing::instrument(skip(self, params), fields(otel.kind = "server"))]
    fn segment_text(
        &self,
        Parameters(params): Parameters<SegmentTextParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::debug!(tool = "segment_text", "executing MCP tool");

        let base = self.config.phrase_options();
        let min_len = params.min_len.unwrap_or(base.min_len);
        let max_len = params.max_len.unwrap_or(base.max_len);
        let mut substrings: Vec<String> = segment::segment(&params.text, min_len, max_len)
            .into_iter()
            .collect();
        substrings.sort();

        tracing::info!(
            tool = "segment_text",
            count = substrings.len(),
            "MCP tool completed"
        );
        Ok(CallToolResult::success(vec![Content::text(to_json(
            &substrings,
        )?)]))
    }

    /// Scan a dataset directory and report its summary and common phrases.
    #[tool(
        description = "Scan an image/video caption dataset directory. Returns item counts and the common phrases across captions."
    )]
    #[tracing::instrument(skip(self, params), fields(otel.kind = "server", path = %params.path))]
    fn scan_dataset(
        &self,
        Parameters(params): Parameters<ScanDatasetParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::debug!(tool = "scan_dataset", "executing MCP tool");

        let options = self.phrase_options(&params.options);
        let root = Utf8PathBuf::from(params.path);
        let dataset = Dataset::scan(&root, &self.config.scan_options()).map_err(internal)?;
        let phrases = dataset
            .common_phrases(&options)
            .map_err(|e| McpError::invalid_params(e.to_string(), None))?;

        let report = ScanReport {
            summary: dataset.summary(),
            phrases,
            items: params.include_items.then(|| dataset.items()),
        };
        let json = to_json(&report)?;

        tracing::info!(
            tool = "scan_dataset",
            items = dataset.len(),
            "MCP tool completed"
        );
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }
}

#[tool_handler]
impl ServerHandler for ProjectServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: Default::default(),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(format!(
                "{} MCP server. Use common_phrases or scan_dataset to find recurring caption tags.",
                env!("CARGO_PKG_NAME"),
            )),
        }
    }
}
