//! Memory preload: renders past conversations into model instructions.

use std::fmt::Write as _;
use std::str::FromStr;

use agent_memory::{MemoryEntry, MemoryEvent, MemoryService};
use agent_primitives::{Content, Part};
use agent_tools::{
    FnToolProvider, ParamKind, ParameterSchema, Tool, ToolArgs, ToolError, ToolResult,
};
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::PromptResult;
use crate::request::LlmRequest;

const PREAMBLE: &str = "The following content is from your previous conversations with the user.\n\
They may be useful for answering the user's current query.\n";
const UNKNOWN_FUNCTION: &str = "unknown_function";
const UNKNOWN_MEDIA_TYPE: &str = "unknown type";

/// How much of each event is rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// Only the first part, and only when it is text.
    FirstPart,
    /// Every part joined with spaces; non-text parts become bracketed placeholders.
    #[default]
    AllParts,
}

impl FromStr for RenderMode {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first_part" => Ok(Self::FirstPart),
            "all_parts" => Ok(Self::AllParts),
            _ => Err(ToolError::construction(format!("unknown render mode `{s}`"))),
        }
    }
}

/// Configuration for [`PreloadMemoryTool`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreloadConfig {
    render_mode: RenderMode,
}

impl PreloadConfig {
    /// Creates a configuration using `render_mode`.
    #[must_use]
    pub const fn new(render_mode: RenderMode) -> Self {
        Self { render_mode }
    }

    /// Returns the render mode.
    #[must_use]
    pub const fn render_mode(self) -> RenderMode {
        self.render_mode
    }
}

/// Renders `memories` into a single instruction block.
///
/// Each entry contributes a `Time:` line stamped with its first event, then one
/// `author: text` line per event with renderable content. Entries without
/// events are skipped. Returns `None` when no entry has events.
#[must_use]
pub fn format_memories(memories: &[MemoryEntry], mode: RenderMode) -> Option<String> {
    let mut memory_text = String::new();
    let mut rendered = 0_usize;
    for entry in memories {
        let Some(started_at) = entry.started_at() else {
            continue;
        };
        rendered += 1;
        let _ = writeln!(
            memory_text,
            "Time: {}",
            started_at.to_rfc3339_opts(SecondsFormat::Secs, true)
        );
        for event in entry.events() {
            if let Some(line) = render_event(event, mode) {
                let _ = writeln!(memory_text, "{}: {line}", event.author());
            }
        }
    }

    if rendered == 0 {
        return None;
    }
    Some(format!(
        "{PREAMBLE}<PAST_CONVERSATIONS>\n{memory_text}\n</PAST_CONVERSATIONS>\n"
    ))
}

fn render_event(event: &MemoryEvent, mode: RenderMode) -> Option<String> {
    let parts = event.content().map(Content::parts).unwrap_or_default();
    match mode {
        RenderMode::FirstPart => parts.first().and_then(Part::as_text).map(str::to_owned),
        RenderMode::AllParts => {
            let rendered: Vec<String> = parts.iter().filter_map(render_part).collect();
            (!rendered.is_empty()).then(|| rendered.join(" "))
        }
    }
}

fn render_part(part: &Part) -> Option<String> {
    match part {
        Part::Text(text) => (!text.is_empty()).then(|| text.clone()),
        Part::FunctionCall(call) => Some(format!(
            "[Function Call: {}({})]",
            call.name().unwrap_or(UNKNOWN_FUNCTION),
            json_object(call.args())
        )),
        Part::FunctionResponse(response) => Some(format!(
            "[Function Response: {} -> {}]",
            response.name().unwrap_or(UNKNOWN_FUNCTION),
            json_object(response.response())
        )),
        Part::InlineData(blob) => Some(format!(
            "[{} content]",
            blob.mime_type().unwrap_or(UNKNOWN_MEDIA_TYPE)
        )),
    }
}

fn json_object(map: Option<&Map<String, Value>>) -> String {
    map.map_or_else(|| "{}".to_owned(), |map| Value::Object(map.clone()).to_string())
}

/// Injects relevant past conversations into outgoing model requests.
///
/// The tool is never invoked by the model; it only rewrites the request. It
/// implements [`Tool`] so it can be registered and discovered like any other
/// capability.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreloadMemoryTool {
    config: PreloadConfig,
}

impl PreloadMemoryTool {
    /// Declared name and description of the tool.
    pub const NAME: &'static str = "preload_memory";

    /// Creates the tool with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the tool with the supplied configuration.
    #[must_use]
    pub const fn with_config(config: PreloadConfig) -> Self {
        Self { config }
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> PreloadConfig {
        self.config
    }

    /// Returns a provider that builds this tool, for registration.
    ///
    /// The provider accepts an optional `render_mode` argument
    /// (`"first_part"` or `"all_parts"`).
    #[must_use]
    pub fn provider() -> FnToolProvider {
        FnToolProvider::new(
            "PreloadMemoryTool",
            ParameterSchema::new().optional("render_mode", ParamKind::String),
            |args: &ToolArgs| -> ToolResult<Box<dyn Tool>> {
                let render_mode = match args.get("render_mode") {
                    Some(_) => args.string("render_mode")?.parse()?,
                    None => RenderMode::default(),
                };
                Ok(Box::new(Self::with_config(PreloadConfig::new(render_mode))))
            },
        )
    }

    /// Searches `memory` with the user's turn and appends the rendered
    /// memories to `request`.
    ///
    /// The first part of `user_content` is the query; when it is not text the
    /// memory service is not consulted. Returns `true` when an instruction was
    /// appended.
    ///
    /// # Errors
    ///
    /// Returns [`PromptError::Memory`](crate::PromptError::Memory) when the
    /// memory search fails.
    pub async fn process_llm_request(
        &self,
        user_content: &Content,
        memory: &dyn MemoryService,
        request: &mut LlmRequest,
    ) -> PromptResult<bool> {
        let Some(query) = user_content.first_text() else {
            debug!("user turn has no leading text; skipping memory preload");
            return Ok(false);
        };

        let response = memory.search_memory(query).await?;
        let Some(instruction) = format_memories(response.memories(), self.config.render_mode)
        else {
            debug!("no memories matched the user turn");
            return Ok(false);
        };

        debug!(
            memories = response.memories().len(),
            "preloading memories into request"
        );
        request.append_instructions([instruction]);
        Ok(true)
    }
}

impl Tool for PreloadMemoryTool {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        Self::NAME
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use agent_memory::{MemoryError, MemoryResult, SearchMemoryResponse};
    use agent_primitives::{Blob, FunctionCall, FunctionResponse};
    use agent_tools::ToolProvider;
    use async_trait::async_trait;
    use bytes::Bytes;
    use chrono::{TimeZone, Utc};

    use super::*;

    struct RecordingMemory {
        memories: Vec<MemoryEntry>,
        queries: Mutex<Vec<String>>,
    }

    impl RecordingMemory {
        fn new(memories: Vec<MemoryEntry>) -> Self {
            Self {
                memories,
                queries: Mutex::new(Vec::new()),
            }
        }

        fn queries(&self) -> Vec<String> {
            self.queries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MemoryService for RecordingMemory {
        async fn search_memory(&self, query: &str) -> MemoryResult<SearchMemoryResponse> {
            self.queries.lock().unwrap().push(query.to_owned());
            Ok(SearchMemoryResponse::new(self.memories.clone()))
        }

        async fn add_entry(&self, _entry: MemoryEntry) -> MemoryResult<()> {
            Err(MemoryError::backend("read only"))
        }
    }

    struct FailingMemory;

    #[async_trait]
    impl MemoryService for FailingMemory {
        async fn search_memory(&self, _query: &str) -> MemoryResult<SearchMemoryResponse> {
            Err(MemoryError::backend("index offline"))
        }

        async fn add_entry(&self, _entry: MemoryEntry) -> MemoryResult<()> {
            Ok(())
        }
    }

    fn event(author: &str, parts: Vec<Part>) -> MemoryEvent {
        MemoryEvent::builder(author)
            .timestamp(Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap())
            .content(Content::new(parts))
            .build()
            .unwrap()
    }

    fn conversation() -> MemoryEntry {
        let mut args = Map::new();
        args.insert("a".to_owned(), Value::from(1));
        MemoryEntry::new(vec![
            event("user", vec![Part::text("This is a text message")]),
            event(
                "assistant",
                vec![
                    Part::text("First part of assistant message."),
                    Part::text("Second part of assistant message."),
                ],
            ),
            event(
                "tool_user",
                vec![
                    Part::text("Text part before image."),
                    Part::InlineData(Blob::new(
                        "image/png",
                        Bytes::from_static(b"fake_image_data"),
                    )),
                    Part::text("Text part after image."),
                    Part::FunctionCall(FunctionCall::new("some_tool").unwrap().with_args(args)),
                ],
            ),
            event(
                "system",
                vec![Part::InlineData(Blob::new(
                    "application/octet-stream",
                    Bytes::from_static(b"other_data"),
                ))],
            ),
            MemoryEvent::builder("empty_user").build().unwrap(),
        ])
    }

    #[test]
    fn all_parts_mode_renders_every_part() {
        let text = format_memories(&[conversation()], RenderMode::AllParts).unwrap();

        assert!(text.starts_with(PREAMBLE));
        assert!(text.contains("<PAST_CONVERSATIONS>\nTime: 2025-01-02T03:04:05Z\n"));
        assert!(text.contains("user: This is a text message\n"));
        assert!(text.contains(
            "assistant: First part of assistant message. Second part of assistant message.\n"
        ));
        assert!(text.contains(
            "tool_user: Text part before image. [image/png content] Text part after image. \
             [Function Call: some_tool({\"a\":1})]\n"
        ));
        assert!(text.contains("system: [application/octet-stream content]\n"));
        assert!(!text.contains("empty_user:"));
        assert!(!text.contains("fake_image_data"));
        assert!(text.ends_with("\n</PAST_CONVERSATIONS>\n"));
    }

    #[test]
    fn first_part_mode_renders_leading_text_only() {
        let text = format_memories(&[conversation()], RenderMode::FirstPart).unwrap();

        assert!(text.contains("user: This is a text message\n"));
        assert!(text.contains("assistant: First part of assistant message.\n"));
        assert!(text.contains("tool_user: Text part before image.\n"));
        assert!(!text.contains("Second part"));
        assert!(!text.contains("system:"));
        assert!(!text.contains("empty_user:"));
        assert!(!text.contains("some_tool"));
    }

    #[test]
    fn placeholders_cover_missing_metadata() {
        let entry = MemoryEntry::new(vec![event(
            "model",
            vec![
                Part::FunctionCall(FunctionCall::default()),
                Part::FunctionResponse(FunctionResponse::new("lookup").unwrap()),
                Part::InlineData(Blob::default()),
                Part::text(""),
            ],
        )]);
        let text = format_memories(&[entry], RenderMode::AllParts).unwrap();
        assert!(text.contains(
            "model: [Function Call: unknown_function({})] [Function Response: lookup -> {}] \
             [unknown type content]\n"
        ));
    }

    #[test]
    fn entries_without_events_are_skipped() {
        assert_eq!(format_memories(&[], RenderMode::AllParts), None);

        let empty = MemoryEntry::new(Vec::new());
        assert_eq!(format_memories(&[empty.clone()], RenderMode::AllParts), None);

        let text = format_memories(&[empty, conversation()], RenderMode::AllParts).unwrap();
        assert_eq!(text.matches("Time:").count(), 1);
    }

    #[tokio::test]
    async fn eventless_memories_leave_request_untouched() {
        let memory = RecordingMemory::new(vec![MemoryEntry::new(Vec::new())]);
        let mut request = LlmRequest::new();

        let appended = PreloadMemoryTool::new()
            .process_llm_request(&Content::user_text("hello"), &memory, &mut request)
            .await
            .unwrap();

        assert!(!appended);
        assert_eq!(memory.queries(), ["hello"]);
        assert!(request.instructions().is_empty());
    }

    #[tokio::test]
    async fn appends_instruction_for_matching_memories() {
        let memory = RecordingMemory::new(vec![conversation()]);
        let mut request = LlmRequest::new();

        let appended = PreloadMemoryTool::new()
            .process_llm_request(&Content::user_text("test query"), &memory, &mut request)
            .await
            .unwrap();

        assert!(appended);
        assert_eq!(memory.queries(), ["test query"]);
        assert_eq!(request.instructions().len(), 1);
        assert!(request.instructions()[0].contains("user: This is a text message\n"));
    }

    #[tokio::test]
    async fn skips_turns_without_leading_text() {
        let memory = RecordingMemory::new(vec![conversation()]);
        let mut request = LlmRequest::new();
        let tool = PreloadMemoryTool::new();

        let image_first = Content::new(vec![
            Part::InlineData(Blob::new("image/png", Bytes::new())),
            Part::text("what is this?"),
        ]);
        for content in [Content::default(), image_first] {
            let appended = tool
                .process_llm_request(&content, &memory, &mut request)
                .await
                .unwrap();
            assert!(!appended);
        }

        assert!(memory.queries().is_empty());
        assert!(request.instructions().is_empty());
    }

    #[tokio::test]
    async fn no_memories_leaves_request_untouched() {
        let memory = RecordingMemory::new(Vec::new());
        let mut request = LlmRequest::new();

        let appended = PreloadMemoryTool::new()
            .process_llm_request(&Content::user_text("anything"), &memory, &mut request)
            .await
            .unwrap();

        assert!(!appended);
        assert_eq!(memory.queries(), ["anything"]);
        assert!(request.instructions().is_empty());
    }

    #[tokio::test]
    async fn memory_failures_propagate() {
        let mut request = LlmRequest::new();
        let err = PreloadMemoryTool::new()
            .process_llm_request(&Content::user_text("hello"), &FailingMemory, &mut request)
            .await
            .expect_err("search failure should surface");

        assert!(matches!(err, crate::PromptError::Memory { .. }));
        assert!(request.instructions().is_empty());
    }

    #[test]
    fn provider_builds_configured_tool() {
        let provider = PreloadMemoryTool::provider();
        let tool = provider.try_build_default().unwrap();
        assert_eq!(tool.name(), PreloadMemoryTool::NAME);
        assert_eq!(tool.description(), PreloadMemoryTool::NAME);

        assert!(
            provider
                .build(&ToolArgs::new().with("render_mode", "first_part"))
                .is_ok()
        );
        let err = provider
            .build(&ToolArgs::new().with("render_mode", "verbose"))
            .err()
            .expect("unknown mode should fail");
        assert!(matches!(err, ToolError::Construction { .. }));
        assert_eq!(
            err.to_string(),
            "tool construction failed: unknown render mode `verbose`"
        );
    }
}
