//! Recompute loop tying editor state to the rendered panels.
//!
//! Edits and language switches are debounced into a [`SourceState`]. When the
//! quiet window elapses, [`Workbench::tick`] parses that state and replaces the
//! [`Rendered`] snapshot (serialized text plus diagram layout). Toggling terse
//! mode or resizing only re-renders the last tree; nothing is re-parsed.

use super::debounce::{Debouncer, DEFAULT_DEBOUNCE};
use super::session::{LanguageBackend, ParserSession};
use crate::graph::{self, GraphNode};
use crate::layout::{self, Layout};
use crate::model::{GrammarLoadError, ShareConfig, SyntaxNode, SyntaxTree};
use crate::serializer::{self, SerializeMode};
use crate::viewport::ViewportController;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Text shown in the serialization panel before any tree exists.
pub const EMPTY_TEXT: &str = "N/A";

/// Default viewport size used for layout until the host reports one.
pub const DEFAULT_VIEWPORT: (f64, f64) = (800.0, 600.0);

/// The inputs a recompute is derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceState {
    /// Grammar id.
    pub language: String,
    /// Source text.
    pub code: String,
}

/// Output of the last successful recompute.
#[derive(Debug, Clone)]
pub struct Rendered {
    /// State the tree was parsed from.
    pub state: SourceState,
    /// Pretty-printed serialization.
    pub text: String,
    /// Positioned diagram.
    pub layout: Layout,
}

/// What a call to [`Workbench::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No state was ready.
    Idle,
    /// A new snapshot replaced the previous one.
    Rendered,
    /// The result belonged to a state that is no longer current and was dropped.
    Discarded,
}

/// Editor state, the parser session and the latest rendering.
pub struct Workbench<B: LanguageBackend> {
    session: ParserSession<B>,
    debouncer: Debouncer<SourceState>,
    language: String,
    code: String,
    terse: bool,
    width: f64,
    height: f64,
    tree: Option<B::Tree>,
    rendered: Option<Rendered>,
    placeholder: Layout,
    viewport: ViewportController,
}

impl<B: LanguageBackend> Workbench<B> {
    /// Start with empty source in `language`, verbose mode and the default viewport.
    pub fn new(backend: B, language: impl Into<String>) -> Self {
        let (width, height) = DEFAULT_VIEWPORT;
        Self {
            session: ParserSession::new(backend),
            debouncer: Debouncer::new(DEFAULT_DEBOUNCE),
            language: language.into(),
            code: String::new(),
            terse: false,
            width,
            height,
            tree: None,
            rendered: None,
            placeholder: placeholder_layout(width, height),
            viewport: ViewportController::new(),
        }
    }

    /// Replace the debounce window.
    pub fn with_debounce(mut self, window: Duration) -> Self {
        self.debouncer = Debouncer::new(window);
        self
    }

    /// Start in terse or verbose mode.
    pub fn with_terse(mut self, terse: bool) -> Self {
        self.terse = terse;
        self
    }

    /// Start with a given viewport size.
    pub fn with_viewport_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self.placeholder = placeholder_layout(width, height);
        self
    }

    /// Current editor state.
    pub fn source_state(&self) -> SourceState {
        SourceState {
            language: self.language.clone(),
            code: self.code.clone(),
        }
    }

    /// Whether serialization uses the terse shape.
    pub fn terse(&self) -> bool {
        self.terse
    }

    /// Replace the source text and schedule a recompute.
    pub fn edit_source(&mut self, code: impl Into<String>, now: Instant) {
        self.code = code.into();
        self.schedule(now);
    }

    /// Switch grammar and schedule a recompute.
    pub fn select_language(&mut self, id: impl Into<String>, now: Instant) {
        self.language = id.into();
        self.schedule(now);
    }

    /// Recompute if the debounce window has elapsed.
    ///
    /// On `GrammarLoadError` the previous snapshot stays in place.
    pub fn tick(&mut self, now: Instant) -> Result<TickOutcome, GrammarLoadError> {
        match self.debouncer.poll(now) {
            Some(state) => self.recompute(state),
            None => Ok(TickOutcome::Idle),
        }
    }

    /// Recompute the pending state immediately, ignoring the debounce window.
    pub fn recompute_now(&mut self) -> Result<TickOutcome, GrammarLoadError> {
        match self.debouncer.flush() {
            Some(state) => self.recompute(state),
            None => Ok(TickOutcome::Idle),
        }
    }

    /// Install `tree` as the result of parsing `state`.
    ///
    /// Results for a state other than the current editor state are dropped,
    /// so a slow parse can never overwrite a newer one.
    pub fn accept(&mut self, state: SourceState, tree: B::Tree) -> TickOutcome {
        if state.language != self.language || state.code != self.code {
            debug!(language = %state.language, "Discarding stale parse result");
            return TickOutcome::Discarded;
        }
        let text = render_text(&tree, self.terse);
        let layout = render_layout(&tree, self.width, self.height);
        debug!(
            language = %state.language,
            nodes = layout.nodes.len(),
            "Rendered new tree"
        );
        self.tree = Some(tree);
        self.rendered = Some(Rendered {
            state,
            text,
            layout,
        });
        TickOutcome::Rendered
    }

    /// Switch serialization shape, re-serializing the last tree without parsing.
    pub fn set_terse(&mut self, terse: bool) {
        self.terse = terse;
        if let (Some(tree), Some(rendered)) = (&self.tree, &mut self.rendered) {
            rendered.text = render_text(tree, terse);
        }
    }

    /// Adopt a new viewport size, re-laying-out the last tree without parsing.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.placeholder = placeholder_layout(width, height);
        if let (Some(tree), Some(rendered)) = (&self.tree, &mut self.rendered) {
            rendered.layout = render_layout(tree, width, height);
        }
    }

    /// Tree behind the latest rendering, if any.
    pub fn tree(&self) -> Option<&B::Tree> {
        self.tree.as_ref()
    }

    /// Diagram hierarchy of the latest tree, or the empty root before any parse.
    pub fn graph(&self) -> GraphNode {
        match &self.tree {
            Some(tree) => graph::project(Some(&tree.root())),
            None => GraphNode::empty(),
        }
    }

    /// Latest successful rendering, if any.
    pub fn rendered(&self) -> Option<&Rendered> {
        self.rendered.as_ref()
    }

    /// Serialization panel contents.
    pub fn text_panel(&self) -> &str {
        self.rendered
            .as_ref()
            .map_or(EMPTY_TEXT, |rendered| rendered.text.as_str())
    }

    /// Diagram panel contents.
    pub fn diagram(&self) -> &Layout {
        self.rendered
            .as_ref()
            .map_or(&self.placeholder, |rendered| &rendered.layout)
    }

    /// Session state to put in a share link.
    pub fn share_config(&self) -> ShareConfig {
        ShareConfig::new(self.language.clone(), self.code.clone(), self.terse)
    }

    /// Apply a decoded share link and schedule a recompute.
    ///
    /// The viewport keeps its current pan and zoom.
    pub fn restore(&mut self, config: ShareConfig, now: Instant) {
        self.set_terse(config.terse);
        self.language = config.language;
        self.code = config.code;
        self.schedule(now);
    }

    /// The pan/zoom controller for the diagram.
    pub fn viewport(&self) -> &ViewportController {
        &self.viewport
    }

    /// Mutable access to the pan/zoom controller.
    pub fn viewport_mut(&mut self) -> &mut ViewportController {
        &mut self.viewport
    }

    /// The parser session.
    pub fn session(&self) -> &ParserSession<B> {
        &self.session
    }

    fn schedule(&mut self, now: Instant) {
        self.debouncer.push(self.source_state(), now);
    }

    fn recompute(&mut self, state: SourceState) -> Result<TickOutcome, GrammarLoadError> {
        debug!(language = %state.language, bytes = state.code.len(), "Recomputing");
        let tree = self
            .session
            .parse(&state.language, &state.code)
            .inspect_err(|err| warn!(error = %err, "Recompute aborted"))?;
        Ok(self.accept(state, tree))
    }
}

fn render_text<T: SyntaxTree>(tree: &T, terse: bool) -> String {
    let document = serializer::serialize(&tree.root(), SerializeMode::from_terse(terse));
    match serializer::to_pretty_json(&document) {
        Ok(text) => text,
        Err(err) => {
            warn!(error = %err, "Serialization failed");
            EMPTY_TEXT.to_string()
        }
    }
}

fn render_layout<T: SyntaxTree>(tree: &T, width: f64, height: f64) -> Layout {
    layout::layout(&graph::project(Some(&tree.root())), width, height)
}

fn placeholder_layout(width: f64, height: f64) -> Layout {
    layout::layout(&graph::project::<&SyntaxNode>(None), width, height)
}

#[cfg(test)]
#[path = "workbench_tests.rs"]
mod tests;
