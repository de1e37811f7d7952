//! Plugin coordination : a stable `LinkerWrapper` handle plugins call
//! through, and the [`LinkState`] legality checks that keep a plugin from mutating
//! the session at a point the pipeline isn't ready for it.

use std::collections::HashSet;

use crate::diag::Diag;
use crate::session::{InputId, SectionId};

/// Which pipeline stage the session is currently in, for plugin operation legality
/// checks. Ordered the way the pipeline actually advances through
/// them; a plugin is never handed a wrapper for a state earlier than
/// `Initializing` or later than `AfterLayout`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// Before any input has been read
    Initializing,
    /// Inputs are loaded and sections exist, but output sections are not yet final
    CreatingSections,
    /// Output sections are matched and segments are being built
    CreatingSegments,
    /// Address assignment has run; only read-only queries and build-ID-style
    /// finalization are legal
    AfterLayout,
}

/// The operations a plugin may request through a [`LinkerWrapper`]. Each is only
/// legal in a subset of [`LinkState`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginOp {
    /// Add a new fragment the plugin supplies
    AddChunk,
    /// Remove a previously-added fragment
    RemoveChunk,
    /// Replace the contents of one or more previously-added fragments
    UpdateChunks,
    /// Force an input section's output-section assignment
    SetSectionOverride,
}

impl PluginOp {
    fn name(self) -> &'static str {
        match self {
            PluginOp::AddChunk => "addChunk",
            PluginOp::RemoveChunk => "removeChunk",
            PluginOp::UpdateChunks => "updateChunks",
            PluginOp::SetSectionOverride => "setSectionOverride",
        }
    }

    /// The states in which this operation is legal.
    fn legal_states(self) -> &'static [LinkState] {
        match self {
            PluginOp::AddChunk | PluginOp::RemoveChunk | PluginOp::UpdateChunks => {
                &[LinkState::CreatingSections]
            }
            PluginOp::SetSectionOverride => &[LinkState::CreatingSections, LinkState::CreatingSegments],
        }
    }

    fn state_name(state: LinkState) -> &'static str {
        match state {
            LinkState::Initializing => "Initializing",
            LinkState::CreatingSections => "CreatingSections",
            LinkState::CreatingSegments => "CreatingSegments",
            LinkState::AfterLayout => "AfterLayout",
        }
    }
}

/// A chunk identifier: the fragment id a plugin added, stringified for diagnostic
/// purposes since the `Diag` variants carry `String` identifiers rather than
/// borrowing the session's fragment arena.
pub type ChunkId = String;

/// Plugin-visible state: tracks which chunks a plugin has added (so duplicate adds
/// and unknown removals can be diagnosed) and the current [`LinkState`]. Owned
/// alongside a [`crate::session::LinkerSession`]; the actual fragment/section
/// storage still lives in the session's arenas.
pub struct LinkerWrapper {
    state: LinkState,
    added_chunks: HashSet<ChunkId>,
    /// A synthetic input every plugin-supplied section is attributed to (spec
    /// §4.11: "so diagnostics and map output are coherent")
    pub plugin_input: Option<InputId>,
}

impl LinkerWrapper {
    /// A fresh wrapper at [`LinkState::Initializing`], with no plugin input
    /// registered yet (set it via [`LinkerWrapper::set_plugin_input`] once the
    /// session has created the synthetic plugin `Input`).
    pub fn new() -> Self {
        Self {
            state: LinkState::Initializing,
            added_chunks: HashSet::new(),
            plugin_input: None,
        }
    }

    /// The current pipeline stage.
    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Advance to `state`. The driver calls this at each pipeline stage boundary;
    /// plugins never call it themselves.
    pub fn advance_to(&mut self, state: LinkState) {
        self.state = state;
    }

    /// Record the synthetic input every plugin-supplied section attributes to.
    pub fn set_plugin_input(&mut self, input: InputId) {
        self.plugin_input = Some(input);
    }

    fn check_legal(&self, op: PluginOp) -> Result<(), Diag> {
        if op.legal_states().contains(&self.state) {
            Ok(())
        } else {
            Err(Diag::InvalidLinkState {
                    operation: op.name().to_string(),
                    state: PluginOp::state_name(self.state).to_string(),
            })
        }
    }

    /// `addChunk(chunk)`. Fails if called outside
    /// [`LinkState::CreatingSections`], or if `chunk` was already added.
    pub fn add_chunk(&mut self, chunk: ChunkId) -> Result<(), Diag> {
        self.check_legal(PluginOp::AddChunk)?;
        if !self.added_chunks.insert(chunk.clone()) {
            return Err(Diag::MultipleChunkAdd { chunk });
        }
        Ok(())
    }

    /// `removeChunk(chunk)`. Fails if called outside
    /// [`LinkState::CreatingSections`], or if `chunk` was never added.
    pub fn remove_chunk(&mut self, chunk: &str) -> Result<(), Diag> {
        self.check_legal(PluginOp::RemoveChunk)?;
        if !self.added_chunks.remove(chunk) {
            return Err(Diag::ChunkNotFound { chunk: chunk.to_string() });
        }
        Ok(())
    }

    /// `updateChunks(chunks)`. Fails if called outside
    /// [`LinkState::CreatingSections`], or if any chunk in `chunks` was never
    /// added.
    pub fn update_chunks(&mut self, chunks: &[ChunkId]) -> Result<(), Diag> {
        self.check_legal(PluginOp::UpdateChunks)?;
        for chunk in chunks {
            if !self.added_chunks.contains(chunk) {
                return Err(Diag::ChunkNotFound { chunk: chunk.clone() });
            }
        }
        Ok(())
    }

    /// `setSectionOverride(section, output)`. Fails if called outside
    /// [`LinkState::CreatingSections`] or [`LinkState::CreatingSegments`].
    pub fn set_section_override(&mut self, _section: SectionId) -> Result<(), Diag> {
        self.check_legal(PluginOp::SetSectionOverride)
    }
}

impl Default for LinkerWrapper {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod test {
    use super::*;

    #[test]
    fn add_chunk_is_legal_only_while_creating_sections() {
        let mut wrapper = LinkerWrapper::new();
        assert!(matches!(
                wrapper.add_chunk("a".to_string()),
                Err(Diag::InvalidLinkState {.. })
        ));
        wrapper.advance_to(LinkState::CreatingSections);
        assert!(wrapper.add_chunk("a".to_string()).is_ok());
    }

    #[test]
    fn duplicate_add_chunk_is_diagnosed() {
        let mut wrapper = LinkerWrapper::new();
        wrapper.advance_to(LinkState::CreatingSections);
        wrapper.add_chunk("a".to_string()).unwrap();
        assert!(matches!(
                wrapper.add_chunk("a".to_string()),
                Err(Diag::MultipleChunkAdd {.. })
        ));
    }

    #[test]
    fn remove_unknown_chunk_is_diagnosed() {
        let mut wrapper = LinkerWrapper::new();
        wrapper.advance_to(LinkState::CreatingSections);
        assert!(matches!(
                wrapper.remove_chunk("ghost"),
                Err(Diag::ChunkNotFound {.. })
        ));
    }

    #[test]
    fn remove_chunk_after_layout_is_diagnosed() {
        let mut wrapper = LinkerWrapper::new();
        wrapper.advance_to(LinkState::CreatingSections);
        wrapper.add_chunk("a".to_string()).unwrap();
        wrapper.advance_to(LinkState::AfterLayout);
        assert!(matches!(
                wrapper.remove_chunk("a"),
                Err(Diag::InvalidLinkState {.. })
        ));
    }

    #[test]
    fn section_override_legal_through_creating_segments() {
        let mut sections: crate::session::Arena<crate::model::section::Section> = crate::session::Arena::new();
        let section = sections.push(crate::model::section::Section::new(
                ".text",
                crate::model::section::SectionFlags::ALLOC,
                crate::model::section::SectionKind::ProgBits,
        ));
        let mut wrapper = LinkerWrapper::new();
        wrapper.advance_to(LinkState::CreatingSegments);
        assert!(wrapper.set_section_override(section).is_ok());
        wrapper.advance_to(LinkState::AfterLayout);
        assert!(matches!(
                wrapper.set_section_override(section),
                Err(Diag::InvalidLinkState {.. })
        ));
    }
}
