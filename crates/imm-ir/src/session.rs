//! The export session: the owner of every layer, drawing and element built
//! for one document.

use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};

use imm_core::{
    AudioCodec, AudioSettings, Color, ImmError, ImmResult, ResourceBudget, SequenceSettings,
    SequenceType,
};
use imm_encode::{ExportSink, ImmFileSink};
use uuid::Uuid;

use crate::arena::{Arena, DrawingId, ElementId, LayerId};
use crate::drawing::DrawingNode;
use crate::element::ElementNode;
use crate::layer::LayerNode;
use crate::validate::validate_document;

static NEXT_SESSION_ID: AtomicU32 = AtomicU32::new(1);

/// One exportable document under construction.
///
/// The session owns the layer forest and every drawing and element created
/// beneath it. All handles it returns are only meaningful to this session;
/// after [`destroy`](Self::destroy) every one of them is rejected.
///
/// Dropping the session destroys it, so early returns release everything.
#[derive(Debug)]
pub struct ExportSession {
    id: u32,
    document_id: String,
    settings: SequenceSettings,
    budget: ResourceBudget,
    destroyed: bool,
    pub(crate) roots: Vec<LayerId>,
    pub(crate) layers: Arena<LayerNode>,
    pub(crate) drawings: Arena<DrawingNode>,
    pub(crate) elements: Arena<ElementNode>,
}

impl ExportSession {
    /// Open a session with no capability bits.
    pub fn create(
        sequence_type: SequenceType,
        frame_rate: u32,
        background: Color,
        budget: ResourceBudget,
    ) -> ImmResult<Self> {
        Self::create_with(
            SequenceSettings {
                sequence_type,
                frame_rate,
                background,
                caps: 0,
            },
            budget,
        )
    }

    /// Open a session from fully specified settings.
    ///
    /// Budget ceilings are only checked for sign here; the backend enforces
    /// them when the document is exported.
    pub fn create_with(settings: SequenceSettings, budget: ResourceBudget) -> ImmResult<Self> {
        if settings.frame_rate == 0 {
            return Err(ImmError::Creation("frame rate must be positive".into()));
        }
        if !settings.background.is_normalized() {
            return Err(ImmError::Creation(format!(
                "background color {:?} is outside [0, 1]",
                settings.background
            )));
        }
        if let Some(field) = budget.first_negative() {
            return Err(ImmError::Creation(format!("{} must not be negative", field)));
        }

        let id = NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed);
        let session = Self {
            id,
            document_id: Uuid::new_v4().to_string(),
            settings,
            budget,
            destroyed: false,
            roots: Vec::new(),
            layers: Arena::new(),
            drawings: Arena::new(),
            elements: Arena::new(),
        };
        tracing::debug!(
            "Created export session {} ({} @ {}fps)",
            id,
            session.settings.sequence_type,
            session.settings.frame_rate
        );
        Ok(session)
    }

    pub fn settings(&self) -> &SequenceSettings {
        &self.settings
    }

    pub fn budget(&self) -> &ResourceBudget {
        &self.budget
    }

    /// Identifier written into the exported document.
    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Drawings that were created and not yet destroyed.
    pub fn outstanding_drawings(&self) -> usize {
        self.drawings.len()
    }

    /// Release every layer, drawing and element.
    ///
    /// Further calls are no-ops.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.roots.clear();
        self.elements.clear();
        self.drawings.clear();
        self.layers.clear();
        tracing::debug!("Destroyed export session {}", self.id);
    }

    /// Serialize the committed document to an `.imm` file.
    ///
    /// Drawings that were never added as frames are not part of the output.
    pub fn export_to_file(
        &self,
        path: impl AsRef<Path>,
        audio_bitrate: u32,
        audio_codec: AudioCodec,
    ) -> ImmResult<u64> {
        self.export_with(
            &mut ImmFileSink::new(),
            path.as_ref(),
            AudioSettings::new(audio_bitrate, audio_codec),
        )
    }

    /// Serialize the committed document through an arbitrary sink.
    pub fn export_with(
        &self,
        sink: &mut dyn ExportSink,
        path: &Path,
        audio: AudioSettings,
    ) -> ImmResult<u64> {
        self.ensure_open("export")?;
        if path.as_os_str().is_empty() {
            return Err(ImmError::export("empty output path", path));
        }

        let document = self.snapshot()?;
        if let Err(errors) = validate_document(&document) {
            for e in &errors {
                tracing::warn!("Export of session {} rejected: {}", self.id, e);
            }
            if let Some(first) = errors.into_iter().next() {
                return Err(first);
            }
        }

        if !self.drawings.is_empty() {
            tracing::debug!(
                "{} drawing(s) still outstanding; only committed frames are exported",
                self.drawings.len()
            );
        }

        sink.export(&document, path, audio)
    }

    pub(crate) fn ensure_open(&self, op: &str) -> ImmResult<()> {
        if self.destroyed {
            tracing::warn!("{} called on destroyed session {}", op, self.id);
            return Err(ImmError::StaleHandle(format!(
                "{}: session has been destroyed",
                op
            )));
        }
        Ok(())
    }

    fn ensure_owned(&self, session: u32, what: &str) -> ImmResult<()> {
        if session != self.id {
            return Err(ImmError::StaleHandle(format!(
                "{} belongs to another session",
                what
            )));
        }
        Ok(())
    }

    pub(crate) fn layer_node(&self, id: LayerId) -> ImmResult<&LayerNode> {
        self.ensure_open("layer access")?;
        self.ensure_owned(id.session, "layer")?;
        self.layers
            .get(id.slot)
            .ok_or_else(|| ImmError::StaleHandle(format!("{:?}", id)))
    }

    pub(crate) fn layer_node_mut(&mut self, id: LayerId) -> ImmResult<&mut LayerNode> {
        self.ensure_open("layer access")?;
        self.ensure_owned(id.session, "layer")?;
        self.layers
            .get_mut(id.slot)
            .ok_or_else(|| ImmError::StaleHandle(format!("{:?}", id)))
    }

    pub(crate) fn drawing_node(&self, id: DrawingId) -> ImmResult<&DrawingNode> {
        self.ensure_open("drawing access")?;
        self.ensure_owned(id.session, "drawing")?;
        self.drawings
            .get(id.slot)
            .ok_or_else(|| ImmError::StaleHandle(format!("{:?}", id)))
    }

    pub(crate) fn drawing_node_mut(&mut self, id: DrawingId) -> ImmResult<&mut DrawingNode> {
        self.ensure_open("drawing access")?;
        self.ensure_owned(id.session, "drawing")?;
        self.drawings
            .get_mut(id.slot)
            .ok_or_else(|| ImmError::StaleHandle(format!("{:?}", id)))
    }

    pub(crate) fn element_node(&self, id: ElementId) -> ImmResult<&ElementNode> {
        self.ensure_open("element access")?;
        self.ensure_owned(id.session, "element")?;
        self.elements
            .get(id.slot)
            .ok_or_else(|| ImmError::StaleHandle(format!("{:?}", id)))
    }

    pub(crate) fn element_node_mut(&mut self, id: ElementId) -> ImmResult<&mut ElementNode> {
        self.ensure_open("element access")?;
        self.ensure_owned(id.session, "element")?;
        self.elements
            .get_mut(id.slot)
            .ok_or_else(|| ImmError::StaleHandle(format!("{:?}", id)))
    }

    pub(crate) fn id(&self) -> u32 {
        self.id
    }
}

impl Drop for ExportSession {
    fn drop(&mut self) {
        self.destroy();
    }
}
