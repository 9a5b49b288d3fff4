//! Edit session over a capture artifact.

use std::path::{Path, PathBuf};

use image::RgbaImage;
use snapcrop_common::config::TerminalAction;
use snapcrop_common::error::{SnapError, SnapResult};
use snapcrop_common::temp::delete_artifact;
use snapcrop_crop_editor::{CropConfig, CropGeometry};

/// One editing pass over a temp artifact.
///
/// The session ends exactly once, when a terminal action completes. Closing
/// deletes the artifact; afterwards every action fails with `SessionClosed`.
#[derive(Debug)]
pub struct EditSession {
    artifact: PathBuf,
    image: RgbaImage,
    geometry: CropGeometry,
    pending: Option<TerminalAction>,
    closed_by: Option<TerminalAction>,
}

impl EditSession {
    /// Decode `artifact` and fit it into a view of the image's own size.
    pub fn open(artifact: impl Into<PathBuf>, config: CropConfig) -> SnapResult<Self> {
        let artifact = artifact.into();
        let image = match image::open(&artifact) {
            Ok(decoded) => decoded.to_rgba8(),
            Err(e) => {
                tracing::warn!(error = %e, "Temp artifact could not be decoded");
                return Err(SnapError::ArtifactUnreadable { path: artifact });
            }
        };

        let (width, height) = image.dimensions();
        let mut geometry = CropGeometry::new(config);
        geometry.set_image_size(width, height);
        geometry.set_view_size(width as f64, height as f64);

        tracing::debug!(width, height, "Edit session opened");
        Ok(Self {
            artifact,
            image,
            geometry,
            pending: None,
            closed_by: None,
        })
    }

    /// [`EditSession::open`] on a blocking worker.
    pub async fn load(artifact: impl Into<PathBuf>, config: CropConfig) -> SnapResult<Self> {
        let artifact = artifact.into();
        let path = artifact.clone();
        tokio::task::spawn_blocking(move || Self::open(path, config))
            .await
            .map_err(|_| SnapError::ArtifactUnreadable { path: artifact })?
    }

    pub fn artifact(&self) -> &Path {
        &self.artifact
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn geometry(&self) -> &CropGeometry {
        &self.geometry
    }

    pub fn geometry_mut(&mut self) -> &mut CropGeometry {
        &mut self.geometry
    }

    /// The action currently being carried out, if any.
    pub fn pending_action(&self) -> Option<TerminalAction> {
        self.pending
    }

    /// The action that ended the session.
    pub fn closed_by(&self) -> Option<TerminalAction> {
        self.closed_by
    }

    pub fn is_closed(&self) -> bool {
        self.closed_by.is_some()
    }

    pub fn ensure_open(&self) -> SnapResult<()> {
        if self.is_closed() {
            return Err(SnapError::SessionClosed);
        }
        Ok(())
    }

    /// The current crop cut out of the captured image.
    pub fn export(&self) -> SnapResult<RgbaImage> {
        self.ensure_open()?;
        self.geometry.export(&self.image)
    }

    pub(crate) fn begin(&mut self, action: TerminalAction) -> SnapResult<()> {
        self.ensure_open()?;
        self.pending = Some(action);
        Ok(())
    }

    /// The pending action failed; the session stays open for another try.
    pub(crate) fn abandon(&mut self) {
        self.pending = None;
    }

    /// End the session with `action` and delete the artifact.
    pub(crate) fn close(&mut self, action: TerminalAction) {
        if let Err(e) = delete_artifact(&self.artifact) {
            tracing::warn!(error = %e, "Failed to delete temp artifact");
        }
        self.pending = None;
        self.closed_by = Some(action);
        tracing::debug!(action = action.as_str(), "Edit session closed");
    }
}
