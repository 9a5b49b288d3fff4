//! Snapcrop Actions
//!
//! What happens to a capture once the user is done cropping. An
//! [`EditSession`] owns the temp artifact and the crop state; the
//! [`ActionPipeline`] ends it with exactly one of save, copy-and-discard or
//! discard, deleting the artifact on the way out.

pub mod collaborators;
pub mod pipeline;
pub mod session;

pub use collaborators::{ActionChooser, Choice, Clipboard, Storage};
pub use pipeline::{ActionOutcome, ActionPipeline};
pub use session::EditSession;
