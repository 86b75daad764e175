use anyhow::Result;

use crate::detect::result::Candidate;

/// Detector backend trait.
///
/// A backend owns a loaded model and turns one RGB frame into raw
/// candidates: every network output row reduced to its best class and
/// score, with a normalized center/size box. Person filtering, score
/// thresholding, and pixel conversion happen above the backend so all
/// backends share the same postprocessing.
///
/// Implementations must treat the pixel slice as read-only and ephemeral.
pub trait DetectorBackend: Send {
    /// Backend identifier.
    fn name(&self) -> &'static str;

    /// Run inference on a packed RGB24 frame.
    fn detect(&mut self, pixels: &[u8], width: u32, height: u32) -> Result<Vec<Candidate>>;

    /// Optional warm-up hook.
    fn warm_up(&mut self) -> Result<()> {
        Ok(())
    }
}
