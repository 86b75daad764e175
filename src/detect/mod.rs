//! Person detection: backends, labels, filtering, and suppression.

mod backend;
mod backends;
mod labels;
pub mod nms;
mod person;
mod result;

use anyhow::{anyhow, Result};

use crate::config::DetectorSettings;

pub use backend::DetectorBackend;
pub use backends::StubBackend;
#[cfg(feature = "backend-tract")]
pub use backends::TractBackend;
pub use labels::{LabelSet, PERSON_LABEL};
pub use person::PersonDetector;
pub use result::{Candidate, Detection};

/// Build the detector backend named in the settings.
///
/// Model loading failures are fatal here, before the playback loop starts.
pub fn create_backend(settings: &DetectorSettings) -> Result<Box<dyn DetectorBackend>> {
    match settings.backend.as_str() {
        "stub" => Ok(Box::new(StubBackend::new())),
        "tract" => {
            #[cfg(feature = "backend-tract")]
            {
                Ok(Box::new(TractBackend::new(
                    &settings.model_path,
                    settings.input_size,
                )?))
            }
            #[cfg(not(feature = "backend-tract"))]
            {
                Err(anyhow!(
                    "the tract backend requires the backend-tract feature"
                ))
            }
        }
        other => Err(anyhow!("unknown detector backend '{}'", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DetectorSettings;

    #[test]
    fn stub_backend_resolves_by_name() {
        let settings = DetectorSettings {
            backend: "stub".to_string(),
            ..DetectorSettings::default()
        };
        let backend = create_backend(&settings).unwrap();
        assert_eq!(backend.name(), "stub");
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let settings = DetectorSettings {
            backend: "gpu9000".to_string(),
            ..DetectorSettings::default()
        };
        assert!(create_backend(&settings).is_err());
    }
}
