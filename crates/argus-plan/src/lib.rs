pub mod components;
pub mod matching;
pub mod waves;

pub use components::{discover_components, ComponentManifest, ManifestComponent};
pub use waves::generate_plan;
