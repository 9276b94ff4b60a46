pub mod config;
pub mod constants;
pub mod controller;
pub mod error;
pub mod ffmpeg;
pub mod render;
pub mod slide;
pub mod state;
pub mod store;
pub mod texture_loader;
pub mod timer;

pub use config::ControllerConfig;
pub use controller::RotationController;
pub use error::StoreError;
pub use render::{LayoutRenderer, SlideRenderer, SummaryRenderer};
pub use slide::Slide;
pub use state::{DeckStatus, Navigation, SlideshowState};
pub use store::{JsonFileStore, SlideStore};
