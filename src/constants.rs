use std::time::Duration;

pub const RENDER_WIDTH: i32 = 1920;           // Width of the render texture
pub const RENDER_HEIGHT: i32 = 1080;          // Height of the render texture
pub const FPS: u32 = 60;                      // Frames per second
pub const FRAME_TIME: f32 = 1.0 / FPS as f32; // Time per frame (seconds)

pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(5000); // Auto-advance cadence
pub const DEFAULT_TRANSITION: Duration = Duration::from_millis(300); // Transition lock window
pub const MIN_INTERVAL: Duration = Duration::from_millis(1); // Shortest accepted tick period

pub const ARROW_RADIUS: f32 = 28.0;           // Prev/next button radius (render pixels)
pub const ARROW_MARGIN: f32 = 48.0;           // Distance of arrow centres from the edges
pub const DOT_RADIUS: f32 = 8.0;              // Indicator dot radius
pub const DOT_ACTIVE_RADIUS: f32 = 11.0;      // Indicator radius for the visible slide
pub const DOT_SPACING: f32 = 36.0;            // Centre-to-centre distance between dots
pub const DOT_BOTTOM_MARGIN: f32 = 64.0;      // Dot row distance from the bottom edge
