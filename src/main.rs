use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Result, anyhow};
use clap::Parser;
use raylib::prelude::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cms_slideshow::constants::*;
use cms_slideshow::ffmpeg::Ffmpeg;
use cms_slideshow::render::{self, Chrome, ChromeHit};
use cms_slideshow::texture_loader::TextureCache;
use cms_slideshow::{
    ControllerConfig, DeckStatus, JsonFileStore, LayoutRenderer, RotationController, Slide,
    SlideStore, SummaryRenderer,
};

#[derive(Parser)]
#[command(name = "cms-slideshow", about = "Plays CMS slides as an auto-advancing slideshow")]
struct Cli {
    /// Slide document: `{ "slides": [...] }` as served by the CMS, or a bare array.
    #[arg(env = "CMS_SLIDESHOW_SLIDES")]
    slides: PathBuf,

    /// Time between automatic advances, in milliseconds.
    #[arg(long, default_value_t = 5000, env = "CMS_SLIDESHOW_INTERVAL_MS",
          value_parser = clap::value_parser!(u64).range(1..))]
    interval_ms: u64,

    /// Transition window during which navigation is locked, in milliseconds.
    #[arg(long, default_value_t = 300, env = "CMS_SLIDESHOW_TRANSITION_MS")]
    transition_ms: u64,

    /// Only change slides on user input.
    #[arg(long)]
    no_auto_advance: bool,

    /// Render in compact (preview) mode.
    #[arg(long)]
    compact: bool,

    /// Record the slideshow to a video file through ffmpeg.
    #[arg(long, conflicts_with = "headless")]
    record: Option<PathBuf>,

    /// Run without a window, logging each slide change.
    #[arg(long)]
    headless: bool,

    /// Stop after this many seconds. Recording defaults to one full rotation.
    #[arg(long, value_parser = parse_duration_secs)]
    duration_secs: Option<Duration>,
}

fn parse_duration_secs(arg: &str) -> Result<Duration, String> {
    let secs: f32 = arg.parse().map_err(|e| format!("{e}"))?;
    if secs <= 0.0 {
        return Err(format!("{arg} is not a positive number of seconds"));
    }
    Duration::try_from_secs_f32(secs).map_err(|e| format!("{arg}: {e}"))
}

impl Cli {
    fn config(&self) -> ControllerConfig {
        ControllerConfig::default()
            .with_auto_advance(!self.no_auto_advance)
            .with_interval(Duration::from_millis(self.interval_ms))
            .with_transition(Duration::from_millis(self.transition_ms))
            .with_compact(self.compact)
    }

    fn duration_limit(&self) -> Option<Duration> {
        self.duration_secs
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cms_slideshow=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let store = JsonFileStore::new(&cli.slides);
    tracing::info!(path = %store.path().display(), "Input slides");

    let controller = RotationController::new(cli.config());
    if cli.headless {
        run_headless(&store, controller, cli.duration_limit())
    } else {
        run_window(&cli, &store, controller)
    }
}

fn run_headless(
    store: &JsonFileStore,
    mut controller: RotationController<Slide>,
    limit: Option<Duration>,
) -> Result<()> {
    controller.load_result(store.list_slides());
    if controller.status() == DeckStatus::Empty {
        if let Some(error) = controller.load_error() {
            anyhow::bail!("Error loading slides: {error}");
        }
        tracing::warn!("No slides available");
        return Ok(());
    }

    let log_current = |controller: &RotationController<Slide>| {
        if let (Some(index), Some(line)) =
            (controller.current_index(), controller.render(&SummaryRenderer))
        {
            tracing::info!(index, slide = %line, "Showing");
        }
    };

    log_current(&controller);
    let step = Duration::from_secs_f32(FRAME_TIME);
    let started = Instant::now();
    let mut last = started;
    loop {
        std::thread::sleep(step);
        let now = Instant::now();
        if controller.advance(now - last) {
            log_current(&controller);
        }
        last = now;
        if limit.is_some_and(|limit| now - started >= limit) {
            break;
        }
    }

    controller.shutdown();
    Ok(())
}

/// Length of one pass over every slide with the configured timing.
fn full_rotation(controller: &RotationController<Slide>) -> Duration {
    let config = controller.config();
    let slides = u32::try_from(controller.len().max(1)).unwrap_or(u32::MAX);
    config.interval.saturating_mul(slides).saturating_add(config.transition)
}

fn to_render_space(point: Vector2, screen_width: i32, screen_height: i32) -> Vector2 {
    Vector2::new(
        point.x * RENDER_WIDTH as f32 / screen_width.max(1) as f32,
        point.y * RENDER_HEIGHT as f32 / screen_height.max(1) as f32,
    )
}

/// Opacity of the visible slide: fading out while a transition is pending,
/// fading back in once it settled.
fn slide_opacity(controller: &RotationController<Slide>, since_settle: Duration) -> f32 {
    if controller.len() <= 1 {
        return 1.0;
    }
    if let Some(progress) = controller.transition_progress() {
        return 1.0 - progress;
    }
    let window = controller.config().transition;
    if window.is_zero() {
        1.0
    } else {
        (since_settle.as_secs_f32() / window.as_secs_f32()).min(1.0)
    }
}

fn run_window(
    cli: &Cli,
    store: &JsonFileStore,
    mut controller: RotationController<Slide>,
) -> Result<()> {
    let (mut rl, thread) = raylib::init()
        .size(RENDER_WIDTH / 2, RENDER_HEIGHT / 2)
        .title("CMS Slideshow")
        .vsync()
        .resizable()
        .build();
    rl.set_target_fps(FPS);
    rl.set_trace_log(TraceLogLevel::LOG_ERROR);

    let mut framebuffer = rl
        .load_render_texture(&thread, RENDER_WIDTH as u32, RENDER_HEIGHT as u32)
        .map_err(|e| anyhow!("Failed to create render texture: {e}"))?;

    // Start ffmpeg process and connect pipes so we can send rendered frames
    let mut recorder = match &cli.record {
        Some(path) => Some(Ffmpeg::new(RENDER_WIDTH, RENDER_HEIGHT, FPS, &path.to_string_lossy())?),
        None => None,
    };

    let layout = LayoutRenderer::default();
    let mut textures = TextureCache::new();
    let mut since_settle = Duration::MAX;
    let mut elapsed = Duration::ZERO;
    let mut limit = cli.duration_limit();

    // --- Main Loop ---
    while !rl.window_should_close() {
        // Recording runs on a fixed step so the video plays back at real speed.
        let dt = if recorder.is_some() {
            Duration::from_secs_f32(FRAME_TIME)
        } else {
            Duration::from_secs_f32(rl.get_frame_time())
        };

        // --- Input ---
        if controller.status() == DeckStatus::Ready && recorder.is_none() {
            controller.set_paused(rl.is_cursor_on_screen());

            if rl.is_mouse_button_pressed(MouseButton::MOUSE_BUTTON_LEFT) {
                let point = to_render_space(
                    rl.get_mouse_position(),
                    rl.get_screen_width(),
                    rl.get_screen_height(),
                );
                let outcome = match Chrome::new(controller.len()).hit(point) {
                    Some(ChromeHit::Previous) => Some(controller.previous()),
                    Some(ChromeHit::Next) => Some(controller.next()),
                    Some(ChromeHit::Dot(index)) => Some(controller.go_to(index)),
                    None => None,
                };
                if let Some(outcome) = outcome.filter(|outcome| !outcome.is_started()) {
                    tracing::debug!(?outcome, "Click ignored");
                }
            }
            if rl.is_key_pressed(KeyboardKey::KEY_RIGHT) {
                controller.next();
            }
            if rl.is_key_pressed(KeyboardKey::KEY_LEFT) {
                controller.previous();
            }
        }

        // --- Update ---
        if controller.advance(dt) {
            since_settle = Duration::ZERO;
        } else {
            since_settle = since_settle.saturating_add(dt);
        }

        // --- Render into the fixed size framebuffer ---
        let status = controller.status();
        let frame = controller.render(&layout);
        let opacity = slide_opacity(&controller, since_settle);
        let chrome = Chrome::new(controller.len());
        let current = controller.current_index().unwrap_or(0);
        let load_error = controller.load_error();

        rl.draw_texture_mode(&thread, &mut framebuffer, |mut tmd| {
            let mut d = tmd.begin_drawing(&thread);
            match status {
                DeckStatus::Loading => {
                    render::draw_status(&mut d, "Loading slides…", "", Color::WHITE);
                }
                DeckStatus::Empty => match load_error {
                    Some(error) => {
                        render::draw_status(&mut d, "Error loading slides", error, Color::RED)
                    }
                    None => render::draw_status(
                        &mut d,
                        "No slides available",
                        "There are no slides to display. Please add some content in the CMS.",
                        Color::WHITE,
                    ),
                },
                DeckStatus::Ready => {
                    d.clear_background(Color::BLACK);
                    if let Some(frame) = &frame {
                        render::draw_frame(&mut d, frame, opacity, &textures);
                    }
                    render::draw_chrome(&mut d, &chrome, current);
                }
            }
        });

        // Draw inverted copy of framebuffer to the screen for feedback
        {
            let mut d2 = rl.begin_drawing(&thread);
            let sw = d2.get_screen_width() as f32;
            let sh = d2.get_screen_height() as f32;
            d2.draw_texture_pro(
                &framebuffer,
                Rectangle::new(
                    0.0,
                    0.0,
                    framebuffer.width() as f32,
                    -(framebuffer.height() as f32),
                ),
                Rectangle::new(0.0, 0.0, sw, sh),
                Vector2::new(0.0, 0.0),
                0.0,
                Color::WHITE,
            );
        }

        // The first frame shows the loading state; fetch once it is on screen.
        if status == DeckStatus::Loading {
            controller.load_result(store.list_slides());
            textures.preload(&mut rl, &thread, controller.slides());
            if recorder.is_some() && limit.is_none() {
                limit = Some(full_rotation(&controller));
            }
            continue;
        }

        if let Some(recorder) = recorder.as_mut() {
            let image = framebuffer
                .load_image()
                .map_err(|e| anyhow!("Failed to read framebuffer: {e}"))?;
            recorder.write(&image)?;
        }

        elapsed += dt;
        if limit.is_some_and(|limit| elapsed >= limit) {
            break;
        }
    } // End main loop

    controller.shutdown();
    if let Some(recorder) = recorder {
        recorder.finish()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_maps_to_controller_config() {
        let cli = Cli::parse_from([
            "cms-slideshow",
            "slides.json",
            "--interval-ms",
            "2500",
            "--transition-ms",
            "0",
            "--no-auto-advance",
            "--compact",
        ]);
        let config = cli.config();
        assert!(!config.auto_advance);
        assert_eq!(config.interval, Duration::from_millis(2500));
        assert_eq!(config.transition, Duration::ZERO);
        assert!(config.compact);
    }

    #[test]
    fn cli_defaults() {
        let cli = Cli::parse_from(["cms-slideshow", "slides.json"]);
        assert_eq!(cli.config(), ControllerConfig::default());
        assert_eq!(cli.duration_limit(), None);
    }

    #[test]
    fn zero_interval_is_rejected() {
        assert!(Cli::try_parse_from(["cms-slideshow", "s.json", "--interval-ms", "0"]).is_err());
    }

    #[test]
    fn duration_is_parsed_as_seconds() {
        let cli = Cli::parse_from(["cms-slideshow", "s.json", "--duration-secs", "2.5"]);
        assert_eq!(cli.duration_limit(), Some(Duration::from_millis(2500)));
    }

    #[test]
    fn oversized_duration_is_rejected() {
        for secs in ["1e20", "inf", "NaN", "0", "-3", "soon"] {
            let parsed = Cli::try_parse_from(["cms-slideshow", "s.json", "--duration-secs", secs]);
            assert!(parsed.is_err(), "{secs} should be rejected");
        }
    }

    #[test]
    fn huge_interval_rotation_saturates() {
        let config = ControllerConfig::default().with_interval(Duration::MAX);
        let slides = vec![Slide::new("a"), Slide::new("b")];
        let controller = RotationController::with_slides(config, slides);
        assert_eq!(full_rotation(&controller), Duration::MAX);
    }

    #[test]
    fn record_and_headless_conflict() {
        let parsed = Cli::try_parse_from([
            "cms-slideshow",
            "s.json",
            "--headless",
            "--record",
            "out.mp4",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn window_points_scale_to_render_surface() {
        let p = to_render_space(Vector2::new(480.0, 270.0), RENDER_WIDTH / 2, RENDER_HEIGHT / 2);
        assert_eq!((p.x, p.y), (960.0, 540.0));
    }

    #[test]
    fn rotation_covers_every_slide() {
        let config = ControllerConfig::default();
        let slides = vec![Slide::new("a"), Slide::new("b")];
        let controller = RotationController::with_slides(config, slides);
        assert_eq!(full_rotation(&controller), Duration::from_millis(10_300));
    }

    #[test]
    fn opacity_fades_out_then_in() {
        let config = ControllerConfig::default().with_auto_advance(false);
        let slides = vec![Slide::new("a"), Slide::new("b")];
        let mut controller = RotationController::with_slides(config, slides);
        assert_eq!(slide_opacity(&controller, Duration::MAX), 1.0);

        controller.next();
        controller.advance(Duration::from_millis(150));
        assert_eq!(slide_opacity(&controller, Duration::MAX), 0.5);

        controller.advance(Duration::from_millis(150));
        assert_eq!(slide_opacity(&controller, Duration::ZERO), 0.0);
        assert_eq!(slide_opacity(&controller, Duration::from_millis(300)), 1.0);
    }
}
