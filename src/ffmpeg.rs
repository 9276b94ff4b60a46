use std::io::Write;
use std::process::{Child, ChildStdin, Command, Stdio};

use anyhow::{Context, Result};
use raylib::prelude::*;

pub struct Ffmpeg {
    process: Child,
    stdin: Option<ChildStdin>,
    frames: u64,
}

impl Ffmpeg {
    pub fn new(width: i32, height: i32, fps: u32, video_name: &str) -> Result<Ffmpeg> {
        let mut process = Command::new("ffmpeg")
            .stdin(Stdio::piped())
            .args(["-loglevel", "error"])
            .arg("-y")
            .args(["-f", "rawvideo"])
            .args(["-pixel_format", "rgba"])
            .args(["-video_size", &format!("{}x{}", width, height)])
            .args(["-framerate", &format!("{}", fps)])
            .args(["-i", "-"])
            .args(["-c:v", "libx264"])
            .args(["-pix_fmt", "yuv420p"])
            .arg(video_name)
            .spawn()
            .context("Failed to start ffmpeg process")?;
        let stdin = process.stdin.take().context("Failed to open ffmpeg stdin")?;
        tracing::info!(video_name, width, height, fps, "Recording started");
        Ok(Ffmpeg { process, stdin: Some(stdin), frames: 0 })
    }

    pub fn write(&mut self, image: &Image) -> Result<()> {
        let stdin = self.stdin.as_mut().context("ffmpeg stdin already closed")?;
        let width = image.width() as usize;
        let height = image.height() as usize;
        let row_len = width * 4; // 4 bytes per pixel (RGBA)

        // SAFETY: the framebuffer image is RGBA8, so its buffer holds exactly
        // width * height * 4 bytes and lives as long as `image`.
        let pixels = unsafe {
            std::slice::from_raw_parts(image.data() as *const u8, row_len * height)
        };

        // raylib hands render textures over bottom-up; ffmpeg wants top-down.
        for row in pixels.chunks_exact(row_len).rev() {
            stdin.write_all(row).context("Failed to write to ffmpeg stdin")?;
        }
        self.frames += 1;
        Ok(())
    }

    pub fn finish(mut self) -> Result<()> {
        self.stdin = None;
        let status = self.process.wait().context("Failed to wait for ffmpeg process")?;
        tracing::info!(frames = self.frames, %status, "Recording finished");
        anyhow::ensure!(status.success(), "ffmpeg exited with {status}");
        Ok(())
    }
}

impl Drop for Ffmpeg {
    fn drop(&mut self) {
        // Close stdin pipe and wait for ffmpeg to finish
        if self.stdin.take().is_some() {
            if let Err(e) = self.process.wait() {
                tracing::warn!(error = %e, "Failed to wait for ffmpeg process");
            }
        }
    }
}
