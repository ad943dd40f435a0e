// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The renderer.  Owns the pixel grid for the duration of one render:
//! projects every pixel's 2x2 sub-grid onto the complex plane, colors
//! the sub-samples with the selected strategy, averages them, and
//! encodes the finished grid as a PNG to whatever sink the caller
//! hands in.
//!
//! Every pixel is a pure function of its coordinates, the options,
//! and the strategy, so the grid can be filled by row bands in
//! parallel.  The sequential fill exists for single-threaded callers
//! and as the reference the banded fill must agree with.

use image::png::PNGEncoder;
use image::ColorType;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use color::{average, ColorFunction, Rgba, BLACK};
use error::RenderError;
use planes::{PlaneMapper, RenderOptions};

/// A shared handle that tells an in-flight render to stop.  The
/// renderer checks it between rows, so a render of a hostile
/// viewport/zoom combination can be bounded by its caller.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// A fresh, uncancelled token.
    pub fn new() -> CancelToken {
        CancelToken::default()
    }

    /// Asks the render holding this token to stop at the next row
    /// boundary.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether [`CancelToken::cancel`] has been called.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Renders one viewport of the complex plane onto one pixel grid.
/// Requires the rendering options, validated up front, and the color
/// strategy to apply; both are immutable for the life of the
/// renderer, so concurrent row bands share them freely.
pub struct Renderer {
    options: RenderOptions,
    mapper: PlaneMapper,
    color: ColorFunction,
    threads: usize,
    cancel: CancelToken,
}

impl Renderer {
    /// Constructor.  Fails with `InvalidConfiguration` before any
    /// pixel work if the options describe an unrenderable viewport or
    /// grid.
    pub fn new(color: ColorFunction, options: RenderOptions) -> Result<Renderer, RenderError> {
        let mapper = PlaneMapper::new(&options)?;
        Ok(Renderer {
            options,
            mapper,
            color,
            threads: 1,
            cancel: CancelToken::new(),
        })
    }

    /// Sets the number of worker threads used to fill the grid.
    /// Counts below one are treated as one.
    pub fn threads(mut self, threads: usize) -> Renderer {
        self.threads = if threads == 0 { 1 } else { threads };
        self
    }

    /// A handle that can stop this render from another thread.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Computes the full RGBA grid, row-major, top row first, without
    /// encoding it.  This is the whole render except for the sink.
    pub fn render_raw(&self) -> Result<Vec<u8>, RenderError> {
        let mut pixels = vec![0u8; self.options.width * self.options.height * 4];
        if self.threads > 1 {
            self.fill_banded(&mut pixels);
        } else {
            self.fill(&mut pixels);
        }
        if self.cancel.is_cancelled() {
            return Err(RenderError::Cancelled);
        }
        Ok(pixels)
    }

    /// The public render operation: compute the grid, then encode it
    /// as an RGBA8 PNG to the sink.  A cancelled render never reaches
    /// the encoder.
    pub fn render<W: Write>(&self, sink: W) -> Result<(), RenderError> {
        let pixels = self.render_raw()?;
        let encoder = PNGEncoder::new(sink);
        encoder.encode(
            &pixels,
            self.options.width as u32,
            self.options.height as u32,
            ColorType::RGBA(8),
        )?;
        Ok(())
    }

    /// One pixel: sample the 2x2 sub-grid at offsets {0, 0.5}, color
    /// each sub-sample, and average.
    fn shade_pixel(&self, px: usize, py: usize) -> Rgba {
        let mut samples = [BLACK; 4];
        for (slot, (sy, sx)) in iproduct!(0..2u32, 0..2u32).enumerate() {
            let z =
                self.mapper
                    .subpixel_to_point(px, py, f64::from(sx) / 2.0, f64::from(sy) / 2.0);
            samples[slot] = self.color.color_at(z);
        }
        average(&samples)
    }

    fn fill_rows(&self, rows: &mut [u8], top: usize) {
        let width = self.options.width;
        for (index, row) in rows.chunks_mut(width * 4).enumerate() {
            if self.cancel.is_cancelled() {
                return;
            }
            for px in 0..width {
                let Rgba(quad) = self.shade_pixel(px, top + index);
                row[px * 4..px * 4 + 4].copy_from_slice(&quad);
            }
        }
    }

    /// The single-threaded fill, row-major from the top.
    fn fill(&self, pixels: &mut [u8]) {
        self.fill_rows(pixels, 0);
    }

    /// Splits the grid into contiguous row bands, one per worker, and
    /// fills them on scoped threads.  The bands are disjoint and the
    /// scope join is the barrier before encoding.
    fn fill_banded(&self, pixels: &mut [u8]) {
        let band_rows = (self.options.height + self.threads - 1) / self.threads;
        let band_len = band_rows * self.options.width * 4;
        crossbeam::scope(|spawner| {
            for (index, band) in pixels.chunks_mut(band_len).enumerate() {
                spawner.spawn(move |_| {
                    self.fill_rows(band, index * band_rows);
                });
            }
        })
        .unwrap();
    }
}

/// The render entry point: resolve the strategy by name (unknown
/// names fall back to `"mandelbrot"`), spread the fill across the
/// machine's cores, and encode to the sink.
pub fn render<W: Write>(
    sink: W,
    function_name: &str,
    options: RenderOptions,
) -> Result<(), RenderError> {
    Renderer::new(ColorFunction::resolve(function_name), options)?
        .threads(num_cpus::get())
        .render(sink)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(size: usize) -> RenderOptions {
        RenderOptions {
            width: size,
            height: size,
            ..RenderOptions::default()
        }
    }

    fn raw(color: ColorFunction, opts: RenderOptions, threads: usize) -> Vec<u8> {
        Renderer::new(color, opts)
            .unwrap()
            .threads(threads)
            .render_raw()
            .unwrap()
    }

    fn pixel(pixels: &[u8], width: usize, px: usize, py: usize) -> [u8; 4] {
        let at = (py * width + px) * 4;
        [pixels[at], pixels[at + 1], pixels[at + 2], pixels[at + 3]]
    }

    #[test]
    fn rejects_empty_grid() {
        let opts = RenderOptions {
            width: 0,
            ..RenderOptions::default()
        };
        let err = Renderer::new(ColorFunction::Mandelbrot, opts)
            .err()
            .expect("a zero-width grid must be rejected");
        match err {
            RenderError::InvalidConfiguration(_) => {}
            other => panic!("expected InvalidConfiguration, got {:?}", other),
        }
    }

    #[test]
    fn mandelbrot_corners_escape_and_center_does_not() {
        let pixels = raw(ColorFunction::Mandelbrot, options(16), 1);
        let black = [0, 0, 0, 255];
        for &(px, py) in &[(0, 0), (15, 0), (0, 15), (15, 15)] {
            assert_ne!(pixel(&pixels, 16, px, py), black);
        }
        // The pixel whose corner lands on the origin.
        assert_eq!(pixel(&pixels, 16, 8, 8), black);
    }

    #[test]
    fn corner_pixels_escape_immediately_to_red() {
        // All four sub-samples of the top-left pixel have |z| > 2 and
        // escape on iteration zero, so the average is exact.
        let pixels = raw(ColorFunction::Mandelbrot, options(16), 1);
        assert_eq!(pixel(&pixels, 16, 0, 0), [255, 0, 0, 255]);
    }

    #[test]
    fn banded_fill_matches_sequential_fill() {
        for threads in &[2, 3, 8] {
            assert_eq!(
                raw(ColorFunction::Newton, options(33), *threads),
                raw(ColorFunction::Newton, options(33), 1)
            );
        }
    }

    #[test]
    fn zoom_keeps_the_center_and_moves_the_edges() {
        let base = raw(ColorFunction::Mandelbrot, options(16), 1);
        let zoomed = raw(
            ColorFunction::Mandelbrot,
            RenderOptions {
                zoom: 2.0,
                ..options(16)
            },
            1,
        );
        assert_eq!(pixel(&base, 16, 8, 8), pixel(&zoomed, 16, 8, 8));
        assert_ne!(pixel(&base, 16, 0, 0), pixel(&zoomed, 16, 0, 0));
    }

    #[test]
    fn cancelled_render_reaches_no_sink() {
        let renderer = Renderer::new(ColorFunction::Mandelbrot, options(64)).unwrap();
        renderer.cancel_token().cancel();
        let mut sink = Vec::new();
        let err = renderer
            .render(&mut sink)
            .err()
            .expect("a cancelled render must not succeed");
        match err {
            RenderError::Cancelled => {}
            other => panic!("expected Cancelled, got {:?}", other),
        }
        assert!(sink.is_empty());
    }

    #[test]
    fn unknown_function_renders_like_mandelbrot() {
        let mut expected = Vec::new();
        render(&mut expected, "mandelbrot", options(16)).unwrap();
        let mut actual = Vec::new();
        render(&mut actual, "no-such-function", options(16)).unwrap();
        assert_eq!(actual, expected);
    }

    #[test]
    fn render_emits_a_png() {
        let mut sink = Vec::new();
        render(&mut sink, "sqrt", options(8)).unwrap();
        assert_eq!(&sink[..8], &[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n']);
    }
}
