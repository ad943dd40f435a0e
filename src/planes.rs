//! Contains the RenderOptions struct, which describes the rectangle
//! of the complex plane to be rendered and the integral grid it is
//! rendered onto, and the PlaneMapper struct, which maps sub-pixel
//! coordinates on that grid back to points on the complex plane.
use num::Complex;

use error::RenderError;

/// Describes one render: the bounds of the viewport on the complex
/// plane, a magnification applied about the center of those bounds,
/// and the width and height of the output grid in pixels.  Immutable
/// once constructed; one instance per render call.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RenderOptions {
    /// Left edge of the viewport on the real axis.
    pub xmin: f64,
    /// Right edge of the viewport on the real axis.
    pub xmax: f64,
    /// Lower edge of the viewport on the imaginary axis.
    pub ymin: f64,
    /// Upper edge of the viewport on the imaginary axis.
    pub ymax: f64,
    /// Magnification about the center of the bounds.  A zoom of 2
    /// renders half the span of the plane at the same grid size.
    pub zoom: f64,
    /// Width of the output grid in pixels.
    pub width: usize,
    /// Height of the output grid in pixels.
    pub height: usize,
}

impl Default for RenderOptions {
    fn default() -> RenderOptions {
        RenderOptions {
            xmin: -2.0,
            xmax: 2.0,
            ymin: -2.0,
            ymax: 2.0,
            zoom: 1.0,
            width: 1024,
            height: 1024,
        }
    }
}

impl RenderOptions {
    /// Checks every invariant the renderer depends on.  A failure
    /// here aborts the render before any pixel work begins.
    pub fn validate(&self) -> Result<(), RenderError> {
        if !(self.xmin.is_finite()
            && self.xmax.is_finite()
            && self.ymin.is_finite()
            && self.ymax.is_finite())
        {
            return Err(RenderError::InvalidConfiguration(
                "The viewport bounds must all be finite numbers.".to_string(),
            ));
        }
        if self.xmax <= self.xmin {
            return Err(RenderError::InvalidConfiguration(
                "The right edge of the viewport is not to the right of the left edge.".to_string(),
            ));
        }
        if self.ymax <= self.ymin {
            return Err(RenderError::InvalidConfiguration(
                "The upper edge of the viewport is not above the lower edge.".to_string(),
            ));
        }
        if !self.zoom.is_finite() || self.zoom <= 0.0 {
            return Err(RenderError::InvalidConfiguration(
                "The zoom factor must be a finite number greater than zero.".to_string(),
            ));
        }
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::InvalidConfiguration(
                "The output grid must be at least one pixel in each dimension.".to_string(),
            ));
        }
        Ok(())
    }
}

/// Contains the definitions of two planes: an integral cartesian
/// plane with its origin at 0,0, and a rectangle on the complex
/// plane.  Maps points from the first to the second.  The zoom is
/// folded in at construction time: the spans are divided by it and
/// the viewport is re-centered on the midpoint of the original
/// bounds, so magnification happens about the center, not a corner.
#[derive(Debug)]
pub struct PlaneMapper {
    width: f64,
    height: f64,
    xspan: f64,
    yspan: f64,
    xstart: f64,
    ystart: f64,
}

impl PlaneMapper {
    /// Constructor.  Validates the options, then precomputes the
    /// zoomed spans and the re-centered origin of the viewport.
    pub fn new(options: &RenderOptions) -> Result<PlaneMapper, RenderError> {
        options.validate()?;
        let xspan = (options.xmax - options.xmin) / options.zoom;
        let yspan = (options.ymax - options.ymin) / options.zoom;
        Ok(PlaneMapper {
            width: options.width as f64,
            height: options.height as f64,
            xspan,
            yspan,
            xstart: (options.xmin + options.xmax) / 2.0 - xspan / 2.0,
            ystart: (options.ymin + options.ymax) / 2.0 - yspan / 2.0,
        })
    }

    /// Given the column and row of a pixel and a sub-pixel offset
    /// into it, return the complex number at the equivalent location
    /// on the viewport.  Offsets of zero name the pixel's own corner;
    /// the supersampler passes 0.5 to reach the interior.
    pub fn subpixel_to_point(&self, px: usize, py: usize, dx: f64, dy: f64) -> Complex<f64> {
        Complex {
            re: (px as f64 + dx) / self.width * self.xspan + self.xstart,
            im: (py as f64 + dy) / self.height * self.yspan + self.ystart,
        }
    }

    /// The complex number at the pixel's corner, without a sub-pixel
    /// offset.
    pub fn pixel_to_point(&self, px: usize, py: usize) -> Complex<f64> {
        self.subpixel_to_point(px, py, 0.0, 0.0)
    }
}
