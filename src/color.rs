// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The color strategies.  Each strategy is a pure, total function
//! from one complex number to one color; the renderer picks a
//! strategy once per render and applies it to every sub-sample.
//!
//! Two of the strategies are iterative: the Mandelbrot coloring
//! measures how quickly the orbit of a point escapes to infinity, and
//! the Newton coloring measures which root of `z^4 - 1` the point
//! falls into and how quickly.  The other two apply `acos` or `sqrt`
//! exactly once and plot the real and imaginary parts of the result
//! directly as chroma.

use num::Complex;

/// One 8-bit RGBA quad, in display order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Rgba(pub [u8; 4]);

/// Opaque black, the color of every point that stays inside its
/// iteration budget.
pub const BLACK: Rgba = Rgba([0, 0, 0, 255]);

const MANDELBROT_ITERATIONS: u32 = 200;
const NEWTON_ITERATIONS: u32 = 37;
const NEWTON_EPSILON: f64 = 1e-6;

/// The classic escape-time coloring.  Iterates `v = v*v + z` from
/// zero and colors the point by the iteration at which the orbit left
/// the circle of radius 2, mapped to a fully saturated hue.  Points
/// whose orbits never leave are in the set, and are black.
pub fn mandelbrot(z: Complex<f64>) -> Rgba {
    let mut v = Complex { re: 0.0, im: 0.0 };
    for n in 0..MANDELBROT_ITERATIONS {
        v = v * v + z;
        if v.norm_sqr() > 4.0 {
            let hue = f64::from(n) / f64::from(MANDELBROT_ITERATIONS);
            return hsv_to_rgb(hue, 1.0, 1.0);
        }
    }
    BLACK
}

/// Newton's method for `f(z) = z^4 - 1`.  The iteration
/// `z = z - (z^4 - 1)/(4z^3)` pulls almost every starting point into
/// one of the four roots; the root picks the hue (red, green, blue,
/// yellow for `1`, `-1`, `i`, `-i`) and the iteration count picks the
/// shade, brighter for faster convergence.  Roots are tested in that
/// fixed order every iteration and the first one within tolerance
/// wins.  Points that never settle are black.
pub fn newton(mut z: Complex<f64>) -> Rgba {
    let roots = [
        Complex::new(1.0, 0.0),
        Complex::new(-1.0, 0.0),
        Complex::new(0.0, 1.0),
        Complex::new(0.0, -1.0),
    ];
    for n in 0..NEWTON_ITERATIONS {
        z = z - (z * z * z * z - 1.0) / (4.0 * z * z * z);
        for (i, root) in roots.iter().enumerate() {
            if (z - *root).norm() < NEWTON_EPSILON {
                let shade = (255 - 255 * n / NEWTON_ITERATIONS) as u8;
                return match i {
                    0 => Rgba([shade, 0, 0, 255]),
                    1 => Rgba([0, shade, 0, 255]),
                    2 => Rgba([0, 0, shade, 255]),
                    _ => Rgba([shade, shade, 0, 255]),
                };
            }
        }
    }
    BLACK
}

/// Plots the inverse cosine: the real part of `acos(z)` becomes the
/// blue-difference chroma and the imaginary part the red-difference,
/// on a bright luma.
pub fn acos(z: Complex<f64>) -> Rgba {
    chroma_plot(192, z.acos())
}

/// Plots the principal square root, the same way as [`acos`] but on a
/// mid-grey luma.
pub fn sqrt(z: Complex<f64>) -> Rgba {
    chroma_plot(128, z.sqrt())
}

fn chroma_plot(luma: u8, v: Complex<f64>) -> Rgba {
    let blue = ((v.re * 128.0) as u8).wrapping_add(127);
    let red = ((v.im * 128.0) as u8).wrapping_add(127);
    ycbcr_to_rgb(luma, blue, red)
}

/// The standard six-sector HSV to RGB conversion.  All three inputs
/// are expected in [0, 1].
fn hsv_to_rgb(h: f64, s: f64, v: f64) -> Rgba {
    let i = (h * 6.0) as i32;
    let f = h * 6.0 - f64::from(i);
    let p = v * (1.0 - s);
    let q = v * (1.0 - f * s);
    let t = v * (1.0 - (1.0 - f) * s);
    let (r, g, b) = match i % 6 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    Rgba([
        (r * 255.0) as u8,
        (g * 255.0) as u8,
        (b * 255.0) as u8,
        255,
    ])
}

/// JPEG-style fixed-point Y'CbCr to RGB conversion, 16 bits of
/// fraction, clamped per channel.
fn ycbcr_to_rgb(y: u8, cb: u8, cr: u8) -> Rgba {
    let yy = i32::from(y) * 0x0001_0101;
    let cb = i32::from(cb) - 128;
    let cr = i32::from(cr) - 128;
    let narrow = |v: i32| -> u8 {
        if v < 0 {
            0
        } else if v > 0x00ff_ffff {
            255
        } else {
            (v >> 16) as u8
        }
    };
    Rgba([
        narrow(yy + 91_881 * cr),
        narrow(yy - 22_554 * cb - 46_802 * cr),
        narrow(yy + 116_130 * cb),
        255,
    ])
}

/// Averages a pixel's sub-samples channel-wise.  Each 8-bit channel
/// is widened to 16 bits before summing and narrowed back afterward;
/// averaging in the 8-bit domain rounds differently along strategy
/// boundaries and would change the output.
pub fn average(samples: &[Rgba]) -> Rgba {
    assert!(!samples.is_empty());
    let mut acc = [0u32; 4];
    for sample in samples {
        for (chan, acc) in sample.0.iter().zip(acc.iter_mut()) {
            *acc += u32::from(*chan) * 0x101;
        }
    }
    let count = samples.len() as u32;
    let mut out = [0u8; 4];
    for (acc, out) in acc.iter().zip(out.iter_mut()) {
        *out = ((acc / count) >> 8) as u8;
    }
    Rgba(out)
}

/// The selectable color strategies, one variant per function.
/// Selection by name happens once per render; the per-sample dispatch
/// is a plain match.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ColorFunction {
    /// Escape-time coloring of the Mandelbrot set.
    Mandelbrot,
    /// Root-convergence coloring of Newton's method on `z^4 - 1`.
    Newton,
    /// Direct plot of the complex inverse cosine.
    Acos,
    /// Direct plot of the complex square root.
    Sqrt,
}

impl ColorFunction {
    /// The names [`ColorFunction::from_name`] recognizes.
    pub const NAMES: [&'static str; 4] = ["mandelbrot", "newton", "acos", "sqrt"];

    /// Looks a strategy up by name.
    pub fn from_name(name: &str) -> Option<ColorFunction> {
        match name {
            "mandelbrot" => Some(ColorFunction::Mandelbrot),
            "newton" => Some(ColorFunction::Newton),
            "acos" => Some(ColorFunction::Acos),
            "sqrt" => Some(ColorFunction::Sqrt),
            _ => None,
        }
    }

    /// Looks a strategy up by name, falling back to the Mandelbrot
    /// coloring for anything unrecognized.  The fallback is
    /// diagnostic, never fatal.
    pub fn resolve(name: &str) -> ColorFunction {
        ColorFunction::from_name(name).unwrap_or_else(|| {
            warn!(
                "unknown function {:?}, falling back to \"mandelbrot\"",
                name
            );
            ColorFunction::Mandelbrot
        })
    }

    /// Applies the strategy to one point.
    pub fn color_at(self, z: Complex<f64>) -> Rgba {
        match self {
            ColorFunction::Mandelbrot => mandelbrot(z),
            ColorFunction::Newton => newton(z),
            ColorFunction::Acos => acos(z),
            ColorFunction::Sqrt => sqrt(z),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mandelbrot_interior_is_black() {
        assert_eq!(mandelbrot(Complex::new(0.0, 0.0)), BLACK);
        assert_eq!(mandelbrot(Complex::new(-1.0, 0.0)), BLACK);
    }

    #[test]
    fn mandelbrot_immediate_escape_is_pure_red() {
        // |z| > 2 escapes on the first iteration, hue 0.
        assert_eq!(
            mandelbrot(Complex::new(-2.0, -2.0)),
            Rgba([255, 0, 0, 255])
        );
    }

    #[test]
    fn mandelbrot_escape_is_fully_saturated() {
        // A point just outside the set: whatever the hue, one channel
        // is at full value and one at zero.
        let Rgba(c) = mandelbrot(Complex::new(0.3, 0.6));
        assert_ne!(Rgba(c), BLACK);
        assert!(c[..3].iter().any(|&v| v == 255));
        assert!(c[..3].iter().any(|&v| v == 0));
    }

    #[test]
    fn newton_exact_roots_get_maximum_shade() {
        assert_eq!(newton(Complex::new(1.0, 0.0)), Rgba([255, 0, 0, 255]));
        assert_eq!(newton(Complex::new(-1.0, 0.0)), Rgba([0, 255, 0, 255]));
        assert_eq!(newton(Complex::new(0.0, 1.0)), Rgba([0, 0, 255, 255]));
        assert_eq!(newton(Complex::new(0.0, -1.0)), Rgba([255, 255, 0, 255]));
    }

    #[test]
    fn newton_shade_darkens_with_distance() {
        // A point in the basin of 1 but away from it converges later,
        // so its red channel is dimmer than the root's own.
        let Rgba(c) = newton(Complex::new(2.5, 0.0));
        assert!(c[0] > 0 && c[0] < 255);
        assert_eq!(&c[1..], &[0, 0, 255]);
    }

    #[test]
    fn newton_origin_is_black() {
        // The derivative vanishes at zero; the iteration goes nowhere.
        assert_eq!(newton(Complex::new(0.0, 0.0)), BLACK);
    }

    #[test]
    fn ycbcr_grey_point_maps_to_grey() {
        assert_eq!(ycbcr_to_rgb(192, 128, 128), Rgba([192, 192, 192, 255]));
        assert_eq!(ycbcr_to_rgb(128, 128, 128), Rgba([128, 128, 128, 255]));
    }

    #[test]
    fn chroma_strategies_are_opaque_everywhere() {
        for z in &[
            Complex::new(0.0, 0.0),
            Complex::new(-2.0, 2.0),
            Complex::new(1.5, -0.5),
        ] {
            assert_eq!(acos(*z).0[3], 255);
            assert_eq!(sqrt(*z).0[3], 255);
        }
    }

    #[test]
    fn average_of_identical_samples_is_identity() {
        let c = Rgba([12, 200, 99, 255]);
        assert_eq!(average(&[c, c, c, c]), c);
    }

    #[test]
    fn average_mixes_channelwise() {
        let black = Rgba([0, 0, 0, 255]);
        let white = Rgba([255, 255, 255, 255]);
        assert_eq!(
            average(&[black, white, black, white]),
            Rgba([127, 127, 127, 255])
        );
    }

    #[test]
    fn names_round_trip() {
        for name in &ColorFunction::NAMES {
            assert!(ColorFunction::from_name(name).is_some());
        }
        assert_eq!(ColorFunction::from_name("plasma"), None);
    }

    #[test]
    fn unknown_names_resolve_to_mandelbrot() {
        assert_eq!(ColorFunction::resolve("plasma"), ColorFunction::Mandelbrot);
        assert_eq!(ColorFunction::resolve("newton"), ColorFunction::Newton);
    }
}
