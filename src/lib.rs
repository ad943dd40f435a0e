#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Complex-plane function renderer
//!
//! Renders raster images of functions evaluated over the complex
//! plane.  Every pixel of the output corresponds to a point on a
//! rectangle of the complex plane; a color strategy turns that point
//! into a color.  Four strategies are provided: the classic
//! escape-time Mandelbrot coloring, where the hue encodes how quickly
//! the orbit of `v = v*v + z` flees to infinity; a Newton fractal for
//! `z^4 - 1`, where the color names the root the iteration converged
//! to and the shade how quickly it got there; and two direct
//! visualizations that plot the real and imaginary parts of `acos(z)`
//! and `sqrt(z)` as chroma.
//!
//! Each pixel is supersampled on a 2x2 sub-grid and the four colors
//! are averaged before being written out, which smooths the
//! boundaries where these functions are at their most violent.  The
//! finished grid is encoded as a PNG to any writable sink, so the
//! same renderer serves a file on disk or an HTTP response body.

extern crate crossbeam;
#[macro_use]
extern crate failure;
extern crate image;
#[macro_use]
extern crate itertools;
#[macro_use]
extern crate log;
extern crate num;
extern crate num_cpus;

pub mod color;
pub mod error;
pub mod planes;
pub mod render;

pub use color::ColorFunction;
pub use error::RenderError;
pub use planes::RenderOptions;
pub use render::{render, CancelToken, Renderer};
