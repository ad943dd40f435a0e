//! The ways a render can fail.  Configuration problems are caught
//! before any pixel work begins; encoding problems necessarily arrive
//! after the grid has already been computed.

use std::io;

/// Everything that can go wrong between receiving a set of rendering
/// options and delivering an encoded image.  An unrecognized function
/// name is deliberately not an error; it degrades to the default
/// strategy instead.
#[derive(Debug, Fail)]
pub enum RenderError {
    /// The rendering options describe a viewport or grid that cannot
    /// be rendered.  Reported before any pixel is computed.
    #[fail(display = "invalid rendering configuration: {}", _0)]
    InvalidConfiguration(String),

    /// The pixel grid was computed but could not be encoded to the
    /// sink.  The grid is not retried; the caller may render again
    /// with a different sink.
    #[fail(display = "could not encode image: {}", _0)]
    Encode(#[fail(cause)] io::Error),

    /// The render was cancelled between rows.  Nothing was encoded.
    #[fail(display = "render cancelled before completion")]
    Cancelled,
}

impl From<io::Error> for RenderError {
    fn from(err: io::Error) -> RenderError {
        RenderError::Encode(err)
    }
}
