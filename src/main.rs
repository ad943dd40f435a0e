// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

extern crate clap;
extern crate env_logger;
extern crate fractalplane;
#[macro_use]
extern crate log;
extern crate num;
extern crate num_cpus;

mod server;

use clap::{App, Arg, ArgMatches};
use fractalplane::{ColorFunction, RenderOptions, Renderer};
use num::Complex;
use std::fs::File;
use std::str::FromStr;

fn parse_pair<T>(s: &str, separator: char) -> Option<(T, T)>
where
    T: FromStr,
{
    match s.find(separator) {
        None => None,
        Some(index) => match (T::from_str(&s[..index]), T::from_str(&s[index + 1..])) {
            (Ok(l), Ok(r)) => Some((l, r)),
            _ => None,
        },
    }
}

fn parse_complex(s: &str) -> Option<Complex<f64>> {
    match parse_pair(s, ',') {
        Some((re, im)) => Some(Complex { re, im }),
        None => None,
    }
}

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(), String> {
    match parse_pair::<T>(s, separator) {
        Some(_) => Ok(()),
        None => Err(err.to_string()),
    }
}

fn validate_number<T: FromStr>(s: &str, err: &str) -> Result<(), String> {
    match T::from_str(s) {
        Ok(_) => Ok(()),
        Err(_) => Err(err.to_string()),
    }
}

fn validate_range<T: FromStr + Ord>(
    s: &str,
    low: T,
    high: T,
    isnotanumber_err: &str,
    isnotinrange_err: &str,
) -> Result<(), String> {
    match T::from_str(s) {
        Ok(i) => {
            if i >= low && i <= high {
                Ok(())
            } else {
                Err(isnotinrange_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

const OUTPUT: &str = "output";
const FUNCTION: &str = "function";
const SIZE: &str = "size";
const LEFTLOWER: &str = "leftlower";
const RIGHTUPPER: &str = "rightupper";
const ZOOM: &str = "zoom";
const THREADS: &str = "threads";
const SERVE: &str = "serve";
const PORT: &str = "port";

fn args<'a>() -> ArgMatches<'a> {
    let max_threads = num_cpus::get();

    App::new("fractalplane")
        .version("0.1.0")
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Complex-plane function renderer")
        .arg(
            Arg::with_name(OUTPUT)
                .required_unless(SERVE)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .help("Output file"),
        )
        .arg(
            Arg::with_name(FUNCTION)
                .required(false)
                .long(FUNCTION)
                .short("f")
                .takes_value(true)
                .default_value("mandelbrot")
                .help("Function to render: mandelbrot, newton, acos, or sqrt"),
        )
        .arg(
            Arg::with_name(SIZE)
                .required(false)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("1024x1024")
                .validator(|s| validate_pair::<usize>(&s, 'x', "Could not parse output image size"))
                .help("Size of output image"),
        )
        .arg(
            Arg::with_name(LEFTLOWER)
                .required(false)
                .long(LEFTLOWER)
                .short("l")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("-2,-2")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse left lower corner"))
                .help("Left lower corner of the viewport"),
        )
        .arg(
            Arg::with_name(RIGHTUPPER)
                .required(false)
                .long(RIGHTUPPER)
                .short("r")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("2,2")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse right upper corner"))
                .help("Right upper corner of the viewport"),
        )
        .arg(
            Arg::with_name(ZOOM)
                .required(false)
                .long(ZOOM)
                .short("z")
                .takes_value(true)
                .default_value("1")
                .validator(|s| validate_number::<f64>(&s, "Could not parse zoom factor"))
                .help("Magnification about the center of the viewport"),
        )
        .arg(
            Arg::with_name(THREADS)
                .required(false)
                .long(THREADS)
                .short("t")
                .takes_value(true)
                .default_value("1")
                .validator(move |s| {
                    validate_range(
                        &s,
                        1,
                        max_threads,
                        "Could not parse thread count",
                        &format!("Thread count must be between 1 and {}", max_threads),
                    )
                })
                .help("Number of threads to use in renderer"),
        )
        .arg(
            Arg::with_name(SERVE)
                .required(false)
                .long(SERVE)
                .help("Serve renders over HTTP instead of writing a file"),
        )
        .arg(
            Arg::with_name(PORT)
                .required(false)
                .long(PORT)
                .short("p")
                .takes_value(true)
                .default_value("8080")
                .validator(|s| {
                    validate_range::<u16>(
                        &s,
                        1,
                        65535,
                        "Could not parse port number",
                        "Port must be between 1 and 65535",
                    )
                })
                .help("Port to serve on"),
        )
        .get_matches()
}

fn main() {
    env_logger::init();
    let matches = args();

    let image_size = parse_pair::<usize>(matches.value_of(SIZE).unwrap(), 'x')
        .expect("Error parsing image dimensions");
    let leftlower = parse_complex(matches.value_of(LEFTLOWER).unwrap())
        .expect("Error parsing left lower point");
    let rightupper = parse_complex(matches.value_of(RIGHTUPPER).unwrap())
        .expect("Error parsing right upper point");
    let zoom = f64::from_str(matches.value_of(ZOOM).unwrap()).expect("Could not parse zoom factor");
    let threads =
        usize::from_str(matches.value_of(THREADS).unwrap()).expect("Could not parse thread count");

    let options = RenderOptions {
        xmin: leftlower.re,
        xmax: rightupper.re,
        ymin: leftlower.im,
        ymax: rightupper.im,
        zoom,
        width: image_size.0,
        height: image_size.1,
    };

    if matches.is_present(SERVE) {
        let port =
            u16::from_str(matches.value_of(PORT).unwrap()).expect("Could not parse port number");
        if let Err(e) = server::serve(port, options, threads) {
            eprintln!("Server failure: {}", e);
            std::process::exit(1);
        }
        return;
    }

    let name = matches.value_of(FUNCTION).unwrap();
    let outfile = matches.value_of(OUTPUT).unwrap();
    let renderer = match Renderer::new(ColorFunction::resolve(name), options) {
        Ok(renderer) => renderer.threads(threads),
        Err(e) => {
            eprintln!("Render failure: {}", e);
            std::process::exit(1);
        }
    };
    let output = match File::create(outfile) {
        Ok(output) => output,
        Err(e) => {
            eprintln!("Could not create {}: {}", outfile, e);
            std::process::exit(1);
        }
    };
    match renderer.render(output) {
        Ok(()) => {
            info!("drew {} to {}", name, outfile);
            println!("Successfully drew fractal to {}", outfile);
        }
        Err(e) => {
            eprintln!("Render failure: {}", e);
            std::process::exit(1);
        }
    }
}
