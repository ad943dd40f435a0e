#[macro_use]
extern crate criterion;
extern crate fractalplane;

use criterion::Criterion;
use fractalplane::{ColorFunction, RenderOptions, Renderer};

fn options(size: usize) -> RenderOptions {
    RenderOptions {
        width: size,
        height: size,
        ..RenderOptions::default()
    }
}

fn bench_strategies(c: &mut Criterion) {
    c.bench_function("mandelbrot 64x64", |b| {
        b.iter(|| {
            Renderer::new(ColorFunction::Mandelbrot, options(64))
                .unwrap()
                .render_raw()
                .unwrap()
        })
    });
    c.bench_function("newton 64x64", |b| {
        b.iter(|| {
            Renderer::new(ColorFunction::Newton, options(64))
                .unwrap()
                .render_raw()
                .unwrap()
        })
    });
}

criterion_group!(benches, bench_strategies);
criterion_main!(benches);
