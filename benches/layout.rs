use criterion::*;
use pmt_coverage::{Builder, CylinderLayout, FromBuilder, MemoryStore};

pub fn layout(c: &mut Criterion) {
    c.bench_function("layout 40%", |b| {
        b.iter(|| {
            CylinderLayout::builder()
                .photocathode_coverage(black_box(0.4))
                .build()
                .unwrap()
        })
    });
    c.bench_function("layout 40%, 1in photocathode", |b| {
        b.iter(|| {
            CylinderLayout::builder()
                .photocathode_radius(black_box(0.0254))
                .build()
                .unwrap()
        })
    });
}

pub fn publish(c: &mut Criterion) {
    let layout = CylinderLayout::builder().build().unwrap();
    c.bench_function("publish", |b| {
        b.iter(|| {
            let mut store = MemoryStore::new();
            layout.publish(&mut store);
            store
        })
    });
}

criterion_group!(benches, layout, publish);
criterion_main!(benches);
