use criterion::{black_box, criterion_group, criterion_main, Criterion};
use manip::tasks;

const ACTION: [f64; 4] = [0.2, 0.5, -0.1, 0.3];

fn bench_step(c: &mut Criterion) {
    for name in tasks::NAMES {
        let mut env = tasks::make(name, 0).unwrap();
        env.reset().unwrap();
        c.bench_function(&format!("{name}/step"), |b| {
            b.iter(|| {
                if env.path_exhausted() {
                    env.reset().unwrap();
                }
                black_box(env.step(black_box(&ACTION)).unwrap())
            });
        });
    }
}

fn bench_reset(c: &mut Criterion) {
    let mut env = tasks::make(tasks::BUTTON_PRESS, 0).unwrap();
    c.bench_function("button-press/reset", |b| b.iter(|| black_box(env.reset().unwrap())));
}

criterion_group!(benches, bench_step, bench_reset);
criterion_main!(benches);
