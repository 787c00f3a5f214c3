use celllab::{BorderConfig, BorderPolicy, BorderResolver, Grid, RuleSet, step, step_parallel};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

fn make_grid(width: i32, height: i32) -> Grid {
    let mut grid = Grid::new(width, height).unwrap();
    for y in 0..height {
        for x in 0..width {
            if (x + y) % 3 == 0 {
                grid.set_true(x, y);
            }
        }
    }
    grid
}

fn bench_step(c: &mut Criterion) {
    let rules = RuleSet::conway();
    let mut group = c.benchmark_group("step");
    for policy in [BorderPolicy::Off, BorderPolicy::Loop, BorderPolicy::Fold] {
        let resolver = BorderResolver::new(BorderConfig::uniform(policy));
        for size in [64, 128, 256] {
            let grid = make_grid(size, size);
            let id = format!("{policy}/{size}");

            group.bench_with_input(BenchmarkId::new("serial", &id), &grid, |b, grid| {
                b.iter(|| step(grid, size, size, &resolver, &rules).unwrap());
            });

            group.bench_with_input(BenchmarkId::new("parallel", &id), &grid, |b, grid| {
                b.iter(|| step_parallel(grid, size, size, &resolver, &rules).unwrap());
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_step);
criterion_main!(benches);
