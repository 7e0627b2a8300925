use cd_session::{UserRegistry, UserSession, CONSOLE_IDENT};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::Rng;

fn bench_registry_join_exit(c: &mut Criterion) {
    c.bench_function("registry_join_exit_1000", |b| {
        b.iter(|| {
            let registry = UserRegistry::new();
            for i in 0..1000 {
                registry.join(&format!("user_{i}"));
                registry.exit(&format!("user_{i}"));
            }
            black_box(registry.count());
        })
    });
}

fn bench_mute_cycle(c: &mut Criterion) {
    c.bench_function("mute_cycle_1000", |b| {
        b.iter(|| {
            let mut user = UserSession::new("bench");
            for i in 0..1000 {
                user.mute(CONSOLE_IDENT, &format!("reason {i}"));
                user.unmute(CONSOLE_IDENT);
            }
            black_box(user.mute_history().len());
        })
    });
}

fn bench_last_mute_lookup(c: &mut Criterion) {
    let registry = UserRegistry::new();
    let mut rng = rand::thread_rng();
    for i in 0..100 {
        let ident = format!("user_{i}");
        registry.join(&ident);
        for _ in 0..rng.gen_range(0..10) {
            registry.mute(&ident, CONSOLE_IDENT, "spam");
            registry.unmute(&ident, CONSOLE_IDENT);
        }
    }

    c.bench_function("last_mute_lookup_100", |b| {
        b.iter(|| {
            for i in 0..100 {
                black_box(registry.last_mute(&format!("user_{i}")));
            }
        })
    });
}

criterion_group!(benches, bench_registry_join_exit, bench_mute_cycle, bench_last_mute_lookup);
criterion_main!(benches);
