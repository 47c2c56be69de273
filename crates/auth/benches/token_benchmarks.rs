use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use chrono::{Duration, Utc};
use inkwell_auth::{Hs256Jwt, JwtValidator, TokenIssuer, hash_password};
use inkwell_core::UserId;

fn bench_hash_password(c: &mut Criterion) {
    let mut group = c.benchmark_group("hash_password");
    for len in [8usize, 64, 1024] {
        let secret = "p".repeat(len);
        group.bench_with_input(BenchmarkId::from_parameter(len), &secret, |b, secret| {
            b.iter(|| hash_password(black_box(secret)))
        });
    }
    group.finish();
}

fn bench_tokens(c: &mut Criterion) {
    let jwt = Hs256Jwt::new("bench-secret").with_ttl(Some(Duration::hours(1)));
    let now = Utc::now();
    let token = jwt.issue(UserId::new(1), now).unwrap();

    c.bench_function("token_issue", |b| {
        b.iter(|| jwt.issue(black_box(UserId::new(1)), now))
    });

    c.bench_function("token_validate", |b| {
        b.iter(|| jwt.validate(black_box(&token), now))
    });
}

criterion_group!(benches, bench_hash_password, bench_tokens);
criterion_main!(benches);
