use criterion::{black_box, criterion_group, criterion_main, Criterion};
use idv_types::{Password, Pii, SessionId, UserId};

fn sample_pii() -> Pii {
    Pii {
        first_name: Some("Fakey".into()),
        last_name: Some("McFakerson".into()),
        dob: Some("1938-10-06".into()),
        ssn: Some("900-12-3456".into()),
        address1: Some("1 Fake St".into()),
        city: Some("Washington".into()),
        state: Some("DC".into()),
        zipcode: Some("20001".into()),
        ..Default::default()
    }
}

fn blake2b_256_bench(c: &mut Criterion) {
    let data = [0xABu8; 256];

    c.bench_function("blake2b_256_256B", |b| {
        b.iter(|| idv_crypto::blake2b_256(black_box(&data)))
    });
}

fn idempotency_key_bench(c: &mut Criterion) {
    let session = SessionId::new("a3f1c9e0-browser-session");
    let user = UserId::random();

    c.bench_function("derive_idempotency_key", |b| {
        b.iter(|| idv_crypto::derive_idempotency_key(black_box(&session), None, black_box(&user)))
    });
}

fn personal_key_bench(c: &mut Criterion) {
    c.bench_function("generate_personal_key", |b| {
        b.iter(idv_crypto::generate_personal_key)
    });
}

fn pii_round_trip_bench(c: &mut Criterion) {
    let pii = sample_pii();
    let password = Password::new("correct horse battery staple");
    let params = idv_crypto::KdfParams::insecure_fast();

    c.bench_function("encrypt_pii_fast_kdf", |b| {
        b.iter(|| idv_crypto::encrypt_pii(black_box(&pii), &password, &params))
    });

    let envelope = idv_crypto::encrypt_pii(&pii, &password, &params).unwrap();
    c.bench_function("decrypt_pii_fast_kdf", |b| {
        b.iter(|| idv_crypto::decrypt_pii(black_box(&envelope), &password))
    });
}

fn pii_production_kdf_bench(c: &mut Criterion) {
    let pii = sample_pii();
    let password = Password::new("correct horse battery staple");
    let params = idv_crypto::KdfParams::default();

    let mut group = c.benchmark_group("production_kdf");
    group.sample_size(10);
    group.bench_function("encrypt_pii", |b| {
        b.iter(|| idv_crypto::encrypt_pii(black_box(&pii), &password, &params))
    });
    group.finish();
}

criterion_group!(
    benches,
    blake2b_256_bench,
    idempotency_key_bench,
    personal_key_bench,
    pii_round_trip_bench,
    pii_production_kdf_bench,
);
criterion_main!(benches);
