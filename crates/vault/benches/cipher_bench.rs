use criterion::{black_box, criterion_group, criterion_main, Criterion};

use gatehouse_core::CredentialSecret;
use gatehouse_vault::{Cipher, EphemeralStore, MemoryBackend};

fn permissions_payload() -> String {
    let grants: Vec<String> = (0..40)
        .map(|i| {
            format!(r#"{{"resourceKey":"resource_{i}","allowedOperations":["read","create","update"]}}"#)
        })
        .collect();
    format!("[{}]", grants.join(","))
}

fn bench_cipher(c: &mut Criterion) {
    let cipher = Cipher::new(&CredentialSecret::new("bench-secret"));
    let payload = permissions_payload();
    let sealed = cipher.encrypt(&payload);

    c.bench_function("cipher_encrypt_permissions", |b| {
        b.iter(|| cipher.encrypt(black_box(&payload)))
    });

    c.bench_function("cipher_decrypt_permissions", |b| {
        b.iter(|| cipher.decrypt(black_box(&sealed)))
    });

    c.bench_function("cipher_decrypt_garbage", |b| {
        b.iter(|| cipher.decrypt(black_box("bm90IGEgcmVhbCBjaXBoZXJ0ZXh0IGF0IGFsbA==")))
    });
}

fn bench_store(c: &mut Criterion) {
    let store = EphemeralStore::new(
        MemoryBackend::new(),
        Cipher::new(&CredentialSecret::new("bench-secret")),
        "bench.",
    );
    let payload = permissions_payload();

    c.bench_function("store_set_get_permissions", |b| {
        b.iter(|| {
            store.set_item("permissions", black_box(&payload));
            store.get_item("permissions")
        })
    });
}

criterion_group!(benches, bench_cipher, bench_store);
criterion_main!(benches);
