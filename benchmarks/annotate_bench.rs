use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use feedflow_core::{FeedSource, NoopResolver, Renderer, Twitter};
use serde_json::{Value, json};
use std::hint::black_box;

fn generate_timeline(count: usize) -> Vec<Value> {
    (0..count)
        .map(|i| {
            json!({
                "id_str": i.to_string(),
                "created_at": format!("Wed Oct {:02} 20:19:24 +0000 2018", 1 + i % 28),
                "full_text": format!(
                    "@user{i} shipped #release{} today, notes at https://t.co/abc{i} #rust #wasm",
                    i % 7
                ),
                "user": {
                    "name": format!("User {i}"),
                    "screen_name": format!("user{i}"),
                    "profile_image_url": "http://pbs.example/avatar.png"
                }
            })
        })
        .collect()
}

fn benchmark_pipeline(c: &mut Criterion) {
    let items = generate_timeline(1_000);
    let twitter = Twitter::new();
    let renderer = Renderer::default();
    let mut group = c.benchmark_group("feed_render");

    group.throughput(Throughput::Elements(items.len() as u64));

    // Full batch: annotation, templates and fragment rewriting.
    group.bench_function("twitter_parse", |b| {
        b.iter(|| {
            let output = twitter.parse(black_box(&items), &renderer, &NoopResolver);
            black_box(output.len())
        })
    });

    // Annotation alone over the same bodies.
    let bodies: Vec<&str> = items
        .iter()
        .filter_map(|item| item["full_text"].as_str())
        .collect();
    group.bench_function("annotate_mentions", |b| {
        b.iter(|| {
            for body in &bodies {
                black_box(renderer.format_user_names(black_box(body), "https://twitter.com/"));
            }
        })
    });

    group.finish();
}

criterion_group!(benches, benchmark_pipeline);
criterion_main!(benches);
