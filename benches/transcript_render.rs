use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use neurochat::core::app::App;
use neurochat::core::message::Message;
use neurochat::ui::renderer::build_transcript_lines;

fn make_app(n_pairs: usize, base: &str, markdown: bool) -> App {
    let mut app = App::new("neuroswitch");
    app.markdown_enabled = markdown;
    app.syntax_enabled = markdown;
    for i in 0..n_pairs {
        app.append_message(Message::user(format!("{base} {i}")));
        app.append_message(Message::assistant(
            base.to_string(),
            Some("claude".to_string()),
            None,
        ));
    }
    app
}

fn bench_transcript_render(c: &mut Criterion) {
    let base = "Some **markdown** with `inline code` and a list:\n- one\n- two";
    let mut group = c.benchmark_group("transcript_render");
    for &n in &[10usize, 100] {
        group.throughput(Throughput::Elements(n as u64));
        for &(label, markdown) in &[("markdown", true), ("plain", false)] {
            let app = make_app(n, base, markdown);
            group.bench_with_input(BenchmarkId::new(label, n), &app, |b, app| {
                b.iter(|| build_transcript_lines(app));
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_transcript_render);
criterion_main!(benches);
