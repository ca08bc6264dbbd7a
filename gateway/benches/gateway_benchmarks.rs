//! Performance benchmarks for the LiveTranslate gateway
//!
//! Run with: cargo bench
//! Or for specific benchmarks: cargo bench -- <filter>

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use std::time::Duration;

use livetranslate_gateway::core::llm::anthropic::{MessageParam, MessagesRequest};
use livetranslate_gateway::core::stt::deepgram::DeepgramMessage;
use livetranslate_gateway::core::translate::{
    ConversationHistory, MAX_HISTORY_ENTRIES, TRANSLATOR_SYSTEM_PROMPT,
};

fn results_message(words: usize) -> String {
    let transcript = "hello world ".repeat(words / 2);
    format!(
        r#"{{"type":"Results","channel_index":[0,1],"duration":1.2,"start":3.4,"is_final":true,"speech_final":false,"channel":{{"alternatives":[{{"transcript":"{}","confidence":0.98,"words":[]}}]}}}}"#,
        transcript.trim_end()
    )
}

/// Classification of incoming Deepgram frames
fn bench_deepgram_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("deepgram_parsing");
    group.measurement_time(Duration::from_secs(5));

    let utterance_end = r#"{"type":"UtteranceEnd","channel":[0,1],"last_word_end":2.5}"#;
    let metadata = r#"{"type":"Metadata","transaction_key":"deprecated","request_id":"a1b2c3","sha256":"abc","created":"2024-01-01T00:00:00.000Z","duration":12.5,"channels":1}"#;
    let short_results = results_message(4);
    let long_results = results_message(200);

    for (name, msg) in [
        ("utterance_end", utterance_end.to_string()),
        ("metadata", metadata.to_string()),
        ("results_short", short_results),
        ("results_long", long_results),
    ] {
        group.throughput(Throughput::Bytes(msg.len() as u64));
        group.bench_with_input(BenchmarkId::new(name, msg.len()), &msg, |b, msg| {
            b.iter(|| DeepgramMessage::parse(black_box(msg)));
        });
    }

    group.finish();
}

/// Appends to a full history, which evicts on every call
fn bench_history(c: &mut Criterion) {
    let mut group = c.benchmark_group("history");

    let mut full = ConversationHistory::new();
    for i in 0..MAX_HISTORY_ENTRIES / 2 {
        full.append_exchange(
            MessageParam::user_text(format!("sentence {i} --> French")),
            MessageParam::assistant_text(format!("phrase {i}")),
        );
    }

    group.bench_function("append_at_capacity", |b| {
        let mut history = full.clone();
        b.iter(|| {
            history.append_exchange(
                MessageParam::user_text(black_box("Hello --> French")),
                MessageParam::assistant_text(black_box("Bonjour")),
            );
        });
    });

    group.bench_function("snapshot_full", |b| {
        b.iter(|| black_box(full.snapshot()));
    });

    group.bench_function("serialize_full_request", |b| {
        let request = MessagesRequest {
            model: "claude-3-opus-20240229".to_string(),
            max_tokens: 2000,
            temperature: Some(0.2),
            system: Some(TRANSLATOR_SYSTEM_PROMPT.to_string()),
            messages: full.snapshot(),
        };
        b.iter(|| serde_json::to_vec(black_box(&request)));
    });

    group.finish();
}

criterion_group!(benches, bench_deepgram_parsing, bench_history);

criterion_main!(benches);
