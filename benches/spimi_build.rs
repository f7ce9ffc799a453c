use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::Rng;

use spimi_search::analysis::source::{DocumentRecord, DocumentSource};
use spimi_search::analysis::tokenizer::{StandardTokenizer, Tokenizer};
use spimi_search::builder::spimi::{build_index, NeverCancelled};
use spimi_search::core::config::IndexConfig;
use spimi_search::core::error::Result;
use spimi_search::core::types::DocId;

const VOCAB: &[&str] = &[
    "alpha", "bravo", "charlie", "delta", "echo", "foxtrot", "golf", "hotel", "india", "juliet",
];

struct SyntheticSource {
    documents: Vec<DocumentRecord>,
}

impl SyntheticSource {
    fn generate(doc_count: usize, words_per_doc: usize) -> Self {
        let mut rng = rand::thread_rng();
        let documents = (0..doc_count)
            .map(|i| {
                let content = (0..words_per_doc)
                    .map(|_| VOCAB[rng.gen_range(0..VOCAB.len())])
                    .collect::<Vec<_>>()
                    .join(" ");
                DocumentRecord { doc_id: DocId::new(i as u32), title: format!("doc{i}"), content }
            })
            .collect();
        SyntheticSource { documents }
    }
}

impl DocumentSource for SyntheticSource {
    fn documents(&self) -> Result<Vec<DocumentRecord>> {
        Ok(self.documents.clone())
    }
}

fn bench_spill_and_merge(c: &mut Criterion) {
    let source = SyntheticSource::generate(200, 500);
    let tokenizer = StandardTokenizer::default();
    black_box(tokenizer.name());

    c.bench_function("spimi_build_small_corpus", |b| {
        b.iter(|| {
            let dir = tempfile::tempdir().unwrap();
            // A tiny memory limit forces multiple spills per run, exercising
            // the bucket-spill and k-way-merge path rather than a single
            // in-memory flush.
            let config = IndexConfig::new(dir.path()).with_memory_limit_bytes(4096);
            build_index(&config, &source, &tokenizer, &NeverCancelled).unwrap();
        });
    });
}

criterion_group!(benches, bench_spill_and_merge);
criterion_main!(benches);
