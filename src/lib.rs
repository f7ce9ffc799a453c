pub mod core;
pub mod analysis;
pub mod index;
pub mod codec;
pub mod storage;
pub mod store;
pub mod builder;
pub mod query;
pub mod scoring;

/*
┌────────────────────────────────────────────────────────────────────────────┐
│                         SPIMI SEARCH CORE — LAYOUT                         │
├────────────────────────────────────────────────────────────────────────────┤
│ analysis::{token, tokenizer, source}   tokenizer + document source         │
│                                         (external collaborators, §6)       │
│ index::{posting, memory_index}         posting records + in-memory index   │
│                                         (components A, B)                  │
│ codec::postings                        binary postings codec (component C)│
│ storage::{layout, bucket}              on-disk layout + bucket spills      │
│                                         (component D)                      │
│ store::{metadata, directory}           term directory + doc metadata       │
│                                         (component F)                      │
│ builder::spimi                         SPIMI build + k-way merge           │
│                                         (component E)                      │
│ index::reader                          positional index reader             │
│                                         (component G)                     │
│ query::{ast, parser, eval}             Boolean/phrase query language       │
│                                         (component H)                     │
│ scoring::scorer                        TF-IDF / BM25 ranked scoring        │
│                                         (component I)                     │
└────────────────────────────────────────────────────────────────────────────┘
*/
