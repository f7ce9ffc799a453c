use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::error;

use spimi_search::analysis::source::DirectorySource;
use spimi_search::analysis::tokenizer::StandardTokenizer;
use spimi_search::builder::spimi::{build_index, NeverCancelled};
use spimi_search::core::config::IndexConfig;
use spimi_search::core::error::Error;
use spimi_search::index::reader::DiskIndexReader;
use spimi_search::query::{eval, parser};
use spimi_search::scoring::scorer::{self, Bm25Scorer, Scorer, TfIdfScorer};

/// CLI surface over the SPIMI search core (§6).
#[derive(Parser)]
#[command(name = "spimi")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build a fresh index from a corpus directory.
    Index {
        corpus_dir: String,
        index_dir: String,
    },
    /// Print titles of documents matching a Boolean/phrase query.
    Query {
        index_dir: String,
        query_text: String,
    },
    /// Print top-scoring documents for a ranked query.
    Rank {
        index_dir: String,
        query_text: String,
        #[arg(long)]
        bm25: bool,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Index { corpus_dir, index_dir } => run_index(&corpus_dir, &index_dir),
        Command::Query { index_dir, query_text } => run_query(&index_dir, &query_text),
        Command::Rank { index_dir, query_text, bm25, limit } => {
            run_rank(&index_dir, &query_text, bm25, limit)
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            eprintln!("error: {err}");
            ExitCode::from(err.exit_code() as u8)
        }
    }
}

fn run_index(corpus_dir: &str, index_dir: &str) -> Result<(), Error> {
    let config = IndexConfig::new(index_dir);
    let source = DirectorySource::new(corpus_dir);
    let tokenizer = StandardTokenizer::default();
    let report = build_index(&config, &source, &tokenizer, &NeverCancelled)?;
    println!(
        "indexed {} documents, {} tokens, {} buckets",
        report.total_documents, report.total_tokens, report.bucket_count
    );
    Ok(())
}

fn run_query(index_dir: &str, query_text: &str) -> Result<(), Error> {
    let config = IndexConfig::new(index_dir);
    let reader = DiskIndexReader::open(&config)?;
    let query = parser::parse(query_text)?;
    let postings = eval::evaluate(&query, &reader, false)?;

    for posting in &postings {
        let title = reader.document_title(posting.doc_id).unwrap_or("<unknown>");
        println!("{title}");
    }
    Ok(())
}

fn run_rank(index_dir: &str, query_text: &str, bm25: bool, limit: usize) -> Result<(), Error> {
    let config = IndexConfig::new(index_dir);
    let reader = DiskIndexReader::open(&config)?;
    let query = parser::parse(query_text)?;

    let results = if bm25 {
        let scorer = Bm25Scorer::new(config.bm25_params);
        scorer::rank(&query, &reader, &scorer as &dyn Scorer, Some(limit))?
    } else {
        let scorer = TfIdfScorer;
        scorer::rank(&query, &reader, &scorer as &dyn Scorer, Some(limit))?
    };

    for result in &results {
        let title = reader.document_title(result.doc_id).unwrap_or("<unknown>");
        println!("{:.6}\t{title}", result.score);
    }
    Ok(())
}
