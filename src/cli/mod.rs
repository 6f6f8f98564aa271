//! CLI definition and command implementations

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::chunker::{ChunkConfig, TextChunker};
use crate::config::{AppConfig, DEFAULT_TOP_K, EMBEDDING_DIMENSION};
use crate::embedding::{EmbeddingProvider, OllamaEmbedder};
use crate::index::{PineconeIndex, VectorIndex};
use crate::ingest::ingest_directory;
use crate::llm::OllamaChat;
use crate::rag::RagEngine;
use crate::server::{self, AppState};

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Parser)]
#[command(name = "jarvis-rag")]
#[command(version, about = "Document Q&A over a vector knowledge base", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Index every supported document under a directory
    Ingest {
        /// Directory to scan (.txt, .md, .pdf, .docx)
        dir: PathBuf,

        /// Chunk size in characters
        #[arg(long, default_value = "1000")]
        chunk_size: usize,

        /// Overlap between consecutive chunks in characters
        #[arg(long, default_value = "100")]
        overlap: usize,
    },

    /// Run the chat API server
    Serve {
        /// Address to bind
        #[arg(short, long, default_value = "0.0.0.0:8000")]
        bind: SocketAddr,

        /// Chunks retrieved per query
        #[arg(long, default_value_t = DEFAULT_TOP_K)]
        top_k: usize,
    },

    /// Ask a single question from the command line
    Ask {
        /// The question
        question: String,

        /// Chunks retrieved per query
        #[arg(long, default_value_t = DEFAULT_TOP_K)]
        top_k: usize,
    },

    /// Check connectivity to the embedding daemon and the index
    Status,
}

// ============================================================================
// CLI Runner
// ============================================================================

pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Ingest {
            dir,
            chunk_size,
            overlap,
        } => cmd_ingest(&dir, chunk_size, overlap).await,
        Commands::Serve { bind, top_k } => cmd_serve(bind, top_k).await,
        Commands::Ask { question, top_k } => cmd_ask(&question, top_k).await,
        Commands::Status => cmd_status().await,
    }
}

/// Wire up the full engine from environment configuration. Fails fast on
/// missing variables or an embedding/index dimension mismatch.
async fn build_engine(
    config: &AppConfig,
    chunking: ChunkConfig,
    top_k: usize,
) -> Result<RagEngine> {
    let embedder = OllamaEmbedder::new(&config.ollama_base_url, &config.embedding_model)
        .context("Failed to create embedding client")?;

    let index = PineconeIndex::connect(
        &config.pinecone_api_key,
        &config.pinecone_index,
        EMBEDDING_DIMENSION,
    )
    .await
    .context("Failed to connect to vector index")?;

    let chat = OllamaChat::new(&config.ollama_base_url, &config.chat_model)
        .context("Failed to create chat client")?;

    let chunker = TextChunker::new(chunking).context("Invalid chunking parameters")?;

    let engine = RagEngine::new(Arc::new(embedder), Arc::new(index), Arc::new(chat), chunker)?
        .with_top_k(top_k);
    Ok(engine)
}

// ============================================================================
// Command Implementations
// ============================================================================

async fn cmd_ingest(dir: &Path, chunk_size: usize, overlap: usize) -> Result<()> {
    let config = AppConfig::from_env()?;
    let engine = build_engine(
        &config,
        ChunkConfig {
            max_characters: chunk_size,
            overlap_characters: overlap,
        },
        DEFAULT_TOP_K,
    )
    .await?;

    println!("[*] Ingesting documents from {}", dir.display());

    let report = ingest_directory(&engine, dir).await?;

    println!(
        "[+] Indexed {} files ({} chunks)",
        report.succeeded, report.chunks_indexed
    );
    for (file, reason) in &report.skipped {
        println!("[!] Skipped {file}: {reason}");
    }

    Ok(())
}

async fn cmd_serve(bind: SocketAddr, top_k: usize) -> Result<()> {
    let config = AppConfig::from_env()?;
    let engine = build_engine(&config, ChunkConfig::default(), top_k).await?;

    let state = AppState::new(Arc::new(engine));
    server::serve(state, &config.allowed_origins, bind).await
}

async fn cmd_ask(question: &str, top_k: usize) -> Result<()> {
    let config = AppConfig::from_env()?;
    let engine = build_engine(&config, ChunkConfig::default(), top_k).await?;

    let answer = engine.answer(question).await?;
    println!("{answer}");

    Ok(())
}

async fn cmd_status() -> Result<()> {
    let config = AppConfig::from_env()?;

    println!("[*] Embedding model: {}", config.embedding_model);
    println!("[*] Chat model:      {}", config.chat_model);
    println!("[*] Ollama:          {}", config.ollama_base_url);
    println!("[*] Index:           {}", config.pinecone_index);

    let embedder = OllamaEmbedder::new(&config.ollama_base_url, &config.embedding_model)?;
    match embedder.embed("status probe").await {
        Ok(v) => println!("[+] Ollama reachable (dimension {})", v.len()),
        Err(e) => println!("[!] Ollama unreachable: {e}"),
    }

    match PineconeIndex::connect(
        &config.pinecone_api_key,
        &config.pinecone_index,
        EMBEDDING_DIMENSION,
    )
    .await
    {
        Ok(index) => {
            let probe = vec![0.0; EMBEDDING_DIMENSION];
            match index.query(&probe, 1).await {
                Ok(_) => println!("[+] Index reachable"),
                Err(e) => println!("[!] Index query failed: {e}"),
            }
        }
        Err(e) => println!("[!] Index unreachable: {e}"),
    }

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
