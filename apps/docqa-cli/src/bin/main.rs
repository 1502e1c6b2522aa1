use std::io::{self, BufRead, Write};
use std::process;

use docqa_core::chunker::ChunkingConfig;
use docqa_core::config::{expand_path, AppConfig};
use docqa_ollama::{embedder_for, OllamaClient, OllamaGenerator};
use docqa_qa::{answer, prepare_index, AnswerOptions};

struct CliArgs {
    question: Option<String>,
    docs: Option<String>,
    rebuild: bool,
    check: bool,
}

fn print_usage(prog: &str) {
    eprintln!("Usage: {} [--docs <dir>] [--rebuild] [--check] [\"question\"]", prog);
    eprintln!("  With a question: answer it once and exit.");
    eprintln!("  Without: interactive mode; type 'quit' or 'exit' to stop.");
    eprintln!("  --docs <dir>   Documents folder (default from config)");
    eprintln!("  --rebuild      Discard and rebuild the persisted index");
    eprintln!("  --check        Probe the Ollama service and exit");
}

fn parse_args() -> CliArgs {
    let mut args: Vec<String> = std::env::args().collect();
    let prog = args.remove(0);
    let mut parsed = CliArgs {
        question: None,
        docs: None,
        rebuild: false,
        check: false,
    };
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--docs" => {
                if i + 1 < args.len() {
                    parsed.docs = Some(args[i + 1].clone());
                    i += 1;
                } else {
                    eprintln!("Error: --docs requires a path");
                    process::exit(1);
                }
            }
            "--rebuild" => parsed.rebuild = true,
            "--check" => parsed.check = true,
            "--help" | "-h" => {
                print_usage(&prog);
                process::exit(0);
            }
            other if other.starts_with('-') => {
                eprintln!("Unknown option: {}", other);
                print_usage(&prog);
                process::exit(1);
            }
            _ => {
                if parsed.question.is_none() {
                    parsed.question = Some(args[i].clone());
                } else {
                    eprintln!("Error: at most one question may be given");
                    print_usage(&prog);
                    process::exit(1);
                }
            }
        }
        i += 1;
    }
    parsed
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = parse_args();
    let mut config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading config: {:#}", e);
            process::exit(1);
        }
    };
    if let Some(docs) = &cli.docs {
        config.docs_dir = expand_path(docs);
    }

    if cli.check {
        let client = OllamaClient::new(config.ollama_url.as_str());
        match client.connectivity_check(&config.llm_model).await {
            Ok(reply) => {
                println!("Ollama at {} answered: {}", config.ollama_url, reply.trim());
                return Ok(());
            }
            Err(e) => {
                eprintln!("Ollama check failed: {:#}", e);
                process::exit(1);
            }
        }
    }

    // Onboarding path: a missing docs folder is not an error, it just means
    // there is nothing to do yet.
    if !config.docs_dir.is_dir() {
        std::fs::create_dir_all(&config.docs_dir)?;
        println!("Created empty docs folder: {}", config.docs_dir.display());
        println!("Add .txt, .md, or .pdf files there and run again.");
        return Ok(());
    }

    let chunking = match ChunkingConfig::new(config.chunk_size, config.chunk_overlap) {
        Ok(chunking) => chunking,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
    let embedder = match embedder_for(&config.embed_model, &config.ollama_url) {
        Ok(embedder) => embedder,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    };
    let generator = OllamaGenerator::new(&config.ollama_url, config.llm_model.as_str());
    let options = AnswerOptions {
        top_k: config.top_k,
        temperature: config.temperature,
    };

    let store = match prepare_index(
        &config.docs_dir,
        &config.db_dir,
        embedder.as_ref(),
        &chunking,
        cli.rebuild,
    )
    .await
    {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    };

    if let Some(question) = cli.question {
        println!("Querying...");
        match answer(&question, &store, embedder.as_ref(), &generator, &options).await {
            Ok(out) => println!("{}", out.result),
            Err(e) => {
                eprintln!("Error: {:#}", e);
                process::exit(1);
            }
        }
        return Ok(());
    }

    // Interactive
    println!("Local document Q&A ready. Type your question and press Enter. Type 'quit' or 'exit' to stop.");
    let stdin = io::stdin();
    loop {
        print!("\nYou: ");
        io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }
        let question = line.trim();
        if question.is_empty()
            || question.eq_ignore_ascii_case("quit")
            || question.eq_ignore_ascii_case("exit")
        {
            break;
        }
        match answer(question, &store, embedder.as_ref(), &generator, &options).await {
            Ok(out) => println!("Answer: {}", out.result),
            Err(e) => eprintln!("Error: {:#}", e),
        }
    }
    Ok(())
}
