//! kbharvest CLI binary entry point.

use std::sync::Arc;

use kbharvest::agent::AgentInvoker;
use kbharvest::agent_loop::ExtractionLoop;
use kbharvest::batch::{BatchDriver, BatchOptions};
use kbharvest::cli::{Cli, Commands, ExtractArgs, RetrieveArgs, RunArgs};
use kbharvest::config::HarvestConfig;
use kbharvest::error::{HarvestError, Result};
use kbharvest::output::CsvObservationSink;
use kbharvest::provider::{HttpAgentClient, HttpKnowledgeBaseClient};
use kbharvest::registry::{CsvRegistry, ResourceSource};
use kbharvest::retrieval::Retriever;
use kbharvest::types::Resource;
use kbharvest::util::retry::RetryPolicy;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();
    init_logging(cli.verbose);

    let result = match HarvestConfig::load(cli.config.as_deref()) {
        Ok(config) => match cli.command {
            Commands::Run(args) => handle_run(config, args).await,
            Commands::Extract(args) => handle_extract(config, args).await,
            Commands::Retrieve(args) => handle_retrieve(config, args).await,
        },
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "kbharvest=debug" } else { "kbharvest=info" };
    let filter = EnvFilter::try_from_env("KBHARVEST_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn extraction_loop(config: &HarvestConfig, retries: u32) -> Result<ExtractionLoop> {
    let client = Arc::new(HttpAgentClient::from_config(config)?);
    let invoker =
        AgentInvoker::from_config(client, config)?.with_retry(RetryPolicy::with_retries(retries));
    Ok(ExtractionLoop::new(invoker).with_max_turns(config.max_turns))
}

async fn handle_run(mut config: HarvestConfig, args: RunArgs) -> Result<()> {
    if let Some(max_turns) = args.max_turns {
        config.max_turns = max_turns;
    }
    if let Some(dir) = args.output_dir {
        config.output_dir = dir;
    }
    let registry_path = args
        .registry
        .or_else(|| config.registry_path.clone())
        .ok_or_else(|| {
            HarvestError::Configuration("Missing registry path (--registry or KBHARVEST_REGISTRY)".into())
        })?;

    let resources = CsvRegistry::new(registry_path)
        .with_resource_types(config.resource_types.clone())
        .load()?;

    let driver = BatchDriver::new(
        extraction_loop(&config, args.retries)?,
        Arc::new(CsvObservationSink::new(config.output_dir.clone())),
    );
    let options = BatchOptions {
        resume_from: args.resume_from,
        limit: args.limit,
        skip_existing: args.skip_existing,
    };

    let summary = driver.run(&resources, &options).await?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

async fn handle_extract(mut config: HarvestConfig, args: ExtractArgs) -> Result<()> {
    if let Some(max_turns) = args.max_turns {
        config.max_turns = max_turns;
    }
    let mut resource = Resource::new(
        args.id.unwrap_or_else(|| "adhoc".to_string()),
        args.name,
        args.resource_type,
    );
    if let Some(rrid) = args.rrid {
        resource = resource.with_rrid(rrid);
    }
    if let Some(synonyms) = args.synonyms {
        resource = resource.with_synonyms(synonyms);
    }

    let report = extraction_loop(&config, 0)?.run(&resource).await?;
    println!("{}", serde_json::to_string_pretty(&report.observations)?);
    eprintln!(
        "{} rows in {} turns ({})",
        report.observations.len(),
        report.turns,
        report.stop_reason
    );
    Ok(())
}

async fn handle_retrieve(mut config: HarvestConfig, args: RetrieveArgs) -> Result<()> {
    if let Some(model_id) = args.model_id {
        config.model_id = model_id;
    }
    config.validate_for_retrieval()?;
    let knowledge_base_id = config
        .knowledge_base_id
        .clone()
        .ok_or_else(|| HarvestError::Configuration("Missing KBHARVEST_KNOWLEDGE_BASE_ID".into()))?;

    let client = Arc::new(HttpKnowledgeBaseClient::from_config(&config)?);
    let retriever = Retriever::new(client, knowledge_base_id)
        .with_limit(args.limit.unwrap_or(config.result_limit))
        .with_search_type(Some(args.search_type));

    if args.generate {
        let answer = retriever
            .generate(&args.query, &config.model_arn(), args.session_id)
            .await?;
        println!("{}", serde_json::to_string_pretty(&answer)?);
    } else {
        let references = retriever.retrieve(&args.query).await?;
        println!("{}", serde_json::to_string_pretty(&references)?);
    }
    Ok(())
}
