use clap::{Arg, Command};
use log::LevelFilter;
use phishshield::{AnalysisError, AnalysisService, Config};
use std::process;

#[tokio::main]
async fn main() {
    let matches = Command::new("phishshield")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Phishing analysis core: classifies URLs and email messages")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("/etc/phishshield.yaml"),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .value_name("FILE")
                .help("Generate a default configuration file")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("test-config")
                .long("test-config")
                .help("Validate the configuration and exit")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("status")
                .long("status")
                .help("Load the models and report per-flow readiness")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("url")
                .long("url")
                .value_name("URL")
                .help("Analyze a URL and print the result as JSON")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("email-file")
                .long("email-file")
                .value_name("FILE")
                .help("Analyze a raw email message from a file and print the result as JSON")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let log_level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    if let Some(path) = matches.get_one::<String>("generate-config") {
        match Config::default().to_file(path) {
            Ok(()) => println!("Default configuration written to {path}"),
            Err(e) => {
                eprintln!("Error writing configuration: {e}");
                process::exit(1);
            }
        }
        return;
    }

    let config_path = matches.get_one::<String>("config").unwrap();
    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            process::exit(1);
        }
    };

    if matches.get_flag("test-config") {
        println!("Configuration OK:");
        println!("  confidence threshold: {}", config.confidence_threshold);
        println!(
            "  whitelist: {} email domains, {} url domains",
            config.whitelist.email_domains.len(),
            config.whitelist.url_domains.len()
        );
        println!("  email model: {}", config.models.email_model_path);
        println!("  url model: {}", config.models.url_model_path);
        return;
    }

    let service = AnalysisService::new(&config);

    if matches.get_flag("status") {
        let readiness = service.readiness();
        println!("email model loaded: {}", readiness.email_model);
        println!("url model loaded:   {}", readiness.url_model);
        if !readiness.all_ready() {
            process::exit(1);
        }
        return;
    }

    if let Some(url) = matches.get_one::<String>("url") {
        let result = service.analyze_url(url).await;
        print_result(result);
        return;
    }

    if let Some(path) = matches.get_one::<String>("email-file") {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                eprintln!("Error reading {path}: {e}");
                process::exit(1);
            }
        };
        let result = service.analyze_email(&text).await;
        print_result(result);
        return;
    }

    eprintln!("Nothing to do: pass --url, --email-file, --status, or --test-config");
    process::exit(2);
}

fn load_config(path: &str) -> anyhow::Result<Config> {
    if std::path::Path::new(path).exists() {
        Config::from_file(path)
    } else {
        log::warn!("config file {path} not found, using defaults");
        Ok(Config::default())
    }
}

fn print_result(result: Result<phishshield::AnalysisResult, AnalysisError>) {
    match result {
        Ok(result) => match serde_json::to_string_pretty(&result) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error serializing result: {e}");
                process::exit(1);
            }
        },
        Err(e) => {
            eprintln!("Analysis rejected: {e}");
            process::exit(1);
        }
    }
}
