use clap::Parser;
use sa_phone_recon::app::report;
use sa_phone_recon::core::ConfigProvider;
use sa_phone_recon::utils::{logger, validation::Validate};
use sa_phone_recon::{CliConfig, LocalStorage, LookupEngine, PhoneCandidate, ReconError};
use std::io::Write;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting sa-phone-recon");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 合併設定檔與命令列參數並驗證
    let config = match cli.resolve().and_then(|config| config.validate().map(|_| config)) {
        Ok(config) => config,
        Err(e) => fail(&e),
    };

    let phone = match &cli.phone {
        Some(phone) => phone.trim().to_string(),
        None => prompt_for_number()?,
    };

    let aggregator = match config.build_aggregator() {
        Ok(aggregator) => aggregator,
        Err(e) => fail(&e),
    };
    display_config_summary(&config, &aggregator.source_names());

    let storage = LocalStorage::new(config.output_path.clone());
    let engine = LookupEngine::new(aggregator, storage).with_save(config.save);

    println!("[+] Searching platforms... This may take a moment...");

    let run = tokio::select! {
        run = engine.run(PhoneCandidate::new(phone)) => run,
        _ = tokio::signal::ctrl_c() => {
            println!("\n[!] Operation cancelled by user");
            return Ok(());
        }
    };

    let run = match run {
        Ok(run) => run,
        Err(e) => fail(&e),
    };

    for source in run.outcome.failed_sources() {
        eprintln!("[!] {} search failed or timed out", source);
    }

    if run.outcome.report.is_empty() {
        println!("\n[-] No information found for {}", run.number);
        println!("[!] Try these troubleshooting steps:");
        println!("1. Verify the number is active and in use");
        println!("2. Check if the number is listed publicly");
        println!("3. Try different search methods manually");
        return Ok(());
    }

    println!("\n[+] Found associated accounts for {}:", run.number);
    print!("{}", report::render_text(&run.outcome.report));

    if let Some(path) = run.saved_to {
        println!("\n[+] Results saved to {}", path);
    }

    Ok(())
}

fn display_config_summary(config: &impl ConfigProvider, sources: &[&str]) {
    tracing::info!("📋 Sources: {}", sources.join(", "));
    tracing::info!(
        "⏱️ Timeouts: {:?} per source, {:?} per request",
        config.source_timeout(),
        config.request_timeout()
    );
    match config.max_workers() {
        Some(workers) => tracing::info!("👷 Workers: {}", workers),
        None => tracing::info!("👷 Workers: one per source"),
    }
    tracing::debug!("User-Agents: {}", config.user_agents().join(" | "));
    if config.save_report() {
        tracing::info!("💾 Output: {}", config.output_path());
    } else {
        tracing::info!("💾 Output: not saved");
    }
}

fn prompt_for_number() -> anyhow::Result<String> {
    print!("[+] Enter South African phone number (e.g., 0821234567): ");
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn fail(e: &ReconError) -> ! {
    tracing::error!(
        "❌ Lookup failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼，致命錯誤至少回傳 1
    std::process::exit(e.exit_code().max(1));
}
