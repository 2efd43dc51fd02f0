use anyhow::Context;
use clap::Parser;
use hls_distribution::config::Command;
use hls_distribution::core::ConfigProvider;
use hls_distribution::utils::error::ErrorSeverity;
use hls_distribution::utils::{logger, validation::Validate};
use hls_distribution::{
    job_element, CliConfig, DistributionConfig, DistributionEngine, DistributionService,
    FfmpegEncoder, HlsError, InMemoryJobQueue, JobBarrier, JobStatus, LocalWorkspace, Package,
};
use std::path::Path;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // 載入配置
    let config = match DistributionConfig::from_file(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", cli.config.display(), e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 初始化日誌
    if config.json_logging() {
        logger::init_json_logger(cli.verbose, config.log_level());
    } else {
        logger::init_cli_logger(cli.verbose, config.log_level());
    }

    tracing::info!("🚀 Starting hls-distribution");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    if let Err(e) = run(&cli, &config).await {
        let Some(err) = e.downcast_ref::<HlsError>() else {
            tracing::error!("❌ {:#}", e);
            eprintln!("❌ {:#}", e);
            std::process::exit(1);
        };

        tracing::error!(
            "❌ Operation failed: {} (Category: {:?}, Severity: {:?})",
            err,
            err.category(),
            err.severity()
        );
        eprintln!("❌ {:#}", e);
        eprintln!("💡 Suggestion: {}", err.recovery_suggestion());

        // 根據錯誤嚴重程度決定退出碼
        let exit_code = match err.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

async fn run(cli: &CliConfig, config: &DistributionConfig) -> anyhow::Result<()> {
    let target = cli.command.target();

    let content = std::fs::read_to_string(&target.package)
        .with_context(|| format!("Unable to read package {}", target.package.display()))?;
    let mut package = Package::from_json(&content).map_err(HlsError::from)?;

    // 工作區根目錄為套件描述檔所在目錄
    let workspace_root = target
        .package
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    let engine = DistributionEngine::new(
        LocalWorkspace::new(workspace_root),
        FfmpegEncoder::new(config.encoder_binary()),
        config,
    )?;
    let service = DistributionService::new(InMemoryJobQueue::new(Arc::new(engine)));

    let job = match &cli.command {
        Command::Distribute {
            skip_availability_check,
            ..
        } => {
            service
                .distribute(&package, &target.element, !skip_availability_check)
                .await?
        }
        Command::Retract { .. } => service.retract(&package, &target.element).await?,
    };
    tracing::info!("📋 Created {} job {}", job.operation, job.id);

    let mut barrier =
        JobBarrier::new(service.queue(), vec![job.id]).with_poll_interval(config.poll_interval());
    if let Some(timeout) = config.job_timeout() {
        barrier = barrier.with_timeout(timeout);
    }
    let result = barrier.wait_for_jobs().await?;
    service.queue().evict_finished().await;
    let job = result
        .jobs
        .into_iter()
        .next()
        .context("Job barrier returned no jobs")?;

    if job.status != JobStatus::Succeeded {
        return Err(HlsError::JobError {
            message: job
                .failure
                .unwrap_or_else(|| format!("Job {} did not succeed", job.id)),
        }
        .into());
    }

    let Some(element) = job_element(&job)? else {
        tracing::info!("⏭️ Element {} is not handled by the HLS channel", target.element);
        println!("⏭️ Nothing to do for element {}", target.element);
        return Ok(());
    };

    match &cli.command {
        Command::Distribute { .. } => {
            println!("✅ Distributed {} to {}", target.element, element.uri);
            if target.update_package {
                let id = package.add(element);
                tracing::info!("Added distributed element {} to package {}", id, package.id);
            } else {
                println!("{}", serde_json::to_string_pretty(&element)?);
            }
        }
        Command::Retract { .. } => {
            println!("✅ Retracted {}", target.element);
            if target.update_package {
                for removed in package.remove_distributed(&target.element) {
                    tracing::info!(
                        "Removed distributed element {} from package {}",
                        removed.identifier().unwrap_or("<unnamed>"),
                        package.id
                    );
                }
            }
        }
    }

    if target.update_package {
        let json = serde_json::to_string_pretty(&package)?;
        std::fs::write(&target.package, json)
            .with_context(|| format!("Unable to update package {}", target.package.display()))?;
        println!("📁 Package saved to: {}", target.package.display());
    }

    Ok(())
}
