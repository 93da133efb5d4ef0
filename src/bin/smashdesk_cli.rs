use smashdesk::{about, api::ApiClient, config::AppConfig, job_watch::JobWatcher};
use std::env;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

fn usage() {
    eprintln!(
        "Usage:\n  \
  smashdesk_cli --version\n  \
  smashdesk_cli [--config PATH] status\n  \
  smashdesk_cli [--config PATH] job JOB_ID\n  \
  smashdesk_cli [--config PATH] notices\n  \
  smashdesk_cli [--config PATH] watch JOB_ID"
    );
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), String> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Could not serialize JSON output: {e}"))?;
    println!("{text}");
    Ok(())
}

fn parse_global_config_arg(args: &[String]) -> (Option<String>, usize) {
    if args.len() >= 2 && args[0] == "--config" {
        return (Some(args[1].clone()), 2);
    }
    (None, 0)
}

/// Poll one job until it reaches a terminal state, printing status changes.
/// Where the GUI navigates to the result page, this prints the URL.
fn watch(client: &ApiClient, config: &AppConfig, job_id: &str) -> Result<(), String> {
    let url = config.job_status_url(job_id);
    let mut watcher = JobWatcher::new(config.redirect_delay_ms);
    let mut last_printed = String::new();

    loop {
        match client.job_status(&url) {
            Ok(job) => {
                watcher.observe(now_ms(), &job);
                let render = watcher.render();
                let line = format!("[{}] {}", render.last_changed, render.status_text);
                if line != last_printed {
                    println!("{line}");
                    last_printed = line;
                }
            }
            Err(e) => tracing::warn!(error = %e, "job status fetch failed, will retry"),
        }
        if watcher.is_terminal() {
            break;
        }
        std::thread::sleep(Duration::from_millis(config.poll_interval_ms));
    }

    // No result link means the job ended without results (e.g. failed);
    // there is no redirect to wait for, so report the final status as-is.
    let Some(result_url) = watcher.render().result_url.clone() else {
        return Err(format!(
            "Job '{job_id}' finished without results: {}",
            watcher.render().status_text
        ));
    };

    // Let the delayed-redirect timer run out, then report its target.
    std::thread::sleep(Duration::from_millis(config.redirect_delay_ms));
    let target = watcher.take_navigation(now_ms()).unwrap_or(result_url);
    println!("Results: {target}");
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    if let Err(e) = run() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        usage();
        return Err("Missing command".to_string());
    }
    if args.iter().any(|a| a == "--version" || a == "-V") {
        println!("{}", about::version_cli_text());
        return Ok(());
    }

    let (config_path, cmd_idx) = parse_global_config_arg(&args);
    let config = AppConfig::load_or_default(config_path.as_deref())?;
    let client = ApiClient::new();

    let Some(command) = args.get(cmd_idx) else {
        usage();
        return Err("Missing command".to_string());
    };

    match command.as_str() {
        "status" => {
            let status = client
                .server_status(&config.server_status_url())
                .map_err(|e| e.to_string())?;
            println!(
                "{}: {} queued, {} running",
                status.status, status.queue_length, status.running
            );
            Ok(())
        }
        "job" => {
            let job_id = args.get(cmd_idx + 1).ok_or_else(|| {
                usage();
                "Missing JOB_ID for job".to_string()
            })?;
            let job = client
                .job_status(&config.job_status_url(job_id))
                .map_err(|e| e.to_string())?;
            print_json(&job)
        }
        "notices" => {
            let notices = client
                .notices(&config.notices_url())
                .map_err(|e| e.to_string())?;
            print_json(&notices)
        }
        "watch" => {
            let job_id = args.get(cmd_idx + 1).ok_or_else(|| {
                usage();
                "Missing JOB_ID for watch".to_string()
            })?;
            watch(&client, &config, job_id)
        }
        _ => {
            usage();
            Err(format!("Unknown command '{command}'"))
        }
    }
}
