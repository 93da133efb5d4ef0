use eframe::{egui, NativeOptions};
use smashdesk::{about, app::SmashDeskApp, config::AppConfig};
use std::env;

fn usage() {
    eprintln!(
        "Usage:\n  \
  smashdesk [--config PATH] [JOB_ID]\n  \
  smashdesk --version"
    );
}

fn parse_args(args: &[String]) -> Result<(Option<String>, Option<String>), String> {
    let mut config_path = None;
    let mut job_id = None;
    let mut idx = 0;
    while idx < args.len() {
        match args[idx].as_str() {
            "--config" => {
                idx += 1;
                let path = args.get(idx).ok_or("Missing path after --config")?;
                config_path = Some(path.clone());
            }
            flag if flag.starts_with('-') => {
                usage();
                return Err(format!("Unknown flag '{flag}'"));
            }
            positional => job_id = Some(positional.to_string()),
        }
        idx += 1;
    }
    Ok((config_path, job_id))
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.iter().any(|a| a == "--version" || a == "-V") {
        println!("{}", about::version_cli_text());
        return Ok(());
    }

    let (config_path, job_id) = match parse_args(&args) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };
    let config = match AppConfig::load_or_default(config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([700.0, 640.0])
            .with_min_inner_size([400.0, 320.0]),
        ..Default::default()
    };

    eframe::run_native(
        "smashdesk",
        options,
        Box::new(move |_cc| Ok(Box::new(SmashDeskApp::new(config, job_id.as_deref())))),
    )
}
