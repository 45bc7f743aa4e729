use clap::{error::ErrorKind, Parser};
use colored::Colorize;
use tokio::io::AsyncWriteExt;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::cli::args::CliArgs;
use crate::cli::validation;
use crate::client::{ClientOptions, PlanClient};
use crate::config::{self, ConfigFile};
use crate::output::{self, OutputFormat};
use crate::session::{self, SearchContext};
use crate::view::profile::ProfileView;
use crate::view::{LoadMoreState, PlanSession, DEFAULT_PLANS_PER_PAGE};

fn print_banner() {
    const BANNER: &str = r#"
   __       _
  / /______(_)___ _   __(_)__ _      __
 / __/ ___/ / __ \ | / / / _ \ | /| / /
/ /_/ /  / / /_/ / |/ / /  __/ |/ |/ /
\__/_/  /_/ .___/|___/_/\___/|__/|__/
         /_/
       v0.1.0 - travel plan browser
    "#;
    eprint!("{}", BANNER);
    eprintln!();
}

fn format_kv_line(label: &str, value: &str) {
    eprintln!(":: {:<10}: {}", label, value);
}

fn format_bool(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

fn load_more_label(state: LoadMoreState) -> &'static str {
    match state {
        LoadMoreState::Exhausted => "exhausted",
        LoadMoreState::HasMore { busy: true } => "loading",
        LoadMoreState::HasMore { busy: false } => "more available",
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tripview={level}")));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Clone, Debug)]
struct RunConfig {
    url: String,
    username: Option<String>,
    client: ClientOptions,
    plans_per_page: usize,
    initial_displayed: usize,
    load_more_clicks: usize,
    save: Vec<usize>,
    like: Vec<usize>,
    dislike: Vec<usize>,
    summary: Vec<usize>,
    refresh: bool,
    profile: bool,
    delete: Vec<String>,
    output: Option<String>,
    output_format: OutputFormat,
    no_color: bool,
}

fn build_run_config(args: CliArgs, cfg: ConfigFile) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let no_color = if args.color {
        false
    } else {
        args.no_color || cfg.no_color.unwrap_or(false)
    };

    let url = args
        .url
        .or(cfg.url)
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .ok_or_else(|| "a results page URL is required (-u/--url)".to_string())?;

    let timeout = args.timeout.or(cfg.timeout).unwrap_or(10);
    if timeout == 0 {
        return Err("invalid timeout, expected positive number of seconds".to_string());
    }
    let client = ClientOptions {
        timeout_seconds: timeout,
        proxy: args.proxy.or(cfg.proxy),
        header: args.header.or(cfg.header),
        jwt: args.jwt.or(cfg.jwt),
    };

    let plans_per_page = args
        .per_page
        .or(cfg.plans_per_page)
        .unwrap_or(DEFAULT_PLANS_PER_PAGE);
    if plans_per_page == 0 {
        return Err("invalid plans_per_page, expected positive integer".to_string());
    }
    let initial_displayed = args
        .initial
        .or(cfg.initial_displayed)
        .unwrap_or(plans_per_page);

    let output_path = args
        .output
        .or(cfg.output)
        .map(|p| config::expand_tilde_string(&p));
    let output_format = match args.output_format.or(cfg.output_format) {
        Some(raw) => OutputFormat::parse(&raw)
            .ok_or_else(|| format!("invalid output format '{raw}', expected html or json"))?,
        None => output_path
            .as_deref()
            .and_then(output::infer_format_from_path)
            .unwrap_or(OutputFormat::Html),
    };

    Ok(RunConfig {
        url,
        username: args.user.or(cfg.username),
        client,
        plans_per_page,
        initial_displayed,
        load_more_clicks: args.load_more,
        save: args.save,
        like: args.like,
        dislike: args.dislike,
        summary: args.summary,
        refresh: args.refresh,
        profile: args.saved || !args.delete.is_empty(),
        delete: args.delete,
        output: output_path,
        output_format,
        no_color,
    })
}

fn spawn_interrupt_handler(client: &PlanClient) {
    let client = client.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling pending requests");
            client.cancel_all();
        }
    });
}

async fn write_output(path: Option<&str>, bytes: &[u8]) -> Result<(), String> {
    match path {
        Some(path) => {
            let mut file = tokio::fs::File::create(path)
                .await
                .map_err(|e| format!("failed to create output file '{path}': {e}"))?;
            file.write_all(bytes)
                .await
                .map_err(|e| format!("failed to write output file '{path}': {e}"))?;
            format_kv_line("Output", path);
            Ok(())
        }
        None => {
            let mut stdout = tokio::io::stdout();
            stdout
                .write_all(bytes)
                .await
                .map_err(|e| format!("failed to write output: {e}"))?;
            stdout
                .flush()
                .await
                .map_err(|e| format!("failed to write output: {e}"))
        }
    }
}

fn report_action(label: &str, index: usize, result: Result<String, String>) {
    match result {
        Ok(detail) if detail.is_empty() => {
            eprintln!("{} {} {}", "[+]".green(), label, index);
        }
        Ok(detail) => {
            eprintln!("{} {} {}: {}", "[+]".green(), label, index, detail);
        }
        Err(e) => {
            eprintln!("{} {} {}: {}", "[-]".red(), label, index, e);
        }
    }
}

async fn run_results(run: &RunConfig, username: String) -> Result<Vec<u8>, String> {
    let ctx = SearchContext::from_page_url(&run.url).map_err(|e| e.to_string())?;
    let client = PlanClient::for_page(&run.client, &ctx).map_err(|e| e.to_string())?;
    spawn_interrupt_handler(&client);

    format_kv_line("Location", ctx.location());
    format_kv_line("Date", ctx.date());
    format_kv_line("User", &username);

    let mut session = PlanSession::new(ctx, username, run.initial_displayed, run.plans_per_page);
    if !session.on_ready(&client).await {
        eprintln!("{} no plans available", "[!]".yellow());
    }

    for click in 1..=run.load_more_clicks {
        let outcome = session.load_more(&client).await;
        format_kv_line(
            "Load more",
            &format!(
                "click {click}: +{} plans, fetched={}, shown={}",
                outcome.rendered.len(),
                format_bool(outcome.fetched),
                session.displayed_plans()
            ),
        );
    }

    for &index in &run.like {
        report_action(
            "liked plan",
            index,
            session.like(index).map(|_| String::new()).map_err(|e| e.to_string()),
        );
    }
    for &index in &run.save {
        let result = session.save(&client, index).await;
        report_action(
            "saved plan",
            index,
            result.map(|_| String::new()).map_err(|e| e.to_string()),
        );
    }
    for &index in &run.dislike {
        let result = session.dislike(&client, index).await;
        report_action(
            "disliked plan",
            index,
            result.map(|_| String::new()).map_err(|e| e.to_string()),
        );
    }
    for &index in &run.summary {
        let result = session.generate_summary(&client, index).await;
        report_action("summary for plan", index, result.map_err(|e| e.to_string()));
    }
    if run.refresh && session.refresh(&client).await.is_none() {
        eprintln!("{} refresh failed, keeping current plans", "[!]".yellow());
    }

    format_kv_line(
        "Plans",
        &format!(
            "{} shown of {} cached ({})",
            session.displayed_plans(),
            session.plans_data().map_or(0, |d| d.len()),
            load_more_label(session.load_more_state())
        ),
    );
    Ok(output::render_session(&session, run.output_format))
}

async fn run_profile(run: &RunConfig, username: String) -> Result<Vec<u8>, String> {
    let client = PlanClient::new(&run.client, &run.url).map_err(|e| e.to_string())?;
    spawn_interrupt_handler(&client);
    format_kv_line("User", &username);

    let mut profile = ProfileView::load(&client, &username).await;
    for plan_id in &run.delete {
        match profile.delete(&client, plan_id).await {
            Ok(()) => eprintln!("{} deleted plan {}", "[+]".green(), plan_id),
            Err(e) => eprintln!("{} delete plan {}: {}", "[-]".red(), plan_id, e),
        }
    }
    format_kv_line("Saved", &profile.plans.len().to_string());
    Ok(output::render_profile(&profile, run.output_format))
}

async fn run_async(run: RunConfig) -> Result<(), String> {
    if run.no_color {
        colored::control::set_override(false);
    }
    print_banner();

    let username = session::resolve_username(run.username.as_deref(), run.client.jwt.as_deref());
    let bytes = if run.profile {
        run_profile(&run, username).await?
    } else {
        run_results(&run, username).await?
    };
    write_output(run.output.as_deref(), &bytes).await
}

pub fn run_cli() -> Result<(), String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                let _ = e.print();
                return Ok(());
            }
            _ => return Err(e.to_string()),
        },
    };
    init_tracing(args.verbose);

    let user_config_path = args.config.clone().map(|p| config::expand_tilde(&p));
    if args.init_config {
        let path = user_config_path
            .or_else(config::default_config_path)
            .ok_or_else(|| "cannot determine config path".to_string())?;
        config::ensure_default_config_file(&path)?;
        format_kv_line("Config", &path.display().to_string());
        return Ok(());
    }
    let cfg = match user_config_path.as_ref() {
        Some(path) => config::load_config(path, false)?,
        None => match config::default_config_path() {
            Some(path) => config::load_config(&path, true)?,
            None => ConfigFile::default(),
        },
    };

    let run = build_run_config(args, cfg)?;

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to build runtime: {e}"))?;

    rt.block_on(run_async(run))?;
    Ok(())
}
