use crate::cli::args::CliArgs;

pub fn validate(args: &CliArgs) -> Result<(), String> {
    if let Some(per_page) = args.per_page {
        if per_page == 0 {
            return Err("invalid per-page, expected positive integer".to_string());
        }
    }
    if let Some(timeout) = args.timeout {
        if timeout == 0 {
            return Err("invalid timeout, expected positive number of seconds".to_string());
        }
    }
    if let Some(raw) = args.output_format.as_deref() {
        if crate::output::OutputFormat::parse(raw).is_none() {
            return Err(format!("invalid --output-format '{raw}', expected html or json"));
        }
    }
    if let Some(raw) = args.header.as_deref() {
        if !raw.contains(':') {
            return Err(format!("invalid --header '{raw}', expected 'Key: Value'"));
        }
    }
    let profile_mode = args.saved || !args.delete.is_empty();
    let plan_actions = !args.save.is_empty()
        || !args.like.is_empty()
        || !args.dislike.is_empty()
        || !args.summary.is_empty()
        || args.refresh
        || args.load_more > 0;
    if profile_mode && plan_actions {
        return Err("profile options (--saved, --delete) cannot be combined with plan actions".to_string());
    }
    if args.delete.iter().any(|id| id.trim().is_empty()) {
        return Err("invalid --delete, plan id is empty".to_string());
    }
    Ok(())
}
