use clap::{ArgAction, Parser};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "tripview",
    version,
    about = "browse and act on computed travel plans",
    long_about = "Tripview opens a travel-plan results page, renders the plans, pages through them and performs plan actions against the planner API.\n\nExamples:\n  tripview -u 'https://planner.tld/v1/plans?location=Paris&date=2024-05-02'\n  tripview -u '<results url>' --load-more 2 -o plans.html\n  tripview -u '<results url>' --user alice --save 0 --summary 1\n  tripview --saved --user alice -u https://planner.tld/\n\nTip: Use --config to persist identity and HTTP settings."
)]
pub struct CliArgs {
    #[arg(
        short = 'v',
        long = "vb",
        visible_alias = "verbose",
        action = ArgAction::Count,
        help_heading = "Output",
        help = "Increase verbosity (-v, -vv)."
    )]
    pub verbose: u8,

    #[arg(
        short = 'c',
        long = "clr",
        visible_alias = "color",
        help_heading = "Output",
        help = "Enable colored output (overrides --no-color)."
    )]
    pub color: bool,

    #[arg(
        long = "nc",
        visible_alias = "no-color",
        help_heading = "Output",
        help = "Disable colored output."
    )]
    pub no_color: bool,

    #[arg(
        short = 'o',
        long = "out",
        visible_alias = "output",
        value_name = "FILE",
        help_heading = "Output",
        help = "Write the rendered result to a file instead of stdout."
    )]
    pub output: Option<String>,

    #[arg(
        short = 'F',
        long = "of",
        visible_alias = "output-format",
        value_name = "FORMAT",
        help_heading = "Output",
        help = "Output format: html or json (inferred from --output when omitted)."
    )]
    pub output_format: Option<String>,

    #[arg(
        short = 'u',
        long = "u",
        visible_alias = "url",
        value_name = "URL",
        help_heading = "Input",
        help = "Results page URL (carries location, date and numberResults)."
    )]
    pub url: Option<String>,

    #[arg(
        short = 'C',
        long = "cfg",
        visible_alias = "config",
        value_name = "FILE",
        help_heading = "Input",
        help = "Path to config file (defaults to ~/.tripview/config.yml)."
    )]
    pub config: Option<String>,

    #[arg(
        long = "ic",
        visible_alias = "init-config",
        help_heading = "Input",
        help = "Write a default config file if none exists, then exit."
    )]
    pub init_config: bool,

    #[arg(
        short = 'U',
        long = "usr",
        visible_alias = "user",
        value_name = "NAME",
        help_heading = "Identity",
        help = "Act as this user (overrides the JWT username claim)."
    )]
    pub user: Option<String>,

    #[arg(
        short = 'J',
        long = "jwt",
        value_name = "TOKEN",
        help_heading = "Identity",
        help = "Session token sent as the JWT cookie."
    )]
    pub jwt: Option<String>,

    #[arg(
        short = 'p',
        long = "px",
        visible_alias = "proxy",
        value_name = "URL",
        help_heading = "HTTP",
        help = "HTTP proxy URL (e.g. http://127.0.0.1:8080)."
    )]
    pub proxy: Option<String>,

    #[arg(
        short = 'T',
        long = "to",
        visible_alias = "timeout",
        value_name = "SECONDS",
        help_heading = "HTTP",
        help = "Per-request timeout in seconds."
    )]
    pub timeout: Option<usize>,

    #[arg(
        short = 'H',
        long = "hdr",
        visible_alias = "header",
        value_name = "HEADER",
        help_heading = "HTTP",
        help = "Add a header to all requests (format: 'Key: Value')."
    )]
    pub header: Option<String>,

    #[arg(
        short = 'P',
        long = "ppp",
        visible_alias = "per-page",
        value_name = "N",
        help_heading = "Pagination",
        help = "Plans revealed per load-more click."
    )]
    pub per_page: Option<usize>,

    #[arg(
        short = 'n',
        long = "init",
        visible_alias = "initial",
        value_name = "N",
        help_heading = "Pagination",
        help = "Plans shown before any load-more click."
    )]
    pub initial: Option<usize>,

    #[arg(
        short = 'm',
        long = "lm",
        visible_alias = "load-more",
        value_name = "CLICKS",
        default_value_t = 0,
        help_heading = "Pagination",
        help = "Number of load-more clicks to perform."
    )]
    pub load_more: usize,

    #[arg(
        long = "sv",
        visible_alias = "save",
        value_name = "INDEX",
        action = ArgAction::Append,
        help_heading = "Actions",
        help = "Save the plan at INDEX to the user's profile (repeatable)."
    )]
    pub save: Vec<usize>,

    #[arg(
        long = "lk",
        visible_alias = "like",
        value_name = "INDEX",
        action = ArgAction::Append,
        help_heading = "Actions",
        help = "Like the plan at INDEX (repeatable)."
    )]
    pub like: Vec<usize>,

    #[arg(
        long = "dl",
        visible_alias = "dislike",
        value_name = "INDEX",
        action = ArgAction::Append,
        help_heading = "Actions",
        help = "Dislike the plan at INDEX and send feedback (repeatable)."
    )]
    pub dislike: Vec<usize>,

    #[arg(
        long = "sm",
        visible_alias = "summary",
        value_name = "INDEX",
        action = ArgAction::Append,
        help_heading = "Actions",
        help = "Generate a summary for the plan at INDEX (repeatable)."
    )]
    pub summary: Vec<usize>,

    #[arg(
        long = "rf",
        visible_alias = "refresh",
        help_heading = "Actions",
        help = "Reload the displayed plans after other actions."
    )]
    pub refresh: bool,

    #[arg(
        long = "sp",
        visible_alias = "saved",
        help_heading = "Profile",
        help = "Show the user's saved plans instead of search results."
    )]
    pub saved: bool,

    #[arg(
        long = "del",
        visible_alias = "delete",
        value_name = "PLAN_ID",
        action = ArgAction::Append,
        help_heading = "Profile",
        help = "Delete a saved plan by id (repeatable, implies --saved)."
    )]
    pub delete: Vec<String>,
}
