//! `weft-drafter`: interactive document drafting. Each turn reads one line from stdin;
//! the run ends once the model saves the document.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use cli::display::DrafterConsole;
use cli::{logging, RunError};
use weft::{
    drafter_tools, CompletionSignal, DrafterRunner, DrafterState, LoggingNodeMiddleware,
    StdinInput,
};

/// Each user turn takes two steps (agent, tools).
const DEFAULT_DRAFTER_STEPS: usize = 200;

#[derive(Parser, Debug)]
#[command(name = "weft-drafter")]
#[command(about = "Draft a document with an assistant, then save it")]
struct Args {
    /// Directory saved documents are written to (created if missing)
    #[arg(short, long, value_name = "DIR", env = "WEFT_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Finish when a tool reply mentions the saved document, instead of on the save tool's result flag
    #[arg(long)]
    text_signal: bool,

    /// Log node enter/exit (to LOG_FILE)
    #[arg(short, long)]
    verbose: bool,

    /// Maximum node steps before the run is aborted
    #[arg(long, value_name = "N", default_value_t = DEFAULT_DRAFTER_STEPS)]
    recursion_limit: usize,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("weft-drafter: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(args: Args) -> Result<(), RunError> {
    cli::load_env()?;
    logging::init()?;
    let settings = cli::model_settings()?;

    tokio::fs::create_dir_all(&args.output_dir).await?;
    let tools = Arc::new(drafter_tools(args.output_dir.clone())?);
    let llm = cli::chat_client(&settings, tools.as_ref()).await?;

    let mut console = DrafterConsole::stdout();
    if args.verbose {
        console = console.wrapping(Arc::new(LoggingNodeMiddleware::<DrafterState>::default()));
    }
    let signal = if args.text_signal {
        CompletionSignal::Text
    } else {
        CompletionSignal::Flag
    };
    let options = cli::agent_options::<DrafterState>(&settings, false)
        .with_middleware(Arc::new(console))
        .with_completion_signal(signal)
        .with_recursion_limit(args.recursion_limit);
    let runner = DrafterRunner::new(llm, tools, Arc::new(StdinInput::new()), options)?;

    println!("\n ===== DRAFTER =====");
    let state = runner.run(cli::cancel_on_ctrl_c()).await?;
    tracing::info!(chars = state.document.len(), "document saved");
    println!("\n ===== DRAFTER FINISHED =====");
    Ok(())
}
