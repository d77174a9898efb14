//! `weft-calculator`: answers one arithmetic request by calling the add, subtract,
//! multiply and divide tools, printing every step.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use cli::display::format_message_block;
use cli::{logging, RunError};
use weft::graph::DEFAULT_RECURSION_LIMIT;
use weft::{calculator_tools, CalculatorRunner, CalculatorState, Message, DEFAULT_INSTRUCTION};

#[derive(Parser, Debug)]
#[command(name = "weft-calculator")]
#[command(about = "Answer an arithmetic request with tool calls")]
struct Args {
    /// Request text (default: "Add 3 and 9, minus 9 from 10, multiply 8 by 5, divide 6 by 2")
    #[arg(trailing_var_arg = true)]
    request: Vec<String>,

    /// Log node enter/exit (to LOG_FILE)
    #[arg(short, long)]
    verbose: bool,

    /// Maximum node steps before the run is aborted
    #[arg(long, value_name = "N", default_value_t = DEFAULT_RECURSION_LIMIT)]
    recursion_limit: usize,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("weft-calculator: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(args: Args) -> Result<(), RunError> {
    cli::load_env()?;
    logging::init()?;
    let settings = cli::model_settings()?;

    let tools = Arc::new(calculator_tools()?);
    let llm = cli::chat_client(&settings, tools.as_ref()).await?;
    let options = cli::agent_options::<CalculatorState>(&settings, args.verbose)
        .with_recursion_limit(args.recursion_limit);
    let runner = CalculatorRunner::new(llm, tools, options)?;

    let request = if args.request.is_empty() {
        DEFAULT_INSTRUCTION.to_string()
    } else {
        args.request.join(" ")
    };
    println!("{}", format_message_block(&Message::user(request.as_str())));
    runner
        .run_with_states(&request, cli::cancel_on_ctrl_c(), |state| {
            if let Some(message) = state.messages.last() {
                println!("{}", format_message_block(message));
            }
        })
        .await?;
    Ok(())
}
