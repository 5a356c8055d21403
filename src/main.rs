use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tracing::info;

use design_brief::{
    interview, web_server, ChatClient, FormField, FormInput, ImageMode, PromptTemplate,
    Submission, UploadedImage,
};

// Define the command-line interface structure using clap
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

// Define the available subcommands
#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Start the questionnaire web UI.
    Serve {
        #[arg(long, default_value_t = 9900, help = "Port for the web server.")]
        port: u16,
        #[arg(long, default_value = "templates", help = "Directory holding the page templates.")]
        templates: PathBuf,
        #[arg(long = "static", default_value = "static", help = "Directory served under /static.")]
        static_dir: PathBuf,
    },
    /// Send one set of answers to the model and print the brief.
    Submit(SubmitArgs),
    /// Answer the questionnaire in the terminal; prints the answers as JSON.
    Interview,
    /// Print the sample answers as JSON.
    Autofill,
    /// Print the default context and message templates.
    Templates,
}

#[derive(clap::Args, Debug)]
struct SubmitArgs {
    #[arg(long, help = "JSON file of answers keyed by field name.")]
    answers: Option<PathBuf>,
    #[arg(long = "field", value_name = "KEY=VALUE", help = "Set one answer; overrides --answers.")]
    fields: Vec<String>,
    #[arg(long = "image", value_name = "PATH", help = "Attach a jpg, jpeg or png image.")]
    images: Vec<PathBuf>,
    #[arg(long, help = "Replace the default context with this file's contents.")]
    context_file: Option<PathBuf>,
    #[arg(long, help = "Replace the default message template with this file's contents.")]
    message_file: Option<PathBuf>,
    #[arg(long, help = "Send the images to the model instead of only mentioning them.")]
    forward_images: bool,
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    #[arg(long, help = "Also print the request and response JSON to stderr.")]
    debug: bool,
}

fn parse_field(pair: &str) -> Result<(FormField, String)> {
    let (key, value) = pair
        .split_once('=')
        .ok_or_else(|| anyhow!("Expected KEY=VALUE, got '{}'", pair))?;
    let field = FormField::from_key(key.trim())
        .ok_or_else(|| anyhow!("Unknown field '{}'", key.trim()))?;
    Ok((field, value.to_string()))
}

fn load_image(path: &Path) -> Result<UploadedImage> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read image {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(UploadedImage::from_upload(name, bytes)?)
}

fn build_submission(args: SubmitArgs) -> Result<Submission> {
    let mut form = match &args.answers {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("Failed to read answers file {}", path.display()))?;
            serde_json::from_str::<FormInput>(&raw)
                .with_context(|| format!("Failed to parse answers file {}", path.display()))?
        }
        None => FormInput::new(),
    };
    for pair in &args.fields {
        let (field, value) = parse_field(pair)?;
        form.set(field, value);
    }

    let mut template = PromptTemplate::default();
    if let Some(path) = &args.context_file {
        template.context = fs::read_to_string(path)
            .with_context(|| format!("Failed to read context file {}", path.display()))?;
    }
    if let Some(path) = &args.message_file {
        template.message = fs::read_to_string(path)
            .with_context(|| format!("Failed to read message file {}", path.display()))?;
    }

    let images = args.images.iter().map(|path| load_image(path)).collect::<Result<Vec<_>>>()?;

    Ok(Submission {
        form,
        images,
        template,
        api_key: args.api_key,
        image_mode: if args.forward_images {
            ImageMode::Forward
        } else {
            ImageMode::Describe
        },
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (endpoint settings, OPENAI_API_KEY)
    dotenvy::dotenv().ok();

    // Reads log level from RUST_LOG (e.g., RUST_LOG=info,design_brief=debug)
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            port,
            templates,
            static_dir,
        } => {
            info!("Starting web UI on port {}...", port);
            let server = web_server::start_web_server(port, templates, static_dir, ChatClient::from_env());
            tokio::select! {
                res = server => res.context("Web server stopped")?,
                _ = tokio::signal::ctrl_c() => info!("Ctrl-C received, shutting down"),
            }
        }
        Commands::Submit(args) => {
            let debug = args.debug;
            let submission = build_submission(args)?;
            let client = ChatClient::from_env();
            let report = submission.submit(&client).await?;
            if report.degraded {
                eprintln!("Warning: the response had no message content");
            }
            println!("{}", report.brief.render_text());
            if debug {
                eprintln!("Request Data\n{}", serde_json::to_string_pretty(&report.request)?);
                eprintln!("Response Data\n{}", serde_json::to_string_pretty(&report.response)?);
            }
        }
        Commands::Interview => {
            let stdin = std::io::stdin();
            let form = interview::run_interview(stdin.lock(), std::io::stderr())
                .context("Interview failed")?;
            println!("{}", serde_json::to_string_pretty(&form)?);
        }
        Commands::Autofill => {
            println!("{}", serde_json::to_string_pretty(&FormInput::autofill())?);
        }
        Commands::Templates => {
            let template = PromptTemplate::default();
            println!("== Context ==\n{}\n\n== Message ==\n{}", template.context, template.message);
        }
    }

    Ok(())
}
