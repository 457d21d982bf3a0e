use anyhow::Context;
use clap::{Parser, Subcommand};
use pixelveil::{PixelCarrier, StegoConfig, StegoEngine};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// pixelveil - password-keyed LSB image steganography
///
/// Hides an AES-256-GCM encrypted message in the least-significant bits of an
/// image's color channels. Only the password is needed to recover it.
#[derive(Parser)]
#[command(name = "pixelveil")]
#[command(version)]
#[command(about = "Password-keyed LSB image steganography", long_about = None)]
struct Cli {
    /// Optional TOML config file (min_password_len, require_lossless_output)
    #[arg(long, global = true, env = "PIXELVEIL_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Embed a secret message into an image
    Embed {
        /// Input carrier image path
        #[arg(short, long)]
        input: PathBuf,

        /// Output stego image path (PNG, BMP or TIFF)
        #[arg(short, long)]
        output: PathBuf,

        /// Secret message (text)
        #[arg(short, long, conflicts_with = "file")]
        message: Option<String>,

        /// Read the secret message from a UTF-8 text file
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Password used to encrypt and position the message
        #[arg(short, long, env = "PIXELVEIL_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Extract a hidden message from a stego image
    Extract {
        /// Stego image with hidden data
        #[arg(short, long)]
        stego: PathBuf,

        /// Output file for extracted message (optional)
        #[arg(short = 'O', long)]
        output: Option<PathBuf>,

        /// Password used at embedding time
        #[arg(short, long, env = "PIXELVEIL_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Show image capacity information
    Info {
        /// Image file path
        #[arg(short, long)]
        image: PathBuf,
    },
}

/// Validate that the output format is lossless (not JPEG)
fn validate_lossless_format(path: &Path) -> anyhow::Result<()> {
    let Some(ext) = path.extension() else {
        anyhow::bail!("Output file must have an extension (e.g., .png)");
    };
    let ext_lower = ext.to_string_lossy().to_lowercase();
    match ext_lower.as_str() {
        "jpg" | "jpeg" => anyhow::bail!(
            "JPEG is a lossy format and will destroy hidden data. \
             Use a lossless extension instead (.png recommended)"
        ),
        "png" | "bmp" | "tif" | "tiff" => Ok(()),
        _ => {
            tracing::warn!(
                extension = %ext_lower,
                "unknown format, steganography requires lossless output (PNG, BMP or TIFF)"
            );
            Ok(())
        }
    }
}

fn load_carrier(path: &Path) -> anyhow::Result<PixelCarrier> {
    let bytes = fs::read(path).with_context(|| format!("reading image {}", path.display()))?;
    let carrier = PixelCarrier::decode(&bytes)
        .with_context(|| format!("decoding image {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        width = carrier.width(),
        height = carrier.height(),
        "image loaded"
    );
    Ok(carrier)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pixelveil=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => StegoConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => StegoConfig::default(),
    };

    let engine = StegoEngine::new();

    match cli.command {
        Commands::Embed {
            input,
            output,
            message,
            file,
            password,
        } => {
            if config.require_lossless_output {
                validate_lossless_format(&output)?;
            }
            config.check_password(&password)?;

            let carrier = load_carrier(&input)?;

            let message = match (message, file) {
                (Some(msg), _) => msg,
                (None, Some(path)) => fs::read_to_string(&path)
                    .with_context(|| format!("reading message file {}", path.display()))?,
                (None, None) => anyhow::bail!("Please provide either --message or --file"),
            };

            let capacity = StegoEngine::calculate_capacity(&carrier);
            tracing::info!(message_bytes = message.len(), capacity_bytes = capacity, "embedding");

            let stego = engine.embed(carrier, &message, &password)?;
            stego
                .save(&output)
                .with_context(|| format!("writing stego image {}", output.display()))?;

            tracing::info!(path = %output.display(), "message embedded");
        }

        Commands::Extract {
            stego,
            output,
            password,
        } => {
            let carrier = load_carrier(&stego)?;
            let extracted = engine.extract(&carrier, &password)?;

            if extracted.verified {
                tracing::info!(bytes = extracted.message.len(), "extraction successful, integrity verified");
            } else {
                tracing::warn!(bytes = extracted.message.len(), "extraction successful, integrity NOT verified");
            }

            match output {
                Some(path) => {
                    fs::write(&path, extracted.message.as_bytes())
                        .with_context(|| format!("writing message to {}", path.display()))?;
                    tracing::info!(path = %path.display(), "message saved");
                }
                None => println!("{}", extracted.message),
            }
        }

        Commands::Info { image } => {
            let carrier = load_carrier(&image)?;
            let capacity_bits =
                pixelveil::scheduler::capacity_bits(carrier.width(), carrier.height());
            let capacity = StegoEngine::calculate_capacity(&carrier);

            println!("Dimensions:       {}x{}", carrier.width(), carrier.height());
            println!("Capacity (bits):  {}", capacity_bits);
            println!("Max message size: {} bytes", capacity);
        }
    }

    Ok(())
}
