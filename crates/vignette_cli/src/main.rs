mod serve;

use clap::{Parser, Subcommand, ValueEnum};
use rand::Rng;
use rand::distr::Alphanumeric;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use vignette_client::{UploadOptions, VignetteClient};
use vignette_core::prelude::*;
use vignette_server::signing::{AssetSigner, SECRET_ENV};

#[derive(Parser)]
#[command(name = "vignette")]
#[command(about = "Server and CLI for the Vignette illustration catalogue")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Server URL
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    #[arg(short, long, env = "VIGNETTE_TOKEN")]
    token: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Kind {
    Category,
    Pack,
    Style,
}

impl From<Kind> for Taxonomy {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Category => Taxonomy::Category,
            Kind::Pack => Taxonomy::Pack,
            Kind::Style => Taxonomy::Style,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the API server
    Serve(serve::ServeArgs),
    /// List illustrations
    List {
        #[arg(long)]
        category: Option<i64>,
        #[arg(long)]
        style: Option<i64>,
        #[arg(long)]
        pack: Option<i64>,
    },
    /// Upload an SVG file
    Upload {
        path: PathBuf,
        #[arg(long)]
        title: String,
        /// Name shown to users (defaults to the local file name)
        #[arg(long)]
        file_name: Option<String>,
        #[arg(long)]
        category: Option<i64>,
        #[arg(long)]
        style: Option<i64>,
        #[arg(long)]
        pack: Option<i64>,
        #[arg(long)]
        premium: bool,
    },
    /// Save an illustration's image to disk
    Fetch {
        id: i64,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Soft delete an illustration
    Delete { id: i64 },
    /// List categories, packs or styles
    Terms { kind: Kind },
    /// Create a category, pack or style
    CreateTerm { kind: Kind, name: String },
    /// Rename a category, pack or style
    RenameTerm { kind: Kind, id: i64, name: String },
    /// Soft delete a category, pack or style
    DeleteTerm { kind: Kind, id: i64 },
    /// Download a pack as a zip archive
    DownloadPack {
        id: i64,
        /// Directory to write the archive to
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },
    GenerateSecret,
    /// Mint an asset token locally, using the server's signing secret
    Sign {
        /// Storage key of the object
        #[arg(short, long)]
        key: String,

        /// Lifetime in seconds (default: 15 minutes)
        #[arg(long, default_value_t = 900)]
        ttl: u64,

        #[arg(long, env = "ASSET_SIGNING_SECRET", hide_env_values = true)]
        secret: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let client = VignetteClient::new(cli.url.clone(), cli.token.clone());

    match cli.command {
        Commands::Serve(args) => serve::run(args).await?,
        Commands::GenerateSecret => {
            let secret: String = rand::rng()
                .sample_iter(&Alphanumeric)
                .take(64)
                .map(char::from)
                .collect();

            println!("🔑 Generated signing secret:");
            println!("\n    {}\n", secret);
            println!("Copy this value and set it on your server:");
            println!("export {SECRET_ENV}=\"{}\"", secret);
        }
        Commands::Sign { key, ttl, secret } => {
            let signer = AssetSigner::new(secret.unwrap_or_default())?;
            let token = signer.issue(&key, Duration::from_secs(ttl))?;
            println!("{}", routes::signed_path(&token));
        }
        Commands::List {
            category,
            style,
            pack,
        } => {
            let filter = IllustrationFilter {
                category_id: category,
                style_id: style,
                pack_id: pack,
            };
            let illustrations = client.list_illustrations(filter).await?;
            if illustrations.is_empty() {
                println!("No illustrations.");
            }
            for i in illustrations {
                let premium = if i.is_premium { " [premium]" } else { "" };
                println!("{:>6}  {}{premium}  ({})", i.id, i.title, i.file_name);
            }
        }
        Commands::Upload {
            path,
            title,
            file_name,
            category,
            style,
            pack,
            premium,
        } => {
            let options = UploadOptions {
                file_name,
                style_id: style,
                category_id: category,
                pack_id: pack,
                is_premium: premium,
            };
            let created = client.upload_illustration(&path, &title, options).await?;
            println!("✅ Uploaded '{}' as illustration {}", created.title, created.id);
            println!("   {}", client.resolve(&created.image_url));
        }
        Commands::Fetch { id, output } => {
            let illustration = client.get_illustration(id).await?;
            let data = client.fetch_image(&illustration.image_url).await?;
            if let Some(parent) = output.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&output, data).await?;
            println!("✅ Saved to {output:?}");
        }
        Commands::Delete { id } => {
            let deleted = client.delete_illustration(id).await?;
            println!("🗑️ Deleted illustration {}", deleted.id);
        }
        Commands::Terms { kind } => {
            let taxonomy = Taxonomy::from(kind);
            for term in client.list_terms(taxonomy).await? {
                println!("{:>6}  {}  ({})", term.id, term.name, term.slug);
            }
        }
        Commands::CreateTerm { kind, name } => {
            let taxonomy = Taxonomy::from(kind);
            let term = client.create_term(taxonomy, &name).await?;
            println!("✅ Created {taxonomy} {} '{}'", term.id, term.slug);
        }
        Commands::RenameTerm { kind, id, name } => {
            let taxonomy = Taxonomy::from(kind);
            let term = client.rename_term(taxonomy, id, &name).await?;
            println!("✅ Renamed {taxonomy} {} to '{}'", term.id, term.name);
        }
        Commands::DeleteTerm { kind, id } => {
            let taxonomy = Taxonomy::from(kind);
            let deleted = client.delete_term(taxonomy, id).await?;
            println!("🗑️ Deleted {taxonomy} {}", deleted.id);
        }
        Commands::DownloadPack { id, output } => {
            println!("Downloading pack {id}...");
            let archive = client.download_pack(id).await?;
            tokio::fs::create_dir_all(&output).await?;
            let path = output.join(&archive.file_name);
            tokio::fs::write(&path, archive.data).await?;
            println!("✅ Saved to {path:?}");
        }
    }

    Ok(())
}
