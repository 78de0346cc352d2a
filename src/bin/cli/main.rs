use anyhow::{Context, Result};
use bytes::Bytes;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use storage_kit::{
    BucketConfig, BucketName, BucketSettings, DownloadOptions, FilePayload, ListOptions,
    SignedUrlOptions, StorageServices, UploadOptions, UploadPlacement, UrlOptions,
    create_http_storage,
};

#[derive(Parser, Debug)]
#[command(name = "storage-cli")]
#[command(about = "CLI for the storage operation layer", long_about = None)]
struct Cli {
    /// Storage service URL (e.g. https://project.example.co/storage/v1)
    #[arg(short, long, env = "STORAGE_URL")]
    url: String,

    /// Service API key
    #[arg(long, env = "STORAGE_API_KEY")]
    api_key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage buckets
    Bucket {
        #[command(subcommand)]
        command: BucketCommands,
    },

    /// Upload a local file
    Put {
        /// Bucket name
        bucket: String,
        /// Local file to upload
        file: String,
        /// Destination folder inside the bucket
        #[arg(short, long)]
        folder: Option<String>,
        /// Generate a unique destination filename
        #[arg(long)]
        unique: bool,
        /// Content type of the file
        #[arg(short, long, default_value = "application/octet-stream")]
        content_type: String,
        /// Overwrite an existing object at the same path
        #[arg(long)]
        upsert: bool,
    },

    /// Download an object
    Get {
        /// Bucket name
        bucket: String,
        /// Object path
        path: String,
        /// Output file (defaults to the object's basename)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// List objects under a prefix
    List {
        /// Bucket name
        bucket: String,
        /// Prefix to list under
        #[arg(short, long, default_value = "")]
        prefix: String,
        /// Free-text filename search
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Delete objects
    Delete {
        /// Bucket name
        bucket: String,
        /// Object paths
        paths: Vec<String>,
    },

    /// Issue a signed URL
    Sign {
        /// Bucket name
        bucket: String,
        /// Object path
        path: String,
        /// Validity window in seconds
        #[arg(short, long, default_value_t = 3600)]
        expires_in: u64,
    },

    /// Print the public URL of an object
    Url {
        /// Bucket name
        bucket: String,
        /// Object path
        path: String,
    },
}

#[derive(Subcommand, Debug)]
enum BucketCommands {
    /// List buckets
    List,

    /// Create a bucket
    Create {
        /// Bucket name
        name: String,
        /// Make objects publicly readable
        #[arg(long)]
        public: bool,
        /// Per-file size limit in bytes
        #[arg(long)]
        file_size_limit: Option<u64>,
    },

    /// Delete a bucket
    Delete {
        /// Bucket name
        name: String,
    },

    /// Remove every object from a bucket
    Empty {
        /// Bucket name
        name: String,
    },

    /// Provision buckets from a declarative JSON config
    Init {
        /// Config file: a JSON array of bucket entries
        config: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let services = create_http_storage(&cli.url, &cli.api_key)?;

    match cli.command {
        Commands::Bucket { command } => run_bucket_command(&services, command).await,
        Commands::Put {
            bucket,
            file,
            folder,
            unique,
            content_type,
            upsert,
        } => {
            let bucket = BucketName::new(bucket)?;
            let data = tokio::fs::read(&file)
                .await
                .with_context(|| format!("reading {}", file))?;
            let name = std::path::Path::new(&file)
                .file_name()
                .and_then(|n| n.to_str())
                .context("invalid file name")?
                .to_string();

            let record = services.buckets.get_bucket(&bucket).await?;
            let result = services
                .files
                .upload_file_with_validation(
                    &bucket,
                    FilePayload::new(name, content_type, Bytes::from(data)),
                    &record.policy(),
                    UploadPlacement {
                        folder: folder
                            .map(|f| storage_kit::domain::paths::sanitize_path(&f))
                            .filter(|f| !f.is_empty()),
                        unique_name: unique,
                        upload: UploadOptions {
                            upsert,
                            ..Default::default()
                        },
                    },
                )
                .await?;

            println!("uploaded: {}", result.path);
            println!("public:   {}", result.public_url);
            Ok(())
        }
        Commands::Get {
            bucket,
            path,
            output,
        } => {
            let bucket = BucketName::new(bucket)?;
            let result = services
                .files
                .download_file(&bucket, &path, DownloadOptions::default())
                .await?;
            let output = output.unwrap_or_else(|| result.filename.clone());
            tokio::fs::write(&output, &result.data)
                .await
                .with_context(|| format!("writing {}", output))?;
            println!("downloaded {} bytes to {}", result.size, output);
            Ok(())
        }
        Commands::List {
            bucket,
            prefix,
            search,
        } => {
            let bucket = BucketName::new(bucket)?;
            let files = services
                .files
                .list_files(
                    &bucket,
                    &prefix,
                    ListOptions {
                        search,
                        ..Default::default()
                    },
                )
                .await?;
            for file in files {
                let icon = file
                    .content_type
                    .as_deref()
                    .map(storage_kit::domain::media::file_type_icon)
                    .unwrap_or("file");
                println!(
                    "{:<8}  {:>10}  {}  {}",
                    icon,
                    storage_kit::domain::paths::format_bytes(file.size),
                    file.last_modified
                        .map(|t| t.to_rfc3339())
                        .unwrap_or_else(|| "-".to_string()),
                    file.name
                );
            }
            Ok(())
        }
        Commands::Delete { bucket, paths } => {
            let bucket = BucketName::new(bucket)?;
            let removed = services.files.delete_files(&bucket, &paths).await?;
            println!("deleted {} object(s)", removed.len());
            Ok(())
        }
        Commands::Sign {
            bucket,
            path,
            expires_in,
        } => {
            let bucket = BucketName::new(bucket)?;
            let signed = services
                .urls
                .create_signed_url(
                    &bucket,
                    &path,
                    SignedUrlOptions {
                        expires_in: Some(expires_in),
                        ..Default::default()
                    },
                )
                .await?;
            println!("{}", signed.url);
            println!("expires at {}", signed.expires_at.to_rfc3339());
            Ok(())
        }
        Commands::Url { bucket, path } => {
            let bucket = BucketName::new(bucket)?;
            println!(
                "{}",
                services
                    .urls
                    .get_public_url(&bucket, &path, &UrlOptions::default())
            );
            Ok(())
        }
    }
}

async fn run_bucket_command(services: &StorageServices, command: BucketCommands) -> Result<()> {
    match command {
        BucketCommands::List => {
            for bucket in services.buckets.list_buckets().await? {
                println!(
                    "{}  public={}  limit={}",
                    bucket.id,
                    bucket.public,
                    bucket
                        .file_size_limit
                        .map(storage_kit::domain::paths::format_bytes)
                        .unwrap_or_else(|| "-".to_string())
                );
            }
        }
        BucketCommands::Create {
            name,
            public,
            file_size_limit,
        } => {
            let bucket = BucketName::new(name)?;
            services
                .buckets
                .create_bucket(
                    &bucket,
                    BucketSettings {
                        public: Some(public),
                        file_size_limit,
                        ..Default::default()
                    },
                )
                .await?;
            println!("created bucket {}", bucket);
        }
        BucketCommands::Delete { name } => {
            let bucket = BucketName::new(name)?;
            services.buckets.delete_bucket(&bucket).await?;
            println!("deleted bucket {}", bucket);
        }
        BucketCommands::Empty { name } => {
            let bucket = BucketName::new(name)?;
            services.buckets.empty_bucket(&bucket).await?;
            println!("emptied bucket {}", bucket);
        }
        BucketCommands::Init { config } => {
            let raw = tokio::fs::read_to_string(&config)
                .await
                .with_context(|| format!("reading {}", config))?;
            let configs: Vec<BucketConfig> =
                serde_json::from_str(&raw).context("parsing bucket config")?;
            let report = services.buckets.initialize_buckets(&configs).await;

            for id in &report.created {
                println!("created:  {}", id);
            }
            for id in &report.existing {
                println!("existing: {}", id);
            }
            for (id, err) in &report.errors {
                eprintln!("failed:   {} ({})", id, err);
            }
            if !report.errors.is_empty() {
                anyhow::bail!("{} bucket(s) failed to provision", report.errors.len());
            }
        }
    }
    Ok(())
}
