//! Photo commands: `upload`, `list`, `show`, `edit`, `delete`.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, ValueEnum};
use gallery_core::{
    Config, Gallery, OutputFormat as CoreOutputFormat, OutputWriter, PhotoEdit, PhotoMetadata,
    Upload,
};
use serde::Serialize;

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// JSON document (array for lists)
    #[default]
    Json,
    /// One JSON object per line
    Jsonl,
}

impl From<OutputFormat> for CoreOutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => CoreOutputFormat::Json,
            OutputFormat::Jsonl => CoreOutputFormat::JsonLines,
        }
    }
}

/// Arguments for the `upload` command.
#[derive(Args, Debug)]
pub struct UploadArgs {
    /// Image file to upload
    pub file: PathBuf,

    #[arg(long)]
    pub photographer: Option<String>,

    #[arg(long)]
    pub location: Option<String>,

    /// Free-text date (e.g. 2018-01-01)
    #[arg(long)]
    pub date: Option<String>,
}

/// Arguments for the `list` command.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Maximum number of photos (defaults to general.list_limit)
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Group photos into animal / flower / people / other
    #[arg(long)]
    pub grouped: bool,

    /// Output format (defaults to output.format)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,
}

/// Arguments for the `show` command.
#[derive(Args, Debug)]
pub struct ShowArgs {
    pub id: u64,
}

/// Arguments for the `edit` command.
#[derive(Args, Debug)]
pub struct EditArgs {
    pub id: u64,

    #[arg(long)]
    pub photographer: Option<String>,

    #[arg(long)]
    pub location: Option<String>,

    #[arg(long)]
    pub date: Option<String>,

    /// Category to store; ignored when --image is given
    #[arg(long)]
    pub category: Option<String>,

    /// Replacement image; its labels and category are re-detected
    #[arg(long)]
    pub image: Option<PathBuf>,
}

/// Arguments for the `delete` command.
#[derive(Args, Debug)]
pub struct DeleteArgs {
    pub id: u64,
}

pub async fn upload(args: UploadArgs, config: &Config) -> anyhow::Result<()> {
    let gallery = Gallery::from_config(config)?;
    let upload = read_upload(&args.file)?;
    let metadata = PhotoMetadata {
        photographer: args.photographer,
        location: args.location,
        date: args.date,
    };

    let record = gallery.upload(upload, metadata).await?;
    print_one(&record, config)
}

pub async fn list(args: ListArgs, config: &Config) -> anyhow::Result<()> {
    let gallery = Gallery::from_config(config)?;
    let limit = args.limit.unwrap_or(config.general.list_limit);
    let format = args
        .format
        .map(CoreOutputFormat::from)
        .or_else(|| CoreOutputFormat::parse(&config.output.format))
        .unwrap_or(CoreOutputFormat::Json);

    let mut writer = OutputWriter::new(std::io::stdout().lock(), format, config.output.pretty);
    if args.grouped {
        let groups = gallery.list_grouped(limit).await?;
        writer.write(&groups)?;
    } else {
        let photos = gallery.list(limit).await?;
        if photos.is_empty() {
            tracing::info!("No photos stored yet");
        }
        writer.write_list(&photos)?;
    }
    writer.flush()?;
    Ok(())
}

pub async fn show(args: ShowArgs, config: &Config) -> anyhow::Result<()> {
    let gallery = Gallery::from_config(config)?;
    let record = gallery.get(args.id).await?;
    print_one(&record, config)
}

pub async fn edit(args: EditArgs, config: &Config) -> anyhow::Result<()> {
    let gallery = Gallery::from_config(config)?;
    let replacement = args.image.as_deref().map(read_upload).transpose()?;
    if replacement.is_some() && args.category.is_some() {
        tracing::warn!("--category is ignored when --image is given");
    }

    let edit = PhotoEdit {
        photographer: args.photographer,
        location: args.location,
        date: args.date,
        category: args.category,
    };
    let record = gallery.edit(args.id, edit, replacement).await?;
    print_one(&record, config)
}

pub async fn delete(args: DeleteArgs, config: &Config) -> anyhow::Result<()> {
    let gallery = Gallery::from_config(config)?;
    let record = gallery.delete(args.id).await?;
    println!("Deleted photo {}", record.id);
    Ok(())
}

/// Read an image file into an upload named after the file.
fn read_upload(path: &Path) -> anyhow::Result<Upload> {
    let bytes = std::fs::read(path).with_context(|| format!("Cannot read {}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("Invalid file name: {}", path.display()))?;
    Ok(Upload::new(file_name, bytes))
}

fn print_one<T: Serialize>(item: &T, config: &Config) -> anyhow::Result<()> {
    let stdout = std::io::stdout().lock();
    let mut writer = OutputWriter::new(stdout, CoreOutputFormat::Json, config.output.pretty);
    writer.write(item)?;
    writer.into_inner().flush()?;
    Ok(())
}
