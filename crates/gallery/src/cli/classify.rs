//! The `gallery classify` command.

use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use gallery_core::{Config, LabelClassifier, Lexicon, OutputFormat, OutputWriter};

/// Arguments for the `classify` command.
#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Labels in detection order (quote multi-word labels)
    pub labels: Vec<String>,

    /// Print the candidate label and per-category scores as JSON
    #[arg(long)]
    pub explain: bool,

    /// Override the classification threshold
    #[arg(long)]
    pub threshold: Option<f32>,
}

/// Execute the classify command. Needs only the lexicon, no remote services.
pub fn execute(args: ClassifyArgs, config: &Config) -> anyhow::Result<()> {
    let lexicon_dir = config.lexicon_dir();
    let lexicon = Lexicon::load(&lexicon_dir).with_context(|| {
        format!(
            "Cannot classify without a lexicon at {}.\n\n  \
             Hint: run `gallery config lexicon` to install the bundled one",
            lexicon_dir.join(gallery_core::lexicon::wordnet::NOUNS_FILE).display()
        )
    })?;

    let threshold = args.threshold.unwrap_or(config.classifier.threshold);
    if !(0.0..=1.0).contains(&threshold) {
        anyhow::bail!("--threshold must be between 0.0 and 1.0, got {threshold}");
    }
    let classifier = LabelClassifier::with_threshold(Arc::new(lexicon), threshold);

    let classification = classifier.explain(&args.labels);
    if args.explain {
        let mut writer = OutputWriter::new(std::io::stdout().lock(), OutputFormat::Json, true);
        writer.write(&classification)?;
        writer.flush()?;
    } else {
        println!("{}", classification.category);
    }

    Ok(())
}
