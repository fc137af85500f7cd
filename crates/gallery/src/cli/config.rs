//! The `gallery config` command.

use std::path::Path;

use anyhow::Context;
use clap::{Args, Subcommand};
use gallery_core::lexicon::wordnet::{BUNDLED_NOUNS, NOUNS_FILE};
use gallery_core::Config;

/// Arguments for the `config` command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration as TOML
    Show,

    /// Print the config file path and the resolved data locations
    Path,

    /// Write a default config file and install the bundled lexicon
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Install the bundled WordNet lexicon if none is present
    Lexicon,
}

pub async fn execute(args: ConfigArgs) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => {
            let config = Config::load()?;
            println!("{}", config.to_toml()?);
        }

        ConfigCommand::Path => {
            let config = Config::load()?;
            println!("config:  {}", Config::default_path().display());
            println!("lexicon: {}", config.lexicon_dir().join(NOUNS_FILE).display());
            println!("images:  {}", config.storage_dir().display());
            println!("photos:  {}", config.store_path().display());
        }

        ConfigCommand::Init { force } => {
            let path = Config::default_path();
            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists at: {}\nUse --force to overwrite.",
                    path.display()
                );
            }

            let config = Config::default();
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&path, config.to_toml()?)
                .await
                .with_context(|| format!("Cannot write {}", path.display()))?;
            tracing::info!("Config file created at: {}", path.display());
            println!("Configuration initialized at: {}", path.display());

            install_lexicon(&config.lexicon_dir()).await?;
        }

        ConfigCommand::Lexicon => {
            let config = Config::load()?;
            install_lexicon(&config.lexicon_dir()).await?;
        }
    }

    Ok(())
}

/// Write the bundled noun export into `lexicon_dir` unless one is already
/// there. Returns whether a file was written.
pub async fn install_lexicon(lexicon_dir: &Path) -> anyhow::Result<bool> {
    let nouns_path = lexicon_dir.join(NOUNS_FILE);
    if nouns_path.exists() {
        tracing::info!("Lexicon already installed at {:?}", nouns_path);
        println!("Lexicon present at: {}", nouns_path.display());
        return Ok(false);
    }

    tokio::fs::create_dir_all(lexicon_dir)
        .await
        .with_context(|| format!("Cannot create {}", lexicon_dir.display()))?;
    tokio::fs::write(&nouns_path, BUNDLED_NOUNS)
        .await
        .with_context(|| format!("Cannot write {}", nouns_path.display()))?;

    tracing::info!("Installed {NOUNS_FILE} to {:?}", nouns_path);
    println!("Lexicon installed at: {}", nouns_path.display());
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gallery_core::{LabelClassifier, Lexicon};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_install_lexicon_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let lexicon_dir = dir.path().join("lexicon");

        assert!(install_lexicon(&lexicon_dir).await.unwrap());
        let lexicon = Lexicon::load(&lexicon_dir).unwrap();
        let classifier = LabelClassifier::with_threshold(Arc::new(lexicon), 0.55);
        assert_eq!(classifier.classify(["Dog"]).to_string(), "animal");
    }

    #[tokio::test]
    async fn test_install_lexicon_keeps_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let nouns_path = dir.path().join(NOUNS_FILE);
        std::fs::write(&nouns_path, "dog\tdog.n.01\tanimal|entity\n").unwrap();

        assert!(!install_lexicon(dir.path()).await.unwrap());
        assert_eq!(
            std::fs::read_to_string(&nouns_path).unwrap(),
            "dog\tdog.n.01\tanimal|entity\n"
        );
    }
}
