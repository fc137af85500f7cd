//! Photo ingestion: store, detect labels, classify, persist.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::classify::{Category, CategoryGroups, LabelClassifier};
use crate::config::Config;
use crate::error::Result;
use crate::lexicon::{LexicalOracle, Lexicon};
use crate::storage::{self, content_type_for, ObjectStore};
use crate::store::{JsonFileStore, MetadataStore};
use crate::types::{describe_labels, PhotoEdit, PhotoMetadata, PhotoRecord, Upload};
use crate::validate::UploadValidator;
use crate::vision::{CloudVisionDetector, LabelDetector};

/// Result of storing and analysing one image.
struct Analysed {
    url: String,
    label: String,
    category: Category,
}

type ClassifierLoader<O> = Box<dyn Fn() -> Result<LabelClassifier<O>> + Send + Sync>;

/// The classifier, either supplied up front or loaded on first use.
enum ClassifierSlot<O: LexicalOracle> {
    Ready(LabelClassifier<O>),
    Lazy {
        cell: OnceLock<LabelClassifier<O>>,
        load: ClassifierLoader<O>,
    },
}

impl<O: LexicalOracle> ClassifierSlot<O> {
    fn get(&self) -> Result<&LabelClassifier<O>> {
        match self {
            ClassifierSlot::Ready(classifier) => Ok(classifier),
            ClassifierSlot::Lazy { cell, load } => {
                if let Some(classifier) = cell.get() {
                    return Ok(classifier);
                }
                let classifier = load()?;
                Ok(cell.get_or_init(|| classifier))
            }
        }
    }
}

/// The gallery service. Collaborators are injected and live for the process.
pub struct Gallery<O: LexicalOracle = Lexicon> {
    objects: Arc<dyn ObjectStore>,
    detector: Arc<dyn LabelDetector>,
    records: Arc<dyn MetadataStore>,
    classifier: ClassifierSlot<O>,
    validator: UploadValidator,
}

impl Gallery<Lexicon> {
    /// Build the production gallery from config.
    ///
    /// The lexicon is loaded the first time an image is classified, so
    /// listing, showing, deleting and metadata edits work without one.
    pub fn from_config(config: &Config) -> Result<Self> {
        let objects = storage::from_config(config)?;
        let detector: Arc<dyn LabelDetector> =
            Arc::new(CloudVisionDetector::from_config(&config.vision));
        let records: Arc<dyn MetadataStore> = Arc::new(JsonFileStore::new(config.store_path()));

        let lexicon_dir = config.lexicon_dir();
        let classifier_config = config.classifier.clone();
        let load: ClassifierLoader<Lexicon> = Box::new(move || {
            let lexicon = Lexicon::load(&lexicon_dir)?;
            Ok(LabelClassifier::new(Arc::new(lexicon), &classifier_config))
        });

        Ok(Self {
            objects,
            detector,
            records,
            classifier: ClassifierSlot::Lazy {
                cell: OnceLock::new(),
                load,
            },
            validator: UploadValidator::new(config.limits.clone()),
        })
    }
}

impl<O: LexicalOracle> Gallery<O> {
    pub fn new(
        objects: Arc<dyn ObjectStore>,
        detector: Arc<dyn LabelDetector>,
        records: Arc<dyn MetadataStore>,
        classifier: LabelClassifier<O>,
        validator: UploadValidator,
    ) -> Self {
        Self {
            objects,
            detector,
            records,
            classifier: ClassifierSlot::Ready(classifier),
            validator,
        }
    }

    /// The classifier, loading the lexicon if this is the first use.
    pub fn classifier(&self) -> Result<&LabelClassifier<O>> {
        self.classifier.get()
    }

    /// Store a new photo and its classified metadata.
    pub async fn upload(&self, upload: Upload, metadata: PhotoMetadata) -> Result<PhotoRecord> {
        let analysed = self.store_and_analyse(&upload).await?;

        let mut record = PhotoRecord {
            id: 0,
            url: Some(analysed.url),
            photographer: metadata.photographer,
            location: metadata.location,
            date: metadata.date,
            label: Some(analysed.label),
            category: Some(analysed.category.to_string()),
        };
        record.id = self.records.insert(record.clone()).await?;

        tracing::info!(
            "Uploaded {} as photo {} ({})",
            upload.file_name,
            record.id,
            analysed.category
        );
        Ok(record)
    }

    /// Edit a photo's metadata, optionally replacing its image.
    ///
    /// With a replacement the image is re-analysed and the category comes from
    /// the classifier; otherwise the edit's category is stored as given.
    pub async fn edit(
        &self,
        id: u64,
        edit: PhotoEdit,
        replacement: Option<Upload>,
    ) -> Result<PhotoRecord> {
        let mut record = self.records.get(id).await?;
        edit.apply_metadata(&mut record);

        let Some(upload) = replacement else {
            if let Some(category) = edit.category {
                record.category = Some(category);
            }
            self.records.update(record.clone()).await?;
            tracing::info!("Edited photo {id}");
            return Ok(record);
        };

        let previous_url = record.url.take();
        let analysed = self.store_and_analyse(&upload).await?;
        record.url = Some(analysed.url.clone());
        record.label = Some(analysed.label);
        record.category = Some(analysed.category.to_string());

        // The old image stays until the record no longer points at it.
        if let Err(e) = self.records.update(record.clone()).await {
            self.remove_object(&analysed.url).await;
            return Err(e.into());
        }
        if let Some(url) = previous_url.filter(|url| *url != analysed.url) {
            self.remove_object(&url).await;
        }

        tracing::info!("Edited photo {id} with new image {}", upload.file_name);
        Ok(record)
    }

    /// Delete a photo record and, best effort, its stored image.
    pub async fn delete(&self, id: u64) -> Result<PhotoRecord> {
        let record = self.records.delete(id).await?;
        if let Some(url) = &record.url {
            self.remove_object(url).await;
        }
        tracing::info!("Deleted photo {id}");
        Ok(record)
    }

    pub async fn get(&self, id: u64) -> Result<PhotoRecord> {
        Ok(self.records.get(id).await?)
    }

    /// Most recent photos, ordered by URL descending.
    pub async fn list(&self, limit: usize) -> Result<Vec<PhotoRecord>> {
        Ok(self.records.list(limit).await?)
    }

    /// Photos partitioned into category buckets.
    pub async fn list_grouped(&self, limit: usize) -> Result<CategoryGroups> {
        Ok(CategoryGroups::partition(self.list(limit).await?))
    }

    /// Validate, store, detect labels and classify one image.
    async fn store_and_analyse(&self, upload: &Upload) -> Result<Analysed> {
        self.validator.validate(upload)?;
        let classifier = self.classifier()?;

        let object_name = unique_object_name(&upload.file_name);
        let url = self
            .objects
            .put(&object_name, &upload.bytes, content_type_for(&object_name))
            .await?;

        let labels = match self.detector.detect_labels(&url).await {
            Ok(labels) => labels,
            Err(e) => {
                // The name is unique to this upload, so nothing else uses it.
                self.remove_object(&url).await;
                return Err(e.into());
            }
        };
        let category = classifier.classify(&labels);
        tracing::debug!(
            "{} labelled {labels:?} by {} -> {category}",
            object_name,
            self.detector.name()
        );

        Ok(Analysed {
            url,
            label: describe_labels(&labels),
            category,
        })
    }

    async fn remove_object(&self, url: &str) {
        let Some(name) = self.objects.object_name(url) else {
            tracing::warn!("Not deleting {url}: not issued by {}", self.objects.name());
            return;
        };
        if let Err(e) = self.objects.delete(&name).await {
            tracing::warn!("Failed to delete stored image {name}: {e}");
        }
    }
}

static UPLOAD_SEQ: AtomicU32 = AtomicU32::new(0);

/// Object name unique to one upload: a zero-padded nanosecond timestamp and
/// a per-process sequence number, then the sanitized file name.
fn unique_object_name(file_name: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let seq = UPLOAD_SEQ.fetch_add(1, Ordering::Relaxed) % 10_000;
    format!("{nanos:020}{seq:04}-{}", sanitize_object_name(file_name))
}

/// Object names keep ASCII alphanumerics, `.`, `-` and `_`; anything else
/// becomes `_`.
fn sanitize_object_name(file_name: &str) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name);
    base.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
