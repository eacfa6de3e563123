//! Import coordination for offer TSV files.
//!
//! The [`Importer`] drives a whole-file import:
//! 1. Read and split the file (fatal on failure, before any connection)
//! 2. Connect the store
//! 3. Parse, resolve and write each row in file order
//! 4. Disconnect the store, whatever the rows did
//!
//! Rows are processed strictly one after another. When two rows would create
//! the same new city or user, the earlier row wins.

use crate::import::error::{ImportError, RowError};
use crate::import::parser::parse_row;
use crate::import::resolver::{EntityResolver, ResolvedEntities};
use crate::import::stats::ImportStats;
use crate::import::tsv::{TsvDocument, TsvRow};
use crate::import::writer::OfferWriter;
use crate::models::Offer;
use crate::store::OfferStore;
use std::fmt;
use std::path::Path;

/// Lifecycle of one import run.
///
/// `Idle → Connecting → Importing → Disconnecting → Done`. A failed
/// connect moves straight to `Failed` without entering `Importing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportPhase {
    Idle,
    Connecting,
    Importing,
    Disconnecting,
    Done,
    Failed,
}

impl fmt::Display for ImportPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImportPhase::Idle => "idle",
            ImportPhase::Connecting => "connecting",
            ImportPhase::Importing => "importing",
            ImportPhase::Disconnecting => "disconnecting",
            ImportPhase::Done => "done",
            ImportPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Owns the store for the duration of the import and releases its
/// connection at the end of every run.
pub struct Importer<S: OfferStore> {
    store: S,
    phase: ImportPhase,
}

impl<S: OfferStore> Importer<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            phase: ImportPhase::Idle,
        }
    }

    pub fn phase(&self) -> ImportPhase {
        self.phase
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn transition(&mut self, next: ImportPhase) {
        log::debug!("import phase {} -> {}", self.phase, next);
        self.phase = next;
    }

    /// Import every row of the TSV file at `path`.
    ///
    /// Fatal errors are returned; row failures are logged and counted in
    /// [`ImportStats::skipped`].
    pub async fn import_file(&mut self, path: &Path) -> Result<ImportStats, ImportError> {
        log::info!("reading {}", path.display());

        let document = match TsvDocument::read(path) {
            Ok(document) => document,
            Err(err) => {
                self.transition(ImportPhase::Failed);
                return Err(err);
            }
        };

        log::info!("found {} data rows", document.rows().len());
        self.import_document(&document).await
    }

    /// Import an already split document.
    pub async fn import_document(
        &mut self,
        document: &TsvDocument,
    ) -> Result<ImportStats, ImportError> {
        self.transition(ImportPhase::Connecting);
        if let Err(err) = self.store.connect().await {
            log::error!("store connection failed: {}", err);
            self.transition(ImportPhase::Failed);
            return Err(ImportError::Connect(err));
        }

        self.transition(ImportPhase::Importing);
        let stats = self.import_rows(document).await;

        self.transition(ImportPhase::Disconnecting);
        if let Err(err) = self.store.disconnect().await {
            log::warn!("failed to close store connection: {}", err);
        }
        self.transition(ImportPhase::Done);

        log::info!(
            "import finished: {} imported, {} skipped ({} cities, {} users created)",
            stats.imported,
            stats.skipped,
            stats.cities_created,
            stats.users_created
        );

        Ok(stats)
    }

    async fn import_rows(&self, document: &TsvDocument) -> ImportStats {
        let resolver = EntityResolver::new(&self.store);
        let writer = OfferWriter::new(&self.store);
        let mut stats = ImportStats::default();

        for row in document.rows() {
            match import_row(document.header(), row, &resolver, &writer).await {
                Ok((offer, resolved)) => {
                    log::trace!("line {}: imported offer {}", row.line, offer.id);
                    stats.imported += 1;
                    stats.cities_created += usize::from(resolved.city_created);
                    stats.users_created += usize::from(resolved.user_created);
                }
                Err(err) => {
                    log::warn!("skipping line {}: {}", row.line, err);
                    stats.skipped += 1;
                }
            }
        }

        stats
    }
}

async fn import_row<S: OfferStore + ?Sized>(
    header: &[String],
    row: &TsvRow,
    resolver: &EntityResolver<'_, S>,
    writer: &OfferWriter<'_, S>,
) -> Result<(Offer, ResolvedEntities), RowError> {
    let record = parse_row(header, &row.values)?;
    let resolved = resolver.resolve(&record).await?;
    let offer = writer.write(&record, &resolved.city, &resolved.user).await?;
    Ok((offer, resolved))
}
