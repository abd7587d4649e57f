//! # Cost Catalog
//!
//! Unit costs keyed by product name, loaded from a spreadsheet/warehouse CSV
//! export.
//!
//! ## Lookup Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  "Sérum Vitamina-C 30ML"                                               │
//! │        │ normalize_key                                                  │
//! │        ▼                                                                │
//! │  "serum vitamina c 30ml" ──► CachedCatalog                              │
//! │                                  │                                      │
//! │                 fresh? ──no──► CostSource::load() ──Err/empty──┐        │
//! │                    │yes             │ Ok                        │        │
//! │                    ▼                ▼                           ▼        │
//! │               CostCatalog::lookup(key)                    Unresolved    │
//! │                    │                                     (retry on next │
//! │          ┌─────────┴─────────┐                            lookup)       │
//! │          ▼                   ▼                                          │
//! │     Known { cost }     Unresolved { "not in catalog" }                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A source that cannot be read never produces a fabricated cost: every
//! lookup against it is `Unresolved`.

use std::collections::HashMap;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use margin_core::normalize::normalize_key;
use margin_core::{parse_amount, CostResolution};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{DataError, DataResult};

/// Default time a loaded catalog stays fresh.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

// =============================================================================
// Column Mapping
// =============================================================================

/// Header names of the product and cost columns.
///
/// Matched against the file's header row after [`normalize_key`], so
/// `"Custo Médio"` matches `"custo medio"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogColumns {
    pub product: String,
    pub cost: String,
}

impl Default for CatalogColumns {
    fn default() -> Self {
        CatalogColumns {
            product: "product".to_string(),
            cost: "unit_cost".to_string(),
        }
    }
}

impl CatalogColumns {
    pub fn new(product: impl Into<String>, cost: impl Into<String>) -> Self {
        CatalogColumns {
            product: product.into(),
            cost: cost.into(),
        }
    }
}

fn column_index(headers: &csv::StringRecord, name: &str) -> DataResult<usize> {
    let wanted = normalize_key(name);
    headers
        .iter()
        .position(|h| normalize_key(h) == wanted)
        .ok_or_else(|| DataError::missing_column(name, headers))
}

// =============================================================================
// Catalog
// =============================================================================

/// One product's cost, with the name as it appeared in the source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    pub cost: f64,
}

/// In-memory cost table keyed by normalized product name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CostCatalog {
    entries: HashMap<String, CatalogEntry>,
}

impl CostCatalog {
    pub fn new() -> Self {
        CostCatalog::default()
    }

    /// Reads a CSV with a header row.
    ///
    /// ## Row Handling
    /// - blank product name or blank cost: skipped
    /// - cost that does not parse, or is negative: [`DataError::InvalidCost`]
    /// - repeated normalized name: the later row wins
    pub fn from_reader<R: io::Read>(reader: R, columns: &CatalogColumns) -> DataResult<Self> {
        let mut csv = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv.headers()?.clone();
        let product_idx = column_index(&headers, &columns.product)?;
        let cost_idx = column_index(&headers, &columns.cost)?;

        let mut catalog = CostCatalog::new();
        let mut skipped = 0usize;

        for record in csv.records() {
            let record = record?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);

            let name = record.get(product_idx).unwrap_or("");
            let raw_cost = record.get(cost_idx).unwrap_or("");
            if name.is_empty() || raw_cost.is_empty() {
                skipped += 1;
                continue;
            }

            let cost = parse_amount(raw_cost).map_err(|e| DataError::InvalidCost {
                line,
                reason: e.to_string(),
            })?;
            if cost < 0.0 {
                return Err(DataError::InvalidCost {
                    line,
                    reason: format!("negative cost {}", raw_cost),
                });
            }

            if let Some(previous) = catalog.insert(name, cost) {
                warn!(
                    line,
                    product = name,
                    previous = %previous.name,
                    "Duplicate product in cost catalog, keeping the later row"
                );
            }
        }

        debug!(entries = catalog.len(), skipped, "Cost catalog parsed");
        Ok(catalog)
    }

    /// Opens and reads a CSV file.
    pub fn from_path(path: impl AsRef<Path>, columns: &CatalogColumns) -> DataResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => DataError::NotFound(path.to_path_buf()),
            _ => DataError::Io(e),
        })?;
        CostCatalog::from_reader(file, columns)
    }

    /// Adds or replaces a product. Returns the replaced entry.
    pub fn insert(&mut self, name: &str, cost: f64) -> Option<CatalogEntry> {
        self.entries.insert(
            normalize_key(name),
            CatalogEntry {
                name: name.to_string(),
                cost,
            },
        )
    }

    pub fn get(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.get(&normalize_key(name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolves the cost of `name`, or says why it cannot.
    pub fn lookup(&self, name: &str) -> CostResolution {
        if normalize_key(name).is_empty() {
            return CostResolution::unresolved("empty product name");
        }
        match self.get(name) {
            Some(entry) => CostResolution::known(entry.cost),
            None => {
                let reason = format!("'{}' not found in cost catalog", name.trim());
                CostResolution::unresolved(reason)
            }
        }
    }
}

// =============================================================================
// Sources
// =============================================================================

/// Anything a [`CostCatalog`] can be loaded from.
pub trait CostSource {
    /// Human-readable origin, for logs and messages.
    fn describe(&self) -> String;

    fn load(&self) -> DataResult<CostCatalog>;
}

/// A CSV export on the local file system.
#[derive(Debug, Clone)]
pub struct CsvFileSource {
    path: PathBuf,
    columns: CatalogColumns,
}

impl CsvFileSource {
    pub fn new(path: impl Into<PathBuf>, columns: CatalogColumns) -> Self {
        CsvFileSource {
            path: path.into(),
            columns,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CostSource for CsvFileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> DataResult<CostCatalog> {
        let catalog = CostCatalog::from_path(&self.path, &self.columns)?;
        if catalog.is_empty() {
            return Err(DataError::EmptySource(self.describe()));
        }
        info!(path = %self.path.display(), entries = catalog.len(), "Cost catalog loaded");
        Ok(catalog)
    }
}

// =============================================================================
// TTL Cache
// =============================================================================

/// Memoizes a loaded catalog for `ttl`.
///
/// Failed or empty loads are not cached, so the next lookup retries the
/// source.
pub struct CachedCatalog<S> {
    source: S,
    ttl: Duration,
    loaded: Option<(Instant, CostCatalog)>,
}

impl<S: CostSource> CachedCatalog<S> {
    pub fn new(source: S, ttl: Duration) -> Self {
        CachedCatalog {
            source,
            ttl,
            loaded: None,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Drops the cached catalog; the next lookup reloads.
    pub fn invalidate(&mut self) {
        self.loaded = None;
    }

    /// Resolves the cost of `name`, loading the catalog if stale.
    pub fn lookup(&mut self, name: &str) -> CostResolution {
        self.lookup_at(name, Instant::now())
    }

    fn lookup_at(&mut self, name: &str, now: Instant) -> CostResolution {
        match self.catalog_at(now) {
            Ok(catalog) => catalog.lookup(name),
            Err(e) => {
                warn!(source = %self.source.describe(), error = %e, "Cost source unavailable");
                CostResolution::unresolved(format!("cost source unavailable: {}", e))
            }
        }
    }

    fn catalog_at(&mut self, now: Instant) -> DataResult<&CostCatalog> {
        let fresh = matches!(&self.loaded, Some((at, _)) if now.duration_since(*at) < self.ttl);
        if !fresh {
            self.loaded = None;
            let catalog = self.source.load()?;
            if catalog.is_empty() {
                return Err(DataError::EmptySource(self.source.describe()));
            }
            debug!(
                source = %self.source.describe(),
                entries = catalog.len(),
                "Cost catalog cached"
            );
            self.loaded = Some((now, catalog));
        }

        match &self.loaded {
            Some((_, catalog)) => Ok(catalog),
            None => Err(DataError::EmptySource(self.source.describe())),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    const SHEET: &str = "\
Produto,Custo Médio,Fornecedor
Sérum Vitamina C 30ml,\"R$ 32,50\",Acme
Protetor Solar FPS 50,\"1.234,00\",Acme
Sem custo,,Acme
,10,Acme
";

    fn sheet_columns() -> CatalogColumns {
        CatalogColumns::new("produto", "custo medio")
    }

    fn read_default(data: &str) -> DataResult<CostCatalog> {
        CostCatalog::from_reader(data.as_bytes(), &CatalogColumns::default())
    }

    #[test]
    fn test_from_reader_parses_locale_costs() {
        let catalog = CostCatalog::from_reader(SHEET.as_bytes(), &sheet_columns()).unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.lookup("serum vitamina-c 30ML").cost(), Some(32.5));
        assert_eq!(catalog.lookup("PROTETOR SOLAR FPS 50").cost(), Some(1234.0));
    }

    #[test]
    fn test_missing_product_is_unresolved() {
        let catalog = CostCatalog::from_reader(SHEET.as_bytes(), &sheet_columns()).unwrap();

        assert!(!catalog.lookup("Sem custo").is_known());
        assert!(!catalog.lookup("   ").is_known());
    }

    #[test]
    fn test_missing_column() {
        let err = read_default(SHEET).unwrap_err();
        assert!(matches!(err, DataError::MissingColumn { ref column, .. } if column == "product"));
    }

    #[test]
    fn test_invalid_cost_reports_line() {
        let err = read_default("product,unit_cost\nA,1\nB,abc\n").unwrap_err();
        assert!(matches!(err, DataError::InvalidCost { line: 3, .. }));

        let err = read_default("product,unit_cost\nA,-4\n").unwrap_err();
        assert!(matches!(err, DataError::InvalidCost { line: 2, .. }));
    }

    #[test]
    fn test_duplicate_keys_last_wins() {
        let data = "product,unit_cost\nCreme Facial,10\ncreme  FACIAL,12\n";
        let catalog = read_default(data).unwrap();

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("Creme Facial").unwrap().name, "creme  FACIAL");
        assert_eq!(catalog.lookup("creme facial").cost(), Some(12.0));
    }

    struct CountingSource {
        loads: Cell<usize>,
        fail: Cell<bool>,
    }

    impl CountingSource {
        fn new() -> Self {
            CountingSource {
                loads: Cell::new(0),
                fail: Cell::new(false),
            }
        }
    }

    impl CostSource for CountingSource {
        fn describe(&self) -> String {
            "counting".to_string()
        }

        fn load(&self) -> DataResult<CostCatalog> {
            self.loads.set(self.loads.get() + 1);
            if self.fail.get() {
                return Err(DataError::Io(io::Error::new(io::ErrorKind::Other, "offline")));
            }
            let mut catalog = CostCatalog::new();
            catalog.insert("Widget", 7.0);
            Ok(catalog)
        }
    }

    #[test]
    fn test_cache_reuses_within_ttl_and_reloads_after() {
        let mut cache = CachedCatalog::new(CountingSource::new(), Duration::from_secs(60));
        let t0 = Instant::now();

        assert_eq!(cache.lookup_at("widget", t0), CostResolution::known(7.0));
        let later = t0 + Duration::from_secs(30);
        assert_eq!(cache.lookup_at("WIDGET", later).cost(), Some(7.0));
        assert_eq!(cache.source().loads.get(), 1);

        cache.lookup_at("widget", t0 + Duration::from_secs(61));
        assert_eq!(cache.source().loads.get(), 2);
    }

    #[test]
    fn test_cache_failure_is_unresolved_and_retried() {
        let source = CountingSource::new();
        source.fail.set(true);
        let mut cache = CachedCatalog::new(source, Duration::from_secs(60));
        let t0 = Instant::now();

        match cache.lookup_at("widget", t0) {
            CostResolution::Unresolved { reason } => assert!(reason.contains("offline")),
            other => panic!("expected unresolved, got {other:?}"),
        }

        cache.source().fail.set(false);
        assert_eq!(cache.lookup_at("widget", t0), CostResolution::known(7.0));
        assert_eq!(cache.source().loads.get(), 2);
    }

    #[test]
    fn test_invalidate_forces_reload() {
        let mut cache = CachedCatalog::new(CountingSource::new(), DEFAULT_TTL);
        cache.lookup("widget");
        cache.invalidate();
        cache.lookup("widget");
        assert_eq!(cache.source().loads.get(), 2);
    }
}
