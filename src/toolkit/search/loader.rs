use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{error, info, warn};

use super::engine::{EngineParts, RankingEngine, Thresholds};
use super::models::{SearchRequest, SearchResponse};
use super::scoring::QueryScorer;
use crate::core::cache::{CacheStats, MatrixCache};
use crate::core::config::OntoRankConfig;
use crate::core::error::{OntoRankError, Result};
use crate::core::identity::{GraphKind, MatrixIdentity};
use crate::db::{
    Configuration, DatasetInfo, GraphMeta, GraphStore, MatrixStore, ResolvedConfiguration,
};
use crate::toolkit::lexical::{Corpora, CorpusTagger, Language, LexicalScorer, TermExtractor};
use crate::toolkit::matrix::{ConceptIndex, Matrix, TracingProgress, build_ccs, build_cds};
use crate::toolkit::ontology::Taxonomy;


/// Which configuration to load. `Default` is resolved through the graph
/// store on every access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationSelector {
    Default,
    Id(String),
}

impl From<&str> for ConfigurationSelector {
    fn from(id: &str) -> Self {
        if id == "default" {
            Self::Default
        } else {
            Self::Id(id.to_string())
        }
    }
}

impl From<String> for ConfigurationSelector {
    fn from(id: String) -> Self {
        Self::from(id.as_str())
    }
}


struct Snapshot {
    configuration: Configuration,
    resolved: ResolvedConfiguration,
    ontology: MatrixIdentity,
    similarity: MatrixIdentity,
    autotag: MatrixIdentity,
    engine: Arc<RankingEngine>,
}

struct TaggingMetas {
    resolved: ResolvedConfiguration,
    similarity: GraphMeta,
    autotag: GraphMeta,
    ontology: MatrixIdentity,
}


/// Keeps one ranking engine per configuration and rebuilds only what the
/// store says has changed.
pub struct EngineLoader {
    store: Arc<dyn GraphStore>,
    cache: MatrixCache,
    lexical: Arc<LexicalScorer>,
    language: Language,
    config: OntoRankConfig,
    snapshots: RwLock<HashMap<String, Arc<Snapshot>>>,
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl EngineLoader {
    pub fn new(
        store: Arc<dyn GraphStore>,
        matrices: Arc<dyn MatrixStore>,
        corpora: &Corpora,
        config: OntoRankConfig,
    ) -> Result<Self> {
        config.validate()?;
        let corpus = corpora.get(config.language)?;
        let tagger = Arc::new(CorpusTagger::new(Arc::clone(&corpus)));
        let lexical = Arc::new(LexicalScorer::new(Arc::new(TermExtractor::new(tagger, corpus))));

        Ok(Self {
            store,
            cache: MatrixCache::new(matrices, config.matrix_cache_capacity),
            lexical,
            language: config.language,
            config,
            snapshots: RwLock::new(HashMap::new()),
            locks: Mutex::new(HashMap::new()),
        })
    }

    /// Number of configurations the graph store knows, loaded or not.
    pub async fn len(&self) -> Result<usize> {
        Ok(self.store.configuration_ids().await?.len())
    }

    /// Ids of every configuration in the graph store, sorted.
    pub async fn ids(&self) -> Result<Vec<String>> {
        let mut ids = self.store.configuration_ids().await?;
        ids.sort();
        Ok(ids)
    }

    pub fn loaded_count(&self) -> usize {
        self.snapshots.read().len()
    }

    /// Ids of the configurations with an engine in memory.
    pub fn loaded_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.snapshots.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Engine for the selected configuration, brought up to date with the
    /// graph store first.
    pub async fn get(&self, selector: impl Into<ConfigurationSelector>) -> Result<Arc<RankingEngine>> {
        let id = self.resolve_id(selector.into()).await?;
        // Unknown ids never get a lock entry.
        self.configuration(&id).await?;
        let lock = self.lock_for(&id);
        let _guard = lock.lock().await;

        let configuration = match self.configuration(&id).await {
            Ok(configuration) => configuration,
            Err(err) => {
                if err.is_not_found() {
                    self.locks.lock().remove(&id);
                    self.snapshots.write().remove(&id);
                }
                return Err(err);
            }
        };
        let previous = self.snapshots.read().get(&id).cloned();

        let outcome = match &previous {
            Some(prev) if prev.configuration == configuration => self.refresh(prev, &configuration).await,
            _ => self.build(&configuration).await.map(Some),
        };

        match outcome {
            Ok(Some(snapshot)) => {
                let engine = Arc::clone(&snapshot.engine);
                self.snapshots.write().insert(id, Arc::new(snapshot));
                Ok(engine)
            }
            Ok(None) => previous
                .map(|prev| Arc::clone(&prev.engine))
                .ok_or_else(|| OntoRankError::Internal(format!("no engine for {id}"))),
            Err(err) if err.is_missing_matrix() => match previous {
                Some(prev) => {
                    warn!("Serving outdated engine for {}: {}", id, err);
                    Ok(Arc::clone(&prev.engine))
                }
                None => Err(err),
            },
            Err(err) => Err(err),
        }
    }

    pub async fn ensure_default_loaded(&self) -> Result<Arc<RankingEngine>> {
        self.get(ConfigurationSelector::Default).await
    }

    /// Load every configuration the store knows. All are attempted; the
    /// first failure is returned afterwards.
    pub async fn ensure_all_loaded(&self) -> Result<usize> {
        let ids = self.store.configuration_ids().await?;
        let mut first_error = None;
        let mut loaded = 0;
        for id in ids {
            match self.get(ConfigurationSelector::Id(id.clone())).await {
                Ok(_) => loaded += 1,
                Err(err) => {
                    error!("Failed to load configuration {}: {}", id, err);
                    first_error.get_or_insert(err);
                }
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => {
                info!("{} configurations loaded", loaded);
                Ok(loaded)
            }
        }
    }

    async fn resolve_id(&self, selector: ConfigurationSelector) -> Result<String> {
        match selector {
            ConfigurationSelector::Id(id) => Ok(id),
            ConfigurationSelector::Default => self
                .store
                .default_configuration_id()
                .await?
                .ok_or_else(|| OntoRankError::UnrecognizedIdentifier {
                    kind: "configuration",
                    id: "default".to_string(),
                }),
        }
    }

    async fn configuration(&self, id: &str) -> Result<Configuration> {
        self.store
            .resolve_configuration(id)
            .await?
            .ok_or_else(|| OntoRankError::UnrecognizedIdentifier {
                kind: "configuration",
                id: id.to_string(),
            })
    }

    /// Rank datasets for `request`. Datasets missing from the engine's
    /// catalog, such as ones tagged after the last full rebuild, are
    /// described through the graph store.
    pub async fn search(
        &self,
        selector: impl Into<ConfigurationSelector>,
        request: &SearchRequest,
    ) -> Result<SearchResponse> {
        let engine = self.get(selector).await?;
        let mut response = engine.search(request)?;
        let version = &engine.configuration().dataset;
        for result in &mut response.results {
            if result.info.is_none() || engine.has_dataset(&result.dataset) {
                continue;
            }
            if let Some(info) = self.store.dataset_info(version, &result.dataset).await? {
                result.info = Some(info);
            }
        }
        Ok(response)
    }

    fn lock_for(&self, id: &str) -> Arc<tokio::sync::Mutex<()>> {
        Arc::clone(self.locks.lock().entry(id.to_string()).or_default())
    }

    async fn metadata(&self, kind: GraphKind, version: &str) -> Result<GraphMeta> {
        self.store
            .graph_metadata(kind, version)
            .await?
            .ok_or_else(|| OntoRankError::UnrecognizedIdentifier {
                kind: kind.into(),
                id: version.to_string(),
            })
    }

    async fn tagging_metas(&self, configuration: &Configuration) -> Result<TaggingMetas> {
        let similarity = self.metadata(GraphKind::Similarity, &configuration.similarity).await?;
        let autotag = self.metadata(GraphKind::Autotag, &configuration.autotag).await?;
        let resolved = configuration.resolve(&similarity, &autotag)?;
        let ontology = self.metadata(GraphKind::Ontology, &resolved.ontology).await?;

        Ok(TaggingMetas {
            ontology: MatrixIdentity::ccs(&resolved.ontology, ontology.last_modified),
            resolved,
            similarity,
            autotag,
        })
    }

    fn cds_identity(&self, meta: &GraphMeta, ontology: &MatrixIdentity) -> MatrixIdentity {
        MatrixIdentity::cds(
            meta.kind,
            &meta.version,
            meta.last_modified,
            ontology,
            self.config.concept_relevance_threshold,
        )
    }

    async fn build(&self, configuration: &Configuration) -> Result<Snapshot> {
        let metas = self.tagging_metas(configuration).await?;
        let resolved = metas.resolved.clone();
        info!("Building engine for configuration {}", resolved.id);

        let ontology = self
            .store
            .load_ontology(&resolved.ontology)
            .await?
            .ok_or_else(|| OntoRankError::UnrecognizedIdentifier {
                kind: "ontology",
                id: resolved.ontology.clone(),
            })?;
        let taxonomy = ontology.taxonomy;

        let ccs = self.ccs_for(&metas.ontology, &taxonomy).await?;
        let similarity_identity = self.cds_identity(&metas.similarity, &metas.ontology);
        let autotag_identity = self.cds_identity(&metas.autotag, &metas.ontology);
        let (similarity, autotag) = futures::try_join!(
            self.cds_for(&similarity_identity, &ccs),
            self.cds_for(&autotag_identity, &ccs),
        )?;

        let datasets = self
            .store
            .load_datasets(&resolved.dataset)
            .await?
            .ok_or_else(|| OntoRankError::UnrecognizedIdentifier {
                kind: "dataset",
                id: resolved.dataset.clone(),
            })?;
        let datasets: HashMap<String, DatasetInfo> = datasets
            .iter()
            .map(|d| (d.uri.clone(), DatasetInfo::from(d)))
            .collect();

        let labels = {
            let lexical = Arc::clone(&self.lexical);
            let taxonomy = Arc::clone(&taxonomy);
            tokio::task::spawn_blocking(move || lexical.index_labels(&taxonomy)).await?
        };

        let engine = RankingEngine::new(EngineParts {
            configuration: resolved.clone(),
            taxonomy,
            ccs,
            similarity,
            autotag,
            scorer: QueryScorer::new(Arc::clone(&self.lexical), Arc::new(labels), self.language),
            datasets: Arc::new(datasets),
            thresholds: Thresholds::from(&self.config),
        })?;

        Ok(Snapshot {
            configuration: configuration.clone(),
            resolved,
            ontology: metas.ontology,
            similarity: similarity_identity,
            autotag: autotag_identity,
            engine: Arc::new(engine),
        })
    }

    /// Replace only the concept-dataset matrices whose tagging changed.
    /// `None` when everything is current.
    async fn refresh(&self, previous: &Snapshot, configuration: &Configuration) -> Result<Option<Snapshot>> {
        let metas = self.tagging_metas(configuration).await?;
        if metas.ontology != previous.ontology || metas.resolved != previous.resolved {
            return self.build(configuration).await.map(Some);
        }

        let similarity_identity = self.cds_identity(&metas.similarity, &metas.ontology);
        let autotag_identity = self.cds_identity(&metas.autotag, &metas.ontology);
        if similarity_identity == previous.similarity && autotag_identity == previous.autotag {
            return Ok(None);
        }

        let mut engine = Arc::clone(&previous.engine);
        for (kind, identity, current) in [
            (GraphKind::Similarity, &similarity_identity, &previous.similarity),
            (GraphKind::Autotag, &autotag_identity, &previous.autotag),
        ] {
            if identity == current {
                continue;
            }
            info!("Refreshing {} matrix of {}", kind, previous.resolved.id);
            let cds = self.cds_for(identity, engine.ccs()).await?;
            engine = Arc::new(engine.with_cds(kind, cds)?);
        }

        Ok(Some(Snapshot {
            configuration: configuration.clone(),
            resolved: metas.resolved,
            ontology: metas.ontology,
            similarity: similarity_identity,
            autotag: autotag_identity,
            engine,
        }))
    }

    async fn ccs_for(&self, identity: &MatrixIdentity, taxonomy: &Arc<Taxonomy>) -> Result<Arc<Matrix>> {
        let matrix = self
            .cache
            .get_or_compute(identity, self.config.auto_compute, || {
                let taxonomy = Arc::clone(taxonomy);
                async move { tokio::task::spawn_blocking(move || build_ccs(&taxonomy, &TracingProgress)).await? }
            })
            .await?;
        bind_to(matrix, taxonomy.index())
    }

    async fn cds_for(&self, identity: &MatrixIdentity, ccs: &Arc<Matrix>) -> Result<Arc<Matrix>> {
        let threshold = self.config.concept_relevance_threshold;
        let matrix = self
            .cache
            .get_or_compute(identity, self.config.auto_compute, || async move {
                let tagging = self
                    .store
                    .load_tagging(identity.kind, &identity.version)
                    .await?
                    .ok_or_else(|| OntoRankError::UnrecognizedIdentifier {
                        kind: identity.kind.into(),
                        id: identity.version.clone(),
                    })?;
                let ccs = Arc::clone(ccs);
                tokio::task::spawn_blocking(move || build_cds(&tagging, &ccs, threshold, &TracingProgress))
                    .await?
            })
            .await?;
        bind_to(matrix, ccs.columns())
    }
}

/// Share the taxonomy's concept index with a matrix read back from storage.
fn bind_to(matrix: Arc<Matrix>, index: &Arc<ConceptIndex>) -> Result<Arc<Matrix>> {
    if Arc::ptr_eq(matrix.columns(), index) {
        return Ok(matrix);
    }
    Ok(Arc::new(Arc::unwrap_or_clone(matrix).rebind_columns(index)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Dataset, InMemoryGraphStore, InMemoryMatrixStore, TaggingEntry};
    use crate::testing::{fixed_corpora, scenario_store, tagging_meta, ts};
    use crate::toolkit::search::{CdsName, SearchRequest};
    use tokio_test::{assert_err, assert_ok};

    fn loader_with(
        store: Arc<InMemoryGraphStore>,
        matrices: Arc<InMemoryMatrixStore>,
        auto_compute: bool,
    ) -> EngineLoader {
        let mut config = OntoRankConfig::default();
        config.auto_compute = auto_compute;
        EngineLoader::new(store, matrices, &fixed_corpora(), config).unwrap()
    }

    fn entry(dataset: &str, concept: &str, score: f64) -> TaggingEntry {
        TaggingEntry {
            dataset: dataset.to_string(),
            concept: concept.to_string(),
            score,
        }
    }

    #[tokio::test]
    async fn test_default_configuration_is_built_and_searchable() {
        let store = Arc::new(scenario_store());
        let loader = loader_with(store, Arc::new(InMemoryMatrixStore::new()), true);

        let engine = assert_ok!(loader.get("default").await);
        assert_eq!(engine.configuration().id, "cfg-1");
        assert_eq!(loader.loaded_ids(), vec!["cfg-1".to_string()]);

        let response = engine.search(&SearchRequest::new("hound")).unwrap();
        assert_eq!(response.results[0].dataset, "urn:D");
        assert_eq!(response.results[0].info.as_ref().unwrap().title, "Dataset D");
    }

    #[tokio::test]
    async fn test_unchanged_configuration_reuses_engine() {
        let store = Arc::new(scenario_store());
        let matrices = Arc::new(InMemoryMatrixStore::new());
        let loader = loader_with(store, Arc::clone(&matrices), true);

        let first = loader.get("cfg-1").await.unwrap();
        let writes = matrices.writes();
        let second = loader.get("cfg-1").await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(matrices.writes(), writes);
    }

    #[tokio::test]
    async fn test_tagging_change_refreshes_only_that_matrix() {
        let store = Arc::new(scenario_store());
        let loader = loader_with(Arc::clone(&store), Arc::new(InMemoryMatrixStore::new()), true);
        let before = loader.get("cfg-1").await.unwrap();
        assert!(before.cds(CdsName::Similarity).row_position("urn:F").is_none());

        store
            .insert_tagging(
                tagging_meta(GraphKind::Similarity, "sim-1", ts(900)),
                vec![entry("urn:D", "urn:A", 0.8), entry("urn:F", "urn:A1", 0.7)],
            )
            .unwrap();

        let after = loader.get("cfg-1").await.unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
        assert!(after.cds(CdsName::Similarity).row_position("urn:F").is_some());
        assert!(Arc::ptr_eq(after.cds(CdsName::Autotag), before.cds(CdsName::Autotag)));
        assert!(Arc::ptr_eq(after.ccs(), before.ccs()));
        assert_eq!(loader.loaded_count(), 1);
    }

    #[tokio::test]
    async fn test_inconsistent_configuration_fails_at_load() {
        let store = Arc::new(scenario_store());
        let mut meta = tagging_meta(GraphKind::Autotag, "auto-1", ts(300));
        meta.dataset = Some("ds-2".to_string());
        store.insert_tagging(meta, vec![entry("urn:E", "urn:B", 0.9)]).unwrap();

        let loader = loader_with(store, Arc::new(InMemoryMatrixStore::new()), true);
        let err = assert_err!(loader.get("cfg-1").await);
        assert!(matches!(
            err,
            OntoRankError::InconsistentConfiguration { field: "dataset", .. }
        ));
        assert_eq!(loader.loaded_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_matrix_falls_back_to_previous_engine() {
        let store = Arc::new(scenario_store());
        let matrices = Arc::new(InMemoryMatrixStore::new());

        // Precompute everything, then serve from storage only.
        loader_with(Arc::clone(&store), Arc::clone(&matrices), true)
            .ensure_all_loaded()
            .await
            .unwrap();
        let loader = loader_with(Arc::clone(&store), Arc::clone(&matrices), false);
        let before = loader.get("cfg-1").await.unwrap();

        assert!(store.touch(GraphKind::Autotag, "auto-1", ts(901)));
        let after = loader.get("cfg-1").await.unwrap();
        assert!(Arc::ptr_eq(&before, &after));

        let fresh = loader_with(store, matrices, false);
        assert!(assert_err!(fresh.get("cfg-1").await).is_missing_matrix());
    }

    #[tokio::test]
    async fn test_unknown_configuration() {
        let loader = loader_with(
            Arc::new(scenario_store()),
            Arc::new(InMemoryMatrixStore::new()),
            true,
        );
        let err = loader.get("cfg-404").await.err().unwrap();
        assert!(err.is_not_found());

        let empty = loader_with(
            Arc::new(InMemoryGraphStore::new(None)),
            Arc::new(InMemoryMatrixStore::new()),
            true,
        );
        assert!(empty.ensure_default_loaded().await.err().unwrap().is_not_found());
    }

    #[tokio::test]
    async fn test_ensure_all_loaded() {
        let store = Arc::new(scenario_store());
        let mut second = store.resolve_configuration("cfg-1").await.unwrap().unwrap();
        second.id = "cfg-2".to_string();
        second.label = Some("copy".to_string());
        store.insert_configuration(second);

        let matrices = Arc::new(InMemoryMatrixStore::new());
        let loader = loader_with(store, Arc::clone(&matrices), true);
        assert_eq!(loader.ensure_all_loaded().await.unwrap(), 2);
        assert_eq!(loader.loaded_ids(), vec!["cfg-1".to_string(), "cfg-2".to_string()]);
        // Both configurations share every matrix.
        assert_eq!(matrices.len(), 3);
        assert!(loader.cache_stats().hits >= 3);
    }

    #[tokio::test]
    async fn test_unknown_ids_leave_no_lock_behind() {
        let loader = loader_with(
            Arc::new(scenario_store()),
            Arc::new(InMemoryMatrixStore::new()),
            true,
        );
        for i in 0..100 {
            let err = loader.get(format!("missing-{i}")).await.err().unwrap();
            assert!(err.is_not_found());
        }
        assert!(loader.locks.lock().is_empty());

        loader.get("cfg-1").await.unwrap();
        assert_eq!(loader.locks.lock().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_gets_build_once() {
        let matrices = Arc::new(InMemoryMatrixStore::new());
        let loader = Arc::new(loader_with(
            Arc::new(scenario_store()),
            Arc::clone(&matrices),
            true,
        ));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let loader = Arc::clone(&loader);
                tokio::spawn(async move { loader.get("cfg-1").await })
            })
            .collect();
        let mut engines = Vec::new();
        for handle in futures::future::join_all(handles).await {
            engines.push(assert_ok!(handle.unwrap()));
        }

        assert_eq!(matrices.writes(), 3);
        assert_eq!(loader.loaded_count(), 1);
        assert!(engines.iter().all(|e| Arc::ptr_eq(e, &engines[0])));
    }

    #[tokio::test]
    async fn test_len_and_ids_come_from_store() {
        let loader = loader_with(
            Arc::new(scenario_store()),
            Arc::new(InMemoryMatrixStore::new()),
            true,
        );
        assert_eq!(loader.len().await.unwrap(), 1);
        assert_eq!(loader.ids().await.unwrap(), vec!["cfg-1".to_string()]);
        assert!(loader.loaded_ids().is_empty());
    }

    #[tokio::test]
    async fn test_search_describes_datasets_missing_from_catalog() {
        let store = Arc::new(scenario_store());
        let loader = loader_with(Arc::clone(&store), Arc::new(InMemoryMatrixStore::new()), true);
        loader.get("cfg-1").await.unwrap();

        let dataset = |uri: &str, title: &str| Dataset {
            uri: uri.to_string(),
            title: Some(title.to_string()),
            description: None,
            landing_page: None,
        };
        store.insert_datasets(
            "ds-1",
            ts(900),
            vec![dataset("urn:D", "Dataset D"), dataset("urn:G", "Dataset G")],
        );
        store
            .insert_tagging(
                tagging_meta(GraphKind::Similarity, "sim-1", ts(900)),
                vec![entry("urn:D", "urn:A", 0.8), entry("urn:G", "urn:A", 0.8)],
            )
            .unwrap();

        let response = loader
            .search("cfg-1", &SearchRequest::new("hound"))
            .await
            .unwrap();
        let found = response
            .results
            .iter()
            .find(|r| r.dataset == "urn:G")
            .unwrap();
        assert_eq!(found.info.as_ref().unwrap().title, "Dataset G");
        assert!(!loader.get("cfg-1").await.unwrap().has_dataset("urn:G"));
    }

    #[test]
    fn test_selector_from_str() {
        assert_eq!(ConfigurationSelector::from("default"), ConfigurationSelector::Default);
        assert_eq!(
            ConfigurationSelector::from("cfg-1"),
            ConfigurationSelector::Id("cfg-1".to_string())
        );
    }
}
