//! In-memory fakes of the indexer's external services

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use dbpedia_indexer::builder::DocumentBuilder;
use dbpedia_indexer::error::{
    AuxiliaryServiceError, IndexerError, NotFoundError, RetrieverError, WriteError,
};
use dbpedia_indexer::merger::CrossLingualMerger;
use dbpedia_indexer::retriever::FactRetriever;
use dbpedia_indexer::services::{AliasService, TopicScores, TopicService, VectorService};
use dbpedia_indexer::solr::DocumentIndex;
use dbpedia_indexer::sparql::{RdfTerm, Solution, TripleStore};
use dbpedia_indexer::uri::Editions;
use dbpedia_indexer::vocab::{dbo, DEFAULT_ALLOWED_OBJECT_PATTERNS};
use dbpedia_indexer::{Document, Pipeline};

pub const ADA_EN: &str = "http://dbpedia.org/resource/Ada_Lovelace";
pub const ADA_NL: &str = "http://nl.dbpedia.org/resource/Ada_Lovelace";

/// Triple store answering the retriever's queries from fixed facts
#[derive(Default)]
pub struct FakeStore {
    facts: HashMap<String, Vec<(String, RdfTerm)>>,
    redirects: HashMap<String, Vec<String>>,
    inlinks: HashMap<String, u64>,
    /// Remaining transport failures per subject
    failures: Mutex<HashMap<String, usize>>,
    pub queries: AtomicUsize,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn literal(mut self, subject: &str, predicate: &str, value: &str) -> Self {
        self.facts
            .entry(subject.to_string())
            .or_default()
            .push((predicate.to_string(), RdfTerm::literal(value)));
        self
    }

    pub fn link(mut self, subject: &str, predicate: &str, object: &str) -> Self {
        self.facts
            .entry(subject.to_string())
            .or_default()
            .push((predicate.to_string(), RdfTerm::Iri(object.to_string())));
        self
    }

    pub fn redirect(mut self, from: &str, to: &str) -> Self {
        self.redirects
            .entry(to.to_string())
            .or_default()
            .push(from.to_string());
        self
    }

    pub fn inlinks(mut self, subject: &str, count: u64) -> Self {
        self.inlinks.insert(subject.to_string(), count);
        self
    }

    pub fn failing(self, subject: &str, times: usize) -> Self {
        self.failures
            .lock()
            .unwrap()
            .insert(subject.to_string(), times);
        self
    }

    pub fn into_arc(self) -> Arc<dyn TripleStore> {
        Arc::new(self)
    }
}

fn iris(query: &str) -> Vec<&str> {
    query
        .split('<')
        .skip(1)
        .filter_map(|part| part.split('>').next())
        .collect()
}

fn row(pairs: &[(&str, RdfTerm)]) -> Solution {
    pairs
        .iter()
        .map(|(name, term)| (name.to_string(), term.clone()))
        .collect()
}

#[async_trait]
impl TripleStore for FakeStore {
    async fn select(&self, query: &str) -> Result<Vec<Solution>, RetrieverError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        let iris = iris(query);
        let first = iris.first().copied().unwrap_or_default();
        let last = iris.last().copied().unwrap_or_default();

        if let Some(remaining) = self.failures.lock().unwrap().get_mut(first) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(RetrieverError::Transport("connection reset".to_string()));
            }
        }

        if query.contains("COUNT(DISTINCT ?s)") && query.contains(dbo::WIKI_PAGE_WIKI_LINK) {
            let count = self.inlinks.get(last).copied().unwrap_or(0);
            return Ok(vec![row(&[("count", RdfTerm::literal(count.to_string()))])]);
        }
        if query.contains(dbo::WIKI_PAGE_REDIRECTS) {
            return Ok(self
                .redirects
                .get(last)
                .into_iter()
                .flatten()
                .map(|from| row(&[("s", RdfTerm::Iri(from.clone()))]))
                .collect());
        }
        if query.contains(dbo::WIKI_PAGE_DISAMBIGUATES) {
            return Ok(self
                .facts
                .get(first)
                .into_iter()
                .flatten()
                .filter(|(p, _)| p == dbo::WIKI_PAGE_DISAMBIGUATES)
                .map(|(_, o)| row(&[("o", o.clone())]))
                .collect());
        }
        Ok(self
            .facts
            .get(first)
            .into_iter()
            .flatten()
            .map(|(p, o)| row(&[("p", RdfTerm::Iri(p.clone())), ("o", o.clone())]))
            .collect())
    }
}

/// Document index backed by a map
#[derive(Default)]
pub struct FakeIndex {
    pub docs: Mutex<BTreeMap<String, Document>>,
    pub commits: AtomicUsize,
    pub deleted: Mutex<Vec<String>>,
    /// Ids whose writes are rejected with a non-zero Solr status
    pub rejected: Vec<String>,
}

impl FakeIndex {
    pub fn with_docs(docs: impl IntoIterator<Item = Document>) -> Self {
        let index = Self::default();
        {
            let mut stored = index.docs.lock().unwrap();
            for doc in docs {
                let id = doc.id().unwrap_or_default().to_string();
                stored.insert(id, doc);
            }
        }
        index
    }

    pub fn doc(&self, id: &str) -> Option<Document> {
        self.docs.lock().unwrap().get(id).cloned()
    }

    pub fn commit_count(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentIndex for FakeIndex {
    async fn get_document(&self, id: &str) -> Result<Document, IndexerError> {
        self.doc(id).ok_or_else(|| NotFoundError { id: id.to_string() }.into())
    }

    async fn add_document(&self, doc: &Document) -> Result<(), WriteError> {
        let id = doc.id().unwrap_or_default().to_string();
        if self.rejected.contains(&id) {
            return Err(WriteError::Status {
                status: 400,
                body: "ERROR: [doc=...] unknown field".to_string(),
            });
        }
        self.docs.lock().unwrap().insert(id, doc.clone());
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), WriteError> {
        self.docs.lock().unwrap().remove(id);
        self.deleted.lock().unwrap().push(id.to_string());
        Ok(())
    }

    async fn commit(&self) -> Result<(), WriteError> {
        self.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub struct FakeTopics {
    pub scores: Option<TopicScores>,
}

#[async_trait]
impl TopicService for FakeTopics {
    async fn scores(&self, _identifier: &str) -> Result<TopicScores, AuxiliaryServiceError> {
        self.scores
            .clone()
            .ok_or_else(|| AuxiliaryServiceError::new("topics", "HTTP 500"))
    }
}

pub struct FakeAliases {
    pub aliases: HashMap<String, Vec<String>>,
}

#[async_trait]
impl AliasService for FakeAliases {
    async fn aliases(&self, wikidata_id: &str) -> Result<Vec<String>, AuxiliaryServiceError> {
        Ok(self.aliases.get(wikidata_id).cloned().unwrap_or_default())
    }
}

/// Vector service returning one fixed vector per requested token
pub struct FakeVectors {
    pub requests: Mutex<Vec<String>>,
}

impl FakeVectors {
    pub fn new() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl VectorService for FakeVectors {
    async fn vectors(&self, source: &str) -> Result<Vec<Vec<f64>>, AuxiliaryServiceError> {
        self.requests.lock().unwrap().push(source.to_string());
        Ok(source
            .split_whitespace()
            .enumerate()
            .map(|(i, _)| vec![i as f64 + 0.12345, -1.0])
            .collect())
    }
}

pub fn retriever(store: Arc<dyn TripleStore>) -> FactRetriever {
    let patterns: Vec<String> = DEFAULT_ALLOWED_OBJECT_PATTERNS
        .iter()
        .map(|p| p.to_string())
        .collect();
    FactRetriever::new(store, &patterns)
}

pub fn pipeline(store: Arc<dyn TripleStore>, builder: DocumentBuilder) -> Pipeline {
    let merger = CrossLingualMerger::new(retriever(store), Editions::default());
    Pipeline::new(merger, builder)
}

pub fn plain_pipeline(store: FakeStore) -> Pipeline {
    pipeline(store.into_arc(), DocumentBuilder::new(Editions::default()))
}
