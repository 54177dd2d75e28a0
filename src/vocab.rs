//! Predicate vocabulary
//!
//! Full IRIs of the RDF properties read from DBpedia, plus the synthetic
//! slot names the retriever adds to a raw record.

pub mod rdf {
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
}

pub mod rdfs {
    pub const LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";
    pub const COMMENT: &str = "http://www.w3.org/2000/01/rdf-schema#comment";
}

pub mod owl {
    pub const SAME_AS: &str = "http://www.w3.org/2002/07/owl#sameAs";
}

pub mod foaf {
    pub const NAME: &str = "http://xmlns.com/foaf/0.1/name";
}

pub mod dbo {
    pub const NAMESPACE: &str = "http://dbpedia.org/ontology/";
    pub const ABSTRACT: &str = "http://dbpedia.org/ontology/abstract";
    pub const BIRTH_DATE: &str = "http://dbpedia.org/ontology/birthDate";
    pub const DEATH_DATE: &str = "http://dbpedia.org/ontology/deathDate";
    pub const BIRTH_PLACE: &str = "http://dbpedia.org/ontology/birthPlace";
    pub const DEATH_PLACE: &str = "http://dbpedia.org/ontology/deathPlace";
    pub const WIKI_PAGE_WIKI_LINK: &str = "http://dbpedia.org/ontology/wikiPageWikiLink";
    pub const WIKI_PAGE_REDIRECTS: &str = "http://dbpedia.org/ontology/wikiPageRedirects";
    pub const WIKI_PAGE_DISAMBIGUATES: &str = "http://dbpedia.org/ontology/wikiPageDisambiguates";
}

pub mod dbp {
    pub const NAME: &str = "http://dbpedia.org/property/name";
    pub const BIRTH_NAME: &str = "http://dbpedia.org/property/birthName";
    pub const NL_NAAM: &str = "http://nl.dbpedia.org/property/naam";
}

pub mod schema {
    pub const NAMESPACE: &str = "http://schema.org/";
}

pub mod wikidata {
    pub const ENTITY_PREFIX: &str = "http://www.wikidata.org/entity/";
}

/// Synthetic slots added by the retriever
pub mod slot {
    /// Collapsed abstract/comment values
    pub const ABSTRACT: &str = "abstract";
    /// Collapsed name-like values
    pub const NAME: &str = "name";
    /// Identifiers that redirect to the subject
    pub const REDIRECTS: &str = "redirects";
    /// Identifiers the subject disambiguates to
    pub const DISAMBIGUATES: &str = "disambiguates";
    /// Single-element count of identifiers linking to the subject
    pub const INLINKS: &str = "inlinks";
}

/// Synonymous predicates, in priority order, collapsed onto one slot
pub const COLLAPSED_SLOTS: &[(&str, &[&str])] = &[
    (slot::ABSTRACT, &[dbo::ABSTRACT, rdfs::COMMENT]),
    (
        slot::NAME,
        &[foaf::NAME, dbp::NAME, dbp::NL_NAAM, dbp::BIRTH_NAME],
    ),
];

/// Object URI patterns kept by the retriever besides literals: both DBpedia
/// editions, schema.org and Wikidata.
pub const DEFAULT_ALLOWED_OBJECT_PATTERNS: &[&str] =
    &["//dbpedia.org", "//nl.dbpedia.org", "schema.org", "wikidata.org"];
