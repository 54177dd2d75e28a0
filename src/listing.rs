//! Candidate identifier listing
//!
//! Lists the resources of one edition worth indexing: those with an
//! `rdfs:comment`, minus disambiguation pages. Primary-edition resources
//! already reachable through `owl:sameAs` from a secondary-edition resource
//! are left out, since the secondary document merges them in.

use std::path::Path;
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::error::{Result, RetrieverError};
use crate::sparql::TripleStore;
use crate::uri::{EditionRole, Editions};
use crate::vocab::{owl, rdfs};

/// Graph pattern selecting the candidate resources `?s` of an edition
pub fn candidate_pattern(editions: &Editions, role: EditionRole) -> String {
    let edition = editions.get(role);
    let mut pattern = format!(
        "?s <{comment}> ?o . \
         FILTER(STRSTARTS(STR(?s), \"{prefix}\") && STRLEN(STR(?s)) > {min_len} \
         && !CONTAINS(STR(?s), \"{marker}\"))",
        comment = rdfs::COMMENT,
        prefix = edition.resource_prefix,
        min_len = edition.resource_prefix.len() + 1,
        marker = edition.disambiguation_marker.replace(' ', "_"),
    );
    if role == EditionRole::Primary {
        pattern.push_str(&format!(
            " MINUS {{ ?t <{same_as}> ?s . ?t <{comment}> ?q . \
             FILTER(STRSTARTS(STR(?t), \"{secondary}\")) }}",
            same_as = owl::SAME_AS,
            comment = rdfs::COMMENT,
            secondary = editions.secondary.resource_prefix,
        ));
    }
    pattern
}

/// Count the candidates of an edition, then page through them and append
/// one identifier per line to `output`. Returns the number written.
pub async fn list_uris(
    store: &dyn TripleStore,
    editions: &Editions,
    role: EditionRole,
    page_size: usize,
    output: &Path,
) -> Result<usize> {
    let pattern = candidate_pattern(editions, role);
    let page_size = page_size.max(1);

    let count_query = format!("SELECT (COUNT(DISTINCT ?s) AS ?count) WHERE {{ {pattern} }}");
    let rows = store.select(&count_query).await?;
    let count: usize = match rows.first().and_then(|row| row.get("count")) {
        Some(term) => term.value().trim().parse().map_err(|_| {
            RetrieverError::Parse(format!("non-numeric count '{}'", term.value()))
        })?,
        None => 0,
    };
    info!(edition = %editions.get(role).lang, count, "candidate resources");

    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(output)
        .await?;

    let mut written = 0;
    let mut offset = 0;
    while offset < count {
        info!(offset, "retrieving page");
        let query = format!(
            "SELECT DISTINCT ?s WHERE {{ {pattern} }} LIMIT {page_size} OFFSET {offset}"
        );
        let rows = store.select(&query).await?;

        let mut page = String::new();
        for term in rows.iter().filter_map(|row| row.get("s")) {
            page.push_str(term.value());
            page.push('\n');
            written += 1;
        }
        file.write_all(page.as_bytes()).await?;
        info!(rows = rows.len(), "saved page");

        offset += page_size;
    }
    file.flush().await?;

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secondary_pattern() {
        let pattern = candidate_pattern(&Editions::default(), EditionRole::Secondary);
        assert!(pattern.contains("STRSTARTS(STR(?s), \"http://nl.dbpedia.org/resource/\")"));
        assert!(pattern.contains("!CONTAINS(STR(?s), \"(doorverwijspagina)\")"));
        assert!(!pattern.contains("MINUS"));
    }

    #[test]
    fn test_primary_pattern_excludes_linked() {
        let pattern = candidate_pattern(&Editions::default(), EditionRole::Primary);
        assert!(pattern.contains("(disambiguation)"));
        assert!(pattern.contains("MINUS"));
        assert!(pattern.contains("STRSTARTS(STR(?t), \"http://nl.dbpedia.org/resource/\")"));
    }
}
