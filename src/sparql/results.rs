//! SPARQL result parsing
//!
//! Turns SPARQL Results JSON and XML into format-independent solution rows.
//! Only SELECT results are supported; an ASK or malformed payload is a
//! parse error.

use quick_xml::events::Event;
use quick_xml::Reader;
use serde_json::Value;

use super::{RdfTerm, Solution};
use crate::error::RetrieverError;

// ---------------------------------------------------------------------------
// SPARQL Results JSON
// ---------------------------------------------------------------------------

/// Parse a SPARQL Results JSON document.
pub fn parse_json_results(body: &str) -> Result<Vec<Solution>, RetrieverError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| RetrieverError::Parse(format!("invalid JSON: {e}")))?;

    let bindings = value
        .get("results")
        .and_then(|r| r.get("bindings"))
        .and_then(Value::as_array)
        .ok_or_else(|| RetrieverError::Parse("missing 'results.bindings'".to_string()))?;

    Ok(bindings
        .iter()
        .map(|binding| {
            let mut solution = Solution::new();
            if let Some(obj) = binding.as_object() {
                for (var_name, term_value) in obj {
                    if let Some(term) = parse_json_term(term_value) {
                        solution.insert(var_name.clone(), term);
                    }
                }
            }
            solution
        })
        .collect())
}

fn parse_json_term(value: &Value) -> Option<RdfTerm> {
    let obj = value.as_object()?;
    let term_type = obj.get("type")?.as_str()?;
    let val = obj.get("value")?.as_str()?;

    match term_type {
        "uri" => Some(RdfTerm::Iri(val.to_string())),
        "bnode" => Some(RdfTerm::BlankNode(val.to_string())),
        "literal" | "typed-literal" => Some(RdfTerm::Literal {
            value: val.to_string(),
            datatype: obj
                .get("datatype")
                .and_then(Value::as_str)
                .map(String::from),
            language: obj
                .get("xml:lang")
                .or_else(|| obj.get("lang"))
                .and_then(Value::as_str)
                .map(String::from),
        }),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// SPARQL Results XML
// ---------------------------------------------------------------------------

#[derive(Clone)]
enum TermKind {
    Uri,
    Bnode,
    Literal {
        datatype: Option<String>,
        language: Option<String>,
    },
}

/// Parse a SPARQL Results XML document.
pub fn parse_xml_results(body: &str) -> Result<Vec<Solution>, RetrieverError> {
    let mut reader = Reader::from_str(body);

    let mut solutions = Vec::new();
    let mut saw_results = false;
    let mut current_solution: Option<Solution> = None;
    let mut current_binding: Option<String> = None;
    let mut current_term: Option<TermKind> = None;
    let mut text_buf = String::new();

    loop {
        let event = reader.read_event();
        match event {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                let self_closing = matches!(event, Ok(Event::Empty(_)));
                match e.local_name().as_ref() {
                    b"results" => saw_results = true,
                    b"result" => {
                        if self_closing {
                            solutions.push(Solution::new());
                        } else {
                            current_solution = Some(Solution::new());
                        }
                    }
                    b"binding" => {
                        current_binding = e
                            .attributes()
                            .flatten()
                            .find(|attr| attr.key.local_name().as_ref() == b"name")
                            .map(|attr| String::from_utf8_lossy(&attr.value).to_string());
                    }
                    b"uri" => current_term = Some(TermKind::Uri),
                    b"bnode" => current_term = Some(TermKind::Bnode),
                    b"literal" => {
                        let mut datatype = None;
                        let mut language = None;
                        for attr in e.attributes().flatten() {
                            let value = String::from_utf8_lossy(&attr.value).to_string();
                            match attr.key.local_name().as_ref() {
                                b"datatype" => datatype = Some(value),
                                b"lang" => language = Some(value),
                                _ => {}
                            }
                        }
                        current_term = Some(TermKind::Literal { datatype, language });
                    }
                    _ => {}
                }
                if current_term.is_some() {
                    text_buf.clear();
                    // <literal/> carries an empty value
                    if self_closing {
                        finish_term(
                            &mut current_term,
                            &current_binding,
                            &mut current_solution,
                            &text_buf,
                        );
                    }
                }
            }
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"result" => {
                    if let Some(solution) = current_solution.take() {
                        solutions.push(solution);
                    }
                }
                b"binding" => current_binding = None,
                b"uri" | b"bnode" | b"literal" => finish_term(
                    &mut current_term,
                    &current_binding,
                    &mut current_solution,
                    &text_buf,
                ),
                _ => {}
            },
            Ok(Event::Text(ref e)) => {
                if current_term.is_some() {
                    let text = e
                        .unescape()
                        .map_err(|err| RetrieverError::Parse(format!("bad XML text: {err}")))?;
                    text_buf.push_str(&text);
                }
            }
            Ok(Event::CData(ref e)) => {
                if current_term.is_some() {
                    text_buf.push_str(&String::from_utf8_lossy(e));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(RetrieverError::Parse(format!("XML parse error: {e}"))),
            _ => {}
        }
    }

    if !saw_results {
        return Err(RetrieverError::Parse("missing <results> element".to_string()));
    }
    Ok(solutions)
}

fn finish_term(
    current_term: &mut Option<TermKind>,
    current_binding: &Option<String>,
    current_solution: &mut Option<Solution>,
    text: &str,
) {
    let Some(kind) = current_term.take() else {
        return;
    };
    let (Some(name), Some(solution)) = (current_binding, current_solution.as_mut()) else {
        return;
    };
    let term = match kind {
        TermKind::Uri => RdfTerm::Iri(text.to_string()),
        TermKind::Bnode => RdfTerm::BlankNode(text.to_string()),
        TermKind::Literal { datatype, language } => RdfTerm::Literal {
            value: text.to_string(),
            datatype,
            language,
        },
    };
    solution.insert(name.clone(), term);
}
