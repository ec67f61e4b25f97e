//! IeXML (CALBC) to standoff conversion
//!
//! IeXML wraps PubMed abstracts in `<PubmedArticle>` elements whose title
//! and abstract hold `<document>` subtrees of `<s>` sentences with inline
//! `<e ct="...">` entity markup. Conversion flattens each article to
//! plain text and records the character offsets of every entity, writing
//! one `<PMID>.txt`/`<PMID>.ann` pair per article.
//!
//! Articles that fail to parse or have no abstract text are skipped with
//! an error log, so the output may hold fewer articles than the input.

use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{error, info};

use bioprep_core::{PrepError, Result};

use crate::StandoffAnnotation;

/// Element that delimits articles inside an IeXML file
const ARTICLE_DELIMITER: &str = "<PubmedArticle>";

/// Summary of a conversion run
#[derive(Debug, Clone)]
pub struct ConvertReport {
    /// Articles successfully written as `.txt`/`.ann` pairs
    pub written: usize,

    /// Articles skipped because of parse failures or missing abstracts
    pub skipped: usize,
}

/// An entity span in the flattened article text (char offsets)
#[derive(Debug)]
struct Span {
    label: String,
    start: usize,
    end: usize,
}

#[derive(Debug)]
struct Article {
    pmid: String,
    text: String,
    spans: Vec<Span>,
}

/// Convert the IeXML corpus at `input` to standoff format in `output_dir`
///
/// Mentions annotated with two types at once (`ct="diso|prge"`) are
/// resolved by choosing one at random; the `seed` makes that choice, and
/// therefore the whole conversion, reproducible.
pub fn convert_corpus(input: &Path, output_dir: &Path, seed: u64) -> Result<ConvertReport> {
    let content = std::fs::read_to_string(input).map_err(|e| PrepError::io(input, e))?;
    std::fs::create_dir_all(output_dir).map_err(|e| PrepError::io(output_dir, e))?;

    let mut rng = StdRng::seed_from_u64(seed);
    let mut report = ConvertReport {
        written: 0,
        skipped: 0,
    };

    // the corpus is one large file; split it into articles rather than
    // parsing gigabytes of XML as a single tree
    for chunk in content.split(ARTICLE_DELIMITER).skip(1) {
        let xml = format!("{ARTICLE_DELIMITER}{chunk}");
        match convert_article(&xml, &mut rng) {
            Ok(article) => {
                write_article(&article, output_dir)?;
                report.written += 1;
            }
            Err(err) => {
                error!(%err, "skipping article");
                report.skipped += 1;
            }
        }
    }

    info!(
        written = report.written,
        skipped = report.skipped,
        "converted corpus"
    );
    Ok(report)
}

/// Resolve the `ct` attribute of an `<e>` element to an entity label
fn entity_label(element: &BytesStart<'_>, rng: &mut StdRng) -> Result<String> {
    let attr = element
        .try_get_attribute("ct")
        .map_err(|e| PrepError::Xml(e.to_string()))?
        .ok_or_else(|| PrepError::Xml("<e> element without ct attribute".to_string()))?;
    let value = attr
        .unescape_value()
        .map_err(|e| PrepError::Xml(e.to_string()))?
        .to_uppercase();

    let parts: Vec<&str> = value.split('|').collect();
    let label = if parts.len() > 1 {
        parts.choose(rng).copied().unwrap_or(parts[0])
    } else {
        parts[0]
    };
    Ok(label.to_string())
}

/// Flatten one `<PubmedArticle>` into text plus entity spans
///
/// Text is captured from the `<document>` subtrees under `ArticleTitle`
/// and `AbstractText`, in document order, with a space at every sentence
/// boundary. Offsets are character positions into the final (trimmed)
/// text.
fn convert_article(xml: &str, rng: &mut StdRng) -> Result<Article> {
    let mut reader = Reader::from_str(xml);

    let mut pmid = String::new();
    let mut in_pmid = false;
    let mut in_title = false;
    let mut in_abstract = false;
    let mut capturing = false;
    let mut saw_abstract_document = false;

    let mut text = String::new();
    let mut char_len = 0usize;
    let mut open_entities: Vec<(usize, String)> = Vec::new();
    let mut spans: Vec<Span> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                // only the citation PMID; later elements may repeat the tag
                b"PMID" if pmid.is_empty() => in_pmid = true,
                b"ArticleTitle" => in_title = true,
                b"AbstractText" => in_abstract = true,
                b"document" if in_title || in_abstract => {
                    capturing = true;
                    if in_abstract {
                        saw_abstract_document = true;
                    }
                }
                b"e" if capturing => {
                    let label = entity_label(&e, rng)?;
                    open_entities.push((char_len, label));
                }
                _ => {}
            },
            Ok(Event::Empty(e)) => {
                if e.name().as_ref() == b"e" && capturing {
                    let label = entity_label(&e, rng)?;
                    spans.push(Span {
                        label,
                        start: char_len,
                        end: char_len,
                    });
                }
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"PMID" => in_pmid = false,
                b"ArticleTitle" => in_title = false,
                b"AbstractText" => in_abstract = false,
                b"document" => capturing = false,
                b"s" if capturing => {
                    text.push(' ');
                    char_len += 1;
                }
                b"e" if capturing => {
                    let (start, label) = open_entities
                        .pop()
                        .ok_or_else(|| PrepError::Xml("unmatched </e>".to_string()))?;
                    spans.push(Span {
                        label,
                        start,
                        end: char_len,
                    });
                }
                b"PubmedArticle" => break,
                _ => {}
            },
            Ok(Event::Text(t)) => {
                let value = t.unescape().map_err(|e| PrepError::Xml(e.to_string()))?;
                if in_pmid {
                    pmid.push_str(value.trim());
                } else if capturing {
                    char_len += value.chars().count();
                    text.push_str(&value);
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(PrepError::Xml(e.to_string())),
        }
    }

    if pmid.is_empty() {
        return Err(PrepError::Xml("article has no PMID".to_string()));
    }
    if !saw_abstract_document {
        return Err(PrepError::Xml(format!(
            "article {pmid}: no abstract text"
        )));
    }
    if !open_entities.is_empty() {
        return Err(PrepError::Xml(format!(
            "article {pmid}: unclosed <e> element"
        )));
    }

    // trim surrounding whitespace, shifting offsets along
    let leading = text.chars().take_while(|c| c.is_whitespace()).count();
    let trimmed = text.trim().to_string();
    for span in &mut spans {
        span.start = span.start.saturating_sub(leading);
        span.end = span.end.saturating_sub(leading);
    }

    Ok(Article {
        pmid,
        text: trimmed,
        spans,
    })
}

/// Write one article as a `<PMID>.txt`/`<PMID>.ann` pair
fn write_article(article: &Article, output_dir: &Path) -> Result<()> {
    let txt_path = output_dir.join(format!("{}.{}", article.pmid, crate::TEXT_EXTENSION));
    std::fs::write(&txt_path, &article.text).map_err(|e| PrepError::io(&txt_path, e))?;

    let mut ann_content = String::new();
    for (i, span) in article.spans.iter().enumerate() {
        let ann = StandoffAnnotation {
            id: (i + 1) as u32,
            label: span.label.clone(),
            start: span.start,
            end: span.end,
            text: article
                .text
                .chars()
                .skip(span.start)
                .take(span.end - span.start)
                .collect(),
        };
        ann_content.push_str(&ann.to_string());
        ann_content.push('\n');
    }

    let ann_path = output_dir.join(format!("{}.{}", article.pmid, crate::ANN_EXTENSION));
    std::fs::write(&ann_path, ann_content).map_err(|e| PrepError::io(&ann_path, e))?;
    Ok(())
}
