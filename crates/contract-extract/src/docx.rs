//! DOCX text extraction: paragraphs of `word/document.xml` joined by newlines

use std::io::{Cursor, Read};

use quick_xml::{events::Event, Reader as XmlReader};
use zip::ZipArchive;

use crate::error::ExtractionError;

const DOCUMENT_XML: &str = "word/document.xml";

pub fn extract_docx_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ExtractionError::Docx(format!("not a DOCX archive: {}", e)))?;

    let mut document = archive
        .by_name(DOCUMENT_XML)
        .map_err(|_| ExtractionError::Docx(format!("missing {}", DOCUMENT_XML)))?;

    let mut xml = String::new();
    document
        .read_to_string(&mut xml)
        .map_err(|e| ExtractionError::Docx(format!("failed to read {}: {}", DOCUMENT_XML, e)))?;

    paragraphs_to_text(&xml)
}

fn paragraphs_to_text(xml: &str) -> Result<String, ExtractionError> {
    let mut reader = XmlReader::from_str(xml);
    let mut buf = Vec::new();
    let mut output = String::new();
    let mut in_text_node = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"w:p" => {
                    if !output.is_empty() {
                        output.push('\n');
                    }
                }
                b"w:tab" => output.push('\t'),
                b"w:br" => output.push('\n'),
                b"w:t" => in_text_node = true,
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"w:p" => {
                    if !output.is_empty() {
                        output.push('\n');
                    }
                }
                b"w:tab" => output.push('\t'),
                b"w:br" => output.push('\n'),
                _ => {}
            },
            Ok(Event::Text(e)) => {
                if in_text_node {
                    let value = e
                        .unescape()
                        .map_err(|err| ExtractionError::Docx(err.to_string()))?;
                    output.push_str(&value);
                }
            }
            Ok(Event::End(ref e)) => {
                if e.name().as_ref() == b"w:t" {
                    in_text_node = false;
                }
            }
            Ok(Event::Eof) => break,
            Err(err) => {
                return Err(ExtractionError::Docx(format!(
                    "failed to parse {}: {}",
                    DOCUMENT_XML, err
                )))
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(output.trim().to_string())
}
