//! Loading text resources and parsing command-line request syntax.

use std::fs;
use std::path::Path;

use lex_nbest::converter::{
    ContentFilter, ModeError, NoFilter, SegmentType, Segments, SuppressionList,
};
use lex_nbest::dict::{parse_role_table, ConnectionMatrix, DictError, TrieDictionary};

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}: {source}")]
    Dict {
        path: String,
        #[source]
        source: DictError,
    },
    #[error(transparent)]
    Mode(#[from] ModeError),
    #[error("invalid segment syntax: {0}")]
    Segments(String),
    #[error("invalid function-word range {0:?} (expected MIN:MAX)")]
    FwRange(String),
}

/// Dictionary, connection matrix and content filter loaded from text files.
pub struct Resources {
    pub dict: TrieDictionary,
    pub conn: ConnectionMatrix,
    pub filter: Box<dyn ContentFilter>,
}

fn read(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn dict_err(path: &Path) -> impl FnOnce(DictError) -> CliError + '_ {
    move |source| CliError::Dict {
        path: path.display().to_string(),
        source,
    }
}

pub fn load_conn(
    conn_file: &Path,
    roles_file: Option<&Path>,
    fw_range: Option<(u16, u16)>,
) -> Result<ConnectionMatrix, CliError> {
    let text = read(conn_file)?;
    let roles = match roles_file {
        Some(path) => parse_role_table(&read(path)?).map_err(dict_err(path))?,
        None => Vec::new(),
    };
    let (fw_min, fw_max) = fw_range.unwrap_or((0, 0));
    ConnectionMatrix::from_text_with_roles(&text, fw_min, fw_max, roles).map_err(dict_err(conn_file))
}

/// A suppression list read from `suppress_file`, or a filter that accepts
/// everything.
pub fn load_filter(suppress_file: Option<&Path>) -> Result<Box<dyn ContentFilter>, CliError> {
    match suppress_file {
        Some(path) => Ok(Box::new(SuppressionList::from_text(&read(path)?))),
        None => Ok(Box::new(NoFilter)),
    }
}

pub fn load_resources(
    dict_file: &Path,
    conn_file: &Path,
    roles_file: Option<&Path>,
    fw_range: Option<(u16, u16)>,
    suppress_file: Option<&Path>,
) -> Result<Resources, CliError> {
    let dict = TrieDictionary::from_text(&read(dict_file)?).map_err(dict_err(dict_file))?;
    let conn = load_conn(conn_file, roles_file, fw_range)?;
    let filter = load_filter(suppress_file)?;
    Ok(Resources { dict, conn, filter })
}

/// Parse `MIN:MAX`.
pub fn parse_fw_range(s: &str) -> Result<(u16, u16), CliError> {
    let err = || CliError::FwRange(s.to_string());
    let (min, max) = s.split_once(':').ok_or_else(err)?;
    let min: u16 = min.trim().parse().map_err(|_| err())?;
    let max: u16 = max.trim().parse().map_err(|_| err())?;
    if min > max {
        return Err(err());
    }
    Ok((min, max))
}

/// Parse a reading with committed boundaries.
///
/// `[...]` marks a segment whose boundaries are fixed; text outside
/// brackets forms free segments. `[しんこう]する` is a fixed-boundary
/// `しんこう` followed by a free `する`.
pub fn parse_segments(input: &str) -> Result<Segments, CliError> {
    let mut parts: Vec<(String, SegmentType)> = Vec::new();
    let mut free = String::new();
    let mut chars = input.chars();

    while let Some(ch) = chars.next() {
        match ch {
            '[' => {
                if !free.is_empty() {
                    parts.push((std::mem::take(&mut free), SegmentType::Free));
                }
                let mut fixed = String::new();
                loop {
                    match chars.next() {
                        Some(']') => break,
                        Some('[') => return Err(CliError::Segments("nested '['".to_string())),
                        Some(c) => fixed.push(c),
                        None => return Err(CliError::Segments("unclosed '['".to_string())),
                    }
                }
                if fixed.is_empty() {
                    return Err(CliError::Segments("empty '[]'".to_string()));
                }
                parts.push((fixed, SegmentType::FixedBoundary));
            }
            ']' => return Err(CliError::Segments("unmatched ']'".to_string())),
            c => free.push(c),
        }
    }
    if !free.is_empty() {
        parts.push((free, SegmentType::Free));
    }

    let borrowed: Vec<(&str, SegmentType)> =
        parts.iter().map(|(k, t)| (k.as_str(), *t)).collect();
    Ok(Segments::from_keys(&borrowed))
}
