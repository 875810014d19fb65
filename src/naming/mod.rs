//! Output file name suggestions.
//!
//! A [`NamingAssistant`] looks at the input file names and proposes a name
//! for the merged document. It is advisory: the merge never waits on it past
//! its timeout and never fails because of it.
//!
//! # Examples
//!
//! ```no_run
//! use pdfmerge::naming::{HeuristicNamer, suggest_with_timeout};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn example() {
//! let names = vec!["invoice-march.pdf".to_string(), "invoice-april.pdf".to_string()];
//! let name = suggest_with_timeout(Arc::new(HeuristicNamer), names, Duration::from_secs(2))
//!     .await
//!     .unwrap_or_else(|_| "merged-document.pdf".to_string());
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::utils::ensure_pdf_extension;

/// Longest file stem a suggestion may have.
pub const MAX_NAME_LEN: usize = 80;

/// Why no suggestion is available.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NamingError {
    /// The assistant had nothing useful to say.
    #[error("no name suggestion available")]
    NoSuggestion,

    /// The assistant failed.
    #[error("naming assistant failed: {0}")]
    Failed(String),

    /// The assistant did not answer in time.
    #[error("naming assistant timed out after {0:?}")]
    TimedOut(Duration),
}

/// Something that proposes a file name for the merged document.
pub trait NamingAssistant: Send + Sync {
    /// Suggest a file name, with or without extension, for a merge of
    /// `file_names` (in merge order).
    fn suggest_filename(&self, file_names: &[String]) -> Result<String, NamingError>;
}

/// Offline assistant: names the output after what the inputs have in common.
///
/// `invoice-march.pdf` + `invoice-april.pdf` becomes `invoice-merged`; a
/// single input `report.pdf` becomes `report-merged`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicNamer;

impl NamingAssistant for HeuristicNamer {
    fn suggest_filename(&self, file_names: &[String]) -> Result<String, NamingError> {
        let token_lists: Vec<Vec<&str>> = file_names
            .iter()
            .map(|name| tokens(file_stem(name)))
            .collect();

        let Some((first, rest)) = token_lists.split_first() else {
            return Err(NamingError::NoSuggestion);
        };

        let common = first
            .iter()
            .enumerate()
            .take_while(|(i, token)| {
                rest.iter()
                    .all(|other| other.get(*i).is_some_and(|t| t.eq_ignore_ascii_case(token)))
            })
            .count();

        if common == 0 {
            return Err(NamingError::NoSuggestion);
        }

        Ok(format!("{}-merged", first[..common].join("-")))
    }
}

fn file_stem(name: &str) -> &str {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    match base.rfind('.') {
        Some(dot) if dot > 0 => &base[..dot],
        _ => base,
    }
}

fn tokens(stem: &str) -> Vec<&str> {
    stem.split(|c: char| c == '-' || c == '_' || c == '.' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .collect()
}

/// Clean up a raw suggestion into a usable file stem.
///
/// Strips quotes, a trailing `.pdf`, path separators, characters that are
/// invalid in file names and control characters, collapses whitespace and
/// caps the length. Returns `None` when nothing usable is left.
pub fn sanitize_suggestion(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_matches(|c| c == '"' || c == '\'' || c == '`');
    let split = trimmed.len().saturating_sub(4);
    let without_ext = match (trimmed.get(..split), trimmed.get(split..)) {
        (Some(stem), Some(ext)) if ext.eq_ignore_ascii_case(".pdf") => stem,
        _ => trimmed,
    };

    let cleaned: String = without_ext
        .chars()
        .filter(|c| !c.is_control())
        .filter(|c| !matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|'))
        .collect();
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");

    let capped: String = collapsed.chars().take(MAX_NAME_LEN).collect();
    let result = capped.trim().trim_matches('.').trim().to_string();

    (!result.is_empty()).then_some(result)
}

/// Ask `assistant` for a name, giving up after `timeout`.
///
/// The assistant runs on the blocking thread pool. On success the returned
/// name is sanitized and ends in `.pdf`.
pub async fn suggest_with_timeout(
    assistant: Arc<dyn NamingAssistant>,
    file_names: Vec<String>,
    timeout: Duration,
) -> Result<String, NamingError> {
    let task = tokio::task::spawn_blocking(move || assistant.suggest_filename(&file_names));

    let raw = match tokio::time::timeout(timeout, task).await {
        Ok(Ok(result)) => result?,
        Ok(Err(join_err)) => return Err(NamingError::Failed(join_err.to_string())),
        Err(_) => return Err(NamingError::TimedOut(timeout)),
    };

    let name = sanitize_suggestion(&raw).ok_or(NamingError::NoSuggestion)?;
    debug!(suggestion = %name, "naming assistant answered");
    Ok(ensure_pdf_extension(&name))
}
