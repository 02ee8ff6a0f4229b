//! Output formatting for CLI commands.

use std::io::Write;

use serde::Serialize;

use crate::cli::args::{NavScoreArgs, OutputFormat};
use crate::content::CatalogEntry;
use crate::error::Result;
use crate::hybrid::RecommendationResult;

/// Catalog listing.
#[derive(Debug, Serialize)]
pub struct CatalogListing {
    pub source: String,
    pub destinations: Vec<CatalogEntry>,
}

/// Rendering for the human output format.
pub trait HumanOutput {
    fn write_human(&self, out: &mut dyn Write, verbosity: u8) -> Result<()>;
}

impl HumanOutput for RecommendationResult {
    fn write_human(&self, out: &mut dyn Write, verbosity: u8) -> Result<()> {
        writeln!(
            out,
            "Algorithm: {} (confidence {:.2})",
            self.algorithm, self.confidence
        )?;

        if self.suggestions.is_empty() {
            writeln!(out, "No suggestions.")?;
        }
        for (rank, suggestion) in self.suggestions.iter().enumerate() {
            let title = suggestion.destination.title.as_deref().unwrap_or("");
            writeln!(
                out,
                "{:>3}. {:<24} {:<20} {:.4}",
                rank + 1,
                suggestion.path(),
                title,
                suggestion.score
            )?;
            if verbosity > 1 && !suggestion.reasoning.factors.is_empty() {
                writeln!(out, "       {}", suggestion.reasoning.factors.join(", "))?;
            }
        }

        if verbosity > 0 {
            writeln!(out)?;
            for explanation in &self.explanations {
                writeln!(out, "{explanation}")?;
            }
        }
        if verbosity > 1 {
            let meta = &self.metadata;
            writeln!(
                out,
                "history {} / candidates {} / neighbours {} / {} ms / model {}",
                meta.input_size,
                meta.candidate_count,
                meta.neighbor_count,
                meta.processing_time_ms,
                meta.model_version
            )?;
        }
        Ok(())
    }
}

impl HumanOutput for CatalogListing {
    fn write_human(&self, out: &mut dyn Write, verbosity: u8) -> Result<()> {
        if verbosity > 0 {
            writeln!(
                out,
                "{} destinations from {}",
                self.destinations.len(),
                self.source
            )?;
        }
        for entry in &self.destinations {
            let features = &entry.features;
            writeln!(
                out,
                "{:<24} {:<20} {:<16} {:?}",
                entry.path, entry.title, features.category, features.complexity
            )?;
            if verbosity > 1 {
                let data_types: Vec<&str> = features.data_types.iter().map(String::as_str).collect();
                writeln!(
                    out,
                    "    {} | {}",
                    features.business_function,
                    data_types.join(", ")
                )?;
            }
        }
        Ok(())
    }
}

/// Write a result to stdout in the selected format.
pub fn output_result<T: Serialize + HumanOutput>(result: &T, args: &NavScoreArgs) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_result(&mut out, result, args)
}

/// Write a result to `out` in the selected format.
pub fn write_result<T: Serialize + HumanOutput>(
    out: &mut dyn Write,
    result: &T,
    args: &NavScoreArgs,
) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => result.write_human(out, args.verbosity()),
        OutputFormat::Json => {
            let json = if args.pretty {
                serde_json::to_string_pretty(result)?
            } else {
                serde_json::to_string(result)?
            };
            writeln!(out, "{json}")?;
            Ok(())
        }
    }
}
