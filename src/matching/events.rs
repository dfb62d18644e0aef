//! Per-record diagnostics emitted by the matcher.
//!
//! The matcher never logs directly. It reports each outcome to a
//! [`MatchEventSink`], so callers decide where diagnostics go: the CLI uses
//! [`TracingSink`], tests collect events in a `Vec<MatchEvent>`.

use std::collections::HashSet;

use tracing::{debug, trace, warn};

/// What happened to one target record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchEvent {
    /// The record's identifier was replaced
    Annotated {
        chrom: String,
        position: u64,
        id: String,
    },
    /// The reference had no qualifying record at this position
    NoCandidate {
        chrom: String,
        query_chrom: String,
        position: u64,
    },
    /// The first qualifying reference record has no identifier
    MissingIdentifier { chrom: String, position: u64 },
    /// The reference index has no data for `query_chrom`
    UnknownContig {
        chrom: String,
        query_chrom: String,
        position: u64,
    },
}

/// Destination for [`MatchEvent`]s
pub trait MatchEventSink {
    /// Called once, before any record, with the reference's declared contigs
    fn reference_contigs(&mut self, _contigs: &[String]) {}

    fn emit(&mut self, event: &MatchEvent);
}

impl MatchEventSink for Vec<MatchEvent> {
    fn emit(&mut self, event: &MatchEvent) {
        self.push(event.clone());
    }
}

/// Logs events through `tracing`.
///
/// Unknown contigs are warnings; the first time a contig is reported the
/// reference's available contigs are listed at debug level.
#[derive(Debug, Default)]
pub struct TracingSink {
    reference_contigs: Vec<String>,
    reported_contigs: HashSet<String>,
}

impl MatchEventSink for TracingSink {
    fn reference_contigs(&mut self, contigs: &[String]) {
        self.reference_contigs = contigs.to_vec();
    }

    fn emit(&mut self, event: &MatchEvent) {
        match event {
            MatchEvent::Annotated {
                chrom,
                position,
                id,
            } => trace!(chrom = %chrom, position, id = %id, "Annotated record"),
            MatchEvent::NoCandidate {
                chrom,
                query_chrom,
                position,
            } => debug!(
                chrom = %chrom,
                query_chrom = %query_chrom,
                position,
                "No matching reference record"
            ),
            MatchEvent::MissingIdentifier { chrom, position } => debug!(
                chrom = %chrom,
                position,
                "Matching reference record has no identifier"
            ),
            MatchEvent::UnknownContig {
                chrom,
                query_chrom,
                position,
            } => {
                warn!(
                    chrom = %chrom,
                    query_chrom = %query_chrom,
                    position,
                    "Could not fetch region from reference"
                );
                if self.reported_contigs.insert(query_chrom.clone()) {
                    debug!(
                        query_chrom = %query_chrom,
                        available = ?self.reference_contigs,
                        "Available contigs in reference"
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_sink_collects_in_order() {
        let mut sink: Vec<MatchEvent> = Vec::new();
        let first = MatchEvent::MissingIdentifier {
            chrom: "1".to_string(),
            position: 1,
        };
        let second = MatchEvent::Annotated {
            chrom: "1".to_string(),
            position: 2,
            id: "rs2".to_string(),
        };

        sink.emit(&first);
        sink.emit(&second);
        assert_eq!(sink, vec![first, second]);
    }

    #[test]
    fn test_tracing_sink_tracks_reported_contigs() {
        let mut sink = TracingSink::default();
        sink.reference_contigs(&["1".to_string(), "MT".to_string()]);
        assert_eq!(sink.reference_contigs.len(), 2);
        let event = MatchEvent::UnknownContig {
            chrom: "chrUn_x".to_string(),
            query_chrom: "Un_x".to_string(),
            position: 10,
        };

        sink.emit(&event);
        sink.emit(&event);
        assert_eq!(sink.reported_contigs.len(), 1);
        assert!(sink.reported_contigs.contains("Un_x"));
    }
}
