use std::borrow::Cow;
use std::io::Write;

use serde::Serialize;

use crate::core::contig::{detect_naming_convention, normalize_contig_name};
use crate::core::record::VariantRecord;
use crate::core::types::{GenomicWindow, MatchOutcome, NamingConvention, UnchangedReason};
use crate::io::writer::AnnotationWriter;
use crate::io::{ReaderError, WindowQuery};
use crate::matching::events::{MatchEvent, MatchEventSink};
use crate::matching::pipeline::AnnotateError;

/// Helper function to convert a u64 count to f64 with explicit precision loss allowance
#[inline]
fn count_to_f64(count: u64) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    {
        count as f64
    }
}

/// Whether `candidate` is an acceptable source of an identifier for `target`.
///
/// Requires the same position, the same reference allele (exact string
/// comparison), and at least one alternate allele in common. Alternates are
/// compared as sets, not pairwise by index.
#[must_use]
pub fn is_match(target: &VariantRecord, candidate: &VariantRecord) -> bool {
    candidate.position() == target.position()
        && candidate.reference_allele() == target.reference_allele()
        && target.shares_alternate_with(candidate)
}

/// First candidate, in the order given, that [`is_match`]es `target`.
///
/// Stops at the first match or the first read error.
///
/// # Errors
///
/// Returns the first `ReaderError` produced by `candidates` before a match is found.
pub fn find_match<I>(target: &VariantRecord, mut candidates: I) -> Result<Option<VariantRecord>, ReaderError>
where
    I: Iterator<Item = Result<VariantRecord, ReaderError>>,
{
    candidates
        .find(|candidate| candidate.as_ref().map_or(true, |c| is_match(target, c)))
        .transpose()
}

/// Counts of match outcomes for one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotationSummary {
    pub target_convention: NamingConvention,
    pub reference_convention: NamingConvention,
    /// Records read from the target and written to the output
    pub records: u64,
    pub annotated: u64,
    pub no_candidate: u64,
    pub unknown_contig: u64,
    pub missing_identifier: u64,
}

impl AnnotationSummary {
    pub fn new(target_convention: NamingConvention, reference_convention: NamingConvention) -> Self {
        Self {
            target_convention,
            reference_convention,
            records: 0,
            annotated: 0,
            no_candidate: 0,
            unknown_contig: 0,
            missing_identifier: 0,
        }
    }

    pub fn record(&mut self, outcome: &MatchOutcome) {
        self.records += 1;
        match outcome {
            MatchOutcome::Annotated(_) => self.annotated += 1,
            MatchOutcome::Unchanged(UnchangedReason::NoCandidate) => self.no_candidate += 1,
            MatchOutcome::Unchanged(UnchangedReason::UnknownContig) => self.unknown_contig += 1,
            MatchOutcome::Unchanged(UnchangedReason::MissingIdentifier) => {
                self.missing_identifier += 1;
            }
        }
    }

    #[must_use]
    pub fn unchanged(&self) -> u64 {
        self.records - self.annotated
    }

    /// Fraction of records that received an identifier
    #[must_use]
    pub fn annotated_fraction(&self) -> f64 {
        if self.records == 0 {
            return 0.0;
        }
        count_to_f64(self.annotated) / count_to_f64(self.records)
    }

    /// Whether chromosome names were rewritten before querying
    #[must_use]
    pub fn normalized(&self) -> bool {
        self.target_convention != self.reference_convention
    }
}

/// Annotates target records with identifiers from a reference collection
pub struct VariantMatcher<R: WindowQuery> {
    reference: R,
    target_convention: NamingConvention,
    reference_convention: NamingConvention,
}

impl<R: WindowQuery> VariantMatcher<R> {
    /// Create a matcher, detecting the reference convention from its contigs
    pub fn new(reference: R, target_convention: NamingConvention) -> Self {
        let reference_convention = detect_naming_convention(reference.contig_names());
        Self::with_conventions(reference, target_convention, reference_convention)
    }

    pub fn with_conventions(
        reference: R,
        target_convention: NamingConvention,
        reference_convention: NamingConvention,
    ) -> Self {
        Self {
            reference,
            target_convention,
            reference_convention,
        }
    }

    pub fn target_convention(&self) -> NamingConvention {
        self.target_convention
    }

    pub fn reference_convention(&self) -> NamingConvention {
        self.reference_convention
    }

    /// Name to use for `chrom` when querying the reference.
    /// Borrowed unchanged when both datasets share a convention.
    pub fn query_chrom<'c>(&self, chrom: &'c str) -> Cow<'c, str> {
        if self.target_convention == self.reference_convention {
            Cow::Borrowed(chrom)
        } else {
            Cow::Owned(normalize_contig_name(
                chrom,
                self.target_convention,
                self.reference_convention,
            ))
        }
    }

    /// Look `record` up in the reference and set its identifier on a match.
    ///
    /// An unknown contig is not an error: the record is left unchanged and the
    /// event is reported to `events`.
    ///
    /// # Errors
    ///
    /// Returns any `ReaderError` other than `UnknownContig`.
    pub fn annotate(
        &mut self,
        record: &mut VariantRecord,
        events: &mut dyn MatchEventSink,
    ) -> Result<MatchOutcome, ReaderError> {
        let window = GenomicWindow::at_position(self.query_chrom(record.chrom()), record.position());

        let found = match self.reference.query_window(&window) {
            Ok(candidates) => find_match(record, candidates)?,
            Err(e) if e.is_unknown_contig() => {
                events.emit(&MatchEvent::UnknownContig {
                    chrom: record.chrom().to_string(),
                    query_chrom: window.chrom,
                    position: record.position(),
                });
                return Ok(MatchOutcome::Unchanged(UnchangedReason::UnknownContig));
            }
            Err(e) => return Err(e),
        };

        let outcome = match found {
            Some(candidate) => match candidate.id() {
                Some(id) => {
                    record.set_id(id);
                    events.emit(&MatchEvent::Annotated {
                        chrom: record.chrom().to_string(),
                        position: record.position(),
                        id: id.to_string(),
                    });
                    MatchOutcome::Annotated(id.to_string())
                }
                None => {
                    events.emit(&MatchEvent::MissingIdentifier {
                        chrom: record.chrom().to_string(),
                        position: record.position(),
                    });
                    MatchOutcome::Unchanged(UnchangedReason::MissingIdentifier)
                }
            },
            None => {
                events.emit(&MatchEvent::NoCandidate {
                    chrom: record.chrom().to_string(),
                    query_chrom: window.chrom,
                    position: record.position(),
                });
                MatchOutcome::Unchanged(UnchangedReason::NoCandidate)
            }
        };

        Ok(outcome)
    }

    /// Annotate every record of `records` and write it, in input order.
    ///
    /// # Errors
    ///
    /// Returns `AnnotateError::Reader` on a fatal read or query error, or
    /// `AnnotateError::Write` if the output cannot be written.
    pub fn run<I, W>(
        &mut self,
        records: I,
        writer: &mut AnnotationWriter<W>,
        events: &mut dyn MatchEventSink,
    ) -> Result<AnnotationSummary, AnnotateError>
    where
        I: IntoIterator<Item = Result<VariantRecord, ReaderError>>,
        W: Write,
    {
        let mut summary = AnnotationSummary::new(self.target_convention, self.reference_convention);

        for record in records {
            let mut record = record?;
            let outcome = self.annotate(&mut record, events)?;
            summary.record(&outcome);
            writer.write(&record).map_err(AnnotateError::Write)?;
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::writer::InfoField;
    use crate::io::WindowRecords;
    use crate::parsing::vcf::parse_record_line;
    use NamingConvention::{Bare, Prefixed};

    /// In-memory reference keyed by contig, kept in insertion (physical) order
    struct MemoryReference {
        contigs: Vec<String>,
        records: Vec<VariantRecord>,
        queries: Vec<GenomicWindow>,
    }

    impl MemoryReference {
        fn new(contigs: &[&str], records: Vec<VariantRecord>) -> Self {
            Self {
                contigs: contigs.iter().map(|c| (*c).to_string()).collect(),
                records,
                queries: Vec::new(),
            }
        }
    }

    impl WindowQuery for MemoryReference {
        fn contig_names(&self) -> &[String] {
            &self.contigs
        }

        fn query_window(&mut self, window: &GenomicWindow) -> Result<WindowRecords<'_>, ReaderError> {
            self.queries.push(window.clone());
            if !self.contigs.contains(&window.chrom) {
                return Err(ReaderError::UnknownContig(window.chrom.clone()));
            }
            let window = window.clone();
            Ok(Box::new(
                self.records
                    .iter()
                    .filter(move |r| {
                        r.chrom() == window.chrom
                            && r.position() > window.start
                            && r.position() <= window.end
                    })
                    .cloned()
                    .map(Ok::<_, ReaderError>),
            ))
        }
    }

    fn variant(chrom: &str, position: u64, id: Option<&str>, reference: &str, alts: &[&str]) -> VariantRecord {
        VariantRecord::new(
            chrom,
            position,
            id.map(str::to_string),
            reference,
            alts.iter().map(|a| (*a).to_string()).collect(),
        )
    }

    #[test]
    fn test_is_match_shared_alternate() {
        let target = variant("1", 100, None, "A", &["T", "G"]);
        let candidate = variant("1", 100, Some("rs1"), "A", &["G", "C"]);
        assert!(is_match(&target, &candidate));
    }

    #[test]
    fn test_is_match_reference_mismatch() {
        let target = variant("1", 100, None, "A", &["T", "G"]);
        let candidate = variant("1", 100, Some("rs1"), "C", &["T", "G"]);
        assert!(!is_match(&target, &candidate));
    }

    #[test]
    fn test_is_match_position_and_alternates() {
        let target = variant("1", 100, None, "A", &["T"]);
        assert!(!is_match(&target, &variant("1", 101, Some("rs1"), "A", &["T"])));
        assert!(!is_match(&target, &variant("1", 100, Some("rs1"), "A", &["C"])));
        // Reference alleles are compared exactly, not by prefix
        assert!(!is_match(&target, &variant("1", 100, Some("rs1"), "AT", &["T"])));
    }

    #[test]
    fn test_find_match_first_wins() {
        let target = variant("1", 100, None, "A", &["T", "G"]);
        let candidates = vec![
            Ok(variant("1", 100, Some("rs0"), "C", &["T"])),
            Ok(variant("1", 100, Some("rs1"), "A", &["G"])),
            Ok(variant("1", 100, Some("rs2"), "A", &["T", "G"])),
        ];

        let found = find_match(&target, candidates.into_iter()).unwrap().unwrap();
        assert_eq!(found.id(), Some("rs1"));
    }

    #[test]
    fn test_find_match_stops_before_later_errors() {
        let target = variant("1", 100, None, "A", &["T"]);
        let candidates = vec![
            Ok(variant("1", 100, Some("rs1"), "A", &["T"])),
            Err(ReaderError::UnknownContig("never reached".to_string())),
        ];
        assert!(find_match(&target, candidates.into_iter()).unwrap().is_some());

        let candidates = vec![
            Ok(variant("1", 100, Some("rs0"), "G", &["T"])),
            Err(ReaderError::UnknownContig("reached".to_string())),
        ];
        assert!(find_match(&target, candidates.into_iter()).is_err());
    }

    #[test]
    fn test_find_match_none() {
        let target = variant("1", 100, None, "A", &["T"]);
        assert!(find_match(&target, std::iter::empty()).unwrap().is_none());
    }

    #[test]
    fn test_same_convention_does_not_rewrite() {
        let reference = MemoryReference::new(&["chr1", "chrM"], Vec::new());
        let matcher = VariantMatcher::new(reference, Prefixed);
        assert!(matches!(matcher.query_chrom("chr1"), Cow::Borrowed("chr1")));
        assert!(matches!(matcher.query_chrom("chrM"), Cow::Borrowed("chrM")));
        // Even a name from the other convention is queried as is
        assert!(matches!(matcher.query_chrom("MT"), Cow::Borrowed("MT")));
    }

    #[test]
    fn test_differing_conventions_normalize_queries() {
        let reference = MemoryReference::new(&["1", "MT"], Vec::new());
        let mut matcher = VariantMatcher::new(reference, Prefixed);
        assert_eq!(matcher.reference_convention(), Bare);

        let mut events: Vec<MatchEvent> = Vec::new();
        let mut chr1 = variant("chr1", 100_000, None, "A", &["T"]);
        let mut chrm = variant("chrM", 300, None, "A", &["T"]);
        matcher.annotate(&mut chr1, &mut events).unwrap();
        matcher.annotate(&mut chrm, &mut events).unwrap();

        let queries = matcher.reference.queries;
        assert_eq!(queries[0], GenomicWindow::new("1", 99_999, 100_000));
        assert_eq!(queries[1], GenomicWindow::new("MT", 299, 300));
    }

    #[test]
    fn test_bare_target_against_prefixed_reference() {
        let reference = MemoryReference::new(
            &["chrM"],
            vec![variant("chrM", 300, Some("rs300"), "A", &["G"])],
        );
        let mut matcher = VariantMatcher::new(reference, Bare);
        let mut record = variant("MT", 300, None, "A", &["G"]);
        let mut events: Vec<MatchEvent> = Vec::new();

        let outcome = matcher.annotate(&mut record, &mut events).unwrap();
        assert_eq!(outcome, MatchOutcome::Annotated("rs300".to_string()));
        // Only the identifier changes; the chromosome keeps the target's name
        assert_eq!(record.chrom(), "MT");
        assert_eq!(record.id(), Some("rs300"));
    }

    #[test]
    fn test_unknown_contig_is_not_fatal() {
        let reference = MemoryReference::new(&["1"], Vec::new());
        let mut matcher = VariantMatcher::new(reference, Bare);
        let mut record = variant("GL000220.1", 5, Some("keep"), "A", &["T"]);
        let mut events: Vec<MatchEvent> = Vec::new();

        let outcome = matcher.annotate(&mut record, &mut events).unwrap();
        assert_eq!(outcome, MatchOutcome::Unchanged(UnchangedReason::UnknownContig));
        assert_eq!(record.id(), Some("keep"));
        assert_eq!(
            events,
            vec![MatchEvent::UnknownContig {
                chrom: "GL000220.1".to_string(),
                query_chrom: "GL000220.1".to_string(),
                position: 5,
            }]
        );
    }

    #[test]
    fn test_candidate_without_identifier() {
        let reference = MemoryReference::new(&["1"], vec![variant("1", 5, None, "A", &["T"])]);
        let mut matcher = VariantMatcher::new(reference, Bare);
        let mut record = variant("1", 5, Some("rsOld"), "A", &["T"]);
        let mut events: Vec<MatchEvent> = Vec::new();

        let outcome = matcher.annotate(&mut record, &mut events).unwrap();
        assert_eq!(outcome, MatchOutcome::Unchanged(UnchangedReason::MissingIdentifier));
        assert_eq!(record.id(), Some("rsOld"));
    }

    #[test]
    fn test_overlapping_deletion_is_not_a_match() {
        // A deletion starting at 99 overlaps position 100 but does not start there
        let reference = MemoryReference::new(
            &["1"],
            vec![
                variant("1", 99, Some("rsDel"), "AC", &["A"]),
                variant("1", 100, Some("rsSnv"), "C", &["T"]),
            ],
        );
        let mut matcher = VariantMatcher::new(reference, Bare);
        let mut record = variant("1", 100, None, "C", &["T"]);

        let outcome = matcher.annotate(&mut record, &mut Vec::<MatchEvent>::new()).unwrap();
        assert_eq!(outcome, MatchOutcome::Annotated("rsSnv".to_string()));
    }

    fn run_lines(reference: MemoryReference, target_lines: &[&str]) -> (Vec<String>, AnnotationSummary, Vec<MatchEvent>) {
        let header = vec!["#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO".to_string()];
        let mut writer = AnnotationWriter::new(Vec::new(), &header, &InfoField::default()).unwrap();
        let convention = detect_naming_convention(target_lines.iter().map(|l| l.split('\t').next().unwrap_or("")));
        let mut matcher = VariantMatcher::new(reference, convention);
        let mut events: Vec<MatchEvent> = Vec::new();

        let records = target_lines
            .iter()
            .map(|line| Ok::<_, ReaderError>(parse_record_line(line).unwrap()));
        let summary = matcher.run(records, &mut writer, &mut events).unwrap();

        let output = String::from_utf8(writer.finish().unwrap()).unwrap();
        let body = output
            .lines()
            .filter(|l| !l.starts_with('#'))
            .map(str::to_string)
            .collect();
        (body, summary, events)
    }

    #[test]
    fn test_run_end_to_end() {
        let reference = MemoryReference::new(
            &["1"],
            vec![
                variant("1", 100, Some("rs1"), "A", &["T"]),
                variant("1", 300, Some("rs2"), "C", &["G"]),
            ],
        );
        let target = [
            "1\t100\t.\tA\tT\t50\tPASS\tDP=1",
            "1\t200\t.\tA\tT\t50\tPASS\tDP=2",
            "1\t300\t.\tA\tT\t50\tPASS\tDP=3",
        ];

        let (body, summary, events) = run_lines(reference, &target);

        assert_eq!(
            body,
            vec![
                "1\t100\trs1\tA\tT\t50\tPASS\tDP=1",
                "1\t200\t.\tA\tT\t50\tPASS\tDP=2",
                "1\t300\t.\tA\tT\t50\tPASS\tDP=3",
            ]
        );
        assert_eq!(summary.records, 3);
        assert_eq!(summary.annotated, 1);
        assert_eq!(summary.no_candidate, 2);
        assert_eq!(summary.unchanged(), 2);
        assert!(!summary.normalized());
        assert_eq!(events.len(), 3);
    }

    #[test]
    fn test_run_preserves_order_and_unknown_contigs() {
        let reference = MemoryReference::new(&["1"], vec![variant("1", 10, Some("rs10"), "G", &["A"])]);
        let target = [
            "2\t5\t.\tA\tT",
            "1\t10\t.\tG\tA,C",
            "2\t1\t.\tA\tT",
        ];

        let (body, summary, _) = run_lines(reference, &target);

        assert_eq!(body, vec!["2\t5\t.\tA\tT", "1\t10\trs10\tG\tA,C", "2\t1\t.\tA\tT"]);
        assert_eq!(summary.unknown_contig, 2);
        assert_eq!(summary.annotated, 1);
    }

    #[test]
    fn test_run_is_idempotent() {
        let reference = || {
            MemoryReference::new(
                &["1"],
                vec![
                    variant("1", 100, Some("rs1"), "A", &["T"]),
                    variant("1", 300, Some("rs2"), "C", &["G"]),
                ],
            )
        };
        let target = ["1\t100\t.\tA\tT", "1\t200\trsPrior\tA\tT", "1\t300\t.\tA\tT"];

        let (first, _, _) = run_lines(reference(), &target);
        let first_refs: Vec<&str> = first.iter().map(String::as_str).collect();
        let (second, _, _) = run_lines(reference(), &first_refs);
        assert_eq!(first, second);
    }

    #[test]
    fn test_summary_fraction() {
        let mut summary = AnnotationSummary::new(Bare, Bare);
        assert!(summary.annotated_fraction().abs() < f64::EPSILON);

        summary.record(&MatchOutcome::Annotated("rs1".to_string()));
        summary.record(&MatchOutcome::Unchanged(UnchangedReason::NoCandidate));
        assert!((summary.annotated_fraction() - 0.5).abs() < f64::EPSILON);
    }
}
