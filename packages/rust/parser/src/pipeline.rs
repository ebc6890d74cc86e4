//! Document-level parse: locate the section, scan it line by line, assemble.
//!
//! The scan is a single forward pass in source order. The only state carried
//! between lines is the [`PendingContext`], passed into and returned from each
//! step, so a parser can be shared freely across threads.

use tracing::{debug, instrument, trace};

use edutrace_shared::{DegreeLevel, DegreeRecord, ParserConfig, PersonRecord};

use crate::assembler::{self, Assembly, SectionOutcome};
use crate::context::{self, PendingContext};
use crate::degree::{DegreeHit, DegreeTable};
use crate::dissertation::find_dissertation;
use crate::employment::{EmploymentRules, is_employment};
use crate::field::{field_on_line, labeled_field};
use crate::name::extract_name;
use crate::normalize::repair_line;
use crate::section::SectionHeaders;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The pattern tables a parser evaluates, in one place.
#[derive(Debug, Clone, Copy)]
pub struct PatternTables {
    pub headers: &'static SectionHeaders,
    pub employment: &'static EmploymentRules,
    pub degrees: &'static DegreeTable,
}

impl Default for PatternTables {
    fn default() -> Self {
        Self {
            headers: SectionHeaders::standard(),
            employment: EmploymentRules::standard(),
            degrees: DegreeTable::standard(),
        }
    }
}

/// Per-line facts computed once before the scan.
#[derive(Debug)]
struct ScanLine<'a> {
    raw: &'a str,
    /// Line after artifact repair; all context extraction reads this.
    repaired: String,
    hits: Vec<DegreeHit>,
    employment: bool,
}

/// Education history parser.
#[derive(Debug, Clone, Default)]
pub struct EducationParser {
    config: ParserConfig,
    tables: PatternTables,
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

impl EducationParser {
    pub fn new(config: ParserConfig) -> Self {
        Self {
            config,
            tables: PatternTables::default(),
        }
    }

    /// Parse one document's normalized text into a `PersonRecord`.
    ///
    /// Never fails: missing sections, degrees, or context become advisory notes.
    #[instrument(skip_all, fields(document = %document_id))]
    pub fn parse(&self, text: &str, document_id: &str) -> PersonRecord {
        if text.trim().is_empty() {
            debug!("empty document");
            return assembler::empty_record(document_id);
        }

        let name = extract_name(text);

        let (section, degrees) = match self.tables.headers.locate(text) {
            Some(section) if !section.is_empty() => {
                debug!(header = section.header, lines = section.lines.len(), "education section located");
                (SectionOutcome::Scanned, self.scan(&section.lines))
            }
            _ => {
                debug!("no education section");
                (SectionOutcome::Missing, Vec::new())
            }
        };

        assembler::assemble(
            Assembly {
                document_id: document_id.to_string(),
                name,
                section,
                degrees,
            },
            self.config.validate,
        )
    }

    /// Scan the section lines in order, threading the pending context through.
    fn scan(&self, lines: &[&str]) -> Vec<DegreeRecord> {
        let lines: Vec<ScanLine<'_>> = lines
            .iter()
            .map(|&raw| ScanLine {
                raw,
                repaired: repair_line(raw),
                hits: self.tables.degrees.detect(raw),
                employment: is_employment(raw, self.tables.employment, self.tables.degrees),
            })
            .collect();

        let mut records = Vec::new();
        let mut pending: Option<PendingContext> = None;

        for idx in 0..lines.len() {
            let (found, next) = self.scan_line(&lines, idx, pending);
            records.extend(found);
            pending = next;
        }

        records
    }

    /// One step of the scan. Returns the degrees found on line `idx` and the
    /// pending context to carry into the next line.
    fn scan_line(
        &self,
        lines: &[ScanLine<'_>],
        idx: usize,
        pending: Option<PendingContext>,
    ) -> (Vec<DegreeRecord>, Option<PendingContext>) {
        let line = &lines[idx];

        if line.employment {
            trace!(line = line.raw, "skipping employment line");
            return (Vec::new(), pending);
        }

        if line.hits.is_empty() {
            let carried = PendingContext::from_line(&line.repaired).or(pending);
            return (Vec::new(), carried);
        }

        let text = line.repaired.as_str();
        let mut institution = context::institution(text);
        let mut school = context::school(text);
        let mut year = context::year(text);

        // Previous line, unless it is an employment entry or carries its own degree.
        if let Some(prev) = idx.checked_sub(1).map(|i| &lines[i]) {
            if !prev.employment && prev.hits.is_empty() {
                year = year.or_else(|| context::year(&prev.repaired));
                institution = institution.or_else(|| context::institution(&prev.repaired));
                school = school.or_else(|| context::school(&prev.repaired));
            }
        }

        let window = following(lines, idx, self.config.lookahead);

        year = year.or_else(|| {
            window
                .iter()
                .filter(|l| !l.employment)
                .find_map(|l| context::year(&l.repaired))
        });

        if let Some(pending) = pending {
            institution = institution.or(pending.institution);
            school = school.or(pending.school);
            year = year.or(pending.year);
        }

        let window_text: Vec<&str> = window.iter().map(|l| l.repaired.as_str()).collect();

        let records = line
            .hits
            .iter()
            .map(|hit| {
                let field = field_on_line(text, hit.label, hit.level)
                    .or_else(|| labeled_field(&window_text));

                let dissertation = (hit.level == DegreeLevel::Phd)
                    .then(|| {
                        let neighborhood: Vec<&str> =
                            following(lines, idx, self.config.dissertation_lookahead)
                                .iter()
                                .map(|l| l.repaired.as_str())
                                .collect();
                        find_dissertation(text, &neighborhood, &self.config)
                    })
                    .flatten();

                debug!(
                    level = %hit.level,
                    label = hit.label,
                    institution = ?institution,
                    year = ?year,
                    "degree detected"
                );

                DegreeRecord {
                    institution: institution.clone(),
                    school: school.clone(),
                    field,
                    year,
                    dissertation,
                    ..DegreeRecord::new(hit.level, hit.label, line.raw)
                }
            })
            .collect();

        // A degree line always consumes whatever was pending.
        (records, None)
    }
}

/// Up to `limit` lines after `idx`, stopping before the next degree line.
fn following<'l, 'a>(lines: &'l [ScanLine<'a>], idx: usize, limit: usize) -> Vec<&'l ScanLine<'a>> {
    lines[idx + 1..]
        .iter()
        .take_while(|l| l.hits.is_empty())
        .take(limit)
        .collect()
}

/// Parse a document with the default configuration.
pub fn parse_document(text: &str, document_id: &str) -> PersonRecord {
    EducationParser::default().parse(text, document_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_section(body: &str) -> PersonRecord {
        parse_document(&format!("Jane Doe\nEDUCATION\n{body}\nPUBLICATIONS\nPaper"), "doe.pdf")
    }

    fn read_fixture(name: &str) -> String {
        std::fs::read_to_string(format!("../../../fixtures/cv/{name}")).expect("read fixture")
    }

    #[test]
    fn pending_school_and_year_inherited_by_bare_degree() {
        let record = parse_section("Kellogg School of Management, 2010\nPh.D.");
        assert_eq!(record.degrees.len(), 1);
        let phd = &record.degrees[0];
        assert_eq!(phd.level, DegreeLevel::Phd);
        assert_eq!(phd.school.as_deref(), Some("Kellogg School of Management"));
        assert_eq!(phd.year, Some(2010));
        assert_eq!(phd.raw_text, "Ph.D.");
    }

    #[test]
    fn pending_context_survives_context_free_lines() {
        let record = parse_section("Stanford University, 2010\nAdvisor: Jane Smith\nPh.D. in Marketing");
        let phd = &record.degrees[0];
        assert_eq!(phd.institution.as_deref(), Some("Stanford University"));
        assert_eq!(phd.year, Some(2010));
        assert_eq!(phd.field.as_deref(), Some("Marketing"));
    }

    #[test]
    fn pending_context_is_consumed_by_one_degree() {
        let record = parse_section("Stanford University, 2010\nAdvisor: Jane Smith\nPh.D.\nNotes\nMBA");
        assert_eq!(record.degrees.len(), 2);
        assert_eq!(record.degrees[0].institution.as_deref(), Some("Stanford University"));
        assert_eq!(record.degrees[1].institution, None);
        assert_eq!(record.degrees[1].year, None);
    }

    #[test]
    fn newer_pending_context_overwrites_older() {
        let record = parse_section("Harvard University, 2004\nYale University, 2006\n\nGPA 3.9\nM.A.");
        let ma = &record.degrees[0];
        assert_eq!(ma.institution.as_deref(), Some("Yale University"));
        assert_eq!(ma.year, Some(2006));
    }

    #[test]
    fn employment_line_is_not_a_context_source() {
        let record = parse_section("Professor of Marketing, 2015–Present\nPh.D.");
        assert_eq!(record.degrees.len(), 1);
        assert_eq!(record.degrees[0].institution, None);
        assert_eq!(record.degrees[0].year, None);
    }

    #[test]
    fn degree_line_with_employment_words_is_kept() {
        let record = parse_section(
            "Professor of Marketing, 2015–Present\nPh.D., Professor Track Program, University of X, 2010",
        );
        assert_eq!(record.degrees.len(), 1);
        let phd = &record.degrees[0];
        assert_eq!(phd.institution.as_deref(), Some("University of X"));
        assert_eq!(phd.year, Some(2010));
    }

    #[test]
    fn school_on_previous_line_joins_institution_on_degree_line() {
        let record = parse_section("Kellogg School of Management\nPh.D., Northwestern University, 2012");
        let phd = &record.degrees[0];
        assert_eq!(phd.institution.as_deref(), Some("Northwestern University"));
        assert_eq!(phd.school.as_deref(), Some("Kellogg School of Management"));
        assert_eq!(phd.year, Some(2012));
    }

    #[test]
    fn pending_school_is_inherited_independently_of_institution() {
        let record =
            parse_section("Kellogg School of Management, 2010\nGPA 4.0\nPh.D., Northwestern University");
        let phd = &record.degrees[0];
        assert_eq!(phd.institution.as_deref(), Some("Northwestern University"));
        assert_eq!(phd.school.as_deref(), Some("Kellogg School of Management"));
        assert_eq!(phd.year, Some(2010));
    }

    #[test]
    fn advisor_names_do_not_read_as_degrees() {
        let record = parse_section("Ph.D., Marketing, Stanford University, 2012\nAdvisors: Yi Ma and Bo Li");
        let found: Vec<_> = record.degrees.iter().map(|d| (d.level, d.degree_type.as_str())).collect();
        assert_eq!(found, [(DegreeLevel::Phd, "Ph.D.")]);
    }

    #[test]
    fn curated_institution_after_degree_is_not_the_field() {
        let record = parse_section("B.A., MIT, 1999");
        let ba = &record.degrees[0];
        assert_eq!(ba.institution.as_deref(), Some("MIT"));
        assert_eq!(ba.field, None);
    }

    #[test]
    fn degree_and_field_stay_out_of_institution() {
        let record = parse_section("B.A. Economics Duke University, 1999\nMBA Duke University, 2006");
        assert_eq!(record.degrees.len(), 2);
        assert_eq!(record.degrees[0].institution.as_deref(), Some("Duke University"));
        assert_eq!(record.degrees[0].field.as_deref(), Some("Economics"));
        assert_eq!(record.degrees[1].institution.as_deref(), Some("Duke University"));
    }

    #[test]
    fn year_range_on_degree_line_takes_end() {
        let record = parse_section("Ph.D., 2008–2012");
        assert_eq!(record.degrees[0].year, Some(2012));
    }

    #[test]
    fn compound_institution_on_previous_line() {
        let record = parse_section("Northwestern University – Ghent University\nPh.D., Marketing");
        assert_eq!(
            record.degrees[0].institution.as_deref(),
            Some("Northwestern University / Ghent University")
        );
        assert_eq!(record.degrees[0].field.as_deref(), Some("Marketing"));
    }

    #[test]
    fn token_collision_yields_one_masters_degree() {
        let record = parse_section("MBA, Strategy and Marketing");
        assert_eq!(record.degrees.len(), 1);
        assert_eq!(record.degrees[0].level, DegreeLevel::Masters);
        assert!(!record.has_level(DegreeLevel::Undergrad));
    }

    #[test]
    fn labeled_dissertation_is_attached() {
        let record = parse_section("Ph.D., Marketing, Stanford University, 2012\nDissertation: Essays on Consumer Choice");
        assert_eq!(
            record.degrees[0].dissertation.as_deref(),
            Some("Essays on Consumer Choice")
        );
    }

    #[test]
    fn narrative_after_phd_attaches_no_dissertation() {
        let record = parse_section(
            "Ph.D., Marketing, Stanford University, 2012\nAdvised by Professor Jane Smith, whose research on consumer choice shaped my thesis",
        );
        assert_eq!(record.degrees[0].dissertation, None);
    }

    #[test]
    fn dissertation_never_set_for_other_levels() {
        let record = parse_section("M.A., Economics, Yale University, 2005\nThesis: Price Dispersion in Online Markets");
        assert_eq!(record.degrees[0].level, DegreeLevel::Masters);
        assert_eq!(record.degrees[0].dissertation, None);
    }

    #[test]
    fn dissertation_window_stops_at_next_degree() {
        let record = parse_section(
            "Ph.D., Marketing, 2012\nM.S., Statistics, 2009\nThesis: Bootstrap Methods for Panel Data",
        );
        assert_eq!(record.degrees[0].dissertation, None);
    }

    #[test]
    fn labeled_field_in_lookahead() {
        let record = parse_section("Ph.D., Stanford University, 2010\nConcentration: Experimental Psychology");
        assert_eq!(record.degrees[0].field.as_deref(), Some("Experimental Psychology"));
    }

    #[test]
    fn year_from_lookahead_when_nothing_earlier() {
        let record = parse_section("Ph.D. in Marketing\nStanford University, 2010");
        assert_eq!(record.degrees[0].year, Some(2010));
        assert_eq!(record.degrees[0].institution, None);
    }

    #[test]
    fn previous_degree_line_is_not_borrowed() {
        let record = parse_section("Ph.D., Stanford University, 2010\nB.A.");
        assert_eq!(record.degrees.len(), 2);
        assert_eq!(record.degrees[1].institution, None);
        assert_eq!(record.degrees[1].year, None);
    }

    #[test]
    fn two_degrees_on_one_line_share_context() {
        let record = parse_section("B.A., M.A., Economics, University of Chicago, 1999");
        let labels: Vec<_> = record.degrees.iter().map(|d| d.degree_type.as_str()).collect();
        assert_eq!(labels, ["M.A.", "B.A."]);
        for degree in &record.degrees {
            assert_eq!(degree.institution.as_deref(), Some("University of Chicago"));
            assert_eq!(degree.year, Some(1999));
            assert_eq!(degree.field.as_deref(), Some("Economics"));
        }
    }

    #[test]
    fn missing_section_produces_note_only() {
        let record = parse_document("Jane Doe\nPh.D., Stanford University", "doe.pdf");
        assert!(record.degrees.is_empty());
        assert_eq!(record.name, "Jane Doe");
        assert_eq!(record.notes, [assembler::NOTE_NO_SECTION]);
    }

    #[test]
    fn section_without_degrees_is_noted() {
        let record = parse_section("Stanford University\nSome coursework");
        assert_eq!(record.notes, [assembler::NOTE_NO_DEGREES]);
    }

    #[test]
    fn empty_text_is_noted() {
        let record = parse_document("  \n ", "blank.pdf");
        assert_eq!(record.notes, [assembler::NOTE_NO_TEXT]);
        assert_eq!(record.source_document_id, "blank.pdf");
    }

    #[test]
    fn parse_is_deterministic() {
        let text = read_fixture("marketing-professor.txt");
        let first = serde_json::to_string(&parse_document(&text, "a.pdf")).expect("serialize");
        let second = serde_json::to_string(&parse_document(&text, "a.pdf")).expect("serialize");
        assert_eq!(first, second);
    }

    #[test]
    fn marketing_professor_fixture() {
        let record = parse_document(&read_fixture("marketing-professor.txt"), "marketing-professor.pdf");

        assert_eq!(record.name, "Jane Q. Doe");
        assert_eq!(record.degrees.len(), 3);

        let phd = &record.degrees[0];
        assert_eq!(phd.level, DegreeLevel::Phd);
        assert_eq!(phd.field.as_deref(), Some("Marketing"));
        assert_eq!(phd.school.as_deref(), Some("Kellogg School of Management"));
        assert_eq!(phd.institution.as_deref(), Some("Northwestern University"));
        assert_eq!(phd.year, Some(2012));
        assert_eq!(phd.dissertation.as_deref(), Some("Essays on Consumer Choice"));

        let mba = &record.degrees[1];
        assert_eq!(mba.level, DegreeLevel::Masters);
        assert_eq!(mba.field.as_deref(), Some("Strategy and Marketing"));
        assert_eq!(mba.institution.as_deref(), Some("Harvard University"));
        assert_eq!(mba.year, Some(2006));

        let ba = &record.degrees[2];
        assert_eq!(ba.level, DegreeLevel::Undergrad);
        assert_eq!(ba.field.as_deref(), Some("Economics"));
        assert_eq!(ba.institution.as_deref(), Some("Northwestern University"));
        // The lecturer line right above carries 2008 but is an employment entry.
        assert_eq!(ba.year, None);

        assert!(record.degrees.iter().all(|d| d.institution.as_deref() != Some("Boston College")));
        assert_eq!(
            record.notes,
            [format!("{}: Northwestern University", assembler::NOTE_CROSS_LEVEL)]
        );
    }

    #[test]
    fn belgian_fixture() {
        let record = parse_document(&read_fixture("belgian-economist.txt"), "belgian-economist.pdf");

        let levels: Vec<_> = record.degrees.iter().map(|d| d.level).collect();
        assert_eq!(levels, [DegreeLevel::Phd, DegreeLevel::Masters, DegreeLevel::Undergrad]);

        let phd = &record.degrees[0];
        assert_eq!(
            phd.institution.as_deref(),
            Some("Northwestern University / Ghent University")
        );
        assert_eq!(phd.year, Some(2012));
        assert_eq!(phd.dissertation, None);

        let lic = &record.degrees[1];
        assert_eq!(lic.degree_type, "Licentiaat");
        assert_eq!(lic.field.as_deref(), Some("Psychologie"));
        assert_eq!(lic.institution.as_deref(), Some("KU Leuven"));
        assert_eq!(lic.year, Some(2006));

        let kand = &record.degrees[2];
        assert_eq!(kand.degree_type, "Kandidaat");
        assert_eq!(kand.field.as_deref(), Some("Sociologie"));
        assert_eq!(kand.year, Some(2004));
    }

    #[test]
    fn fixture_without_education_section() {
        let record = parse_document(&read_fixture("no-education.txt"), "no-education.pdf");
        assert_eq!(record.name, "John Roe");
        assert!(record.degrees.is_empty());
        assert_eq!(record.notes, [assembler::NOTE_NO_SECTION]);
    }

    #[test]
    fn parser_is_shareable_across_threads() {
        let parser = std::sync::Arc::new(EducationParser::default());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let parser = std::sync::Arc::clone(&parser);
                std::thread::spawn(move || {
                    parser.parse("John Roe\nEDUCATION\nMBA, 2006", &format!("doc-{i}"))
                })
            })
            .collect();
        for handle in handles {
            let record = handle.join().expect("thread");
            assert_eq!(record.degrees[0].year, Some(2006));
        }
    }
}
