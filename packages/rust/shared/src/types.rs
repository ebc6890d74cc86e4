//! Core domain types for extracted education history.

use serde::{Deserialize, Serialize};

use crate::error::Result;

// ---------------------------------------------------------------------------
// DegreeLevel
// ---------------------------------------------------------------------------

/// The only classification axis for a detected degree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DegreeLevel {
    Phd,
    Masters,
    Undergrad,
}

impl DegreeLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            DegreeLevel::Phd => "phd",
            DegreeLevel::Masters => "masters",
            DegreeLevel::Undergrad => "undergrad",
        }
    }
}

impl std::fmt::Display for DegreeLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DegreeLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "phd" => Ok(DegreeLevel::Phd),
            "masters" => Ok(DegreeLevel::Masters),
            "undergrad" => Ok(DegreeLevel::Undergrad),
            other => Err(format!("unknown degree level: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// DegreeRecord
// ---------------------------------------------------------------------------

/// A single degree with whatever context could be attached to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DegreeRecord {
    /// Degree level.
    pub level: DegreeLevel,
    /// Canonical label of the matched token (e.g. `Ph.D.`, `MBA`, `B.S.`).
    pub degree_type: String,
    /// Institution name, or `"A / B"` for a joint program.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub institution: Option<String>,
    /// Named sub-school within the institution (e.g. `Wharton School`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school: Option<String>,
    /// Subject or concentration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Completion year; the end year when the source gave a range.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
    /// Explicitly labeled or quoted dissertation title (PhD only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dissertation: Option<String>,
    /// Source line the record was derived from.
    pub raw_text: String,
}

impl DegreeRecord {
    /// Seed a record from a degree hit; context fields start unset.
    pub fn new(level: DegreeLevel, degree_type: impl Into<String>, raw_text: impl Into<String>) -> Self {
        Self {
            level,
            degree_type: degree_type.into(),
            institution: None,
            school: None,
            field: None,
            year: None,
            dissertation: None,
            raw_text: raw_text.into(),
        }
    }
}

impl std::fmt::Display for DegreeRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.degree_type)?;
        for part in [&self.field, &self.school, &self.institution].into_iter().flatten() {
            write!(f, ", {part}")?;
        }
        if let Some(year) = self.year {
            write!(f, ", ({year})")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// PersonRecord
// ---------------------------------------------------------------------------

/// All education data extracted from one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRecord {
    /// Person name, empty when none could be found.
    pub name: String,
    /// Caller-supplied document identifier (e.g. the file name).
    pub source_document_id: String,
    /// Degrees in detection order.
    pub degrees: Vec<DegreeRecord>,
    /// Advisory warnings for human review.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl PersonRecord {
    /// All degrees at a given level, in detection order.
    pub fn degrees_by_level(&self, level: DegreeLevel) -> impl Iterator<Item = &DegreeRecord> {
        self.degrees.iter().filter(move |d| d.level == level)
    }

    /// Whether at least one degree of `level` was found.
    pub fn has_level(&self, level: DegreeLevel) -> bool {
        self.degrees_by_level(level).next().is_some()
    }
}

/// Encode a batch of records as a JSON array.
pub fn records_to_json(records: &[PersonRecord], pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(records)?
    } else {
        serde_json::to_string(records)?
    };
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phd() -> DegreeRecord {
        DegreeRecord {
            field: Some("Marketing".into()),
            school: Some("Kellogg School of Management".into()),
            institution: Some("Northwestern University".into()),
            year: Some(2010),
            ..DegreeRecord::new(DegreeLevel::Phd, "Ph.D.", "Ph.D. in Marketing")
        }
    }

    #[test]
    fn level_serializes_lowercase() {
        let json = serde_json::to_string(&DegreeLevel::Undergrad).expect("serialize");
        assert_eq!(json, "\"undergrad\"");
        let parsed: DegreeLevel = serde_json::from_str("\"phd\"").expect("deserialize");
        assert_eq!(parsed, DegreeLevel::Phd);
    }

    #[test]
    fn level_from_str_rejects_unknown() {
        assert_eq!("Masters".parse::<DegreeLevel>(), Ok(DegreeLevel::Masters));
        assert!("postdoc".parse::<DegreeLevel>().is_err());
    }

    #[test]
    fn degree_display_joins_present_parts() {
        assert_eq!(
            phd().to_string(),
            "Ph.D., Marketing, Kellogg School of Management, Northwestern University, (2010)"
        );
        let bare = DegreeRecord::new(DegreeLevel::Masters, "MBA", "MBA");
        assert_eq!(bare.to_string(), "MBA");
    }

    #[test]
    fn unset_fields_are_omitted_from_json() {
        let bare = DegreeRecord::new(DegreeLevel::Masters, "MBA", "MBA");
        let json = serde_json::to_string(&bare).expect("serialize");
        assert!(!json.contains("dissertation"));
        assert!(!json.contains("institution"));
        assert!(json.contains("\"raw_text\":\"MBA\""));
    }

    #[test]
    fn degrees_by_level_keeps_order() {
        let record = PersonRecord {
            name: "Jane Doe".into(),
            source_document_id: "doe.pdf".into(),
            degrees: vec![
                DegreeRecord::new(DegreeLevel::Undergrad, "B.A.", "B.A., Economics"),
                phd(),
                DegreeRecord::new(DegreeLevel::Undergrad, "B.S.", "B.S., Mathematics"),
            ],
            notes: vec![],
        };
        let labels: Vec<_> = record
            .degrees_by_level(DegreeLevel::Undergrad)
            .map(|d| d.degree_type.as_str())
            .collect();
        assert_eq!(labels, ["B.A.", "B.S."]);
        assert!(record.has_level(DegreeLevel::Phd));
        assert!(!record.has_level(DegreeLevel::Masters));
    }

    #[test]
    fn records_encode_as_json_array() {
        let record = PersonRecord {
            name: "Jane Doe".into(),
            source_document_id: "doe.pdf".into(),
            degrees: vec![phd()],
            notes: vec![],
        };
        let compact = records_to_json(std::slice::from_ref(&record), false).expect("encode");
        assert!(compact.starts_with("[{\"name\":\"Jane Doe\""));
        assert!(!compact.contains('\n'));

        let pretty = records_to_json(&[record], true).expect("encode");
        assert!(pretty.contains("\n"));
        let decoded: Vec<PersonRecord> = serde_json::from_str(&pretty).expect("decode");
        assert_eq!(decoded[0].degrees[0].year, Some(2010));
    }
}
