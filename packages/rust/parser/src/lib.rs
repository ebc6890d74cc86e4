//! Education history extraction from normalized CV text.
//!
//! [`EducationParser::parse`] locates the education section, detects degree
//! tokens line by line, attaches institution, school, field, year and
//! dissertation context, and assembles a [`PersonRecord`] with advisory notes.

pub mod assembler;
pub mod context;
pub mod degree;
pub mod dissertation;
pub mod employment;
pub mod field;
pub mod name;
pub mod normalize;
pub mod pipeline;
pub mod section;

pub use degree::{DegreeHit, DegreeTable};
pub use employment::{EmploymentRules, is_employment};
pub use pipeline::{EducationParser, PatternTables, parse_document};
pub use section::{EducationSection, SectionHeaders};

pub use edutrace_shared::{DegreeLevel, DegreeRecord, PersonRecord};
