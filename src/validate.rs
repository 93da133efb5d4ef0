//! Pre-submission validation for both forms.
//!
//! Validators are pure: they return the first violated rule as a structured
//! issue and leave presentation to the UI layer. Check order matters: the
//! user sees the message for the earliest rule that failed.

use crate::forms::{classify_extension, ExtensionKind, NucleotideForm, ProteinForm};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Upload,
    NcbiId,
    RangeFrom,
    RangeTo,
    ProteinSequence,
    ProteinNcbiId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueKind {
    NoInput,
    UnsupportedFileType,
    FromNotInteger,
    ToNotInteger,
    RangeInverted,
    SemicolonInIdList,
    WhitespaceInIdList,
}

impl IssueKind {
    pub fn message(self) -> &'static str {
        match self {
            Self::NoInput => {
                "No input provided. Please enter an NCBI accession or upload your own file"
            }
            Self::UnsupportedFileType => "Please provide an EMBL/GenBank or nucleotide FASTA file",
            Self::FromNotInteger => "Please insert an integer number into the 'from' field",
            Self::ToNotInteger => "Please insert an integer number into the 'to' field",
            Self::RangeInverted => {
                "Value in the 'to' field should be higher than the value in the 'from' field"
            }
            Self::SemicolonInIdList => {
                "';' found in NCBI ID list, please use a plain comma (,) to separate IDs"
            }
            Self::WhitespaceInIdList => {
                "whitespace found in NCBI ID list, please use a comma (,) to separate IDs"
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationIssue {
    pub field: FormField,
    pub kind: IssueKind,
}

impl ValidationIssue {
    fn new(field: FormField, kind: IssueKind) -> Self {
        Self { field, kind }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.kind.message())
    }
}

fn parse_bound(raw: &str) -> Option<Result<i64, ()>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.parse::<i64>().map_err(|_| ()))
}

/// Validate the nucleotide form. A present range bound must be an integer,
/// and `from <= to` when both are given.
pub fn validate_nucleotide_form(form: &NucleotideForm) -> Result<(), ValidationIssue> {
    let upload = form.upload_filename.trim();
    let ncbi = form.ncbi.trim();

    if upload.is_empty() && ncbi.is_empty() {
        return Err(ValidationIssue::new(FormField::Upload, IssueKind::NoInput));
    }

    if classify_extension(upload) == ExtensionKind::Other && ncbi.is_empty() {
        return Err(ValidationIssue::new(
            FormField::Upload,
            IssueKind::UnsupportedFileType,
        ));
    }

    let from = match parse_bound(&form.from) {
        Some(Err(())) => {
            return Err(ValidationIssue::new(
                FormField::RangeFrom,
                IssueKind::FromNotInteger,
            ));
        }
        Some(Ok(value)) => Some(value),
        None => None,
    };
    let to = match parse_bound(&form.to) {
        Some(Err(())) => {
            return Err(ValidationIssue::new(
                FormField::RangeTo,
                IssueKind::ToNotInteger,
            ));
        }
        Some(Ok(value)) => Some(value),
        None => None,
    };
    if let (Some(from), Some(to)) = (from, to) {
        if from > to {
            return Err(ValidationIssue::new(
                FormField::RangeTo,
                IssueKind::RangeInverted,
            ));
        }
    }

    Ok(())
}

/// Validate the protein form. The ID list is comma-separated only; the
/// semicolon check runs before the whitespace check.
pub fn validate_protein_form(form: &ProteinForm) -> Result<(), ValidationIssue> {
    let sequence = form.sequence.trim();
    let ncbi = form.ncbi.trim();

    if sequence.is_empty() && ncbi.is_empty() {
        return Err(ValidationIssue::new(
            FormField::ProteinSequence,
            IssueKind::NoInput,
        ));
    }

    if ncbi.contains(';') {
        return Err(ValidationIssue::new(
            FormField::ProteinNcbiId,
            IssueKind::SemicolonInIdList,
        ));
    }

    if ncbi.contains(' ') || ncbi.contains('\t') {
        return Err(ValidationIssue::new(
            FormField::ProteinNcbiId,
            IssueKind::WhitespaceInIdList,
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nucleotide_empty_form_yields_single_no_input_issue() {
        let form = NucleotideForm::default();
        let issue = validate_nucleotide_form(&form).expect_err("empty form must fail");
        assert_eq!(issue.kind, IssueKind::NoInput);
        assert_eq!(issue.field, FormField::Upload);
    }

    #[test]
    fn test_nucleotide_ncbi_id_alone_is_valid() {
        let mut form = NucleotideForm::default();
        form.ncbi = "12345".to_string();
        assert_eq!(validate_nucleotide_form(&form), Ok(()));
    }

    #[test]
    fn test_nucleotide_unsupported_upload_needs_ncbi_id() {
        let mut form = NucleotideForm::default();
        form.upload_filename = "notes.txt".to_string();
        let issue = validate_nucleotide_form(&form).expect_err("txt upload must fail");
        assert_eq!(issue.kind, IssueKind::UnsupportedFileType);

        form.ncbi = "U00096".to_string();
        assert_eq!(validate_nucleotide_form(&form), Ok(()));
    }

    #[test]
    fn test_nucleotide_range_bounds_must_be_integers() {
        let mut form = NucleotideForm::default();
        form.upload_filename = "genome.gbk".to_string();
        form.from = "abc".to_string();
        let issue = validate_nucleotide_form(&form).expect_err("bad from");
        assert_eq!(issue.kind, IssueKind::FromNotInteger);

        form.from = "100".to_string();
        form.to = "12x".to_string();
        let issue = validate_nucleotide_form(&form).expect_err("bad to");
        assert_eq!(issue.kind, IssueKind::ToNotInteger);

        // A single present bound is fine.
        form.to.clear();
        assert_eq!(validate_nucleotide_form(&form), Ok(()));
    }

    #[test]
    fn test_nucleotide_range_must_not_be_inverted() {
        let mut form = NucleotideForm::default();
        form.upload_filename = "genome.fa".to_string();
        form.from = "5000".to_string();
        form.to = "200".to_string();
        let issue = validate_nucleotide_form(&form).expect_err("inverted range");
        assert_eq!(issue.kind, IssueKind::RangeInverted);

        form.to = "5000".to_string();
        assert_eq!(validate_nucleotide_form(&form), Ok(()));
    }

    #[test]
    fn test_protein_empty_form_fails() {
        let form = ProteinForm::default();
        let issue = validate_protein_form(&form).expect_err("empty form must fail");
        assert_eq!(issue.kind, IssueKind::NoInput);
    }

    #[test]
    fn test_protein_semicolon_reported_before_whitespace() {
        let form = ProteinForm {
            sequence: String::new(),
            ncbi: "A1; B2".to_string(),
        };
        let issue = validate_protein_form(&form).expect_err("semicolon list must fail");
        assert_eq!(issue.kind, IssueKind::SemicolonInIdList);
    }

    #[test]
    fn test_protein_whitespace_in_id_list_fails() {
        let form = ProteinForm {
            sequence: String::new(),
            ncbi: "A1\tB2".to_string(),
        };
        let issue = validate_protein_form(&form).expect_err("tab list must fail");
        assert_eq!(issue.kind, IssueKind::WhitespaceInIdList);

        let form = ProteinForm {
            sequence: String::new(),
            ncbi: "A1,B2".to_string(),
        };
        assert_eq!(validate_protein_form(&form), Ok(()));
    }
}
