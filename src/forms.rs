//! Field state and gating rules for the two submission forms.
//!
//! These structs are the explicit replacement for state that the service's
//! web page kept in the DOM. All gating helpers are idempotent: calling one
//! twice with the same inputs leaves the form unchanged.

/// Kind of sequence file, judged by the lowercase suffix after the last `.`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionKind {
    /// Annotated formats: GenBank or EMBL.
    Annotated,
    Fasta,
    Other,
}

pub fn classify_extension(filename: &str) -> ExtensionKind {
    let ext = filename
        .rsplit('.')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    match ext.as_str() {
        "gb" | "gbk" | "genbank" | "emb" | "embl" => ExtensionKind::Annotated,
        "fasta" | "fas" | "fa" | "fna" => ExtensionKind::Fasta,
        _ => ExtensionKind::Other,
    }
}

/// A checkbox that gating rules may force on/off or grey out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatedCheckbox {
    pub checked: bool,
    pub enabled: bool,
}

impl GatedCheckbox {
    pub fn new(checked: bool) -> Self {
        Self {
            checked,
            enabled: true,
        }
    }
}

/// Nucleotide submission form.
///
/// `clusters` holds the per-cluster-type checkboxes; index 0 is the "all"
/// box whose state propagates to the rest. The vector is however many
/// cluster types the page offers, not a fixed count.
#[derive(Debug, Clone, PartialEq)]
pub struct NucleotideForm {
    pub upload_filename: String,
    pub ncbi: String,
    pub from: String,
    pub to: String,
    pub clusters: Vec<GatedCheckbox>,
    pub legacy: bool,
    pub region: bool,
    pub eukaryotic: bool,
    pub subclusterblast: GatedCheckbox,
    pub inclusive: GatedCheckbox,
    pub region_visible: bool,
    pub glimmer_visible: bool,
}

impl Default for NucleotideForm {
    fn default() -> Self {
        Self::with_cluster_count(1)
    }
}

impl NucleotideForm {
    pub fn with_cluster_count(count: usize) -> Self {
        Self {
            upload_filename: String::new(),
            ncbi: String::new(),
            from: String::new(),
            to: String::new(),
            clusters: vec![GatedCheckbox::new(true); count.max(1)],
            legacy: false,
            region: false,
            eukaryotic: false,
            subclusterblast: GatedCheckbox::new(true),
            inclusive: GatedCheckbox::new(false),
            region_visible: false,
            glimmer_visible: true,
        }
    }

    /// Propagate the first cluster checkbox's state onto all later ones.
    pub fn toggle_clusters(&mut self) {
        let value = self.clusters.first().map(|c| c.checked).unwrap_or(false);
        for cluster in self.clusters.iter_mut().skip(1) {
            cluster.checked = value;
        }
    }

    /// The region input panel follows the region checkbox.
    pub fn toggle_region_input(&mut self) {
        self.region_visible = self.region;
    }

    /// Entering legacy mode restricts analysis to the full cluster set and
    /// greys out the newer sub-options; leaving it hands control back.
    pub fn toggle_legacy_mode(&mut self) {
        if self.legacy {
            if let Some(first) = self.clusters.first_mut() {
                first.checked = true;
            }
            for cluster in self.clusters.iter_mut().skip(1) {
                cluster.checked = true;
                cluster.enabled = false;
            }
            self.subclusterblast.checked = false;
            self.subclusterblast.enabled = false;
            self.inclusive.checked = false;
            self.inclusive.enabled = false;
        } else {
            for cluster in self.clusters.iter_mut().skip(1) {
                cluster.enabled = true;
            }
            self.subclusterblast.checked = true;
            self.subclusterblast.enabled = true;
            // Checked state deliberately left alone here.
            self.inclusive.enabled = true;
        }
    }

    pub fn clear_upload(&mut self) {
        self.upload_filename.clear();
        self.refresh_glimmer_visibility();
    }

    pub fn clear_ncbi_field(&mut self) {
        self.ncbi.clear();
    }

    /// A eukaryotic FASTA upload gets no gene-finding settings; everything
    /// else does.
    pub fn refresh_glimmer_visibility(&mut self) {
        let fasta = classify_extension(&self.upload_filename) == ExtensionKind::Fasta;
        self.glimmer_visible = !(fasta && self.eukaryotic);
    }

    /// Called when the upload field changes: uploading a file and giving an
    /// NCBI accession are mutually exclusive, so the NCBI field is cleared.
    /// The upload field itself is never cleared by the NCBI side.
    pub fn on_sequence_field_changed(&mut self) {
        self.clear_ncbi_field();
        self.refresh_glimmer_visibility();
    }
}

/// Protein submission form: a pasted sequence or a comma-separated list of
/// NCBI protein ids.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProteinForm {
    pub sequence: String,
    pub ncbi: String,
}

impl ProteinForm {
    pub fn clear_sequence_field(&mut self) {
        self.sequence.clear();
    }

    pub fn clear_protein_ncbi_field(&mut self) {
        self.ncbi.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_extension_is_case_insensitive() {
        assert_eq!(classify_extension("X.GBK"), ExtensionKind::Annotated);
        assert_eq!(classify_extension("x.FnA"), ExtensionKind::Fasta);
        assert_eq!(classify_extension("genome.embl"), ExtensionKind::Annotated);
        assert_eq!(classify_extension("reads.fasta"), ExtensionKind::Fasta);
        assert_eq!(classify_extension("noext"), ExtensionKind::Other);
        assert_eq!(classify_extension("archive.tar.gz"), ExtensionKind::Other);
        assert_eq!(classify_extension(""), ExtensionKind::Other);
    }

    #[test]
    fn test_toggle_clusters_propagates_first_box() {
        let mut form = NucleotideForm::with_cluster_count(4);
        form.clusters[0].checked = false;
        form.clusters[2].checked = true;
        form.toggle_clusters();
        assert!(form.clusters.iter().all(|c| !c.checked));

        form.clusters[0].checked = true;
        form.toggle_clusters();
        assert!(form.clusters.iter().all(|c| c.checked));
    }

    #[test]
    fn test_legacy_mode_forces_and_greys_out() {
        let mut form = NucleotideForm::with_cluster_count(4);
        form.clusters[2].checked = false;
        form.inclusive.checked = true;

        form.legacy = true;
        form.toggle_legacy_mode();
        for cluster in &form.clusters[1..] {
            assert!(cluster.checked);
            assert!(!cluster.enabled);
        }
        assert!(form.clusters[0].checked);
        assert!(!form.subclusterblast.checked);
        assert!(!form.subclusterblast.enabled);
        assert!(!form.inclusive.checked);
        assert!(!form.inclusive.enabled);
    }

    #[test]
    fn test_leaving_legacy_mode_restores_control() {
        let mut form = NucleotideForm::with_cluster_count(3);
        form.legacy = true;
        form.toggle_legacy_mode();
        form.inclusive.checked = false;

        form.legacy = false;
        form.toggle_legacy_mode();
        for cluster in &form.clusters[1..] {
            assert!(cluster.enabled);
            // Checked state is whatever legacy mode left behind.
            assert!(cluster.checked);
        }
        assert!(form.subclusterblast.checked);
        assert!(form.subclusterblast.enabled);
        assert!(form.inclusive.enabled);
        assert!(!form.inclusive.checked);
    }

    #[test]
    fn test_glimmer_hidden_only_for_eukaryotic_fasta() {
        let mut form = NucleotideForm::default();
        form.upload_filename = "genome.fa".to_string();
        form.eukaryotic = true;
        form.refresh_glimmer_visibility();
        assert!(!form.glimmer_visible);

        form.eukaryotic = false;
        form.refresh_glimmer_visibility();
        assert!(form.glimmer_visible);

        form.eukaryotic = true;
        form.upload_filename = "genome.gbk".to_string();
        form.refresh_glimmer_visibility();
        assert!(form.glimmer_visible);
    }

    #[test]
    fn test_clear_upload_reevaluates_glimmer() {
        let mut form = NucleotideForm::default();
        form.upload_filename = "genome.fna".to_string();
        form.eukaryotic = true;
        form.refresh_glimmer_visibility();
        assert!(!form.glimmer_visible);

        form.clear_upload();
        assert!(form.upload_filename.is_empty());
        assert!(form.glimmer_visible);
    }

    #[test]
    fn test_sequence_change_clears_ncbi_but_not_itself() {
        let mut form = NucleotideForm::default();
        form.upload_filename = "genome.gb".to_string();
        form.ncbi = "U00096".to_string();
        form.on_sequence_field_changed();
        assert!(form.ncbi.is_empty());
        assert_eq!(form.upload_filename, "genome.gb");
    }

    #[test]
    fn test_region_panel_follows_checkbox() {
        let mut form = NucleotideForm::default();
        assert!(!form.region_visible);
        form.region = true;
        form.toggle_region_input();
        assert!(form.region_visible);
        form.toggle_region_input();
        assert!(form.region_visible);
        form.region = false;
        form.toggle_region_input();
        assert!(!form.region_visible);
    }
}
