use serde::{Deserialize, Serialize};

// ── Search input ─────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn parse_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Some(Gender::Male),
            "female" | "f" => Some(Gender::Female),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CustodyStatus {
    Active,
    Inactive,
}

impl CustodyStatus {
    pub fn parse_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "active" => Some(CustodyStatus::Active),
            "inactive" => Some(CustodyStatus::Inactive),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CustodyStatus::Active => "Active",
            CustodyStatus::Inactive => "Inactive",
        }
    }
}

/// One (last name, first initial) probe against the portal's name search.
/// Constructed per iteration of the sweep; never persisted.
#[derive(Clone, Debug)]
pub struct SearchQuery {
    pub last_name: String,
    pub first_initial: String,
    pub gender: Gender,
    pub status: CustodyStatus,
}

// ── Grid extraction ──────────────────────────────────────────────────────────

/// Raw data pulled from one result-grid row snapshot, before the detail visit.
///
/// `inmate_id` uniqueness is not enforced — the same inmate can surface under
/// multiple search probes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridRow {
    pub inmate_id: String,
    /// `src` of the photo button cell, usually relative to the portal base.
    pub photo_url: Option<String>,
    pub last_name: String,
    pub first_name_middle_initial: String,
    pub admitted_date: String,
    /// Whether the id cell carried a detail link. Rows without one can still
    /// be summarized but cannot be visited.
    pub has_detail_link: bool,
}

/// One cell of the grid's pager row. The current page renders as plain text,
/// the others as links.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PagerCell {
    pub label: String,
    pub is_link: bool,
}

// ── Persisted records ────────────────────────────────────────────────────────

/// Aggregate row written to `inmates.csv`, one per grid row visited.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct InmateSummary {
    pub inmate_id: String,
    pub last_name: String,
    pub first_name_middle_initial: String,
    pub admitted_date: String,
    /// `{inmate_id}.jpg` when a photo was captured, the literal `"None"`
    /// placeholder otherwise. Doubles as the join key into `photos/`.
    pub photo_filename: String,
}

impl InmateSummary {
    pub const HEADER: &'static [&'static str] = &[
        "inmate_id",
        "last_name",
        "first_name_middle_initial",
        "admitted_date",
        "photo_filename",
    ];

    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.inmate_id.clone(),
            self.last_name.clone(),
            self.first_name_middle_initial.clone(),
            self.admitted_date.clone(),
            self.photo_filename.clone(),
        ]
    }
}

/// Flat attributes scattered over four detail-page sub-tables. Each sub-table
/// fills its own slice of fields; a missing sub-table leaves them `None`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BasicInfo {
    pub gender: Option<String>,
    pub height: Option<String>,
    pub weight: Option<String>,
    pub hair_color: Option<String>,
    pub eye_color: Option<String>,
    pub ethnic_origin: Option<String>,
    pub custody_class: Option<String>,
    pub admission: Option<String>,
    pub release_date: Option<String>,
    pub release_type: Option<String>,
    pub complex: Option<String>,
    pub unit: Option<String>,
    pub last_movement: Option<String>,
    pub status: Option<String>,
}

impl BasicInfo {
    pub const FIELDS: &'static [&'static str] = &[
        "gender",
        "height",
        "weight",
        "hair_color",
        "eye_color",
        "ethnic_origin",
        "custody_class",
        "admission",
        "release_date",
        "release_type",
        "complex",
        "unit",
        "last_movement",
        "status",
    ];

    pub fn to_row(&self) -> Vec<String> {
        [
            &self.gender,
            &self.height,
            &self.weight,
            &self.hair_color,
            &self.eye_color,
            &self.ethnic_origin,
            &self.custody_class,
            &self.admission,
            &self.release_date,
            &self.release_type,
            &self.complex,
            &self.unit,
            &self.last_movement,
            &self.status,
        ]
        .into_iter()
        .map(|f| f.clone().unwrap_or_default())
        .collect()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Sentence {
    pub commit_num: String,
    pub sentence_length: String,
    pub county: String,
    pub cause_num: String,
    pub offense_date: String,
    pub sentence_date: String,
    pub sentence_status: String,
    pub crime: String,
}

impl Sentence {
    pub const FIELDS: &'static [&'static str] = &[
        "commit_num",
        "sentence_length",
        "county",
        "cause_num",
        "offense_date",
        "sentence_date",
        "sentence_status",
        "crime",
    ];

    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.commit_num.clone(),
            self.sentence_length.clone(),
            self.county.clone(),
            self.cause_num.clone(),
            self.offense_date.clone(),
            self.sentence_date.clone(),
            self.sentence_status.clone(),
            self.crime.clone(),
        ]
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Infraction {
    pub violation_date: String,
    pub infraction: String,
    pub verdict_date: String,
    pub verdict: String,
}

impl Infraction {
    pub const FIELDS: &'static [&'static str] =
        &["violation_date", "infraction", "verdict_date", "verdict"];

    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.violation_date.clone(),
            self.infraction.clone(),
            self.verdict_date.clone(),
            self.verdict.clone(),
        ]
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Appeal {
    pub appeal_date: String,
    pub outcome: String,
    pub as_of_date: String,
}

impl Appeal {
    pub const FIELDS: &'static [&'static str] = &["appeal_date", "outcome", "as_of_date"];

    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.appeal_date.clone(),
            self.outcome.clone(),
            self.as_of_date.clone(),
        ]
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Classification {
    pub complete_date: String,
    pub classification_type: String,
    pub custody_risk: String,
    pub internal_risk: String,
}

impl Classification {
    pub const FIELDS: &'static [&'static str] = &[
        "complete_date",
        "classification_type",
        "custody_risk",
        "internal_risk",
    ];

    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.complete_date.clone(),
            self.classification_type.clone(),
            self.custody_risk.clone(),
            self.internal_risk.clone(),
        ]
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkProgram {
    pub assigned_date: String,
    pub completed_date: String,
    pub work_assignment: String,
}

impl WorkProgram {
    pub const FIELDS: &'static [&'static str] =
        &["assigned_date", "completed_date", "work_assignment"];

    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.assigned_date.clone(),
            self.completed_date.clone(),
            self.work_assignment.clone(),
        ]
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Detainer {
    pub detainer_date: String,
    pub detainer_type: String,
    pub charges: String,
    pub authority: String,
    pub agreement_date: String,
}

impl Detainer {
    pub const FIELDS: &'static [&'static str] = &[
        "detainer_date",
        "detainer_type",
        "charges",
        "authority",
        "agreement_date",
    ];

    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.detainer_date.clone(),
            self.detainer_type.clone(),
            self.charges.clone(),
            self.authority.clone(),
            self.agreement_date.clone(),
        ]
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParoleAction {
    pub hearing_date: String,
    pub statute: String,
    pub action: String,
}

impl ParoleAction {
    pub const FIELDS: &'static [&'static str] = &["hearing_date", "statute", "action"];

    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.hearing_date.clone(),
            self.statute.clone(),
            self.action.clone(),
        ]
    }
}

/// Everything collected during one detail-page visit.
///
/// `warnings` carries one reason string per failed extraction attempt
/// (missing sub-table, short row, reported-but-absent section table) so a
/// partial record stays inspectable instead of silently losing fields.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct InmateDetail {
    pub basic_info: BasicInfo,
    pub sentences: Vec<Sentence>,
    pub infractions: Vec<Infraction>,
    pub appeals: Vec<Appeal>,
    pub classifications: Vec<Classification>,
    pub work_programs: Vec<WorkProgram>,
    pub detainers: Vec<Detainer>,
    pub parole_actions: Vec<ParoleAction>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

// ── Run summary ──────────────────────────────────────────────────────────────

/// Counters reported at the end of a sweep.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct HarvestStats {
    pub queries_run: usize,
    pub queries_failed: usize,
    pub inmates_found: usize,
    pub photos_saved: usize,
    pub started_at: String,
}
